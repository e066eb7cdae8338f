use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong while talking to Universalis.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid parameters (code 400): {url}")]
    InvalidParameters { url: String },

    #[error("world/dc/region or requested item is invalid (code 404): {url}")]
    NotFound { url: String },

    #[error("{status} code received: {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON data expected from {url}: {source}")]
    MalformedResponse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("item {item_id:?} is missing market data: {source}")]
    MalformedItem {
        item_id: Option<u64>,
        #[source]
        source: serde_json::Error,
    },

    #[error("{name} is not a valid region, data center or world")]
    InvalidRegion { name: String },

    #[error("must supply a world or data center for least recently updated items")]
    MissingSelector,

    #[error("region data not found")]
    UnresolvedRegionData,

    #[error("unknown market data field: {field}")]
    UnknownField { field: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// The HTTP status that caused this error, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::InvalidParameters { .. } => Some(400),
            Self::NotFound { .. } => Some(404),
            Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn from_status(status: u16, url: &str) -> Option<Self> {
        let url = url.to_string();
        match status {
            200..=299 => None,
            400 => Some(Self::InvalidParameters { url }),
            404 => Some(Self::NotFound { url }),
            status => Some(Self::UnexpectedStatus { status, url }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_status_codes() {
        assert!(Error::from_status(200, "u").is_none());
        assert!(Error::from_status(204, "u").is_none());
        assert!(matches!(
            Error::from_status(400, "u"),
            Some(Error::InvalidParameters { .. })
        ));
        assert!(matches!(
            Error::from_status(404, "u"),
            Some(Error::NotFound { .. })
        ));
        assert!(matches!(
            Error::from_status(503, "u"),
            Some(Error::UnexpectedStatus { status: 503, .. })
        ));
    }

    #[test]
    fn status_is_carried_through() {
        let err = Error::from_status(500, "https://example.test/x").unwrap();
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("https://example.test/x"));
        assert_eq!(Error::MissingSelector.status(), None);
    }
}
