use std::fmt::Display;

/// Universalis rejects requests for more items than this, so longer id lists
/// are cut off before the URL is built.
pub const MAX_ITEM_IDS: usize = 100;

/// One GET request relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Short name used for metrics, the path itself contains ids.
    pub label: &'static str,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
}

impl Request {
    pub fn new(label: &'static str, path: impl Into<String>) -> Self {
        Self {
            label,
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Adds `key=value` unless the value is absent.
    pub fn param<V: Display>(mut self, key: &'static str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.query.push((key, value.to_string()));
        }
        self
    }

    pub fn data_centers() -> Self {
        Self::new("data-centers", "/data-centers")
    }

    pub fn worlds() -> Self {
        Self::new("worlds", "/worlds")
    }

    pub fn market(region: &str, item_ids: &[u64]) -> Self {
        Self::new("market", format!("/{}/{}", region, join_item_ids(item_ids)))
    }

    pub fn aggregated(region: &str, item_ids: &[u64]) -> Self {
        Self::new(
            "aggregated",
            format!("/aggregated/{}/{}", region, join_item_ids(item_ids)),
        )
    }

    pub fn least_recently_updated() -> Self {
        Self::new("least-recently-updated", "/extra/stats/least-recently-updated")
    }
}

/// Comma joins at most [`MAX_ITEM_IDS`] ids, keeping their order.
pub fn join_item_ids(item_ids: &[u64]) -> String {
    if item_ids.len() > MAX_ITEM_IDS {
        tracing::debug!(
            requested = item_ids.len(),
            "Capping item ids at {}",
            MAX_ITEM_IDS
        );
    }

    item_ids
        .iter()
        .take(MAX_ITEM_IDS)
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
