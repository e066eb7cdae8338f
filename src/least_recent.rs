use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{transport::Request, Error, Result};

/// Universalis never returns more entries than this.
pub const MAX_ENTRIES: u32 = 200;

/// What the staleness report is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector<'a> {
    World(&'a str),
    DataCenter(&'a str),
}

impl<'a> Selector<'a> {
    /// The world wins if both are given.
    pub fn from_options(world: Option<&'a str>, data_center: Option<&'a str>) -> Result<Self> {
        match (world, data_center) {
            (Some(world), _) => Ok(Self::World(world)),
            (None, Some(dc)) => Ok(Self::DataCenter(dc)),
            (None, None) => Err(Error::MissingSelector),
        }
    }

    /// Builds the request; `0` entries leaves the service default, larger
    /// counts are capped at [`MAX_ENTRIES`].
    pub fn request(&self, entries: Option<u32>) -> Request {
        let entries = entries.filter(|e| *e > 0).map(|e| e.min(MAX_ENTRIES));

        let request = match self {
            Self::World(world) => Request::least_recently_updated().param("world", Some(world)),
            Self::DataCenter(dc) => Request::least_recently_updated().param("dcName", Some(dc)),
        };

        request.param("entries", entries)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LeastRecentResponse {
    pub items: Vec<RecentlyUpdatedItem>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentlyUpdatedItem {
    #[serde(rename = "itemID")]
    pub item_id: u64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_upload_time: DateTime<Utc>,
    #[serde(rename = "worldID")]
    pub world_id: u32,
    #[serde(default)]
    pub world_name: Option<String>,
}
