use serde::Deserialize;

use crate::{Error, Result};

/// The global regions Universalis accepts in place of a world or data center.
pub const REGIONS: [&str; 6] = [
    "japan",
    "europe",
    "north-america",
    "oceania",
    "china",
    "中国",
];

/// Which of the three categories a region name resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Region,
    DataCenter,
    World,
}

/// Entry of `/data-centers`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DataCenter {
    pub name: String,
    pub region: String,
    pub worlds: Vec<u32>,
}

/// Entry of `/worlds`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct World {
    pub id: u32,
    pub name: String,
}

/// Checks `name` against the fixed regions and the given (already lower-cased)
/// data center and world names.
pub fn classify<S: AsRef<str>>(
    name: &str,
    data_center_names: &[S],
    world_names: &[S],
) -> Result<RegionKind> {
    let name = name.to_lowercase();

    if REGIONS.contains(&name.as_str()) {
        return Ok(RegionKind::Region);
    }
    if data_center_names.iter().any(|dc| dc.as_ref() == name) {
        return Ok(RegionKind::DataCenter);
    }
    if world_names.iter().any(|world| world.as_ref() == name) {
        return Ok(RegionKind::World);
    }

    tracing::warn!(region = %name, "Invalid region");
    Err(Error::InvalidRegion { name })
}

/// A value Universalis reports per world, data center and region, of which
/// only the ones covered by the query are present.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegionScoped<T> {
    pub world: Option<T>,
    pub dc: Option<T>,
    pub region: Option<T>,
    /// Keys other than the three scopes, kept so a document carrying only
    /// those is not mistaken for an absent one.
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

impl<T> Default for RegionScoped<T> {
    fn default() -> Self {
        Self {
            world: None,
            dc: None,
            region: None,
            other: serde_json::Map::new(),
        }
    }
}

impl<T> RegionScoped<T> {
    /// The most specific value: world, then data center, then region.
    pub fn resolve(&self) -> Result<&T> {
        self.world
            .as_ref()
            .or(self.dc.as_ref())
            .or(self.region.as_ref())
            .ok_or(Error::UnresolvedRegionData)
    }

    /// True for `{}`; unknown keys count as content.
    pub fn is_empty(&self) -> bool {
        self.world.is_none()
            && self.dc.is_none()
            && self.region.is_none()
            && self.other.is_empty()
    }
}
