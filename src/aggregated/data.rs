use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::region::RegionScoped;

/*
Object {
        "results": Array [
            Object {
                "itemId": Number(42884),
                "nq": Object {
                    "minListing": Object { "world": Object { "price": Number(123040) }, "dc": ..., "region": ... },
                    "recentPurchase": Object { ..., "timestamp": Number(1700000000000) },
                    "averageSalePrice": Object { "dc": Object { "price": Number(120000.4) } },
                    "dailySaleVelocity": Object { "dc": Object { "quantity": Number(4.5) } },
                },
                "hq": Object { ... },
                "worldUploadTimes": Array [ Object { "worldId": Number(34), "timestamp": Number(1700000000000) } ],
            },
        ],
        "failedItems": Array [],
    },
*/
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedResponse {
    pub results: Vec<AggregatedItem>,
    #[serde(default)]
    pub failed_items: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedItem {
    pub item_id: u64,
    pub nq: QualityStats,
    pub hq: QualityStats,
    #[serde(default)]
    pub world_upload_times: Vec<WorldUploadTime>,
}

/// Price summary of one quality tier. Any entry may be missing, e.g. HQ
/// data for items that cannot be high quality.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityStats {
    #[serde(default)]
    pub min_listing: Option<RegionScoped<PricePoint>>,
    #[serde(default)]
    pub recent_purchase: Option<RegionScoped<PricePoint>>,
    #[serde(default)]
    pub average_sale_price: Option<RegionScoped<PricePoint>>,
    #[serde(default)]
    pub daily_sale_velocity: Option<RegionScoped<Velocity>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub price: f64,
    #[serde(default)]
    pub world_id: Option<u32>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Velocity {
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldUploadTime {
    pub world_id: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}
