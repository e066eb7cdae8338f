use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/*
Object {
        "itemID": Number(42884),
        "worldID": Number(73),
        "lastUploadTime": Number(1700000000123),
        "listings": Array [...],
        "recentHistory": Array [...],
        "dcName": String("Crystal"),
        "currentAveragePrice": Number(121537.5),
        "currentAveragePriceNQ": Number(121537.5),
        "currentAveragePriceHQ": Number(0),
        "regularSaleVelocity": Number(4.285714),
        "nqSaleVelocity": Number(4.285714),
        "hqSaleVelocity": Number(0),
        "averagePrice": Number(119000),
        "averagePriceNQ": Number(119000),
        "averagePriceHQ": Number(0),
        "minPrice": Number(123040),
        "minPriceNQ": Number(123040),
        "minPriceHQ": Number(0),
        "maxPrice": Number(130000),
        "maxPriceNQ": Number(130000),
        "maxPriceHQ": Number(0),
        "worldUploadTimes": Object { "34": Number(1700000000123), ... },
        "listingsCount": Number(2),
        "unitsForSale": Number(2),
        "unitsSold": Number(30),
        "hasData": Bool(true),
    },
*/
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketItem {
    #[serde(rename = "itemID")]
    pub item_id: u64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_upload_time: DateTime<Utc>,
    pub listings: Vec<Listing>,
    pub recent_history: Vec<Sale>,

    pub current_average_price: f64,
    #[serde(rename = "currentAveragePriceNQ")]
    pub current_average_price_nq: f64,
    #[serde(rename = "currentAveragePriceHQ")]
    pub current_average_price_hq: f64,
    pub average_price: f64,
    #[serde(rename = "averagePriceNQ")]
    pub average_price_nq: f64,
    #[serde(rename = "averagePriceHQ")]
    pub average_price_hq: f64,
    pub min_price: u64,
    #[serde(rename = "minPriceNQ")]
    pub min_price_nq: u64,
    #[serde(rename = "minPriceHQ")]
    pub min_price_hq: u64,
    pub max_price: u64,
    #[serde(rename = "maxPriceNQ")]
    pub max_price_nq: u64,
    #[serde(rename = "maxPriceHQ")]
    pub max_price_hq: u64,

    #[serde(default, rename = "worldID")]
    pub world_id: Option<u32>,
    #[serde(default)]
    pub world_name: Option<String>,
    #[serde(default)]
    pub dc_name: Option<String>,
    #[serde(default)]
    pub region_name: Option<String>,
    #[serde(default, deserialize_with = "millis_by_world")]
    pub world_upload_times: BTreeMap<u32, DateTime<Utc>>,

    #[serde(default)]
    pub regular_sale_velocity: Option<f64>,
    #[serde(default)]
    pub nq_sale_velocity: Option<f64>,
    #[serde(default)]
    pub hq_sale_velocity: Option<f64>,
    #[serde(default)]
    pub listings_count: Option<u64>,
    #[serde(default)]
    pub recent_history_count: Option<u64>,
    #[serde(default)]
    pub units_for_sale: Option<u64>,
    #[serde(default)]
    pub units_sold: Option<u64>,
    #[serde(default)]
    pub has_data: Option<bool>,
}

/// One active sell offer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(rename = "listingID", deserialize_with = "string_or_number")]
    pub listing_id: String,
    pub price_per_unit: u64,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub hq: bool,
    #[serde(default)]
    pub on_mannequin: bool,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub last_review_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub retainer_name: Option<String>,
    #[serde(default, rename = "worldID")]
    pub world_id: Option<u32>,
    #[serde(default)]
    pub world_name: Option<String>,
}

/// One entry of an item's recent sale history.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub price_per_unit: u64,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub hq: bool,
    #[serde(default)]
    pub on_mannequin: bool,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub buyer_name: Option<String>,
    #[serde(default, rename = "worldID")]
    pub world_id: Option<u32>,
    #[serde(default)]
    pub world_name: Option<String>,
}

// Listing ids are strings nowadays, older uploads still carry numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected listing id, got {}",
            other
        ))),
    }
}

fn millis_by_world<'de, D>(deserializer: D) -> Result<BTreeMap<u32, DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<u32, i64>::deserialize(deserializer)?;

    raw.into_iter()
        .map(|(world, millis)| {
            DateTime::from_timestamp_millis(millis)
                .map(|time| (world, time))
                .ok_or_else(|| {
                    serde::de::Error::custom(format!("upload time out of range: {}", millis))
                })
        })
        .collect()
}

/// Names Universalis accepts in the `fields` parameter.
pub const VALID_FIELDS: [&str; 27] = [
    "itemID",
    "lastUploadTime",
    "listings",
    "recentHistory",
    "currentAveragePrice",
    "currentAveragePriceNQ",
    "currentAveragePriceHQ",
    "regularSaleVelocity",
    "nqSaleVelocity",
    "hqSaleVelocity",
    "averagePrice",
    "averagePriceNQ",
    "averagePriceHQ",
    "minPrice",
    "minPriceNQ",
    "minPriceHQ",
    "maxPrice",
    "maxPriceNQ",
    "maxPriceHQ",
    "stackSizeHistogram",
    "stackSizeHistogramNQ",
    "stackSizeHistogramHQ",
    "listingsCount",
    "recentHistoryCount",
    "unitsForSale",
    "unitsSold",
    "hasData",
];
