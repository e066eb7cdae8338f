use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{transport::Request, Error, Result};

mod data;
pub use data::{Listing, MarketItem, Sale, VALID_FIELDS};

pub type ItemId = u64;

/// Parameters of a `/{region}/{itemIds}` query, kept on the [`ResponseSet`] so
/// the same query can be sent again.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarketQuery {
    pub item_ids: Vec<ItemId>,
    pub region: String,
    pub listings: Option<u32>,
    pub entries: Option<u32>,
    pub hq: Option<bool>,
    pub stats_within: Option<u64>,
    pub entries_within: Option<u64>,
    pub fields: Option<Vec<String>>,
}

impl MarketQuery {
    pub fn new(region: impl Into<String>, item_ids: impl IntoIterator<Item = ItemId>) -> Self {
        Self {
            item_ids: item_ids.into_iter().collect(),
            region: region.into(),
            ..Default::default()
        }
    }

    pub fn listings(mut self, listings: u32) -> Self {
        self.listings = Some(listings);
        self
    }

    pub fn entries(mut self, entries: u32) -> Self {
        self.entries = Some(entries);
        self
    }

    pub fn hq(mut self, hq: bool) -> Self {
        self.hq = Some(hq);
        self
    }

    pub fn stats_within(mut self, millis: u64) -> Self {
        self.stats_within = Some(millis);
        self
    }

    pub fn entries_within(mut self, seconds: u64) -> Self {
        self.entries_within = Some(seconds);
        self
    }

    pub fn fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Builds the request, rejecting field names Universalis does not know.
    pub fn request(&self) -> Result<Request> {
        let fields = match &self.fields {
            Some(fields) => {
                if let Some(unknown) = fields.iter().find(|f| !VALID_FIELDS.contains(&f.as_str())) {
                    return Err(Error::UnknownField {
                        field: unknown.clone(),
                    });
                }
                Some(fields.join(","))
            }
            None => None,
        };

        Ok(Request::market(&self.region, &self.item_ids)
            .param("listings", self.listings)
            .param("entries", self.entries)
            .param("hq", self.hq)
            .param("statsWithin", self.stats_within)
            .param("entriesWithin", self.entries_within)
            .param("fields", fields))
    }
}

/// The two document shapes a market data query can return.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPriceDocument {
    /// A single item's market fields at the top level.
    Single(Value),
    /// Sub-documents of several items.
    Collection(Vec<Value>),
    /// Neither shape, e.g. an empty or error document.
    Unrecognized,
}

impl RawPriceDocument {
    pub fn classify(document: &Value) -> Self {
        match document.get("items") {
            Some(Value::Object(items)) => {
                return Self::Collection(items.values().cloned().collect())
            }
            Some(Value::Array(items)) => return Self::Collection(items.clone()),
            _ => {}
        }

        match document.get("itemID") {
            Some(Value::Number(_)) => Self::Single(document.clone()),
            _ => Self::Unrecognized,
        }
    }
}

fn unresolved_items(document: &Value) -> Vec<ItemId> {
    // Older service versions shipped the misspelled key
    let raw = document
        .get("unresolvedItems")
        .or_else(|| document.get("unresovledItems"));

    match raw {
        Some(Value::Array(ids)) => ids.iter().filter_map(Value::as_u64).collect(),
        _ => Vec::new(),
    }
}

/// Rows of the [`PriceTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceStat {
    Current,
    Average,
    Min,
    Max,
}

/// Columns of the [`PriceTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    Combined,
    Normal,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRow {
    pub combined: f64,
    pub normal: f64,
    pub high: f64,
}

impl PriceRow {
    pub fn get(&self, quality: Quality) -> f64 {
        match quality {
            Quality::Combined => self.combined,
            Quality::Normal => self.normal,
            Quality::High => self.high,
        }
    }
}

/// Current, average, min and max prices split by quality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceTable {
    pub current: PriceRow,
    pub average: PriceRow,
    pub min: PriceRow,
    pub max: PriceRow,
}

impl PriceTable {
    pub fn row(&self, stat: PriceStat) -> PriceRow {
        match stat {
            PriceStat::Current => self.current,
            PriceStat::Average => self.average,
            PriceStat::Min => self.min,
            PriceStat::Max => self.max,
        }
    }

    pub fn get(&self, stat: PriceStat, quality: Quality) -> f64 {
        self.row(stat).get(quality)
    }
}

impl From<&MarketItem> for PriceTable {
    fn from(item: &MarketItem) -> Self {
        Self {
            current: PriceRow {
                combined: item.current_average_price,
                normal: item.current_average_price_nq,
                high: item.current_average_price_hq,
            },
            average: PriceRow {
                combined: item.average_price,
                normal: item.average_price_nq,
                high: item.average_price_hq,
            },
            min: PriceRow {
                combined: item.min_price as f64,
                normal: item.min_price_nq as f64,
                high: item.min_price_hq as f64,
            },
            max: PriceRow {
                combined: item.max_price as f64,
                normal: item.max_price_nq as f64,
                high: item.max_price_hq as f64,
            },
        }
    }
}

/// Market data of one item.
///
/// Immutable once built: the raw document is only reachable through
/// [`ItemView::data`].
#[derive(Debug, Clone, PartialEq)]
pub struct ItemView {
    data: Value,
    item: MarketItem,
}

impl ItemView {
    /// Fails with [`Error::MalformedItem`] if any required market field is missing.
    pub fn from_value(data: Value) -> Result<Self> {
        let item: MarketItem =
            serde_json::from_value(data.clone()).map_err(|e| Error::MalformedItem {
                item_id: data.get("itemID").and_then(Value::as_u64),
                source: e,
            })?;

        if item.world_name.is_none() && item.dc_name.is_none() && item.region_name.is_none() {
            tracing::warn!(item_id = item.item_id, "Item data has no world, dc or region name");
        }

        Ok(Self { data, item })
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn item(&self) -> &MarketItem {
        &self.item
    }

    pub fn item_id(&self) -> ItemId {
        self.item.item_id
    }

    pub fn upload_time(&self) -> DateTime<Utc> {
        self.item.last_upload_time
    }

    pub fn listings(&self) -> &[Listing] {
        &self.item.listings
    }

    pub fn recent_sales(&self) -> &[Sale] {
        &self.item.recent_history
    }

    pub fn price_table(&self) -> PriceTable {
        PriceTable::from(&self.item)
    }

    /// The combined minimum price.
    pub fn best_price(&self) -> u64 {
        self.item.min_price
    }

    /// World, data center or region name, whichever the query was made for.
    pub fn region_label(&self) -> Option<&str> {
        self.item
            .world_name
            .as_deref()
            .or(self.item.dc_name.as_deref())
            .or(self.item.region_name.as_deref())
    }

    /// Empty for single world queries.
    pub fn world_upload_times(&self) -> &BTreeMap<u32, DateTime<Utc>> {
        &self.item.world_upload_times
    }

    /// Listings strictly cheaper than `threshold`, in the order the service sent them.
    pub fn better_listings_than(&self, threshold: u64) -> Vec<&Listing> {
        self.item
            .listings
            .iter()
            .filter(|l| l.price_per_unit < threshold)
            .collect()
    }

    pub fn listing_ids(&self) -> Vec<&str> {
        self.item
            .listings
            .iter()
            .map(|l| l.listing_id.as_str())
            .collect()
    }
}

/// A normalized market data response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSet {
    data: Value,
    items: BTreeMap<ItemId, ItemView>,
    unresolved_items: Vec<ItemId>,
    query: MarketQuery,
}

impl ResponseSet {
    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn items(&self) -> &BTreeMap<ItemId, ItemView> {
        &self.items
    }

    pub fn item(&self, item_id: ItemId) -> Option<&ItemView> {
        self.items.get(&item_id)
    }

    pub fn unresolved_items(&self) -> &[ItemId] {
        &self.unresolved_items
    }

    pub fn query(&self) -> &MarketQuery {
        &self.query
    }

    pub fn best_prices(&self) -> BTreeMap<ItemId, u64> {
        self.items
            .iter()
            .map(|(id, item)| (*id, item.best_price()))
            .collect()
    }

    /// Listing ids of every item, item by item.
    pub fn listing_ids(&self) -> Vec<&str> {
        self.items
            .values()
            .flat_map(|item| item.listing_ids())
            .collect()
    }
}

/// Turns either document shape into a [`ResponseSet`].
///
/// Items are keyed by their own `itemID`, not by the key of the outer map. An
/// unrecognized document yields an empty set, but a recognized item missing
/// market fields fails the whole call.
pub fn normalize(document: Value, query: MarketQuery) -> Result<ResponseSet> {
    let items = match RawPriceDocument::classify(&document) {
        RawPriceDocument::Collection(items) => {
            let mut views = BTreeMap::new();
            for item in items {
                let view = ItemView::from_value(item)?;
                let item_id = view.item_id();
                if views.insert(item_id, view).is_some() {
                    tracing::warn!(item_id, "Duplicate item in document, keeping the last one");
                }
            }
            views
        }
        RawPriceDocument::Single(item) => {
            let view = ItemView::from_value(item)?;
            BTreeMap::from([(view.item_id(), view)])
        }
        RawPriceDocument::Unrecognized => {
            tracing::debug!("Document has neither items nor itemID");
            BTreeMap::new()
        }
    };

    let unresolved_items = unresolved_items(&document);
    if !unresolved_items.is_empty() {
        tracing::info!(?unresolved_items, "Couldn't find information for all item ids");
    }

    Ok(ResponseSet {
        data: document,
        items,
        unresolved_items,
        query,
    })
}

/// How an item's best price moved between two snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceChange {
    pub item_id: ItemId,
    pub old_best_price: u64,
    pub new_best_price: u64,
    /// New listings cheaper than the old best price.
    pub listings: Vec<Listing>,
}

/// Pairs items of both snapshots by id, in the old snapshot's order.
///
/// Items the new snapshot lacks are skipped, items only the new one has are
/// ignored.
pub fn price_changes(old: &ResponseSet, new: &ResponseSet) -> BTreeMap<ItemId, PriceChange> {
    let mut changes = BTreeMap::new();

    for (item_id, old_item) in old.items() {
        let Some(new_item) = new.item(*item_id) else {
            tracing::warn!(item_id, "Item missing from new snapshot");
            continue;
        };

        let old_best_price = old_item.best_price();
        let listings = new_item
            .better_listings_than(old_best_price)
            .into_iter()
            .cloned()
            .collect();

        changes.insert(
            *item_id,
            PriceChange {
                item_id: *item_id,
                old_best_price,
                new_best_price: new_item.best_price(),
                listings,
            },
        );
    }

    changes
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub fn item_doc(item_id: u64, listings: &[(&str, u64)], min_price: u64) -> Value {
        let listings: Vec<Value> = listings
            .iter()
            .map(|(id, price)| {
                json!({"listingID": id, "pricePerUnit": price, "quantity": 1, "hq": false})
            })
            .collect();

        json!({
            "itemID": item_id,
            "lastUploadTime": 1700000000123i64,
            "listings": listings,
            "recentHistory": [
                {"pricePerUnit": 120000, "quantity": 1, "hq": false, "timestamp": 1699990000}
            ],
            "dcName": "Crystal",
            "currentAveragePrice": 121537.5,
            "currentAveragePriceNQ": 121537.5,
            "currentAveragePriceHQ": 0,
            "averagePrice": 119000,
            "averagePriceNQ": 119000,
            "averagePriceHQ": 0,
            "minPrice": min_price,
            "minPriceNQ": min_price,
            "minPriceHQ": 0,
            "maxPrice": 130000,
            "maxPriceNQ": 130000,
            "maxPriceHQ": 0,
            "worldUploadTimes": {"34": 1700000000123i64, "37": 1699000000000i64}
        })
    }

    pub fn crystal_document() -> Value {
        json!({
            "itemIDs": [42884, 20],
            "items": {
                "42884": item_doc(42884, &[("a1", 123040), ("a2", 125000)], 123040),
                "20": item_doc(20, &[("b1", 30000)], 30000),
            },
            "dcName": "Crystal",
            "unresolvedItems": [99999]
        })
    }

    #[test]
    fn collection_shape() {
        let set = normalize(
            crystal_document(),
            MarketQuery::new("crystal", [42884, 20, 99999]),
        )
        .unwrap();

        assert_eq!(set.items().len(), 2);
        assert_eq!(
            set.best_prices(),
            BTreeMap::from([(42884, 123040), (20, 30000)])
        );
        assert_eq!(set.unresolved_items(), &[99999]);
        assert_eq!(set.query().region, "crystal");
    }

    #[test]
    fn collection_keyed_by_inner_id() {
        let document = json!({
            "items": {"not-a-number": item_doc(7, &[], 10)}
        });
        let set = normalize(document, MarketQuery::default()).unwrap();

        assert_eq!(set.items().keys().copied().collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn duplicate_inner_id_keeps_last() {
        let document = json!({
            "items": {
                "7": item_doc(7, &[("first", 10)], 10),
                "8": item_doc(7, &[("second", 20)], 20),
            }
        });
        let set = normalize(document, MarketQuery::default()).unwrap();

        assert_eq!(set.items().len(), 1);
        assert_eq!(set.item(7).unwrap().listing_ids(), vec!["second"]);
    }

    #[test]
    fn single_shape() {
        let set = normalize(
            item_doc(42884, &[("a1", 123040)], 123040),
            MarketQuery::new("crystal", [42884]),
        )
        .unwrap();

        assert_eq!(set.items().len(), 1);
        assert_eq!(set.item(42884).unwrap().best_price(), 123040);
        assert!(set.unresolved_items().is_empty());
    }

    #[test]
    fn unrecognized_shape_is_empty() {
        for document in [json!({}), json!({"error": "nope"}), json!([])] {
            let set = normalize(document, MarketQuery::default()).unwrap();
            assert!(set.items().is_empty());
            assert!(set.unresolved_items().is_empty());
        }
    }

    #[test]
    fn misspelled_unresolved_key() {
        let set = normalize(json!({"unresovledItems": [1, 2]}), MarketQuery::default()).unwrap();
        assert_eq!(set.unresolved_items(), &[1, 2]);
    }

    #[test]
    fn missing_market_field_fails() {
        let mut doc = item_doc(5, &[], 10);
        doc.as_object_mut().unwrap().remove("minPrice");

        let err = ItemView::from_value(doc.clone()).unwrap_err();
        assert!(matches!(err, Error::MalformedItem { item_id: Some(5), .. }));

        let err = normalize(json!({"items": {"5": doc}}), MarketQuery::default()).unwrap_err();
        assert!(matches!(err, Error::MalformedItem { .. }));
    }

    #[test]
    fn derived_fields() {
        let view = ItemView::from_value(item_doc(42884, &[("a1", 123040)], 123040)).unwrap();

        assert_eq!(view.upload_time().timestamp_millis(), 1700000000123);
        assert_eq!(view.region_label(), Some("Crystal"));
        assert_eq!(view.recent_sales().len(), 1);
        assert_eq!(view.world_upload_times().len(), 2);

        let table = view.price_table();
        assert_eq!(table.get(PriceStat::Min, Quality::Combined), 123040.0);
        assert_eq!(table.get(PriceStat::Current, Quality::Normal), 121537.5);
        assert_eq!(table.get(PriceStat::Max, Quality::High), 0.0);
        assert_eq!(table.average.combined, 119000.0);
    }

    #[test]
    fn missing_region_label_is_not_fatal() {
        let mut doc = item_doc(1, &[], 10);
        doc.as_object_mut().unwrap().remove("dcName");
        doc.as_object_mut().unwrap().remove("worldUploadTimes");

        let view = ItemView::from_value(doc).unwrap();
        assert_eq!(view.region_label(), None);
        assert!(view.world_upload_times().is_empty());
    }

    #[test]
    fn better_listings_keep_order() {
        let view = ItemView::from_value(item_doc(
            1,
            &[("a", 300), ("b", 100), ("c", 200), ("d", 100)],
            100,
        ))
        .unwrap();

        let ids = |threshold| {
            view.better_listings_than(threshold)
                .iter()
                .map(|l| l.listing_id.clone())
                .collect::<Vec<_>>()
        };

        assert_eq!(ids(250), vec!["b", "c", "d"]);
        assert_eq!(ids(200), vec!["b", "d"]);
        assert!(ids(100).is_empty());
        assert!(ids(0).is_empty());
        assert_eq!(ids(u64::MAX).len(), 4);
    }

    #[test]
    fn listing_ids_across_items() {
        let set = normalize(crystal_document(), MarketQuery::default()).unwrap();

        // BTreeMap order: item 20 before 42884
        assert_eq!(set.listing_ids(), vec!["b1", "a1", "a2"]);
        assert_eq!(set.item(42884).unwrap().listing_ids(), vec!["a1", "a2"]);
    }

    #[test]
    fn query_request_params() {
        let request = MarketQuery::new("Crystal", [42884, 20])
            .listings(10)
            .hq(true)
            .stats_within(1000)
            .fields(["listings", "minPrice"])
            .request()
            .unwrap();

        assert_eq!(request.path, "/Crystal/42884,20");
        assert_eq!(
            request.query,
            vec![
                ("listings", "10".to_string()),
                ("hq", "true".to_string()),
                ("statsWithin", "1000".to_string()),
                ("fields", "listings,minPrice".to_string()),
            ]
        );
    }

    #[test]
    fn query_rejects_unknown_field() {
        let err = MarketQuery::new("crystal", [1])
            .fields(["listings", "bogus"])
            .request()
            .unwrap_err();
        assert!(matches!(err, Error::UnknownField { field } if field == "bogus"));
    }

    #[test]
    fn changes_against_new_snapshot() {
        let query = MarketQuery::new("crystal", [42884]);
        let old = normalize(item_doc(42884, &[("a1", 123040)], 123040), query.clone()).unwrap();
        let new = normalize(
            item_doc(42884, &[("n1", 110000), ("n2", 123040), ("n3", 120000)], 110000),
            query,
        )
        .unwrap();

        let changes = price_changes(&old, &new);
        let change = &changes[&42884];

        assert_eq!(change.old_best_price, 123040);
        assert_eq!(change.new_best_price, 110000);
        assert_eq!(
            change
                .listings
                .iter()
                .map(|l| l.listing_id.as_str())
                .collect::<Vec<_>>(),
            vec!["n1", "n3"]
        );
    }

    #[test]
    fn changes_pair_by_id() {
        let old = normalize(crystal_document(), MarketQuery::default()).unwrap();
        let new = normalize(
            json!({"items": {"20": item_doc(20, &[("c1", 25000)], 25000)}}),
            MarketQuery::default(),
        )
        .unwrap();

        let changes = price_changes(&old, &new);

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[&20].old_best_price, 30000);
        assert_eq!(changes[&20].new_best_price, 25000);
        assert_eq!(changes[&20].listings.len(), 1);
    }
}
