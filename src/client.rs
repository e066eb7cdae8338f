use std::{collections::BTreeMap, sync::Arc};

use arc_swap::ArcSwapOption;

use crate::{
    aggregated::AggregatedResponse,
    config::ClientConfig,
    least_recent::{LeastRecentResponse, RecentlyUpdatedItem, Selector},
    market::{self, ItemId, MarketQuery, PriceChange, ResponseSet},
    metrics::Metrics,
    region::{self, DataCenter, RegionKind, World},
    transport::{Request, Transport},
    Result,
};

/// Asynchronous client for the Universalis market board API.
///
/// The data center and world lists are fetched at most once and then served
/// from memory. Concurrent first calls may each fetch them; the lists are
/// identical so whichever store lands last is kept.
pub struct Client {
    config: ClientConfig,
    transport: Transport,
    data_centers: ArcSwapOption<Vec<DataCenter>>,
    worlds: ArcSwapOption<Vec<World>>,
}

/// Result of [`Client::compute_price_changes`].
#[derive(Debug, Clone, PartialEq)]
pub struct PriceChanges {
    /// The snapshot the changes were computed against, no longer live.
    pub previous: ResponseSet,
    pub changes: BTreeMap<ItemId, PriceChange>,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            transport: Transport::new(config.base_url.clone()),
            config,
            data_centers: ArcSwapOption::empty(),
            worlds: ArcSwapOption::empty(),
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.transport = self.transport.with_metrics(metrics);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn api_key(&self) -> Option<&str> {
        self.config.api_key.as_deref()
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Closes the HTTP session, the next request opens a new one.
    pub fn close(&self) {
        self.transport.close();
    }

    pub async fn data_centers(&self) -> Result<Arc<Vec<DataCenter>>> {
        if let Some(dcs) = self.data_centers.load_full() {
            return Ok(dcs);
        }

        tracing::debug!("Performing first cache of DCs");
        let dcs = Arc::new(
            self.transport
                .fetch::<Vec<DataCenter>>(&Request::data_centers())
                .await?,
        );
        self.data_centers.store(Some(dcs.clone()));
        Ok(dcs)
    }

    pub async fn worlds(&self) -> Result<Arc<Vec<World>>> {
        if let Some(worlds) = self.worlds.load_full() {
            return Ok(worlds);
        }

        tracing::debug!("Performing first cache of Worlds");
        let worlds = Arc::new(self.transport.fetch::<Vec<World>>(&Request::worlds()).await?);
        self.worlds.store(Some(worlds.clone()));
        Ok(worlds)
    }

    /// Lower-cased data center names.
    pub async fn data_center_names(&self) -> Result<Vec<String>> {
        Ok(self
            .data_centers()
            .await?
            .iter()
            .map(|dc| dc.name.to_lowercase())
            .collect())
    }

    /// Lower-cased data center name to the ids of its worlds.
    pub async fn data_center_worlds(&self) -> Result<BTreeMap<String, Vec<u32>>> {
        Ok(self
            .data_centers()
            .await?
            .iter()
            .map(|dc| (dc.name.to_lowercase(), dc.worlds.clone()))
            .collect())
    }

    /// Lower-cased world names.
    pub async fn world_names(&self) -> Result<Vec<String>> {
        Ok(self
            .worlds()
            .await?
            .iter()
            .map(|world| world.name.to_lowercase())
            .collect())
    }

    /// Checks that `name` is a region, data center or world Universalis knows.
    pub async fn validate_region(&self, name: &str) -> Result<RegionKind> {
        if region::REGIONS.contains(&name.to_lowercase().as_str()) {
            return Ok(RegionKind::Region);
        }

        let dcs = self.data_center_names().await?;
        let worlds = self.world_names().await?;
        region::classify(name, dcs.as_slice(), worlds.as_slice())
    }

    /// Aggregated market data for up to 100 items.
    #[tracing::instrument(skip(self))]
    pub async fn current_item_price_data(
        &self,
        region: &str,
        item_ids: &[ItemId],
    ) -> Result<AggregatedResponse> {
        self.validate_region(region).await?;
        self.transport
            .fetch(&Request::aggregated(region, item_ids))
            .await
    }

    /// Average sale price per item, see [`crate::aggregated::AggregatedItem::average_price`].
    #[tracing::instrument(skip(self))]
    pub async fn current_average_item_price(
        &self,
        region: &str,
        item_ids: &[ItemId],
        hq: bool,
    ) -> Result<BTreeMap<ItemId, Option<u64>>> {
        self.current_item_price_data(region, item_ids)
            .await?
            .average_prices(hq)
    }

    /// The least recently updated items of a world or data center.
    #[tracing::instrument(skip(self))]
    pub async fn least_recent_items(
        &self,
        world: Option<&str>,
        dc_name: Option<&str>,
        entries: Option<u32>,
    ) -> Result<Vec<RecentlyUpdatedItem>> {
        let request = Selector::from_options(world, dc_name)?.request(entries);
        let response: LeastRecentResponse = self.transport.fetch(&request).await?;
        Ok(response.items)
    }

    /// The raw `/{region}/{itemIds}` document, useful with a restricted field list
    /// that [`Client::market_data`] could not turn into complete items.
    #[tracing::instrument(skip(self))]
    pub async fn market_data_raw(&self, query: &MarketQuery) -> Result<serde_json::Value> {
        self.validate_region(&query.region).await?;
        self.transport.fetch_json(&query.request()?).await
    }

    /// Market board data for up to 100 items, normalized into a [`ResponseSet`].
    #[tracing::instrument(skip(self))]
    pub async fn market_data(&self, query: &MarketQuery) -> Result<ResponseSet> {
        let document = self.market_data_raw(query).await?;
        market::normalize(document, query.clone())
    }

    /// Sends `subject`'s query again, replaces `subject` with the new snapshot
    /// and reports per item which new listings beat the old best price.
    #[tracing::instrument(skip_all, fields(region = %subject.query().region))]
    pub async fn compute_price_changes(&self, subject: &mut ResponseSet) -> Result<PriceChanges> {
        let new = self.market_data(subject.query()).await?;
        let changes = market::price_changes(subject, &new);

        tracing::debug!(changed = changes.len(), "Computed price changes");

        let previous = std::mem::replace(subject, new);
        Ok(PriceChanges { previous, changes })
    }
}
