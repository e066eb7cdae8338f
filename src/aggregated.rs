use std::collections::BTreeMap;

use crate::Result;

mod data;
pub use data::{
    AggregatedItem, AggregatedResponse, PricePoint, QualityStats, Velocity, WorldUploadTime,
};

impl QualityStats {
    /// The average sale price, if Universalis has one for any scope.
    ///
    /// A present but unrecognized scope object fails with
    /// [`crate::Error::UnresolvedRegionData`].
    pub fn average_sale_price(&self) -> Result<Option<f64>> {
        match &self.average_sale_price {
            Some(scoped) if !scoped.is_empty() => Ok(Some(scoped.resolve()?.price)),
            _ => Ok(None),
        }
    }
}

impl AggregatedItem {
    /// Average sale price rounded to the nearest gil, ties to even.
    ///
    /// Falls back to NQ when HQ is asked for but unavailable, e.g. for
    /// gatherables. `None` if neither tier has data.
    pub fn average_price(&self, hq: bool) -> Result<Option<u64>> {
        let hq_price = if hq {
            self.hq.average_sale_price()?
        } else {
            None
        };

        let price = match hq_price {
            Some(price) => Some(price),
            None => self.nq.average_sale_price()?,
        };

        Ok(price.map(|p| p.round_ties_even() as u64))
    }
}

impl AggregatedResponse {
    pub fn average_prices(&self, hq: bool) -> Result<BTreeMap<u64, Option<u64>>> {
        if !self.failed_items.is_empty() {
            tracing::info!(
                failed_items = ?self.failed_items,
                "Couldn't find information for all item ids"
            );
        }

        let mut avg_prices = BTreeMap::new();
        for item in &self.results {
            let price = item.average_price(hq)?;
            if price.is_none() {
                tracing::info!(item = item.item_id, "No average price data for item");
            }
            avg_prices.insert(item.item_id, price);
        }

        Ok(avg_prices)
    }
}
