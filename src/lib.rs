//! Client for the [Universalis](https://universalis.app) market board API.
//!
//! ```no_run
//! # async fn run() -> universalis::Result<()> {
//! let client = universalis::Client::new();
//!
//! let query = universalis::MarketQuery::new("crystal", [42884, 20]);
//! let mut prices = client.market_data(&query).await?;
//! for (item_id, item) in prices.items() {
//!     println!("{}: {}", item_id, item.best_price());
//! }
//!
//! let changes = client.compute_price_changes(&mut prices).await?;
//! for change in changes.changes.values() {
//!     println!("{} -> {}", change.old_best_price, change.new_best_price);
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregated;
pub mod client;
pub mod config;
pub mod error;
pub mod least_recent;
pub mod market;
pub mod metrics;
pub mod region;
pub mod transport;

pub use client::{Client, PriceChanges};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use market::{ItemId, ItemView, MarketQuery, PriceChange, ResponseSet};
pub use metrics::Metrics;
pub use region::RegionKind;
