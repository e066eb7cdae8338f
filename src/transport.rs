use std::sync::Arc;

use arc_swap::ArcSwapOption;
use serde::de::DeserializeOwned;

use crate::{metrics::Metrics, Error, Result};

mod params;
pub use params::{join_item_ids, Request, MAX_ITEM_IDS};

/// Owns the HTTP session and turns [`Request`]s into decoded JSON.
///
/// There are no retries or timeouts beyond reqwest's defaults, every failure
/// goes straight back to the caller.
pub struct Transport {
    base_url: String,
    session: ArcSwapOption<reqwest::Client>,
    metrics: Option<Metrics>,
}

impl Transport {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session: ArcSwapOption::empty(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Returns the current session, creating one if none exists or it was closed.
    ///
    /// Two callers racing here may both build a session; the last store wins
    /// and the other one is dropped once its request finishes.
    pub fn session(&self) -> Arc<reqwest::Client> {
        if let Some(session) = self.session.load_full() {
            return session;
        }

        tracing::debug!("Creating new HTTP session");
        let session = Arc::new(reqwest::Client::new());
        self.session.store(Some(session.clone()));
        session
    }

    /// Drops the session. The next request transparently opens a new one.
    pub fn close(&self) {
        self.session.store(None);
    }

    pub fn is_open(&self) -> bool {
        self.session.load().is_some()
    }

    pub fn url(&self, request: &Request) -> String {
        format!("{}{}", self.base_url, request.path)
    }

    /// Performs the request and decodes the body as arbitrary JSON.
    pub async fn fetch_json(&self, request: &Request) -> Result<serde_json::Value> {
        self.fetch(request).await
    }

    #[tracing::instrument(skip(self), fields(path = %request.path))]
    pub async fn fetch<T: DeserializeOwned>(&self, request: &Request) -> Result<T> {
        let url = self.url(request);
        tracing::debug!(query = ?request.query, "Sending endpoint request");

        let start_time = std::time::Instant::now();

        let resp = match self
            .session()
            .get(&url)
            .query(&request.query)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::error!("Sending Request: {:?}", e);
                self.observe(request, None, start_time);
                return Err(Error::Http(e));
            }
        };

        let status = resp.status().as_u16();
        let final_url = resp.url().to_string();

        if let Some(err) = Error::from_status(status, &final_url) {
            tracing::warn!(status, url = %final_url, "Non Success status");
            self.observe(request, Some(status), start_time);
            return Err(err);
        }

        let raw_content = resp.bytes().await;
        self.observe(request, Some(status), start_time);

        let raw_content = raw_content.map_err(|e| {
            tracing::error!("Getting response Bytes: {:?}", e);
            Error::Http(e)
        })?;

        tracing::debug!(elapsed = ?start_time.elapsed(), "{} code received", status);

        serde_json::from_slice(&raw_content).map_err(|e| {
            tracing::warn!("JSON data expected, but not received: {:?}", e);
            Error::MalformedResponse {
                url: final_url,
                source: e,
            }
        })
    }

    fn observe(&self, request: &Request, status: Option<u16>, start_time: std::time::Instant) {
        if let Some(metrics) = &self.metrics {
            metrics.observe(request.label, status, start_time.elapsed());
        }
    }
}
