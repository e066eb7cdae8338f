use std::time::Duration;

/// Request metrics for a [`crate::Client`], registered on a caller owned registry.
#[derive(Debug, Clone)]
pub struct Metrics {
    requests: prometheus::IntCounterVec,
    request_duration: prometheus::HistogramVec,
}

impl Metrics {
    pub fn new(registry: &prometheus::Registry) -> prometheus::Result<Self> {
        let requests = prometheus::IntCounterVec::new(
            prometheus::Opts::new(
                "universalis_requests_total",
                "The number of requests sent to Universalis",
            ),
            &["endpoint", "status"],
        )?;
        registry.register(Box::new(requests.clone()))?;

        let request_duration = prometheus::HistogramVec::new(
            prometheus::HistogramOpts::new(
                "universalis_request_duration_seconds",
                "How long a Universalis request took until its body was read",
            ),
            &["endpoint"],
        )?;
        registry.register(Box::new(request_duration.clone()))?;

        Ok(Self {
            requests,
            request_duration,
        })
    }

    /// `status` is `None` when no response came back at all.
    pub(crate) fn observe(&self, endpoint: &str, status: Option<u16>, elapsed: Duration) {
        let status = status.map(|s| s.to_string());
        let status = status.as_deref().unwrap_or("error");

        self.requests
            .with_label_values(&[endpoint, status])
            .inc();
        self.request_duration
            .with_label_values(&[endpoint])
            .observe(elapsed.as_secs_f64());
    }
}
