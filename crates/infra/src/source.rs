use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

/// Failure to obtain the base item list.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("source answered with HTTP {0}")]
    Status(u16),

    #[error("response is not a JSON array of items: {0}")]
    Decode(String),

    #[error("source returned no items")]
    Empty,
}

/// Where the base item list comes from.
///
/// Only the number of items matters downstream; each item is kept as raw JSON.
/// Implementations are called from a worker thread and may block.
pub trait ProductSource: Send + Sync + 'static {
    fn fetch(&self) -> Result<Vec<Value>, SourceError>;

    /// Human-readable origin for logs.
    fn describe(&self) -> String;
}

/// Fetches a JSON array with a blocking GET.
#[derive(Debug, Clone)]
pub struct HttpProductSource {
    url: String,
    timeout: Option<Duration>,
}

impl HttpProductSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    // The blocking client owns its own runtime, so it is built on the calling
    // (worker) thread rather than up front.
    fn client(&self) -> Result<reqwest::blocking::Client, SourceError> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))
    }
}

impl ProductSource for HttpProductSource {
    fn fetch(&self) -> Result<Vec<Value>, SourceError> {
        info!(url = %self.url, "fetching product list");

        let response = self
            .client()?
            .get(&self.url)
            .send()
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let items: Vec<Value> = response.json().map_err(|e| {
            if e.is_decode() {
                SourceError::Decode(e.to_string())
            } else {
                SourceError::Transport(e.to_string())
            }
        })?;

        debug!(url = %self.url, items = items.len(), "product list received");
        non_empty(items)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// In-memory item list, for tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct StaticProductSource {
    items: Vec<Value>,
}

impl StaticProductSource {
    pub fn new(items: Vec<Value>) -> Self {
        Self { items }
    }

    /// `count` placeholder items shaped like `{"id": n}`.
    pub fn with_count(count: usize) -> Self {
        Self::new((1..=count).map(|id| serde_json::json!({ "id": id })).collect())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ProductSource for StaticProductSource {
    fn fetch(&self) -> Result<Vec<Value>, SourceError> {
        non_empty(self.items.clone())
    }

    fn describe(&self) -> String {
        format!("static({} items)", self.items.len())
    }
}

/// Always fails with the configured error.
#[derive(Debug, Clone)]
pub struct FailingProductSource {
    error: SourceError,
}

impl FailingProductSource {
    pub fn new(error: SourceError) -> Self {
        Self { error }
    }
}

impl ProductSource for FailingProductSource {
    fn fetch(&self) -> Result<Vec<Value>, SourceError> {
        Err(self.error.clone())
    }

    fn describe(&self) -> String {
        "failing".to_string()
    }
}

fn non_empty(items: Vec<Value>) -> Result<Vec<Value>, SourceError> {
    if items.is_empty() {
        Err(SourceError::Empty)
    } else {
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_source_returns_its_items() {
        let source = StaticProductSource::with_count(20);
        let items = source.fetch().unwrap();
        assert_eq!(items.len(), 20);
        assert_eq!(items[0]["id"], 1);
        assert_eq!(source.describe(), "static(20 items)");
    }

    #[test]
    fn empty_list_is_an_error() {
        let source = StaticProductSource::default();
        assert!(source.is_empty());
        assert_eq!(source.fetch().unwrap_err(), SourceError::Empty);
    }

    #[test]
    fn failing_source_reports_configured_error() {
        let source = FailingProductSource::new(SourceError::Status(503));
        assert_eq!(source.fetch().unwrap_err(), SourceError::Status(503));
        assert_eq!(
            SourceError::Status(503).to_string(),
            "source answered with HTTP 503"
        );
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        // Port 9 on loopback (discard) is closed on test machines.
        let source = HttpProductSource::new("http://127.0.0.1:9/products")
            .with_timeout(Some(Duration::from_secs(2)));
        assert_eq!(source.url(), "http://127.0.0.1:9/products");
        assert!(matches!(source.fetch(), Err(SourceError::Transport(_))));
    }
}
