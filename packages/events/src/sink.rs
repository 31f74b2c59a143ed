//! Search event sinks.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::{EventError, SearchEvent};

/// Default table name for search events.
pub const DEFAULT_TABLE: &str = "search_events";

const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Destination for search events.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Records `event`. Failures are logged, never returned.
    async fn record(&self, event: SearchEvent);
}

/// Writes events to a PostgREST-style table endpoint.
#[derive(Debug, Clone)]
pub struct RestEventSink {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl RestEventSink {
    /// Creates a sink that inserts into `{base_url}/{table}`.
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str, api_key: String, table: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/{table}", base_url.trim_end_matches('/')),
            api_key,
        }
    }

    /// Reads `SITELINE_EVENTS_URL`, `SITELINE_EVENTS_KEY` and the optional
    /// `SITELINE_EVENTS_TABLE`. `None` if either required variable is
    /// unset.
    #[must_use]
    pub fn from_env(client: reqwest::Client) -> Option<Self> {
        let url = std::env::var("SITELINE_EVENTS_URL").ok()?;
        let key = std::env::var("SITELINE_EVENTS_KEY").ok()?;
        let table =
            std::env::var("SITELINE_EVENTS_TABLE").unwrap_or_else(|_| DEFAULT_TABLE.to_string());
        Some(Self::new(client, &url, key, &table))
    }

    /// The insert endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Inserts one row.
    ///
    /// # Errors
    ///
    /// * [`EventError::Http`] on transport failure or timeout
    /// * [`EventError::Status`] if the backend rejects the row
    pub async fn insert(&self, event: &SearchEvent) -> Result<(), EventError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Prefer", "return=minimal")
            .timeout(WRITE_TIMEOUT)
            .json(event)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(EventError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl EventSink for RestEventSink {
    async fn record(&self, event: SearchEvent) {
        if let Err(e) = self.insert(&event).await {
            log::warn!("Failed to record {} event: {e}", event.kind);
        }
    }
}

/// Logs events instead of storing them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEventSink;

#[async_trait]
impl EventSink for LogEventSink {
    async fn record(&self, event: SearchEvent) {
        log::debug!(
            "search event: kind={} route={} lga={:?}",
            event.kind,
            event.route,
            event.lga
        );
    }
}

/// The REST sink if configured, otherwise the log sink.
#[must_use]
pub fn sink_from_env(client: reqwest::Client) -> Arc<dyn EventSink> {
    match RestEventSink::from_env(client) {
        Some(sink) => {
            log::info!("Recording search events to {}", sink.endpoint());
            Arc::new(sink)
        }
        None => {
            log::info!("SITELINE_EVENTS_URL/SITELINE_EVENTS_KEY not set, logging search events");
            Arc::new(LogEventSink)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::SearchKind;

    #[test]
    fn joins_table_onto_base_url() {
        let sink = RestEventSink::new(
            reqwest::Client::new(),
            "https://db.example/rest/v1/",
            "k".to_string(),
            DEFAULT_TABLE,
        );
        assert_eq!(sink.endpoint(), "https://db.example/rest/v1/search_events");
    }

    #[tokio::test]
    async fn unreachable_backend_is_an_error_but_record_swallows_it() {
        let sink = RestEventSink::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9",
            "k".to_string(),
            "events",
        );
        let event = SearchEvent::new(SearchKind::Slope, "/api/slope").at(-27.0, 153.0);

        assert!(sink.insert(&event).await.is_err());
        sink.record(event).await;
    }

    #[tokio::test]
    async fn log_sink_accepts_events() {
        LogEventSink
            .record(SearchEvent::new(SearchKind::Geocode, "/api/geocode").address("1 Main St"))
            .await;
    }
}
