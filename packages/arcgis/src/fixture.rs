//! In-memory [`Upstream`] for tests.
//!
//! Routes are matched by URL prefix in insertion order. A URL with no
//! matching route behaves like an unreachable service and yields `None`.
//! Every call is recorded so tests can assert on the parameters sent.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::Upstream;

/// A request observed by [`FixtureUpstream`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Requested URL.
    pub url: String,
    /// Query parameters in the order they were sent.
    pub params: Vec<(String, String)>,
    /// Timeout the caller asked for.
    pub timeout: Duration,
}

impl RecordedCall {
    /// Value of the first parameter named `name`.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Canned-response upstream.
#[derive(Debug, Default)]
pub struct FixtureUpstream {
    routes: Vec<(String, Value)>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FixtureUpstream {
    /// An upstream where every service is unreachable.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers any URL starting with `prefix` with `body`.
    #[must_use]
    pub fn with(mut self, prefix: &str, body: Value) -> Self {
        self.routes.push((prefix.to_string(), body));
        self
    }

    /// All calls made so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Calls whose URL starts with `prefix`.
    #[must_use]
    pub fn calls_to(&self, prefix: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.url.starts_with(prefix))
            .collect()
    }
}

#[async_trait]
impl Upstream for FixtureUpstream {
    async fn get_json(
        &self,
        url: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Option<Value> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                url: url.to_string(),
                params: params
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), v.clone()))
                    .collect(),
                timeout,
            });

        self.routes
            .iter()
            .find(|(prefix, _)| url.starts_with(prefix.as_str()))
            .map(|(_, body)| body.clone())
    }
}
