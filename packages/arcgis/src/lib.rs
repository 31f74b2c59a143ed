#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Bounded-timeout `ArcGIS` REST client.
//!
//! Every upstream call in the lookup pipeline goes through the
//! [`Upstream`] trait: exactly one HTTP GET with a fixed timeout, no
//! retries. Transport errors, timeouts, non-2xx statuses, malformed JSON
//! and in-band `ArcGIS` `{"error": ...}` bodies are logged and collapse to
//! `None`, so callers only ever see "data" or "no data".
//!
//! [`query_features`] layers the `ArcGIS` `query` operation on top and
//! unwraps the `{"features": [{"attributes": ..., "geometry": ...}]}`
//! envelope.

pub mod geometry;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixture;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub use geometry::{GeometryType, QueryGeometry};

/// Errors from a single upstream request. Never returned past
/// [`Upstream::get_json`]; they only reach the logs.
#[derive(Debug, Error)]
pub enum ArcGisError {
    /// Transport failure or timeout.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("HTTP status {status}")]
    Status {
        /// Response status code.
        status: u16,
    },

    /// The body was not valid JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The service returned an in-band error object.
    #[error("Service error {code}: {message}")]
    Service {
        /// `ArcGIS` error code.
        code: i64,
        /// `ArcGIS` error message.
        message: String,
    },
}

/// A single-shot JSON GET against an upstream service.
///
/// Implementations must never panic or propagate errors: anything other
/// than a well-formed JSON body is `None`.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Performs one GET of `url` with `params` as the query string,
    /// abandoning it after `timeout`.
    async fn get_json(
        &self,
        url: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Option<Value>;
}

/// [`Upstream`] backed by a shared `reqwest` connection pool.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
}

impl HttpUpstream {
    /// Builds a client with this crate's user agent.
    ///
    /// # Errors
    ///
    /// Returns [`ArcGisError::Http`] if the TLS backend cannot be
    /// initialised.
    pub fn new() -> Result<Self, ArcGisError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("siteline/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch(
        &self,
        url: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<Value, ArcGisError> {
        let resp = self
            .client
            .get(url)
            .query(params)
            .timeout(timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ArcGisError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = resp.bytes().await?;
        let body: Value = serde_json::from_slice(&bytes)?;
        check_service_error(&body)?;
        Ok(body)
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn get_json(
        &self,
        url: &str,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Option<Value> {
        match self.fetch(url, params, timeout).await {
            Ok(body) => Some(body),
            Err(e) => {
                log::warn!("Upstream request to {url} failed: {e}");
                None
            }
        }
    }
}

/// `ArcGIS` reports many failures as HTTP 200 with an `error` object.
fn check_service_error(body: &Value) -> Result<(), ArcGisError> {
    let Some(err) = body.get("error") else {
        return Ok(());
    };
    Err(ArcGisError::Service {
        code: err.get("code").and_then(Value::as_i64).unwrap_or_default(),
        message: err
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string(),
    })
}

/// One feature from a `query` response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feature {
    /// Attribute map (field name -> value).
    pub attributes: Map<String, Value>,
    /// Raw `ArcGIS` geometry, when requested.
    pub geometry: Option<Value>,
}

impl Feature {
    /// Polygon rings as `[x, y]` pairs, if the geometry is a polygon.
    #[must_use]
    pub fn rings(&self) -> Option<Vec<Vec<[f64; 2]>>> {
        let rings = self.geometry.as_ref()?.get("rings")?.as_array()?;
        let parsed: Vec<Vec<[f64; 2]>> = rings
            .iter()
            .filter_map(|ring| {
                let points: Vec<[f64; 2]> = ring
                    .as_array()?
                    .iter()
                    .filter_map(|pt| {
                        let pt = pt.as_array()?;
                        Some([pt.first()?.as_f64()?, pt.get(1)?.as_f64()?])
                    })
                    .collect();
                (!points.is_empty()).then_some(points)
            })
            .collect();
        (!parsed.is_empty()).then_some(parsed)
    }
}

/// Extracts the features array from a `query` response body.
///
/// Features without an `attributes` object are skipped.
#[must_use]
pub fn parse_features(body: &Value) -> Vec<Feature> {
    body.get("features")
        .and_then(Value::as_array)
        .map(|features| {
            features
                .iter()
                .filter_map(|f| {
                    let attributes = f.get("attributes")?.as_object()?.clone();
                    let geometry = f.get("geometry").filter(|g| !g.is_null()).cloned();
                    Some(Feature {
                        attributes,
                        geometry,
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Parameters for a spatial `query` against one layer.
#[derive(Debug, Clone)]
pub struct LayerQuery<'a> {
    /// Geometry to intersect.
    pub geometry: &'a QueryGeometry,
    /// Comma-separated field list, or `"*"`.
    pub out_fields: &'a str,
    /// Whether to return feature geometry (in WGS84).
    pub return_geometry: bool,
    /// Request timeout.
    pub timeout: Duration,
}

impl<'a> LayerQuery<'a> {
    /// A query for all attributes and no geometry.
    #[must_use]
    pub const fn attributes(geometry: &'a QueryGeometry, timeout: Duration) -> Self {
        Self {
            geometry,
            out_fields: "*",
            return_geometry: false,
            timeout,
        }
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = self.geometry.query_params();
        params.push(("outFields", self.out_fields.to_string()));
        params.push(("returnGeometry", self.return_geometry.to_string()));
        if self.return_geometry {
            params.push(("outSR", "4326".to_string()));
        }
        params.push(("f", "json".to_string()));
        params
    }
}

/// Runs a spatial `query` and returns its features.
///
/// Returns `None` if the request fails or no features intersect.
pub async fn query_features(
    upstream: &dyn Upstream,
    url: &str,
    query: &LayerQuery<'_>,
) -> Option<Vec<Feature>> {
    let body = upstream.get_json(url, &query.params(), query.timeout).await?;
    let features = parse_features(&body);
    if features.is_empty() {
        log::debug!("No features from {url}");
        return None;
    }
    Some(features)
}

/// Runs a spatial `query` and returns the first feature's attributes.
pub async fn first_attributes(
    upstream: &dyn Upstream,
    url: &str,
    query: &LayerQuery<'_>,
) -> Option<Map<String, Value>> {
    query_features(upstream, url, query)
        .await?
        .into_iter()
        .next()
        .map(|f| f.attributes)
}
