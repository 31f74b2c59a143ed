#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Downstream collaborators of the lookup API.
//!
//! Two seams, each a trait with a REST-backed implementation and an
//! inert fallback chosen from the environment at startup:
//!
//! - [`EventSink`] records one [`SearchEvent`] per lookup. Recording is
//!   best-effort and never surfaces an error to the caller.
//! - [`IdentityVerifier`] resolves a bearer token to an [`Identity`].

pub mod identity;
pub mod sink;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum_macros::{AsRefStr, Display};
use thiserror::Error;

pub use identity::{
    AnonymousVerifier, Identity, IdentityVerifier, RestIdentityVerifier, verifier_from_env,
};
pub use sink::{EventSink, LogEventSink, RestEventSink, sink_from_env};

/// Errors talking to the events or auth backends.
///
/// These are logged by the implementations and never returned through
/// the traits.
#[derive(Debug, Error)]
pub enum EventError {
    /// Transport failure or timeout.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("HTTP status {status}: {body}")]
    Status {
        /// Response status code.
        status: u16,
        /// Response body, for the log.
        body: String,
    },
}

/// Which lookup produced a [`SearchEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SearchKind {
    /// Regional zoning.
    Zoning,
    /// State-wide zoning.
    ZoningState,
    /// Overlays.
    Overlays,
    /// Parcel.
    Parcel,
    /// Slope.
    Slope,
    /// Address geocoding.
    Geocode,
    /// Combined site report.
    SiteReport,
}

/// A flat record of one lookup, as stored by the events table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEvent {
    /// Lookup kind.
    pub kind: SearchKind,
    /// Request path.
    pub route: String,
    /// Latitude searched, for coordinate lookups.
    pub lat: Option<f64>,
    /// Longitude searched, for coordinate lookups.
    pub lng: Option<f64>,
    /// Address searched, for geocode lookups.
    pub address: Option<String>,
    /// Local government area the lookup resolved, when known.
    pub lga: Option<String>,
    /// Verified caller, when a valid token was presented.
    pub user_id: Option<String>,
    /// When the lookup happened.
    pub occurred_at: DateTime<Utc>,
}

impl SearchEvent {
    /// Starts an event for `route`, stamped now.
    #[must_use]
    pub fn new(kind: SearchKind, route: impl Into<String>) -> Self {
        Self {
            kind,
            route: route.into(),
            lat: None,
            lng: None,
            address: None,
            lga: None,
            user_id: None,
            occurred_at: Utc::now(),
        }
    }

    /// Sets the searched coordinate.
    #[must_use]
    pub const fn at(mut self, lat: f64, lng: f64) -> Self {
        self.lat = Some(lat);
        self.lng = Some(lng);
        self
    }

    /// Sets the searched address.
    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Sets the resolved LGA.
    #[must_use]
    pub fn lga(mut self, lga: Option<String>) -> Self {
        self.lga = lga;
        self
    }

    /// Sets the verified caller.
    #[must_use]
    pub fn user(mut self, identity: Option<&Identity>) -> Self {
        self.user_id = identity.map(|i| i.id.clone());
        self
    }
}
