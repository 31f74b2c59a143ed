#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the siteline server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the resolver's result types so the wire contract (field names,
//! which nulls are emitted, degraded-case messages) can evolve on its own.

use serde::{Deserialize, Serialize};
use siteline_lookup::{RegionalZoning, SiteReport, StateZoning};
use siteline_lookup_models::{
    Coordinate, CoordinateError, GeocodeCandidate, OverlayBucket, OverlayHit, ParcelResult,
    SlopeResult, ZoneResult,
};

/// `lat`/`lng` query parameters.
///
/// Kept as raw strings so a malformed value becomes a JSON 400 from the
/// handler rather than the framework's plain-text rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoordinateParams {
    /// Latitude in decimal degrees.
    pub lat: Option<String>,
    /// Longitude in decimal degrees.
    pub lng: Option<String>,
}

impl CoordinateParams {
    /// Validates the pair into a [`Coordinate`].
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError`] if either value is missing, malformed or
    /// out of range.
    pub fn coordinate(&self) -> Result<Coordinate, CoordinateError> {
        Coordinate::parse(self.lat.as_deref(), self.lng.as_deref())
    }
}

/// Query parameters for the overlays endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverlayParams {
    /// Latitude in decimal degrees.
    pub lat: Option<String>,
    /// Longitude in decimal degrees.
    pub lng: Option<String>,
    /// Comma-separated bucket names to restrict the lookup to.
    pub buckets: Option<String>,
}

impl OverlayParams {
    /// Validates the pair into a [`Coordinate`].
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError`] if either value is missing, malformed or
    /// out of range.
    pub fn coordinate(&self) -> Result<Coordinate, CoordinateError> {
        Coordinate::parse(self.lat.as_deref(), self.lng.as_deref())
    }

    /// Parses the bucket filter. `Ok(None)` means "all buckets".
    ///
    /// # Errors
    ///
    /// Returns the offending name if any bucket is unknown.
    pub fn buckets(&self) -> Result<Option<Vec<OverlayBucket>>, String> {
        let Some(raw) = self.buckets.as_deref().filter(|s| !s.trim().is_empty()) else {
            return Ok(None);
        };
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<OverlayBucket>().map_err(|_| s.to_string()))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

/// Query parameters for the geocode endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeocodeParams {
    /// Free-text address.
    pub address: Option<String>,
}

/// Error body for 4xx and 5xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// One-line description.
    pub error: String,
}

impl ApiError {
    /// Creates an error body.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// `GET /api/zoning`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiRegionalZoning {
    /// Normalized zone.
    pub zone: Option<ZoneResult>,
    /// Reason the zone is null.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<RegionalZoning> for ApiRegionalZoning {
    fn from(value: RegionalZoning) -> Self {
        Self {
            zone: value.zone,
            message: value.message,
        }
    }
}

/// `GET /api/zoning-qld`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiStateZoning {
    /// Normalized zone.
    pub zone: Option<ZoneResult>,
    /// Local government area.
    pub lga: Option<String>,
}

impl From<StateZoning> for ApiStateZoning {
    fn from(value: StateZoning) -> Self {
        Self {
            zone: value.zone,
            lga: value.lga,
        }
    }
}

/// `GET /api/overlays-qld`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiOverlays {
    /// Intersecting overlay layers.
    pub overlays: Vec<OverlayHit>,
}

/// `GET /api/parcel`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiParcel {
    /// The lot at the location.
    pub parcel: Option<ParcelResult>,
    /// Reason the parcel is null.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `GET /api/slope`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSlope {
    /// Average slope and category.
    pub slope: SlopeResult,
}

/// `GET /api/geocode`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiGeocode {
    /// Matching addresses, best first.
    pub candidates: Vec<GeocodeCandidate>,
}

/// `GET /api/site-report`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSiteReport {
    /// Normalized zone.
    pub zone: Option<ZoneResult>,
    /// Local government area.
    pub lga: Option<String>,
    /// Intersecting overlay layers.
    pub overlays: Vec<OverlayHit>,
    /// The lot at the location.
    pub parcel: Option<ParcelResult>,
    /// Average slope and category.
    pub slope: SlopeResult,
}

impl From<SiteReport> for ApiSiteReport {
    fn from(report: SiteReport) -> Self {
        Self {
            zone: report.zoning.zone,
            lga: report.zoning.lga,
            overlays: report.overlays,
            parcel: report.parcel,
            slope: report.slope,
        }
    }
}

/// A registered council, as listed by `GET /api/registry/councils`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCouncil {
    /// Registry key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Alternative LGA spellings that resolve to this council.
    pub aliases: Vec<String>,
}

/// A verified caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiUser {
    /// User id.
    pub id: String,
    /// Email address.
    pub email: Option<String>,
}

/// `GET /api/me`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMe {
    /// The caller, or null when anonymous.
    pub user: Option<ApiUser>,
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn parses_bucket_filter() {
        let params = OverlayParams {
            buckets: Some("flood, Heritage".to_string()),
            ..OverlayParams::default()
        };
        assert_eq!(
            params.buckets(),
            Ok(Some(vec![OverlayBucket::Flood, OverlayBucket::Heritage]))
        );

        let params = OverlayParams {
            buckets: Some("flood,lava".to_string()),
            ..OverlayParams::default()
        };
        assert_eq!(params.buckets(), Err("lava".to_string()));

        assert_eq!(OverlayParams::default().buckets(), Ok(None));
    }

    #[test]
    fn regional_zoning_omits_message_on_hit() {
        let hit = ApiRegionalZoning {
            zone: Some(ZoneResult {
                name: Some("Rural".to_string()),
                ..ZoneResult::default()
            }),
            message: None,
        };
        let value = serde_json::to_value(hit).unwrap();
        assert!(value.get("message").is_none());
        assert_eq!(value["zone"]["name"], "Rural");
        assert_eq!(value["zone"]["localPlan"], json!(null));
    }

    #[test]
    fn state_zoning_always_emits_both_fields() {
        let value = serde_json::to_value(ApiStateZoning::from(StateZoning::default())).unwrap();
        assert_eq!(value, json!({ "zone": null, "lga": null }));
    }

    #[test]
    fn coordinate_params_validate() {
        let params = CoordinateParams {
            lat: Some("-27.47".to_string()),
            lng: Some("153.02".to_string()),
        };
        assert!(params.coordinate().is_ok());
        assert!(CoordinateParams::default().coordinate().is_err());
    }
}
