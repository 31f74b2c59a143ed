//! Shared upstream service endpoints and per-domain timeouts.

use std::time::Duration;

use serde::Deserialize;

/// Endpoints and settings loaded from `services.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServicesConfig {
    /// Council key queried by the regional zoning route.
    pub regional_zoning_council: String,
    /// Half-width of the envelope used for overlay queries, in metres.
    #[serde(default = "default_overlay_buffer_m")]
    pub overlay_buffer_m: f64,
    /// Local government area boundary layer.
    pub lga_boundary: LgaBoundaryConfig,
    /// State cadastre layer.
    pub cadastre: CadastreConfig,
    /// Elevation image service.
    pub elevation: ElevationConfig,
    /// Address geocoder.
    pub geocoder: GeocoderConfig,
    /// Per-domain request timeouts.
    #[serde(default)]
    pub timeouts: Timeouts,
}

const fn default_overlay_buffer_m() -> f64 {
    30.0
}

/// LGA boundary layer.
#[derive(Debug, Clone, Deserialize)]
pub struct LgaBoundaryConfig {
    /// `ArcGIS` layer `query` endpoint.
    pub url: String,
    /// Attribute holding the LGA name.
    pub field: String,
}

/// Cadastral parcel layer and its attribute names.
#[derive(Debug, Clone, Deserialize)]
pub struct CadastreConfig {
    /// `ArcGIS` layer `query` endpoint.
    pub url: String,
    /// Lot number attribute.
    pub lot_field: String,
    /// Plan number attribute.
    pub plan_field: String,
    /// Combined lot/plan attribute.
    pub lot_plan_field: String,
    /// Authoritative lot area attribute (square metres).
    pub area_field: String,
    /// Tenure attribute.
    pub tenure_field: String,
    /// LGA attribute.
    pub lga_field: String,
    /// Locality attribute.
    pub locality_field: String,
}

/// Elevation image service used for slope.
#[derive(Debug, Clone, Deserialize)]
pub struct ElevationConfig {
    /// `ImageServer` base URL (without `/identify`).
    pub url: String,
    /// Server-side raster function producing slope in percent.
    pub raster_function: String,
    /// Half-width in degrees of the fallback sample grid.
    #[serde(default = "default_sample_half_width_deg")]
    pub sample_half_width_deg: f64,
}

const fn default_sample_half_width_deg() -> f64 {
    0.0003
}

/// Address candidate geocoder.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocoderConfig {
    /// `findAddressCandidates` endpoint.
    pub url: String,
    /// ISO 3166 country code to restrict matches to.
    pub country_code: String,
    /// Maximum number of candidates to return.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
    /// Candidates scoring at or below this are dropped.
    #[serde(default = "default_min_score")]
    pub min_score: f64,
}

const fn default_max_candidates() -> usize {
    5
}

const fn default_min_score() -> f64 {
    60.0
}

/// Per-domain request timeouts in seconds.
#[derive(Debug, Clone, Deserialize)]
#[allow(clippy::struct_field_names)]
pub struct Timeouts {
    /// Council zoning layers.
    pub zoning_secs: u64,
    /// LGA boundary layer.
    pub lga_secs: u64,
    /// Each overlay layer.
    pub overlays_secs: u64,
    /// Cadastre.
    pub parcel_secs: u64,
    /// Elevation (each tier).
    pub slope_secs: u64,
    /// Geocoder.
    pub geocode_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            zoning_secs: 10,
            lga_secs: 10,
            overlays_secs: 8,
            parcel_secs: 10,
            slope_secs: 8,
            geocode_secs: 8,
        }
    }
}

impl Timeouts {
    /// Zoning layer timeout.
    #[must_use]
    pub const fn zoning(&self) -> Duration {
        Duration::from_secs(self.zoning_secs)
    }

    /// LGA boundary timeout.
    #[must_use]
    pub const fn lga(&self) -> Duration {
        Duration::from_secs(self.lga_secs)
    }

    /// Per-overlay-layer timeout.
    #[must_use]
    pub const fn overlays(&self) -> Duration {
        Duration::from_secs(self.overlays_secs)
    }

    /// Cadastre timeout.
    #[must_use]
    pub const fn parcel(&self) -> Duration {
        Duration::from_secs(self.parcel_secs)
    }

    /// Elevation timeout, applied to each tier separately.
    #[must_use]
    pub const fn slope(&self) -> Duration {
        Duration::from_secs(self.slope_secs)
    }

    /// Geocoder timeout.
    #[must_use]
    pub const fn geocode(&self) -> Duration {
        Duration::from_secs(self.geocode_secs)
    }
}
