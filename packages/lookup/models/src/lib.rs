#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Value types shared by the site lookup pipeline.
//!
//! Everything in this crate is request-scoped: a [`Coordinate`] comes in,
//! and zone, overlay, parcel, slope and geocode results go out. Nothing
//! here is persisted or shared between requests.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use thiserror::Error;

/// Approximate length of one degree of latitude, in metres.
pub const METRES_PER_DEGREE: f64 = 111_320.0;

/// Errors produced when building a [`Coordinate`] from caller input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    /// A required parameter was absent.
    #[error("{field} is required")]
    Missing {
        /// Parameter name (`lat` or `lng`).
        field: &'static str,
    },

    /// A parameter could not be parsed as a number.
    #[error("{field} must be a number, got '{value}'")]
    Unparsable {
        /// Parameter name (`lat` or `lng`).
        field: &'static str,
        /// The raw text supplied.
        value: String,
    },

    /// A value was NaN or infinite.
    #[error("{field} must be finite")]
    NonFinite {
        /// Parameter name (`lat` or `lng`).
        field: &'static str,
    },

    /// Latitude outside [-90, 90].
    #[error("lat must be between -90 and 90, got {0}")]
    LatitudeOutOfRange(f64),

    /// Longitude outside [-180, 180].
    #[error("lng must be between -180 and 180, got {0}")]
    LongitudeOutOfRange(f64),
}

/// A WGS84 latitude/longitude pair in degrees.
///
/// Always finite and within range; the only way to build one is through
/// [`Coordinate::new`] or [`Coordinate::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Validates and builds a coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError`] if either value is non-finite or out of
    /// range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() {
            return Err(CoordinateError::NonFinite { field: "lat" });
        }
        if !longitude.is_finite() {
            return Err(CoordinateError::NonFinite { field: "lng" });
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parses a coordinate from raw query-string values.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError`] if either value is missing, blank,
    /// unparsable, non-finite, or out of range.
    pub fn parse(lat: Option<&str>, lng: Option<&str>) -> Result<Self, CoordinateError> {
        let latitude = parse_component("lat", lat)?;
        let longitude = parse_component("lng", lng)?;
        Self::new(latitude, longitude)
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

fn parse_component(field: &'static str, raw: Option<&str>) -> Result<f64, CoordinateError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(CoordinateError::Missing { field })?;
    raw.parse::<f64>().map_err(|_| CoordinateError::Unparsable {
        field,
        value: raw.to_string(),
    })
}

/// An axis-aligned bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    /// Western edge (minimum longitude).
    pub xmin: f64,
    /// Southern edge (minimum latitude).
    pub ymin: f64,
    /// Eastern edge (maximum longitude).
    pub xmax: f64,
    /// Northern edge (maximum latitude).
    pub ymax: f64,
}

impl Envelope {
    /// Builds a square-ish envelope centred on `coord` with the given
    /// half-width in metres.
    ///
    /// Longitude spacing is corrected by `cos(latitude)`. This is a flat
    /// approximation that only holds at sub-kilometre scale.
    #[must_use]
    pub fn around_metres(coord: Coordinate, half_width_m: f64) -> Self {
        let dlat = half_width_m / METRES_PER_DEGREE;
        let cos_lat = coord.latitude().to_radians().cos().abs().max(1e-6);
        let dlng = half_width_m / (METRES_PER_DEGREE * cos_lat);
        Self::around(coord, dlng, dlat)
    }

    /// Builds an envelope centred on `coord` with the same half-width in
    /// degrees on both axes.
    #[must_use]
    pub fn around_degrees(coord: Coordinate, half_width_deg: f64) -> Self {
        Self::around(coord, half_width_deg, half_width_deg)
    }

    fn around(coord: Coordinate, dlng: f64, dlat: f64) -> Self {
        Self {
            xmin: coord.longitude() - dlng,
            ymin: coord.latitude() - dlat,
            xmax: coord.longitude() + dlng,
            ymax: coord.latitude() + dlat,
        }
    }

    /// Returns an `n × n` grid of `(lng, lat)` points spanning the
    /// envelope, corners included, in row-major order from the south-west.
    #[must_use]
    pub fn grid(&self, n: usize) -> Vec<(f64, f64)> {
        if n < 2 {
            return vec![(
                f64::midpoint(self.xmin, self.xmax),
                f64::midpoint(self.ymin, self.ymax),
            )];
        }
        #[allow(clippy::cast_precision_loss)]
        let steps = (n - 1) as f64;
        let dx = (self.xmax - self.xmin) / steps;
        let dy = (self.ymax - self.ymin) / steps;
        let mut points = Vec::with_capacity(n * n);
        for row in 0..n {
            for col in 0..n {
                #[allow(clippy::cast_precision_loss)]
                points.push((
                    dx.mul_add(col as f64, self.xmin),
                    dy.mul_add(row as f64, self.ymin),
                ));
            }
        }
        points
    }
}

/// Normalized planning-scheme zone for a location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneResult {
    /// Zone name with any trailing `" Zone"` removed.
    pub name: Option<String>,
    /// Short zone code (e.g., `"HDR"`).
    pub code: Option<String>,
    /// Precinct within the zone.
    pub precinct: Option<String>,
    /// Local plan / neighbourhood plan area.
    pub local_plan: Option<String>,
    /// Broader zone category (e.g., `"Residential"`).
    pub category: Option<String>,
}

/// Classification of a planning overlay layer.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum OverlayBucket {
    /// Flood hazard and inundation.
    Flood,
    /// Bushfire prone areas.
    Bushfire,
    /// State and local heritage.
    Heritage,
    /// Matters of environmental significance.
    Environment,
    /// Regulated vegetation.
    Vegetation,
    /// Wetland protection areas.
    Wetlands,
    /// Coastal hazard and erosion.
    Coastal,
}

/// An overlay layer that intersects the queried location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayHit {
    /// Human-readable layer name.
    pub layer_name: String,
    /// Bucket the layer belongs to.
    pub bucket: OverlayBucket,
    /// Raw attributes of the first intersecting feature.
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

/// A single cadastral lot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParcelResult {
    /// Lot number.
    pub lot: Option<String>,
    /// Plan number.
    pub plan: Option<String>,
    /// Combined lot/plan identifier.
    pub lot_plan: Option<String>,
    /// Lot area in square metres.
    pub area_sqm: Option<u64>,
    /// Tenure (e.g., `"Freehold"`).
    pub tenure: Option<String>,
    /// Local government area the lot is recorded against.
    pub lga: Option<String>,
    /// Suburb / locality.
    pub locality: Option<String>,
    /// Boundary rings as `[lng, lat]` pairs.
    pub geometry: Option<Vec<Vec<[f64; 2]>>>,
}

/// Slope classification thresholds, in ascending order.
///
/// Each entry is `(inclusive upper bound in percent, category)`.
const SLOPE_THRESHOLDS: &[(f64, SlopeCategory)] = &[
    (5.0, SlopeCategory::FlatToGentle),
    (10.0, SlopeCategory::Moderate),
    (15.0, SlopeCategory::Steep),
    (25.0, SlopeCategory::VerySteep),
];

/// Ordered slope labels.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum SlopeCategory {
    /// 5% or less.
    #[serde(rename = "Flat to gentle")]
    #[strum(serialize = "Flat to gentle")]
    FlatToGentle,
    /// Over 5% up to 10%.
    #[serde(rename = "Moderate slope")]
    #[strum(serialize = "Moderate slope")]
    Moderate,
    /// Over 10% up to 15%.
    #[serde(rename = "Steep")]
    #[strum(serialize = "Steep")]
    Steep,
    /// Over 15% up to 25%.
    #[serde(rename = "Very steep")]
    #[strum(serialize = "Very steep")]
    VerySteep,
    /// Over 25%.
    #[serde(rename = "Extreme")]
    #[strum(serialize = "Extreme")]
    Extreme,
    /// No usable elevation data.
    #[serde(rename = "Unknown")]
    #[strum(serialize = "Unknown")]
    Unknown,
}

impl SlopeCategory {
    /// Classifies an average slope percentage.
    ///
    /// `None` and non-finite values map to [`Self::Unknown`].
    #[must_use]
    pub fn from_percent(percent: Option<f64>) -> Self {
        let Some(p) = percent.filter(|p| p.is_finite()) else {
            return Self::Unknown;
        };
        SLOPE_THRESHOLDS
            .iter()
            .find(|(max, _)| p <= *max)
            .map_or(Self::Extreme, |(_, cat)| *cat)
    }
}

/// Average slope around a location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlopeResult {
    /// Mean slope in percent, rounded to one decimal place.
    pub average_slope_percent: Option<f64>,
    /// Category derived from the average.
    pub category: SlopeCategory,
}

impl SlopeResult {
    /// Builds a result from a raw average.
    ///
    /// The category is taken from the unrounded average; only the reported
    /// percentage is rounded.
    #[must_use]
    pub fn from_average(average: Option<f64>) -> Self {
        let average = average.filter(|p| p.is_finite());
        Self {
            average_slope_percent: average.map(|p| (p * 10.0).round() / 10.0),
            category: SlopeCategory::from_percent(average),
        }
    }

    /// The "no data" result.
    #[must_use]
    pub const fn unknown() -> Self {
        Self {
            average_slope_percent: None,
            category: SlopeCategory::Unknown,
        }
    }
}

/// A geocoder match for a free-text address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeCandidate {
    /// Canonical matched address.
    pub address: String,
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lng: f64,
    /// Match score, 0-100.
    pub score: f64,
    /// Suburb, if the geocoder reported one.
    pub suburb: Option<String>,
}
