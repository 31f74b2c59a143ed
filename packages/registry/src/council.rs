//! Per-council planning-scheme zoning layer definitions.

use serde::Deserialize;

/// A local government area with a known zoning layer.
#[derive(Debug, Clone, Deserialize)]
pub struct Council {
    /// Stable identifier (e.g., `"sunshine_coast"`).
    pub key: String,
    /// Display name (e.g., `"Sunshine Coast Council"`).
    pub name: String,
    /// Other spellings the boundary service may report.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Zoning layer for this council's planning scheme.
    pub zoning: ZoningLayer,
}

/// How to query a council's zoning layer and read its attributes.
#[derive(Debug, Clone, Deserialize)]
pub struct ZoningLayer {
    /// `ArcGIS` layer `query` endpoint.
    pub url: String,
    /// Attribute holding the zone name.
    pub zone_field: String,
    /// Attribute holding the zone code.
    #[serde(default)]
    pub code_field: Option<String>,
    /// Attribute holding the precinct.
    #[serde(default)]
    pub precinct_field: Option<String>,
    /// Attribute holding the local plan name.
    #[serde(default)]
    pub local_plan_field: Option<String>,
    /// Attribute holding the zone category.
    #[serde(default)]
    pub category_field: Option<String>,
    /// Query with a point or a small envelope.
    #[serde(default)]
    pub geometry: GeometryMode,
    /// Half-width of the envelope in metres when `geometry = "envelope"`.
    #[serde(default = "default_envelope_half_width_m")]
    pub envelope_half_width_m: f64,
    /// Spatial reference the layer expects query geometry in.
    #[serde(default)]
    pub spatial_reference: SpatialReference,
}

const fn default_envelope_half_width_m() -> f64 {
    5.0
}

/// Shape of the geometry sent to an upstream layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryMode {
    /// A single point.
    #[default]
    Point,
    /// A small bounding box around the point, for services that reject
    /// point-in-polygon queries.
    Envelope,
}

/// Spatial reference of query geometry, by EPSG well-known ID.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u32")]
pub enum SpatialReference {
    /// WGS84 geographic degrees (`4326`).
    #[default]
    Wgs84,
    /// Web Mercator metres (`3857`).
    WebMercator,
}

impl SpatialReference {
    /// The EPSG well-known ID.
    #[must_use]
    pub const fn wkid(self) -> u32 {
        match self {
            Self::Wgs84 => 4326,
            Self::WebMercator => 3857,
        }
    }
}

impl TryFrom<u32> for SpatialReference {
    type Error = String;

    fn try_from(wkid: u32) -> Result<Self, Self::Error> {
        match wkid {
            4326 => Ok(Self::Wgs84),
            3857 | 102_100 => Ok(Self::WebMercator),
            other => Err(format!("unsupported spatial reference {other}")),
        }
    }
}
