//! Query geometry encoding for `ArcGIS` REST `query`, `identify` and
//! `getSamples` operations.
//!
//! Upstream layers disagree on what they accept: some answer point
//! intersections, some only return hits for an envelope, some want Web
//! Mercator rather than WGS84. [`QueryGeometry::for_mode`] picks the
//! encoding from a layer's registry entry; the result is passed verbatim
//! to the upstream client.

use serde_json::json;
use siteline_lookup_models::{Coordinate, Envelope};
use siteline_registry::{GeometryMode, SpatialReference};

/// Web Mercator half-circumference in metres.
const MERCATOR_EXTENT: f64 = 20_037_508.342_789_244;

/// Latitude beyond which Web Mercator is undefined.
const MERCATOR_MAX_LAT: f64 = 85.051_128_78;

/// `ArcGIS` geometry type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryType {
    /// `esriGeometryPoint`.
    Point,
    /// `esriGeometryEnvelope`.
    Envelope,
    /// `esriGeometryMultipoint`.
    Multipoint,
}

impl GeometryType {
    /// The REST API tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Point => "esriGeometryPoint",
            Self::Envelope => "esriGeometryEnvelope",
            Self::Multipoint => "esriGeometryMultipoint",
        }
    }
}

/// An encoded geometry plus the parameters that describe it.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryGeometry {
    json: String,
    geometry_type: GeometryType,
    spatial_reference: SpatialReference,
}

impl QueryGeometry {
    /// A single point.
    #[must_use]
    pub fn point(coord: Coordinate, sr: SpatialReference) -> Self {
        let (x, y) = project(coord.longitude(), coord.latitude(), sr);
        Self {
            json: json!({ "x": x, "y": y, "spatialReference": { "wkid": sr.wkid() } })
                .to_string(),
            geometry_type: GeometryType::Point,
            spatial_reference: sr,
        }
    }

    /// A bounding envelope.
    #[must_use]
    pub fn envelope(env: Envelope, sr: SpatialReference) -> Self {
        let (xmin, ymin) = project(env.xmin, env.ymin, sr);
        let (xmax, ymax) = project(env.xmax, env.ymax, sr);
        Self {
            json: json!({
                "xmin": xmin,
                "ymin": ymin,
                "xmax": xmax,
                "ymax": ymax,
                "spatialReference": { "wkid": sr.wkid() },
            })
            .to_string(),
            geometry_type: GeometryType::Envelope,
            spatial_reference: sr,
        }
    }

    /// A set of `(lng, lat)` points.
    #[must_use]
    pub fn multipoint(points: &[(f64, f64)], sr: SpatialReference) -> Self {
        let projected: Vec<[f64; 2]> = points
            .iter()
            .map(|&(lng, lat)| {
                let (x, y) = project(lng, lat, sr);
                [x, y]
            })
            .collect();
        Self {
            json: json!({ "points": projected, "spatialReference": { "wkid": sr.wkid() } })
                .to_string(),
            geometry_type: GeometryType::Multipoint,
            spatial_reference: sr,
        }
    }

    /// Encodes `coord` the way a layer's registry entry asks for.
    ///
    /// `half_width_m` is only used for [`GeometryMode::Envelope`].
    #[must_use]
    pub fn for_mode(
        coord: Coordinate,
        mode: GeometryMode,
        half_width_m: f64,
        sr: SpatialReference,
    ) -> Self {
        match mode {
            GeometryMode::Point => Self::point(coord, sr),
            GeometryMode::Envelope => {
                Self::envelope(Envelope::around_metres(coord, half_width_m), sr)
            }
        }
    }

    /// Encoded geometry JSON.
    #[must_use]
    pub fn json(&self) -> &str {
        &self.json
    }

    /// Geometry type tag.
    #[must_use]
    pub const fn geometry_type(&self) -> GeometryType {
        self.geometry_type
    }

    /// Spatial reference of the encoded coordinates.
    #[must_use]
    pub const fn spatial_reference(&self) -> SpatialReference {
        self.spatial_reference
    }

    /// Query-string parameters for a spatial intersection query.
    #[must_use]
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("geometry", self.json.clone()),
            ("geometryType", self.geometry_type.as_str().to_string()),
            ("inSR", self.spatial_reference.wkid().to_string()),
            ("spatialRel", "esriSpatialRelIntersects".to_string()),
        ]
    }
}

/// Projects a WGS84 position into `sr`.
fn project(lng: f64, lat: f64, sr: SpatialReference) -> (f64, f64) {
    match sr {
        SpatialReference::Wgs84 => (lng, lat),
        SpatialReference::WebMercator => {
            let lat = lat.clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT);
            let x = lng * MERCATOR_EXTENT / 180.0;
            let y = ((90.0 + lat).to_radians() / 2.0).tan().ln() * MERCATOR_EXTENT
                / std::f64::consts::PI;
            (x, y)
        }
    }
}
