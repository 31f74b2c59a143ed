//! Slope lookups against the state elevation image service.
//!
//! Two tiers, each a single bounded request:
//!
//! 1. `identify` at the point through a slope raster function. One pixel,
//!    one value.
//! 2. If that yields nothing usable (service down, `"NoData"`, garbage),
//!    `getSamples` over a 3×3 grid on a small envelope and average the
//!    valid samples.
//!
//! If both tiers come back empty the result is the "Unknown" category
//! with a null average. Slope is supplementary context, so it never fails
//! the request.

use serde_json::{Value, json};
use siteline_arcgis::QueryGeometry;
use siteline_lookup_models::{Coordinate, Envelope, SlopeResult};
use siteline_registry::SpatialReference;

use crate::Resolver;

/// Points per side of the fallback sample grid.
const SAMPLE_GRID: usize = 3;

impl Resolver {
    /// Average slope around `coord`.
    pub async fn slope(&self, coord: Coordinate) -> SlopeResult {
        if let Some(value) = self.identify_slope(coord).await {
            return SlopeResult::from_average(Some(value));
        }
        log::debug!("Slope identify had no value at {coord:?}, sampling grid");

        if let Some(average) = self.sampled_slope(coord).await {
            return SlopeResult::from_average(Some(average));
        }
        log::debug!("Slope unavailable at {coord:?}");
        SlopeResult::unknown()
    }

    async fn identify_slope(&self, coord: Coordinate) -> Option<f64> {
        let services = self.registry().services();
        let elevation = &services.elevation;
        let geometry = QueryGeometry::point(coord, SpatialReference::Wgs84);

        let params = vec![
            ("geometry", geometry.json().to_string()),
            ("geometryType", geometry.geometry_type().as_str().to_string()),
            ("renderingRule", rendering_rule(&elevation.raster_function)),
            ("returnGeometry", "false".to_string()),
            ("returnCatalogItems", "false".to_string()),
            ("f", "json".to_string()),
        ];

        let url = format!("{}/identify", elevation.url);
        let body = self
            .upstream()
            .get_json(&url, &params, services.timeouts.slope())
            .await?;
        body.get("value").and_then(pixel_value)
    }

    async fn sampled_slope(&self, coord: Coordinate) -> Option<f64> {
        let services = self.registry().services();
        let elevation = &services.elevation;
        let grid =
            Envelope::around_degrees(coord, elevation.sample_half_width_deg).grid(SAMPLE_GRID);
        let geometry = QueryGeometry::multipoint(&grid, SpatialReference::Wgs84);

        let params = vec![
            ("geometry", geometry.json().to_string()),
            ("geometryType", geometry.geometry_type().as_str().to_string()),
            ("renderingRule", rendering_rule(&elevation.raster_function)),
            ("returnFirstValueOnly", "true".to_string()),
            ("f", "json".to_string()),
        ];

        let url = format!("{}/getSamples", elevation.url);
        let body = self
            .upstream()
            .get_json(&url, &params, services.timeouts.slope())
            .await?;
        average_samples(&body)
    }
}

fn rendering_rule(function: &str) -> String {
    json!({ "rasterFunction": function }).to_string()
}

/// Parses a raster pixel value.
///
/// Accepts numbers and numeric strings; rejects `"NoData"`, negatives and
/// non-finite values.
fn pixel_value(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (v.is_finite() && v >= 0.0).then_some(v)
}

/// Mean of the valid samples in a `getSamples` response.
fn average_samples(body: &Value) -> Option<f64> {
    let values: Vec<f64> = body
        .get("samples")?
        .as_array()?
        .iter()
        .filter_map(|s| s.get("value").and_then(pixel_value))
        .collect();
    if values.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let count = values.len() as f64;
    Some(values.iter().sum::<f64>() / count)
}
