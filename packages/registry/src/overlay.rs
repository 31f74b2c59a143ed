//! State-wide planning overlay layer descriptors.

use serde::Deserialize;
use siteline_lookup_models::OverlayBucket;

/// A single overlay layer queried for every site.
#[derive(Debug, Clone, Deserialize)]
pub struct OverlayLayer {
    /// Stable identifier (e.g., `"flood_hazard"`).
    pub id: String,
    /// Human-readable layer name.
    pub name: String,
    /// `ArcGIS` layer `query` endpoint.
    pub url: String,
    /// Bucket the layer is reported under.
    pub bucket: OverlayBucket,
}

/// Top-level shape of `overlays.toml`.
#[derive(Debug, Deserialize)]
pub(crate) struct OverlayFile {
    #[serde(rename = "layer", default)]
    pub layers: Vec<OverlayLayer>,
}
