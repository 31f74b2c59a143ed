//! State-wide planning overlay lookups.
//!
//! Every configured layer is queried concurrently with the same buffered
//! envelope. All queries are awaited; a layer that fails or has no hit is
//! dropped from the result without affecting its siblings.

use futures::future::join_all;
use siteline_arcgis::{LayerQuery, QueryGeometry, first_attributes};
use siteline_lookup_models::{Coordinate, Envelope, OverlayBucket, OverlayHit};
use siteline_registry::SpatialReference;

use crate::Resolver;

impl Resolver {
    /// Returns every overlay layer intersecting a buffer around `coord`.
    ///
    /// When `buckets` is given, only layers in those buckets are queried.
    /// Hits are returned in configured layer order.
    pub async fn overlays(
        &self,
        coord: Coordinate,
        buckets: Option<&[OverlayBucket]>,
    ) -> Vec<OverlayHit> {
        let services = self.registry().services();
        let geometry = QueryGeometry::envelope(
            Envelope::around_metres(coord, services.overlay_buffer_m),
            SpatialReference::Wgs84,
        );
        let timeout = services.timeouts.overlays();
        let upstream = self.upstream();

        let layers = self
            .registry()
            .overlays()
            .iter()
            .filter(|layer| buckets.is_none_or(|b| b.contains(&layer.bucket)));

        let lookups = layers.map(|layer| {
            let geometry = &geometry;
            async move {
                let query = LayerQuery::attributes(geometry, timeout);
                let attributes = first_attributes(upstream, &layer.url, &query).await?;
                Some(OverlayHit {
                    layer_name: layer.name.clone(),
                    bucket: layer.bucket,
                    attributes,
                })
            }
        });

        let hits: Vec<OverlayHit> = join_all(lookups).await.into_iter().flatten().collect();
        log::debug!("{} overlay hit(s) at {coord:?}", hits.len());
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use siteline_arcgis::fixture::FixtureUpstream;

    use crate::test_support::{FIRE_URL, FLOOD_URL, HERITAGE_URL, resolver, site};

    #[tokio::test]
    async fn collects_hits_and_skips_misses() {
        let (resolver, upstream) = resolver(
            FixtureUpstream::new()
                .with(
                    FLOOD_URL,
                    json!({ "features": [{ "attributes": { "HAZARD": "High" } }] }),
                )
                .with(FIRE_URL, json!({ "features": [] }))
                .with(
                    HERITAGE_URL,
                    json!({ "features": [{ "attributes": { "PLACE_NAME": "Old Mill" } }] }),
                ),
        );

        let hits = resolver.overlays(site(), None).await;
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].layer_name, "Flood hazard area");
        assert_eq!(hits[0].bucket, OverlayBucket::Flood);
        assert_eq!(hits[0].attributes["HAZARD"], "High");
        assert_eq!(hits[1].bucket, OverlayBucket::Heritage);

        // Every layer was queried, each with a buffered envelope.
        let calls = upstream.calls();
        assert_eq!(calls.len(), 3);
        for call in &calls {
            assert_eq!(call.param("geometryType"), Some("esriGeometryEnvelope"));
            assert_eq!(call.timeout.as_secs(), 8);
        }
    }

    #[tokio::test]
    async fn all_layers_failing_is_empty() {
        let (resolver, upstream) = resolver(FixtureUpstream::new());
        assert!(resolver.overlays(site(), None).await.is_empty());
        assert_eq!(upstream.calls().len(), 3);
    }

    #[tokio::test]
    async fn bucket_filter_limits_queries() {
        let (resolver, upstream) = resolver(FixtureUpstream::new().with(
            FLOOD_URL,
            json!({ "features": [{ "attributes": { "HAZARD": "Low" } }] }),
        ));

        let hits = resolver
            .overlays(site(), Some(&[OverlayBucket::Bushfire]))
            .await;
        assert!(hits.is_empty());
        assert_eq!(upstream.calls().len(), 1);
        assert!(upstream.calls_to(FIRE_URL).len() == 1);

        let hits = resolver.overlays(site(), Some(&[])).await;
        assert!(hits.is_empty());
        assert_eq!(upstream.calls().len(), 1);
    }
}
