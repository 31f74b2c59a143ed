//! Planning-scheme zoning lookups.
//!
//! The state-wide route is two-step: find which local government area
//! the point is in, then query that council's zoning layer using the
//! geometry encoding and field names its registry entry specifies. The
//! regional route skips the first step and always queries one configured
//! council.

use siteline_arcgis::{LayerQuery, QueryGeometry, first_attributes};
use siteline_lookup_models::{Coordinate, ZoneResult};
use siteline_registry::{Council, SpatialReference};

use crate::normalize::{lga_name, normalize_zone};
use crate::{LookupError, Resolver};

/// Message returned when the regional zoning layer has no hit.
pub const NO_ZONE_MESSAGE: &str = "No zoning found for this location";

/// Result of the state-wide zoning lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateZoning {
    /// Normalized zone, if the council's layer had a hit.
    pub zone: Option<ZoneResult>,
    /// Local government area containing the point.
    ///
    /// The registered council's display name when the area matches a
    /// council, otherwise the name exactly as the boundary service
    /// reported it.
    pub lga: Option<String>,
}

/// Result of the regional zoning lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionalZoning {
    /// Normalized zone, if the layer had a hit.
    pub zone: Option<ZoneResult>,
    /// Human-readable reason when `zone` is `None`.
    pub message: Option<String>,
}

impl Resolver {
    /// Finds the name of the local government area containing `coord`.
    ///
    /// Returns `None` outside every LGA or when the boundary service is
    /// unavailable.
    pub async fn resolve_lga(&self, coord: Coordinate) -> Option<String> {
        let services = self.registry().services();
        let boundary = &services.lga_boundary;
        let geometry = QueryGeometry::point(coord, SpatialReference::Wgs84);
        let query = LayerQuery::attributes(&geometry, services.timeouts.lga());

        let attrs = first_attributes(self.upstream(), &boundary.url, &query).await?;
        let name = lga_name(&attrs, &boundary.field);
        if name.is_none() {
            log::debug!("LGA boundary hit without a name attribute at {coord:?}");
        }
        name
    }

    /// Queries one council's zoning layer at `coord`.
    pub async fn council_zone(&self, council: &Council, coord: Coordinate) -> Option<ZoneResult> {
        let layer = &council.zoning;
        let geometry = QueryGeometry::for_mode(
            coord,
            layer.geometry,
            layer.envelope_half_width_m,
            layer.spatial_reference,
        );
        let query = LayerQuery::attributes(&geometry, self.registry().services().timeouts.zoning());

        let attrs = first_attributes(self.upstream(), &layer.url, &query).await?;
        Some(normalize_zone(&attrs, layer))
    }

    /// State-wide zoning: LGA first, then the council's zoning layer.
    ///
    /// Never fails. Outside any LGA this is `{zone: None, lga: None}`; an
    /// LGA with no registered council or no zoning hit is
    /// `{zone: None, lga: Some(..)}`.
    pub async fn zoning_state(&self, coord: Coordinate) -> StateZoning {
        let Some(lga) = self.resolve_lga(coord).await else {
            return StateZoning::default();
        };

        let Some(council) = self.registry().find_council(&lga) else {
            log::info!("LGA '{lga}' has no registered zoning layer");
            return StateZoning {
                zone: None,
                lga: Some(lga),
            };
        };

        let zone = self.council_zone(council, coord).await;
        StateZoning {
            zone,
            lga: Some(council.name.clone()),
        }
    }

    /// Regional zoning against the configured regional council.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::MissingRegionalCouncil`] if the registry has
    /// no council for the regional route. Upstream failures are reported
    /// through [`RegionalZoning::message`] instead.
    pub async fn zoning_regional(&self, coord: Coordinate) -> Result<RegionalZoning, LookupError> {
        let council =
            self.registry()
                .regional_council()
                .ok_or_else(|| LookupError::MissingRegionalCouncil {
                    key: self.registry().services().regional_zoning_council.clone(),
                })?;

        Ok(match self.council_zone(council, coord).await {
            Some(zone) => RegionalZoning {
                zone: Some(zone),
                message: None,
            },
            None => RegionalZoning {
                zone: None,
                message: Some(NO_ZONE_MESSAGE.to_string()),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use siteline_arcgis::fixture::FixtureUpstream;

    use std::sync::Arc;

    use crate::test_support::{
        ALPHA_URL, BETA_URL, LGA_URL, registry_without_regional_council, resolver, site,
    };

    #[tokio::test]
    async fn resolves_zone_through_lga() {
        let (resolver, upstream) = resolver(
            FixtureUpstream::new()
                .with(
                    LGA_URL,
                    json!({ "features": [{ "attributes": { "lga": "ALPHA REGIONAL" } }] }),
                )
                .with(
                    ALPHA_URL,
                    json!({ "features": [{ "attributes": {
                        "LABEL": "High Density Residential Zone",
                        "ZONE_CODE": "HDR"
                    } }] }),
                ),
        );

        let result = resolver.zoning_state(site()).await;
        assert_eq!(result.lga.as_deref(), Some("Alpha Regional Council"));
        let zone = result.zone.unwrap();
        assert_eq!(zone.name.as_deref(), Some("High Density Residential"));
        assert_eq!(zone.code.as_deref(), Some("HDR"));

        let calls = upstream.calls_to(ALPHA_URL);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].param("geometryType"), Some("esriGeometryPoint"));
    }

    #[tokio::test]
    async fn uses_council_specific_geometry() {
        let (resolver, upstream) = resolver(
            FixtureUpstream::new()
                .with(
                    LGA_URL,
                    json!({ "features": [{ "attributes": { "lga": "Beta" } }] }),
                )
                .with(
                    BETA_URL,
                    json!({ "features": [{ "attributes": { "ZONE_DESC": "Centre zone", "PREC": "Core" } }] }),
                ),
        );

        let result = resolver.zoning_state(site()).await;
        assert_eq!(result.lga.as_deref(), Some("Beta City Council"));
        let zone = result.zone.unwrap();
        assert_eq!(zone.name.as_deref(), Some("Centre"));
        assert_eq!(zone.precinct.as_deref(), Some("Core"));

        let call = &upstream.calls_to(BETA_URL)[0];
        assert_eq!(call.param("geometryType"), Some("esriGeometryEnvelope"));
        assert_eq!(call.param("inSR"), Some("3857"));
    }

    #[tokio::test]
    async fn outside_every_lga_is_null_null() {
        let (resolver, upstream) =
            resolver(FixtureUpstream::new().with(LGA_URL, json!({ "features": [] })));

        let result = resolver.zoning_state(site()).await;
        assert_eq!(result, StateZoning::default());
        assert!(upstream.calls_to(ALPHA_URL).is_empty());
    }

    #[tokio::test]
    async fn boundary_service_down_is_null_null() {
        let (resolver, _) = resolver(FixtureUpstream::new());
        assert_eq!(resolver.zoning_state(site()).await, StateZoning::default());
    }

    #[tokio::test]
    async fn unregistered_lga_keeps_name() {
        let (resolver, _) = resolver(FixtureUpstream::new().with(
            LGA_URL,
            json!({ "features": [{ "attributes": { "lga": "GAMMA SHIRE" } }] }),
        ));

        let result = resolver.zoning_state(site()).await;
        assert!(result.zone.is_none());
        assert_eq!(result.lga.as_deref(), Some("GAMMA SHIRE"));
    }

    #[tokio::test]
    async fn council_layer_down_keeps_lga() {
        let (resolver, _) = resolver(FixtureUpstream::new().with(
            LGA_URL,
            json!({ "features": [{ "attributes": { "lga": "Alpha" } }] }),
        ));

        let result = resolver.zoning_state(site()).await;
        assert!(result.zone.is_none());
        assert_eq!(result.lga.as_deref(), Some("Alpha Regional Council"));
    }

    #[tokio::test]
    async fn regional_zoning_hit_and_miss() {
        let (hit, _) = resolver(FixtureUpstream::new().with(
            ALPHA_URL,
            json!({ "features": [{ "attributes": { "LABEL": "Rural Zone" } }] }),
        ));
        let result = hit.zoning_regional(site()).await.unwrap();
        assert_eq!(result.zone.unwrap().name.as_deref(), Some("Rural"));
        assert!(result.message.is_none());

        let (miss, _) = resolver(FixtureUpstream::new());
        let result = miss.zoning_regional(site()).await.unwrap();
        assert!(result.zone.is_none());
        assert_eq!(result.message.as_deref(), Some(NO_ZONE_MESSAGE));
    }

    #[tokio::test]
    async fn unconfigured_regional_council_is_an_error() {
        let upstream = Arc::new(FixtureUpstream::new());
        let resolver = Resolver::new(registry_without_regional_council(), upstream.clone());

        let err = resolver.zoning_regional(site()).await.unwrap_err();
        assert!(matches!(err, LookupError::MissingRegionalCouncil { ref key } if key == "alpha"));
        assert!(upstream.calls().is_empty());
    }
}
