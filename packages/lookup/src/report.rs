//! Combined site report.

use siteline_lookup_models::{Coordinate, OverlayHit, ParcelResult, SlopeResult};

use crate::{Resolver, StateZoning};

/// Everything known about a site, gathered in one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteReport {
    /// State-wide zoning and LGA.
    pub zoning: StateZoning,
    /// Overlay hits.
    pub overlays: Vec<OverlayHit>,
    /// Cadastral lot, if any.
    pub parcel: Option<ParcelResult>,
    /// Average slope.
    pub slope: SlopeResult,
}

impl Resolver {
    /// Runs zoning, overlays, parcel and slope concurrently for `coord`.
    pub async fn site_report(&self, coord: Coordinate) -> SiteReport {
        let (zoning, overlays, parcel, slope) = tokio::join!(
            self.zoning_state(coord),
            self.overlays(coord, None),
            self.parcel(coord),
            self.slope(coord),
        );
        SiteReport {
            zoning,
            overlays,
            parcel,
            slope,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use siteline_arcgis::fixture::FixtureUpstream;

    use crate::test_support::{ALPHA_URL, CADASTRE_URL, FLOOD_URL, LGA_URL, resolver, site};

    #[tokio::test]
    async fn gathers_every_domain() {
        let (resolver, _) = resolver(
            FixtureUpstream::new()
                .with(
                    LGA_URL,
                    json!({ "features": [{ "attributes": { "lga": "Alpha" } }] }),
                )
                .with(
                    ALPHA_URL,
                    json!({ "features": [{ "attributes": { "LABEL": "Rural Zone" } }] }),
                )
                .with(
                    FLOOD_URL,
                    json!({ "features": [{ "attributes": { "HAZARD": "Low" } }] }),
                )
                .with(
                    CADASTRE_URL,
                    json!({ "features": [{ "attributes": {
                        "lotplan": "1RP1", "lot_area": 800
                    } }] }),
                ),
        );

        let report = resolver.site_report(site()).await;
        assert_eq!(
            report.zoning.zone.unwrap().name.as_deref(),
            Some("Rural")
        );
        assert_eq!(report.overlays.len(), 1);
        assert_eq!(report.parcel.unwrap().area_sqm, Some(800));
        assert_eq!(report.slope, SlopeResult::unknown());
    }

    #[tokio::test]
    async fn everything_down_is_empty() {
        let (resolver, _) = resolver(FixtureUpstream::new());
        let report = resolver.site_report(site()).await;
        assert_eq!(report.zoning, StateZoning::default());
        assert!(report.overlays.is_empty());
        assert!(report.parcel.is_none());
        assert_eq!(report.slope, SlopeResult::unknown());
    }
}
