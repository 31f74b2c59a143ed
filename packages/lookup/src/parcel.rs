//! Cadastral parcel lookups.
//!
//! A point on a shared boundary (or inside a strata scheme) can return
//! several lots. The first lot that has both a lot/plan identifier and a
//! positive recorded area is preferred over whatever happens to come back
//! first.

use serde_json::{Map, Value};
use siteline_arcgis::{Feature, LayerQuery, QueryGeometry, query_features};
use siteline_lookup_models::{Coordinate, ParcelResult};
use siteline_registry::{CadastreConfig, SpatialReference};

use crate::Resolver;
use crate::area::rings_area_sqm;
use crate::normalize::{read_field, value_text};

/// Message returned when no lot intersects the point.
pub const NO_PARCEL_MESSAGE: &str = "No parcel found at this location";

impl Resolver {
    /// Returns the cadastral lot at `coord`, or `None` when the cadastre
    /// has no lot there or is unavailable.
    pub async fn parcel(&self, coord: Coordinate) -> Option<ParcelResult> {
        let services = self.registry().services();
        let cadastre = &services.cadastre;
        let geometry = QueryGeometry::point(coord, SpatialReference::Wgs84);
        let query = LayerQuery {
            geometry: &geometry,
            out_fields: "*",
            return_geometry: true,
            timeout: services.timeouts.parcel(),
        };

        let features = query_features(self.upstream(), &cadastre.url, &query).await?;
        let feature = select_feature(&features, cadastre)?;
        Some(to_parcel(feature, cadastre))
    }
}

/// Picks the first complete lot, falling back to the first feature.
fn select_feature<'a>(features: &'a [Feature], cfg: &CadastreConfig) -> Option<&'a Feature> {
    features
        .iter()
        .find(|f| {
            lot_plan(&f.attributes, cfg).is_some() && recorded_area(&f.attributes, cfg).is_some()
        })
        .or_else(|| features.first())
}

/// The combined identifier, or `lot/plan` when only the parts exist.
fn lot_plan(attrs: &Map<String, Value>, cfg: &CadastreConfig) -> Option<String> {
    read_field(attrs, Some(cfg.lot_plan_field.as_str()), &[]).or_else(|| {
        let lot = read_field(attrs, Some(cfg.lot_field.as_str()), &[])?;
        let plan = read_field(attrs, Some(cfg.plan_field.as_str()), &[])?;
        Some(format!("{lot}/{plan}"))
    })
}

/// The authoritative area attribute, if present and positive.
fn recorded_area(attrs: &Map<String, Value>, cfg: &CadastreConfig) -> Option<f64> {
    let raw = attrs.get(&cfg.area_field)?;
    let area = raw
        .as_f64()
        .or_else(|| value_text(raw).and_then(|s| s.replace(',', "").parse().ok()))?;
    (area.is_finite() && area > 0.0).then_some(area)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_sqm(area: f64) -> u64 {
    area.round() as u64
}

fn to_parcel(feature: &Feature, cfg: &CadastreConfig) -> ParcelResult {
    let attrs = &feature.attributes;
    let rings = feature.rings();

    let area_sqm = recorded_area(attrs, cfg)
        .or_else(|| {
            let computed = rings.as_deref().and_then(rings_area_sqm);
            if computed.is_none() {
                log::debug!("Parcel has no recorded area and no measurable geometry");
            }
            computed
        })
        .map(to_sqm);

    ParcelResult {
        lot: read_field(attrs, Some(cfg.lot_field.as_str()), &[]),
        plan: read_field(attrs, Some(cfg.plan_field.as_str()), &[]),
        lot_plan: lot_plan(attrs, cfg),
        area_sqm,
        tenure: read_field(attrs, Some(cfg.tenure_field.as_str()), &[]),
        lga: read_field(attrs, Some(cfg.lga_field.as_str()), &[]),
        locality: read_field(attrs, Some(cfg.locality_field.as_str()), &[]),
        geometry: rings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use siteline_arcgis::fixture::FixtureUpstream;

    use crate::test_support::{CADASTRE_URL, resolver, site};

    fn square() -> Value {
        json!({ "rings": [[
            [153.0, -27.5], [153.0003, -27.5], [153.0003, -27.4997], [153.0, -27.4997], [153.0, -27.5]
        ]] })
    }

    #[tokio::test]
    async fn prefers_complete_candidate() {
        let (resolver, _) = resolver(FixtureUpstream::new().with(
            CADASTRE_URL,
            json!({ "features": [
                { "attributes": { "lot": "0", "lotplan": "", "lot_area": 0 } },
                { "attributes": {
                    "lot": "3", "plan": "RP12345", "lotplan": "3RP12345",
                    "lot_area": 607.4, "tenure": "Freehold",
                    "shire_name": "SUNSHINE COAST", "locality": "Buderim"
                } }
            ] }),
        ));

        let parcel = resolver.parcel(site()).await.unwrap();
        assert_eq!(parcel.lot.as_deref(), Some("3"));
        assert_eq!(parcel.lot_plan.as_deref(), Some("3RP12345"));
        assert_eq!(parcel.area_sqm, Some(607));
        assert_eq!(parcel.tenure.as_deref(), Some("Freehold"));
        assert_eq!(parcel.locality.as_deref(), Some("Buderim"));
        assert_eq!(parcel.lga.as_deref(), Some("SUNSHINE COAST"));
    }

    #[tokio::test]
    async fn falls_back_to_first_feature() {
        let (resolver, _) = resolver(FixtureUpstream::new().with(
            CADASTRE_URL,
            json!({ "features": [
                { "attributes": { "lot": "1" } },
                { "attributes": { "lot": "2" } }
            ] }),
        ));

        let parcel = resolver.parcel(site()).await.unwrap();
        assert_eq!(parcel.lot.as_deref(), Some("1"));
        assert!(parcel.lot_plan.is_none());
        assert!(parcel.area_sqm.is_none());
    }

    #[tokio::test]
    async fn derives_lot_plan_and_computes_area() {
        let (resolver, upstream) = resolver(FixtureUpstream::new().with(
            CADASTRE_URL,
            json!({ "features": [{
                "attributes": { "lot": "12", "plan": "SP998877" },
                "geometry": square()
            }] }),
        ));

        let parcel = resolver.parcel(site()).await.unwrap();
        assert_eq!(parcel.lot_plan.as_deref(), Some("12/SP998877"));
        let area = parcel.area_sqm.unwrap();
        assert!((900..1_100).contains(&area), "area = {area}");
        assert_eq!(parcel.geometry.unwrap()[0].len(), 5);

        let call = &upstream.calls_to(CADASTRE_URL)[0];
        assert_eq!(call.param("returnGeometry"), Some("true"));
        assert_eq!(call.param("outSR"), Some("4326"));
    }

    #[tokio::test]
    async fn unmeasurable_geometry_is_unknown_area() {
        let (resolver, _) = resolver(FixtureUpstream::new().with(
            CADASTRE_URL,
            json!({ "features": [{
                "attributes": { "lot": "4", "plan": "RP1", "lot_area": "n/a" },
                "geometry": { "rings": [[[153.0, -27.5], [153.1, -27.5]]] }
            }] }),
        ));

        let parcel = resolver.parcel(site()).await.unwrap();
        assert!(parcel.area_sqm.is_none());
        assert_eq!(parcel.lot_plan.as_deref(), Some("4/RP1"));
    }

    #[tokio::test]
    async fn no_features_or_service_down_is_none() {
        let (empty, _) =
            resolver(FixtureUpstream::new().with(CADASTRE_URL, json!({ "features": [] })));
        assert!(empty.parcel(site()).await.is_none());

        let (down, _) = resolver(FixtureUpstream::new());
        assert!(down.parcel(site()).await.is_none());
    }

    #[test]
    fn reads_area_from_numeric_strings() {
        let cfg = crate::test_support::registry().services().cadastre.clone();
        let attrs = json!({ "lot_area": "1,204.6" }).as_object().cloned().unwrap();
        assert_eq!(recorded_area(&attrs, &cfg), Some(1204.6));
        let attrs = json!({ "lot_area": -5 }).as_object().cloned().unwrap();
        assert_eq!(recorded_area(&attrs, &cfg), None);
    }
}
