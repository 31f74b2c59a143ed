#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Site attribute resolution over public GIS services.
//!
//! A [`Resolver`] sequences registry lookups, geometry encoding, upstream
//! queries and attribute normalization for each lookup domain:
//!
//! - **Zoning**: resolve the local government area, find its council in
//!   the registry, query the council's zoning layer ([`zoning`]).
//! - **Overlays**: fan out over every state overlay layer and keep the
//!   hits ([`overlays`]).
//! - **Parcel**: query the cadastre and pick the best lot ([`parcel`]).
//! - **Slope**: identify on a slope raster, falling back to a sampled
//!   grid ([`slope`]).
//! - **Geocode**: free-text address to candidate coordinates
//!   ([`geocode`]).
//!
//! Upstream unavailability is never an error: every operation degrades to
//! an empty or null result. [`LookupError`] is reserved for bad caller
//! input and local faults.

pub mod area;
pub mod geocode;
pub mod normalize;
pub mod overlays;
pub mod parcel;
pub mod report;
pub mod slope;
pub mod zoning;

use std::sync::Arc;

use siteline_arcgis::Upstream;
use siteline_registry::Registry;
use thiserror::Error;

pub use report::SiteReport;
pub use zoning::{RegionalZoning, StateZoning};

/// Errors from a lookup that are not upstream unavailability.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The address is too short to geocode.
    #[error("address must be at least {min_len} characters")]
    InvalidAddress {
        /// Minimum accepted length in characters.
        min_len: usize,
    },

    /// The registry has no council for the regional zoning route.
    #[error("regional zoning council '{key}' is not configured")]
    MissingRegionalCouncil {
        /// The configured council key.
        key: String,
    },
}

/// Runs lookups against an injected registry and upstream client.
///
/// Cheap to clone; both collaborators are shared.
#[derive(Clone)]
pub struct Resolver {
    registry: Arc<Registry>,
    upstream: Arc<dyn Upstream>,
}

impl Resolver {
    /// Creates a resolver.
    #[must_use]
    pub fn new(registry: Arc<Registry>, upstream: Arc<dyn Upstream>) -> Self {
        Self { registry, upstream }
    }

    /// The registry this resolver reads from.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    fn upstream(&self) -> &dyn Upstream {
        self.upstream.as_ref()
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("councils", &self.registry.councils().count())
            .field("overlays", &self.registry.overlays().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use siteline_arcgis::fixture::FixtureUpstream;
    use siteline_lookup_models::Coordinate;
    use siteline_registry::Registry;

    use crate::Resolver;

    pub const LGA_URL: &str = "http://lga.test/query";
    pub const CADASTRE_URL: &str = "http://cadastre.test/query";
    pub const DEM_URL: &str = "http://dem.test/ImageServer";
    pub const GEOCODE_URL: &str = "http://geocode.test/find";
    pub const ALPHA_URL: &str = "http://alpha.test/query";
    pub const BETA_URL: &str = "http://beta.test/query";
    pub const FLOOD_URL: &str = "http://flood.test/query";
    pub const FIRE_URL: &str = "http://fire.test/query";
    pub const HERITAGE_URL: &str = "http://heritage.test/query";

    const SERVICES: &str = r#"
        regional_zoning_council = "alpha"

        [lga_boundary]
        url = "http://lga.test/query"
        field = "lga"

        [cadastre]
        url = "http://cadastre.test/query"
        lot_field = "lot"
        plan_field = "plan"
        lot_plan_field = "lotplan"
        area_field = "lot_area"
        tenure_field = "tenure"
        lga_field = "shire_name"
        locality_field = "locality"

        [elevation]
        url = "http://dem.test/ImageServer"
        raster_function = "SlopePercent"

        [geocoder]
        url = "http://geocode.test/find"
        country_code = "AUS"
        max_candidates = 3
    "#;

    const OVERLAYS: &str = r#"
        [[layer]]
        id = "flood"
        name = "Flood hazard area"
        url = "http://flood.test/query"
        bucket = "flood"

        [[layer]]
        id = "fire"
        name = "Bushfire prone area"
        url = "http://fire.test/query"
        bucket = "bushfire"

        [[layer]]
        id = "heritage"
        name = "Heritage register"
        url = "http://heritage.test/query"
        bucket = "heritage"
    "#;

    const ALPHA: &str = r#"
        key = "alpha"
        name = "Alpha Regional Council"

        [zoning]
        url = "http://alpha.test/query"
        zone_field = "LABEL"
        code_field = "ZONE_CODE"
    "#;

    const BETA: &str = r#"
        key = "beta"
        name = "Beta City Council"

        [zoning]
        url = "http://beta.test/query"
        zone_field = "ZONE_DESC"
        precinct_field = "PREC"
        geometry = "envelope"
        envelope_half_width_m = 3.0
        spatial_reference = 3857
    "#;

    pub fn registry() -> Arc<Registry> {
        Arc::new(
            Registry::from_toml(SERVICES, OVERLAYS, &[("alpha", ALPHA), ("beta", BETA)]).unwrap(),
        )
    }

    /// The regional zoning council ("alpha") is missing.
    pub fn registry_without_regional_council() -> Arc<Registry> {
        Arc::new(Registry::from_toml(SERVICES, OVERLAYS, &[("beta", BETA)]).unwrap())
    }

    pub fn resolver(upstream: FixtureUpstream) -> (Resolver, Arc<FixtureUpstream>) {
        let upstream = Arc::new(upstream);
        (Resolver::new(registry(), upstream.clone()), upstream)
    }

    pub fn site() -> Coordinate {
        Coordinate::new(-26.6528, 153.0896).unwrap()
    }
}
