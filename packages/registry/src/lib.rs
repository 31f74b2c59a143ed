#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Compile-time registry of upstream GIS services.
//!
//! Three kinds of TOML file are embedded into the binary:
//!
//! - `services.toml`: shared endpoints (LGA boundaries, cadastre,
//!   elevation, geocoder) and per-domain timeouts.
//! - `overlays.toml`: the state-wide overlay layers.
//! - `councils/*.toml`: one file per local government area, describing
//!   its zoning layer and which attribute names it uses.
//!
//! A [`Registry`] is parsed once at startup and shared read-only. Tests and
//! alternative deployments build their own with [`Registry::from_toml`].

pub mod council;
pub mod matching;
pub mod overlay;
pub mod services;

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

pub use council::{Council, GeometryMode, SpatialReference, ZoningLayer};
pub use matching::normalize_lga_name;
pub use overlay::OverlayLayer;
pub use services::{
    CadastreConfig, ElevationConfig, GeocoderConfig, LgaBoundaryConfig, ServicesConfig, Timeouts,
};

use overlay::OverlayFile;

/// Errors from building a [`Registry`].
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A TOML document failed to parse.
    #[error("Failed to parse {name}: {source}")]
    Toml {
        /// Which document failed.
        name: String,
        /// Underlying parse error.
        source: toml::de::Error,
    },

    /// Two entries share an identifier or a normalized name.
    #[error("Duplicate {kind} '{key}'")]
    Duplicate {
        /// What kind of entry collided.
        kind: &'static str,
        /// The colliding key.
        key: String,
    },

    /// An entry is structurally valid TOML but unusable.
    #[error("Invalid registry entry: {message}")]
    Invalid {
        /// Description of the problem.
        message: String,
    },
}

// ── Compile-time embedded TOML files ────────────────────────────────

const SERVICES_TOML: &str = include_str!("../services.toml");
const OVERLAYS_TOML: &str = include_str!("../overlays.toml");

const COUNCIL_TOMLS: &[(&str, &str)] = &[
    ("brisbane", include_str!("../councils/brisbane.toml")),
    ("cairns", include_str!("../councils/cairns.toml")),
    ("gold_coast", include_str!("../councils/gold_coast.toml")),
    ("ipswich", include_str!("../councils/ipswich.toml")),
    ("logan", include_str!("../councils/logan.toml")),
    ("moreton_bay", include_str!("../councils/moreton_bay.toml")),
    ("noosa", include_str!("../councils/noosa.toml")),
    ("redland", include_str!("../councils/redland.toml")),
    (
        "sunshine_coast",
        include_str!("../councils/sunshine_coast.toml"),
    ),
    ("toowoomba", include_str!("../councils/toowoomba.toml")),
    ("townsville", include_str!("../councils/townsville.toml")),
];

#[cfg(test)]
const EXPECTED_COUNCIL_COUNT: usize = 11;

/// Immutable lookup tables for every upstream service.
#[derive(Debug, Clone)]
pub struct Registry {
    services: ServicesConfig,
    overlays: Vec<OverlayLayer>,
    /// Normalized name -> council.
    councils: BTreeMap<String, Council>,
    /// Normalized alias -> normalized council name.
    aliases: BTreeMap<String, String>,
}

impl Registry {
    /// Builds the registry from the TOML files embedded in the binary.
    ///
    /// # Panics
    ///
    /// Panics if any embedded TOML is malformed (this is a compile-time
    /// guarantee since the configs are embedded and covered by tests).
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_toml(SERVICES_TOML, OVERLAYS_TOML, COUNCIL_TOMLS)
            .unwrap_or_else(|e| panic!("Embedded registry is invalid: {e}"))
    }

    /// Builds a registry from caller-supplied TOML documents.
    ///
    /// `councils` is a list of `(name, toml)` pairs; the name is only used
    /// in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if a document fails to parse, two councils
    /// or overlay layers collide, or a URL is empty. A missing regional
    /// zoning council is only logged; the regional route reports it.
    pub fn from_toml(
        services: &str,
        overlays: &str,
        councils: &[(&str, &str)],
    ) -> Result<Self, RegistryError> {
        let services: ServicesConfig =
            toml::de::from_str(services).map_err(|source| RegistryError::Toml {
                name: "services".to_string(),
                source,
            })?;

        let OverlayFile { layers } =
            toml::de::from_str(overlays).map_err(|source| RegistryError::Toml {
                name: "overlays".to_string(),
                source,
            })?;

        let mut seen_layers = BTreeSet::new();
        for layer in &layers {
            require_url("overlay", &layer.id, &layer.url)?;
            if !seen_layers.insert(layer.id.as_str()) {
                return Err(RegistryError::Duplicate {
                    kind: "overlay layer",
                    key: layer.id.clone(),
                });
            }
        }

        let mut council_map = BTreeMap::new();
        let mut alias_map = BTreeMap::new();
        for (name, toml_str) in councils {
            let council: Council =
                toml::de::from_str(toml_str).map_err(|source| RegistryError::Toml {
                    name: format!("council '{name}'"),
                    source,
                })?;
            require_url("council", &council.key, &council.zoning.url)?;

            let key = normalize_lga_name(&council.key);
            for alias in std::iter::once(&council.name).chain(&council.aliases) {
                let alias = normalize_lga_name(alias);
                if alias == key {
                    continue;
                }
                if let Some(owner) = alias_map.insert(alias.clone(), key.clone())
                    && owner != key
                {
                    return Err(RegistryError::Duplicate {
                        kind: "council alias",
                        key: alias,
                    });
                }
            }
            if council_map.insert(key.clone(), council).is_some() {
                return Err(RegistryError::Duplicate {
                    kind: "council",
                    key,
                });
            }
        }

        if alias_map.keys().any(|alias| council_map.contains_key(alias)) {
            return Err(RegistryError::Invalid {
                message: "a council alias shadows another council's name".to_string(),
            });
        }

        let regional = normalize_lga_name(&services.regional_zoning_council);
        if !council_map.contains_key(&regional) && !alias_map.contains_key(&regional) {
            log::warn!(
                "Regional zoning council '{}' is not configured; regional zoning lookups will fail",
                services.regional_zoning_council
            );
        }

        require_url("service", "lga_boundary", &services.lga_boundary.url)?;
        require_url("service", "cadastre", &services.cadastre.url)?;
        require_url("service", "elevation", &services.elevation.url)?;
        require_url("service", "geocoder", &services.geocoder.url)?;

        Ok(Self {
            services,
            overlays: layers,
            councils: council_map,
            aliases: alias_map,
        })
    }

    /// Shared service endpoints.
    #[must_use]
    pub const fn services(&self) -> &ServicesConfig {
        &self.services
    }

    /// Overlay layers in configured order.
    #[must_use]
    pub fn overlays(&self) -> &[OverlayLayer] {
        &self.overlays
    }

    /// All councils, ordered by normalized name.
    pub fn councils(&self) -> impl Iterator<Item = &Council> {
        self.councils.values()
    }

    /// Resolves a free-text LGA name to a council.
    ///
    /// Matching tolerates case, punctuation and administrative suffix
    /// variants ("Sunshine Coast Council" and "Sunshine Coast Regional
    /// Council" resolve to the same entry). Returns `None` when no council
    /// matches; that is an expected outcome, not an error.
    #[must_use]
    pub fn find_council(&self, name: &str) -> Option<&Council> {
        let key = normalize_lga_name(name);
        if key.is_empty() {
            return None;
        }
        let found = self.councils.get(&key).or_else(|| {
            self.aliases
                .get(&key)
                .and_then(|owner| self.councils.get(owner))
        });
        if found.is_none() {
            log::debug!("No council registered for LGA '{name}' (normalized '{key}')");
        }
        found
    }

    /// The council used by the regional zoning route, if registered.
    #[must_use]
    pub fn regional_council(&self) -> Option<&Council> {
        self.find_council(&self.services.regional_zoning_council)
    }
}

fn require_url(kind: &'static str, key: &str, url: &str) -> Result<(), RegistryError> {
    if url.trim().is_empty() {
        return Err(RegistryError::Invalid {
            message: format!("{kind} '{key}' has an empty url"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use siteline_lookup_models::OverlayBucket;

    const FIXTURE_SERVICES: &str = r#"
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
    "#;

    const FIXTURE_OVERLAYS: &str = r#"
        [[layer]]
        id = "flood"
        name = "Flood"
        url = "http://flood.test/query"
        bucket = "flood"
    "#;

    const ALPHA: &str = r#"
        key = "alpha"
        name = "Alpha Regional Council"

        [zoning]
        url = "http://alpha.test/query"
        zone_field = "ZONE"
    "#;

    const BETA: &str = r#"
        key = "beta"
        name = "Beta Council"
        aliases = ["Beta Shire Council"]

        [zoning]
        url = "http://beta.test/query"
        zone_field = "LABEL"
        geometry = "envelope"
        spatial_reference = 3857
    "#;

    fn fixture() -> Registry {
        Registry::from_toml(
            FIXTURE_SERVICES,
            FIXTURE_OVERLAYS,
            &[("alpha", ALPHA), ("beta", BETA)],
        )
        .unwrap()
    }

    #[test]
    fn loads_embedded_registry() {
        let registry = Registry::embedded();
        assert_eq!(registry.councils().count(), EXPECTED_COUNCIL_COUNT);
        assert!(!registry.overlays().is_empty());
    }

    #[test]
    fn embedded_councils_have_required_fields() {
        let registry = Registry::embedded();
        let mut keys = BTreeSet::new();
        for council in registry.councils() {
            assert!(keys.insert(&council.key), "Duplicate key {}", council.key);
            assert!(!council.name.is_empty(), "{} has empty name", council.key);
            assert!(
                !council.zoning.zone_field.is_empty(),
                "{} has empty zone_field",
                council.key
            );
            assert!(
                council.zoning.envelope_half_width_m > 0.0,
                "{} has non-positive envelope",
                council.key
            );
        }
    }

    #[test]
    fn embedded_overlays_cover_every_bucket() {
        let registry = Registry::embedded();
        let buckets: BTreeSet<OverlayBucket> =
            registry.overlays().iter().map(|l| l.bucket).collect();
        for bucket in [
            OverlayBucket::Flood,
            OverlayBucket::Bushfire,
            OverlayBucket::Heritage,
            OverlayBucket::Environment,
            OverlayBucket::Vegetation,
            OverlayBucket::Wetlands,
            OverlayBucket::Coastal,
        ] {
            assert!(buckets.contains(&bucket), "No overlay layer for {bucket}");
        }
    }

    #[test]
    fn embedded_regional_council_resolves() {
        let registry = Registry::embedded();
        assert_eq!(
            registry.regional_council().map(|c| c.key.as_str()),
            Some("sunshine_coast")
        );
    }

    #[test]
    fn finds_council_by_variant_names() {
        let registry = Registry::embedded();
        for name in [
            "Sunshine Coast Council",
            "Sunshine Coast Regional Council",
            "SUNSHINE COAST REGIONAL",
            "sunshine_coast",
        ] {
            let council = registry.find_council(name);
            assert_eq!(
                council.map(|c| c.key.as_str()),
                Some("sunshine_coast"),
                "{name}"
            );
        }
        assert_eq!(
            registry.find_council("City of Gold Coast").map(|c| c.key.as_str()),
            Some("gold_coast")
        );
    }

    #[test]
    fn unknown_council_is_none() {
        let registry = fixture();
        assert!(registry.find_council("Gamma Shire Council").is_none());
        assert!(registry.find_council("").is_none());
        assert!(registry.find_council("   ").is_none());
    }

    #[test]
    fn fixture_parses_defaults_and_modes() {
        let registry = fixture();
        let alpha = registry.find_council("Alpha Regional Council").unwrap();
        assert_eq!(alpha.zoning.geometry, GeometryMode::Point);
        assert_eq!(alpha.zoning.spatial_reference, SpatialReference::Wgs84);
        assert!((alpha.zoning.envelope_half_width_m - 5.0).abs() < f64::EPSILON);

        let beta = registry.find_council("Beta Shire Council").unwrap();
        assert_eq!(beta.zoning.geometry, GeometryMode::Envelope);
        assert_eq!(beta.zoning.spatial_reference.wkid(), 3857);

        assert_eq!(registry.services().timeouts.overlays_secs, 8);
        assert!((registry.services().overlay_buffer_m - 30.0).abs() < f64::EPSILON);
        assert_eq!(registry.services().geocoder.max_candidates, 5);
    }

    #[test]
    fn rejects_duplicate_council() {
        let err = Registry::from_toml(
            FIXTURE_SERVICES,
            FIXTURE_OVERLAYS,
            &[("alpha", ALPHA), ("alpha2", ALPHA)],
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate { kind: "council", .. }));
    }

    #[test]
    fn loads_without_regional_council() {
        let registry =
            Registry::from_toml(FIXTURE_SERVICES, FIXTURE_OVERLAYS, &[("beta", BETA)]).unwrap();
        assert!(registry.regional_council().is_none());
        assert!(registry.find_council("Beta Council").is_some());
    }

    #[test]
    fn rejects_unsupported_spatial_reference() {
        let bad = BETA.replace("3857", "28356");
        let err = Registry::from_toml(
            FIXTURE_SERVICES,
            FIXTURE_OVERLAYS,
            &[("alpha", ALPHA), ("beta", &bad)],
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::Toml { .. }));
    }

    #[test]
    fn rejects_duplicate_overlay_ids() {
        let overlays = format!("{FIXTURE_OVERLAYS}\n{FIXTURE_OVERLAYS}");
        let err = Registry::from_toml(FIXTURE_SERVICES, &overlays, &[("alpha", ALPHA)])
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Duplicate {
                kind: "overlay layer",
                ..
            }
        ));
    }
}
