//! Free-text address geocoding.

use serde_json::Value;
use siteline_lookup_models::GeocodeCandidate;
use siteline_registry::GeocoderConfig;

use crate::normalize::read_field;
use crate::{LookupError, Resolver};

/// Shortest address worth sending to the geocoder.
pub const MIN_ADDRESS_LEN: usize = 3;

const SUBURB_FIELDS: &[&str] = &["City", "Nbrhd", "District"];

/// Locations requested per kept candidate, so low-score and (0, 0) matches
/// can be dropped without leaving the list short.
const LOCATIONS_PER_CANDIDATE: usize = 4;

impl Resolver {
    /// Geocodes `address` to at most `max_candidates` matches, best first.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::InvalidAddress`] if the trimmed address is
    /// shorter than [`MIN_ADDRESS_LEN`] characters. An unavailable
    /// geocoder yields an empty list, not an error.
    pub async fn geocode(&self, address: &str) -> Result<Vec<GeocodeCandidate>, LookupError> {
        let address = address.trim();
        if address.chars().count() < MIN_ADDRESS_LEN {
            return Err(LookupError::InvalidAddress {
                min_len: MIN_ADDRESS_LEN,
            });
        }

        let services = self.registry().services();
        let geocoder = &services.geocoder;
        let params = vec![
            ("SingleLine", address.to_string()),
            ("countryCode", geocoder.country_code.clone()),
            ("outFields", SUBURB_FIELDS.join(",")),
            (
                "maxLocations",
                (geocoder.max_candidates * LOCATIONS_PER_CANDIDATE).to_string(),
            ),
            ("outSR", "4326".to_string()),
            ("f", "json".to_string()),
        ];

        let Some(body) = self
            .upstream()
            .get_json(&geocoder.url, &params, services.timeouts.geocode())
            .await
        else {
            return Ok(Vec::new());
        };

        let candidates = parse_candidates(&body, geocoder);
        log::debug!("{} geocode candidate(s) for '{address}'", candidates.len());
        Ok(candidates)
    }
}

fn parse_candidates(body: &Value, cfg: &GeocoderConfig) -> Vec<GeocodeCandidate> {
    let Some(raw) = body.get("candidates").and_then(Value::as_array) else {
        return Vec::new();
    };

    raw.iter()
        .filter_map(parse_candidate)
        .filter(|c| c.score > cfg.min_score)
        .filter(|c| !(c.lat == 0.0 && c.lng == 0.0))
        .take(cfg.max_candidates)
        .collect()
}

fn parse_candidate(raw: &Value) -> Option<GeocodeCandidate> {
    let location = raw.get("location")?;
    let lng = location.get("x")?.as_f64()?;
    let lat = location.get("y")?.as_f64()?;
    if !lat.is_finite() || !lng.is_finite() {
        return None;
    }

    let suburb = raw
        .get("attributes")
        .and_then(Value::as_object)
        .and_then(|attrs| read_field(attrs, None, SUBURB_FIELDS));

    Some(GeocodeCandidate {
        address: raw.get("address")?.as_str()?.to_string(),
        lat,
        lng,
        score: raw.get("score")?.as_f64()?,
        suburb,
    })
}
