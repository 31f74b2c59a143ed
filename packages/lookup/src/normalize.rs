//! Attribute normalization.
//!
//! Every council names its zoning fields differently (`LABEL`,
//! `ZONE_NAME`, `Zone_Name`, ...). Rather than branching per source, each
//! canonical field is read from an ordered candidate list: the field the
//! registry configures for that layer first, then a fixed list of common
//! spellings.

use serde_json::{Map, Value};
use siteline_lookup_models::ZoneResult;
use siteline_registry::ZoningLayer;

/// Placeholder used when no zone name candidate is present.
pub const UNKNOWN: &str = "Unknown";

/// Fallback attribute names for the zone name.
pub const ZONE_NAME_FALLBACKS: &[&str] = &["LABEL", "ZONE_NAME", "Zone_Name", "ZONE", "Zone"];

/// Fallback attribute names for the zone code.
pub const ZONE_CODE_FALLBACKS: &[&str] = &["ZONE_CODE", "Zone_Code", "CODE"];

/// Fallback attribute names for the precinct.
pub const PRECINCT_FALLBACKS: &[&str] = &["PRECINCT", "Precinct", "PRECINCT_NAME"];

/// Fallback attribute names for the local plan.
pub const LOCAL_PLAN_FALLBACKS: &[&str] = &["LOCAL_PLAN", "Local_Plan", "LP_NAME"];

/// Fallback attribute names for the zone category.
pub const CATEGORY_FALLBACKS: &[&str] = &["CATEGORY", "Category", "ZONE_CATEGORY"];

/// Fallback attribute names for an LGA name on boundary records.
pub const LGA_FALLBACKS: &[&str] = &["lga", "LGA", "lga_name", "LGA_NAME", "adminareaname"];

/// Renders a scalar attribute as trimmed text.
///
/// Strings are trimmed; numbers and booleans are stringified. Null,
/// blank strings, arrays and objects yield `None`.
#[must_use]
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Returns the first non-empty value among `candidates`, in order.
pub fn first_non_empty<'a>(
    attrs: &Map<String, Value>,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Option<String> {
    candidates
        .into_iter()
        .find_map(|key| attrs.get(key).and_then(value_text))
}

/// Reads a canonical field: the configured name first, then `fallbacks`.
#[must_use]
pub fn read_field(
    attrs: &Map<String, Value>,
    configured: Option<&str>,
    fallbacks: &[&str],
) -> Option<String> {
    first_non_empty(attrs, configured.into_iter().chain(fallbacks.iter().copied()))
}

/// Removes one trailing `" Zone"` (ASCII case-insensitive) from a name.
#[must_use]
pub fn strip_zone_suffix(name: &str) -> String {
    const SUFFIX: &str = " zone";
    let trimmed = name.trim_end();
    let cut = trimmed.len().saturating_sub(SUFFIX.len());
    match trimmed.get(cut..) {
        Some(tail) if cut > 0 && tail.eq_ignore_ascii_case(SUFFIX) => {
            trimmed[..cut].trim_end().to_string()
        }
        _ => trimmed.to_string(),
    }
}

/// Maps a zoning feature's attributes onto a [`ZoneResult`].
#[must_use]
pub fn normalize_zone(attrs: &Map<String, Value>, layer: &ZoningLayer) -> ZoneResult {
    let name = read_field(attrs, Some(layer.zone_field.as_str()), ZONE_NAME_FALLBACKS)
        .unwrap_or_else(|| UNKNOWN.to_string());

    ZoneResult {
        name: Some(strip_zone_suffix(&name)),
        code: read_field(attrs, layer.code_field.as_deref(), ZONE_CODE_FALLBACKS),
        precinct: read_field(attrs, layer.precinct_field.as_deref(), PRECINCT_FALLBACKS),
        local_plan: read_field(attrs, layer.local_plan_field.as_deref(), LOCAL_PLAN_FALLBACKS),
        category: read_field(attrs, layer.category_field.as_deref(), CATEGORY_FALLBACKS),
    }
}

/// Reads an LGA name from a boundary record.
#[must_use]
pub fn lga_name(attrs: &Map<String, Value>, field: &str) -> Option<String> {
    read_field(attrs, Some(field), LGA_FALLBACKS)
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use siteline_registry::{GeometryMode, SpatialReference};

    fn attrs(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn layer(zone_field: &str) -> ZoningLayer {
        ZoningLayer {
            url: "http://zoning.test/query".to_string(),
            zone_field: zone_field.to_string(),
            code_field: Some("ZCODE".to_string()),
            precinct_field: None,
            local_plan_field: None,
            category_field: None,
            geometry: GeometryMode::Point,
            envelope_half_width_m: 5.0,
            spatial_reference: SpatialReference::Wgs84,
        }
    }

    #[test]
    fn strips_trailing_zone_case_insensitively() {
        assert_eq!(
            strip_zone_suffix("High Density Residential Zone"),
            "High Density Residential"
        );
        assert_eq!(strip_zone_suffix("Rural ZONE"), "Rural");
        assert_eq!(strip_zone_suffix("Mixed use zone  "), "Mixed use");
        assert_eq!(strip_zone_suffix("Zone"), "Zone");
        assert_eq!(strip_zone_suffix("Ozone"), "Ozone");
        assert_eq!(strip_zone_suffix("Zone Boundary"), "Zone Boundary");
    }

    #[test]
    fn strip_handles_multibyte_text() {
        assert_eq!(strip_zone_suffix("Zoné"), "Zoné");
        assert_eq!(strip_zone_suffix("Kó Zone"), "Kó");
    }

    #[test]
    fn configured_field_wins_over_fallbacks() {
        let a = attrs(json!({ "MY_ZONE": "Township Zone", "LABEL": "Other" }));
        let zone = normalize_zone(&a, &layer("MY_ZONE"));
        assert_eq!(zone.name.as_deref(), Some("Township"));
    }

    #[test]
    fn falls_back_in_priority_order() {
        let a = attrs(json!({ "Zone": "Z", "ZONE_NAME": "Emerging community", "LABEL": "" }));
        let zone = normalize_zone(&a, &layer("MISSING"));
        assert_eq!(zone.name.as_deref(), Some("Emerging community"));
    }

    #[test]
    fn defaults_name_to_unknown() {
        let a = attrs(json!({ "OBJECTID": 12 }));
        let zone = normalize_zone(&a, &layer("MISSING"));
        assert_eq!(zone.name.as_deref(), Some(UNKNOWN));
        assert!(zone.code.is_none());
        assert!(zone.precinct.is_none());
    }

    #[test]
    fn reads_optional_fields_with_fallbacks() {
        let a = attrs(json!({
            "LABEL": "Medium Density Residential Zone",
            "ZCODE": "MDR",
            "Precinct": "Precinct 2",
            "LP_NAME": "Maroochydore",
            "ZONE_CATEGORY": null,
            "Category": "Residential"
        }));
        let zone = normalize_zone(&a, &layer("LABEL"));
        assert_eq!(
            zone,
            ZoneResult {
                name: Some("Medium Density Residential".to_string()),
                code: Some("MDR".to_string()),
                precinct: Some("Precinct 2".to_string()),
                local_plan: Some("Maroochydore".to_string()),
                category: Some("Residential".to_string()),
            }
        );
    }

    #[test]
    fn stringifies_numeric_attributes() {
        let a = attrs(json!({ "ZONE_CODE": 42, "flag": true, "nested": { "a": 1 } }));
        assert_eq!(first_non_empty(&a, ["ZONE_CODE"]).as_deref(), Some("42"));
        assert_eq!(first_non_empty(&a, ["flag"]).as_deref(), Some("true"));
        assert_eq!(first_non_empty(&a, ["nested"]), None);
    }

    #[test]
    fn reads_lga_from_boundary_fallbacks() {
        let a = attrs(json!({ "adminareaname": "SUNSHINE COAST REGIONAL" }));
        assert_eq!(
            lga_name(&a, "lga").as_deref(),
            Some("SUNSHINE COAST REGIONAL")
        );
        assert_eq!(lga_name(&attrs(json!({})), "lga"), None);
    }
}
