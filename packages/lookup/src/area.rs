//! Lot area from boundary rings.
//!
//! Used only when the cadastre returns no authoritative area. Each ring is
//! measured on the WGS84 ellipsoid with its winding sign kept, so holes
//! wound opposite to their shell subtract from it. The absolute total is
//! the lot area; that is valid for anything smaller than half the globe.

use geo::{Coord, GeodesicArea as _, LineString, Polygon};

/// Geodesic area in square metres of a set of `[lng, lat]` rings.
///
/// Returns `None` for empty input, rings with fewer than three distinct
/// vertices, or a degenerate (zero or non-finite) result.
#[must_use]
pub fn rings_area_sqm(rings: &[Vec<[f64; 2]>]) -> Option<f64> {
    let mut total = 0.0;
    let mut measured = 0;

    for ring in rings {
        if ring.len() < 3 || ring.iter().flatten().any(|v| !v.is_finite()) {
            continue;
        }
        let exterior: LineString<f64> = ring
            .iter()
            .map(|&[x, y]| Coord { x, y })
            .collect::<Vec<_>>()
            .into();
        total += Polygon::new(exterior, vec![]).geodesic_area_signed();
        measured += 1;
    }

    let area = total.abs();
    (measured > 0 && area.is_finite() && area > 0.0).then_some(area)
}
