//! One-shot lookups shared by the subcommands and interactive mode.
//!
//! Output uses the API response types so the CLI prints exactly what the
//! server would return for the same request.

use serde_json::Value;
use siteline_lookup::{LookupError, Resolver};
use siteline_lookup::parcel::NO_PARCEL_MESSAGE;
use siteline_lookup_models::{Coordinate, CoordinateError, OverlayBucket};
use siteline_server_models::{
    ApiCouncil, ApiGeocode, ApiOverlays, ApiParcel, ApiRegionalZoning, ApiSiteReport, ApiSlope,
    ApiStateZoning,
};

/// A lookup to run against the resolver.
#[derive(Debug, Clone)]
pub enum Lookup {
    /// Zoning, state-wide or against the regional council.
    Zoning {
        /// Site.
        coord: Coordinate,
        /// Skip LGA resolution and query the regional council.
        regional: bool,
    },
    /// Overlays, optionally restricted to `buckets`.
    Overlays {
        /// Site.
        coord: Coordinate,
        /// Empty means every bucket.
        buckets: Vec<OverlayBucket>,
    },
    /// Cadastral lot.
    Parcel(Coordinate),
    /// Average slope.
    Slope(Coordinate),
    /// Everything at once.
    Report(Coordinate),
    /// Address search.
    Geocode(String),
    /// Registered councils.
    Councils,
}

/// Runs `lookup` and renders the API-shaped result as JSON.
///
/// # Errors
///
/// * [`LookupError`] for a rejected address or a misconfigured registry
/// * [`serde_json::Error`] if the result cannot be serialized
pub async fn execute(
    resolver: &Resolver,
    lookup: Lookup,
) -> Result<Value, Box<dyn std::error::Error>> {
    let value = match lookup {
        Lookup::Zoning {
            coord,
            regional: true,
        } => serde_json::to_value(ApiRegionalZoning::from(
            resolver.zoning_regional(coord).await?,
        ))?,
        Lookup::Zoning {
            coord,
            regional: false,
        } => serde_json::to_value(ApiStateZoning::from(resolver.zoning_state(coord).await))?,
        Lookup::Overlays { coord, buckets } => {
            let filter = (!buckets.is_empty()).then_some(buckets.as_slice());
            serde_json::to_value(ApiOverlays {
                overlays: resolver.overlays(coord, filter).await,
            })?
        }
        Lookup::Parcel(coord) => {
            let parcel = resolver.parcel(coord).await;
            let message = parcel.is_none().then(|| NO_PARCEL_MESSAGE.to_string());
            serde_json::to_value(ApiParcel { parcel, message })?
        }
        Lookup::Slope(coord) => serde_json::to_value(ApiSlope {
            slope: resolver.slope(coord).await,
        })?,
        Lookup::Report(coord) => {
            serde_json::to_value(ApiSiteReport::from(resolver.site_report(coord).await))?
        }
        Lookup::Geocode(address) => serde_json::to_value(ApiGeocode {
            candidates: resolver.geocode(&address).await?,
        })?,
        Lookup::Councils => {
            let councils: Vec<ApiCouncil> = resolver
                .registry()
                .councils()
                .map(|c| ApiCouncil {
                    key: c.key.clone(),
                    name: c.name.clone(),
                    aliases: c.aliases.clone(),
                })
                .collect();
            serde_json::to_value(councils)?
        }
    };
    Ok(value)
}

/// Whether `err` is caller input the user can fix, rather than a fault.
#[must_use]
pub fn is_input_error(err: &(dyn std::error::Error + 'static)) -> bool {
    err.is::<CoordinateError>()
        || matches!(
            err.downcast_ref::<LookupError>(),
            Some(LookupError::InvalidAddress { .. })
        )
}
