#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for siteline.
//!
//! ```text
//! siteline serve
//! siteline zoning --lat -26.65 --lng 153.09 [--regional]
//! siteline overlays --lat -26.65 --lng 153.09 [--buckets flood,heritage]
//! siteline parcel --lat -26.65 --lng 153.09
//! siteline slope --lat -26.65 --lng 153.09
//! siteline report --lat -26.65 --lng 153.09
//! siteline geocode "1 Main St Buderim"
//! siteline councils
//! ```
//!
//! Running `siteline` with no subcommand enters interactive mode.

mod interactive;
mod lookup;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use siteline_arcgis::HttpUpstream;
use siteline_lookup::Resolver;
use siteline_lookup_models::{Coordinate, CoordinateError, OverlayBucket};
use siteline_registry::Registry;

use crate::lookup::{Lookup, execute, is_input_error};

#[derive(Parser)]
#[command(
    name = "siteline",
    about = "Zoning, overlay, parcel and slope lookups for Queensland sites"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct Site {
    /// Latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,
    /// Longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    lng: f64,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve,
    /// Planning-scheme zoning
    Zoning {
        #[command(flatten)]
        site: Site,
        /// Query the regional council directly instead of resolving the LGA
        #[arg(long)]
        regional: bool,
    },
    /// State planning overlays
    Overlays {
        #[command(flatten)]
        site: Site,
        /// Comma-separated buckets to restrict the lookup to
        #[arg(long, value_delimiter = ',', value_parser = parse_bucket)]
        buckets: Vec<OverlayBucket>,
    },
    /// Cadastral lot
    Parcel {
        #[command(flatten)]
        site: Site,
    },
    /// Average slope
    Slope {
        #[command(flatten)]
        site: Site,
    },
    /// Zoning, overlays, parcel and slope together
    Report {
        #[command(flatten)]
        site: Site,
    },
    /// Search for an address
    Geocode {
        /// Free-text address
        address: String,
    },
    /// List councils with a registered zoning layer
    Councils,
}

/// Builds a resolver over the embedded registry and live services.
fn live_resolver() -> Result<Resolver, Box<dyn std::error::Error>> {
    Ok(Resolver::new(
        Arc::new(Registry::embedded()),
        Arc::new(HttpUpstream::new()?),
    ))
}

/// Runs the API server, prompting for its settings first if `prompt`.
async fn serve(prompt: bool) -> Result<(), Box<dyn std::error::Error>> {
    // The server uses actix-web's runtime, so it runs in a blocking task to
    // avoid nesting tokio runtimes.
    tokio::task::spawn_blocking(move || {
        let system = actix_web::rt::System::new();
        if prompt {
            system.block_on(siteline_server::interactive::run())
        } else {
            system.block_on(siteline_server::run_server())
        }
    })
    .await??;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run().await;
    };

    let Some(lookup) = command.lookup() else {
        return serve(false).await;
    };

    let result = match lookup {
        Ok(lookup) => execute(&live_resolver()?, lookup).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(e) if is_input_error(e.as_ref()) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
        Err(e) => Err(e),
    }
}

fn parse_bucket(s: &str) -> Result<OverlayBucket, String> {
    s.trim()
        .parse()
        .map_err(|_| format!("unknown overlay bucket '{s}'"))
}

impl Site {
    fn coordinate(&self) -> Result<Coordinate, CoordinateError> {
        Coordinate::new(self.lat, self.lng)
    }
}

impl Commands {
    /// The lookup this subcommand runs, or `None` for `serve`.
    fn lookup(self) -> Option<Result<Lookup, CoordinateError>> {
        Some(match self {
            Self::Serve => return None,
            Self::Zoning { site, regional } => site
                .coordinate()
                .map(|coord| Lookup::Zoning { coord, regional }),
            Self::Overlays { site, buckets } => site
                .coordinate()
                .map(|coord| Lookup::Overlays { coord, buckets }),
            Self::Parcel { site } => site.coordinate().map(Lookup::Parcel),
            Self::Slope { site } => site.coordinate().map(Lookup::Slope),
            Self::Report { site } => site.coordinate().map(Lookup::Report),
            Self::Geocode { address } => Ok(Lookup::Geocode(address)),
            Self::Councils => Ok(Lookup::Councils),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_for(args: &[&str]) -> Result<Lookup, CoordinateError> {
        let cli = Cli::try_parse_from(std::iter::once("siteline").chain(args.iter().copied()))
            .unwrap();
        cli.command.unwrap().lookup().unwrap()
    }

    #[test]
    fn out_of_range_coordinates_are_input_errors() {
        let err: Box<dyn std::error::Error> =
            lookup_for(&["parcel", "--lat", "95", "--lng", "153"])
                .unwrap_err()
                .into();
        assert!(is_input_error(err.as_ref()));
    }

    #[test]
    fn accepts_negative_coordinates_and_bucket_lists() {
        let lookup = lookup_for(&[
            "overlays",
            "--lat",
            "-26.65",
            "--lng",
            "153.09",
            "--buckets",
            "flood,heritage",
        ])
        .unwrap();
        let Lookup::Overlays { coord, buckets } = lookup else {
            panic!("expected an overlay lookup, got {lookup:?}");
        };
        assert!((coord.latitude() - -26.65).abs() < 1e-9);
        assert_eq!(buckets, [OverlayBucket::Flood, OverlayBucket::Heritage]);
    }

    #[test]
    fn serve_has_no_lookup() {
        let cli = Cli::try_parse_from(["siteline", "serve"]).unwrap();
        assert!(cli.command.unwrap().lookup().is_none());
    }
}
