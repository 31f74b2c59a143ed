//! Interactive mode: pick a tool, answer prompts, print the result.

use dialoguer::{Confirm, Input, MultiSelect, Select};
use siteline_lookup_models::{Coordinate, OverlayBucket};
use strum::IntoEnumIterator;

use crate::lookup::{Lookup, execute, is_input_error};

/// Top-level tool selection.
enum Tool {
    Server,
    Report,
    Zoning,
    Overlays,
    Parcel,
    Slope,
    Geocode,
    Councils,
}

impl Tool {
    const ALL: &[Self] = &[
        Self::Server,
        Self::Report,
        Self::Zoning,
        Self::Overlays,
        Self::Parcel,
        Self::Slope,
        Self::Geocode,
        Self::Councils,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Server => "Start server",
            Self::Report => "Full site report",
            Self::Zoning => "Zoning",
            Self::Overlays => "Planning overlays",
            Self::Parcel => "Parcel",
            Self::Slope => "Slope",
            Self::Geocode => "Find an address",
            Self::Councils => "List councils",
        }
    }
}

/// Runs the interactive menu.
///
/// # Errors
///
/// Returns an error if a prompt fails or the lookup hits a local fault.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("Siteline");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();
    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    let lookup = match Tool::ALL[idx] {
        Tool::Server => return crate::serve(true).await,
        Tool::Report => Lookup::Report(prompt_site()?),
        Tool::Zoning => {
            let coord = prompt_site()?;
            let regional = Confirm::new()
                .with_prompt("Query the regional council directly?")
                .default(false)
                .interact()?;
            Lookup::Zoning { coord, regional }
        }
        Tool::Overlays => {
            let coord = prompt_site()?;
            Lookup::Overlays {
                coord,
                buckets: prompt_buckets()?,
            }
        }
        Tool::Parcel => Lookup::Parcel(prompt_site()?),
        Tool::Slope => Lookup::Slope(prompt_site()?),
        Tool::Geocode => {
            let address: String = Input::new().with_prompt("Address").interact_text()?;
            Lookup::Geocode(address)
        }
        Tool::Councils => Lookup::Councils,
    };

    match execute(&crate::live_resolver()?, lookup).await {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(e) if is_input_error(e.as_ref()) => println!("{e}"),
        Err(e) => return Err(e),
    }
    Ok(())
}

/// Prompts until a valid coordinate is entered.
fn prompt_site() -> Result<Coordinate, dialoguer::Error> {
    loop {
        let lat: f64 = Input::new().with_prompt("Latitude").interact_text()?;
        let lng: f64 = Input::new().with_prompt("Longitude").interact_text()?;
        match Coordinate::new(lat, lng) {
            Ok(coord) => return Ok(coord),
            Err(e) => println!("{e}"),
        }
    }
}

/// Empty selection means every bucket.
fn prompt_buckets() -> Result<Vec<OverlayBucket>, dialoguer::Error> {
    let all: Vec<OverlayBucket> = OverlayBucket::iter().collect();
    let labels: Vec<String> = all.iter().map(ToString::to_string).collect();
    let picked = MultiSelect::new()
        .with_prompt("Buckets (none selected = all)")
        .items(&labels)
        .interact()?;
    Ok(picked.into_iter().map(|i| all[i]).collect())
}
