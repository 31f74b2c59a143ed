#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standalone entry point for the siteline API server.

#[actix_web::main]
async fn main() -> Result<(), siteline_server::ServerError> {
    siteline_server::run_server().await
}
