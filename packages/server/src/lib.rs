#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for siteline property lookups.
//!
//! Serves zoning, overlay, parcel, slope and geocode lookups over the
//! public GIS services described by the embedded registry. Every lookup
//! degrades to an empty or null result when an upstream is unavailable;
//! only bad input (400) and local faults (500) are errors.

mod handlers;
pub mod interactive;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use siteline_arcgis::HttpUpstream;
use siteline_events::{EventSink, IdentityVerifier, sink_from_env, verifier_from_env};
use siteline_lookup::Resolver;
use siteline_registry::Registry;
use thiserror::Error;

/// Errors that stop the server from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The shared HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Binding or running the listener failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared application state.
pub struct AppState {
    /// Lookup orchestrators over the registry and upstream client.
    pub resolver: Resolver,
    /// Where search events go.
    pub events: Arc<dyn EventSink>,
    /// Bearer token verification.
    pub identity: Arc<dyn IdentityVerifier>,
}

impl AppState {
    /// Builds production state: the embedded registry, a pooled HTTP
    /// upstream, and the event sink and identity verifier selected by the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Http`] if the HTTP client cannot be built.
    pub fn from_env() -> Result<Self, ServerError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("siteline/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let registry = Arc::new(Registry::embedded());
        log::info!(
            "Loaded registry: {} councils, {} overlay layers",
            registry.councils().count(),
            registry.overlays().len()
        );

        Ok(Self {
            resolver: Resolver::new(registry, Arc::new(HttpUpstream::with_client(client.clone()))),
            events: sink_from_env(client.clone()),
            identity: verifier_from_env(client),
        })
    }
}

/// Registers the `/api` routes.
///
/// Query strings that fail to deserialize are answered with a JSON 400
/// body like any other invalid parameter.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::QueryConfig::default().error_handler(handlers::query_error))
            .route("/health", web::get().to(handlers::health))
            .route("/zoning", web::get().to(handlers::zoning))
            .route("/zoning-qld", web::get().to(handlers::zoning_qld))
            .route("/overlays-qld", web::get().to(handlers::overlays_qld))
            .route("/parcel", web::get().to(handlers::parcel))
            .route("/slope", web::get().to(handlers::slope))
            .route("/geocode", web::get().to(handlers::geocode))
            .route("/site-report", web::get().to(handlers::site_report))
            .route("/registry/councils", web::get().to(handlers::councils))
            .route("/me", web::get().to(handlers::me)),
    );
}

/// Starts the siteline API server.
///
/// Builds the application state from the environment and serves the API
/// on `BIND_ADDR:PORT` (default `127.0.0.1:8080`). This is a regular
/// async function; the caller provides the runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns [`ServerError`] if the HTTP client cannot be built or the
/// server fails to bind or run.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> Result<(), ServerError> {
    if pretty_env_logger::try_init_custom_env("RUST_LOG").is_err() {
        log::debug!("Logger already initialised");
    }

    let state = web::Data::new(AppState::from_env()?);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await?;

    Ok(())
}
