//! HTTP handler functions for the siteline API.

use std::sync::Arc;

use actix_web::error::{InternalError, QueryPayloadError};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{HttpRequest, HttpResponse, web};
use siteline_events::{Identity, SearchEvent, SearchKind};
use siteline_lookup::LookupError;
use siteline_lookup::parcel::NO_PARCEL_MESSAGE;
use siteline_lookup_models::Coordinate;
use siteline_server_models::{
    ApiCouncil, ApiError, ApiGeocode, ApiHealth, ApiMe, ApiOverlays, ApiParcel, ApiRegionalZoning,
    ApiSiteReport, ApiSlope, ApiStateZoning, ApiUser, CoordinateParams, GeocodeParams,
    OverlayParams,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/zoning`
///
/// Zoning from the configured regional council's planning scheme.
pub async fn zoning(
    req: HttpRequest,
    state: web::Data<AppState>,
    params: web::Query<CoordinateParams>,
) -> HttpResponse {
    let coord = match params.coordinate() {
        Ok(c) => c,
        Err(e) => return bad_request(e),
    };

    match state.resolver.zoning_regional(coord).await {
        Ok(result) => {
            record(&state, &req, lookup_event(SearchKind::Zoning, &req, coord));
            HttpResponse::Ok().json(ApiRegionalZoning::from(result))
        }
        Err(e) => internal_error("Regional zoning lookup failed", &e),
    }
}

/// `GET /api/zoning-qld`
///
/// State-wide zoning: resolves the LGA, then queries its council.
pub async fn zoning_qld(
    req: HttpRequest,
    state: web::Data<AppState>,
    params: web::Query<CoordinateParams>,
) -> HttpResponse {
    let coord = match params.coordinate() {
        Ok(c) => c,
        Err(e) => return bad_request(e),
    };

    let result = state.resolver.zoning_state(coord).await;
    record(
        &state,
        &req,
        lookup_event(SearchKind::ZoningState, &req, coord).lga(result.lga.clone()),
    );
    HttpResponse::Ok().json(ApiStateZoning::from(result))
}

/// `GET /api/overlays-qld`
///
/// State planning overlays intersecting a buffer around the point.
/// Optional `buckets=flood,heritage` restricts the layers queried.
pub async fn overlays_qld(
    req: HttpRequest,
    state: web::Data<AppState>,
    params: web::Query<OverlayParams>,
) -> HttpResponse {
    let coord = match params.coordinate() {
        Ok(c) => c,
        Err(e) => return bad_request(e),
    };
    let buckets = match params.buckets() {
        Ok(b) => b,
        Err(name) => return bad_request(format!("unknown overlay bucket '{name}'")),
    };

    let overlays = state.resolver.overlays(coord, buckets.as_deref()).await;
    record(&state, &req, lookup_event(SearchKind::Overlays, &req, coord));
    HttpResponse::Ok().json(ApiOverlays { overlays })
}

/// `GET /api/parcel`
pub async fn parcel(
    req: HttpRequest,
    state: web::Data<AppState>,
    params: web::Query<CoordinateParams>,
) -> HttpResponse {
    let coord = match params.coordinate() {
        Ok(c) => c,
        Err(e) => return bad_request(e),
    };

    let parcel = state.resolver.parcel(coord).await;
    let lga = parcel.as_ref().and_then(|p| p.lga.clone());
    record(&state, &req, lookup_event(SearchKind::Parcel, &req, coord).lga(lga));

    let message = parcel.is_none().then(|| NO_PARCEL_MESSAGE.to_string());
    HttpResponse::Ok().json(ApiParcel { parcel, message })
}

/// `GET /api/slope`
pub async fn slope(
    req: HttpRequest,
    state: web::Data<AppState>,
    params: web::Query<CoordinateParams>,
) -> HttpResponse {
    let coord = match params.coordinate() {
        Ok(c) => c,
        Err(e) => return bad_request(e),
    };

    let slope = state.resolver.slope(coord).await;
    record(&state, &req, lookup_event(SearchKind::Slope, &req, coord));
    HttpResponse::Ok().json(ApiSlope { slope })
}

/// `GET /api/geocode`
pub async fn geocode(
    req: HttpRequest,
    state: web::Data<AppState>,
    params: web::Query<GeocodeParams>,
) -> HttpResponse {
    let Some(address) = params.address.as_deref() else {
        return bad_request("address is required");
    };

    match state.resolver.geocode(address).await {
        Ok(candidates) => {
            record(
                &state,
                &req,
                SearchEvent::new(SearchKind::Geocode, req.path()).address(address.trim()),
            );
            HttpResponse::Ok().json(ApiGeocode { candidates })
        }
        Err(e @ LookupError::InvalidAddress { .. }) => bad_request(e),
        Err(e) => internal_error("Geocode failed", &e),
    }
}

/// `GET /api/site-report`
///
/// Zoning, overlays, parcel and slope in one response.
pub async fn site_report(
    req: HttpRequest,
    state: web::Data<AppState>,
    params: web::Query<CoordinateParams>,
) -> HttpResponse {
    let coord = match params.coordinate() {
        Ok(c) => c,
        Err(e) => return bad_request(e),
    };

    let report = state.resolver.site_report(coord).await;
    record(
        &state,
        &req,
        lookup_event(SearchKind::SiteReport, &req, coord).lga(report.zoning.lga.clone()),
    );
    HttpResponse::Ok().json(ApiSiteReport::from(report))
}

/// `GET /api/registry/councils`
///
/// Lists the councils with a registered zoning layer.
pub async fn councils(state: web::Data<AppState>) -> HttpResponse {
    let councils: Vec<ApiCouncil> = state
        .resolver
        .registry()
        .councils()
        .map(|c| ApiCouncil {
            key: c.key.clone(),
            name: c.name.clone(),
            aliases: c.aliases.clone(),
        })
        .collect();
    HttpResponse::Ok().json(councils)
}

/// `GET /api/me`
///
/// The caller behind the bearer token, or `{"user": null}`.
pub async fn me(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let identity = match bearer_token(&req) {
        Some(token) => state.identity.verify(&token).await,
        None => None,
    };
    HttpResponse::Ok().json(ApiMe {
        user: identity.map(|Identity { id, email }| ApiUser { id, email }),
    })
}

/// Rejection for query strings the extractor cannot deserialize, such as
/// a repeated `lat`.
pub fn query_error(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    log::debug!("Rejected query for {}: {err}", req.path());
    let response = bad_request(&err);
    InternalError::from_response(err, response).into()
}

fn bad_request(error: impl ToString) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiError::new(error.to_string()))
}

fn internal_error(context: &str, error: &dyn std::fmt::Display) -> HttpResponse {
    log::error!("{context}: {error}");
    HttpResponse::InternalServerError().json(ApiError::new("Internal server error"))
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn lookup_event(kind: SearchKind, req: &HttpRequest, coord: Coordinate) -> SearchEvent {
    SearchEvent::new(kind, req.path()).at(coord.latitude(), coord.longitude())
}

/// Records `event` in the background. The caller's token, if any, is
/// verified inside the spawned task so the response never waits on it.
fn record(state: &web::Data<AppState>, req: &HttpRequest, event: SearchEvent) {
    let sink = Arc::clone(&state.events);
    let verifier = Arc::clone(&state.identity);
    let token = bearer_token(req);

    actix_web::rt::spawn(async move {
        let identity = match token {
            Some(token) => verifier.verify(&token).await,
            None => None,
        };
        sink.record(event.user(identity.as_ref())).await;
    });
}
