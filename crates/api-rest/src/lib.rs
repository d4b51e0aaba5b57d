//! # API REST
//!
//! Development implementation of the ward API.
//!
//! Handles:
//! - HTTP endpoints with axum over an in-memory [`WardStore`]
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS)
//!
//! Uses `api-shared` for the wire types and route paths, and `ward-core` for the bed rules.

#![warn(rust_2018_idioms)]

pub mod seed;
pub mod store;

pub use seed::{Seed, SeedError};
pub use store::WardStore;

use api_shared::{routes, wire, HealthService};
use axum::{
    extract::State,
    response::Json,
    routing::{get, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across REST API handlers.
#[derive(Clone)]
struct AppState {
    store: Arc<WardStore>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_wards,
        list_patients,
        assign_bed,
        unassign_bed,
        change_bed_status,
    ),
    components(schemas(
        wire::HealthRes,
        wire::Ward,
        wire::Bed,
        wire::BedStatus,
        wire::Patient,
        wire::AssignBedReq,
        wire::UnassignBedReq,
        wire::BedStatusReq,
        wire::MutationRes,
    ))
)]
pub struct ApiDoc;

/// Build the ward API router around a store.
pub fn app(store: Arc<WardStore>) -> Router {
    Router::new()
        .route(routes::HEALTH, get(health))
        .route(routes::WARDS, get(list_wards))
        .route(routes::PATIENTS, get(list_patients))
        .route(routes::ASSIGN_BED, put(assign_bed))
        .route(routes::UNASSIGN_BED, put(unassign_bed))
        .route(routes::BED_STATUS, put(change_bed_status))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(AppState { store })
}

/// Bind `addr` and serve the ward API until the process stops.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails while running.
pub async fn serve(addr: &str, store: Arc<WardStore>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("-- Ward API listening on {}", listener.local_addr()?);
    axum::serve(listener, app(store)).await?;
    Ok(())
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = wire::HealthRes)
    )
)]
/// Health check endpoint used by monitoring and by the board CLI.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<wire::HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/wards",
    responses(
        (status = 200, description = "All wards with their beds", body = [wire::Ward])
    )
)]
#[axum::debug_handler]
async fn list_wards(State(state): State<AppState>) -> Json<Vec<wire::Ward>> {
    Json(state.store.wards())
}

#[utoipa::path(
    get,
    path = "/patients",
    responses(
        (status = 200, description = "All known patients, with their bed if placed", body = [wire::Patient])
    )
)]
#[axum::debug_handler]
async fn list_patients(State(state): State<AppState>) -> Json<Vec<wire::Patient>> {
    Json(state.store.patients())
}

#[utoipa::path(
    put,
    path = "/beds/assign",
    request_body = wire::AssignBedReq,
    responses(
        (status = 200, description = "Assignment outcome", body = wire::MutationRes),
        (status = 422, description = "Malformed request body")
    )
)]
/// Place an unassigned patient in a bed that is not occupied.
#[axum::debug_handler]
async fn assign_bed(
    State(state): State<AppState>,
    Json(req): Json<wire::AssignBedReq>,
) -> Json<wire::MutationRes> {
    Json(state.store.assign(&req))
}

#[utoipa::path(
    put,
    path = "/beds/unassign",
    request_body = wire::UnassignBedReq,
    responses(
        (status = 200, description = "Unassignment outcome", body = wire::MutationRes),
        (status = 422, description = "Malformed request body")
    )
)]
#[axum::debug_handler]
async fn unassign_bed(
    State(state): State<AppState>,
    Json(req): Json<wire::UnassignBedReq>,
) -> Json<wire::MutationRes> {
    Json(state.store.unassign(&req))
}

#[utoipa::path(
    put,
    path = "/beds/status",
    request_body = wire::BedStatusReq,
    responses(
        (status = 200, description = "Status change outcome", body = wire::MutationRes),
        (status = 422, description = "Malformed request body")
    )
)]
/// Set a vacant bed's status. `occupied` is refused; use `/beds/assign`.
#[axum::debug_handler]
async fn change_bed_status(
    State(state): State<AppState>,
    Json(req): Json<wire::BedStatusReq>,
) -> Json<wire::MutationRes> {
    Json(state.store.change_status(&req))
}
