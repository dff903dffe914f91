pub mod dto;
pub mod errors;
pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::state::AppState;
use handlers::ApiDoc;

pub fn router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route("/login", post(handlers::login))
        .route("/register", post(handlers::register))
        .route("/logout", post(handlers::logout))
        .route(
            "/containers",
            get(handlers::list_containers).post(handlers::create_container),
        )
        .route("/sensor-readings", post(handlers::record_reading))
        .route(
            "/sensor-readings/{sensor_id}",
            get(handlers::reading_history),
        )
        .route("/simulate-sensor-data", post(handlers::simulate_sensor_data))
        .route("/alerts/{id}/resolve", post(handlers::resolve_alert))
        .route("/dashboard/{condominium_id}", get(handlers::get_dashboard))
        .route(
            "/reports/monthly/{condominium_id}",
            get(handlers::monthly_report),
        )
        .route("/demo-request", post(handlers::demo_request))
        .route("/partnership-request", post(handlers::partnership_request))
        .with_state(state)
        .split_for_parts();

    router
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
}
