pub mod health;
pub mod rag;
pub mod slack;

use axum::http::{header, Method, StatusCode};
use axum::{routing::get, routing::post, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::state::AppState;
use crate::domain::DomainError;

pub fn create_router(state: AppState) -> Router {
    let cors = build_cors(&state.config.config.cors.allowed_origins);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/ask-for-db", get(rag::query_handler))
        .route("/ask", get(rag::ask_handler))
        .route("/upsert", post(rag::upsert_handler))
        .nest("/slack", slack_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
    }
}

fn slack_routes() -> Router<AppState> {
    Router::new()
        .route("/commands", post(slack::command_handler))
        .route("/commands/append", post(slack::open_append_modal))
        .route("/interactions", post(slack::interaction_handler))
}

/// Maps a service error to a response status, logging it on the way.
pub(crate) fn error_status(e: DomainError) -> StatusCode {
    if e.is_client_error() {
        tracing::warn!(error = %e, "Rejected request");
        StatusCode::BAD_REQUEST
    } else {
        tracing::error!(error = %e, "Request failed");
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
