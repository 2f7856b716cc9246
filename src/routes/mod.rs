pub mod candidates;
pub mod health;
pub mod join_requests;
pub mod postings;
pub mod recommendations;

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{auth, rate_limit};
use crate::AppState;

pub fn router(state: AppState, api_rps: u32) -> Router {
    let api = Router::new()
        .route("/api/candidates", post(candidates::register_candidate))
        .route("/api/candidates/:id", get(candidates::get_candidate))
        .route(
            "/api/candidates/:id/recommended-postings",
            get(recommendations::recommended_postings),
        )
        .route("/api/me/join-requests", get(join_requests::list_my_requests))
        .route("/api/postings", post(postings::create_posting))
        .route("/api/postings/:id", get(postings::get_posting))
        .route("/api/postings/:id/status", patch(postings::update_posting_status))
        .route(
            "/api/postings/:id/recommended-teammates",
            get(recommendations::recommended_teammates),
        )
        .route(
            "/api/projects/:id/join-requests",
            get(join_requests::list_project_requests).post(join_requests::create_project_request),
        )
        .route(
            "/api/project-requests/:id/resolve",
            post(join_requests::resolve_project_request),
        )
        .route(
            "/api/research/:id/join-requests",
            get(join_requests::list_research_requests).post(join_requests::create_research_request),
        )
        .route(
            "/api/research-requests/:id/resolve",
            post(join_requests::resolve_research_request),
        )
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::RateLimiter::new(api_rps),
            rate_limit::rps_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer_auth,
        ));

    Router::new()
        .route("/health", get(health::health))
        .merge(api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
