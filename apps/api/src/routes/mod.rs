pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::recommender::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/candidates/:id/recommendations",
            post(handlers::handle_generate).get(handlers::handle_list),
        )
        .route(
            "/api/v1/candidates/:id/jobs/:job_id/match",
            get(handlers::handle_match),
        )
        .with_state(state)
}
