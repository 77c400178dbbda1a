use crate::handlers;
use crate::state::AppState;
use axum::{Router, routing::get};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/localities", get(handlers::get_localities))
        .route("/api/summary", get(handlers::get_summary))
        .route("/api/statewide", get(handlers::get_statewide))
        .route("/api/rates", get(handlers::get_rates))
        .route("/api/join", get(handlers::get_join_report))
        .with_state(state)
}
