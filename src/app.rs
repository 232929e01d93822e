use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/medications/:id/toggle", post(handlers::toggle_form))
        .route("/api/today", get(handlers::get_today))
        .route(
            "/api/medications",
            get(handlers::list_medications).post(handlers::add_medication),
        )
        .route("/api/medications/:id/toggle", post(handlers::toggle))
        .route("/api/calendar", get(handlers::get_calendar))
        .route("/api/history", get(handlers::get_history))
        .with_state(state)
}
