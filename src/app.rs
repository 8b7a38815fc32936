use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/month", get(handlers::get_month))
        .route("/api/month/title", post(handlers::rename_month))
        .route("/api/month/length", post(handlers::set_month_length))
        .route("/api/month/clear-checks", post(handlers::clear_checks))
        .route("/api/month/reset", post(handlers::reset_all))
        .route("/api/habits", post(handlers::add_habit))
        .route("/api/habits/:id/rename", post(handlers::rename_habit))
        .route("/api/habits/:id/delete", post(handlers::delete_habit))
        .route("/api/habits/:id/check", post(handlers::set_check))
        .route("/api/habits/:id/goal", post(handlers::set_goal))
        .route("/api/save", post(handlers::save))
        .route("/api/reload", post(handlers::reload))
        .with_state(state)
}
