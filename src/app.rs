use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, put},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/habits", get(handlers::list_habits).post(handlers::create_habit))
        .route("/api/habits/:id", delete(handlers::delete_habit))
        .route("/api/habits/:id/logs", get(handlers::get_logs))
        .route("/api/habits/:id/logs/:date", put(handlers::put_log))
        .route("/api/habits/:id/stats", get(handlers::get_habit_stats))
        .route("/api/stats", get(handlers::get_all_stats))
        .with_state(state)
}
