use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/goals", post(handlers::create_goal_form))
        .route(
            "/goals/:id/delete",
            get(handlers::confirm_delete_page).post(handlers::delete_goal_form),
        )
        .route("/days/:date/goals/:id/toggle", post(handlers::toggle_form))
        .route("/days/:date/goals/:id/adjust", post(handlers::adjust_form))
        .route("/report", get(handlers::report_page))
        .route("/report/export", get(handlers::export_report_page))
        .route("/api/goals", get(handlers::list_goals).post(handlers::create_goal))
        .route("/api/goals/:id", delete(handlers::delete_goal))
        .route("/api/today", get(handlers::get_today))
        .route("/api/days/:date", get(handlers::get_day))
        .route("/api/days/:date/record", post(handlers::record))
        .route("/api/days/:date/adjust", post(handlers::adjust))
        .route("/api/reports/:month", get(handlers::get_report))
        .route("/api/reports/:month/export", get(handlers::export_report))
        .with_state(state)
}
