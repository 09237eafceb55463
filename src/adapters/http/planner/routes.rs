//! HTTP routes for planner endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    delete_session, get_session, reset_session, start_session, submit_step, PlannerHandlers,
};

/// Creates the planner router, to be nested under `/api/sessions`.
pub fn planner_routes(handlers: PlannerHandlers) -> Router {
    Router::new()
        .route("/", post(start_session))
        .route("/:id", get(get_session).delete(delete_session))
        .route("/:id/steps", post(submit_step))
        .route("/:id/reset", post(reset_session))
        .with_state(handlers)
}
