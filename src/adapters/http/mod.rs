//! HTTP adapters - REST API implementations.
//!
//! - `planner` - Session and step endpoints under `/api/sessions`
//! - `health` - Liveness probe
//! - `middleware` - Access gate

pub mod health;
pub mod middleware;
pub mod planner;

use axum::Router;

pub use health::health_routes;
pub use middleware::{access_middleware, AccessState, Caller};
pub use planner::{planner_routes, PlannerHandlers};

/// Assembles the API: gated planner routes plus the open health probe.
pub fn api_router(handlers: PlannerHandlers, access: AccessState) -> Router {
    let planner = planner_routes(handlers)
        .layer(axum::middleware::from_fn_with_state(access, access_middleware));

    Router::new()
        .nest("/api/sessions", planner)
        .merge(health_routes())
}
