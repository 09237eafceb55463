//! HTTP adapter for planner endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    CourseAnalysisView, ErrorResponse, LatestRecordView, MenuAnalysisView, SelectionView,
    SessionView, SubmitStepRequest, SuggestionView,
};
pub use handlers::PlannerHandlers;
pub use routes::planner_routes;
