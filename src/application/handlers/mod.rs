//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod planner;

pub use planner::{
    // Commands
    DeleteSessionCommand, ResetSessionCommand, StartSessionCommand, SubmitStepCommand,
    // Queries
    GetSessionQuery,
    // Handlers
    DeleteSessionHandler, GetSessionHandler, ResetSessionHandler, StartSessionHandler,
    SubmitStepHandler,
    // Results and settings
    GenerationSettings, PlannerError, SubmitStepResult,
};
