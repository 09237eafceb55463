//! Foundation module - Shared domain primitives.
//!
//! Identifiers, validation errors, client-facing error codes, and the
//! state machine trait used by the planning flow.

mod errors;
mod ids;
mod state_machine;

pub use errors::{ErrorCode, ValidationError};
pub use ids::{SessionId, UserEmail};
pub use state_machine::StateMachine;
