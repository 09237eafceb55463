//! Menu planning error types.

use thiserror::Error;

use super::output_schema::SchemaValidationError;
use super::step::PlanningStep;
use crate::domain::foundation::{ErrorCode, ValidationError};

/// Errors raised while preparing or accepting a planning step.
///
/// Every variant leaves the session exactly as it was.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlanningError {
    #[error("Invalid input: {0}")]
    InputInvalid(#[from] ValidationError),

    #[error("Response failed validation: {0}")]
    SchemaValidation(#[from] SchemaValidationError),

    #[error("Menu is already complete")]
    SessionComplete,

    #[error("Request was prepared for step {prepared} but the session is at {current}")]
    StaleRequest {
        prepared: PlanningStep,
        current: PlanningStep,
    },
}

impl PlanningError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PlanningError::InputInvalid(_) => ErrorCode::InputInvalid,
            PlanningError::SchemaValidation(_) => ErrorCode::SchemaValidationFailed,
            PlanningError::SessionComplete => ErrorCode::SessionComplete,
            PlanningError::StaleRequest { .. } => ErrorCode::StaleRequest,
        }
    }

    /// Message suitable for API clients.
    pub fn client_message(&self) -> String {
        match self {
            PlanningError::SchemaValidation(e) => e.to_client_message(),
            other => other.to_string(),
        }
    }
}
