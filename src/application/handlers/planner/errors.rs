//! Errors shared by the planner handlers.

use std::fmt;

use crate::domain::foundation::{ErrorCode, SessionId};
use crate::domain::menu::PlanningError;
use crate::ports::{AIError, SessionStoreError};

/// Failure of a planner command or query.
///
/// Every variant leaves the stored session as it was before the call.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannerError {
    /// No session with this id is visible to the caller.
    NotFound(SessionId),
    /// The step could not be prepared or its response was rejected.
    Planning(PlanningError),
    /// The generation backend failed.
    Provider(AIError),
    /// Another write reached the session first.
    Conflict(String),
    /// The session store failed.
    Storage(String),
}

impl PlannerError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PlannerError::NotFound(_) => ErrorCode::SessionNotFound,
            PlannerError::Planning(e) => e.code(),
            PlannerError::Provider(AIError::RateLimited { .. }) => ErrorCode::RateLimited,
            PlannerError::Provider(_) => ErrorCode::AIProviderError,
            PlannerError::Conflict(_) => ErrorCode::Conflict,
            PlannerError::Storage(_) => ErrorCode::InternalError,
        }
    }
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannerError::NotFound(id) => write!(f, "Session not found: {}", id),
            PlannerError::Planning(e) => write!(f, "{}", e),
            PlannerError::Provider(e) => write!(f, "AI provider error: {}", e),
            PlannerError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            PlannerError::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for PlannerError {}

impl From<SessionStoreError> for PlannerError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::NotFound(id) => PlannerError::NotFound(id),
            SessionStoreError::Conflict { .. } => PlannerError::Conflict(err.to_string()),
            other => PlannerError::Storage(other.to_string()),
        }
    }
}

impl From<PlanningError> for PlannerError {
    fn from(err: PlanningError) -> Self {
        PlannerError::Planning(err)
    }
}

impl From<AIError> for PlannerError {
    fn from(err: AIError) -> Self {
        PlannerError::Provider(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_maps_to_not_found() {
        let id = SessionId::new();
        let err: PlannerError = SessionStoreError::NotFound(id).into();
        assert_eq!(err, PlannerError::NotFound(id));
        assert_eq!(err.code(), ErrorCode::SessionNotFound);
    }

    #[test]
    fn store_conflict_maps_to_conflict() {
        let err: PlannerError = SessionStoreError::Conflict {
            id: SessionId::new(),
            expected: 1,
            actual: 2,
        }
        .into();
        assert!(matches!(err, PlannerError::Conflict(_)));
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[test]
    fn rate_limits_keep_their_own_code() {
        let err: PlannerError = AIError::rate_limited(10).into();
        assert_eq!(err.code(), ErrorCode::RateLimited);

        let err: PlannerError = AIError::AuthenticationFailed.into();
        assert_eq!(err.code(), ErrorCode::AIProviderError);
    }

    #[test]
    fn planning_errors_pass_through() {
        let err: PlannerError = PlanningError::SessionComplete.into();
        assert_eq!(err.code(), ErrorCode::SessionComplete);
        assert_eq!(err.to_string(), "Menu is already complete");
    }
}
