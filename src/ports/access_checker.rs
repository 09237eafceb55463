//! Access Checker Port - Gate in front of the planner.
//!
//! Decides whether a caller may use the planner at all. It does not decide
//! which sessions a caller may see; sessions track their own owner.
//!
//! # Design
//!
//! Fail-secure: a missing or malformed identity is denied unless the
//! deployment is explicitly open.

use crate::domain::foundation::UserEmail;

/// Why a caller was turned away.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("No identity was provided")]
    MissingIdentity,

    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("{0} is not authorized to use the planner")]
    NotAuthorized(UserEmail),
}

/// Binary allow/deny decision for a caller.
pub trait AccessChecker: Send + Sync {
    /// Checks the raw identity presented by a caller.
    ///
    /// Returns the normalized identity when one was provided. Open
    /// deployments may allow anonymous callers and return `Ok(None)`.
    fn check(&self, identity: Option<&str>) -> Result<Option<UserEmail>, AccessError>;

    /// Whether every caller is allowed.
    fn is_open(&self) -> bool;
}
