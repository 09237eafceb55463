//! Session Store Port - Interface for persisting planning sessions.
//!
//! Writes use optimistic concurrency: every session carries a version, and
//! an update only applies if the stored version still matches the one the
//! caller loaded.

use async_trait::async_trait;

use crate::domain::foundation::SessionId;
use crate::domain::menu::PlanningSession;

/// Errors that can occur during session storage operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Session already exists: {0}")]
    AlreadyExists(SessionId),

    #[error("Session {id} was modified concurrently: expected version {expected}, found {actual}")]
    Conflict {
        id: SessionId,
        expected: u64,
        actual: u64,
    },

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Port for persisting and loading planning sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a newly created session
    ///
    /// # Errors
    /// Returns `SessionStoreError::AlreadyExists` if the id is taken
    async fn create(&self, session: &PlanningSession) -> Result<(), SessionStoreError>;

    /// Load a session by id
    ///
    /// # Errors
    /// Returns `SessionStoreError::NotFound` if no session exists
    async fn load(&self, id: SessionId) -> Result<PlanningSession, SessionStoreError>;

    /// Replace a stored session
    ///
    /// # Arguments
    /// * `session` - The mutated session
    /// * `expected_version` - The version the caller loaded before mutating
    ///
    /// # Errors
    /// Returns `SessionStoreError::Conflict` if another write landed first
    async fn update(
        &self,
        session: &PlanningSession,
        expected_version: u64,
    ) -> Result<(), SessionStoreError>;

    /// Delete a session
    ///
    /// # Errors
    /// Returns `SessionStoreError::NotFound` if no session exists
    async fn delete(&self, id: SessionId) -> Result<(), SessionStoreError>;
}
