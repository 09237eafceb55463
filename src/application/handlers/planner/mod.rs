//! Planner Command and Query Handlers
//!
//! Handlers that drive a dinner planning session through its steps.
//!
//! ## Commands
//! - `StartSession` - Create a session at the wine step
//! - `SubmitStep` - Run the current step against the AI provider
//! - `ResetSession` - Return a session to the wine step with nothing recorded
//! - `DeleteSession` - Remove a session
//!
//! ## Queries
//! - `GetSession` - Retrieve a session

mod delete_session;
mod errors;
mod get_session;
mod reset_session;
mod start_session;
mod submit_step;

pub use delete_session::{DeleteSessionCommand, DeleteSessionHandler};
pub use errors::PlannerError;
pub use get_session::{GetSessionHandler, GetSessionQuery};
pub use reset_session::{ResetSessionCommand, ResetSessionHandler};
pub use start_session::{StartSessionCommand, StartSessionHandler};
pub use submit_step::{GenerationSettings, SubmitStepCommand, SubmitStepHandler, SubmitStepResult};

use crate::domain::foundation::{SessionId, UserEmail};
use crate::domain::menu::PlanningSession;
use crate::ports::SessionStore;

/// Loads a session the caller may see.
///
/// Sessions owned by someone else are reported as missing so their ids
/// cannot be probed.
async fn load_visible(
    store: &dyn SessionStore,
    session_id: SessionId,
    user: Option<&UserEmail>,
) -> Result<PlanningSession, PlannerError> {
    let session = store.load(session_id).await?;
    if !session.is_accessible_by(user) {
        return Err(PlannerError::NotFound(session_id));
    }
    Ok(session)
}
