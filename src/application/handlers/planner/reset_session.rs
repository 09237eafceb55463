//! ResetSessionHandler - Command handler for starting a menu over.

use std::sync::Arc;

use crate::domain::foundation::{SessionId, UserEmail};
use crate::domain::menu::PlanningSession;
use crate::ports::SessionStore;

use super::{load_visible, PlannerError};

/// Command to clear a session back to the wine step.
#[derive(Debug, Clone)]
pub struct ResetSessionCommand {
    pub session_id: SessionId,
    pub user: Option<UserEmail>,
}

/// Handler for resetting planning sessions.
pub struct ResetSessionHandler {
    store: Arc<dyn SessionStore>,
}

impl ResetSessionHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, cmd: ResetSessionCommand) -> Result<PlanningSession, PlannerError> {
        let mut session = load_visible(self.store.as_ref(), cmd.session_id, cmd.user.as_ref()).await?;
        let expected_version = session.version();
        let previous_step = session.step();

        session.reset();
        self.store.update(&session, expected_version).await?;

        tracing::info!(
            session_id = %session.id(),
            from = %previous_step,
            "Planning session reset"
        );
        Ok(session)
    }
}
