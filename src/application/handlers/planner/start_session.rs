//! StartSessionHandler - Command handler for creating planning sessions.

use std::sync::Arc;

use crate::domain::foundation::UserEmail;
use crate::domain::menu::PlanningSession;
use crate::ports::SessionStore;

use super::PlannerError;

/// Command to start a new planning session.
#[derive(Debug, Clone, Default)]
pub struct StartSessionCommand {
    /// Identity that will own the session, if the gate supplied one.
    pub owner: Option<UserEmail>,
}

/// Handler for starting planning sessions.
pub struct StartSessionHandler {
    store: Arc<dyn SessionStore>,
}

impl StartSessionHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, cmd: StartSessionCommand) -> Result<PlanningSession, PlannerError> {
        let session = PlanningSession::new(cmd.owner);
        self.store.create(&session).await?;

        tracing::info!(session_id = %session.id(), step = %session.step(), "Planning session started");
        Ok(session)
    }
}
