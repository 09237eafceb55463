//! DeleteSessionHandler - Command handler for removing planning sessions.

use std::sync::Arc;

use crate::domain::foundation::{SessionId, UserEmail};
use crate::ports::SessionStore;

use super::{load_visible, PlannerError};

/// Command to delete a session.
#[derive(Debug, Clone)]
pub struct DeleteSessionCommand {
    pub session_id: SessionId,
    pub user: Option<UserEmail>,
}

/// Handler for deleting planning sessions.
pub struct DeleteSessionHandler {
    store: Arc<dyn SessionStore>,
}

impl DeleteSessionHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, cmd: DeleteSessionCommand) -> Result<(), PlannerError> {
        load_visible(self.store.as_ref(), cmd.session_id, cmd.user.as_ref()).await?;
        self.store.delete(cmd.session_id).await?;

        tracing::info!(session_id = %cmd.session_id, "Planning session deleted");
        Ok(())
    }
}
