//! GetSessionHandler - Query handler for reading a planning session.

use std::sync::Arc;

use crate::domain::foundation::{SessionId, UserEmail};
use crate::domain::menu::PlanningSession;
use crate::ports::SessionStore;

use super::{load_visible, PlannerError};

/// Query for a single session.
#[derive(Debug, Clone)]
pub struct GetSessionQuery {
    pub session_id: SessionId,
    pub user: Option<UserEmail>,
}

/// Handler for retrieving planning sessions.
pub struct GetSessionHandler {
    store: Arc<dyn SessionStore>,
}

impl GetSessionHandler {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: GetSessionQuery) -> Result<PlanningSession, PlannerError> {
        load_visible(self.store.as_ref(), query.session_id, query.user.as_ref()).await
    }
}
