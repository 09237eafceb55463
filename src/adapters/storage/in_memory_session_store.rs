//! In-Memory Session Store Adapter
//!
//! Keeps planning sessions in process memory. Sessions are lost on restart.
//! Idle sessions expire after the retention policy's TTL, and the store never
//! holds more than `max_sessions`: creating past the cap drops the session
//! that has been idle longest.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::domain::foundation::SessionId;
use crate::domain::menu::PlanningSession;
use crate::ports::{SessionStore, SessionStoreError};

/// How long and how many sessions are retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Sessions untouched for longer than this are evicted.
    pub idle_ttl: Duration,
    pub max_sessions: usize,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            idle_ttl: Duration::from_secs(60 * 60),
            max_sessions: 10_000,
        }
    }
}

/// In-memory storage for planning sessions
#[derive(Debug, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, PlanningSession>>>,
    policy: RetentionPolicy,
}

impl InMemorySessionStore {
    /// Create a new empty store with the default retention policy
    pub fn new() -> Self {
        Self::with_policy(RetentionPolicy::default())
    }

    pub fn with_policy(policy: RetentionPolicy) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            policy,
        }
    }

    /// Get the number of stored sessions
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Removes sessions idle for longer than the TTL as of `now`.
    ///
    /// Returns how many were removed.
    pub async fn evict_idle(&self, now: DateTime<Utc>) -> usize {
        let Some(cutoff) = idle_cutoff(now, self.policy.idle_ttl) else {
            return 0;
        };
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.updated_at() > cutoff);
        before - sessions.len()
    }

    /// Spawns a task that evicts idle sessions every `every`.
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let evicted = store.evict_idle(Utc::now()).await;
                if evicted > 0 {
                    tracing::debug!(evicted, "Evicted idle planning sessions");
                }
            }
        })
    }
}

fn idle_cutoff(now: DateTime<Utc>, ttl: Duration) -> Option<DateTime<Utc>> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_sub_signed(ttl))
}

/// Frees one slot in a full map, preferring expired sessions.
fn make_room(
    sessions: &mut HashMap<SessionId, PlanningSession>,
    policy: &RetentionPolicy,
    now: DateTime<Utc>,
) {
    if sessions.len() < policy.max_sessions {
        return;
    }
    if let Some(cutoff) = idle_cutoff(now, policy.idle_ttl) {
        sessions.retain(|_, session| session.updated_at() > cutoff);
    }
    while sessions.len() >= policy.max_sessions {
        let stalest = sessions
            .values()
            .min_by_key(|session| session.updated_at())
            .map(|session| session.id());
        match stalest {
            Some(id) => {
                sessions.remove(&id);
                tracing::debug!(session_id = %id, "Evicted stalest session at capacity");
            }
            None => break,
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, session: &PlanningSession) -> Result<(), SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id()) {
            return Err(SessionStoreError::AlreadyExists(session.id()));
        }
        make_room(&mut sessions, &self.policy, Utc::now());
        sessions.insert(session.id(), session.clone());
        Ok(())
    }

    async fn load(&self, id: SessionId) -> Result<PlanningSession, SessionStoreError> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&id)
            .cloned()
            .ok_or(SessionStoreError::NotFound(id))
    }

    async fn update(
        &self,
        session: &PlanningSession,
        expected_version: u64,
    ) -> Result<(), SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions
            .get_mut(&session.id())
            .ok_or(SessionStoreError::NotFound(session.id()))?;

        if stored.version() != expected_version {
            return Err(SessionStoreError::Conflict {
                id: session.id(),
                expected: expected_version,
                actual: stored.version(),
            });
        }

        *stored = session.clone();
        Ok(())
    }

    async fn delete(&self, id: SessionId) -> Result<(), SessionStoreError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(SessionStoreError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_load_round_trips() {
        let store = InMemorySessionStore::new();
        let session = PlanningSession::new(None);

        store.create(&session).await.unwrap();

        assert_eq!(store.load(session.id()).await.unwrap(), session);
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_id() {
        let store = InMemorySessionStore::new();
        let session = PlanningSession::new(None);
        store.create(&session).await.unwrap();

        let err = store.create(&session).await.unwrap_err();
        assert_eq!(err, SessionStoreError::AlreadyExists(session.id()));
    }

    #[tokio::test]
    async fn load_missing_session_is_not_found() {
        let store = InMemorySessionStore::new();
        let id = SessionId::new();

        assert_eq!(
            store.load(id).await.unwrap_err(),
            SessionStoreError::NotFound(id)
        );
    }

    #[tokio::test]
    async fn update_with_current_version_applies() {
        let store = InMemorySessionStore::new();
        let mut session = PlanningSession::new(None);
        store.create(&session).await.unwrap();

        let expected = session.version();
        session.reset();
        store.update(&session, expected).await.unwrap();

        assert_eq!(store.load(session.id()).await.unwrap().version(), 1);
    }

    #[tokio::test]
    async fn update_with_stale_version_conflicts() {
        let store = InMemorySessionStore::new();
        let original = PlanningSession::new(None);
        store.create(&original).await.unwrap();

        let mut first = original.clone();
        first.reset();
        store.update(&first, original.version()).await.unwrap();

        let mut second = original.clone();
        second.reset();
        let err = store.update(&second, original.version()).await.unwrap_err();

        assert_eq!(
            err,
            SessionStoreError::Conflict {
                id: original.id(),
                expected: 0,
                actual: 1,
            }
        );
    }

    #[tokio::test]
    async fn delete_removes_session() {
        let store = InMemorySessionStore::new();
        let session = PlanningSession::new(None);
        store.create(&session).await.unwrap();

        store.delete(session.id()).await.unwrap();

        assert!(store.load(session.id()).await.is_err());
        assert_eq!(
            store.delete(session.id()).await.unwrap_err(),
            SessionStoreError::NotFound(session.id())
        );
    }

    #[tokio::test]
    async fn idle_sessions_are_evicted_after_ttl() {
        let store = InMemorySessionStore::with_policy(RetentionPolicy {
            idle_ttl: Duration::from_secs(60),
            max_sessions: 10,
        });
        let session = PlanningSession::new(None);
        store.create(&session).await.unwrap();

        assert_eq!(store.evict_idle(Utc::now()).await, 0);
        assert!(store.load(session.id()).await.is_ok());

        let later = Utc::now() + chrono::Duration::seconds(61);
        assert_eq!(store.evict_idle(later).await, 1);
        assert_eq!(
            store.load(session.id()).await.unwrap_err(),
            SessionStoreError::NotFound(session.id())
        );
    }

    #[tokio::test]
    async fn create_at_capacity_drops_stalest_session() {
        let store = InMemorySessionStore::with_policy(RetentionPolicy {
            idle_ttl: Duration::from_secs(3600),
            max_sessions: 2,
        });
        let mut ids = Vec::new();
        for _ in 0..3 {
            let session = PlanningSession::new(None);
            store.create(&session).await.unwrap();
            ids.push(session.id());
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert_eq!(store.session_count().await, 2);
        assert!(store.load(ids[0]).await.is_err());
        assert!(store.load(ids[1]).await.is_ok());
        assert!(store.load(ids[2]).await.is_ok());
    }

    #[tokio::test]
    async fn sweeper_evicts_in_background() {
        let store = InMemorySessionStore::with_policy(RetentionPolicy {
            idle_ttl: Duration::from_millis(10),
            max_sessions: 10,
        });
        store.create(&PlanningSession::new(None)).await.unwrap();

        let sweeper = store.spawn_sweeper(Duration::from_millis(5));
        tokio::time::sleep(Duration::from_millis(100)).await;
        sweeper.abort();

        assert_eq!(store.session_count().await, 0);
    }
}
