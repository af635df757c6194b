//! In-memory session registry.
//!
//! Each session sits behind its own mutex; a handler holds that lock for the
//! whole request, so concurrent requests against one session run one at a time.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::screening::session::Session;

pub type SessionHandle = Arc<Mutex<Session>>;

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Registers a new session, purging idle ones first.
    pub async fn insert(&self, session: Session) -> SessionHandle {
        self.purge_expired().await;

        let id = session.id;
        let handle = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(id, handle.clone());
        handle
    }

    pub async fn get(&self, id: Uuid) -> Result<SessionHandle, AppError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops sessions idle for longer than the TTL. Sessions locked by an
    /// in-flight request are in use and are kept.
    pub async fn purge_expired(&self) -> usize {
        let cutoff = Utc::now() - self.ttl;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => session.updated_at >= cutoff,
            Err(_) => true,
        });
        let purged = before - sessions.len();
        if purged > 0 {
            info!("Purged {purged} idle screening sessions");
        }
        purged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screening::session::test_support::session;

    #[tokio::test]
    async fn test_insert_get_remove() {
        let store = SessionStore::new(Duration::minutes(60));
        let s = session();
        let id = s.id;
        store.insert(s).await;

        let handle = store.get(id).await.unwrap();
        assert_eq!(handle.lock().await.id, id);

        store.remove(id).await.unwrap();
        assert!(matches!(store.get(id).await, Err(AppError::NotFound(_))));
        assert!(store.remove(id).await.is_err());
    }

    #[tokio::test]
    async fn test_idle_sessions_are_purged() {
        let store = SessionStore::new(Duration::minutes(30));

        let mut stale = session();
        stale.updated_at = Utc::now() - Duration::minutes(31);
        let stale_id = stale.id;
        store.insert(stale).await;

        let fresh = session();
        let fresh_id = fresh.id;
        // inserting purges the stale session
        store.insert(fresh).await;

        assert!(store.get(stale_id).await.is_err());
        assert!(store.get(fresh_id).await.is_ok());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_locked_sessions_survive_purge() {
        let store = SessionStore::new(Duration::minutes(1));
        let mut s = session();
        s.updated_at = Utc::now() - Duration::minutes(10);
        let handle = store.insert(s).await;

        let _guard = handle.lock().await;
        assert_eq!(store.purge_expired().await, 0);
    }
}
