//! Session store — per-user state container with a read-modify-write cycle.
//!
//! Callers `get` a copy, mutate it locally, and `save` it back; that cycle is
//! the concurrency boundary. The dispatcher serializes events for one user by
//! holding the per-user lock from `user_lock` across the cycle, while events
//! for distinct users proceed fully concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};

use crate::error::StorageError;
use crate::session::model::{Session, UserId};
use crate::store::Storage;

/// In-memory session map with write-through persistence.
pub struct SessionStore {
    sessions: RwLock<HashMap<UserId, Session>>,
    locks: RwLock<HashMap<UserId, Arc<Mutex<()>>>>,
    storage: Arc<dyn Storage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            locks: RwLock::new(HashMap::new()),
            storage,
        }
    }

    /// Get the per-user lock, creating it on first use.
    ///
    /// The dispatcher holds this across one event's get → mutate → save
    /// cycle and releases it around external collaborator calls.
    pub async fn user_lock(&self, user_id: UserId) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.read().await.get(&user_id) {
            return Arc::clone(lock);
        }
        let mut locks = self.locks.write().await;
        Arc::clone(locks.entry(user_id).or_default())
    }

    /// Get the session for a user, creating a default one if absent.
    ///
    /// Never fails: a storage read error degrades to a fresh default session.
    pub async fn get(&self, user_id: UserId) -> Session {
        if let Some(session) = self.sessions.read().await.get(&user_id) {
            return session.clone();
        }

        // Load-through on first sight of this user.
        let loaded = match self.storage.load_session(user_id).await {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Failed to load session; using default");
                None
            }
        };
        let session = loaded.unwrap_or_else(|| Session::new(user_id));

        let mut sessions = self.sessions.write().await;
        sessions.entry(user_id).or_insert(session).clone()
    }

    /// Atomically replace a user's session.
    ///
    /// Persists first, then swaps the in-memory copy, so a storage failure
    /// leaves the previous session intact (no partial write).
    pub async fn save(&self, user_id: UserId, mut session: Session) -> Result<(), StorageError> {
        session.updated_at = Utc::now();
        self.storage.store_session(&session).await?;
        self.sessions.write().await.insert(user_id, session);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::model::ScreenId;
    use crate::store::InMemoryStorage;

    fn store() -> SessionStore {
        SessionStore::new(Arc::new(InMemoryStorage::new()))
    }

    #[tokio::test]
    async fn creates_default_session_on_first_get() {
        let store = store();
        let session = store.get(1).await;
        assert_eq!(session.user_id, 1);
        assert_eq!(session.current_screen, ScreenId::Start);
        assert!(session.cart.is_empty());
    }

    #[tokio::test]
    async fn save_then_get_roundtrip() {
        let store = store();
        let mut session = store.get(1).await;
        session.current_screen = ScreenId::Catalog;
        session.nav_stack.push(ScreenId::Start);
        store.save(1, session).await.unwrap();

        let reread = store.get(1).await;
        assert_eq!(reread.current_screen, ScreenId::Catalog);
        assert_eq!(reread.nav_stack, vec![ScreenId::Start]);
    }

    #[tokio::test]
    async fn sessions_are_isolated_per_user() {
        let store = store();
        let mut a = store.get(1).await;
        a.current_screen = ScreenId::Cart;
        store.save(1, a).await.unwrap();

        let b = store.get(2).await;
        assert_eq!(b.current_screen, ScreenId::Start);
    }

    #[tokio::test]
    async fn load_through_from_storage() {
        let storage = Arc::new(InMemoryStorage::new());
        let mut session = Session::new(5);
        session.current_screen = ScreenId::AiMenu;
        storage.store_session(&session).await.unwrap();

        let store = SessionStore::new(storage);
        let loaded = store.get(5).await;
        assert_eq!(loaded.current_screen, ScreenId::AiMenu);
    }

    #[tokio::test]
    async fn user_lock_is_stable_per_user() {
        let store = store();
        let a = store.user_lock(1).await;
        let b = store.user_lock(1).await;
        assert!(Arc::ptr_eq(&a, &b));
        let c = store.user_lock(2).await;
        assert!(!Arc::ptr_eq(&a, &c));
    }
}
