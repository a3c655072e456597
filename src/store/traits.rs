//! `Storage` trait — single async interface for session and order persistence.
//!
//! The core depends only on load/store semantics keyed by user id (sessions)
//! and order id (orders), never on a specific engine.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::session::model::{Order, OrderId, Session, UserId};

/// Backend-agnostic persistence for sessions and orders.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Load a session by user id. `None` for first-time users.
    async fn load_session(&self, user_id: UserId) -> Result<Option<Session>, StorageError>;

    /// Store a session, replacing any previous value.
    async fn store_session(&self, session: &Session) -> Result<(), StorageError>;

    /// Load an order by id.
    async fn load_order(&self, id: OrderId) -> Result<Option<Order>, StorageError>;

    /// Store an order, replacing any previous value.
    async fn store_order(&self, order: &Order) -> Result<(), StorageError>;

    /// Most recent orders across all users, newest first (admin view).
    async fn recent_orders(&self, limit: usize) -> Result<Vec<Order>, StorageError>;

    /// One user's orders, newest first (history screen).
    async fn orders_for_user(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<Order>, StorageError>;

    /// User ids with a stored session, most recently active first (admin view).
    async fn known_users(&self, limit: usize) -> Result<Vec<UserId>, StorageError>;
}
