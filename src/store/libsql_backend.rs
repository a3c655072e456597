//! libSQL backend. Supports local file and in-memory databases.
//!
//! Sessions and orders are stored as JSON payloads; the columns that queries
//! filter or sort on (user id, status, timestamps) are kept flat alongside.

use std::path::Path;

use async_trait::async_trait;
use libsql::{Connection, params};
use tracing::{debug, info};

use crate::error::StorageError;
use crate::session::model::{Order, OrderId, Session, UserId};
use crate::store::migrations;
use crate::store::traits::Storage;

/// libSQL storage backend.
///
/// Holds a single connection reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlStorage {
    conn: Connection,
}

impl LibSqlStorage {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Open(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StorageError::Open(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| StorageError::Open(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;
        info!(path = %path.display(), "Database opened");
        Ok(Self { conn })
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, StorageError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StorageError::Open(format!("Failed to create in-memory database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| StorageError::Open(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;
        Ok(Self { conn })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

fn row_to_order(row: &libsql::Row) -> Result<Order, StorageError> {
    let payload: String = row
        .get(0)
        .map_err(|e| StorageError::Query(format!("order payload column: {e}")))?;
    Ok(serde_json::from_str(&payload)?)
}

#[async_trait]
impl Storage for LibSqlStorage {
    async fn load_session(&self, user_id: UserId) -> Result<Option<Session>, StorageError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT payload FROM sessions WHERE user_id = ?1",
                params![user_id],
            )
            .await
            .map_err(|e| StorageError::Query(format!("load_session: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let payload: String = row
                    .get(0)
                    .map_err(|e| StorageError::Query(format!("session payload column: {e}")))?;
                Ok(Some(serde_json::from_str(&payload)?))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(StorageError::Query(format!("load_session: {e}"))),
        }
    }

    async fn store_session(&self, session: &Session) -> Result<(), StorageError> {
        let payload = serde_json::to_string(session)?;
        self.conn()
            .execute(
                "INSERT INTO sessions (user_id, payload, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT (user_id) DO UPDATE SET payload = ?2, updated_at = ?3",
                params![session.user_id, payload, session.updated_at.to_rfc3339()],
            )
            .await
            .map_err(|e| StorageError::Query(format!("store_session: {e}")))?;

        debug!(user_id = session.user_id, "Session stored");
        Ok(())
    }

    async fn load_order(&self, id: OrderId) -> Result<Option<Order>, StorageError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT payload FROM orders WHERE id = ?1",
                params![id.to_string()],
            )
            .await
            .map_err(|e| StorageError::Query(format!("load_order: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_order(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(StorageError::Query(format!("load_order: {e}"))),
        }
    }

    async fn store_order(&self, order: &Order) -> Result<(), StorageError> {
        let payload = serde_json::to_string(order)?;
        self.conn()
            .execute(
                "INSERT INTO orders (id, user_id, payload, status, payment_status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT (id) DO UPDATE SET payload = ?3, status = ?4, payment_status = ?5",
                params![
                    order.id.to_string(),
                    order.user_id,
                    payload,
                    order.status.to_string(),
                    order.payment_status.to_string(),
                    order.created_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| StorageError::Query(format!("store_order: {e}")))?;

        debug!(order_id = %order.id, status = %order.status, "Order stored");
        Ok(())
    }

    async fn recent_orders(&self, limit: usize) -> Result<Vec<Order>, StorageError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT payload FROM orders ORDER BY created_at DESC LIMIT ?1",
                params![limit as i64],
            )
            .await
            .map_err(|e| StorageError::Query(format!("recent_orders: {e}")))?;

        let mut orders = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            match row_to_order(&row) {
                Ok(order) => orders.push(order),
                Err(e) => tracing::warn!("Skipping order row: {e}"),
            }
        }
        Ok(orders)
    }

    async fn orders_for_user(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<Order>, StorageError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT payload FROM orders WHERE user_id = ?1 ORDER BY created_at DESC LIMIT ?2",
                params![user_id, limit as i64],
            )
            .await
            .map_err(|e| StorageError::Query(format!("orders_for_user: {e}")))?;

        let mut orders = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            match row_to_order(&row) {
                Ok(order) => orders.push(order),
                Err(e) => tracing::warn!("Skipping order row: {e}"),
            }
        }
        Ok(orders)
    }

    async fn known_users(&self, limit: usize) -> Result<Vec<UserId>, StorageError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT user_id FROM sessions ORDER BY updated_at DESC LIMIT ?1",
                params![limit as i64],
            )
            .await
            .map_err(|e| StorageError::Query(format!("known_users: {e}")))?;

        let mut users = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            if let Ok(user_id) = row.get::<i64>(0) {
                users.push(user_id);
            }
        }
        Ok(users)
    }
}
