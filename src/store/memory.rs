//! In-memory storage backend, used in tests and when no database path is
//! configured. Everything is lost on restart.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::session::model::{Order, OrderId, Session, UserId};
use crate::store::traits::Storage;

#[derive(Default)]
pub struct InMemoryStorage {
    sessions: RwLock<HashMap<UserId, Session>>,
    orders: RwLock<Vec<Order>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned(what: &str) -> StorageError {
        StorageError::Query(format!("{what} lock poisoned"))
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn load_session(&self, user_id: UserId) -> Result<Option<Session>, StorageError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| Self::poisoned("sessions"))?;
        Ok(sessions.get(&user_id).cloned())
    }

    async fn store_session(&self, session: &Session) -> Result<(), StorageError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| Self::poisoned("sessions"))?;
        sessions.insert(session.user_id, session.clone());
        Ok(())
    }

    async fn load_order(&self, id: OrderId) -> Result<Option<Order>, StorageError> {
        let orders = self.orders.read().map_err(|_| Self::poisoned("orders"))?;
        Ok(orders.iter().find(|o| o.id == id).cloned())
    }

    async fn store_order(&self, order: &Order) -> Result<(), StorageError> {
        let mut orders = self.orders.write().map_err(|_| Self::poisoned("orders"))?;
        if let Some(existing) = orders.iter_mut().find(|o| o.id == order.id) {
            *existing = order.clone();
        } else {
            orders.push(order.clone());
        }
        Ok(())
    }

    async fn recent_orders(&self, limit: usize) -> Result<Vec<Order>, StorageError> {
        let orders = self.orders.read().map_err(|_| Self::poisoned("orders"))?;
        let mut all: Vec<Order> = orders.clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all.truncate(limit);
        Ok(all)
    }

    async fn orders_for_user(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<Order>, StorageError> {
        let orders = self.orders.read().map_err(|_| Self::poisoned("orders"))?;
        let mut mine: Vec<Order> = orders.iter().filter(|o| o.user_id == user_id).cloned().collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        mine.truncate(limit);
        Ok(mine)
    }

    async fn known_users(&self, limit: usize) -> Result<Vec<UserId>, StorageError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| Self::poisoned("sessions"))?;
        let mut users: Vec<(UserId, chrono::DateTime<chrono::Utc>)> = sessions
            .values()
            .map(|s| (s.user_id, s.updated_at))
            .collect();
        users.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(users.into_iter().take(limit).map(|(id, _)| id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::model::{OrderStatus, PaymentStatus, ScreenId};
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn order_for(user_id: UserId) -> Order {
        Order {
            id: Uuid::new_v4(),
            user_id,
            items: Vec::new(),
            total_price: dec!(1500),
            delivery_address: "Test street 1".into(),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn session_roundtrip() {
        let storage = InMemoryStorage::new();
        assert!(storage.load_session(7).await.unwrap().is_none());

        let mut session = Session::new(7);
        session.current_screen = ScreenId::Cart;
        storage.store_session(&session).await.unwrap();

        let loaded = storage.load_session(7).await.unwrap().unwrap();
        assert_eq!(loaded.current_screen, ScreenId::Cart);
    }

    #[tokio::test]
    async fn store_order_replaces_on_same_id() {
        let storage = InMemoryStorage::new();
        let mut order = order_for(1);
        storage.store_order(&order).await.unwrap();

        order.status = OrderStatus::Confirmed;
        storage.store_order(&order).await.unwrap();

        let loaded = storage.load_order(order.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, OrderStatus::Confirmed);
        assert_eq!(storage.recent_orders(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn orders_for_user_filters_and_limits() {
        let storage = InMemoryStorage::new();
        for _ in 0..3 {
            storage.store_order(&order_for(1)).await.unwrap();
        }
        storage.store_order(&order_for(2)).await.unwrap();

        assert_eq!(storage.orders_for_user(1, 10).await.unwrap().len(), 3);
        assert_eq!(storage.orders_for_user(1, 2).await.unwrap().len(), 2);
        assert_eq!(storage.orders_for_user(2, 10).await.unwrap().len(), 1);
    }
}
