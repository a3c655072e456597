//! Payment provider abstraction.
//!
//! `create_invoice` must be safe to retry: a failed call leaves the order
//! pending and the user can fall back to manual confirmation.

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::CollaboratorError;
use crate::session::model::Order;

/// A reference to an issued invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceRef {
    /// Provider-side identifier, echoed in payment confirmations.
    pub external_id: String,
}

/// Issues payment invoices for orders.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_invoice(&self, order: &Order) -> Result<InvoiceRef, CollaboratorError>;
}

/// Telegram Stars payments, via the Bot API's sendInvoice.
pub struct TelegramStarsProvider {
    bot_token: String,
    client: reqwest::Client,
}

impl TelegramStarsProvider {
    pub fn new(bot_token: String) -> Self {
        Self {
            bot_token,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{method}", self.bot_token)
    }
}

/// Convert a ruble price to a whole Stars amount, rounding up.
fn to_stars(total: Decimal) -> i64 {
    total.ceil().to_i64().unwrap_or(i64::MAX).max(1)
}

#[async_trait]
impl PaymentProvider for TelegramStarsProvider {
    async fn create_invoice(&self, order: &Order) -> Result<InvoiceRef, CollaboratorError> {
        let body = serde_json::json!({
            "chat_id": order.user_id,
            "title": "Flower shop order",
            "description": format!("Order {} ({} items)", order.id, order.items.len()),
            "payload": order.id.to_string(),
            "currency": "XTR",
            "prices": [{"label": "Order total", "amount": to_stars(order.total_price)}],
        });

        let resp = self
            .client
            .post(self.api_url("sendInvoice"))
            .json(&body)
            .send()
            .await
            .map_err(|e| CollaboratorError::Payment {
                order_id: order.id,
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let err = resp.text().await.unwrap_or_default();
            return Err(CollaboratorError::Payment {
                order_id: order.id,
                reason: format!("sendInvoice failed: {err}"),
            });
        }

        let data: serde_json::Value = resp.json().await.map_err(|e| CollaboratorError::Payment {
            order_id: order.id,
            reason: e.to_string(),
        })?;

        let message_id = data
            .pointer("/result/message_id")
            .and_then(serde_json::Value::as_i64)
            .ok_or_else(|| CollaboratorError::Payment {
                order_id: order.id,
                reason: "sendInvoice response had no message_id".into(),
            })?;

        tracing::info!(order_id = %order.id, message_id, "Invoice sent");
        Ok(InvoiceRef {
            external_id: message_id.to_string(),
        })
    }
}

/// Test provider: succeeds or fails on demand and remembers the calls.
pub struct MockPaymentProvider {
    fail: bool,
    pub invoices: std::sync::Mutex<Vec<crate::session::model::OrderId>>,
}

impl MockPaymentProvider {
    pub fn succeeding() -> Self {
        Self {
            fail: false,
            invoices: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            invoices: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_invoice(&self, order: &Order) -> Result<InvoiceRef, CollaboratorError> {
        if self.fail {
            return Err(CollaboratorError::Payment {
                order_id: order.id,
                reason: "mock failure".into(),
            });
        }
        if let Ok(mut invoices) = self.invoices.lock() {
            invoices.push(order.id);
        }
        Ok(InvoiceRef {
            external_id: format!("mock-{}", order.id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::model::{OrderStatus, PaymentStatus};
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn order(total: Decimal) -> Order {
        Order {
            id: Uuid::new_v4(),
            user_id: 1,
            items: Vec::new(),
            total_price: total,
            delivery_address: "x".into(),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn stars_amount_rounds_up_and_floors_at_one() {
        assert_eq!(to_stars(dec!(1500)), 1500);
        assert_eq!(to_stars(dec!(1500.01)), 1501);
        assert_eq!(to_stars(dec!(0.1)), 1);
    }

    #[tokio::test]
    async fn mock_provider_records_invoices() {
        let provider = MockPaymentProvider::succeeding();
        let order = order(dec!(2000));
        let invoice = provider.create_invoice(&order).await.unwrap();
        assert_eq!(invoice.external_id, format!("mock-{}", order.id));
        assert_eq!(provider.invoices.lock().unwrap().as_slice(), &[order.id]);
    }

    #[tokio::test]
    async fn mock_provider_failure_names_the_order() {
        let provider = MockPaymentProvider::failing();
        let order = order(dec!(2000));
        let err = provider.create_invoice(&order).await.unwrap_err();
        assert!(err.to_string().contains(&order.id.to_string()));
    }
}
