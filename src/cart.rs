//! Cart and order lifecycle.
//!
//! The only writer of order status. Checkout snapshots the cart but leaves
//! it intact — a failed payment must leave the user able to retry — and the
//! cart is cleared exactly once, on the first successful payment
//! confirmation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::CartError;
use crate::session::model::{CartItem, Order, OrderStatus, PaymentStatus, Session};

/// Append an item to the cart.
///
/// No dedup: repeated identical configurations are distinct line items.
pub fn add_item(session: &mut Session, item: CartItem) {
    session.cart.push(item);
}

/// Remove one line item by index.
pub fn remove_item(session: &mut Session, index: usize) -> Result<CartItem, CartError> {
    if index >= session.cart.len() {
        return Err(CartError::IndexOutOfRange {
            index,
            len: session.cart.len(),
        });
    }
    Ok(session.cart.remove(index))
}

/// Empty the cart unconditionally.
pub fn clear(session: &mut Session) {
    session.cart.clear();
}

/// Sum of unit prices; zero for an empty cart.
pub fn total(session: &Session) -> Decimal {
    session.cart.iter().map(|item| item.unit_price).sum()
}

/// Snapshot the cart into a new pending order.
///
/// The cart is NOT cleared here; that happens only on confirmed payment.
pub fn checkout(session: &mut Session, now: DateTime<Utc>) -> Result<Order, CartError> {
    if session.cart.is_empty() {
        return Err(CartError::EmptyCart);
    }
    let delivery_address = session
        .delivery_address
        .clone()
        .ok_or(CartError::MissingAddress)?;

    let order = Order {
        id: Uuid::new_v4(),
        user_id: session.user_id,
        items: session.cart.clone(),
        total_price: total(session),
        delivery_address,
        status: OrderStatus::Pending,
        payment_status: PaymentStatus::Unpaid,
        created_at: now,
    };
    session.pending_order = Some(order.id);
    tracing::info!(user_id = session.user_id, order_id = %order.id, total = %order.total_price, "order created");
    Ok(order)
}

/// An invoice was issued; the order now waits for payment.
pub fn mark_awaiting_payment(order: &mut Order) -> Result<(), CartError> {
    transition(order, OrderStatus::AwaitingPayment)
}

/// Confirm payment of an order.
///
/// Idempotent: confirming an already paid/confirmed order is a no-op that
/// returns `false` and leaves everything unchanged — duplicate confirmation
/// callbacks must be harmless. On the first successful confirmation the
/// session's cart and pending-order reference are cleared as one step.
pub fn confirm_payment(session: &mut Session, order: &mut Order) -> Result<bool, CartError> {
    if matches!(order.status, OrderStatus::Paid | OrderStatus::Confirmed) {
        return Ok(false);
    }
    transition(order, OrderStatus::Confirmed)?;
    order.payment_status = PaymentStatus::Paid;
    session.cart.clear();
    session.pending_order = None;
    session.delivery_address = None;
    tracing::info!(order_id = %order.id, "payment confirmed");
    Ok(true)
}

/// Cancel an order. Illegal once confirmed.
pub fn cancel(order: &mut Order) -> Result<(), CartError> {
    transition(order, OrderStatus::Cancelled)
}

fn transition(order: &mut Order, target: OrderStatus) -> Result<(), CartError> {
    if !order.status.can_transition_to(target) {
        return Err(CartError::InvalidTransition {
            id: order.id,
            from: order.status.to_string(),
            to: target.to_string(),
        });
    }
    order.status = target;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::model::ItemKind;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn item(price: Decimal) -> CartItem {
        CartItem {
            kind: ItemKind::Custom {
                descriptor: "red bouquet, 11 flowers".into(),
            },
            attributes: BTreeMap::new(),
            unit_price: price,
        }
    }

    fn session_with_items(prices: &[Decimal]) -> Session {
        let mut session = Session::new(1);
        for &price in prices {
            add_item(&mut session, item(price));
        }
        session
    }

    #[test]
    fn identical_items_are_distinct_lines() {
        let session = session_with_items(&[dec!(2500), dec!(2500)]);
        assert_eq!(session.cart.len(), 2);
        assert_eq!(total(&session), dec!(5000));
    }

    #[test]
    fn total_of_empty_cart_is_zero() {
        let session = Session::new(1);
        assert_eq!(total(&session), Decimal::ZERO);
    }

    #[test]
    fn remove_out_of_range_fails() {
        let mut session = session_with_items(&[dec!(1800)]);
        let err = remove_item(&mut session, 5).unwrap_err();
        assert!(matches!(err, CartError::IndexOutOfRange { index: 5, len: 1 }));
        assert_eq!(session.cart.len(), 1);
    }

    #[test]
    fn checkout_empty_cart_fails() {
        let mut session = Session::new(1);
        session.delivery_address = Some("Some street 1".into());
        assert!(matches!(
            checkout(&mut session, Utc::now()),
            Err(CartError::EmptyCart)
        ));
        assert!(session.pending_order.is_none());
    }

    #[test]
    fn checkout_without_address_fails_then_succeeds() {
        let mut session = session_with_items(&[dec!(2500)]);
        assert!(matches!(
            checkout(&mut session, Utc::now()),
            Err(CartError::MissingAddress)
        ));

        session.delivery_address = Some("Primernaya st. 1".into());
        let order = checkout(&mut session, Utc::now()).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Unpaid);
        assert_eq!(order.total_price, dec!(2500));
        assert_eq!(session.pending_order, Some(order.id));
        // Cart survives checkout for payment retry.
        assert_eq!(session.cart.len(), 1);
    }

    #[test]
    fn checkout_snapshot_is_immune_to_later_cart_edits() {
        let mut session = session_with_items(&[dec!(2500)]);
        session.delivery_address = Some("addr".into());
        let order = checkout(&mut session, Utc::now()).unwrap();

        add_item(&mut session, item(dec!(1000)));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.total_price, dec!(2500));
    }

    #[test]
    fn confirm_payment_is_idempotent() {
        let mut session = session_with_items(&[dec!(2500)]);
        session.delivery_address = Some("addr".into());
        let mut order = checkout(&mut session, Utc::now()).unwrap();

        assert!(confirm_payment(&mut session, &mut order).unwrap());
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert!(session.cart.is_empty());
        assert!(session.pending_order.is_none());

        // Duplicate confirmation callback: no-op, identical final state.
        let after_first = order.clone();
        assert!(!confirm_payment(&mut session, &mut order).unwrap());
        assert_eq!(order.status, after_first.status);
        assert_eq!(order.payment_status, after_first.payment_status);
    }

    #[test]
    fn confirm_from_awaiting_payment_is_legal() {
        let mut session = session_with_items(&[dec!(2500)]);
        session.delivery_address = Some("addr".into());
        let mut order = checkout(&mut session, Utc::now()).unwrap();

        mark_awaiting_payment(&mut order).unwrap();
        assert_eq!(order.status, OrderStatus::AwaitingPayment);
        assert!(confirm_payment(&mut session, &mut order).unwrap());
        assert_eq!(order.status, OrderStatus::Confirmed);
    }

    #[test]
    fn cancel_before_confirmed_only() {
        let mut session = session_with_items(&[dec!(2500)]);
        session.delivery_address = Some("addr".into());
        let mut order = checkout(&mut session, Utc::now()).unwrap();

        let mut cancellable = order.clone();
        cancel(&mut cancellable).unwrap();
        assert_eq!(cancellable.status, OrderStatus::Cancelled);

        confirm_payment(&mut session, &mut order).unwrap();
        assert!(matches!(
            cancel(&mut order),
            Err(CartError::InvalidTransition { .. })
        ));
    }
}
