//! Per-user session state and its store.

pub mod model;
pub mod store;

pub use model::{
    CartItem, FieldValue, ItemKind, Order, OrderId, OrderStatus, PaymentStatus, ScreenId, Session,
    UserId, WizardId, WizardState,
};
pub use store::SessionStore;
