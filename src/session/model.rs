//! Session data model — screens, wizard state, cart, and orders.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable Telegram numeric user id.
pub type UserId = i64;

/// Order identifier.
pub type OrderId = Uuid;

/// A renderable view the user can be on.
///
/// Wizard sub-screens are not ScreenIds; an active wizard is tracked in
/// `Session::wizard` and superimposed on whatever screen is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenId {
    Start,
    Catalog,
    Cart,
    AiMenu,
    History,
    AdminMain,
    AdminListItems,
    AdminOrders,
    AdminUsers,
}

impl ScreenId {
    /// Whether this screen requires admin access.
    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            Self::AdminMain | Self::AdminListItems | Self::AdminOrders | Self::AdminUsers
        )
    }
}

impl Default for ScreenId {
    fn default() -> Self {
        Self::Start
    }
}

impl std::fmt::Display for ScreenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Start => "start",
            Self::Catalog => "catalog",
            Self::Cart => "cart",
            Self::AiMenu => "ai_menu",
            Self::History => "history",
            Self::AdminMain => "admin_main",
            Self::AdminListItems => "admin_list_items",
            Self::AdminOrders => "admin_orders",
            Self::AdminUsers => "admin_users",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ScreenId {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Self::Start),
            "catalog" => Ok(Self::Catalog),
            "cart" => Ok(Self::Cart),
            "ai_menu" => Ok(Self::AiMenu),
            "history" => Ok(Self::History),
            "admin_main" => Ok(Self::AdminMain),
            "admin_list_items" => Ok(Self::AdminListItems),
            "admin_orders" => Ok(Self::AdminOrders),
            "admin_users" => Ok(Self::AdminUsers),
            _ => Err(format!("Unknown screen: {s}")),
        }
    }
}

/// Which wizard definition a session is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardId {
    BouquetBuilder,
    AddCatalogItem,
    AiRecommend,
}

impl std::fmt::Display for WizardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::BouquetBuilder => "bouquet_builder",
            Self::AddCatalogItem => "add_catalog_item",
            Self::AiRecommend => "ai_recommend",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for WizardId {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bouquet_builder" => Ok(Self::BouquetBuilder),
            "add_catalog_item" => Ok(Self::AddCatalogItem),
            "ai_recommend" => Ok(Self::AiRecommend),
            _ => Err(format!("Unknown wizard: {s}")),
        }
    }
}

/// A value collected by a wizard step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum FieldValue {
    Text(String),
    Number(Decimal),
    Choice(String),
    List(Vec<String>),
    PhotoRef(String),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Choice(s) | Self::PhotoRef(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// Per-session state of an in-progress wizard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardState {
    /// Which wizard is running.
    pub definition: WizardId,
    /// Current step within the wizard's state machine.
    pub step: String,
    /// Data collected so far, keyed by step field name.
    pub collected: BTreeMap<String, FieldValue>,
    /// When the wizard was started.
    pub started_at: DateTime<Utc>,
    /// Last accepted input, for the inactivity timeout.
    pub last_input_at: DateTime<Utc>,
}

impl WizardState {
    pub fn new(definition: WizardId, entry_step: &str, now: DateTime<Utc>) -> Self {
        Self {
            definition,
            step: entry_step.to_string(),
            collected: BTreeMap::new(),
            started_at: now,
            last_input_at: now,
        }
    }

    /// Whether the wizard has been idle longer than `timeout`.
    pub fn is_expired(&self, timeout: std::time::Duration, now: DateTime<Utc>) -> bool {
        let idle = now.signed_duration_since(self.last_input_at);
        idle.to_std().map(|d| d > timeout).unwrap_or(false)
    }
}

/// What a cart line item refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ItemKind {
    /// A catalog item, referenced by id.
    Catalog { item_id: i64, name: String },
    /// A custom-built bouquet.
    Custom { descriptor: String },
}

/// One configured product instance in the cart.
///
/// `unit_price` is frozen at the moment the item is added; later catalog
/// re-pricing does not change cart totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub kind: ItemKind,
    pub attributes: BTreeMap<String, String>,
    pub unit_price: Decimal,
}

/// Order lifecycle status.
///
/// Transitions are monotonic forward except explicit cancellation:
/// Pending → AwaitingPayment → Paid → Confirmed, with Cancelled reachable
/// from any state before Confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    AwaitingPayment,
    Paid,
    Confirmed,
    Cancelled,
}

impl OrderStatus {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, target),
            (Pending, AwaitingPayment)
                | (Pending, Paid)
                | (Pending, Confirmed)
                | (AwaitingPayment, Paid)
                | (AwaitingPayment, Confirmed)
                | (Paid, Confirmed)
                | (Pending, Cancelled)
                | (AwaitingPayment, Cancelled)
                | (Paid, Cancelled)
        )
    }

    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::AwaitingPayment => "awaiting_payment",
            Self::Paid => "paid",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// Payment status, tracked alongside the order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Refunded,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unpaid => "unpaid",
            Self::Paid => "paid",
            Self::Refunded => "refunded",
        };
        write!(f, "{s}")
    }
}

/// An order created from a cart snapshot.
///
/// `items` and `total_price` are immutable after creation; only the two
/// status fields change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<CartItem>,
    pub total_price: Decimal,
    pub delivery_address: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

/// Per-user mutable session state.
///
/// Owned exclusively by the session store; controllers read a copy, mutate,
/// and save back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub current_screen: ScreenId,
    /// Navigation history, most-recent-pushed last.
    pub nav_stack: Vec<ScreenId>,
    pub wizard: Option<WizardState>,
    pub cart: Vec<CartItem>,
    pub pending_order: Option<OrderId>,
    pub delivery_address: Option<String>,
    /// Set when the bot has asked for a delivery address; the next free text
    /// (or shared location) is consumed as the address.
    #[serde(default)]
    pub awaiting_address: bool,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Deterministic default session for a first-time user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            current_screen: ScreenId::Start,
            nav_stack: Vec::new(),
            wizard: None,
            cart: Vec::new(),
            pending_order: None,
            delivery_address: None,
            awaiting_address: false,
            updated_at: Utc::now(),
        }
    }
}
