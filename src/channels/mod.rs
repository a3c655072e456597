//! Channel abstraction for message I/O.
//!
//! Defines the inbound event shape the dispatcher consumes and the outbound
//! render instruction the presentation layer turns into platform messages.
//! Callback-data strings are parsed into the typed [`Action`] exactly once,
//! here at the boundary; nothing downstream touches raw strings.

pub mod telegram;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use telegram::TelegramChannel;

use crate::session::model::{ScreenId, UserId, WizardId};

/// A typed button/menu action, carried as callback data on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Pop the navigation stack.
    Back,
    /// Navigate directly to a screen.
    GoTo(ScreenId),
    /// Start a wizard.
    StartWizard(WizardId),
    /// A menu choice inside a wizard step. `step` is the step fingerprint:
    /// input from a step the user has since left is rejected as stale.
    WizardChoice { step: String, choice: String },
    /// Cancel the active wizard.
    CancelWizard,
    /// Add a catalog item to the cart.
    AddCatalogItem { item_id: i64 },
    /// Remove one cart line by index.
    RemoveCartItem { index: usize },
    /// Empty the cart.
    ClearCart,
    /// Ask the user for a delivery address.
    RequestAddress,
    /// Checkout the cart and request a payment invoice.
    Checkout,
    /// Confirm payment of an order (duplicate presses must be harmless).
    ConfirmOrder { order_id: Uuid },
}

impl Action {
    /// Encode for the wire (Telegram callback_data, ≤64 bytes).
    pub fn encode(&self) -> String {
        match self {
            Self::Back => "nav:back".to_string(),
            Self::GoTo(screen) => format!("nav:go:{screen}"),
            Self::StartWizard(wizard) => format!("wiz:start:{wizard}"),
            Self::WizardChoice { step, choice } => format!("wiz:in:{step}:{choice}"),
            Self::CancelWizard => "wiz:cancel".to_string(),
            Self::AddCatalogItem { item_id } => format!("cart:add:{item_id}"),
            Self::RemoveCartItem { index } => format!("cart:rm:{index}"),
            Self::ClearCart => "cart:clear".to_string(),
            Self::RequestAddress => "cart:addr".to_string(),
            Self::Checkout => "cart:pay".to_string(),
            Self::ConfirmOrder { order_id } => format!("order:confirm:{order_id}"),
        }
    }

    /// Parse wire callback data. `None` for anything malformed or unknown.
    pub fn parse(data: &str) -> Option<Self> {
        let mut parts = data.splitn(3, ':');
        let ns = parts.next()?;
        let verb = parts.next()?;
        let rest = parts.next();

        match (ns, verb, rest) {
            ("nav", "back", None) => Some(Self::Back),
            ("nav", "go", Some(screen)) => screen.parse().ok().map(Self::GoTo),
            ("wiz", "start", Some(wizard)) => wizard.parse().ok().map(Self::StartWizard),
            ("wiz", "in", Some(rest)) => {
                let (step, choice) = rest.split_once(':')?;
                Some(Self::WizardChoice {
                    step: step.to_string(),
                    choice: choice.to_string(),
                })
            }
            ("wiz", "cancel", None) => Some(Self::CancelWizard),
            ("cart", "add", Some(id)) => {
                id.parse().ok().map(|item_id| Self::AddCatalogItem { item_id })
            }
            ("cart", "rm", Some(index)) => {
                index.parse().ok().map(|index| Self::RemoveCartItem { index })
            }
            ("cart", "clear", None) => Some(Self::ClearCart),
            ("cart", "addr", None) => Some(Self::RequestAddress),
            ("cart", "pay", None) => Some(Self::Checkout),
            ("order", "confirm", Some(id)) => {
                id.parse().ok().map(|order_id| Self::ConfirmOrder { order_id })
            }
            _ => None,
        }
    }
}

/// What kind of input an inbound event carries.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// A slash command, without the leading `/` (e.g. `start`, `cancel`).
    Command(String),
    /// A button press, already parsed into a typed action.
    MenuChoice(Action),
    /// Free-form text.
    FreeText(String),
    /// A photo, referenced by the channel's file id.
    Photo(String),
    /// A shared location.
    Location { lat: f64, lon: f64 },
}

/// One inbound event from a channel.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub user_id: UserId,
    pub kind: EventKind,
}

/// One button the presentation layer should show.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub label: String,
    pub action: Action,
}

impl Choice {
    pub fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// Outbound render instruction produced by the core.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderInstruction {
    pub screen: ScreenId,
    pub text: String,
    pub choices: Vec<Choice>,
}

impl RenderInstruction {
    pub fn new(screen: ScreenId, text: impl Into<String>) -> Self {
        Self {
            screen,
            text: text.into(),
            choices: Vec::new(),
        }
    }

    pub fn with_choice(mut self, label: impl Into<String>, action: Action) -> Self {
        self.choices.push(Choice::new(label, action));
        self
    }

    /// Append the standard back button.
    pub fn with_back(self) -> Self {
        self.with_choice("◀️ Back", Action::Back)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_wire_roundtrip() {
        let actions = [
            Action::Back,
            Action::GoTo(ScreenId::Catalog),
            Action::StartWizard(WizardId::BouquetBuilder),
            Action::WizardChoice {
                step: "color".into(),
                choice: "red".into(),
            },
            Action::CancelWizard,
            Action::AddCatalogItem { item_id: 3 },
            Action::RemoveCartItem { index: 1 },
            Action::ClearCart,
            Action::RequestAddress,
            Action::Checkout,
            Action::ConfirmOrder {
                order_id: Uuid::new_v4(),
            },
        ];
        for action in actions {
            let wire = action.encode();
            assert!(wire.len() <= 64, "callback data too long: {wire}");
            assert_eq!(Action::parse(&wire), Some(action));
        }
    }

    #[test]
    fn parse_rejects_malformed_data() {
        assert_eq!(Action::parse(""), None);
        assert_eq!(Action::parse("nav"), None);
        assert_eq!(Action::parse("nav:go:nowhere"), None);
        assert_eq!(Action::parse("cart:add:abc"), None);
        assert_eq!(Action::parse("order:confirm:not-a-uuid"), None);
        assert_eq!(Action::parse("ai:occasion:birthday:budget:2000"), None);
    }

    #[test]
    fn wizard_choice_keeps_step_fingerprint() {
        let parsed = Action::parse("wiz:in:quantity:11").unwrap();
        assert_eq!(
            parsed,
            Action::WizardChoice {
                step: "quantity".into(),
                choice: "11".into(),
            }
        );
    }
}
