//! Generic multi-step wizard engine and the declared flows.

pub mod definition;
pub mod engine;
pub mod flows;

pub use definition::{InputShape, MenuOption, Next, StepDef, WizardDefinition};
pub use engine::{AdvanceOutcome, CancelReason, StepPrompt, WizardEngine, WizardInput, WizardOutcome};
