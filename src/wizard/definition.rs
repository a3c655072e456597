//! Declarative wizard definitions.
//!
//! A wizard is a named set of steps; each step declares what input shape it
//! accepts, which field the input lands in, and where it transitions next.
//! The engine in `engine.rs` interprets these; the concrete flows live in
//! `flows.rs`.

use crate::session::model::WizardId;

/// Menu choice value that finishes a multi-select step.
pub const MENU_DONE: &str = "done";

/// One selectable option in a menu step.
#[derive(Debug, Clone, Copy)]
pub struct MenuOption {
    pub label: &'static str,
    pub value: &'static str,
}

/// What input a step accepts.
#[derive(Debug, Clone, Copy)]
pub enum InputShape {
    /// A fixed menu of choices. With `multi`, choices accumulate into a list
    /// and the step advances only on the [`MENU_DONE`] option.
    Menu {
        options: &'static [MenuOption],
        multi: bool,
    },
    /// Free-form non-empty text.
    FreeText,
    /// A positive number. `max` of `None` uses the configured price ceiling.
    Number { max: Option<u32> },
    /// A photo reference, optionally skippable with /skip.
    Photo { skippable: bool },
}

/// Where a step transitions after valid input.
#[derive(Debug, Clone, Copy)]
pub enum Next {
    Step(&'static str),
    Complete,
}

/// One state of a wizard's FSM.
#[derive(Debug, Clone, Copy)]
pub struct StepDef {
    /// Step id; doubles as the fingerprint carried by menu buttons.
    pub id: &'static str,
    /// Field name the validated input is stored under.
    pub field: &'static str,
    /// Prompt text shown when this step is entered or re-prompted.
    pub prompt: &'static str,
    pub input: InputShape,
    pub next: Next,
}

/// A complete wizard: entry step plus all declared states.
#[derive(Debug, Clone, Copy)]
pub struct WizardDefinition {
    pub id: WizardId,
    pub entry: &'static str,
    pub steps: &'static [StepDef],
}

impl WizardDefinition {
    /// Look up a step by id.
    pub fn step(&self, id: &str) -> Option<&StepDef> {
        self.steps.iter().find(|s| s.id == id)
    }
}
