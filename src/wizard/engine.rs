//! Wizard engine — the interpreter over declarative wizard definitions.
//!
//! One engine serves every flow. `advance` is the single mutation path for
//! per-session wizard state: it checks cancellation first, then expiry, then
//! the step fingerprint, then input shape — and only after all of those pass
//! does it touch `collected`. A rejected input leaves the session byte-for-
//! byte unchanged.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::channels::{Action, Choice};
use crate::error::EngineError;
use crate::session::model::{FieldValue, Session, WizardId, WizardState};
use crate::wizard::definition::{InputShape, MENU_DONE, Next, StepDef, WizardDefinition};
use crate::wizard::flows;

/// Input fed into `advance`, already normalized by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardInput {
    /// A menu button press. `fingerprint` is the step id baked into the
    /// button when it was rendered.
    Choice { fingerprint: String, value: String },
    /// Free text typed by the user.
    Text(String),
    /// A photo reference from the channel.
    Photo(String),
    /// The /skip command (photo steps only).
    Skip,
    /// The /cancel command.
    Cancel,
}

/// Why a wizard terminated without completing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The user cancelled explicitly.
    Explicit,
    /// The wizard sat idle past the configured timeout.
    Expired,
}

/// The accumulated result of a completed wizard.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardOutcome {
    pub definition: WizardId,
    pub collected: BTreeMap<String, FieldValue>,
}

/// The prompt for a step, ready for the dispatcher to render.
#[derive(Debug, Clone, PartialEq)]
pub struct StepPrompt {
    pub definition: WizardId,
    pub step: String,
    pub text: String,
    pub choices: Vec<Choice>,
}

/// What `advance` resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    /// The wizard moved to (or stayed multi-selecting on) this step.
    Prompt(StepPrompt),
    /// Terminal: the wizard completed, `session.wizard` is cleared, and the
    /// caller turns the collected fields into a durable effect.
    Completed(WizardOutcome),
    /// Terminal: cancelled, collected data discarded.
    Cancelled(CancelReason),
}

/// Interpreter over wizard definitions.
pub struct WizardEngine {
    timeout: Duration,
    price_ceiling: Decimal,
}

impl WizardEngine {
    pub fn new(timeout: Duration, price_ceiling: Decimal) -> Self {
        Self {
            timeout,
            price_ceiling,
        }
    }

    /// Start a wizard for the session, replacing any previous one.
    ///
    /// Restarting resets `collected`; partial data from an abandoned run is
    /// never carried over.
    pub fn start(&self, session: &mut Session, id: WizardId, now: DateTime<Utc>) -> StepPrompt {
        let def = flows::definition(id);
        session.wizard = Some(WizardState::new(id, def.entry, now));
        tracing::debug!(user_id = session.user_id, wizard = %id, "wizard started");
        self.prompt(def, def.entry)
    }

    /// Advance the session's wizard by one input.
    ///
    /// `Err` means the input was rejected and the session was not mutated;
    /// the dispatcher re-prompts the current step.
    pub fn advance(
        &self,
        session: &mut Session,
        input: WizardInput,
        now: DateTime<Utc>,
    ) -> Result<AdvanceOutcome, EngineError> {
        let Some(wizard) = session.wizard.as_ref() else {
            return Err(EngineError::NoActiveWizard);
        };

        // Cancellation is checked before anything else.
        if input == WizardInput::Cancel {
            session.wizard = None;
            return Ok(AdvanceOutcome::Cancelled(CancelReason::Explicit));
        }

        // An idle wizard is cancelled on the next interaction attempt.
        if wizard.is_expired(self.timeout, now) {
            let id = wizard.definition;
            session.wizard = None;
            tracing::info!(user_id = session.user_id, wizard = %id, "wizard expired");
            return Ok(AdvanceOutcome::Cancelled(CancelReason::Expired));
        }

        let def = flows::definition(wizard.definition);
        let step = def.step(&wizard.step).ok_or_else(|| EngineError::UnknownStep {
            wizard: wizard.definition.to_string(),
            step: wizard.step.clone(),
        })?;

        // Stale-input guard: a button from a step the user has since left
        // must not advance anything.
        if let WizardInput::Choice { fingerprint, .. } = &input
            && fingerprint != step.id
        {
            return Err(EngineError::StaleInput {
                expected: step.id.to_string(),
                got: fingerprint.clone(),
            });
        }

        // Validate against the step's declared shape. Pure: no session
        // mutation on failure.
        let validated = self.validate(step, &input)?;

        // All checks passed; commit.
        let wizard = session.wizard.as_mut().expect("wizard checked above");
        wizard.last_input_at = now;

        match validated {
            Validated::Value(value) => {
                wizard.collected.insert(step.field.to_string(), value);
            }
            Validated::Accumulate(choice) => {
                let entry = wizard
                    .collected
                    .entry(step.field.to_string())
                    .or_insert_with(|| FieldValue::List(Vec::new()));
                if let FieldValue::List(items) = entry {
                    items.push(choice);
                }
                // Multi-select stays on the same step until "done".
                return Ok(AdvanceOutcome::Prompt(self.prompt(def, step.id)));
            }
            Validated::Finish => {
                // "done" with nothing picked still records an empty list.
                wizard
                    .collected
                    .entry(step.field.to_string())
                    .or_insert_with(|| FieldValue::List(Vec::new()));
            }
            Validated::Nothing => {}
        }

        match step.next {
            Next::Step(next) => {
                wizard.step = next.to_string();
                Ok(AdvanceOutcome::Prompt(self.prompt(def, next)))
            }
            Next::Complete => {
                let outcome = WizardOutcome {
                    definition: wizard.definition,
                    collected: std::mem::take(&mut wizard.collected),
                };
                session.wizard = None;
                Ok(AdvanceOutcome::Completed(outcome))
            }
        }
    }

    /// Build the render prompt for a step of a definition.
    pub fn prompt(&self, def: &WizardDefinition, step_id: &str) -> StepPrompt {
        let step = def
            .step(step_id)
            .unwrap_or_else(|| def.step(def.entry).expect("entry step declared"));

        let mut choices = Vec::new();
        if let InputShape::Menu { options, .. } = step.input {
            for option in options {
                choices.push(Choice::new(
                    option.label,
                    Action::WizardChoice {
                        step: step.id.to_string(),
                        choice: option.value.to_string(),
                    },
                ));
            }
        }
        choices.push(Choice::new("❌ Cancel", Action::CancelWizard));

        StepPrompt {
            definition: def.id,
            step: step.id.to_string(),
            text: step.prompt.to_string(),
            choices,
        }
    }

    fn validate(&self, step: &StepDef, input: &WizardInput) -> Result<Validated, EngineError> {
        match (step.input, input) {
            (InputShape::Menu { options, multi }, WizardInput::Choice { value, .. }) => {
                if !options.iter().any(|o| o.value == value) {
                    return Err(EngineError::Validation(format!(
                        "\"{value}\" is not one of the offered choices"
                    )));
                }
                if multi {
                    if value == MENU_DONE {
                        Ok(Validated::Finish)
                    } else {
                        Ok(Validated::Accumulate(value.clone()))
                    }
                } else {
                    Ok(Validated::Value(FieldValue::Choice(value.clone())))
                }
            }
            (InputShape::Menu { .. }, WizardInput::Text(_)) => Err(EngineError::Validation(
                "Please use one of the buttons".to_string(),
            )),
            (InputShape::FreeText, WizardInput::Text(text)) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    Err(EngineError::Validation("Text cannot be empty".to_string()))
                } else {
                    Ok(Validated::Value(FieldValue::Text(trimmed.to_string())))
                }
            }
            (InputShape::Number { max }, WizardInput::Text(text))
            | (InputShape::Number { max }, WizardInput::Choice { value: text, .. }) => {
                let number: Decimal = text
                    .trim()
                    .parse()
                    .map_err(|_| EngineError::Validation(format!("\"{text}\" is not a number")))?;
                if number <= Decimal::ZERO {
                    return Err(EngineError::Validation(
                        "The value must be greater than zero".to_string(),
                    ));
                }
                let ceiling = max.map(Decimal::from).unwrap_or(self.price_ceiling);
                if number > ceiling {
                    return Err(EngineError::Validation(format!(
                        "The value must not exceed {ceiling}"
                    )));
                }
                Ok(Validated::Value(FieldValue::Number(number)))
            }
            (InputShape::Photo { .. }, WizardInput::Photo(photo_ref)) => {
                Ok(Validated::Value(FieldValue::PhotoRef(photo_ref.clone())))
            }
            (InputShape::Photo { skippable }, WizardInput::Skip) => {
                if skippable {
                    Ok(Validated::Nothing)
                } else {
                    Err(EngineError::Validation(
                        "A photo is required for this step".to_string(),
                    ))
                }
            }
            (InputShape::Photo { skippable }, _) => Err(EngineError::Validation(
                if skippable {
                    "Send a photo, or /skip".to_string()
                } else {
                    "Send a photo".to_string()
                },
            )),
            _ => Err(EngineError::Validation(
                "That input doesn't fit the current step".to_string(),
            )),
        }
    }
}

/// Intermediate result of shape validation.
enum Validated {
    /// Store this value under the step's field and advance.
    Value(FieldValue),
    /// Append to the step's list and stay on the step.
    Accumulate(String),
    /// Finish a multi-select step and advance.
    Finish,
    /// Nothing to store (skipped photo); advance.
    Nothing,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn engine() -> WizardEngine {
        WizardEngine::new(Duration::from_secs(600), dec!(100_000))
    }

    fn choice(step: &str, value: &str) -> WizardInput {
        WizardInput::Choice {
            fingerprint: step.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn no_active_wizard_is_rejected() {
        let mut session = Session::new(1);
        let err = engine()
            .advance(&mut session, WizardInput::Text("hi".into()), Utc::now())
            .unwrap_err();
        assert!(matches!(err, EngineError::NoActiveWizard));
    }

    #[test]
    fn bouquet_builder_happy_path() {
        let engine = engine();
        let mut session = Session::new(1);
        let now = Utc::now();

        let prompt = engine.start(&mut session, WizardId::BouquetBuilder, now);
        assert_eq!(prompt.step, "color");

        let out = engine.advance(&mut session, choice("color", "red"), now).unwrap();
        let AdvanceOutcome::Prompt(prompt) = out else {
            panic!("expected prompt, got {out:?}")
        };
        assert_eq!(prompt.step, "quantity");

        engine.advance(&mut session, choice("quantity", "11"), now).unwrap();
        engine.advance(&mut session, choice("addons", "ribbon"), now).unwrap();
        let out = engine.advance(&mut session, choice("addons", "done"), now).unwrap();

        let AdvanceOutcome::Completed(outcome) = out else {
            panic!("expected completion, got {out:?}")
        };
        assert_eq!(outcome.definition, WizardId::BouquetBuilder);
        assert_eq!(outcome.collected["color"], FieldValue::Choice("red".into()));
        assert_eq!(outcome.collected["quantity"], FieldValue::Choice("11".into()));
        assert_eq!(
            outcome.collected["addons"],
            FieldValue::List(vec!["ribbon".to_string()])
        );
        assert!(session.wizard.is_none());
    }

    #[test]
    fn stale_fingerprint_never_mutates() {
        let engine = engine();
        let mut session = Session::new(1);
        let now = Utc::now();

        engine.start(&mut session, WizardId::BouquetBuilder, now);
        engine.advance(&mut session, choice("color", "red"), now).unwrap();
        let snapshot = session.wizard.clone().unwrap();

        // A leftover button press from the color step arrives late.
        let err = engine
            .advance(&mut session, choice("color", "blue"), now)
            .unwrap_err();
        assert!(matches!(err, EngineError::StaleInput { .. }));

        let wizard = session.wizard.as_ref().unwrap();
        assert_eq!(wizard.step, snapshot.step);
        assert_eq!(wizard.collected, snapshot.collected);
    }

    #[test]
    fn invalid_menu_value_stays_on_step() {
        let engine = engine();
        let mut session = Session::new(1);
        let now = Utc::now();

        engine.start(&mut session, WizardId::BouquetBuilder, now);
        let err = engine
            .advance(&mut session, choice("color", "octarine"), now)
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert_eq!(session.wizard.as_ref().unwrap().step, "color");
        assert!(session.wizard.as_ref().unwrap().collected.is_empty());
    }

    #[test]
    fn price_boundaries_reject_and_keep_step() {
        let engine = engine();
        let mut session = Session::new(1);
        let now = Utc::now();

        engine.start(&mut session, WizardId::AddCatalogItem, now);
        engine
            .advance(&mut session, WizardInput::Text("Roses".into()), now)
            .unwrap();
        engine
            .advance(&mut session, WizardInput::Text("Red roses".into()), now)
            .unwrap();

        for bad in ["0", "-5", "abc", "1000000"] {
            let err = engine
                .advance(&mut session, WizardInput::Text(bad.into()), now)
                .unwrap_err();
            assert!(matches!(err, EngineError::Validation(_)), "{bad} accepted");
            assert_eq!(session.wizard.as_ref().unwrap().step, "price");
        }

        let out = engine
            .advance(&mut session, WizardInput::Text("2500".into()), now)
            .unwrap();
        let AdvanceOutcome::Prompt(prompt) = out else {
            panic!("expected prompt")
        };
        assert_eq!(prompt.step, "category");
        assert_eq!(
            session.wizard.as_ref().unwrap().collected["price"],
            FieldValue::Number(dec!(2500))
        );
    }

    #[test]
    fn cancel_discards_collected() {
        let engine = engine();
        let mut session = Session::new(1);
        let now = Utc::now();

        engine.start(&mut session, WizardId::BouquetBuilder, now);
        engine.advance(&mut session, choice("color", "red"), now).unwrap();

        let out = engine.advance(&mut session, WizardInput::Cancel, now).unwrap();
        assert_eq!(out, AdvanceOutcome::Cancelled(CancelReason::Explicit));
        assert!(session.wizard.is_none());
    }

    #[test]
    fn idle_wizard_expires_on_next_input() {
        let engine = engine();
        let mut session = Session::new(1);
        let started = Utc::now();

        engine.start(&mut session, WizardId::BouquetBuilder, started);
        let later = started + chrono::Duration::seconds(601);

        let out = engine
            .advance(&mut session, choice("color", "red"), later)
            .unwrap();
        assert_eq!(out, AdvanceOutcome::Cancelled(CancelReason::Expired));
        assert!(session.wizard.is_none());
    }

    #[test]
    fn activity_pushes_expiry_forward() {
        let engine = engine();
        let mut session = Session::new(1);
        let started = Utc::now();

        engine.start(&mut session, WizardId::BouquetBuilder, started);
        let mid = started + chrono::Duration::seconds(500);
        engine.advance(&mut session, choice("color", "red"), mid).unwrap();

        // 500s after the last input — within the window again.
        let later = mid + chrono::Duration::seconds(500);
        let out = engine
            .advance(&mut session, choice("quantity", "11"), later)
            .unwrap();
        assert!(matches!(out, AdvanceOutcome::Prompt(_)));
    }

    #[test]
    fn restart_resets_collected() {
        let engine = engine();
        let mut session = Session::new(1);
        let now = Utc::now();

        engine.start(&mut session, WizardId::BouquetBuilder, now);
        engine.advance(&mut session, choice("color", "red"), now).unwrap();
        engine.start(&mut session, WizardId::BouquetBuilder, now);

        let wizard = session.wizard.as_ref().unwrap();
        assert_eq!(wizard.step, "color");
        assert!(wizard.collected.is_empty());
    }

    #[test]
    fn skip_photo_completes_admin_flow() {
        let engine = engine();
        let mut session = Session::new(1);
        let now = Utc::now();

        engine.start(&mut session, WizardId::AddCatalogItem, now);
        engine.advance(&mut session, WizardInput::Text("Peony".into()), now).unwrap();
        engine.advance(&mut session, WizardInput::Text("Pink peonies".into()), now).unwrap();
        engine.advance(&mut session, WizardInput::Text("3200".into()), now).unwrap();
        engine.advance(&mut session, WizardInput::Text("peonies".into()), now).unwrap();

        let out = engine.advance(&mut session, WizardInput::Skip, now).unwrap();
        let AdvanceOutcome::Completed(outcome) = out else {
            panic!("expected completion")
        };
        assert_eq!(outcome.collected["name"], FieldValue::Text("Peony".into()));
        assert!(!outcome.collected.contains_key("photo"));
    }

    #[test]
    fn menu_prompt_carries_fingerprinted_choices() {
        let engine = engine();
        let prompt = engine.prompt(flows::definition(WizardId::BouquetBuilder), "quantity");
        assert!(prompt.choices.iter().any(|c| {
            c.action
                == Action::WizardChoice {
                    step: "quantity".into(),
                    choice: "11".into(),
                }
        }));
        // Cancel is always offered.
        assert!(prompt.choices.iter().any(|c| c.action == Action::CancelWizard));
    }
}
