//! Navigation controller — push/pop of the per-session screen stack.
//!
//! "Back" never fails: an empty or broken stack always resolves to the start
//! screen, because a dead end must not strand the user.

use crate::session::model::{ScreenId, Session};

/// Navigate to `target`, remembering the current screen for "back".
///
/// The current screen is pushed only if it differs from both the target and
/// the top of the stack (avoids duplicate entries when a screen re-renders
/// itself).
pub fn push(session: &mut Session, target: ScreenId) {
    let current = session.current_screen;
    if current != target && session.nav_stack.last() != Some(&current) {
        session.nav_stack.push(current);
        tracing::debug!(user_id = session.user_id, from = %current, to = %target, "nav push");
    }
    session.current_screen = target;
}

/// Pop the previous screen and make it current.
///
/// An empty stack resolves to [`ScreenId::Start`] and clears any active
/// wizard: backing out past the wizard's entry is an implicit cancel.
pub fn back(session: &mut Session) -> ScreenId {
    let resolved = match session.nav_stack.pop() {
        Some(previous) => previous,
        None => {
            if session.wizard.take().is_some() {
                tracing::debug!(user_id = session.user_id, "wizard cancelled by back past entry");
            }
            ScreenId::Start
        }
    };
    session.current_screen = resolved;
    resolved
}

/// Discard history and return to the start screen.
///
/// Used when a root menu is re-entered directly (/start, /admin).
pub fn reset(session: &mut Session, root: ScreenId) {
    session.nav_stack.clear();
    session.current_screen = root;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::model::{WizardId, WizardState};
    use chrono::Utc;

    #[test]
    fn push_then_back_is_lifo() {
        let mut session = Session::new(1);
        let screens = [ScreenId::Catalog, ScreenId::Cart, ScreenId::AiMenu];
        for screen in screens {
            push(&mut session, screen);
        }
        for _ in screens {
            back(&mut session);
        }
        assert_eq!(session.current_screen, ScreenId::Start);
        assert!(session.nav_stack.is_empty());
    }

    #[test]
    fn scenario_catalog_cart_back_back_back() {
        let mut session = Session::new(1);
        push(&mut session, ScreenId::Catalog);
        push(&mut session, ScreenId::Cart);

        assert_eq!(back(&mut session), ScreenId::Catalog);
        assert_eq!(back(&mut session), ScreenId::Start);
        // Stack exhausted: still start, never an error.
        assert_eq!(back(&mut session), ScreenId::Start);
    }

    #[test]
    fn push_to_same_screen_does_not_grow_stack() {
        let mut session = Session::new(1);
        push(&mut session, ScreenId::Catalog);
        push(&mut session, ScreenId::Catalog);
        assert_eq!(session.nav_stack, vec![ScreenId::Start]);
    }

    #[test]
    fn push_dedups_against_stack_top() {
        let mut session = Session::new(1);
        push(&mut session, ScreenId::Catalog);
        push(&mut session, ScreenId::Cart);
        // Bounce back to catalog via push, then away again.
        push(&mut session, ScreenId::Catalog);
        push(&mut session, ScreenId::Cart);
        assert_eq!(
            session.nav_stack,
            vec![ScreenId::Start, ScreenId::Catalog, ScreenId::Cart, ScreenId::Catalog]
        );
    }

    #[test]
    fn empty_stack_back_cancels_wizard() {
        let mut session = Session::new(1);
        session.wizard = Some(WizardState::new(
            WizardId::BouquetBuilder,
            "color",
            Utc::now(),
        ));
        assert_eq!(back(&mut session), ScreenId::Start);
        assert!(session.wizard.is_none());
    }

    #[test]
    fn reset_clears_history() {
        let mut session = Session::new(1);
        push(&mut session, ScreenId::Catalog);
        push(&mut session, ScreenId::Cart);
        reset(&mut session, ScreenId::AdminMain);
        assert!(session.nav_stack.is_empty());
        assert_eq!(session.current_screen, ScreenId::AdminMain);
    }
}
