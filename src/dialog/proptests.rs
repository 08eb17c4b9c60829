//! Property-based tests for the dialog state machine
//!
//! These tests verify key invariants hold across arbitrary input sequences.

use super::event::GeneratePurpose;
use super::state::SettingsStep;
use super::transition::*;
use super::*;
use crate::generator::is_valid_length;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("/start".to_string()),
        Just("/settings".to_string()),
        Just("/password".to_string()),
        Just("/add".to_string()),
        Just("/list".to_string()),
        Just("/get Shop".to_string()),
        Just("/delete Shop".to_string()),
        Just("/change Shop".to_string()),
        Just("+".to_string()),
        Just("-".to_string()),
        Just("1".to_string()),
        Just("2".to_string()),
        (0usize..100).prop_map(|n| n.to_string()),
        "[a-zA-Z0-9@. ]{0,12}",
    ]
}

/// Feed a line and return the result; text never fails to transition
fn feed(session: &Session, line: &str) -> TransitionResult {
    transition(session, Event::Text(line.to_string())).expect("text always transitions")
}

fn arb_session() -> impl Strategy<Value = Session> {
    proptest::collection::vec(arb_line(), 0..12).prop_map(|lines| {
        lines
            .iter()
            .fold(Session::default(), |session, line| feed(&session, line).new_session)
    })
}

fn is_valid_session(session: &Session) -> bool {
    let committed = &session.settings;
    if !committed.has_any_class() || !is_valid_length(committed.length) {
        return false;
    }
    match &session.mode {
        DialogMode::Settings { step, draft } => {
            *step == SettingsStep::WaitLength || is_valid_length(draft.length)
        }
        DialogMode::Idle | DialogMode::Manager { .. } => true,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: committed settings always generate, and every line gets a response
    #[test]
    fn prop_text_keeps_session_valid(lines in proptest::collection::vec(arb_line(), 0..30)) {
        let mut session = Session::default();
        for line in lines {
            let result = feed(&session, &line);
            prop_assert!(!result.effects.is_empty(), "No effect for {:?} in {:?}", line, session.mode);
            session = result.new_session;
            prop_assert!(is_valid_session(&session), "Invalid session: {:?}", session);
        }
    }

    // Invariant 2: /settings restarts the settings wizard from any mode
    #[test]
    fn prop_settings_always_restarts(session in arb_session()) {
        let result = feed(&session, "/settings");
        prop_assert!(
            matches!(
                result.new_session.mode,
                DialogMode::Settings { step: SettingsStep::WaitLength, .. }
            ),
            "Expected WaitLength, got {:?}",
            result.new_session.mode
        );
        prop_assert_eq!(result.new_session.settings, session.settings);
    }

    // Invariant 3: /password abandons any wizard and uses committed settings
    #[test]
    fn prop_password_always_generates(session in arb_session()) {
        let result = feed(&session, "  /password ");
        prop_assert!(result.new_session.mode.is_idle());
        prop_assert_eq!(
            result.effects,
            vec![Effect::Generate {
                settings: session.settings,
                purpose: GeneratePurpose::Quick,
            }]
        );
    }

    // Invariant 4: a wizard step never touches storage except on its final step
    #[test]
    fn prop_storage_effects_only_from_idle_result(session in arb_session(), line in arb_line()) {
        let result = feed(&session, &line);
        if result.effects.iter().any(Effect::is_storage) {
            prop_assert!(
                result.new_session.mode.is_idle(),
                "Storage effect while {:?} stays in flight",
                result.new_session.mode
            );
        }
    }

    // Invariant 5: storage failure always lands in Idle
    #[test]
    fn prop_storage_failure_resets(session in arb_session()) {
        let result = transition(&session, Event::StorageFailed).unwrap();
        prop_assert!(result.new_session.mode.is_idle());
        prop_assert_eq!(result.new_session.settings, session.settings);
    }
}
