//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::step::*;
use super::transition::*;
use super::*;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_group() -> impl Strategy<Value = ChoiceGroup> {
    prop_oneof![
        Just(ChoiceGroup::Coeff),
        Just(ChoiceGroup::Multiplier),
        Just(ChoiceGroup::Extra),
    ]
}

/// Text that never parses as a number
fn arb_bad_text() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[a-zA-Zа-я ]{1,12}",
        "[0-9]{1,3}\\.[0-9]{1,2}\\.[0-9]{1,2}",
        "[0-9]{1,3},[0-9]{1,2},[0-9]{1,2}",
        "-[0-9]{1,3}",
    ]
    .prop_filter("must not be a trigger", |s| {
        !matches!(Event::from_text(s), Event::Start | Event::Cancel)
    })
}

fn arb_good_number() -> impl Strategy<Value = (String, f64)> {
    prop_oneof![
        (1u32..10_000).prop_map(|n| (n.to_string(), f64::from(n))),
        (1u32..1_000, 0u32..100).prop_map(|(whole, frac)| {
            let text = format!("{whole},{frac:02}");
            let value = f64::from(whole) + f64::from(frac) / 100.0;
            (text, value)
        }),
    ]
}

/// Any inbound event, valid or not
fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        1 => Just(Event::Start),
        1 => Just(Event::Begin),
        1 => Just(Event::Cancel),
        4 => arb_good_number().prop_map(|(text, _)| Event::Text(text)),
        2 => arb_bad_text().prop_map(Event::Text),
        4 => (arb_group(), "[0-9]{1,2}(\\.5)?").prop_map(|(group, value)| Event::Choice { group, value }),
    ]
}

/// A state reached by a valid prefix of the form
fn arb_collecting_state() -> impl Strategy<Value = ConvState> {
    (0usize..7).prop_map(|n| {
        let mut state = transition(&ConvState::Idle, Event::Begin).unwrap().new_state;
        for event in valid_events().into_iter().take(n) {
            state = transition(&state, event).unwrap().new_state;
        }
        state
    })
}

fn valid_events() -> Vec<Event> {
    let choice = |group, value: &str| Event::Choice {
        group,
        value: value.to_string(),
    };
    vec![
        Event::Text("2,5".to_string()),
        choice(ChoiceGroup::Coeff, "3"),
        Event::Text("120".to_string()),
        Event::Text("4".to_string()),
        choice(ChoiceGroup::Multiplier, "5"),
        choice(ChoiceGroup::Extra, "6"),
        Event::Text("7.5".to_string()),
    ]
}

fn rejected_event_for(step: Step) -> BoxedStrategy<Event> {
    match step.kind() {
        InputKind::FreeNumber => arb_bad_text().prop_map(Event::Text).boxed(),
        InputKind::Choice(group) => prop_oneof![
            "[1-9][0-9]{2}".prop_map(move |value| Event::Choice { group, value }),
            arb_good_number().prop_map(|(text, _)| Event::Text(text)),
        ]
        .boxed(),
    }
}

fn arb_state_with_rejected_event() -> impl Strategy<Value = (ConvState, Event)> {
    arb_collecting_state().prop_flat_map(|state| {
        let step = state.current_step().unwrap_or_else(Step::first);
        (Just(state), rejected_event_for(step))
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: collected matches the step after any event sequence
    #[test]
    fn prop_collected_matches_step(events in proptest::collection::vec(arb_event(), 0..40)) {
        let mut state = ConvState::Idle;
        for event in events {
            if let Ok(result) = transition(&state, event) {
                state = result.new_state;
            }
            if let ConvState::Collecting(conv) = &state {
                prop_assert!(conv.is_consistent(), "Inconsistent: {:?}", conv);
            }
        }
    }

    // Invariant 2: every accepted event produces exactly one reply
    #[test]
    fn prop_one_reply_per_event(
        state in arb_collecting_state(),
        event in arb_event(),
    ) {
        if let Ok(result) = transition(&state, event) {
            prop_assert_eq!(result.replies().count(), 1);
        }
    }

    // Invariant 3: rejected input never changes step or collected
    #[test]
    fn prop_rejection_is_idempotent((state, event) in arb_state_with_rejected_event()) {
        let first = transition(&state, event.clone()).unwrap();
        prop_assert_eq!(&first.new_state, &state);
        let second = transition(&first.new_state, event).unwrap();
        prop_assert_eq!(&second.new_state, &state);
        prop_assert_eq!(
            first.replies().collect::<Vec<_>>(),
            second.replies().collect::<Vec<_>>()
        );
    }

    // Invariant 4: valid answers accumulate regardless of failed attempts
    #[test]
    fn prop_prefix_survives_retries(
        retries in proptest::collection::vec(0usize..4, 7),
        bad in arb_bad_text(),
    ) {
        let mut state = transition(&ConvState::Idle, Event::Begin).unwrap().new_state;
        for (n, (event, attempts)) in valid_events().into_iter().zip(retries).enumerate() {
            let step = state.current_step().unwrap();
            if step.kind() == InputKind::FreeNumber {
                for _ in 0..attempts {
                    state = transition(&state, Event::Text(bad.clone())).unwrap().new_state;
                }
            }
            state = transition(&state, event).unwrap().new_state;

            if let ConvState::Collecting(conv) = &state {
                let expected: Vec<Field> = Step::ALL[..=n].iter().map(|s| s.field()).collect();
                prop_assert_eq!(conv.collected.fields().collect::<Vec<_>>(), expected);
            } else {
                prop_assert_eq!(n, 6, "conversation ended early");
            }
        }
        prop_assert_eq!(state, ConvState::Idle);
    }

    // Invariant 5: a choice tagged for another group never mutates state
    #[test]
    fn prop_cross_step_isolation(
        state in arb_collecting_state(),
        group in arb_group(),
        value in "[0-9]{1,2}",
    ) {
        let step = state.current_step().unwrap();
        prop_assume!(step.kind() != InputKind::Choice(group));

        let result = transition(&state, Event::Choice { group, value });
        let is_unexpected = matches!(result, Err(TransitionError::UnexpectedInput { .. }));
        prop_assert!(is_unexpected);
    }

    // Invariant 6: cancel from anywhere clears the conversation
    #[test]
    fn prop_cancel_always_clears(state in arb_collecting_state()) {
        let result = transition(&state, Event::Cancel).unwrap();
        prop_assert_eq!(result.new_state, ConvState::Idle);

        let restarted = transition(&ConvState::Idle, Event::Begin).unwrap().new_state;
        let conv = restarted.conversation().unwrap();
        prop_assert!(conv.collected.is_empty());
        prop_assert_eq!(conv.step, Step::first());
    }

    // Invariant 7: free-number answers are stored as parsed
    #[test]
    fn prop_free_number_stored((text, value) in arb_good_number()) {
        let state = transition(&ConvState::Idle, Event::Begin).unwrap().new_state;
        let result = transition(&state, Event::Text(text)).unwrap();
        let stored = result.new_state.conversation().unwrap().collected.get(Field::Length).unwrap();
        prop_assert!((stored - value).abs() < 1e-9);
    }
}
