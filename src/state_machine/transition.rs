//! Pure state transition function

use super::state::{Conversation, MissingField};
use super::step::{InputKind, Step};
use super::{ConvState, Effect, Event};
use crate::messages;
use crate::parse::parse_number;
use crate::pricing::compute;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Outbound replies, in emission order
    #[cfg(test)]
    pub fn replies(&self) -> impl Iterator<Item = &crate::state_machine::OutboundMessage> {
        self.effects.iter().filter_map(|effect| match effect {
            Effect::Reply(message) => Some(message),
            Effect::RecordCompletion(_) => None,
        })
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("no conversation in progress")]
    NoConversation,
    #[error("{got} input while waiting for {expected:?}")]
    UnexpectedInput { expected: Step, got: &'static str },
    #[error(transparent)]
    MissingField(#[from] MissingField),
}

impl TransitionError {
    /// Internal-consistency faults: the conversation cannot continue
    pub fn is_fatal(&self) -> bool {
        matches!(self, TransitionError::MissingField(_))
    }
}

/// Pure transition function
///
/// Given the same state and event this always produces the same result, with
/// no I/O. Rejected input leaves the state untouched: either the result
/// carries the unchanged state and a re-prompt, or an error is returned.
pub fn transition(state: &ConvState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // Side-channel triggers, valid from any state
        (_, Event::Start) => Ok(TransitionResult::new(ConvState::Collecting(Conversation::new()))
            .with_effect(Effect::reply(messages::menu()))),

        (_, Event::Begin) => Ok(TransitionResult::new(ConvState::Collecting(Conversation::new()))
            .with_effect(Effect::reply(messages::prompt(Step::first())))),

        (_, Event::Cancel) => {
            Ok(TransitionResult::new(ConvState::Idle).with_effect(Effect::reply(messages::cancelled())))
        }

        // Nothing to answer outside a conversation
        (ConvState::Idle, Event::Text(_) | Event::Choice { .. }) => Err(TransitionError::NoConversation),

        // Free text
        (ConvState::Collecting(conv), Event::Text(text)) => match conv.step.kind() {
            InputKind::FreeNumber => match parse_number(&text) {
                Ok(value) => accept(conv, value),
                Err(_) => Ok(unchanged(state, messages::invalid_number(conv.step))),
            },
            // Text where a button is expected: show the buttons again
            InputKind::Choice(_) => Ok(unchanged(state, messages::prompt(conv.step))),
        },

        // Button selections
        (ConvState::Collecting(conv), Event::Choice { group, value }) => match conv.step.kind() {
            InputKind::Choice(expected) if expected == group => match group.validate(&value) {
                Some(value) => accept(conv, value),
                None => Ok(unchanged(state, messages::prompt(conv.step))),
            },
            _ => Err(TransitionError::UnexpectedInput {
                expected: conv.step,
                got: group.prefix(),
            }),
        },
    }
}

fn unchanged(state: &ConvState, reply: crate::state_machine::OutboundMessage) -> TransitionResult {
    TransitionResult::new(state.clone()).with_effect(Effect::reply(reply))
}

/// Store a validated value and move to the next step, or price the form
/// when the terminal step is answered.
fn accept(conv: &Conversation, value: f64) -> Result<TransitionResult, TransitionError> {
    let completed = conv.step;
    let mut collected = conv.collected.clone();
    collected.insert(completed.field(), value);

    if let Some(next) = completed.next() {
        let advanced = Conversation {
            step: next,
            collected,
        };
        debug_assert!(advanced.is_consistent(), "collected out of step: {advanced:?}");
        return Ok(TransitionResult::new(ConvState::Collecting(advanced))
            .with_effect(Effect::reply(messages::advance(completed, value, next))));
    }

    let inputs = collected.pricing_inputs()?;
    let result = compute(&inputs);
    Ok(TransitionResult::new(ConvState::Idle)
        .with_effect(Effect::reply(messages::report(&inputs, &result)))
        .with_effect(Effect::RecordCompletion(result)))
}
