//! Core conversation state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions: the
//! controller feeds events in and executes the effects that come out.

pub mod effect;
pub mod event;
pub mod state;
pub mod step;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Effect, Keyboard, OutboundMessage};
pub use event::Event;
pub use state::{Conversation, ConvState};
pub use transition::{transition, TransitionError};
