//! Conversation controller
//!
//! Resolves the session for each inbound event, runs the pure transition
//! under the store's lock for that session, then executes the resulting
//! effects against the messenger.

pub mod traits;

#[cfg(test)]
pub mod testing;

pub use traits::Messenger;

use crate::state_machine::{transition, ConvState, Effect, Event, TransitionError};
use crate::store::{SessionKey, StateStore};
use crate::telegram::Update;
use std::sync::Arc;

/// Type alias for the production controller behind trait objects
pub type SharedController = Controller<Arc<dyn StateStore>, Arc<dyn Messenger>>;

/// Transport-neutral inbound event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub session: SessionKey,
    pub kind: InboundKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundKind {
    /// Text typed by the user
    Text(String),
    /// Button press; `callback_id` must be acknowledged to the transport
    Choice { callback_id: String, data: String },
}

pub struct Controller<S, M>
where
    S: StateStore,
    M: Messenger,
{
    store: S,
    messenger: M,
}

impl<S, M> Controller<S, M>
where
    S: StateStore,
    M: Messenger,
{
    pub fn new(store: S, messenger: M) -> Self {
        Self { store, messenger }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handle one Bot API update, skipping kinds the bot does not use
    pub async fn handle_update(&self, update: Update) {
        let update_id = update.update_id;
        match update.into_inbound() {
            Some(inbound) => self.handle(inbound).await,
            None => tracing::debug!(update_id, "Ignoring update without text or callback data"),
        }
    }

    pub async fn handle(&self, inbound: InboundEvent) {
        let InboundEvent { session, kind } = inbound;
        match kind {
            InboundKind::Text(text) => {
                self.dispatch(session, Event::from_text(&text)).await;
            }
            InboundKind::Choice { callback_id, data } => {
                match Event::from_callback(&data) {
                    Some(event) => self.dispatch(session, event).await,
                    None => tracing::debug!(session = %session, data = %data, "Ignoring unknown callback tag"),
                }
                // The client shows a spinner until the press is answered,
                // whatever became of it.
                if let Err(e) = self.messenger.acknowledge(&callback_id).await {
                    tracing::warn!(session = %session, error = %e, "Failed to acknowledge callback");
                }
            }
        }
    }

    async fn dispatch(&self, session: SessionKey, event: Event) {
        let kind = event.kind();
        match self.apply(session, event) {
            Ok(effects) => {
                for effect in effects {
                    self.execute_effect(session, effect).await;
                }
            }
            Err(e) if e.is_fatal() => {
                tracing::error!(session = %session, event = kind, error = %e, "Conversation dropped after internal fault");
            }
            Err(e) => {
                tracing::debug!(session = %session, event = kind, reason = %e, "Event ignored");
            }
        }
    }

    /// Run the transition for `event` while the store holds the session.
    ///
    /// Ignored events leave the state as it was; fatal faults clear it.
    pub fn apply(&self, session: SessionKey, event: Event) -> Result<Vec<Effect>, TransitionError> {
        let kind = event.kind();
        let mut pending = Some(event);
        let mut outcome = None;

        self.store.transact(session, &mut |state| {
            let Some(event) = pending.take() else {
                return state.clone();
            };
            match transition(state, event) {
                Ok(result) => {
                    tracing::debug!(
                        session = %session,
                        event = kind,
                        from = ?state.current_step(),
                        to = ?result.new_state.current_step(),
                        "Transition"
                    );
                    outcome = Some(Ok(result.effects));
                    result.new_state
                }
                Err(e) => {
                    let next = if e.is_fatal() {
                        ConvState::Idle
                    } else {
                        state.clone()
                    };
                    outcome = Some(Err(e));
                    next
                }
            }
        });

        outcome.unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn execute_effect(&self, session: SessionKey, effect: Effect) {
        match effect {
            Effect::Reply(message) => {
                // State is already committed; a lost reply is not rolled back
                if let Err(e) = self.messenger.send(session.chat_id, &message).await {
                    tracing::warn!(
                        session = %session,
                        error = %e,
                        retryable = e.kind.is_retryable(),
                        "Failed to deliver reply"
                    );
                }
            }
            Effect::RecordCompletion(result) => {
                tracing::info!(
                    session = %session,
                    fabric_metraj = result.fabric_metraj,
                    total = result.total,
                    "Calculation completed"
                );
            }
        }
    }
}
