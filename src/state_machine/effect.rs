//! Effects produced by state transitions

use super::step::ChoiceGroup;
use crate::pricing::PricedResult;

/// A selectable option attached to a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    /// Machine-readable tag echoed back in the choice event
    pub tag: String,
}

/// Presentation hint: buttons arranged in rows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn new(buttons: Vec<Button>, columns: usize) -> Self {
        let rows = buttons
            .chunks(columns.max(1))
            .map(<[Button]>::to_vec)
            .collect();
        Self { rows }
    }

    /// Two-column keyboard offering every option of a choice group
    pub fn for_choice(group: ChoiceGroup) -> Self {
        let buttons = group
            .options()
            .iter()
            .map(|option| Button {
                label: (*option).to_string(),
                tag: group.tag(option),
            })
            .collect();
        Self::new(buttons, 2)
    }

    #[cfg(test)]
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }
}

/// Text sent back to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send a message to the session's chat
    Reply(OutboundMessage),
    /// A form was completed and priced
    RecordCompletion(PricedResult),
}

impl Effect {
    pub fn reply(message: OutboundMessage) -> Self {
        Effect::Reply(message)
    }
}
