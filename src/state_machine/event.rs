//! Events that drive a conversation

use super::step::ChoiceGroup;

/// Command that resets the session and shows the calculation menu
pub const START_COMMAND: &str = "/start";

/// Cancel literal, matched case-insensitively in any state
pub const CANCEL_WORD: &str = "скасувати";

const CANCEL_ALIASES: [&str; 3] = [CANCEL_WORD, "cancel", "/cancel"];

/// Callback tag of the menu button that begins the cornice calculation
pub const BEGIN_TAG: &str = "start_calc_cornices";

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// `/start`: reset the session and offer the menu
    Start,
    /// Menu button: begin the form at its first step
    Begin,
    /// Cancel literal, valid from any state
    Cancel,
    /// Free text from the user
    Text(String),
    /// Button selection for one of the fixed-choice steps
    Choice { group: ChoiceGroup, value: String },
}

impl Event {
    /// Classify a text message.
    ///
    /// `/start` also matches the `/start@botname` and `/start payload` forms
    /// clients send in group chats and deep links.
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        let command = trimmed
            .split_whitespace()
            .next()
            .and_then(|word| word.split('@').next())
            .unwrap_or_default();

        if command == START_COMMAND {
            Event::Start
        } else if CANCEL_ALIASES
            .iter()
            .any(|alias| trimmed.to_lowercase() == *alias)
        {
            Event::Cancel
        } else {
            Event::Text(text.to_string())
        }
    }

    /// Classify button callback data. Unknown tags yield `None`.
    pub fn from_callback(data: &str) -> Option<Self> {
        if data == BEGIN_TAG {
            return Some(Event::Begin);
        }
        let (prefix, value) = data.split_once(':')?;
        let group = ChoiceGroup::from_prefix(prefix)?;
        Some(Event::Choice {
            group,
            value: value.to_string(),
        })
    }

    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Start => "start",
            Event::Begin => "begin",
            Event::Cancel => "cancel",
            Event::Text(_) => "text",
            Event::Choice { .. } => "choice",
        }
    }
}
