//! Telegram Bot API transport
//!
//! Wire types, the HTTP client used for outbound messages, and the two
//! inbound modes: webhook (served by `api`) and long polling.

mod client;
mod error;
pub mod polling;
pub mod types;

pub use client::TelegramClient;
pub use error::TelegramError;
pub use types::Update;
