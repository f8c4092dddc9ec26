//! Bot API HTTP client

use super::error::TelegramError;
use super::types::{
    AnswerCallbackQueryRequest, ApiResponse, DeleteWebhookRequest, GetUpdatesRequest,
    InlineKeyboardMarkup, SendMessageRequest, SetWebhookRequest, Update, ALLOWED_UPDATES,
};
use crate::controller::Messenger;
use crate::state_machine::OutboundMessage;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Long-poll wait passed to `getUpdates`, in seconds
pub const POLL_TIMEOUT_SECS: u64 = 30;

/// Bot API client bound to one bot token
pub struct TelegramClient {
    client: Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(token: &str, api_url: &str) -> Result<Self, TelegramError> {
        // Must outlive the long-poll wait or every idle poll would time out
        let client = Client::builder()
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 15))
            .build()
            .map_err(|e| TelegramError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{token}", api_url.trim_end_matches('/')),
        })
    }

    async fn call<P, R>(&self, method: &str, params: &P) -> Result<R, TelegramError>
    where
        P: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}/{method}", self.base_url))
            .json(params)
            .send()
            .await
            .map_err(|e| {
                // reqwest errors embed the URL, which embeds the token
                let e = e.without_url();
                if e.is_timeout() {
                    TelegramError::network(format!("{method}: request timeout: {e}"))
                } else if e.is_connect() {
                    TelegramError::network(format!("{method}: connection failed: {e}"))
                } else {
                    TelegramError::network(format!("{method}: request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TelegramError::network(format!("{method}: failed to read response: {e}")))?;

        if status.is_server_error() {
            return Err(TelegramError::network(format!("{method}: server error {status}")));
        }

        let envelope: ApiResponse<R> = serde_json::from_str(&body)
            .map_err(|e| TelegramError::decode(format!("{method}: failed to parse response: {e}")))?;

        classify(method, envelope)
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        message: &OutboundMessage,
    ) -> Result<(), TelegramError> {
        let request = SendMessageRequest {
            chat_id,
            text: &message.text,
            reply_markup: message.keyboard.as_ref().map(InlineKeyboardMarkup::from),
        };
        let _: serde_json::Value = self.call("sendMessage", &request).await?;
        Ok(())
    }

    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<(), TelegramError> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                &AnswerCallbackQueryRequest { callback_query_id },
            )
            .await?;
        Ok(())
    }

    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, TelegramError> {
        self.call(
            "getUpdates",
            &GetUpdatesRequest {
                offset,
                timeout: POLL_TIMEOUT_SECS,
                allowed_updates: ALLOWED_UPDATES,
            },
        )
        .await
    }

    pub async fn set_webhook(&self, url: &str) -> Result<(), TelegramError> {
        let _: bool = self
            .call(
                "setWebhook",
                &SetWebhookRequest {
                    url,
                    allowed_updates: ALLOWED_UPDATES,
                },
            )
            .await?;
        Ok(())
    }

    pub async fn delete_webhook(&self) -> Result<(), TelegramError> {
        let _: bool = self
            .call(
                "deleteWebhook",
                &DeleteWebhookRequest {
                    drop_pending_updates: false,
                },
            )
            .await?;
        Ok(())
    }
}

/// Turn a response envelope into the result or a classified error
fn classify<R>(method: &str, envelope: ApiResponse<R>) -> Result<R, TelegramError> {
    if envelope.ok {
        return envelope
            .result
            .ok_or_else(|| TelegramError::decode(format!("{method}: ok response without result")));
    }

    let description = envelope
        .description
        .unwrap_or_else(|| "no description".to_string());
    let retry_after = envelope.parameters.and_then(|p| p.retry_after);

    match (envelope.error_code, retry_after) {
        (_, Some(secs)) => Err(TelegramError::rate_limit(format!(
            "{method}: {description}"
        ))
        .with_retry_after(Duration::from_secs(secs))),
        (Some(429), None) => Err(TelegramError::rate_limit(format!("{method}: {description}"))),
        (code, None) => Err(TelegramError::api(format!(
            "{method}: {description} (code {})",
            code.unwrap_or_default()
        ))),
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send(&self, chat_id: i64, message: &OutboundMessage) -> Result<(), TelegramError> {
        self.send_message(chat_id, message).await
    }

    async fn acknowledge(&self, callback_id: &str) -> Result<(), TelegramError> {
        self.answer_callback_query(callback_id).await
    }
}
