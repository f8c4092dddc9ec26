//! Runtime configuration from the environment

use std::net::{Ipv4Addr, SocketAddr};
use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
    #[error("webhook mode needs RENDER_EXTERNAL_HOSTNAME or WEBHOOK_HOST")]
    MissingWebhookHost,
}

/// How updates reach the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportMode {
    /// Telegram pushes updates to `https://{host}/webhook/{token}`
    Webhook { host: String },
    /// The bot pulls updates with `getUpdates`
    Polling,
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    pub mode: TransportMode,
    pub port: u16,
    pub api_url: String,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source.
    ///
    /// A webhook host selects webhook mode unless `BOT_MODE` says otherwise.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let token = var("BOT_TOKEN").ok_or(ConfigError::Missing("BOT_TOKEN"))?;
        let host = var("RENDER_EXTERNAL_HOSTNAME").or_else(|| var("WEBHOOK_HOST"));

        let mode = match (var("BOT_MODE").as_deref(), host) {
            (Some("polling"), _) | (None, None) => TransportMode::Polling,
            (Some("webhook") | None, Some(host)) => TransportMode::Webhook { host },
            (Some("webhook"), None) => return Err(ConfigError::MissingWebhookHost),
            (Some(other), _) => {
                return Err(ConfigError::Invalid {
                    name: "BOT_MODE",
                    value: other.to_string(),
                })
            }
        };

        let port = match var("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let api_url = var("TELEGRAM_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self {
            token,
            mode,
            port,
            api_url,
        })
    }

    /// Public URL Telegram should post updates to, in webhook mode
    pub fn webhook_url(&self) -> Option<String> {
        match &self.mode {
            TransportMode::Webhook { host } => {
                let host = host.trim_end_matches('/');
                let base = if host.starts_with("http://") || host.starts_with("https://") {
                    host.to_string()
                } else {
                    format!("https://{host}")
                };
                Some(format!("{base}/webhook/{}", self.token))
            }
            TransportMode::Polling => None,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}
