//! Curtain calculator - Telegram pricing bot
//!
//! Walks a user through a seven-step form over chat and replies with a
//! price breakdown for fabric, stitching and tape.

mod api;
mod config;
mod controller;
mod messages;
mod parse;
mod pricing;
mod state_machine;
mod store;
mod telegram;

use api::{create_router, AppState};
use config::{BotConfig, TransportMode};
use controller::{Controller, Messenger, SharedController};
use std::sync::Arc;
use store::{InMemoryStateStore, StateStore};
use telegram::TelegramClient;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "curtain_calc=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = BotConfig::from_env()?;
    let client = Arc::new(TelegramClient::new(&config.token, &config.api_url)?);

    let store: Arc<dyn StateStore> = Arc::new(InMemoryStateStore::new());
    let messenger: Arc<dyn Messenger> = client.clone();
    let controller: Arc<SharedController> = Arc::new(Controller::new(store, messenger));

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                return;
            }
            tracing::info!("Shutdown requested");
            cancel.cancel();
        }
    });

    match (&config.mode, config.webhook_url()) {
        (TransportMode::Webhook { host }, Some(url)) => {
            client.set_webhook(&url).await?;
            tracing::info!(host = %host, "Webhook registered");

            let app = create_router(AppState::new(controller, &config.token));
            let addr = config.bind_addr();
            tracing::info!("Curtain calculator listening on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app)
                .with_graceful_shutdown(cancel.clone().cancelled_owned())
                .await?;

            if let Err(e) = client.delete_webhook().await {
                tracing::warn!(error = %e, "Failed to remove webhook on shutdown");
            }
        }
        _ => {
            // getUpdates is refused while a webhook is registered
            client.delete_webhook().await?;
            telegram::polling::run_polling(client.as_ref(), controller.as_ref(), cancel).await;
        }
    }

    tracing::info!("Curtain calculator stopped");
    Ok(())
}
