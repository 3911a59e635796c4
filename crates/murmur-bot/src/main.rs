//! murmur — a conversational Telegram bot with human-paced replies.
//!
//! Startup: check the two required secrets, load `~/.murmur/config.toml`,
//! start the Telegram long-poll stream, boot the kernel, then dispatch
//! inbound events until the stream ends.

use futures::StreamExt;
use murmur_kernel::config::load_config;
use murmur_kernel::Kernel;
use murmur_llm::OpenAiDriver;
use murmur_telegram::{InboundContent, TelegramTransport, Transport};
use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Install the subscriber before anything can log. `RUST_LOG` wins; otherwise
/// start at `info` and re-level from the config file once it is loaded, so
/// diagnostics emitted during the config load itself are not dropped.
fn init_tracing() -> tracing_subscriber::reload::Handle<EnvFilter, tracing_subscriber::Registry> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter, handle) = tracing_subscriber::reload::Layer::new(filter);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
    handle
}

/// Read a required secret from the environment, exiting with a diagnostic if
/// it is absent.
fn require_env(name: &str) -> String {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => {
            eprintln!("set {name} env var");
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let telegram_token = require_env("TELEGRAM_TOKEN");
    let openai_key = require_env("OPENAI_API_KEY");

    let filter_handle = init_tracing();
    let config = load_config(None);
    if std::env::var_os("RUST_LOG").is_none() {
        let level = config.log_level.clone();
        if let Err(e) = filter_handle.modify(|filter| *filter = EnvFilter::new(level)) {
            debug!(error = %e, "Failed to re-level log filter");
        }
    }
    let chat_model = config.chat_model.clone();

    let driver = match std::env::var("OPENAI_BASE_URL") {
        Ok(base_url) => OpenAiDriver::with_base_url(openai_key, base_url),
        Err(_) => OpenAiDriver::new(openai_key),
    };

    let transport = Arc::new(TelegramTransport::new(telegram_token));
    let mut inbound = match transport.start().await {
        Ok(stream) => stream,
        Err(e) => {
            error!(error = %e, "Failed to start Telegram transport");
            std::process::exit(1);
        }
    };

    let transport_handle: Arc<dyn Transport> = transport.clone();
    let kernel = match Kernel::new(config, transport_handle, Arc::new(driver)) {
        Ok(kernel) => kernel,
        Err(e) => {
            error!(error = %e, "Failed to boot kernel");
            std::process::exit(1);
        }
    };

    info!(model = %chat_model, "murmur running");

    while let Some(event) = inbound.next().await {
        match event.content {
            InboundContent::Text(text) => kernel.handle_message(event.chat_id, &text),
            InboundContent::Command { name, .. } if name == "reset" => {
                kernel.handle_reset(event.chat_id).await;
            }
            InboundContent::Command { name, .. } => {
                debug!(command = %name, "Ignoring unknown command");
            }
        }
    }

    info!("Inbound stream ended, shutting down");
    transport.stop();
}
