//! `mailrules` - applies declarative mail rules to a batch of stored messages.
//!
//! Usage: `mailrules [CONFIG]`. Without an argument the config is read from
//! the user config directory, falling back to defaults.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use mailrules_core::{
    Clock, InMemoryMailbox, JsonFileSource, MessageSource, RuleEngine, SystemClock, store,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailrules=info,mailrules_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref()).await?;

    info!("Starting mailrules");

    let rules = store::load_path(&config.rules_path)
        .await
        .with_context(|| format!("Failed to load rules from {}", config.rules_path.display()))?;

    let messages = JsonFileSource::new(&config.messages_path)
        .messages()
        .await
        .with_context(|| {
            format!(
                "Failed to read messages from {}",
                config.messages_path.display()
            )
        })?;

    let mut mailbox = InMemoryMailbox::with_messages(&messages);
    for kind in config.failing_kinds()? {
        warn!("Mailbox will reject {} actions", kind.as_str());
        mailbox = mailbox.failing_on(kind);
    }
    let mailbox = Arc::new(mailbox);

    let engine = Arc::new(RuleEngine::new(rules).with_policy(config.merge_policy.policy()));
    let now = SystemClock.now();
    let report = engine
        .run_concurrent(messages, now, Arc::clone(&mailbox), config.max_concurrency)
        .await
        .context("Rule evaluation failed")?;

    for message in &report.messages {
        for failure in message.failures() {
            warn!(
                message_id = %message.message_id,
                action = %failure.action,
                cause = failure.cause.as_deref().unwrap_or_default(),
                "Action not applied"
            );
        }
    }

    let json = serde_json::to_string_pretty(&report)?;
    match &config.report_path {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report written to {:?}", path);
        }
        None => println!("{json}"),
    }

    info!(
        "Processed {} messages: {} matched, {} of {} actions applied",
        report.summary.messages_evaluated,
        report.summary.messages_matched,
        report.summary.actions_succeeded,
        report.summary.actions_attempted
    );
    Ok(())
}
