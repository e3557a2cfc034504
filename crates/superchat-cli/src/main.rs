//! superchat binary entry point.

mod chat;
mod cli;
mod commands;
mod display;
mod router;
mod setup;
mod wizard;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use superchat_core::SuperchatError;
use superchat_core::models::{ModelConfig, ModelRegistry};
use superchat_core::session::SessionConfig;
use superchat_interaction::client::OpenRouterClient;
use superchat_interaction::pool::AgentPool;

use chat::ChatSession;
use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    let registry = ModelRegistry::builtin();

    // API key before anything else; the wizard runs on first use.
    let api_key = match wizard::load_api_key() {
        Some(key) => key,
        None => match wizard::run_api_key_wizard()? {
            Some(key) => key,
            None => return Ok(()),
        },
    };

    let mut config = SessionConfig::new();
    config.set_voice_enabled(args.voice);
    if let Some(flow) = args.flow {
        config.set_flow_mode(flow.into());
    }

    // Fully-resolved command-line models skip the setup loop entirely.
    let mut cli_mode = false;
    if !args.model.is_empty() {
        let (success, resolved, errors) = cli::resolve_cli_models(&args.model, registry);
        for error in &errors {
            println!("{error}");
        }
        if success {
            for key in resolved {
                config.add_model(key);
            }
            cli_mode = true;
        } else {
            println!();
        }
    }

    if !cli_mode {
        match setup::setup_loop(config, registry)? {
            Some(configured) => config = configured,
            None => return Ok(()),
        }
    }

    if !config.start() {
        println!("No models configured; nothing to do.");
        return Ok(());
    }
    tracing::debug!(models = ?config.models(), flow = ?config.flow_mode(), "session configured");

    let models: Vec<ModelConfig> = config
        .models()
        .iter()
        .map(|key| {
            registry
                .get(key)
                .cloned()
                .ok_or_else(|| SuperchatError::not_found("model", key))
        })
        .collect::<superchat_core::Result<_>>()?;

    let invoker = Arc::new(OpenRouterClient::new(api_key));
    let pool = AgentPool::new(&models, invoker);

    let mut session = ChatSession::new(config, models, pool);
    session.run().await
}
