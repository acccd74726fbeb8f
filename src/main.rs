//! aas-agent — entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config and apply env overrides
//!   3. Init logger at the configured level
//!   4. Validate credentials for the enabled components
//!   5. Build the LLM provider
//!   6. Spawn the comms channels and run until Ctrl-C or a channel fails

use std::fs;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use aas_agent::agent::AgentContext;
use aas_agent::comms::{self, CommsState};
use aas_agent::error::AppError;
use aas_agent::llm::providers;
use aas_agent::{config, logger};

#[tokio::main]
async fn main() {
    let code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    };
    // Exit here rather than on runtime drop: a pending stdin read would
    // otherwise hold the process open.
    std::process::exit(code);
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let config = config::load()?;

    fs::create_dir_all(&config.work_dir)?;
    logger::init(&config.log_level, config.log_file.as_deref())?;

    info!(
        bot_name = %config.bot_name,
        work_dir = %config.work_dir.display(),
        log_level = %config.log_level,
        "config loaded"
    );

    config.validate()?;

    if let Some(key) = &config.llm_api_key {
        info!(key = %logger::mask_secret(key), "llm api key loaded");
    }
    if let Some(token) = &config.telegram_token {
        info!(token = %logger::mask_secret(token), "telegram bot token loaded");
    }

    let provider = providers::build(&config.llm, config.llm_api_key.clone())?;
    info!(provider = provider.name(), model = %config.llm.openai.model, "llm provider ready");
    if let Err(e) = provider.ping().await {
        warn!(provider = provider.name(), "llm endpoint check failed: {e}");
    }

    fs::create_dir_all(&config.aas.data_dir)?;
    info!(data_dir = %config.aas.data_dir.display(), "aas data directory ready");

    let state = Arc::new(CommsState::new(AgentContext::from_config(&config, provider)));
    let shutdown = CancellationToken::new();
    let comms = comms::start(&config, state, shutdown.clone());

    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("ctrl-c received — shutting down"),
            Err(e) => error!("failed to listen for ctrl-c: {e}"),
        }
        ctrl_c.cancel();
    });

    let result = comms.join().await;
    shutdown.cancel();
    info!("shutdown complete");
    result
}
