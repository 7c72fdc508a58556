mod activity;
mod app;
mod form;
mod format;
mod input;

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    sync::Mutex,
};

use banker_core::{
    config::{self, AppConfig},
    Bank,
};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    init_logging(&config)?;

    let (bank, opening) = Bank::open(config.store());
    let bank = bank.with_autosave(config.autosave);
    info!(
        save_file = %config.save_file.display(),
        autosave = config.autosave,
        players = bank.session().players.len(),
        "Banker started"
    );

    let mut app = app::BankerApp::new(bank, config, opening);
    app.run().await
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(&config.log_dir);
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let log_path = log_dir.join("banker.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .with_context(|| format!("invalid log filter {:?}", config.log_filter))?;

    // The terminal belongs to the UI, so events only go to the file.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
