use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use ordo::cli::Cli;
use ordo::core::{LogNotifier, Notifier};
use ordo::remote::{MemorySession, SessionProvider};
use ordo::{AppConfig, EngineOptions, SyncEngine};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_filter.clone())?;

    let config = AppConfig::discover(cli.overrides())?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    runtime.block_on(run(cli, config))
}

async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
    let session: Arc<dyn SessionProvider> =
        Arc::new(MemorySession::new(config.token().map(str::to_string)));
    let api = ordo::remote::connect(&config, session, Arc::clone(&notifier))
        .context("failed to set up the remote client")?;
    let engine = SyncEngine::new(Arc::new(api), notifier, EngineOptions::from_config(&config));

    tracing::debug!(base_url = config.api_base_url(), "running command");
    let stdout = std::io::stdout();
    let handle = stdout.lock();
    ordo::commands::execute(&engine, cli.command, handle).await
}

fn init_tracing(filter: Option<String>) -> Result<()> {
    let filter = filter.unwrap_or_else(|| "info".to_string());
    let directive: Directive = filter.parse()?;
    let env_filter = EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
    Ok(())
}
