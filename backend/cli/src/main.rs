use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{error, info};

use chatpulse_channels::{ChannelAdapter, TelegramAdapter};
use chatpulse_config::{BotConfig, StoreConfig};
use chatpulse_core::unix_now;
use chatpulse_gateway::GatewayState;
use chatpulse_metrics::{open_store, render_report, Aggregator, MetricKeys};

#[derive(Parser)]
#[command(name = "chatpulse")]
#[command(about = "Telegram usage telemetry with a Prometheus scrape endpoint")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot and the /metrics endpoint (default)
    Serve,
    /// Print one snapshot computed from the store and exit
    Snapshot {
        /// Print JSON instead of the chat report
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let config = chatpulse_config::load_from_env()?;
            let log_dir = config.log_dir.as_deref().map(Path::new);
            chatpulse_logging::init_logger(&config.log_level, log_dir);
            run_server(config).await?;
        }
        Commands::Snapshot { json } => {
            let store = chatpulse_config::load_store_from_env()?;
            print_snapshot(&store, json).await?;
        }
    }

    Ok(())
}

async fn open_aggregator(store: &StoreConfig) -> Result<Aggregator> {
    let backend = open_store(&store.redis_url).await.with_context(|| {
        let url = chatpulse_config::redact_url(&store.redis_url);
        format!("Failed to open store at {url}")
    })?;
    Ok(Aggregator::with_keys(backend, MetricKeys::with_prefix(&store.key_prefix)))
}

async fn run_server(config: BotConfig) -> Result<()> {
    info!(config = ?config, "Starting chatpulse");

    let aggregator = open_aggregator(&config.store).await?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let state = GatewayState::new(aggregator.clone())?;
    let listener = chatpulse_gateway::bind(&config.bind_address()).await?;
    let mut http_shutdown = shutdown_rx.clone();
    let mut http = tokio::spawn(chatpulse_gateway::start_server(listener, state, async move {
        let _ = http_shutdown.wait_for(|stop| *stop).await;
    }));

    let adapter = TelegramAdapter::new(config.telegram_token.clone(), aggregator);
    let bot = tokio::spawn(async move {
        if let Err(e) = adapter.start(shutdown_rx).await {
            error!(adapter = adapter.name(), error = %e, "Channel adapter failed");
        }
    });

    let http_result = tokio::select! {
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
            None
        }
        result = &mut http => {
            error!("HTTP server exited early, shutting down");
            Some(result)
        }
    };
    let _ = shutdown_tx.send(true);

    if let Err(e) = bot.await {
        error!(error = %e, "Bot task panicked");
    }
    let http_result = match http_result {
        Some(result) => result,
        None => http.await,
    };
    http_result.context("HTTP server task panicked")??;
    Ok(())
}

async fn print_snapshot(store: &StoreConfig, json: bool) -> Result<()> {
    let aggregator = open_aggregator(store).await?;
    let snapshot = aggregator.snapshot(unix_now()).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!("{}", render_report(&snapshot));
    }
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
