//! Ride Daemon - Background ride dispatch service
//!
//! The ride daemon:
//! - Loads ride fixtures and opens the park
//! - Runs the dispatch loop for every ride
//! - Logs every event the engine publishes
//! - Closes all rides on Ctrl+C / SIGTERM before exiting

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use ride_engine::{BroadcastEventPublisher, EngineConfig, NoStaffingRequirements, RideEngine};
use ride_types::RideEventEnvelope;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod visitors;

use visitors::HttpVisitorLookup;

/// Ride Daemon CLI
#[derive(Parser)]
#[command(name = "rided")]
#[command(about = "Ride Daemon - Ride lifecycle and dispatch service", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "RIDES_CONFIG")]
    config: Option<String>,

    /// Ride fixture file, overrides `fixtures.path`
    #[arg(short, long, env = "RIDES_FIXTURE_FILE")]
    fixtures: Option<PathBuf>,

    /// Visitor service base URL, overrides `visitors.base_url`
    #[arg(long, env = "RIDES_VISITOR_URL")]
    visitor_url: Option<String>,

    /// Log level, overrides `logging.level`
    #[arg(long, env = "RIDES_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "RIDES_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config =
        EngineConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    // Override with CLI args
    if let Some(path) = cli.fixtures {
        config.fixtures.path = path;
    }
    if let Some(url) = cli.visitor_url {
        config.visitors.base_url = url;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.json |= cli.json;

    init_tracing(&config);

    let publisher = Arc::new(BroadcastEventPublisher::default());
    let event_log = tokio::spawn(log_events(publisher.subscribe()));

    let visitors = Arc::new(HttpVisitorLookup::new(&config.visitors)?);
    let engine = RideEngine::from_fixtures(
        config,
        visitors,
        publisher.clone(),
        Arc::new(NoStaffingRequirements),
    )
    .context("Failed to start ride engine")?;

    println!(
        r#"
  Ride Daemon
  Version: {}
  Rides: {}
  Visitor service: {}
"#,
        env!("CARGO_PKG_VERSION"),
        engine.registry().len(),
        engine.config().visitors.base_url
    );

    let opened = engine.admin().open_all().await;
    tracing::info!(opened = opened.len(), "Park opened");

    let dispatch = engine.start();

    shutdown_signal().await;

    let closed = engine.admin().close_all().await;
    tracing::info!(closed = closed.len(), "Park closed");

    dispatch.shutdown().await;

    // Dropping every sender lets the event log drain and finish.
    drop(engine);
    drop(publisher);
    if let Err(e) = event_log.await {
        tracing::warn!(error = %e, "Event log task ended abnormally");
    }

    tracing::info!("Ride daemon stopped");
    Ok(())
}

fn init_tracing(config: &EngineConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn log_events(mut events: broadcast::Receiver<RideEventEnvelope>) {
    loop {
        match events.recv().await {
            Ok(event) => {
                let payload = serde_json::to_string(&event.payload()).unwrap_or_default();
                tracing::info!(
                    event_id = %event.id,
                    event_type = %event.event_type(),
                    ride_id = %event.event.ride_id(),
                    payload = %payload,
                    "Ride event"
                );
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event log fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
