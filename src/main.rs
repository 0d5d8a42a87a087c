//! junctiond - intersection traversal coordinator
//!
//! CLI entry point: wires the coordinator, profile refresher, and stdio
//! transport together.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use tokio::sync::RwLock;
use tracing::info;

use junctiond::cli::{Cli, Command};
use junctiond::config::Config;
use junctiond::coordinator::Coordinator;
use junctiond::io;
use junctiond::params::{FileParameterStore, ProfileRefresher};
use junctiond::turn::TurnProfile;

fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("junctiond")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Write to a log file, not stdout - stdout is the transport
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(log_dir.join("junctiond.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!(
        coordination_state = %config.coordinator.coordination_state,
        settle_secs = config.coordinator.settle_secs,
        refresh_interval_secs = config.params.refresh_interval_secs,
        "junctiond loaded config"
    );

    match cli.command {
        Some(Command::Profiles) => cmd_profiles(&config),
        Some(Command::Run) | None => cmd_run(config).await,
    }
}

/// Print the resolved turn profiles
fn cmd_profiles(config: &Config) -> Result<()> {
    let yaml = serde_yaml::to_string(&config.profiles).context("Failed to render profiles")?;
    print!("{yaml}");
    Ok(())
}

/// Run the coordinator on the stdio transport
async fn cmd_run(config: Config) -> Result<()> {
    log_profiles(&config);

    let store = Arc::new(FileParameterStore::new(
        config.params.profiles_path.clone(),
        config.params.feed_forward_path.clone(),
    ));
    let profiles = Arc::new(RwLock::new(config.profiles.clone()));

    let refresher = ProfileRefresher::new(config.params.refresh_interval(), store.clone(), profiles.clone());
    let refresher_task = tokio::spawn(refresher.run());

    let (coordinator, outbound_rx) = Coordinator::new(config.coordinator.clone(), profiles, store);
    let handle = coordinator.handle();
    let coordinator_task = tokio::spawn(coordinator.run());

    let outbound_task = tokio::spawn(io::pump_outbound(outbound_rx));

    tokio::select! {
        res = io::pump_inbound(handle.clone()) => {
            res?;
            info!("Signal input closed, shutting down");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupt received, shutting down");
        }
    }

    handle.shutdown().await?;
    coordinator_task.await?;
    refresher_task.abort();

    // The outbound pump drains and exits once the coordinator and any
    // remaining traversal workers drop their event senders
    let _ = outbound_task.await;

    info!("junctiond shutdown");
    Ok(())
}

fn log_profiles(config: &Config) {
    let table = &config.profiles;
    let named: [(&str, &TurnProfile); 3] = [
        ("left", &table.left),
        ("straight", &table.straight),
        ("right", &table.right),
    ];

    for (turn, profile) in named {
        info!(
            turn,
            dwell_secs = profile.dwell_secs,
            feed_forward_omega = profile.feed_forward_omega,
            "Loaded turn profile"
        );
    }

    if let Some(turn) = table.debug_turn {
        info!(?turn, "Debug turn override is active");
    }
}
