//! VPS Backup - Main entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use vps_backup::{backup, config, scheduler, setup, Settings};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE", default_value = config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Directory where archives are stored
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    working_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Capture connection and policy settings interactively
    Setup,
    /// Show the stored configuration
    Show,
    /// Run a single backup cycle now
    Run,
    /// Run backup cycles on the configured cadence until interrupted
    Schedule,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Command::Setup => {
            setup::setup_configuration(&args.config)?;
        }
        Command::Show => {
            let settings = Settings::load(&args.config)?;
            setup::display_configuration(&settings);
        }
        Command::Run => {
            let settings = Settings::load(&args.config)?;
            let dir = args.working_dir.clone();
            let report =
                tokio::task::spawn_blocking(move || backup::run_backup(&settings, &dir)).await??;
            tracing::info!("Backup completed: {}", report.archive_path.display());
        }
        Command::Schedule => {
            let settings = Settings::load(&args.config)?;
            run_schedule(settings, args.working_dir).await;
        }
    }

    Ok(())
}

async fn run_schedule(settings: Settings, working_dir: PathBuf) {
    tracing::info!(
        "Scheduling backups every {} day(s), retaining {} archive(s)",
        settings.frequency_days,
        settings.retention_count
    );

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel.clone()));

    scheduler::run_scheduler(
        settings.frequency_days,
        scheduler::POLL_INTERVAL,
        chrono::Utc::now(),
        cancel,
        move || {
            let settings = settings.clone();
            let dir = working_dir.clone();
            async move {
                // ssh2 is blocking; keep the cycle off the async workers.
                match tokio::task::spawn_blocking(move || backup::run_backup(&settings, &dir)).await
                {
                    Ok(Ok(report)) => {
                        tracing::info!("Backup completed: {}", report.archive_path.display());
                        true
                    }
                    Ok(Err(e)) => {
                        tracing::error!("Backup failed: {e}");
                        false
                    }
                    Err(e) => {
                        tracing::error!("Backup task panicked: {e}");
                        false
                    }
                }
            }
        },
    )
    .await;
}

async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to listen for ctrl+c");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to listen for SIGTERM")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }

    cancel.cancel();
}
