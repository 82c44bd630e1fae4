//! Backup cycle orchestration.
//!
//! One cycle is Archive -> Transfer -> Prune, strictly sequential. The
//! first two steps abort the cycle on failure; pruning problems are
//! logged and the backup still counts as successful. The orchestrator
//! performs no retries, a failed cycle waits for the next scheduled run.

pub mod retention;

use crate::config::Settings;
use crate::error::BackupError;
use crate::remote::{self, archive, transfer, ConnectParams};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Phases of one backup cycle. `Failed` is reachable from `Archiving`
/// and `Transferring` only; retention never invalidates a backup that
/// already landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    Archiving,
    Transferring,
    Pruned,
    Failed,
}

/// Outcome of a successful cycle.
#[derive(Debug)]
pub struct CycleReport {
    /// Where the new archive landed.
    pub archive_path: PathBuf,

    /// Old archives deleted by retention, oldest first.
    pub removed: Vec<PathBuf>,
}

/// Remote side of one backup cycle.
///
/// The production implementation drives ssh2; tests substitute a mock to
/// exercise the orchestrator's sequencing without a network.
pub trait RemoteHost {
    /// Build the filesystem archive on the remote host.
    fn create_archive(&self) -> Result<(), BackupError>;

    /// Download the archive to `local_path` and delete the remote copy.
    fn fetch_and_clean(&self, local_path: &Path) -> Result<(), BackupError>;
}

/// ssh2-backed remote host. Archive creation and transfer each open
/// their own sessions.
pub struct SshRemoteHost {
    params: ConnectParams,
}

impl SshRemoteHost {
    pub fn new(params: ConnectParams) -> Self {
        Self { params }
    }
}

impl RemoteHost for SshRemoteHost {
    fn create_archive(&self) -> Result<(), BackupError> {
        let sess = remote::connect(&self.params)?;
        archive::create_archive(&sess)
    }

    fn fetch_and_clean(&self, local_path: &Path) -> Result<(), BackupError> {
        transfer::fetch_and_clean(&self.params, local_path)
    }
}

/// Local archive name for a cycle started on `date`.
///
/// Two cycles on the same calendar day produce the same name and the
/// second overwrites the first locally.
pub fn archive_filename(username: &str, date: NaiveDate) -> String {
    format!("{username}_{}.zip", date.format("%d_%m_%Y"))
}

/// Run one backup cycle against `remote`, landing the archive in
/// `working_dir`.
pub fn run_cycle<R: RemoteHost>(
    remote: &R,
    working_dir: &Path,
    username: &str,
    retention_count: usize,
    today: NaiveDate,
) -> Result<CycleReport, BackupError> {
    let archive_path = working_dir.join(archive_filename(username, today));
    tracing::info!(phase = ?CyclePhase::Idle, username, "Starting backup cycle");

    tracing::info!(phase = ?CyclePhase::Archiving, "Creating backup of remote host");
    if let Err(e) = remote.create_archive() {
        tracing::error!(phase = ?CyclePhase::Failed, error = %e, "Backup cycle aborted");
        return Err(e);
    }

    tracing::info!(phase = ?CyclePhase::Transferring, "Transferring backup archive");
    if let Err(e) = remote.fetch_and_clean(&archive_path) {
        tracing::error!(phase = ?CyclePhase::Failed, error = %e, "Backup cycle aborted");
        return Err(e);
    }
    tracing::info!("Backup transferred successfully: {}", archive_path.display());

    let removed = match retention::prune(working_dir, username, retention_count) {
        Ok(removed) => removed,
        Err(e) => {
            tracing::warn!("Pruning old backups failed: {e}");
            Vec::new()
        }
    };

    tracing::info!(
        phase = ?CyclePhase::Pruned,
        removed = removed.len(),
        "Backup cycle completed"
    );
    Ok(CycleReport {
        archive_path,
        removed,
    })
}

/// Run one full cycle against the configured host, dated at the moment
/// the cycle starts.
pub fn run_backup(settings: &Settings, working_dir: &Path) -> Result<CycleReport, BackupError> {
    let remote = SshRemoteHost::new(ConnectParams::from(settings));
    run_cycle(
        &remote,
        working_dir,
        &settings.username,
        settings.retention_count,
        chrono::Local::now().date_naive(),
    )
}
