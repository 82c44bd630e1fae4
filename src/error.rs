//! Custom error types for the backup tool.

use thiserror::Error;

/// One variant per failure class. `Config` is fatal to the invocation;
/// `Connection`, `Archive` and `Transfer` abort the current backup cycle
/// only; `Prune` is downgraded to a warning by the orchestrator.
#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Remote archive creation failed: {0}")]
    Archive(String),

    #[error("Transfer error: {0}")]
    Transfer(String),

    #[error("Prune error: {0}")]
    Prune(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BackupError>;
