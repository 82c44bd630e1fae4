//! VPS Backup - Library
//!
//! Unattended, periodic backups of a single remote host over SSH: the
//! host archives its own filesystem, the archive is pulled down over
//! SFTP, the remote copy is deleted and local archives beyond the
//! retention count are pruned.

pub mod backup;
pub mod config;
pub mod error;
pub mod remote;
pub mod scheduler;
pub mod setup;

// Re-export commonly used types
pub use config::Settings;
pub use error::BackupError;
pub type Result<T> = std::result::Result<T, BackupError>;
