//! Remote archive creation.

use crate::error::BackupError;
use crate::remote;

/// Fixed location of the temporary archive on the remote host. An orphan
/// left behind by a failed cycle is overwritten by the next one.
pub const REMOTE_ARCHIVE_PATH: &str = "/tmp/vps_backup_temp.zip";

/// Path globs excluded from the archive. Skips pseudo-filesystems,
/// credentials and user home directories; changing this list changes
/// what a backup contains.
const EXCLUDED_PATHS: &[&str] = &[
    "dev/*",
    "proc/*",
    "sys/*",
    "tmp/*",
    "run/*",
    "mnt/*",
    "media/*",
    "lost+found/*",
    "boot/*",
    "var/log/*",
    ".cache/*",
    "home/*",
    "root/*",
    "etc/ssh/*",
    "etc/shadow*",
    "etc/passwd*",
];

fn archive_command() -> String {
    let excludes = EXCLUDED_PATHS
        .iter()
        .map(|p| format!("\"{p}\""))
        .collect::<Vec<_>>()
        .join(" ");
    format!("cd / && zip -r {REMOTE_ARCHIVE_PATH} . -x {excludes}")
}

/// Build the filesystem archive on the remote host with a single shell
/// command.
///
/// Success is decided solely by the remote exit status; `zip` itself
/// decides how tolerant it is of unreadable files.
pub fn create_archive(sess: &ssh2::Session) -> Result<(), BackupError> {
    let output = remote::exec(sess, &archive_command())?;
    if output.exit_status != 0 {
        return Err(BackupError::Archive(format!(
            "zip exited with status {}: {}",
            output.exit_status,
            output.stderr.trim()
        )));
    }
    Ok(())
}
