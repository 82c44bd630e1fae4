//! Archive download and remote cleanup.

use crate::error::BackupError;
use crate::remote::archive::REMOTE_ARCHIVE_PATH;
use crate::remote::{connect, exec, ConnectParams};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Download the remote temporary archive to `local_path`, then delete the
/// remote copy.
///
/// The download lands in a `.part` file that is renamed into place only
/// after the copy completed, so `local_path` never names a truncated
/// archive. Remote deletion is best-effort and only logged on failure: a
/// leftover temp file is overwritten by the next cycle anyway.
pub fn fetch_and_clean(params: &ConnectParams, local_path: &Path) -> Result<(), BackupError> {
    let sess = connect(params)?;
    let part_path = staging_path(local_path);

    if let Err(e) = download(&sess, &part_path) {
        let _ = std::fs::remove_file(&part_path);
        return Err(e);
    }
    std::fs::rename(&part_path, local_path)
        .map_err(|e| BackupError::Transfer(format!("cannot move archive into place: {e}")))?;
    drop(sess);

    // Fresh session for the cleanup command.
    match connect(params).and_then(|s| exec(&s, &format!("rm {REMOTE_ARCHIVE_PATH}"))) {
        Ok(output) if output.exit_status != 0 => {
            tracing::warn!(
                status = output.exit_status,
                "Remote archive cleanup failed: {}",
                output.stderr.trim()
            );
        }
        Ok(_) => {}
        Err(e) => tracing::warn!("Remote archive cleanup failed: {e}"),
    }

    Ok(())
}

fn staging_path(local_path: &Path) -> PathBuf {
    let mut name = local_path.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}

fn download(sess: &ssh2::Session, dest: &Path) -> Result<(), BackupError> {
    let sftp = sess
        .sftp()
        .map_err(|e| BackupError::Transfer(format!("cannot open sftp channel: {e}")))?;
    let mut remote_file = sftp
        .open(Path::new(REMOTE_ARCHIVE_PATH))
        .map_err(|e| BackupError::Transfer(format!("cannot open {REMOTE_ARCHIVE_PATH}: {e}")))?;
    let mut local_file = File::create(dest)
        .map_err(|e| BackupError::Transfer(format!("cannot create {}: {e}", dest.display())))?;
    std::io::copy(&mut remote_file, &mut local_file)
        .map_err(|e| BackupError::Transfer(format!("download failed: {e}")))?;
    Ok(())
}
