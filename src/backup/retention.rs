//! Local archive retention.

use crate::error::BackupError;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const ARCHIVE_EXT: &str = ".zip";

/// Delete local archives beyond the retention count and return the
/// removed paths, oldest first.
///
/// Archives belong to the host when their name is `<username>_*.zip`.
/// Age comes from the filesystem creation time, falling back to the
/// modification time where the filesystem records no birth time. The
/// sort is stable, so equal timestamps keep the directory listing order:
/// stable within one run, unspecified across runs.
pub fn prune(
    dir: &Path,
    username: &str,
    retention_count: usize,
) -> Result<Vec<PathBuf>, BackupError> {
    let prefix = format!("{username}_");

    let entries = std::fs::read_dir(dir)
        .map_err(|e| BackupError::Prune(format!("cannot list {}: {e}", dir.display())))?;

    let mut archives: Vec<(PathBuf, SystemTime)> = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|e| BackupError::Prune(format!("cannot list {}: {e}", dir.display())))?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with(&prefix) || !name.ends_with(ARCHIVE_EXT) {
            continue;
        }
        // A stat failure here means the file vanished between the listing
        // and now; it no longer counts against retention.
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        let age = meta
            .created()
            .or_else(|_| meta.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        archives.push((entry.path(), age));
    }

    if archives.len() <= retention_count {
        tracing::debug!(
            count = archives.len(),
            retention_count,
            "Archive count within retention limit"
        );
        return Ok(Vec::new());
    }

    archives.sort_by_key(|(_, age)| *age);

    let excess = archives.len() - retention_count;
    let mut removed = Vec::with_capacity(excess);
    for (path, _) in archives.into_iter().take(excess) {
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!("Removed old backup: {}", path.display());
                removed.push(path);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Old backup vanished before removal: {}", path.display());
            }
            Err(e) => {
                return Err(BackupError::Prune(format!(
                    "cannot remove {}: {e}",
                    path.display()
                )))
            }
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Create an empty archive whose timestamps place it `age_secs` in the
    /// past. Files are created oldest-first so the creation order matches
    /// the timestamp order on filesystems that do record birth times.
    fn touch(dir: &Path, name: &str, age_secs: u64) -> PathBuf {
        let path = dir.join(name);
        let file = std::fs::File::create(&path).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(age_secs))
            .unwrap();
        path
    }

    #[test]
    fn test_prune_removes_exactly_the_oldest_excess() {
        let dir = TempDir::new().unwrap();
        let oldest = touch(dir.path(), "bob_01_01_2024.zip", 400);
        let older = touch(dir.path(), "bob_02_01_2024.zip", 300);
        let newer = touch(dir.path(), "bob_03_01_2024.zip", 200);
        let newest = touch(dir.path(), "bob_04_01_2024.zip", 100);

        let removed = prune(dir.path(), "bob", 2).unwrap();

        assert_eq!(removed, vec![oldest.clone(), older.clone()]);
        assert!(!oldest.exists());
        assert!(!older.exists());
        assert!(newer.exists());
        assert!(newest.exists());
    }

    #[test]
    fn test_prune_within_limit_removes_nothing() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "bob_01_01_2024.zip", 200);
        touch(dir.path(), "bob_02_01_2024.zip", 100);

        let removed = prune(dir.path(), "bob", 5).unwrap();
        assert!(removed.is_empty());
    }

    #[test]
    fn test_prune_only_touches_matching_archives() {
        let dir = TempDir::new().unwrap();
        let foreign_user = touch(dir.path(), "alice_01_01_2024.zip", 500);
        let foreign_ext = touch(dir.path(), "bob_01_01_2024.tar", 400);
        let near_prefix = touch(dir.path(), "bobby_01_01_2024.zip", 300);
        let victim = touch(dir.path(), "bob_02_01_2024.zip", 200);
        touch(dir.path(), "bob_03_01_2024.zip", 100);

        let removed = prune(dir.path(), "bob", 1).unwrap();

        assert_eq!(removed, vec![victim]);
        assert!(foreign_user.exists());
        assert!(foreign_ext.exists());
        assert!(near_prefix.exists());
    }

    #[test]
    fn test_prune_is_idempotent() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "bob_01_01_2024.zip", 300);
        touch(dir.path(), "bob_02_01_2024.zip", 200);
        touch(dir.path(), "bob_03_01_2024.zip", 100);

        assert_eq!(prune(dir.path(), "bob", 2).unwrap().len(), 1);
        assert!(prune(dir.path(), "bob", 2).unwrap().is_empty());
    }

    #[test]
    fn test_prune_missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = prune(&dir.path().join("nope"), "bob", 2).unwrap_err();
        assert!(matches!(err, BackupError::Prune(_)));
    }
}
