//! Flat-file configuration store.
//!
//! Settings are persisted as `KEY = "value"` lines in a plain text file.
//! Connection parameters are required and must be non-empty; the two
//! policy values fall back to defaults only when absent, and are rejected
//! outright when present but malformed or non-positive.

use crate::error::BackupError;
use std::collections::HashMap;
use std::path::Path;

/// Default name of the configuration file, resolved against the current
/// working directory.
pub const DEFAULT_CONFIG_FILE: &str = "vps-backup.conf";

const KEY_IP_ADDRESS: &str = "IP_ADDRESS";
const KEY_USERNAME: &str = "USERNAME";
const KEY_PASSWORD: &str = "PASSWORD";
const KEY_FREQUENCY: &str = "BACKUP_FREQUENCY_DAYS";
const KEY_RETENTION: &str = "RETENTION_COUNT";

const DEFAULT_FREQUENCY_DAYS: u32 = 1;
const DEFAULT_RETENTION_COUNT: usize = 5;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Address of the host to back up.
    pub ip_address: String,

    /// Account used both for SSH login and as the archive filename prefix.
    pub username: String,

    /// SSH password for `username`.
    pub password: String,

    /// Days between two scheduled backup cycles.
    pub frequency_days: u32,

    /// Maximum number of local archives kept for this host.
    pub retention_count: usize,
}

impl Settings {
    /// Load and validate settings from `path`.
    pub fn load(path: &Path) -> Result<Self, BackupError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BackupError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::parse(&content)
    }

    /// Parse the `KEY = "value"` format: `#` comments and blank lines are
    /// skipped, each remaining line splits on the first `=`, values are
    /// stripped of surrounding quotes. Unknown keys are ignored.
    pub fn parse(content: &str) -> Result<Self, BackupError> {
        let mut values: HashMap<&str, String> = HashMap::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            values.insert(key.trim(), value.to_string());
        }

        let required = |key: &str| -> Result<String, BackupError> {
            match values.get(key) {
                Some(v) if !v.is_empty() => Ok(v.clone()),
                _ => Err(BackupError::Config(format!("missing required setting {key}"))),
            }
        };

        Ok(Self {
            ip_address: required(KEY_IP_ADDRESS)?,
            username: required(KEY_USERNAME)?,
            password: required(KEY_PASSWORD)?,
            frequency_days: positive(&values, KEY_FREQUENCY, DEFAULT_FREQUENCY_DAYS)?,
            retention_count: positive(&values, KEY_RETENTION, DEFAULT_RETENTION_COUNT)?,
        })
    }

    /// Write the settings back in the same flat format.
    pub fn save(&self, path: &Path) -> Result<(), BackupError> {
        let mut out = String::from("# VPS Backup Configuration\n");
        out.push_str(&format!("{KEY_IP_ADDRESS} = \"{}\"\n", self.ip_address));
        out.push_str(&format!("{KEY_USERNAME} = \"{}\"\n", self.username));
        out.push_str(&format!("{KEY_PASSWORD} = \"{}\"\n", self.password));
        out.push_str(&format!("{KEY_FREQUENCY} = \"{}\"\n", self.frequency_days));
        out.push_str(&format!("{KEY_RETENTION} = \"{}\"\n", self.retention_count));
        std::fs::write(path, out).map_err(|e| {
            BackupError::Config(format!("cannot write {}: {e}", path.display()))
        })
    }
}

/// Policy values must be positive integers; absent keys take `default`.
fn positive<T>(values: &HashMap<&str, String>, key: &str, default: T) -> Result<T, BackupError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let Some(raw) = values.get(key) else {
        return Ok(default);
    };
    match raw.parse::<T>() {
        Ok(n) if n > T::default() => Ok(n),
        _ => Err(BackupError::Config(format!(
            "{key} must be a positive integer, got {raw:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn full_config() -> &'static str {
        r#"# VPS Backup Configuration
IP_ADDRESS = "192.0.2.10"
USERNAME = "bob"
PASSWORD = "hunter2"
BACKUP_FREQUENCY_DAYS = "3"
RETENTION_COUNT = "7"
"#
    }

    #[test]
    fn test_parse_full_config() {
        let settings = Settings::parse(full_config()).unwrap();
        assert_eq!(settings.ip_address, "192.0.2.10");
        assert_eq!(settings.username, "bob");
        assert_eq!(settings.password, "hunter2");
        assert_eq!(settings.frequency_days, 3);
        assert_eq!(settings.retention_count, 7);
    }

    #[test]
    fn test_parse_skips_comments_and_junk_lines() {
        let content = "# comment\n\nnot a setting\nIP_ADDRESS = 192.0.2.10\nUSERNAME = 'bob'\nPASSWORD = x\n";
        let settings = Settings::parse(content).unwrap();
        assert_eq!(settings.ip_address, "192.0.2.10");
        assert_eq!(settings.username, "bob");
    }

    #[test]
    fn test_parse_missing_password_fails() {
        let content = "IP_ADDRESS = \"192.0.2.10\"\nUSERNAME = \"bob\"\n";
        let err = Settings::parse(content).unwrap_err();
        assert!(matches!(err, BackupError::Config(_)));
        assert!(err.to_string().contains("PASSWORD"));
    }

    #[test]
    fn test_parse_empty_username_fails() {
        let content = "IP_ADDRESS = \"192.0.2.10\"\nUSERNAME = \"\"\nPASSWORD = \"x\"\n";
        assert!(Settings::parse(content).is_err());
    }

    #[test]
    fn test_parse_policy_defaults() {
        let content = "IP_ADDRESS = \"192.0.2.10\"\nUSERNAME = \"bob\"\nPASSWORD = \"x\"\n";
        let settings = Settings::parse(content).unwrap();
        assert_eq!(settings.frequency_days, 1);
        assert_eq!(settings.retention_count, 5);
    }

    #[test]
    fn test_parse_rejects_non_positive_policy_values() {
        for bad in ["0", "-3", "abc", ""] {
            let content = format!(
                "IP_ADDRESS = \"192.0.2.10\"\nUSERNAME = \"bob\"\nPASSWORD = \"x\"\nRETENTION_COUNT = \"{bad}\"\n"
            );
            assert!(Settings::parse(&content).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);

        let settings = Settings {
            ip_address: "192.0.2.10".into(),
            username: "bob".into(),
            password: "hunter2".into(),
            frequency_days: 2,
            retention_count: 4,
        };
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded.ip_address, settings.ip_address);
        assert_eq!(loaded.username, settings.username);
        assert_eq!(loaded.password, settings.password);
        assert_eq!(loaded.frequency_days, settings.frequency_days);
        assert_eq!(loaded.retention_count, settings.retention_count);
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let err = Settings::load(&dir.path().join("nope.conf")).unwrap_err();
        assert!(matches!(err, BackupError::Config(_)));
    }
}
