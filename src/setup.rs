//! Interactive configuration capture and display.

use crate::config::Settings;
use crate::error::BackupError;
use std::io::{self, Write};
use std::path::Path;

/// Prompt for a full set of connection and policy settings and persist
/// them to `path`. Numeric answers are re-prompted until positive.
pub fn setup_configuration(path: &Path) -> Result<Settings, BackupError> {
    println!("Setting up VPS backup configuration...");

    // The password is read from the terminal in the clear.
    let ip_address = prompt_nonempty("Enter VPS IP address: ")?;
    let username = prompt_nonempty("Enter VPS username: ")?;
    let password = prompt_nonempty("Enter VPS password: ")?;
    let frequency_days = prompt_positive("Backup every how many days? ")? as u32;
    let retention_count = prompt_positive("How many backup files to keep? ")? as usize;

    let settings = Settings {
        ip_address,
        username,
        password,
        frequency_days,
        retention_count,
    };
    settings.save(path)?;
    println!("Configuration saved to {}", path.display());
    Ok(settings)
}

/// Print the stored settings. The password is never displayed.
pub fn display_configuration(settings: &Settings) {
    println!("VPS IP Address: {}", settings.ip_address);
    println!("Username: {}", settings.username);
    println!("Backup Frequency: {} day(s)", settings.frequency_days);
    println!("Retention Count: {} file(s)", settings.retention_count);
}

fn prompt(message: &str) -> Result<String, BackupError> {
    print!("{message}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn prompt_nonempty(message: &str) -> Result<String, BackupError> {
    loop {
        let answer = prompt(message)?;
        if !answer.is_empty() {
            return Ok(answer);
        }
        println!("A value is required.");
    }
}

fn prompt_positive(message: &str) -> Result<i64, BackupError> {
    loop {
        match prompt(message)?.parse::<i64>() {
            Ok(n) if n > 0 => return Ok(n),
            _ => println!("Please enter a positive number."),
        }
    }
}
