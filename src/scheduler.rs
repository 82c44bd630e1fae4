//! Fixed-cadence scheduling of backup cycles.
//!
//! A single cooperative loop: poll on a fixed granularity, trigger a
//! cycle once the configured number of days has elapsed, and block on
//! that cycle before re-evaluating, so cycles never overlap.
//! Cancellation is honored at the polling boundary only, never
//! mid-cycle.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Maximum wait between two schedule checks.
pub const POLL_INTERVAL: Duration = Duration::from_secs(3600);

/// True once `interval_days` whole days have elapsed since `last_trigger`.
fn is_due(last_trigger: DateTime<Utc>, now: DateTime<Utc>, interval_days: u32) -> bool {
    now - last_trigger >= chrono::Duration::days(interval_days as i64)
}

/// Drive `cycle` every `interval_days`, polling every `poll`, until
/// `cancel` fires.
///
/// `last_trigger` seeds the schedule: passing the current time means the
/// first cycle runs one full interval after startup. The trigger time
/// advances on every attempt, successful or not; a failed cycle simply
/// waits for the next scheduled run.
pub async fn run_scheduler<F, Fut>(
    interval_days: u32,
    poll: Duration,
    mut last_trigger: DateTime<Utc>,
    cancel: CancellationToken,
    mut cycle: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let mut ticker = tokio::time::interval(poll);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let now = Utc::now();
                if !is_due(last_trigger, now, interval_days) {
                    continue;
                }
                last_trigger = now;
                if cycle().await {
                    tracing::info!("Scheduled backup completed");
                } else {
                    tracing::warn!("Scheduled backup failed, waiting for next scheduled run");
                }
            }
        }
    }
    tracing::info!("Scheduler stopped");
}
