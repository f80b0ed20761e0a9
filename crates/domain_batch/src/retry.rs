//! Retry backoff policy
//!
//! Fixed exponential-ish schedule: 1 minute, 5 minutes, 15 minutes, 1 hour,
//! 4 hours. Attempts past the end of the table reuse the final interval.

use chrono::{DateTime, Duration, Utc};

/// Seconds until the next attempt, indexed by completed attempt count - 1
pub const RETRY_SCHEDULE_SECS: [i64; 5] = [60, 300, 900, 3600, 14_400];

/// Default attempt cap for automatic retries
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// When the next attempt may run, given the number of failed attempts so far
pub fn next_retry_time(failed_attempts: u32, last_attempt_at: DateTime<Utc>) -> DateTime<Utc> {
    let index = (failed_attempts.max(1) as usize - 1).min(RETRY_SCHEDULE_SECS.len() - 1);
    last_attempt_at + Duration::seconds(RETRY_SCHEDULE_SECS[index])
}
