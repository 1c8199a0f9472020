//! Exponential publish-retry backoff.
//!
//! The retry state itself (attempt count, next attempt time) lives on the
//! outbox row so restarts don't reset it; this module is only the pure delay
//! policy.

use std::time::Duration;

/// First retry delay in seconds.
pub const BASE_DELAY_SECS: u64 = 5;

/// Backoff ceiling in seconds.
pub const MAX_DELAY_SECS: u64 = 300;

/// Delay before the next publish attempt: `min(base * 2^attempts, cap)`.
pub fn next_delay(attempts: u32) -> Duration {
    let exp = attempts.min(16);
    let secs = BASE_DELAY_SECS
        .saturating_mul(1u64 << exp)
        .min(MAX_DELAY_SECS);
    Duration::from_secs(secs)
}
