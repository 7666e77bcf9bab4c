/*
[INPUT]:  Rate-limit response headers and the configured default backoff
[OUTPUT]: Backoff duration and a suspend primitive that can be swapped in tests
[POS]:    HTTP layer - rate-limit backoff
[UPDATE]: When changing backoff computation or the sleep mechanism
*/

use std::time::Duration;

use async_trait::async_trait;

use super::headers::HeaderMap;

/// Header announcing seconds until the rate-limit window resets
pub const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";

/// Suspends the calling task between rate-limited attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer; dropping the future cancels the wait
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Backoff before retrying a 429: integer part of the reset header + 1s.
///
/// A missing, empty or `"0"` header uses the default. Any other value counts,
/// so a non-numeric one reads as 0 and waits 1s.
pub fn rate_limit_backoff(headers: &HeaderMap, default: Duration) -> Duration {
    match headers.get(RATE_LIMIT_RESET_HEADER).map(|value| value.first()) {
        Some(value) if !value.is_empty() && value != "0" => {
            Duration::from_secs(integer_prefix(value).saturating_add(1))
        }
        _ => default,
    }
}

/// Leading integer of the value, e.g. `"2.5"` -> 2; negatives and junk read as 0
fn integer_prefix(value: &str) -> u64 {
    let digits: String = value
        .trim_start()
        .trim_start_matches('+')
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}
