use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{Error, Result};

/// True if `response` carries an HTTP 429. Kept as a free function so
/// callers that already consumed the body can still classify a cached
/// status code.
#[must_use]
pub fn is_rate_limited(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS
}

/// Retries `op` on HTTP 429 with exponential backoff starting at
/// `initial_backoff`, doubling each attempt, up to `max_attempts` (§4.6).
/// These retries never touch the circuit breaker: only a non-429, non-2xx
/// response is a circuit failure.
pub async fn retry_on_rate_limit<F, Fut>(
    initial_backoff: Duration,
    max_attempts: u32,
    mut op: F,
) -> Result<reqwest::Response>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<reqwest::Response>>,
{
    let mut backoff = initial_backoff;
    let mut attempt = 0;
    loop {
        let response = op().await?;
        if !is_rate_limited(response.status()) {
            return Ok(response);
        }
        attempt += 1;
        if attempt >= max_attempts {
            return Err(Error::RateLimited(format!(
                "rate limited after {attempt} attempts"
            )));
        }
        warn!(attempt, backoff_secs = backoff.as_secs(), "venue rate limited, backing off");
        tokio::time::sleep(backoff).await;
        backoff *= 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_429_as_rate_limited() {
        assert!(is_rate_limited(reqwest::StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_rate_limited(reqwest::StatusCode::OK));
        assert!(!is_rate_limited(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
    }
}
