use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("message bus error: {0}")]
    Bus(#[from] redis::RedisError),

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// A decision that terminates a request without being a bug: rejected signal,
    /// rejected execution, venue error surfaced to the caller as a typed reason.
    #[error("rejected: {0}")]
    Rejected(String),

    /// Retry budget for a rate-limited (HTTP 429) venue call was exhausted.
    /// Distinct from `Rejected` so callers can skip tripping the circuit
    /// breaker on repeated 429s (§7/§8: rate limiting never opens a circuit).
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Per-venue circuit breaker is open; caller should fail fast, not retry.
    #[error("circuit open: {0}")]
    CircuitOpen(String),

    /// Data is present but too old to act on (price/game-state staleness).
    #[error("stale: {0}")]
    Stale(String),

    /// Optimistic-concurrency conflict that exhausted its retry budget.
    #[error("conflict: {0}")]
    Conflict(String),
}

pub type Result<T> = std::result::Result<T, Error>;
