use serde::{Deserialize, Serialize};

use super::env;
use crate::error::Result;

/// Venue credentials, §6. Never logged or serialized into audit rows.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub kalshi_api_key: Option<String>,
    pub kalshi_private_key: Option<String>,
    pub polymarket_private_key: Option<String>,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            kalshi_api_key: None,
            kalshi_private_key: None,
            polymarket_private_key: None,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("kalshi_api_key", &self.kalshi_api_key.as_ref().map(|_| "<redacted>"))
            .field("kalshi_private_key", &self.kalshi_private_key.as_ref().map(|_| "<redacted>"))
            .field(
                "polymarket_private_key",
                &self.polymarket_private_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            kalshi_api_key: std::env::var("KALSHI_API_KEY").ok(),
            kalshi_private_key: std::env::var("KALSHI_PRIVATE_KEY").ok(),
            polymarket_private_key: std::env::var("POLYMARKET_PRIVATE_KEY").ok(),
        })
    }

    /// Fails fast, §7, if live (non-paper) trading was requested without the
    /// credentials it needs.
    pub fn require_kalshi(&self) -> Result<(&str, &str)> {
        let key = self
            .kalshi_api_key
            .as_deref()
            .ok_or_else(|| crate::Error::Config("missing KALSHI_API_KEY".to_string()))?;
        let secret = self
            .kalshi_private_key
            .as_deref()
            .ok_or_else(|| crate::Error::Config("missing KALSHI_PRIVATE_KEY".to_string()))?;
        Ok((key, secret))
    }
}
