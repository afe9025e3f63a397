use crate::error::{Error, Result};

/// Polymarket order placement (§9 Open Question (c)): CLOB signing, nonce
/// derivation, and wallet management are a venue-integration concern left
/// unspecified upstream of this core, so the client is implemented up to
/// the point of order construction and then rejects cleanly.
pub struct PolymarketClient;

impl PolymarketClient {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    pub async fn place_ioc_order(&self) -> Result<()> {
        if cfg!(feature = "polymarket-live") {
            Err(Error::Rejected(
                "Polymarket CLOB order signing is not implemented".to_string(),
            ))
        } else {
            Err(Error::Rejected(
                "Polymarket live trading not enabled (build with --features polymarket-live)"
                    .to_string(),
            ))
        }
    }
}

impl Default for PolymarketClient {
    fn default() -> Self {
        Self::new()
    }
}
