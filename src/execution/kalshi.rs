use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose, Engine};
use rsa::pkcs8::DecodePrivateKey;
use rsa::pss::SigningKey;
use rsa::signature::{RandomizedSigner, SignatureEncoding};
use rsa::RsaPrivateKey;
use sha2::Sha256;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::rate_limit;

/// RSA-PSS request signature over `"{unix_ms}{METHOD}{PATH}"` (§6), returned
/// alongside the timestamp used so the caller can set both headers.
fn sign(private_key_pem: &str, method: &str, path: &str) -> Result<(String, String)> {
    let timestamp_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        .to_string();
    let message = format!("{timestamp_ms}{method}{path}");

    let private_key = RsaPrivateKey::from_pkcs8_pem(private_key_pem)
        .map_err(|e| Error::Config(format!("invalid Kalshi private key: {e}")))?;
    let signing_key = SigningKey::<Sha256>::new(private_key);
    let signature = signing_key.sign_with_rng(&mut rand::thread_rng(), message.as_bytes());
    let encoded = general_purpose::STANDARD.encode(signature.to_bytes());
    Ok((timestamp_ms, encoded))
}

#[derive(Debug, Serialize)]
struct CreateOrderRequest<'a> {
    ticker: &'a str,
    client_order_id: String,
    side: &'a str,
    action: &'a str,
    #[serde(rename = "type")]
    order_type: &'a str,
    time_in_force: &'a str,
    count: i32,
    yes_price: Option<i64>,
    no_price: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct CreateOrderResponseEnvelope {
    order: CreateOrderResponse,
}

#[derive(Debug, Deserialize)]
struct CreateOrderResponse {
    order_id: String,
    status: String,
    #[serde(default)]
    filled_count: i32,
    #[serde(default)]
    yes_price: Option<i64>,
    #[serde(default)]
    no_price: Option<i64>,
}

/// Fill status as reported by Kalshi for an IOC order (§4.6: orders either
/// fill, partially fill, or cancel — they never rest).
pub struct OrderOutcome {
    pub order_id: String,
    pub filled_qty: f64,
    pub avg_price: f64,
    pub is_filled: bool,
    pub is_partial: bool,
}

/// Thin REST client for the endpoints the execution service needs (§6):
/// order placement, signed with RSA-PSS per request.
pub struct KalshiClient {
    base_url: String,
    http: reqwest::Client,
}

impl KalshiClient {
    #[must_use]
    pub fn new() -> Self {
        let base_url = std::env::var("KALSHI_API_BASE")
            .unwrap_or_else(|_| "https://api.elections.kalshi.com/trade-api/v2".to_string());
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    /// Places an IOC order (§4.6). `side` is `"yes"` or `"no"`; `action` is
    /// `"buy"` to open or `"sell"` to close a held side (§4.7 exits); `price`
    /// is the limit price in `[0,1]`, converted to whole cents on the wire.
    pub async fn place_ioc_order(
        &self,
        api_key: &str,
        private_key_pem: &str,
        ticker: &str,
        side: &str,
        action: &str,
        price: f64,
        count: i32,
        client_order_id: String,
        rate_limit_initial_backoff: Duration,
        rate_limit_max_attempts: u32,
    ) -> Result<OrderOutcome> {
        let path = "/trade-api/v2/portfolio/orders";
        let price_cents = (price * 100.0).round() as i64;
        let body = CreateOrderRequest {
            ticker,
            client_order_id: client_order_id.clone(),
            side,
            action,
            order_type: "limit",
            time_in_force: "immediate_or_cancel",
            count,
            yes_price: (side == "yes").then_some(price_cents),
            no_price: (side == "no").then_some(price_cents),
        };

        let response = rate_limit::retry_on_rate_limit(
            rate_limit_initial_backoff,
            rate_limit_max_attempts,
            || async {
                let (timestamp_ms, signature) = sign(private_key_pem, "POST", path)?;
                self.http
                    .post(format!("{}/portfolio/orders", self.base_url))
                    .header("KALSHI-ACCESS-KEY", api_key)
                    .header("KALSHI-ACCESS-TIMESTAMP", timestamp_ms)
                    .header("KALSHI-ACCESS-SIGNATURE", signature)
                    .json(&body)
                    .send()
                    .await
                    .map_err(Error::from)
            },
        )
        .await?;

        if !response.status().is_success() {
            return Err(Error::Rejected(format!(
                "kalshi order placement failed: {}",
                response.status()
            )));
        }

        let envelope: CreateOrderResponseEnvelope = response.json().await?;
        let order = envelope.order;
        let avg_price = order
            .yes_price
            .or(order.no_price)
            .map(|cents| cents as f64 / 100.0)
            .unwrap_or(price);

        Ok(OrderOutcome {
            order_id: order.order_id,
            filled_qty: f64::from(order.filled_count),
            avg_price,
            is_filled: order.status == "executed" && order.filled_count == count,
            is_partial: order.filled_count > 0 && order.filled_count < count,
        })
    }
}

impl Default for KalshiClient {
    fn default() -> Self {
        Self::new()
    }
}
