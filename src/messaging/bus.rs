use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, warn};

use super::{Envelope, Received};
use crate::error::Result;

/// Hot-plane pub/sub over a Redis-compatible backend (§4.1). One `HotBus`
/// per process; publishing assigns a monotonic per-process sequence number,
/// matching the "publisher-assigned monotonic per-socket sequence" contract.
#[derive(Clone)]
pub struct HotBus {
    client: redis::Client,
    manager: redis::aio::ConnectionManager,
    source: Arc<str>,
    seq: Arc<AtomicU64>,
}

impl HotBus {
    pub async fn connect(redis_url: &str, source: impl Into<Arc<str>>) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let manager = client.get_connection_manager().await?;
        Ok(Self {
            client,
            manager,
            source: source.into(),
            seq: Arc::new(AtomicU64::new(0)),
        })
    }

    pub async fn publish<T: Serialize>(&self, topic: &str, payload: &T) -> Result<()> {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let envelope = Envelope::new(payload, seq, &*self.source);
        let body = serde_json::to_string(&envelope)?;
        let mut conn = self.manager.clone();
        let _: () = conn.publish(topic, body).await?;
        Ok(())
    }

    /// Subscribe to a topic pattern, returning a stream of deserialized
    /// messages. Reconnects with exponential backoff (50 -> 100 -> 200ms,
    /// capped, §5 shared-resource policy) on connection loss; the caller
    /// sees only the message stream, not the reconnect churn.
    pub fn subscribe<T>(
        &self,
        pattern: impl Into<String>,
    ) -> tokio::sync::mpsc::Receiver<Received<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let (tx, rx) = tokio::sync::mpsc::channel(1024);
        let client = self.client.clone();
        let pattern = pattern.into();
        tokio::spawn(async move {
            let mut backoff_ms = 50u64;
            loop {
                match Self::subscribe_once(&client, &pattern, &tx).await {
                    Ok(()) => {
                        // Channel closed by receiver; stop reconnecting.
                        return;
                    }
                    Err(e) => {
                        warn!(pattern = %pattern, error = %e, backoff_ms, "hot bus subscription dropped, reconnecting");
                        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                        backoff_ms = (backoff_ms * 2).min(200);
                    }
                }
            }
        });
        rx
    }

    async fn subscribe_once<T>(
        client: &redis::Client,
        pattern: &str,
        tx: &tokio::sync::mpsc::Sender<Received<T>>,
    ) -> Result<()>
    where
        T: DeserializeOwned,
    {
        let conn = client.get_async_connection().await?;
        let mut pubsub = conn.into_pubsub();
        pubsub.psubscribe(pattern).await?;
        let mut stream = pubsub.on_message();
        while let Some(msg) = stream.next().await {
            let topic: String = msg.get_channel_name().to_string();
            let raw: String = match msg.get_payload() {
                Ok(p) => p,
                Err(e) => {
                    debug!(topic = %topic, error = %e, "non-utf8 hot bus payload, skipping");
                    continue;
                }
            };
            match serde_json::from_str::<Envelope<T>>(&raw) {
                Ok(envelope) => {
                    let received = Received {
                        topic,
                        payload: envelope.payload,
                        publisher_seq: envelope.publisher_seq,
                        publish_ts: envelope.publish_ts,
                        receive_ts: chrono::Utc::now(),
                    };
                    if tx.send(received).await.is_err() {
                        return Ok(());
                    }
                }
                Err(e) => {
                    error!(topic = %topic, error = %e, "failed to parse hot bus envelope");
                }
            }
        }
        // Stream ended without an explicit error (server closed connection).
        Err(crate::Error::Bus(redis::RedisError::from((
            redis::ErrorKind::IoError,
            "pubsub stream ended",
        ))))
    }
}
