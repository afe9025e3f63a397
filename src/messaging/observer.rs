use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{streams, HotBus, Received, StreamStore};

/// Mirrors every hot-plane message into a named stream with publisher
/// sequence + timestamps, for replay/analytics (§4.1). Advisory: downstream
/// correctness never depends on the observer being alive.
pub struct Observer {
    bus: HotBus,
    store: StreamStore,
    last_seq: DashMap<(String, String), u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ObserverEntry {
    topic: String,
    payload: serde_json::Value,
    publisher_seq: u64,
    publish_ts: DateTime<Utc>,
    receive_ts: DateTime<Utc>,
    source: String,
}

impl Observer {
    #[must_use]
    pub fn new(bus: HotBus, store: StreamStore) -> Self {
        Self {
            bus,
            store,
            last_seq: DashMap::new(),
        }
    }

    /// Runs forever, mirroring every hot-plane topic into its category
    /// stream. Intended to be spawned as its own task/process.
    pub async fn run(self) {
        let mut rx = self.bus.subscribe::<serde_json::Value>("*");
        while let Some(received) = rx.recv().await {
            self.detect_gap(&received);
            let (key, maxlen) = Self::stream_for_topic(&received.topic);
            let entry = ObserverEntry {
                topic: received.topic.clone(),
                payload: received.payload,
                publisher_seq: received.publisher_seq,
                publish_ts: received.publish_ts,
                receive_ts: received.receive_ts,
                source: String::new(),
            };
            if let Err(e) = self.store.append(key, maxlen, &entry).await {
                warn!(topic = %received.topic, error = %e, "observer failed to mirror message");
            }
        }
    }

    fn detect_gap(&self, received: &Received<serde_json::Value>) {
        let source = received
            .payload
            .get("source")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();
        let key = (source, received.topic.clone());
        if let Some(prev) = self.last_seq.get(&key) {
            if received.publisher_seq > *prev + 1 {
                warn!(
                    topic = %key.1,
                    source = %key.0,
                    expected = *prev + 1,
                    got = received.publisher_seq,
                    "sequence gap detected on hot plane"
                );
            }
        }
        self.last_seq.insert(key, received.publisher_seq);
    }

    fn stream_for_topic(topic: &str) -> (&'static str, usize) {
        if topic.starts_with("prices.kalshi") {
            streams::PRICES_KALSHI
        } else if topic.starts_with("prices.polymarket") {
            streams::PRICES_POLYMARKET
        } else if topic.starts_with("signals.") {
            streams::SIGNALS
        } else if topic.starts_with("execution.") {
            streams::EXECUTIONS
        } else if topic.starts_with("trades.") {
            streams::TRADES
        } else if topic.starts_with("games.") {
            streams::GAMES
        } else {
            ("stream:misc", 5_000)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_routing_matches_topic_prefixes() {
        assert_eq!(Observer::stream_for_topic("prices.kalshi.LAL").0, "stream:prices:kalshi");
        assert_eq!(Observer::stream_for_topic("signals.trade").0, "stream:signals");
        assert_eq!(Observer::stream_for_topic("execution.request.r1").0, "stream:executions");
        assert_eq!(Observer::stream_for_topic("games.nba.g1").0, "stream:games");
        assert_eq!(Observer::stream_for_topic("health:heartbeats").0, "stream:misc");
    }
}
