//! Mock [`LiveStateProvider`] implementations for testing the shard's
//! monitor loop without a live ESPN-style endpoint.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{GameState, GameStatus, Sport};
use crate::error::Result;
use crate::shard::LiveStateProvider;

/// Always answers with the same state/status, regardless of `game_id`.
pub struct StaticProvider {
    state: GameState,
    status: GameStatus,
}

impl StaticProvider {
    #[must_use]
    pub fn new(state: GameState, status: GameStatus) -> Self {
        Self { state, status }
    }
}

#[async_trait]
impl LiveStateProvider for StaticProvider {
    async fn fetch_state(&self, _game_id: &str, _sport: Sport) -> Result<GameState> {
        Ok(self.state.clone())
    }

    async fn fetch_status(&self, _game_id: &str, _sport: Sport) -> Result<GameStatus> {
        Ok(self.status)
    }
}

/// Replays a pre-loaded queue of states/statuses, one pair per poll; holds
/// the last entry once the queue drains, for tests that drive a monitor
/// loop through a specific sequence of score changes.
pub struct ScriptedProvider {
    states: Mutex<VecDeque<GameState>>,
    statuses: Mutex<VecDeque<GameStatus>>,
    last_state: Mutex<Option<GameState>>,
    last_status: Mutex<GameStatus>,
}

impl ScriptedProvider {
    #[must_use]
    pub fn new(states: Vec<GameState>, statuses: Vec<GameStatus>) -> Self {
        Self {
            states: Mutex::new(states.into()),
            statuses: Mutex::new(statuses.into()),
            last_state: Mutex::new(None),
            last_status: Mutex::new(GameStatus::InProgress),
        }
    }
}

#[async_trait]
impl LiveStateProvider for ScriptedProvider {
    async fn fetch_state(&self, _game_id: &str, _sport: Sport) -> Result<GameState> {
        let mut queue = self.states.lock().unwrap();
        let mut last = self.last_state.lock().unwrap();
        let state = queue.pop_front().or_else(|| last.clone());
        if let Some(ref s) = state {
            *last = Some(s.clone());
        }
        state.ok_or_else(|| crate::error::Error::Stale("no scripted state left".to_string()))
    }

    async fn fetch_status(&self, _game_id: &str, _sport: Sport) -> Result<GameStatus> {
        let mut queue = self.statuses.lock().unwrap();
        let mut last = self.last_status.lock().unwrap();
        let status = queue.pop_front().unwrap_or(*last);
        *last = status;
        Ok(status)
    }
}
