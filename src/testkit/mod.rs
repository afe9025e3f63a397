//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`] — Builders for domain primitives: games, positions, prices.
//! - [`config`] — Canonical test configurations (fast timings, no env vars).
//! - [`stream`] — Mock [`LiveStateProvider`](crate::shard::LiveStateProvider)
//!   implementations: `ScriptedProvider`, `StaticProvider`.

pub mod config;
pub mod domain;
pub mod stream;
