//! edgelord - live cross-market sports prediction trading pipeline.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── domain/            # Pure data model (§3)
//! ├── messaging/          # Hot plane pub/sub + observer/stream plane (§4.1)
//! ├── store/              # Relational + time-series access (§3, §6)
//! ├── discovery/          # Team matching + market-id lookup RPC (§4.2)
//! ├── orchestrator/       # Game discovery, shard assignment, supervision (§4.3)
//! ├── shard/              # Per-game monitors: win probability, edge, signals (§4.4)
//! ├── signal_processor/   # Pre-trade filters, risk checks, Kelly sizing (§4.5)
//! ├── execution/          # IOC orders, circuit breaker, paper trading (§4.6)
//! ├── position_tracker/   # Entries, exits, settlement, bankroll CAS (§4.7)
//! └── cli/                # Multi-subcommand entrypoint
//! ```
//!
//! Each subsystem is reachable from this library; `main.rs` is a thin `clap`
//! dispatcher that runs exactly one of them per process (see `cli::run`).
//!
//! # Features
//!
//! - `testkit` - expose fixture builders for use from `tests/`
//! - `polymarket-live` - enable Polymarket order signing (unimplemented upstream of signing)

pub mod config;
pub mod discovery;
pub mod domain;
pub mod error;
pub mod execution;
pub mod messaging;
pub mod orchestrator;
pub mod position_tracker;
pub mod shard;
pub mod signal_processor;
pub mod store;

pub mod cli;

#[cfg(feature = "testkit")]
pub mod testkit;

pub use error::{Error, Result};
