//! Command-line interface definitions. `main.rs` parses a [`Cli`] and hands
//! it straight to [`run::execute`] (for `run`), [`check::execute`] or
//! [`status::execute`]; each subsystem process is a separate invocation of
//! this binary (§5: "one process per subsystem instance").

pub mod banner;
pub mod check;
pub mod output;
pub mod run;
pub mod status;

use clap::{Parser, Subcommand};

/// Cross-market live sports prediction trading pipeline.
#[derive(Parser, Debug)]
#[command(name = "edgelord")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Override the tracing filter (e.g. "info", "edgelord=debug")
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Force JSON log output regardless of TTY detection
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one subsystem component in the foreground
    Run(RunArgs),
    /// Validate configuration and connectivity without starting a component
    Check,
    /// Report whether a previously started component is still running
    Status(StatusArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Skip the startup banner
    #[arg(long)]
    pub no_banner: bool,

    /// Where to write the liveness status file consumed by `status`
    #[arg(long)]
    pub status_file: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub component: Component,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Component {
    /// Game discovery, shard assignment, and health supervision (§4.3)
    Orchestrator {
        /// Comma-separated sport codes to track, e.g. "NFL,NBA,NHL,MLB"
        #[arg(long, default_value = "NFL,NBA,NHL,MLB")]
        sports: String,
        /// Base URL for the ESPN-style scoreboard schedule provider
        #[arg(long, default_value = "https://site.api.espn.com/apis/site/v2/sports")]
        schedule_base_url: String,
    },
    /// Per-game monitor host: win probability, edge detection, signals (§4.4)
    Shard {
        /// Unique id for this shard instance, used in heartbeats and commands
        #[arg(long)]
        shard_id: String,
        /// Maximum number of games this shard instance will host concurrently
        #[arg(long, default_value_t = 50)]
        max_games: usize,
        /// Base URL for the ESPN-style live-state scoreboard client
        #[arg(long, default_value = "https://site.api.espn.com/apis/site/v2/sports")]
        live_state_base_url: String,
    },
    /// Pre-trade filters, risk checks, and Kelly sizing (§4.5)
    SignalProcessor,
    /// Venue order placement and circuit breaking (§4.6)
    Execution,
    /// Entries, exits, settlement, and bankroll updates (§4.7)
    PositionTracker,
    /// Mirrors the hot plane into the append-only stream store (§4.1, advisory)
    Observer,
}

impl Component {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Component::Orchestrator { .. } => "orchestrator",
            Component::Shard { .. } => "shard",
            Component::SignalProcessor => "signal_processor",
            Component::Execution => "execution",
            Component::PositionTracker => "position_tracker",
            Component::Observer => "observer",
        }
    }
}

/// Arguments for the `status` subcommand.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Component whose status file to read; omit to show all known components
    #[arg(long)]
    pub component: Option<String>,
    /// Directory `run` writes status files into
    #[arg(long, default_value = "/var/run/edgelord")]
    pub status_dir: std::path::PathBuf,
}
