//! Handler for the `status` subcommand. Each `run` invocation writes a
//! small liveness file (PID + timestamps); `status` reads it back and
//! cross-checks the PID is still alive, since a crashed process leaves a
//! stale file behind rather than cleaning up after itself.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;
use tracing::warn;

use crate::cli::StatusArgs;
use crate::cli::output;
use crate::error::Result;

/// Components a fresh `status_dir` is scanned for when no `--component`
/// filter is given.
const KNOWN_COMPONENTS: &[&str] =
    &["orchestrator", "shard", "signal_processor", "execution", "position_tracker", "observer"];

/// How long a status file can go unrefreshed before it's considered stale
/// even if the PID happens to still be alive (e.g. reused by an unrelated
/// process after a crash).
const STALE_AFTER: Duration = Duration::minutes(2);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusFile {
    pub component: String,
    pub pid: u32,
    pub paper_trading: bool,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StatusFile {
    fn new(component: &str, paper_trading: bool) -> Self {
        let now = Utc::now();
        Self { component: component.to_string(), pid: std::process::id(), paper_trading, started_at: now, updated_at: now }
    }
}

fn status_path(status_dir: &Path, component: &str) -> PathBuf {
    status_dir.join(format!("{component}.json"))
}

/// Spawns a task that writes the status file on startup and refreshes its
/// `updated_at` timestamp every 30 seconds for as long as the process runs.
/// Errors are logged, not propagated: a missing status file degrades
/// `edgelord status` output, it doesn't affect trading.
pub fn spawn_writer(path: PathBuf, component: String, paper_trading: bool) {
    tokio::spawn(async move {
        let mut file = StatusFile::new(&component, paper_trading);
        loop {
            if let Err(e) = write_file(&path, &file) {
                warn!(error = %e, path = %path.display(), "failed to write status file");
            }
            tokio::time::sleep(std::time::Duration::from_secs(30)).await;
            file.updated_at = Utc::now();
        }
    });
}

fn write_file(path: &Path, status: &StatusFile) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_string_pretty(status)?;
    std::fs::write(path, body)?;
    Ok(())
}

fn is_pid_alive(pid: u32) -> bool {
    // kill(pid, 0) sends no signal, it only checks the PID exists.
    let result = unsafe { libc::kill(pid as i32, 0) };
    result == 0 || std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

fn format_uptime(started_at: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(started_at);
    let total_minutes = duration.num_minutes();
    if total_minutes < 0 {
        return "just started".to_string();
    }
    let days = duration.num_days();
    let hours = duration.num_hours() % 24;
    let minutes = total_minutes % 60;
    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

#[derive(Tabled)]
struct StatusRow {
    component: String,
    status: String,
    pid: String,
    uptime: String,
    mode: String,
}

fn read_row(status_dir: &Path, component: &str) -> StatusRow {
    let path = status_path(status_dir, component);
    match std::fs::read_to_string(&path).ok().and_then(|s| serde_json::from_str::<StatusFile>(&s).ok()) {
        Some(status) if is_pid_alive(status.pid) && Utc::now() - status.updated_at < STALE_AFTER => StatusRow {
            component: component.to_string(),
            status: "running".to_string(),
            pid: status.pid.to_string(),
            uptime: format_uptime(status.started_at),
            mode: if status.paper_trading { "paper".to_string() } else { "live".to_string() },
        },
        Some(_) => StatusRow {
            component: component.to_string(),
            status: "stale".to_string(),
            pid: "-".to_string(),
            uptime: "-".to_string(),
            mode: "-".to_string(),
        },
        None => StatusRow {
            component: component.to_string(),
            status: "stopped".to_string(),
            pid: "-".to_string(),
            uptime: "-".to_string(),
            mode: "-".to_string(),
        },
    }
}

/// Executes the `status` subcommand: one row if `--component` was given,
/// otherwise every known component.
pub fn execute(args: &StatusArgs) {
    let components: Vec<&str> = match &args.component {
        Some(name) => vec![name.as_str()],
        None => KNOWN_COMPONENTS.to_vec(),
    };
    let rows: Vec<StatusRow> = components.iter().map(|c| read_row(&args.status_dir, c)).collect();

    output::section("Component status");
    let table = tabled::Table::new(rows);
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_uptime_minutes_only() {
        let started_at = Utc::now() - Duration::minutes(45);
        assert_eq!(format_uptime(started_at), "45m");
    }

    #[test]
    fn format_uptime_hours_and_minutes() {
        let started_at = Utc::now() - Duration::hours(3) - Duration::minutes(22);
        assert_eq!(format_uptime(started_at), "3h 22m");
    }

    #[test]
    fn format_uptime_days_hours_minutes() {
        let started_at = Utc::now() - Duration::days(2) - Duration::hours(5) - Duration::minutes(10);
        assert_eq!(format_uptime(started_at), "2d 5h 10m");
    }

    #[test]
    fn format_uptime_future_start_is_just_started() {
        let started_at = Utc::now() + Duration::minutes(5);
        assert_eq!(format_uptime(started_at), "just started");
    }

    #[test]
    fn current_process_pid_is_alive() {
        assert!(is_pid_alive(std::process::id()));
    }

    #[test]
    fn implausible_pid_is_not_alive() {
        assert!(!is_pid_alive(999_999_999));
    }

    #[test]
    fn missing_status_file_reports_stopped() {
        let dir = tempfile::tempdir().unwrap();
        let row = read_row(dir.path(), "orchestrator");
        assert_eq!(row.status, "stopped");
    }

    #[test]
    fn fresh_status_file_reports_running() {
        let dir = tempfile::tempdir().unwrap();
        let status = StatusFile::new("orchestrator", true);
        write_file(&status_path(dir.path(), "orchestrator"), &status).unwrap();
        let row = read_row(dir.path(), "orchestrator");
        assert_eq!(row.status, "running");
        assert_eq!(row.mode, "paper");
    }
}
