use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, EnvFilter};

use super::env;
use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: if is_tty() { LogFormat::Pretty } else { LogFormat::Json },
        }
    }
}

fn is_tty() -> bool {
    use std::io::IsTerminal;
    std::io::stdout().is_terminal()
}

impl LoggingConfig {
    pub fn from_env() -> Result<Self> {
        let filter = env::optional_string("RUST_LOG", "info");
        let format = match std::env::var("LOG_FORMAT") {
            Ok(raw) if raw.eq_ignore_ascii_case("json") => LogFormat::Json,
            Ok(raw) if raw.eq_ignore_ascii_case("pretty") => LogFormat::Pretty,
            _ => {
                if is_tty() {
                    LogFormat::Pretty
                } else {
                    LogFormat::Json
                }
            }
        };
        Ok(Self { filter, format })
    }

    /// Installs the global subscriber. Call once per process entrypoint.
    pub fn init(&self) {
        let env_filter = EnvFilter::try_new(&self.filter).unwrap_or_else(|_| EnvFilter::new("info"));
        match self.format {
            LogFormat::Json => {
                fmt().with_env_filter(env_filter).json().with_target(true).init();
            }
            LogFormat::Pretty => {
                fmt().with_env_filter(env_filter).with_target(false).init();
            }
        }
    }
}
