use std::env;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Reads a required variable, failing fast with `Error::Config` (§7 fatal
/// error class) rather than panicking.
pub fn required(key: &str) -> Result<String> {
    env::var(key).map_err(|_| Error::Config(format!("missing required environment variable {key}")))
}

/// Reads an optional variable, parsing it or falling back to `default`.
/// A present-but-unparseable value is still a config error, not a silent
/// fallback.
pub fn optional<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| Error::Config(format!("invalid value for {key}: {raw:?}"))),
        Err(_) => Ok(default),
    }
}

pub fn optional_bool(key: &str, default: bool) -> Result<bool> {
    match env::var(key) {
        Ok(raw) => match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(Error::Config(format!("invalid boolean for {key}: {raw:?}"))),
        },
        Err(_) => Ok(default),
    }
}

pub fn optional_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
