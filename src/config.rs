//! Environment configuration.
//!
//! Numeric values that fail to parse fall back to their defaults; values that
//! parse but cannot work (zero bounds, empty palette) abort startup.

use crate::services::history::MAX_HISTORY;
use crate::services::registry::default_palette;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_OUTBOX_CAPACITY: usize = 256;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("PALETTE must contain at least one color")]
    EmptyPalette,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub max_history: usize,
    pub outbox_capacity: usize,
    pub palette: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            max_history: MAX_HISTORY,
            outbox_capacity: DEFAULT_OUTBOX_CAPACITY,
            palette: default_palette(),
        }
    }
}

impl Config {
    /// Build configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a value is unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a value is unusable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let palette = match lookup("PALETTE") {
            Some(raw) => parse_palette(&raw)?,
            None => defaults.palette,
        };

        let config = Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port),
            max_history: parse_or(&lookup, "MAX_HISTORY", defaults.max_history),
            outbox_capacity: parse_or(&lookup, "OUTBOX_CAPACITY", defaults.outbox_capacity),
            palette,
        };

        if config.max_history == 0 {
            return Err(ConfigError::Zero("MAX_HISTORY"));
        }
        if config.outbox_capacity == 0 {
            return Err(ConfigError::Zero("OUTBOX_CAPACITY"));
        }
        Ok(config)
    }

    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_palette(raw: &str) -> Result<Vec<String>, ConfigError> {
    let palette: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_owned)
        .collect();
    if palette.is_empty() {
        return Err(ConfigError::EmptyPalette);
    }
    Ok(palette)
}
