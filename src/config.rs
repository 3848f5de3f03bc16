//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;

/// Default recommendation backend address.
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

/// Default port for the wizard REST surface.
pub const DEFAULT_PORT: u16 = 8080;

/// Default location of the snapshot database.
pub const DEFAULT_DB_PATH: &str = "./data/swipesense.db";

/// Sentinel DB path that selects the in-memory store.
pub const MEMORY_DB_PATH: &str = ":memory:";

/// Fixed request fields sent alongside the merchant.
///
/// Not yet derived from the profile; kept configurable until real inputs exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDefaults {
    pub is_student: bool,
    pub priority: String,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            is_student: true,
            priority: "cashback".to_string(),
        }
    }
}

/// Application configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Recommendation backend base address, without a trailing slash.
    pub api_base: String,
    /// Port the wizard REST surface listens on.
    pub port: u16,
    /// Snapshot database path (`:memory:` keeps state in-process only).
    pub db_path: String,
    pub request_defaults: RequestDefaults,
    /// Optional per-request timeout for backend calls. None waits indefinitely.
    pub request_timeout: Option<Duration>,
    /// Whether to run the stdin REPL alongside the server.
    pub repl: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            port: DEFAULT_PORT,
            db_path: DEFAULT_DB_PATH.to_string(),
            request_defaults: RequestDefaults::default(),
            request_timeout: None,
            repl: true,
        }
    }
}

impl AppConfig {
    /// Build config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup (used by tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_base = lookup("SWIPESENSE_API_BASE")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.api_base);

        let port = match lookup("SWIPESENSE_PORT") {
            Some(raw) => parse_value::<u16>("SWIPESENSE_PORT", &raw)?,
            None => defaults.port,
        };

        let db_path = lookup("SWIPESENSE_DB_PATH")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.db_path);

        let is_student = match lookup("SWIPESENSE_IS_STUDENT") {
            Some(raw) => parse_bool("SWIPESENSE_IS_STUDENT", &raw)?,
            None => defaults.request_defaults.is_student,
        };

        let priority = lookup("SWIPESENSE_PRIORITY")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.request_defaults.priority);

        let request_timeout = match lookup("SWIPESENSE_REQUEST_TIMEOUT_SECS") {
            Some(raw) => Some(Duration::from_secs(parse_value::<u64>(
                "SWIPESENSE_REQUEST_TIMEOUT_SECS",
                &raw,
            )?)),
            None => None,
        };

        let repl = match lookup("SWIPESENSE_REPL") {
            Some(raw) => parse_bool("SWIPESENSE_REPL", &raw)?,
            None => defaults.repl,
        };

        Ok(Self {
            api_base,
            port,
            db_path,
            request_defaults: RequestDefaults {
                is_student,
                priority,
            },
            request_timeout,
            repl,
        })
    }

    /// Whether snapshots should live in memory only.
    pub fn uses_memory_store(&self) -> bool {
        self.db_path == MEMORY_DB_PATH
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a boolean, got '{other}'"),
        }),
    }
}
