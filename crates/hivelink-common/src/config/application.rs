use std::path::Path;
use std::time::Duration;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

use crate::config::loader::deserialize_non_zero;
use crate::config::ConnectionConfig;
use crate::error::{CommonError, CommonResult};

const DEFAULT_CONFIG: &str = include_str!("default.toml");

/// The prefix of environment variables that override configuration.
/// A double underscore separates nested keys, e.g. `HIVELINK__CONNECTION__HOST`.
pub const CONFIG_ENV_PREFIX: &str = "HIVELINK__";

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub connection: ConnectionConfig,
    pub execution: ExecutionConfig,
    pub statement: StatementConfig,
}

impl AppConfig {
    /// Loads the configuration from the built-in defaults, an optional TOML file,
    /// and the environment, in increasing order of precedence.
    pub fn load(path: Option<&Path>) -> CommonResult<Self> {
        let mut figment = Figment::from(Toml::string(DEFAULT_CONFIG));
        if let Some(path) = path {
            if !path.is_file() {
                return Err(CommonError::invalid(format!(
                    "configuration file not found: {}",
                    path.display()
                )));
            }
            figment = figment.admerge(Toml::file(path));
        }
        figment
            .admerge(Env::prefixed(CONFIG_ENV_PREFIX).map(|p| p.as_str().replace("__", ".").into()))
            .extract()
            .map_err(|e| CommonError::InvalidArgument(e.to_string()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionConfig {
    /// The number of rows requested per fetch round trip.
    pub fetch_size: usize,
    #[serde(deserialize_with = "deserialize_non_zero")]
    pub query_timeout_secs: Option<u64>,
    pub poll_interval_ms: u64,
}

impl ExecutionConfig {
    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_secs.map(Duration::from_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            fetch_size: 1000,
            query_timeout_secs: None,
            poll_interval_ms: 100,
        }
    }
}

/// Checks applied to caller input before statements are built.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StatementConfig {
    pub validate_names: bool,
    pub reject_unsafe_literals: bool,
}

impl Default for StatementConfig {
    fn default() -> Self {
        Self {
            validate_names: true,
            reject_unsafe_literals: true,
        }
    }
}
