//! Configuration management
//!
//! Service, checker and runner settings loaded from an optional TOML file
//! with environment overrides (`FLAGKEEPER_SECTION__KEY`).

use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Default configuration file, resolved like `config::File::with_name`.
pub const DEFAULT_CONFIG_PATH: &str = "config";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
    pub service: ServiceConfig,
    pub checker: CheckerConfig,
    pub runner: RunnerConfig,
}

/// What the DATAFAIL fault command does to the corruption flag.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataFailMode {
    /// Clears the flag, as the reference service does. Corruption stays off.
    #[default]
    Reference,
    /// Sets the flag so later PUTs store a marked copy.
    Corrupt,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServiceConfig {
    pub bind_address: String,
    pub port: u16,

    /// How long SLEEP stalls before replying
    pub sleep_delay_secs: u64,

    /// Pause before a GET reply
    pub get_delay_ms: u64,

    pub datafail_mode: DataFailMode,

    /// Appended to flags stored while corruption is on
    pub corruption_marker: String,

    /// Accepted connections waiting for the session worker
    pub queue_depth: usize,

    pub max_line_length: usize,

    /// Upper bound on one session, so a silent client cannot stall the worker
    pub session_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 4242,
            sleep_delay_secs: 10,
            get_delay_ms: 100,
            datafail_mode: DataFailMode::Reference,
            corruption_marker: "_".to_string(),
            queue_depth: 10,
            max_line_length: 1024,
            session_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CheckerConfig {
    pub connect_timeout_ms: u64,
    pub io_timeout_ms: u64,
    pub max_line_length: usize,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 5000,
            io_timeout_ms: 5000,
            max_line_length: 1024,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RunnerConfig {
    /// Wall clock allowed for one checker process
    pub timeout_secs: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

impl Settings {
    /// Load settings from `path` (missing file is fine) with environment overrides
    pub fn load(path: &str) -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("FLAGKEEPER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.service.bind_address.is_empty() {
            return Err(config::ConfigError::Message(
                "service.bind_address cannot be empty".into(),
            ));
        }

        if self.service.queue_depth == 0 {
            return Err(config::ConfigError::Message(
                "service.queue_depth must be greater than 0".into(),
            ));
        }

        if self.service.max_line_length == 0 || self.checker.max_line_length == 0 {
            return Err(config::ConfigError::Message(
                "max_line_length must be greater than 0".into(),
            ));
        }

        if self.service.session_timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "service.session_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.service.sleep_delay_secs >= self.service.session_timeout_secs {
            return Err(config::ConfigError::Message(
                "service.sleep_delay_secs must be less than service.session_timeout_secs".into(),
            ));
        }

        if self.checker.connect_timeout_ms == 0 || self.checker.io_timeout_ms == 0 {
            return Err(config::ConfigError::Message(
                "checker timeouts must be greater than 0".into(),
            ));
        }

        if self.runner.timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "runner.timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

impl ServiceConfig {
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn sleep_delay(&self) -> Duration {
        Duration::from_secs(self.sleep_delay_secs)
    }

    pub fn get_delay(&self) -> Duration {
        Duration::from_millis(self.get_delay_ms)
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_secs)
    }
}

impl CheckerConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.io_timeout_ms)
    }
}

impl RunnerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
