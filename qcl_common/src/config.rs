//! Configuration loading traits and types.
//!
//! Instrument configuration lives in a single TOML file. Every section has
//! defaults, so an empty file yields a working simulation setup.
//!
//! # Usage
//!
//! ```rust,no_run
//! use qcl_common::config::{ConfigError, ConfigLoader, InstrumentConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = InstrumentConfig::load(Path::new("instrument.toml"))?;
//!     config.validate()?;
//!     println!("Driver: {}", config.driver.name);
//!     Ok(())
//! }
//! ```

use crate::consts::{
    DEFAULT_ARM_TIMEOUT, DEFAULT_CALL_TIMEOUT, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_DISARM_TIMEOUT, DEFAULT_DISCONNECT_TIMEOUT, DEFAULT_EMISSION_TIMEOUT,
    DEFAULT_POLL_INTERVAL, DEFAULT_TUNE_TIMEOUT, QCL_CHANNELS, QCL_SERVICE_NAME,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// No driver registered under the configured name.
    #[error("Unknown driver '{0}'")]
    UnknownDriver(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

fn default_service_name() -> String {
    QCL_SERVICE_NAME.to_string()
}

/// Common configuration fields.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "qcl-bench-01"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: default_service_name(),
        }
    }
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_driver_name() -> String {
    "simulation".to_string()
}

const fn default_preferred_qcl() -> u8 {
    1
}

/// Driver selection.
///
/// ```toml
/// [driver]
/// name = "simulation"
/// preferred_qcl = 2
///
/// [driver.settings]
/// qcl_count = 4
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverSection {
    /// Registered driver name.
    #[serde(default = "default_driver_name")]
    pub name: String,

    /// QCL the controller should prefer when tuning.
    #[serde(default = "default_preferred_qcl")]
    pub preferred_qcl: u8,

    /// Driver-specific settings, handed to the factory unparsed.
    #[serde(default)]
    pub settings: toml::Table,
}

impl Default for DriverSection {
    fn default() -> Self {
        Self {
            name: default_driver_name(),
            preferred_qcl: default_preferred_qcl(),
            settings: toml::Table::new(),
        }
    }
}

/// Call and wait bounds, written in seconds.
///
/// ```toml
/// [timing]
/// call_timeout_s = 5.0
/// poll_interval_s = 0.5
/// tune_timeout_s = 30.0
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Bound for each guarded driver call.
    #[serde(rename = "call_timeout_s", with = "secs")]
    pub call_timeout: Duration,
    /// Sleep between condition checks.
    #[serde(rename = "poll_interval_s", with = "secs")]
    pub poll_interval: Duration,
    /// Wait for the connection to come up.
    #[serde(rename = "connect_timeout_s", with = "secs")]
    pub connect_timeout: Duration,
    /// Wait for the connection to go down.
    #[serde(rename = "disconnect_timeout_s", with = "secs")]
    pub disconnect_timeout: Duration,
    /// Wait for the armed flag.
    #[serde(rename = "arm_timeout_s", with = "secs")]
    pub arm_timeout: Duration,
    /// Wait for the armed flag to clear.
    #[serde(rename = "disarm_timeout_s", with = "secs")]
    pub disarm_timeout: Duration,
    /// Wait for emission on/off.
    #[serde(rename = "emission_timeout_s", with = "secs")]
    pub emission_timeout: Duration,
    /// Wait for the tuned flag.
    #[serde(rename = "tune_timeout_s", with = "secs")]
    pub tune_timeout: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            call_timeout: DEFAULT_CALL_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            disconnect_timeout: DEFAULT_DISCONNECT_TIMEOUT,
            arm_timeout: DEFAULT_ARM_TIMEOUT,
            disarm_timeout: DEFAULT_DISARM_TIMEOUT,
            emission_timeout: DEFAULT_EMISSION_TIMEOUT,
            tune_timeout: DEFAULT_TUNE_TIMEOUT,
        }
    }
}

impl TimingConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if any bound is zero or the
    /// poll interval is not shorter than every wait.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let waits = [
            ("call_timeout_s", self.call_timeout),
            ("connect_timeout_s", self.connect_timeout),
            ("disconnect_timeout_s", self.disconnect_timeout),
            ("arm_timeout_s", self.arm_timeout),
            ("disarm_timeout_s", self.disarm_timeout),
            ("emission_timeout_s", self.emission_timeout),
            ("tune_timeout_s", self.tune_timeout),
        ];
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "poll_interval_s must be positive".to_string(),
            ));
        }
        for (name, value) in waits {
            if value.is_zero() {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be positive"
                )));
            }
            if name != "call_timeout_s" && self.poll_interval >= value {
                return Err(ConfigError::ValidationError(format!(
                    "poll_interval_s must be shorter than {name}"
                )));
            }
        }
        Ok(())
    }
}

/// Instrument configuration (`instrument.toml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    /// Common fields.
    #[serde(default)]
    pub shared: SharedConfig,
    /// Driver selection.
    #[serde(default)]
    pub driver: DriverSection,
    /// Call and wait bounds.
    #[serde(default)]
    pub timing: TimingConfig,
}

impl InstrumentConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        if self.driver.name.is_empty() {
            return Err(ConfigError::ValidationError(
                "driver.name cannot be empty".to_string(),
            ));
        }
        if !QCL_CHANNELS.contains(&self.driver.preferred_qcl) {
            return Err(ConfigError::ValidationError(format!(
                "driver.preferred_qcl {} must be one of 1, 2, 3, 4",
                self.driver.preferred_qcl
            )));
        }
        self.timing.validate()
    }
}

/// Serde adapter for `Duration` written as fractional seconds.
pub mod secs {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    /// Write a duration as seconds.
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    /// Read seconds; rejects negative, zero and non-finite values.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        if !(raw.is_finite() && raw > 0.0) {
            return Err(D::Error::custom(format!(
                "expected a positive number of seconds, got {raw}"
            )));
        }
        Duration::try_from_secs_f64(raw).map_err(D::Error::custom)
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_default() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
        assert_eq!(LogLevel::Warn.as_filter(), "warn");
    }

    #[test]
    fn test_log_level_deserialization() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct TestWrapper {
            level: LogLevel,
        }

        for (text, level) in [
            ("trace", LogLevel::Trace),
            ("debug", LogLevel::Debug),
            ("info", LogLevel::Info),
            ("warn", LogLevel::Warn),
            ("error", LogLevel::Error),
        ] {
            let parsed = TestWrapper::from_toml_str(&format!("level = \"{text}\"")).unwrap();
            assert_eq!(parsed.level, level);
        }
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = InstrumentConfig::from_toml_str("").unwrap();
        assert_eq!(config, InstrumentConfig::default());
        assert_eq!(config.driver.name, "simulation");
        assert_eq!(config.driver.preferred_qcl, 1);
        assert_eq!(config.timing.tune_timeout, Duration::from_secs(30));
        assert_eq!(config.timing.poll_interval, Duration::from_millis(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timing_reads_fractional_seconds() {
        let config = InstrumentConfig::from_toml_str(
            r#"
[timing]
poll_interval_s = 0.1
arm_timeout_s = 2.5
tune_timeout_s = 45
"#,
        )
        .unwrap();
        assert_eq!(config.timing.poll_interval, Duration::from_millis(100));
        assert_eq!(config.timing.arm_timeout, Duration::from_millis(2500));
        assert_eq!(config.timing.tune_timeout, Duration::from_secs(45));
        assert_eq!(config.timing.call_timeout, DEFAULT_CALL_TIMEOUT);
    }

    #[test]
    fn test_non_positive_seconds_are_parse_errors() {
        for bad in ["0", "-1.0", "nan", "inf"] {
            let text = format!("[timing]\ncall_timeout_s = {bad}\n");
            let result = InstrumentConfig::from_toml_str(&text);
            assert!(
                matches!(result, Err(ConfigError::ParseError(_))),
                "{bad} accepted"
            );
        }
    }

    #[test]
    fn test_poll_interval_must_be_shorter_than_waits() {
        let mut config = InstrumentConfig::default();
        config.timing.poll_interval = Duration::from_secs(15);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(msg) if msg.contains("poll_interval_s")));
    }

    #[test]
    fn test_preferred_qcl_is_a_channel() {
        let mut config = InstrumentConfig::default();
        config.driver.preferred_qcl = 5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_shared_config_validation_empty_service_name() {
        let config = SharedConfig {
            log_level: LogLevel::Info,
            service_name: "".to_string(),
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_driver_settings_are_kept_verbatim() {
        let config = InstrumentConfig::from_toml_str(
            r#"
[driver]
name = "simulation"

[driver.settings]
qcl_count = 2
tune_delay_s = 0.2
"#,
        )
        .unwrap();
        assert_eq!(
            config.driver.settings.get("qcl_count"),
            Some(&toml::Value::Integer(2))
        );
    }

    #[test]
    fn test_timing_serializes_as_seconds() {
        let text = toml::to_string(&TimingConfig::default()).unwrap();
        assert!(text.contains("tune_timeout_s = 30.0"));
        let back: TimingConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, TimingConfig::default());
    }
}
