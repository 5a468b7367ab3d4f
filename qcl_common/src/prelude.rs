//! Prelude module for common re-exports.
//!
//! Consumers can do `use qcl_common::prelude::*;` and get the most
//! important types without listing individual paths.

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{
    ConfigError, ConfigLoader, DriverSection, InstrumentConfig, SharedConfig, TimingConfig,
};

// ─── Instrument Constants ───────────────────────────────────────────
pub use crate::consts::{QCL_CHANNELS, QCL_CHANNEL_COUNT, QCL_CURRENT_LIMITS_MA};

// ─── Driver Contract ────────────────────────────────────────────────
pub use crate::driver::{
    ApiVersion, DriverError, DriverFactory, EntryPoint, QclDriver, Response, ScanReading,
    SweepScanArgs, WwReading,
};

// ─── Parameters and Units ───────────────────────────────────────────
pub use crate::params::{QclParams, SweepScanRequest, ValidationError, validate_qcl_params};
pub use crate::units::{Unit, UnitError, WwPair};
