//! Device-level error type.
//!
//! Wraps every lower-level failure (validation, driver call, unit decode,
//! configuration) and adds the device's own: not connected, and a status
//! condition that did not reach its target in time.

use qcl_common::config::ConfigError;
use qcl_common::driver::DriverError;
use qcl_common::params::ValidationError;
use qcl_common::units::UnitError;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Status conditions the device waits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Controller link up.
    Connected,
    /// Laser armed.
    Armed,
    /// Emission on.
    Emitting,
    /// Tuning complete.
    Tuned,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Condition::Connected => "connected",
            Condition::Armed => "armed",
            Condition::Emitting => "emitting",
            Condition::Tuned => "tuned",
        })
    }
}

/// Errors returned by [`QclDevice`](crate::device::QclDevice) operations.
#[derive(Debug, Error)]
pub enum QclError {
    /// Operation requires an open connection.
    #[error("{0}: device is not connected")]
    NotConnected(&'static str),

    /// Parameters rejected before any driver call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Guarded driver call failed.
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// Condition did not reach its target within the bound.
    #[error("timed out after {timeout:?} waiting for {condition} = {target} (last seen: {last:?})")]
    WaitTimeout {
        /// Condition waited on.
        condition: Condition,
        /// Target value.
        target: bool,
        /// Last observed value, if any check completed.
        last: Option<bool>,
        /// Bound that elapsed.
        timeout: Duration,
    },

    /// Connect sequence failed; the device stays disconnected.
    #[error("connect failed: {0}")]
    ConnectFailed(#[source] Box<QclError>),

    /// Configuration problem.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Unit tag or code not recognized.
    #[error(transparent)]
    Units(#[from] UnitError),
}

impl QclError {
    /// Vendor return code behind this error, if any.
    pub fn driver_code(&self) -> Option<u32> {
        match self {
            QclError::Driver(e) => e.code(),
            QclError::ConnectFailed(inner) => inner.driver_code(),
            _ => None,
        }
    }

    /// True for both call and wait timeouts.
    pub fn is_timeout(&self) -> bool {
        match self {
            QclError::WaitTimeout { .. } | QclError::Driver(DriverError::Timeout { .. }) => true,
            QclError::ConnectFailed(inner) => inner.is_timeout(),
            _ => false,
        }
    }
}
