//! QCL channel parameters and safety bounds.
//!
//! Validation is pure and runs before any hardware-mutating call. Checks
//! run in a fixed order and the first violation is reported:
//!
//! 1. channel ∈ {1, 2, 3, 4}
//! 2. pulse rate ∈ [10, 100000] Hz
//! 3. pulse width ∈ [0, 100] µs
//! 4. duty cycle ∈ [0, 5] %
//! 5. current ∈ [0, limit(channel)] mA
//!
//! Non-finite inputs fail the range check they belong to.

use crate::consts::{
    DUTY_CYCLE_MAX_PERCENT, PULSE_RATE_MAX_HZ, PULSE_RATE_MIN_HZ, PULSE_WIDTH_MAX_US,
    PULSE_WIDTH_MIN_US, QCL_CHANNEL_COUNT, QCL_CURRENT_LIMITS_MA,
};
use crate::units::Unit;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parameter bound violations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Channel outside 1..=4.
    #[error("invalid QCL channel {0}: must be one of 1, 2, 3, 4")]
    InvalidChannel(u8),

    /// Pulse rate outside [10, 100000] Hz.
    #[error("pulse rate {0} Hz out of range [10, 100000]")]
    RateOutOfRange(f64),

    /// Pulse width outside [0, 100] µs.
    #[error("pulse width {0} µs out of range [0, 100]")]
    WidthOutOfRange(f64),

    /// Duty cycle outside [0, 5] %.
    #[error("duty cycle {0:.3}% out of range [0, 5]")]
    DutyCycleOutOfRange(f64),

    /// Drive current outside [0, limit] mA.
    #[error("current {current} mA out of range [0, {max}] for channel {channel}")]
    CurrentOutOfRange {
        /// Channel the current was requested for.
        channel: u8,
        /// Requested current (mA).
        current: f64,
        /// Channel limit (mA).
        max: f64,
    },

    /// Sweep scan repetition count below 1.
    #[error("scan repetitions must be at least 1, got {0}")]
    RepetitionsOutOfRange(u16),

    /// Sweep scan position or speed is NaN or infinite.
    #[error("scan {field} must be finite, got {value}")]
    NotFinite {
        /// Offending request field.
        field: &'static str,
        /// Value supplied.
        value: f64,
    },

    /// Sweep scan speed not positive.
    #[error("scan speed must be positive, got {0}")]
    SpeedOutOfRange(f64),
}

/// Duty cycle in percent for a pulse rate (Hz) and width (µs).
///
/// `rate × width × 1e-6` is the on-fraction; ×100 gives percent.
#[inline]
pub fn duty_cycle_percent(pulse_rate_hz: f64, pulse_width_us: f64) -> f64 {
    pulse_rate_hz * pulse_width_us / 10_000.0
}

/// Current limit (mA) for a 1-based channel.
pub fn current_limit_ma(channel: u8) -> Option<f64> {
    channel_index(channel).ok().map(|idx| QCL_CURRENT_LIMITS_MA[idx])
}

/// Zero-based table index for a 1-based channel.
pub fn channel_index(channel: u8) -> Result<usize, ValidationError> {
    let idx = usize::from(channel);
    if (1..=QCL_CHANNEL_COUNT).contains(&idx) {
        Ok(idx - 1)
    } else {
        Err(ValidationError::InvalidChannel(channel))
    }
}

fn in_range(value: f64, lo: f64, hi: f64) -> bool {
    (lo..=hi).contains(&value)
}

/// Check a full parameter set against the safety bounds.
pub fn validate_qcl_params(
    channel: u8,
    pulse_rate_hz: f64,
    pulse_width_us: f64,
    current_ma: f64,
) -> Result<(), ValidationError> {
    let idx = channel_index(channel)?;

    if !in_range(pulse_rate_hz, PULSE_RATE_MIN_HZ, PULSE_RATE_MAX_HZ) {
        return Err(ValidationError::RateOutOfRange(pulse_rate_hz));
    }

    if !in_range(pulse_width_us, PULSE_WIDTH_MIN_US, PULSE_WIDTH_MAX_US) {
        return Err(ValidationError::WidthOutOfRange(pulse_width_us));
    }

    let duty = duty_cycle_percent(pulse_rate_hz, pulse_width_us);
    if !in_range(duty, 0.0, DUTY_CYCLE_MAX_PERCENT) {
        return Err(ValidationError::DutyCycleOutOfRange(duty));
    }

    let max = QCL_CURRENT_LIMITS_MA[idx];
    if !in_range(current_ma, 0.0, max) {
        return Err(ValidationError::CurrentOutOfRange {
            channel,
            current: current_ma,
            max,
        });
    }

    Ok(())
}

/// Electrical parameters of one QCL channel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QclParams {
    /// 1-based channel.
    pub channel: u8,
    /// Pulse repetition rate (Hz).
    pub pulse_rate_hz: f64,
    /// Pulse width (µs).
    pub pulse_width_us: f64,
    /// Drive current (mA).
    pub current_ma: f64,
}

impl QclParams {
    /// Duty cycle in percent.
    #[inline]
    pub fn duty_cycle_percent(&self) -> f64 {
        duty_cycle_percent(self.pulse_rate_hz, self.pulse_width_us)
    }

    /// Check against the safety bounds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_qcl_params(
            self.channel,
            self.pulse_rate_hz,
            self.pulse_width_us,
            self.current_ma,
        )
    }
}

/// Parameters for starting a sweep scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepScanRequest {
    /// Unit of `start`, `end` and `speed`.
    pub unit: Unit,
    /// Start position.
    pub start: f64,
    /// End position.
    pub end: f64,
    /// Sweep speed (unit per second).
    pub speed: f64,
    /// Number of repetitions (≥ 1).
    pub repetitions: u16,
    /// Sweep back and forth.
    pub bidirectional: bool,
}

impl SweepScanRequest {
    /// Check the request before it is sent to the driver.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [("start", self.start), ("end", self.end), ("speed", self.speed)] {
            if !value.is_finite() {
                return Err(ValidationError::NotFinite { field, value });
            }
        }
        if self.speed <= 0.0 {
            return Err(ValidationError::SpeedOutOfRange(self.speed));
        }
        if self.repetitions < 1 {
            return Err(ValidationError::RepetitionsOutOfRange(self.repetitions));
        }
        Ok(())
    }
}
