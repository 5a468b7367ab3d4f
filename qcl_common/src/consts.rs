//! Instrument-wide constants for the QCL workspace.
//!
//! Single source of truth for channel counts, calibration limits and
//! default timing. Imported by all crates; no duplication permitted.

use static_assertions::const_assert;
use std::time::Duration;

/// Canonical service name (used for logging and the default config).
pub const QCL_SERVICE_NAME: &str = "qcl";

/// Number of QCL channels an instrument head can carry.
pub const QCL_CHANNEL_COUNT: usize = 4;

/// Valid channel indices, in read order.
pub const QCL_CHANNELS: [u8; QCL_CHANNEL_COUNT] = [1, 2, 3, 4];

/// Per-channel drive current maxima in mA (channels 1..4).
///
/// Estimated from the factory defaults plus 10 %.
pub const QCL_CURRENT_LIMITS_MA: [f64; QCL_CHANNEL_COUNT] = [800.0, 820.0, 630.0, 950.0];

/// Minimum pulse repetition rate (Hz).
pub const PULSE_RATE_MIN_HZ: f64 = 10.0;

/// Maximum pulse repetition rate (Hz).
pub const PULSE_RATE_MAX_HZ: f64 = 100_000.0;

/// Minimum pulse width (µs).
pub const PULSE_WIDTH_MIN_US: f64 = 0.0;

/// Maximum pulse width (µs).
pub const PULSE_WIDTH_MAX_US: f64 = 100.0;

/// Maximum duty cycle in percent.
pub const DUTY_CYCLE_MAX_PERCENT: f64 = 5.0;

/// Wavelength (µm) × wavenumber (cm⁻¹) product.
pub const WW_CONVERSION_FACTOR: f64 = 1.0e4;

/// Default bound for a single guarded driver call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Default status polling interval for condition waits.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default wait for the driver to report a connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default wait for the driver to report the connection closed.
pub const DEFAULT_DISCONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default wait for arming (TEC stabilization is slow).
pub const DEFAULT_ARM_TIMEOUT: Duration = Duration::from_secs(20);

/// Default wait for disarming.
pub const DEFAULT_DISARM_TIMEOUT: Duration = Duration::from_secs(10);

/// Default wait for emission on/off.
pub const DEFAULT_EMISSION_TIMEOUT: Duration = Duration::from_secs(10);

/// Default wait for mechanical retuning (longest bound).
pub const DEFAULT_TUNE_TIMEOUT: Duration = Duration::from_secs(30);

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/qcl/instrument.toml";

const_assert!(QCL_CHANNEL_COUNT == QCL_CHANNELS.len());
const_assert!(QCL_CHANNEL_COUNT == QCL_CURRENT_LIMITS_MA.len());
const_assert!(PULSE_RATE_MIN_HZ > 0.0);
const_assert!(PULSE_RATE_MIN_HZ < PULSE_RATE_MAX_HZ);
const_assert!(PULSE_WIDTH_MIN_US < PULSE_WIDTH_MAX_US);
