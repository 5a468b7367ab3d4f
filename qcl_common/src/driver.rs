//! Instrument driver trait and error types.
//!
//! This module defines:
//! - `QclDriver` trait - The narrow call contract to the vendor driver
//! - `EntryPoint` enum - Names of the driver entry points
//! - `Response<T>` - Raw outcome of one entry point (return code + outputs)
//! - `DriverError` enum - Uniform failure of a guarded driver call
//! - `DriverFactory` type alias - Factory function type

use crate::codes::{self, RET_SUCCESS};
use crate::config::ConfigError;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Driver entry points, named after the vendor SDK functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryPoint {
    /// SDK version query.
    GetApiVersion,
    /// Open the session with the controller.
    Initialize,
    /// Close the session.
    DeInitialize,
    /// Connection check.
    IsConnectedToLaser,
    /// Installed QCL count.
    GetNumInstalledQcls,
    /// Interlock check.
    IsInterlockedStatusSet,
    /// Key switch check.
    IsKeySwitchStatusSet,
    /// Arm request.
    ArmLaser,
    /// Disarm request.
    DisarmLaser,
    /// Armed check.
    IsLaserArmed,
    /// Tune request.
    TuneToWw,
    /// Tuned check.
    IsTuned,
    /// Current wavelength / wavenumber.
    GetActualWw,
    /// Emission on request.
    TurnEmissionOn,
    /// Emission off request.
    TurnEmissionOff,
    /// Emission check.
    IsEmissionOn,
    /// Per-channel pulse rate.
    GetQclPulseRate,
    /// Per-channel pulse width.
    GetQclPulseWidth,
    /// Per-channel drive current.
    GetQclCurrent,
    /// Per-channel parameter write.
    SetQclParams,
    /// Sweep scan start.
    StartSweepScan,
    /// Stop the running scan.
    StopScanInProgress,
    /// Pause the running scan.
    PauseScanInProgress,
    /// Resume a paused scan.
    ResumeScanInProgress,
    /// Multi-output scan status query.
    GetScanStatus,
}

impl EntryPoint {
    /// SDK function name.
    pub const fn as_str(self) -> &'static str {
        match self {
            EntryPoint::GetApiVersion => "GetAPIVersion",
            EntryPoint::Initialize => "Initialize",
            EntryPoint::DeInitialize => "DeInitialize",
            EntryPoint::IsConnectedToLaser => "IsConnectedToLaser",
            EntryPoint::GetNumInstalledQcls => "GetNumInstalledQcls",
            EntryPoint::IsInterlockedStatusSet => "IsInterlockedStatusSet",
            EntryPoint::IsKeySwitchStatusSet => "IsKeySwitchStatusSet",
            EntryPoint::ArmLaser => "ArmLaser",
            EntryPoint::DisarmLaser => "DisarmLaser",
            EntryPoint::IsLaserArmed => "IsLaserArmed",
            EntryPoint::TuneToWw => "TuneToWW",
            EntryPoint::IsTuned => "IsTuned",
            EntryPoint::GetActualWw => "GetActualWW",
            EntryPoint::TurnEmissionOn => "TurnEmissionOn",
            EntryPoint::TurnEmissionOff => "TurnEmissionOff",
            EntryPoint::IsEmissionOn => "IsEmissionOn",
            EntryPoint::GetQclPulseRate => "GetQCLPulseRate",
            EntryPoint::GetQclPulseWidth => "GetQCLPulseWidth",
            EntryPoint::GetQclCurrent => "GetQCLCurrent",
            EntryPoint::SetQclParams => "SetQCLParams",
            EntryPoint::StartSweepScan => "StartSweepScan",
            EntryPoint::StopScanInProgress => "StopScanInProgress",
            EntryPoint::PauseScanInProgress => "PauseScanInProgress",
            EntryPoint::ResumeScanInProgress => "ResumeScanInProgress",
            EntryPoint::GetScanStatus => "GetScanStatus",
        }
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error types for guarded driver calls.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DriverError {
    /// The call did not return within its bound. It may still complete.
    #[error("{entry} did not return within {timeout:?}")]
    Timeout {
        /// Entry point that was called.
        entry: EntryPoint,
        /// Bound that elapsed.
        timeout: Duration,
    },

    /// The driver returned a non-success code.
    #[error("{entry} failed with code {code}: {message}")]
    Code {
        /// Entry point that was called.
        entry: EntryPoint,
        /// Raw return code.
        code: u32,
        /// Message from the return code table.
        message: &'static str,
    },

    /// The worker ended without delivering a result (driver panicked).
    #[error("{0} worker exited without a result")]
    WorkerLost(EntryPoint),

    /// The worker thread could not be started.
    #[error("failed to spawn driver worker: {0}")]
    Spawn(String),

    /// A zero timeout was requested.
    #[error("{0} requires a non-zero timeout")]
    InvalidTimeout(EntryPoint),

    /// The driver reported a unit code outside the known set.
    #[error("{entry} reported unknown unit code {code}")]
    UnknownUnits {
        /// Entry point that was called.
        entry: EntryPoint,
        /// Raw unit code.
        code: u8,
    },
}

impl DriverError {
    /// Build a `Code` error with its table message.
    pub const fn from_code(entry: EntryPoint, code: u32) -> Self {
        DriverError::Code {
            entry,
            code,
            message: codes::describe(code),
        }
    }

    /// Raw return code, if the driver produced one.
    pub const fn code(&self) -> Option<u32> {
        match self {
            DriverError::Code { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Entry point the error came from, if known.
    pub const fn entry(&self) -> Option<EntryPoint> {
        match self {
            DriverError::Timeout { entry, .. }
            | DriverError::Code { entry, .. }
            | DriverError::UnknownUnits { entry, .. } => Some(*entry),
            DriverError::WorkerLost(entry) | DriverError::InvalidTimeout(entry) => Some(*entry),
            DriverError::Spawn(_) => None,
        }
    }
}

/// Raw outcome of one driver entry point.
///
/// Mirrors the C calling convention: a return code plus output values.
/// Output values are meaningless unless `code == RET_SUCCESS`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Response<T> {
    /// Vendor return code.
    pub code: u32,
    /// Output values.
    pub value: T,
}

impl<T> Response<T> {
    /// Successful response.
    #[inline]
    pub const fn ok(value: T) -> Self {
        Self {
            code: RET_SUCCESS,
            value,
        }
    }

    /// True if the code is `RET_SUCCESS`.
    #[inline]
    pub const fn is_success(&self) -> bool {
        self.code == RET_SUCCESS
    }

    /// Map the outcome to a result: success yields the outputs, any other
    /// code a [`DriverError::Code`] with its table message.
    pub fn into_result(self, entry: EntryPoint) -> Result<T, DriverError> {
        if self.is_success() {
            Ok(self.value)
        } else {
            Err(DriverError::from_code(entry, self.code))
        }
    }
}

impl<T: Default> Response<T> {
    /// Failed response with default outputs.
    #[inline]
    pub fn error(code: u32) -> Self {
        Self {
            code,
            value: T::default(),
        }
    }
}

/// SDK version triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApiVersion {
    /// Major version.
    pub major: u16,
    /// Minor version.
    pub minor: u16,
    /// Patch version.
    pub patch: u16,
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Outputs of the actual-wavelength query.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WwReading {
    /// Current position in `units`.
    pub value: f32,
    /// SDK unit code (1 = µm, 2 = cm⁻¹).
    pub units: u8,
    /// Whether emitted light is valid.
    pub light_valid: bool,
}

/// Outputs of the scan status query.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScanReading {
    /// A scan has been started and not finished.
    pub in_progress: bool,
    /// The scan is actively sweeping.
    pub active: bool,
    /// The scan is paused.
    pub paused: bool,
    /// Current repetition (1-based).
    pub repetition: u16,
    /// Percent complete within the current repetition.
    pub percent: u16,
    /// Current position in `units`.
    pub current_ww: f32,
    /// SDK unit code of `current_ww`.
    pub units: u8,
    /// TEC settling in progress.
    pub tec_in_progress: bool,
    /// Tuning motion in progress.
    pub motion_in_progress: bool,
}

/// Pre-marshaled sweep scan arguments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepScanArgs {
    /// Start position.
    pub start: f32,
    /// End position.
    pub end: f32,
    /// Sweep speed.
    pub speed: f32,
    /// SDK unit code.
    pub units: u8,
    /// Repetitions.
    pub repetitions: u16,
    /// Sweep back and forth.
    pub bidirectional: bool,
}

/// Factory function type for creating driver instances from their
/// `[driver.settings]` table.
pub type DriverFactory = fn(&toml::Table) -> Result<Box<dyn QclDriver>, ConfigError>;

/// Call contract of the vendor driver.
///
/// Every method is one SDK entry point: it blocks until the controller
/// answers and returns the raw return code plus outputs. Methods take
/// `&self` because each call runs on its own worker thread; drivers keep
/// their mutable state behind a lock.
///
/// # Timing
///
/// Calls may block for an unbounded time. Callers bound them through the
/// device adapter; a call that exceeds its bound keeps running.
pub trait QclDriver: Send + Sync {
    /// Returns the driver's unique identifier (e.g., "simulation").
    fn name(&self) -> &'static str;

    /// Returns the driver's semantic version.
    fn version(&self) -> &'static str;

    /// SDK version.
    fn api_version(&self) -> Response<ApiVersion>;

    /// Open the session. Completion is observed via `is_connected`.
    fn initialize(&self) -> Response<()>;

    /// Close the session.
    fn deinitialize(&self) -> Response<()>;

    /// Whether the controller link is up.
    fn is_connected(&self) -> Response<bool>;

    /// Number of installed QCLs (0..=4).
    fn num_installed_qcls(&self) -> Response<u8>;

    /// Interlock status.
    fn is_interlock_set(&self) -> Response<bool>;

    /// Key switch status.
    fn is_key_switch_set(&self) -> Response<bool>;

    /// Start arming. Completion is observed via `is_laser_armed`.
    fn arm_laser(&self) -> Response<()>;

    /// Start disarming.
    fn disarm_laser(&self) -> Response<()>;

    /// Armed status.
    fn is_laser_armed(&self) -> Response<bool>;

    /// Start tuning to `target` in `units`, preferring QCL `preferred_qcl`.
    fn tune_to_ww(&self, target: f32, units: u8, preferred_qcl: u8) -> Response<()>;

    /// Tuned status.
    fn is_tuned(&self) -> Response<bool>;

    /// Current position.
    fn actual_ww(&self) -> Response<WwReading>;

    /// Turn emission on.
    fn turn_emission_on(&self) -> Response<()>;

    /// Turn emission off.
    fn turn_emission_off(&self) -> Response<()>;

    /// Emission status.
    fn is_emission_on(&self) -> Response<bool>;

    /// Pulse rate of channel `qcl` (Hz).
    fn qcl_pulse_rate(&self, qcl: u8) -> Response<f32>;

    /// Pulse width of channel `qcl` (µs).
    fn qcl_pulse_width(&self, qcl: u8) -> Response<f32>;

    /// Drive current of channel `qcl` (mA).
    fn qcl_current(&self, qcl: u8) -> Response<f32>;

    /// Write channel parameters.
    fn set_qcl_params(
        &self,
        qcl: u8,
        pulse_rate: f32,
        pulse_width: f32,
        current: f32,
    ) -> Response<()>;

    /// Start a sweep scan. Progress is observed via `scan_status`.
    fn start_sweep_scan(&self, args: SweepScanArgs) -> Response<()>;

    /// Stop the scan in progress.
    fn stop_scan(&self) -> Response<()>;

    /// Pause the scan in progress.
    fn pause_scan(&self) -> Response<()>;

    /// Resume a paused scan.
    fn resume_scan(&self) -> Response<()>;

    /// Scan status.
    fn scan_status(&self) -> Response<ScanReading>;
}
