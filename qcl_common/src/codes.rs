//! Vendor SDK return codes.
//!
//! Every driver entry point returns one of these codes. `RET_SUCCESS` is
//! the only success value; everything else is mapped to a fixed message by
//! [`describe`]. Codes outside the table describe as [`UNKNOWN_ERROR`].

/// Success.
pub const RET_SUCCESS: u32 = 0;

// ─── Communication and transport ────────────────────────────────────
/// Requested transport is not supported.
pub const RET_UNSUPPORTED_TRANSPORT: u32 = 1;

// ─── Initialization ─────────────────────────────────────────────────
/// Controller initialization failed.
pub const RET_INITIALIZATION_FAILURE: u32 = 32;

// ─── Operation failures ─────────────────────────────────────────────
/// Arm or disarm request failed.
pub const RET_ARMDISARM_FAILURE: u32 = 64;
/// Tune request could not be started.
pub const RET_STARTTUNE_FAILURE: u32 = 65;
/// Interlock or key switch not set.
pub const RET_INTERLOCKS_KEYSWITCH_NOTSET: u32 = 66;
/// Stop scan failed.
pub const RET_STOP_SCAN_FAILURE: u32 = 67;
/// Pause scan failed.
pub const RET_PAUSE_SCAN_FAILURE: u32 = 68;
/// Resume scan failed.
pub const RET_RESUME_SCAN_FAILURE: u32 = 69;
/// Manual scan step failed.
pub const RET_MANUAL_STEP_SCAN_FAILURE: u32 = 70;
/// Sweep scan could not be started.
pub const RET_START_SWEEPSCAN_FAILURE: u32 = 71;
/// Step-and-measure scan could not be started.
pub const RET_START_STEPMEASURESCAN_FAILURE: u32 = 72;
/// Index out of bounds.
pub const RET_INDEX_OUTOFBOUNDS: u32 = 73;
/// Multi-spectral scan could not be started.
pub const RET_START_MULTISPECTRALSCAN_FAILURE: u32 = 74;
/// Too many elements.
pub const RET_TOO_MANY_ELEMENTS: u32 = 75;
/// Not enough elements.
pub const RET_NOT_ENOUGH_ELEMENTS: u32 = 76;
/// Output buffer too small.
pub const RET_BUFFER_TOO_SMALL: u32 = 77;
/// Favorite name not recognized.
pub const RET_FAVORITE_NAME_NOTRECOGNIZED: u32 = 78;
/// Favorite recall failed.
pub const RET_FAVORITE_RECALL_FAILURE: u32 = 79;
/// Requested wavelength outside the tuning range.
pub const RET_WW_OUTOFTUNINGRANGE: u32 = 80;
/// No scan in progress.
pub const RET_NO_SCAN_INPROGRESS: u32 = 81;
/// Emission could not be turned on.
pub const RET_EMISSION_ON_FAILURE: u32 = 82;
/// Emission already off.
pub const RET_EMISSION_ALREADY_OFF: u32 = 83;
/// Emission could not be turned off.
pub const RET_EMISSION_OFF_FAILURE: u32 = 84;
/// Emission already on.
pub const RET_EMISSION_ALREADY_ON: u32 = 85;
/// Pulse rate out of range.
pub const RET_PULSERATE_OUTOFRANGE: u32 = 86;
/// Pulse width out of range.
pub const RET_PULSEWIDTH_OUTOFRANGE: u32 = 87;
/// Current out of range.
pub const RET_CURRENT_OUTOFRANGE: u32 = 88;
/// Settings could not be saved.
pub const RET_SAVE_SETTINGS_FAILURE: u32 = 89;
/// QCL number out of range.
pub const RET_QCL_NUM_OUTOFRANGE: u32 = 90;
/// Laser already armed.
pub const RET_LASER_ALREADY_ARMED: u32 = 91;
/// Laser already disarmed.
pub const RET_LASER_ALREADY_DISARMED: u32 = 92;
/// Laser not armed.
pub const RET_LASER_NOT_ARMED: u32 = 93;
/// Laser not tuned.
pub const RET_LASER_NOT_TUNED: u32 = 94;
/// TECs not at set temperature.
pub const RET_TECS_NOT_AT_SET_TEMPERATURE: u32 = 95;
/// CW mode not allowed on this QCL.
pub const RET_CW_NOT_ALLOWED_ON_QCL: u32 = 96;
/// Invalid laser mode.
pub const RET_INVALID_LASER_MODE: u32 = 97;
/// Temperature out of range.
pub const RET_TEMPERATURE_OUT_OF_RANGE: u32 = 98;
/// Laser power-off error.
pub const RET_LASER_POWER_OFF_ERROR: u32 = 99;

// ─── Session ────────────────────────────────────────────────────────
/// Communication error with the controller.
pub const RET_COMM_ERROR: u32 = 100;
/// SDK not initialized (no session).
pub const RET_NOT_INITIALIZED: u32 = 101;
/// SDK instance already created.
pub const RET_ALREADY_CREATED: u32 = 102;
/// Advanced sweep scan could not be started.
pub const RET_START_SWEEP_ADVANCED_SCAN_FAILURE: u32 = 103;
/// Process trigger injection failed.
pub const RET_INJECT_PROC_TRIG_ERROR: u32 = 104;

/// Message for codes outside the table.
pub const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// Human-readable message for a return code.
pub const fn describe(code: u32) -> &'static str {
    match code {
        RET_SUCCESS => "Success.",
        RET_UNSUPPORTED_TRANSPORT => "Unsupported transport type.",
        RET_INITIALIZATION_FAILURE => "Initialization failure.",
        RET_ARMDISARM_FAILURE => "Failed to arm/disarm the laser.",
        RET_STARTTUNE_FAILURE => "Failed to start tuning.",
        RET_INTERLOCKS_KEYSWITCH_NOTSET => "Interlocks or key switch not set.",
        RET_STOP_SCAN_FAILURE => "Failed to stop the scan.",
        RET_PAUSE_SCAN_FAILURE => "Failed to pause the scan.",
        RET_RESUME_SCAN_FAILURE => "Failed to resume the scan.",
        RET_MANUAL_STEP_SCAN_FAILURE => "Failed to manually step scan.",
        RET_START_SWEEPSCAN_FAILURE => "Failed to start sweep scan.",
        RET_START_STEPMEASURESCAN_FAILURE => "Failed to start step-measure scan.",
        RET_INDEX_OUTOFBOUNDS => "Index out of bounds.",
        RET_START_MULTISPECTRALSCAN_FAILURE => "Failed to start multi-spectral scan.",
        RET_TOO_MANY_ELEMENTS => "Too many elements specified.",
        RET_NOT_ENOUGH_ELEMENTS => "Not enough elements specified.",
        RET_BUFFER_TOO_SMALL => "Buffer too small.",
        RET_FAVORITE_NAME_NOTRECOGNIZED => "Favorite name not recognized.",
        RET_FAVORITE_RECALL_FAILURE => "Failed to recall favorite.",
        RET_WW_OUTOFTUNINGRANGE => "Wavelength out of tuning range.",
        RET_NO_SCAN_INPROGRESS => "No scan in progress.",
        RET_EMISSION_ON_FAILURE => "Failed to turn emission on.",
        RET_EMISSION_ALREADY_OFF => "Emission already off.",
        RET_EMISSION_OFF_FAILURE => "Failed to turn emission off.",
        RET_EMISSION_ALREADY_ON => "Emission already on.",
        RET_PULSERATE_OUTOFRANGE => "Pulse rate out of range.",
        RET_PULSEWIDTH_OUTOFRANGE => "Pulse width out of range.",
        RET_CURRENT_OUTOFRANGE => "Current out of range.",
        RET_SAVE_SETTINGS_FAILURE => "Failed to save settings.",
        RET_QCL_NUM_OUTOFRANGE => "QCL number out of range.",
        RET_LASER_ALREADY_ARMED => "Laser already armed.",
        RET_LASER_ALREADY_DISARMED => "Laser already disarmed.",
        RET_LASER_NOT_ARMED => "Laser not armed.",
        RET_LASER_NOT_TUNED => "Laser not tuned.",
        RET_TECS_NOT_AT_SET_TEMPERATURE => "TEC not at set temperature.",
        RET_CW_NOT_ALLOWED_ON_QCL => "CW not allowed on specified QCL.",
        RET_INVALID_LASER_MODE => "Invalid laser mode.",
        RET_TEMPERATURE_OUT_OF_RANGE => "Temperature out of range.",
        RET_LASER_POWER_OFF_ERROR => "Failed to power off the laser.",
        RET_COMM_ERROR => "Communication error.",
        RET_NOT_INITIALIZED => "SDK not initialized.",
        RET_ALREADY_CREATED => "Instance already created.",
        RET_START_SWEEP_ADVANCED_SCAN_FAILURE => "Failed to start advanced sweep scan.",
        RET_INJECT_PROC_TRIG_ERROR => "Failed to inject process trigger.",
        _ => UNKNOWN_ERROR,
    }
}
