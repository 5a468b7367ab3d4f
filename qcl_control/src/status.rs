//! Status snapshots.
//!
//! The device owns one [`LaserStatus`] and one [`ScanStatus`]. Fields are
//! `None` until read from the driver, so "not yet read" is never confused
//! with "read as false/zero". [`LaserStatus::fields`] and
//! [`ScanStatus::fields`] give the ordered label/value view used by display
//! front ends.

use qcl_common::driver::ScanReading;
use qcl_common::units::{Unit, WwPair};
use serde::Serialize;
use std::fmt;

/// One displayed status value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Not read yet.
    Unknown,
    /// Flag.
    Bool(bool),
    /// Counter.
    Count(u32),
    /// Measurement.
    Float(f64),
    /// Free text.
    Text(String),
}

impl FieldValue {
    /// True for [`FieldValue::Unknown`].
    pub fn is_unknown(&self) -> bool {
        matches!(self, FieldValue::Unknown)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Unknown => f.write_str("?"),
            FieldValue::Bool(v) => write!(f, "{v}"),
            FieldValue::Count(v) => write!(f, "{v}"),
            FieldValue::Float(v) => write!(f, "{v:.4}"),
            FieldValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<Option<bool>> for FieldValue {
    fn from(value: Option<bool>) -> Self {
        value.map_or(FieldValue::Unknown, FieldValue::Bool)
    }
}

impl From<Option<u8>> for FieldValue {
    fn from(value: Option<u8>) -> Self {
        value.map_or(FieldValue::Unknown, |v| FieldValue::Count(u32::from(v)))
    }
}

impl From<Option<u16>> for FieldValue {
    fn from(value: Option<u16>) -> Self {
        value.map_or(FieldValue::Unknown, |v| FieldValue::Count(u32::from(v)))
    }
}

impl From<Option<f64>> for FieldValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(FieldValue::Unknown, FieldValue::Float)
    }
}

// ─── Laser Status ───────────────────────────────────────────────────

/// Last known instrument state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LaserStatus {
    connected: bool,
    qcl_count: Option<u8>,
    interlock_set: Option<bool>,
    key_switch_set: Option<bool>,
    armed: Option<bool>,
    emitting: Option<bool>,
    tuned: Option<bool>,
    ww: Option<WwPair>,
}

impl LaserStatus {
    /// Fresh snapshot after a successful connect: every field unknown.
    pub(crate) fn connected_unknown() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }

    /// Controller link up.
    pub fn connected(&self) -> bool {
        self.connected
    }

    /// Installed QCL count.
    pub fn qcl_count(&self) -> Option<u8> {
        self.qcl_count
    }

    /// Interlock closed.
    pub fn interlock_set(&self) -> Option<bool> {
        self.interlock_set
    }

    /// Key switch on.
    pub fn key_switch_set(&self) -> Option<bool> {
        self.key_switch_set
    }

    /// Laser armed.
    pub fn armed(&self) -> Option<bool> {
        self.armed
    }

    /// Emission on.
    pub fn emitting(&self) -> Option<bool> {
        self.emitting
    }

    /// Tuning complete.
    pub fn tuned(&self) -> Option<bool> {
        self.tuned
    }

    /// Current position.
    pub fn ww(&self) -> Option<WwPair> {
        self.ww
    }

    /// Current wavelength in µm.
    pub fn wavelength_um(&self) -> Option<f64> {
        self.ww.map(|p| p.wavelength_um())
    }

    /// Current wavenumber in cm⁻¹.
    pub fn wavenumber_cm1(&self) -> Option<f64> {
        self.ww.map(|p| p.wavenumber_cm1())
    }

    pub(crate) fn set_connected(&mut self, value: bool) {
        self.connected = value;
    }

    pub(crate) fn set_qcl_count(&mut self, value: u8) {
        self.qcl_count = Some(value);
    }

    pub(crate) fn set_interlock_set(&mut self, value: bool) {
        self.interlock_set = Some(value);
    }

    pub(crate) fn set_key_switch_set(&mut self, value: bool) {
        self.key_switch_set = Some(value);
    }

    pub(crate) fn set_armed(&mut self, value: bool) {
        self.armed = Some(value);
    }

    pub(crate) fn set_emitting(&mut self, value: bool) {
        self.emitting = Some(value);
    }

    pub(crate) fn set_tuned(&mut self, value: bool) {
        self.tuned = Some(value);
    }

    pub(crate) fn set_ww(&mut self, value: WwPair) {
        self.ww = Some(value);
    }

    /// Ordered label/value view.
    pub fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("Connected", FieldValue::Bool(self.connected)),
            ("Installed QCLs", self.qcl_count.into()),
            ("Interlock set", self.interlock_set.into()),
            ("Key switch set", self.key_switch_set.into()),
            ("Armed", self.armed.into()),
            ("Emission on", self.emitting.into()),
            ("Tuned", self.tuned.into()),
            ("Wavelength (µm)", self.wavelength_um().into()),
            ("Wavenumber (cm⁻¹)", self.wavenumber_cm1().into()),
        ]
    }
}

// ─── Scan Status ────────────────────────────────────────────────────

/// Last known sweep scan progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanStatus {
    in_progress: Option<bool>,
    active: Option<bool>,
    paused: Option<bool>,
    repetition: Option<u16>,
    percent: Option<u16>,
    ww: Option<WwPair>,
    units: Option<Unit>,
    tec_in_progress: Option<bool>,
    motion_in_progress: Option<bool>,
}

impl ScanStatus {
    /// Scan started and not finished.
    pub fn in_progress(&self) -> Option<bool> {
        self.in_progress
    }

    /// Actively sweeping.
    pub fn active(&self) -> Option<bool> {
        self.active
    }

    /// Paused.
    pub fn paused(&self) -> Option<bool> {
        self.paused
    }

    /// Current repetition.
    pub fn repetition(&self) -> Option<u16> {
        self.repetition
    }

    /// Percent complete.
    pub fn percent(&self) -> Option<u16> {
        self.percent
    }

    /// Current position.
    pub fn ww(&self) -> Option<WwPair> {
        self.ww
    }

    /// Unit the driver reported the position in.
    pub fn units(&self) -> Option<Unit> {
        self.units
    }

    /// TEC settling.
    pub fn tec_in_progress(&self) -> Option<bool> {
        self.tec_in_progress
    }

    /// Tuning motion.
    pub fn motion_in_progress(&self) -> Option<bool> {
        self.motion_in_progress
    }

    pub(crate) fn update(&mut self, reading: &ScanReading, ww: WwPair, units: Unit) {
        *self = Self {
            in_progress: Some(reading.in_progress),
            active: Some(reading.active),
            paused: Some(reading.paused),
            repetition: Some(reading.repetition),
            percent: Some(reading.percent),
            ww: Some(ww),
            units: Some(units),
            tec_in_progress: Some(reading.tec_in_progress),
            motion_in_progress: Some(reading.motion_in_progress),
        };
    }

    /// Ordered label/value view.
    pub fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("Scan in progress", self.in_progress.into()),
            ("Scan active", self.active.into()),
            ("Scan paused", self.paused.into()),
            ("Repetition", self.repetition.into()),
            ("Percent complete", self.percent.into()),
            ("Wavelength (µm)", self.ww.map(|p| p.wavelength_um()).into()),
            ("Wavenumber (cm⁻¹)", self.ww.map(|p| p.wavenumber_cm1()).into()),
            (
                "Units",
                self.units
                    .map_or(FieldValue::Unknown, |u| FieldValue::Text(u.to_string())),
            ),
            ("TEC in progress", self.tec_in_progress.into()),
            ("Motion in progress", self.motion_in_progress.into()),
        ]
    }
}
