//! Wavelength / wavenumber conversion.
//!
//! The instrument reports and accepts spectral positions either as a
//! wavelength in µm or a wavenumber in cm⁻¹. The two are reciprocal:
//! `wavenumber = 10000 / wavelength`. A non-positive input is the hardware
//! "no valid light" sentinel and converts to `0`, never to a division by zero.

use crate::consts::WW_CONVERSION_FACTOR;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unit tag errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    /// Caller supplied an unrecognized unit tag.
    #[error("unknown unit tag '{0}' (expected wl|wavelength|um or wn|wavenumber|cm-1)")]
    UnknownTag(String),

    /// Driver reported a unit code outside {1, 2}.
    #[error("unknown unit code {0}")]
    UnknownCode(u8),
}

/// Spectral unit selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Wavelength in µm.
    Wavelength,
    /// Wavenumber in cm⁻¹.
    Wavenumber,
}

impl Unit {
    /// SDK code for micrometers.
    pub const SDK_MICRONS: u8 = 1;
    /// SDK code for wavenumbers.
    pub const SDK_CM1: u8 = 2;

    /// Code passed to the driver.
    pub const fn sdk_code(self) -> u8 {
        match self {
            Unit::Wavelength => Self::SDK_MICRONS,
            Unit::Wavenumber => Self::SDK_CM1,
        }
    }

    /// Decode a unit code reported by the driver.
    pub fn from_sdk_code(code: u8) -> Result<Self, UnitError> {
        match code {
            Self::SDK_MICRONS => Ok(Unit::Wavelength),
            Self::SDK_CM1 => Ok(Unit::Wavenumber),
            other => Err(UnitError::UnknownCode(other)),
        }
    }

    /// Display symbol.
    pub const fn symbol(self) -> &'static str {
        match self {
            Unit::Wavelength => "µm",
            Unit::Wavenumber => "cm⁻¹",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Wavelength => write!(f, "wavelength"),
            Unit::Wavenumber => write!(f, "wavenumber"),
        }
    }
}

impl FromStr for Unit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wl" | "wavelength" | "um" | "micron" | "microns" => Ok(Unit::Wavelength),
            "wn" | "wavenumber" | "cm-1" | "cm1" => Ok(Unit::Wavenumber),
            _ => Err(UnitError::UnknownTag(s.to_string())),
        }
    }
}

/// Reciprocal conversion shared by both directions.
#[inline]
pub fn reciprocal(value: f64) -> f64 {
    if value > 0.0 {
        WW_CONVERSION_FACTOR / value
    } else {
        0.0
    }
}

/// Convert `value` given in `unit` to `(wavelength_um, wavenumber_cm1)`.
///
/// The input is passed through unchanged; only the derived quantity is
/// computed, and it is `0` when `value` is not strictly positive.
pub fn to_both(value: f64, unit: Unit) -> (f64, f64) {
    match unit {
        Unit::Wavelength => (value, reciprocal(value)),
        Unit::Wavenumber => (reciprocal(value), value),
    }
}

/// A consistent wavelength / wavenumber pair.
///
/// Either both members are zero (no valid light) or
/// `wavenumber == 10000 / wavelength`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct WwPair {
    wavelength_um: f64,
    wavenumber_cm1: f64,
}

impl WwPair {
    /// The "no valid light" sentinel.
    pub const ZERO: Self = Self {
        wavelength_um: 0.0,
        wavenumber_cm1: 0.0,
    };

    /// Build a pair from a reading in either unit.
    pub fn from_value(value: f64, unit: Unit) -> Self {
        if !(value > 0.0) {
            return Self::ZERO;
        }
        let (wavelength_um, wavenumber_cm1) = to_both(value, unit);
        if !(wavelength_um.is_finite() && wavenumber_cm1.is_finite()) {
            return Self::ZERO;
        }
        Self {
            wavelength_um,
            wavenumber_cm1,
        }
    }

    /// Wavelength in µm.
    #[inline]
    pub const fn wavelength_um(&self) -> f64 {
        self.wavelength_um
    }

    /// Wavenumber in cm⁻¹.
    #[inline]
    pub const fn wavenumber_cm1(&self) -> f64 {
        self.wavenumber_cm1
    }

    /// Value expressed in `unit`.
    pub const fn in_unit(&self, unit: Unit) -> f64 {
        match unit {
            Unit::Wavelength => self.wavelength_um,
            Unit::Wavenumber => self.wavenumber_cm1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_maps_to_zero_in_both_directions() {
        assert_eq!(to_both(0.0, Unit::Wavelength), (0.0, 0.0));
        assert_eq!(to_both(0.0, Unit::Wavenumber), (0.0, 0.0));
    }

    #[test]
    fn negative_input_yields_zero_derived_value() {
        assert_eq!(to_both(-3.0, Unit::Wavelength), (-3.0, 0.0));
        assert_eq!(to_both(-3.0, Unit::Wavenumber), (0.0, -3.0));
        assert_eq!(WwPair::from_value(-3.0, Unit::Wavelength), WwPair::ZERO);
    }

    #[test]
    fn seven_microns_is_about_1428_wavenumbers() {
        let (wl, wn) = to_both(7.0, Unit::Wavelength);
        assert_eq!(wl, 7.0);
        assert!((wn - 1428.5714).abs() < 1e-3);
    }

    #[test]
    fn nan_is_treated_as_no_light() {
        let (_, wn) = to_both(f64::NAN, Unit::Wavelength);
        assert_eq!(wn, 0.0);
        assert_eq!(WwPair::from_value(f64::NAN, Unit::Wavenumber), WwPair::ZERO);
    }

    #[test]
    fn unit_tags_parse() {
        assert_eq!("wl".parse::<Unit>().unwrap(), Unit::Wavelength);
        assert_eq!("WN".parse::<Unit>().unwrap(), Unit::Wavenumber);
        assert_eq!("cm-1".parse::<Unit>().unwrap(), Unit::Wavenumber);
        assert!(matches!("nm".parse::<Unit>(), Err(UnitError::UnknownTag(_))));
    }

    #[test]
    fn sdk_codes_are_stable() {
        assert_eq!(Unit::Wavelength.sdk_code(), 1);
        assert_eq!(Unit::Wavenumber.sdk_code(), 2);
        assert_eq!(Unit::from_sdk_code(2), Ok(Unit::Wavenumber));
        assert_eq!(Unit::from_sdk_code(0), Err(UnitError::UnknownCode(0)));
    }

    proptest! {
        #[test]
        fn wavelength_round_trips_through_wavenumber(wl in 0.01f64..1000.0) {
            let (_, wn) = to_both(wl, Unit::Wavelength);
            let (back, _) = to_both(wn, Unit::Wavenumber);
            prop_assert!((back - wl).abs() <= wl * 1e-12);
        }

        #[test]
        fn pair_is_always_consistent(value in -100.0f64..5000.0, wn_input in any::<bool>()) {
            let unit = if wn_input { Unit::Wavenumber } else { Unit::Wavelength };
            let pair = WwPair::from_value(value, unit);
            if pair.wavelength_um() > 0.0 {
                prop_assert!((pair.wavenumber_cm1() - 1e4 / pair.wavelength_um()).abs()
                    <= pair.wavenumber_cm1() * 1e-12);
            } else {
                prop_assert_eq!(pair, WwPair::ZERO);
            }
        }
    }
}
