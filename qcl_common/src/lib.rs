//! QCL Common Library
//!
//! Shared constants, the vendor driver contract, parameter validation and
//! configuration loading for the QCL workspace crates.
//!
//! # Module Structure
//!
//! - [`consts`] - Channel table, calibration limits, default timing
//! - [`codes`] - Vendor return codes and their messages
//! - [`units`] - Wavelength / wavenumber conversion
//! - [`params`] - QCL parameter bounds and validation
//! - [`driver`] - `QclDriver` trait and driver errors
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use qcl_common::prelude::*;
//!
//! let pair = WwPair::from_value(7.0, Unit::Wavelength);
//! assert!((pair.wavenumber_cm1() - 1428.57).abs() < 0.01);
//! ```

pub mod codes;
pub mod config;
pub mod consts;
pub mod driver;
pub mod params;
pub mod prelude;
pub mod units;
