//! # QCL Control Library
//!
//! Control layer for a mid-infrared quantum-cascade-laser instrument.
//!
//! Operators talk to a [`QclDevice`]; the device talks to a vendor driver
//! through the `QclDriver` trait defined in `qcl_common::driver`, with every
//! call bounded by the [`adapter`] and every slow state change confirmed by
//! the [`waiter`].
//!
//! # Module Structure
//!
//! - [`device`] - QclDevice state machine and public operations
//! - [`adapter`] - Guarded driver calls with a timeout bound
//! - [`waiter`] - Polling condition waits
//! - [`status`] - Status snapshots and their display fields
//! - [`error`] - Device error type
//! - [`driver_registry`] - Driver factory registration
//! - [`drivers`] - Driver implementations
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          qcl_control                             │
//! │  ┌─────────────┐    ┌──────────────┐    ┌─────────────────────┐  │
//! │  │  Validator  │◄───│  QclDevice   │───►│  Condition Waiter   │  │
//! │  │ (qcl_common)│    │ (state mach.)│    │  (poll + timeout)   │  │
//! │  └─────────────┘    └──────┬───────┘    └─────────────────────┘  │
//! │                            │                                     │
//! │                            ▼                                     │
//! │                   ┌────────────────┐     ┌────────────────────┐  │
//! │                   │ DriverAdapter  │────►│  QclDriver (trait) │  │
//! │                   │ (worker/call)  │     │  simulation, ...   │  │
//! │                   └────────────────┘     └────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod adapter;
pub mod device;
pub mod driver_registry;
pub mod drivers;
pub mod error;
pub mod status;
pub mod waiter;

// Re-export key types for convenience
pub use crate::adapter::{AdapterDiagnostics, DriverAdapter};
pub use crate::device::{ConnectionState, QclDevice};
pub use crate::driver_registry::DriverRegistry;
pub use crate::error::{Condition, QclError};
pub use crate::status::{FieldValue, LaserStatus, ScanStatus};
