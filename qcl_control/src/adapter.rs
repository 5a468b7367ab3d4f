//! Guarded driver calls.
//!
//! Every call into the driver runs on its own short-lived worker thread so
//! that a hung controller cannot block the caller past the call bound. The
//! driver offers no abort, so a call that exceeds its bound is abandoned:
//! the worker keeps running and its late result is discarded.

use qcl_common::driver::{DriverError, EntryPoint, QclDriver, Response};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Call counters since the adapter was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct AdapterDiagnostics {
    /// Guarded calls issued.
    pub calls: u64,
    /// Calls that ended in any error.
    pub failures: u64,
    /// Calls abandoned on timeout (may still be running).
    pub abandoned: u64,
}

/// Bounded-wait wrapper around a shared driver handle.
pub struct DriverAdapter {
    driver: Arc<dyn QclDriver>,
    calls: AtomicU64,
    failures: AtomicU64,
    abandoned: AtomicU64,
}

impl DriverAdapter {
    /// Wrap a driver handle.
    pub fn new(driver: Arc<dyn QclDriver>) -> Self {
        Self {
            driver,
            calls: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            abandoned: AtomicU64::new(0),
        }
    }

    /// Name reported by the wrapped driver.
    pub fn driver_name(&self) -> &'static str {
        self.driver.name()
    }

    /// Snapshot of the call counters.
    pub fn diagnostics(&self) -> AdapterDiagnostics {
        AdapterDiagnostics {
            calls: self.calls.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
        }
    }

    /// Run `f` against the driver on a worker and wait at most `timeout`.
    ///
    /// A return code of `RET_SUCCESS` yields the outputs; any other code
    /// becomes [`DriverError::Code`]. On timeout the worker is left running.
    ///
    /// # Errors
    /// - [`DriverError::InvalidTimeout`] for a zero `timeout` (no call made)
    /// - [`DriverError::Timeout`] if the driver did not answer in time
    /// - [`DriverError::Code`] for a non-success return code
    /// - [`DriverError::WorkerLost`] if the driver panicked
    pub fn call<T, F>(&self, entry: EntryPoint, timeout: Duration, f: F) -> Result<T, DriverError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn QclDriver) -> Response<T> + Send + 'static,
    {
        if timeout.is_zero() {
            return Err(DriverError::InvalidTimeout(entry));
        }

        self.calls.fetch_add(1, Ordering::Relaxed);
        let outcome = self.dispatch(entry, timeout, f);
        if outcome.is_err() {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
        outcome
    }

    fn dispatch<T, F>(&self, entry: EntryPoint, timeout: Duration, f: F) -> Result<T, DriverError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn QclDriver) -> Response<T> + Send + 'static,
    {
        let driver = Arc::clone(&self.driver);
        let (tx, rx) = mpsc::sync_channel(1);

        thread::Builder::new()
            .name(format!("qcl-{entry}"))
            .spawn(move || {
                let response = f(&*driver);
                // Receiver is gone when the call was abandoned.
                let _ = tx.send(response);
            })
            .map_err(|e| DriverError::Spawn(e.to_string()))?;

        debug!(%entry, ?timeout, "guarded call");

        match rx.recv_timeout(timeout) {
            Ok(response) => {
                if !response.is_success() {
                    debug!(%entry, code = response.code, "driver returned error code");
                }
                response.into_result(entry)
            }
            Err(RecvTimeoutError::Timeout) => {
                self.abandoned.fetch_add(1, Ordering::Relaxed);
                warn!(%entry, ?timeout, "driver call timed out, abandoning worker");
                Err(DriverError::Timeout { entry, timeout })
            }
            Err(RecvTimeoutError::Disconnected) => {
                warn!(%entry, "driver worker exited without a result");
                Err(DriverError::WorkerLost(entry))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::simulation::SimulationDriver;
    use qcl_common::codes::{RET_NOT_INITIALIZED, RET_SUCCESS};
    use std::time::Instant;

    fn adapter() -> DriverAdapter {
        DriverAdapter::new(Arc::new(SimulationDriver::default()))
    }

    #[test]
    fn success_returns_outputs() {
        let adapter = adapter();
        let connected = adapter
            .call(EntryPoint::IsConnectedToLaser, Duration::from_secs(1), |d| {
                d.is_connected()
            })
            .unwrap();
        assert!(!connected);
        assert_eq!(
            adapter.diagnostics(),
            AdapterDiagnostics {
                calls: 1,
                failures: 0,
                abandoned: 0
            }
        );
    }

    #[test]
    fn error_code_maps_to_code_error() {
        let adapter = adapter();
        let err = adapter
            .call(EntryPoint::ArmLaser, Duration::from_secs(1), |d| d.arm_laser())
            .unwrap_err();
        assert_eq!(err.code(), Some(RET_NOT_INITIALIZED));
        assert_eq!(adapter.diagnostics().failures, 1);
    }

    #[test]
    fn zero_timeout_is_rejected_without_a_call() {
        let adapter = adapter();
        let err = adapter
            .call(EntryPoint::Initialize, Duration::ZERO, |d| d.initialize())
            .unwrap_err();
        assert_eq!(err, DriverError::InvalidTimeout(EntryPoint::Initialize));
        assert_eq!(adapter.diagnostics().calls, 0);
    }

    #[test]
    fn hung_call_times_out_and_is_abandoned() {
        let adapter = adapter();
        let start = Instant::now();
        let err = adapter
            .call(EntryPoint::TuneToWw, Duration::from_millis(50), |_| {
                thread::sleep(Duration::from_millis(500));
                Response::ok(())
            })
            .unwrap_err();
        assert!(start.elapsed() < Duration::from_millis(400));
        assert_eq!(
            err,
            DriverError::Timeout {
                entry: EntryPoint::TuneToWw,
                timeout: Duration::from_millis(50)
            }
        );
        let diag = adapter.diagnostics();
        assert_eq!((diag.calls, diag.failures, diag.abandoned), (1, 1, 1));
    }

    #[test]
    fn panicking_driver_is_worker_lost() {
        let adapter = adapter();
        let err = adapter
            .call::<(), _>(EntryPoint::GetScanStatus, Duration::from_secs(1), |_| {
                panic!("driver fault")
            })
            .unwrap_err();
        assert_eq!(err, DriverError::WorkerLost(EntryPoint::GetScanStatus));
    }

    #[test]
    fn raw_code_is_checked_not_outputs() {
        let adapter = adapter();
        let value = adapter
            .call(EntryPoint::GetNumInstalledQcls, Duration::from_secs(1), |_| Response {
                code: RET_SUCCESS,
                value: 3u8,
            })
            .unwrap();
        assert_eq!(value, 3);
    }
}
