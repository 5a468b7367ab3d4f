//! Shared test fixtures: a counting, fault-injecting mock driver.
//!
//! The mock applies every command instantly and never enforces ordering
//! rules, so device tests see only the behavior they inject.

#![allow(dead_code)]

use parking_lot::Mutex;
use qcl_common::config::TimingConfig;
use qcl_common::driver::{
    ApiVersion, EntryPoint, QclDriver, Response, ScanReading, SweepScanArgs, WwReading,
};
use qcl_common::units::Unit;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// Timing bounds short enough for tests.
pub fn fast_timing() -> TimingConfig {
    TimingConfig {
        call_timeout: Duration::from_millis(500),
        poll_interval: Duration::from_millis(5),
        connect_timeout: Duration::from_millis(200),
        disconnect_timeout: Duration::from_millis(200),
        arm_timeout: Duration::from_millis(200),
        disarm_timeout: Duration::from_millis(200),
        emission_timeout: Duration::from_millis(200),
        tune_timeout: Duration::from_millis(300),
    }
}

#[derive(Debug, Default)]
pub struct MockState {
    pub connected: bool,
    pub armed: bool,
    pub emitting: bool,
    pub tuned: bool,
    pub ww: f32,
    pub ww_units: u8,
    pub params: [(f32, f32, f32); 4],
    pub last_tune: Option<(f32, u8, u8)>,
    pub last_scan: Option<SweepScanArgs>,
    pub scan: ScanReading,
}

/// Mock controller.
#[derive(Default)]
pub struct MockDriver {
    calls: AtomicUsize,
    log: Mutex<Vec<EntryPoint>>,
    state: Mutex<MockState>,
    faults: Mutex<HashMap<EntryPoint, u32>>,
    channel_faults: Mutex<HashMap<u8, u32>>,
    delays: Mutex<HashMap<EntryPoint, Duration>>,
    ignored: Mutex<HashSet<EntryPoint>>,
}

impl MockDriver {
    pub fn new() -> Self {
        let driver = Self::default();
        {
            let mut state = driver.state.lock();
            state.ww_units = Unit::SDK_MICRONS;
            state.params = [
                (1000.0, 1.0, 400.0),
                (2000.0, 1.0, 410.0),
                (3000.0, 1.0, 320.0),
                (4000.0, 1.0, 480.0),
            ];
            state.scan.units = Unit::SDK_MICRONS;
        }
        driver
    }

    /// Entry point invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Entry points in invocation order.
    pub fn log(&self) -> Vec<EntryPoint> {
        self.log.lock().clone()
    }

    /// Make `entry` return `code`.
    pub fn fail(&self, entry: EntryPoint, code: u32) {
        self.faults.lock().insert(entry, code);
    }

    /// Clear an injected failure.
    pub fn heal(&self, entry: EntryPoint) {
        self.faults.lock().remove(&entry);
    }

    /// Make every per-channel read of `qcl` return `code`.
    pub fn fail_channel(&self, qcl: u8, code: u32) {
        self.channel_faults.lock().insert(qcl, code);
    }

    /// Make `entry` block for `delay` before answering.
    pub fn hang(&self, entry: EntryPoint, delay: Duration) {
        self.delays.lock().insert(entry, delay);
    }

    /// Accept `entry` but leave the state unchanged.
    pub fn ignore(&self, entry: EntryPoint) {
        self.ignored.lock().insert(entry);
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        f(&mut self.state.lock())
    }

    fn enter(&self, entry: EntryPoint) -> Option<u32> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().push(entry);
        let delay = self.delays.lock().get(&entry).copied();
        if let Some(delay) = delay {
            thread::sleep(delay);
        }
        self.faults.lock().get(&entry).copied()
    }

    fn query<T: Default>(
        &self,
        entry: EntryPoint,
        f: impl FnOnce(&MockState) -> T,
    ) -> Response<T> {
        match self.enter(entry) {
            Some(code) => Response::error(code),
            None => Response::ok(f(&self.state.lock())),
        }
    }

    fn command(&self, entry: EntryPoint, f: impl FnOnce(&mut MockState)) -> Response<()> {
        if let Some(code) = self.enter(entry) {
            return Response::error(code);
        }
        if !self.ignored.lock().contains(&entry) {
            f(&mut self.state.lock());
        }
        Response::ok(())
    }

    fn channel(
        &self,
        entry: EntryPoint,
        qcl: u8,
        f: impl FnOnce(&(f32, f32, f32)) -> f32,
    ) -> Response<f32> {
        if let Some(code) = self.enter(entry) {
            return Response::error(code);
        }
        if let Some(code) = self.channel_faults.lock().get(&qcl).copied() {
            return Response::error(code);
        }
        let state = self.state.lock();
        Response::ok(f(&state.params[usize::from(qcl) - 1]))
    }
}

impl QclDriver for MockDriver {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn version(&self) -> &'static str {
        "0.0.0"
    }

    fn api_version(&self) -> Response<ApiVersion> {
        self.query(EntryPoint::GetApiVersion, |_| ApiVersion {
            major: 1,
            minor: 2,
            patch: 3,
        })
    }

    fn initialize(&self) -> Response<()> {
        self.command(EntryPoint::Initialize, |s| s.connected = true)
    }

    fn deinitialize(&self) -> Response<()> {
        self.command(EntryPoint::DeInitialize, |s| s.connected = false)
    }

    fn is_connected(&self) -> Response<bool> {
        self.query(EntryPoint::IsConnectedToLaser, |s| s.connected)
    }

    fn num_installed_qcls(&self) -> Response<u8> {
        self.query(EntryPoint::GetNumInstalledQcls, |_| 4)
    }

    fn is_interlock_set(&self) -> Response<bool> {
        self.query(EntryPoint::IsInterlockedStatusSet, |_| true)
    }

    fn is_key_switch_set(&self) -> Response<bool> {
        self.query(EntryPoint::IsKeySwitchStatusSet, |_| true)
    }

    fn arm_laser(&self) -> Response<()> {
        self.command(EntryPoint::ArmLaser, |s| s.armed = true)
    }

    fn disarm_laser(&self) -> Response<()> {
        self.command(EntryPoint::DisarmLaser, |s| s.armed = false)
    }

    fn is_laser_armed(&self) -> Response<bool> {
        self.query(EntryPoint::IsLaserArmed, |s| s.armed)
    }

    fn tune_to_ww(&self, target: f32, units: u8, preferred_qcl: u8) -> Response<()> {
        self.state.lock().last_tune = Some((target, units, preferred_qcl));
        self.command(EntryPoint::TuneToWw, |s| {
            s.ww = target;
            s.ww_units = units;
            s.tuned = true;
        })
    }

    fn is_tuned(&self) -> Response<bool> {
        self.query(EntryPoint::IsTuned, |s| s.tuned)
    }

    fn actual_ww(&self) -> Response<WwReading> {
        self.query(EntryPoint::GetActualWw, |s| WwReading {
            value: s.ww,
            units: s.ww_units,
            light_valid: s.emitting,
        })
    }

    fn turn_emission_on(&self) -> Response<()> {
        self.command(EntryPoint::TurnEmissionOn, |s| s.emitting = true)
    }

    fn turn_emission_off(&self) -> Response<()> {
        self.command(EntryPoint::TurnEmissionOff, |s| s.emitting = false)
    }

    fn is_emission_on(&self) -> Response<bool> {
        self.query(EntryPoint::IsEmissionOn, |s| s.emitting)
    }

    fn qcl_pulse_rate(&self, qcl: u8) -> Response<f32> {
        self.channel(EntryPoint::GetQclPulseRate, qcl, |p| p.0)
    }

    fn qcl_pulse_width(&self, qcl: u8) -> Response<f32> {
        self.channel(EntryPoint::GetQclPulseWidth, qcl, |p| p.1)
    }

    fn qcl_current(&self, qcl: u8) -> Response<f32> {
        self.channel(EntryPoint::GetQclCurrent, qcl, |p| p.2)
    }

    fn set_qcl_params(
        &self,
        qcl: u8,
        pulse_rate: f32,
        pulse_width: f32,
        current: f32,
    ) -> Response<()> {
        self.command(EntryPoint::SetQclParams, |s| {
            s.params[usize::from(qcl) - 1] = (pulse_rate, pulse_width, current);
        })
    }

    fn start_sweep_scan(&self, args: SweepScanArgs) -> Response<()> {
        self.command(EntryPoint::StartSweepScan, |s| {
            s.last_scan = Some(args);
            s.scan = ScanReading {
                in_progress: true,
                active: true,
                repetition: 1,
                current_ww: args.start,
                units: args.units,
                motion_in_progress: true,
                ..ScanReading::default()
            };
        })
    }

    fn stop_scan(&self) -> Response<()> {
        self.command(EntryPoint::StopScanInProgress, |s| {
            s.scan.in_progress = false;
            s.scan.active = false;
        })
    }

    fn pause_scan(&self) -> Response<()> {
        self.command(EntryPoint::PauseScanInProgress, |s| {
            s.scan.paused = true;
            s.scan.active = false;
        })
    }

    fn resume_scan(&self) -> Response<()> {
        self.command(EntryPoint::ResumeScanInProgress, |s| {
            s.scan.paused = false;
            s.scan.active = true;
        })
    }

    fn scan_status(&self) -> Response<ScanReading> {
        self.query(EntryPoint::GetScanStatus, |s| s.scan)
    }
}
