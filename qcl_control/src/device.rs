//! QCL device state machine.
//!
//! `QclDevice` owns the driver handle for its whole lifetime and is the only
//! way operators touch the instrument. Every operation follows the same
//! shape:
//!
//! 1. check preconditions (connection, parameter bounds): no driver call on failure
//! 2. issue one guarded driver call; it must report success
//! 3. optionally wait for a status check to confirm the change
//! 4. update the snapshot
//!
//! Operations are issued from one thread and never overlap, so at most one
//! guarded call is outstanding except after a call timeout, when the
//! abandoned call may still complete in the background.

use crate::adapter::{AdapterDiagnostics, DriverAdapter};
use crate::driver_registry::DriverRegistry;
use crate::error::{Condition, QclError};
use crate::status::{LaserStatus, ScanStatus};
use crate::waiter::{WaitError, try_wait_until};
use qcl_common::codes::RET_NOT_INITIALIZED;
use qcl_common::config::{InstrumentConfig, TimingConfig};
use qcl_common::consts::{QCL_CHANNEL_COUNT, QCL_CHANNELS};
use qcl_common::driver::{
    ApiVersion, DriverError, EntryPoint, QclDriver, Response, SweepScanArgs,
};
use qcl_common::params::{QclParams, SweepScanRequest, channel_index, validate_qcl_params};
use qcl_common::units::{Unit, WwPair};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Connection state of a [`QclDevice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No session.
    #[default]
    Disconnected,
    /// Connect sequence running.
    Connecting,
    /// Session open; all operations allowed.
    Connected,
}

/// One instrument, one driver handle, one snapshot.
pub struct QclDevice {
    adapter: DriverAdapter,
    timing: TimingConfig,
    preferred_qcl: u8,
    state: ConnectionState,
    status: LaserStatus,
    scan_status: ScanStatus,
}

impl QclDevice {
    /// Wrap a driver. The device starts disconnected.
    ///
    /// # Errors
    /// - [`QclError::Config`] if `timing` has a zero bound or a poll
    ///   interval not shorter than every wait
    /// - [`QclError::Validation`] if `preferred_qcl` is not a channel
    pub fn new(
        driver: Arc<dyn QclDriver>,
        timing: TimingConfig,
        preferred_qcl: u8,
    ) -> Result<Self, QclError> {
        timing.validate()?;
        channel_index(preferred_qcl)?;
        Ok(Self {
            adapter: DriverAdapter::new(driver),
            timing,
            preferred_qcl,
            state: ConnectionState::Disconnected,
            status: LaserStatus::default(),
            scan_status: ScanStatus::default(),
        })
    }

    /// Build a device from the instrument configuration, creating the
    /// configured driver through `registry`.
    pub fn from_config(
        config: &InstrumentConfig,
        registry: &DriverRegistry,
    ) -> Result<Self, QclError> {
        config.validate()?;
        let driver = registry.create_driver(&config.driver.name, &config.driver.settings)?;
        info!(
            driver = driver.name(),
            version = driver.version(),
            preferred_qcl = config.driver.preferred_qcl,
            "driver created"
        );
        Self::new(
            Arc::from(driver),
            config.timing,
            config.driver.preferred_qcl,
        )
    }

    // ─── Accessors ──────────────────────────────────────────────────

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// True when the session is open.
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Last known status, without driver calls.
    pub fn snapshot(&self) -> &LaserStatus {
        &self.status
    }

    /// Last known scan status, without driver calls.
    pub fn last_scan_status(&self) -> &ScanStatus {
        &self.scan_status
    }

    /// Guarded call counters.
    pub fn diagnostics(&self) -> AdapterDiagnostics {
        self.adapter.diagnostics()
    }

    /// Call and wait bounds in use.
    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// QCL passed to the tune entry point.
    pub fn preferred_qcl(&self) -> u8 {
        self.preferred_qcl
    }

    // ─── Connection ─────────────────────────────────────────────────

    /// Open the session and wait for the controller to report it.
    ///
    /// A no-op when already connected. On success every snapshot field is
    /// reset to unknown until read again.
    pub fn connect(&mut self) -> Result<(), QclError> {
        if self.is_connected() {
            debug!("connect requested while connected");
            return Ok(());
        }

        info!(driver = self.adapter.driver_name(), "connecting");
        self.state = ConnectionState::Connecting;

        if let Err(e) = self.connect_sequence() {
            self.mark_disconnected();
            warn!(error = %e, "connect failed");
            return Err(QclError::ConnectFailed(Box::new(e)));
        }

        self.state = ConnectionState::Connected;
        self.status = LaserStatus::connected_unknown();
        self.scan_status = ScanStatus::default();
        info!("connected");

        match self.api_version() {
            Ok(version) => info!(%version, "controller SDK version"),
            Err(e) if !self.is_connected() => {
                warn!(error = %e, "session lost right after connect");
                return Err(QclError::ConnectFailed(Box::new(e)));
            }
            Err(e) => warn!(error = %e, "could not read SDK version"),
        }
        Ok(())
    }

    fn connect_sequence(&mut self) -> Result<(), QclError> {
        self.call(EntryPoint::Initialize, |d| d.initialize())?;
        let timeout = self.timing.connect_timeout;
        if let Err(e) = self.wait_for(Condition::Connected, true, timeout, Self::read_connected) {
            self.release_session();
            return Err(e);
        }
        Ok(())
    }

    /// Close a session the controller accepted but never reported up.
    /// Best effort: a failure is logged and the connect error stands.
    fn release_session(&mut self) {
        match self.call(EntryPoint::DeInitialize, |d| d.deinitialize()) {
            Ok(()) => debug!("released half-open session"),
            Err(e) => warn!(error = %e, "could not release half-open session"),
        }
    }

    /// Close the session and wait for the controller to report it closed.
    ///
    /// On failure the device stays connected.
    pub fn disconnect(&mut self) -> Result<(), QclError> {
        self.require_connected("disconnect")?;
        info!("disconnecting");

        self.call(EntryPoint::DeInitialize, |d| d.deinitialize())?;
        let timeout = self.timing.disconnect_timeout;
        self.wait_for(Condition::Connected, false, timeout, Self::read_connected)?;

        self.mark_disconnected();
        info!("disconnected");
        Ok(())
    }

    // ─── Arm / Tune / Emission ──────────────────────────────────────

    /// Arm the laser and wait until the controller reports it armed.
    ///
    /// TEC stabilization makes this slow; the wait uses `arm_timeout`.
    pub fn arm(&mut self) -> Result<(), QclError> {
        self.require_connected("arm")?;
        info!("arming laser");
        self.call(EntryPoint::ArmLaser, |d| d.arm_laser())?;
        let timeout = self.timing.arm_timeout;
        self.wait_for(Condition::Armed, true, timeout, Self::read_armed)?;
        info!("laser armed");
        Ok(())
    }

    /// Disarm the laser and wait until the controller reports it disarmed.
    pub fn disarm(&mut self) -> Result<(), QclError> {
        self.require_connected("disarm")?;
        info!("disarming laser");
        self.call(EntryPoint::DisarmLaser, |d| d.disarm_laser())?;
        let timeout = self.timing.disarm_timeout;
        self.wait_for(Condition::Armed, false, timeout, Self::read_armed)?;
        info!("laser disarmed");
        Ok(())
    }

    /// Tune to `target` given in `unit` and wait for the tuned flag.
    ///
    /// The target is not range-checked here; the controller rejects
    /// positions outside its tuning range with a driver error.
    pub fn tune(&mut self, unit: Unit, target: f64) -> Result<(), QclError> {
        self.require_connected("tune")?;
        let units = unit.sdk_code();
        let qcl = self.preferred_qcl;
        let value = target as f32;

        info!(%unit, target, qcl, "tuning");
        self.call(EntryPoint::TuneToWw, move |d| d.tune_to_ww(value, units, qcl))?;
        let timeout = self.timing.tune_timeout;
        self.wait_for(Condition::Tuned, true, timeout, Self::read_tuned)?;
        info!(%unit, target, "tuned");
        Ok(())
    }

    /// Turn emission on and wait until the controller reports it on.
    pub fn enable_emission(&mut self) -> Result<(), QclError> {
        self.require_connected("enable_emission")?;
        info!("turning emission on");
        self.call(EntryPoint::TurnEmissionOn, |d| d.turn_emission_on())?;
        let timeout = self.timing.emission_timeout;
        self.wait_for(Condition::Emitting, true, timeout, Self::read_emitting)?;
        info!("emission on");
        Ok(())
    }

    /// Turn emission off and wait until the controller reports it off.
    pub fn disable_emission(&mut self) -> Result<(), QclError> {
        self.require_connected("disable_emission")?;
        info!("turning emission off");
        self.call(EntryPoint::TurnEmissionOff, |d| d.turn_emission_off())?;
        let timeout = self.timing.emission_timeout;
        self.wait_for(Condition::Emitting, false, timeout, Self::read_emitting)?;
        info!("emission off");
        Ok(())
    }

    // ─── QCL Parameters ─────────────────────────────────────────────

    /// Write pulse rate (Hz), pulse width (µs) and current (mA) of one
    /// channel. Bounds are checked before the driver is called.
    pub fn set_qcl_params(
        &mut self,
        channel: u8,
        pulse_rate_hz: f64,
        pulse_width_us: f64,
        current_ma: f64,
    ) -> Result<(), QclError> {
        self.require_connected("set_qcl_params")?;
        validate_qcl_params(channel, pulse_rate_hz, pulse_width_us, current_ma)?;

        info!(
            channel,
            pulse_rate_hz, pulse_width_us, current_ma, "writing QCL parameters"
        );
        let (rate, width, current) = (pulse_rate_hz as f32, pulse_width_us as f32, current_ma as f32);
        self.call(EntryPoint::SetQclParams, move |d| {
            d.set_qcl_params(channel, rate, width, current)
        })
    }

    /// Read the parameters of one channel.
    pub fn qcl_params(&mut self, channel: u8) -> Result<QclParams, QclError> {
        self.require_connected("qcl_params")?;
        channel_index(channel)?;
        self.read_params(channel)
    }

    /// Read the parameters of channels 1..=4. Any channel failure fails the
    /// whole read.
    pub fn all_qcl_params(&mut self) -> Result<[QclParams; QCL_CHANNEL_COUNT], QclError> {
        self.require_connected("all_qcl_params")?;
        let mut all = [QclParams::default(); QCL_CHANNEL_COUNT];
        for (slot, channel) in all.iter_mut().zip(QCL_CHANNELS) {
            *slot = self.read_params(channel)?;
        }
        Ok(all)
    }

    /// Pulse rate of one channel (Hz).
    pub fn pulse_rate(&mut self, channel: u8) -> Result<f64, QclError> {
        self.require_connected("pulse_rate")?;
        channel_index(channel)?;
        self.read_channel(EntryPoint::GetQclPulseRate, channel, |d, ch| d.qcl_pulse_rate(ch))
    }

    /// Pulse width of one channel (µs).
    pub fn pulse_width(&mut self, channel: u8) -> Result<f64, QclError> {
        self.require_connected("pulse_width")?;
        channel_index(channel)?;
        self.read_channel(EntryPoint::GetQclPulseWidth, channel, |d, ch| d.qcl_pulse_width(ch))
    }

    /// Drive current of one channel (mA).
    pub fn current(&mut self, channel: u8) -> Result<f64, QclError> {
        self.require_connected("current")?;
        channel_index(channel)?;
        self.read_channel(EntryPoint::GetQclCurrent, channel, |d, ch| d.qcl_current(ch))
    }

    fn read_params(&mut self, channel: u8) -> Result<QclParams, QclError> {
        Ok(QclParams {
            channel,
            pulse_rate_hz: self.read_channel(EntryPoint::GetQclPulseRate, channel, |d, ch| {
                d.qcl_pulse_rate(ch)
            })?,
            pulse_width_us: self.read_channel(EntryPoint::GetQclPulseWidth, channel, |d, ch| {
                d.qcl_pulse_width(ch)
            })?,
            current_ma: self.read_channel(EntryPoint::GetQclCurrent, channel, |d, ch| {
                d.qcl_current(ch)
            })?,
        })
    }

    fn read_channel(
        &mut self,
        entry: EntryPoint,
        channel: u8,
        read: fn(&dyn QclDriver, u8) -> Response<f32>,
    ) -> Result<f64, QclError> {
        let value = self.call(entry, move |d| read(d, channel))?;
        Ok(f64::from(value))
    }

    // ─── Sweep Scan ─────────────────────────────────────────────────

    /// Start a sweep scan. Progress is polled with [`scan_status`](Self::scan_status).
    pub fn start_sweep_scan(&mut self, request: &SweepScanRequest) -> Result<(), QclError> {
        self.require_connected("start_sweep_scan")?;
        request.validate()?;

        let args = SweepScanArgs {
            start: request.start as f32,
            end: request.end as f32,
            speed: request.speed as f32,
            units: request.unit.sdk_code(),
            repetitions: request.repetitions,
            bidirectional: request.bidirectional,
        };
        info!(
            unit = %request.unit,
            start = request.start,
            end = request.end,
            speed = request.speed,
            repetitions = request.repetitions,
            bidirectional = request.bidirectional,
            "starting sweep scan"
        );
        self.call(EntryPoint::StartSweepScan, move |d| d.start_sweep_scan(args))
    }

    /// Stop the scan in progress.
    pub fn stop_scan(&mut self) -> Result<(), QclError> {
        self.require_connected("stop_scan")?;
        info!("stopping scan");
        self.call(EntryPoint::StopScanInProgress, |d| d.stop_scan())
    }

    /// Pause the scan in progress.
    pub fn pause_scan(&mut self) -> Result<(), QclError> {
        self.require_connected("pause_scan")?;
        info!("pausing scan");
        self.call(EntryPoint::PauseScanInProgress, |d| d.pause_scan())
    }

    /// Resume a paused scan.
    pub fn resume_scan(&mut self) -> Result<(), QclError> {
        self.require_connected("resume_scan")?;
        info!("resuming scan");
        self.call(EntryPoint::ResumeScanInProgress, |d| d.resume_scan())
    }

    /// Read scan progress in one query and update the scan snapshot.
    pub fn scan_status(&mut self) -> Result<ScanStatus, QclError> {
        self.require_connected("scan_status")?;
        let entry = EntryPoint::GetScanStatus;
        let reading = self.call(entry, |d| d.scan_status())?;
        let units = decode_units(entry, reading.units)?;
        let ww = WwPair::from_value(f64::from(reading.current_ww), units);
        self.scan_status.update(&reading, ww, units);
        Ok(self.scan_status.clone())
    }

    // ─── Status ─────────────────────────────────────────────────────

    /// Full status.
    ///
    /// While connected, every field is re-read from the driver in display
    /// order; a failed read leaves the remaining fields at their previous
    /// value. While disconnected, returns the snapshot without driver calls.
    pub fn status(&mut self) -> Result<LaserStatus, QclError> {
        if self.is_connected() {
            self.read_qcl_count()?;
            self.read_interlock()?;
            self.read_key_switch()?;
            self.read_armed()?;
            self.read_emitting()?;
            self.read_tuned()?;
            self.read_ww()?;
        }
        Ok(self.status.clone())
    }

    /// Installed QCL count.
    pub fn qcl_count(&mut self) -> Result<u8, QclError> {
        self.require_connected("qcl_count")?;
        self.read_qcl_count()
    }

    /// Interlock status.
    pub fn interlock_set(&mut self) -> Result<bool, QclError> {
        self.require_connected("interlock_set")?;
        self.read_interlock()
    }

    /// Key switch status.
    pub fn key_switch_set(&mut self) -> Result<bool, QclError> {
        self.require_connected("key_switch_set")?;
        self.read_key_switch()
    }

    /// Armed status.
    pub fn is_armed(&mut self) -> Result<bool, QclError> {
        self.require_connected("is_armed")?;
        self.read_armed()
    }

    /// Emission status.
    pub fn is_emitting(&mut self) -> Result<bool, QclError> {
        self.require_connected("is_emitting")?;
        self.read_emitting()
    }

    /// Tuned status.
    pub fn is_tuned(&mut self) -> Result<bool, QclError> {
        self.require_connected("is_tuned")?;
        self.read_tuned()
    }

    /// Current wavelength / wavenumber.
    pub fn actual_ww(&mut self) -> Result<WwPair, QclError> {
        self.require_connected("actual_ww")?;
        self.read_ww()
    }

    /// Whether the controller still reports the link up.
    pub fn is_connected_to_laser(&mut self) -> Result<bool, QclError> {
        self.require_connected("is_connected_to_laser")?;
        self.read_connected()
    }

    /// Controller SDK version.
    pub fn api_version(&mut self) -> Result<ApiVersion, QclError> {
        self.require_connected("api_version")?;
        self.call(EntryPoint::GetApiVersion, |d| d.api_version())
    }

    fn read_qcl_count(&mut self) -> Result<u8, QclError> {
        let count = self.call(EntryPoint::GetNumInstalledQcls, |d| d.num_installed_qcls())?;
        self.status.set_qcl_count(count);
        Ok(count)
    }

    fn read_interlock(&mut self) -> Result<bool, QclError> {
        let set = self.call(EntryPoint::IsInterlockedStatusSet, |d| d.is_interlock_set())?;
        self.status.set_interlock_set(set);
        Ok(set)
    }

    fn read_key_switch(&mut self) -> Result<bool, QclError> {
        let set = self.call(EntryPoint::IsKeySwitchStatusSet, |d| d.is_key_switch_set())?;
        self.status.set_key_switch_set(set);
        Ok(set)
    }

    fn read_armed(&mut self) -> Result<bool, QclError> {
        let armed = self.call(EntryPoint::IsLaserArmed, |d| d.is_laser_armed())?;
        self.status.set_armed(armed);
        Ok(armed)
    }

    fn read_emitting(&mut self) -> Result<bool, QclError> {
        let on = self.call(EntryPoint::IsEmissionOn, |d| d.is_emission_on())?;
        self.status.set_emitting(on);
        Ok(on)
    }

    fn read_tuned(&mut self) -> Result<bool, QclError> {
        let tuned = self.call(EntryPoint::IsTuned, |d| d.is_tuned())?;
        self.status.set_tuned(tuned);
        Ok(tuned)
    }

    fn read_ww(&mut self) -> Result<WwPair, QclError> {
        let entry = EntryPoint::GetActualWw;
        let reading = self.call(entry, |d| d.actual_ww())?;
        let units = decode_units(entry, reading.units)?;
        let pair = WwPair::from_value(f64::from(reading.value), units);
        self.status.set_ww(pair);
        Ok(pair)
    }

    /// Connection check. "Not initialized" means no session, not a failure.
    fn read_connected(&mut self) -> Result<bool, QclError> {
        match self.adapter.call(
            EntryPoint::IsConnectedToLaser,
            self.timing.call_timeout,
            |d| d.is_connected(),
        ) {
            Ok(connected) => Ok(connected),
            Err(e) if e.code() == Some(RET_NOT_INITIALIZED) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    // ─── Internals ──────────────────────────────────────────────────

    fn require_connected(&self, op: &'static str) -> Result<(), QclError> {
        if self.is_connected() {
            Ok(())
        } else {
            debug!(op, state = ?self.state, "rejected: not connected");
            Err(QclError::NotConnected(op))
        }
    }

    fn mark_disconnected(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.status.set_connected(false);
    }

    /// Guarded call with the configured call bound.
    ///
    /// A "not initialized" answer while connected means the controller lost
    /// the session; the device drops back to disconnected.
    fn call<T, F>(&mut self, entry: EntryPoint, f: F) -> Result<T, QclError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn QclDriver) -> Response<T> + Send + 'static,
    {
        let result = self.adapter.call(entry, self.timing.call_timeout, f);
        if let Err(e) = &result {
            if e.code() == Some(RET_NOT_INITIALIZED) && self.is_connected() {
                warn!(%entry, "controller reports no session, marking device disconnected");
                self.mark_disconnected();
            }
        }
        result.map_err(QclError::from)
    }

    fn wait_for<P>(
        &mut self,
        condition: Condition,
        target: bool,
        timeout: Duration,
        mut check: P,
    ) -> Result<(), QclError>
    where
        P: FnMut(&mut Self) -> Result<bool, QclError>,
    {
        let poll_interval = self.timing.poll_interval;
        debug!(%condition, target, ?timeout, "waiting for condition");

        try_wait_until(|| check(self), target, poll_interval, timeout).map_err(|e| match e {
            WaitError::Timeout(t) => {
                warn!(%condition, target, last = ?t.last, ?timeout, "condition wait timed out");
                QclError::WaitTimeout {
                    condition,
                    target,
                    last: t.last,
                    timeout,
                }
            }
            WaitError::Check(err) => err,
        })
    }
}

fn decode_units(entry: EntryPoint, code: u8) -> Result<Unit, DriverError> {
    Unit::from_sdk_code(code).map_err(|_| DriverError::UnknownUnits { entry, code })
}

impl Drop for QclDevice {
    fn drop(&mut self) {
        if !self.is_connected() {
            return;
        }
        if let Err(e) = self.disconnect() {
            warn!(error = %e, "disconnect on drop failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::simulation::SimulationDriver;

    fn fast_timing() -> TimingConfig {
        TimingConfig {
            call_timeout: Duration::from_secs(1),
            poll_interval: Duration::from_millis(5),
            connect_timeout: Duration::from_secs(1),
            disconnect_timeout: Duration::from_secs(1),
            arm_timeout: Duration::from_secs(1),
            disarm_timeout: Duration::from_secs(1),
            emission_timeout: Duration::from_secs(1),
            tune_timeout: Duration::from_secs(1),
        }
    }

    fn device() -> QclDevice {
        QclDevice::new(Arc::new(SimulationDriver::default()), fast_timing(), 1).unwrap()
    }

    #[test]
    fn starts_disconnected_with_unknown_snapshot() {
        let mut dev = device();
        assert_eq!(dev.state(), ConnectionState::Disconnected);
        let status = dev.status().unwrap();
        assert!(!status.connected());
        assert_eq!(status.armed(), None);
        assert_eq!(dev.diagnostics().calls, 0);
    }

    #[test]
    fn operations_require_connection() {
        let mut dev = device();
        assert!(matches!(dev.arm(), Err(QclError::NotConnected("arm"))));
        assert!(matches!(
            dev.tune(Unit::Wavelength, 7.0),
            Err(QclError::NotConnected("tune"))
        ));
        assert!(matches!(
            dev.scan_status(),
            Err(QclError::NotConnected("scan_status"))
        ));
        assert!(matches!(
            dev.disconnect(),
            Err(QclError::NotConnected("disconnect"))
        ));
        assert_eq!(dev.diagnostics().calls, 0);
    }

    #[test]
    fn construction_rejects_bad_timing_and_preferred_qcl() {
        let driver: Arc<dyn QclDriver> = Arc::new(SimulationDriver::default());
        let busy_poll = TimingConfig {
            poll_interval: Duration::ZERO,
            ..fast_timing()
        };
        assert!(matches!(
            QclDevice::new(driver.clone(), busy_poll, 1),
            Err(QclError::Config(_))
        ));
        assert!(matches!(
            QclDevice::new(driver.clone(), fast_timing(), 5),
            Err(QclError::Validation(_))
        ));
        assert!(QclDevice::new(driver, fast_timing(), 4).is_ok());
    }

    #[test]
    fn connect_is_idempotent() {
        let mut dev = device();
        dev.connect().unwrap();
        let calls = dev.diagnostics().calls;
        dev.connect().unwrap();
        assert_eq!(dev.diagnostics().calls, calls);
        assert!(dev.snapshot().connected());
    }

    #[test]
    fn validation_runs_after_connection_check() {
        let mut dev = device();
        assert!(matches!(
            dev.set_qcl_params(9, 1000.0, 1.0, 100.0),
            Err(QclError::NotConnected(_))
        ));
        dev.connect().unwrap();
        let before = dev.diagnostics().calls;
        assert!(matches!(
            dev.set_qcl_params(9, 1000.0, 1.0, 100.0),
            Err(QclError::Validation(_))
        ));
        assert_eq!(dev.diagnostics().calls, before);
    }

    #[test]
    fn drop_disconnects_connected_device() {
        let driver = Arc::new(SimulationDriver::default());
        {
            let mut dev = QclDevice::new(driver.clone(), fast_timing(), 1).unwrap();
            dev.connect().unwrap();
            assert!(driver.is_connected().value);
        }
        assert!(!driver.is_connected().value);
    }
}
