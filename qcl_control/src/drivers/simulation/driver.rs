//! Simulation driver implementation.
//!
//! The `SimulationDriver` implements the `QclDriver` trait to emulate a
//! four-QCL controller for development and testing without hardware. It
//! enforces the controller's ordering rules (session before anything else,
//! interlocks before arming, arming before tuning, tuning before emission)
//! and answers with the vendor return codes a real controller would use.

use super::state::{ChannelState, SimFlags, SimState, SweepScan, to_microns};
use super::SimulationSettings;
use parking_lot::Mutex;
use qcl_common::codes::{
    RET_ALREADY_CREATED, RET_CURRENT_OUTOFRANGE, RET_EMISSION_ALREADY_OFF,
    RET_EMISSION_ALREADY_ON, RET_INTERLOCKS_KEYSWITCH_NOTSET, RET_LASER_ALREADY_ARMED,
    RET_LASER_ALREADY_DISARMED, RET_LASER_NOT_ARMED, RET_LASER_NOT_TUNED, RET_NO_SCAN_INPROGRESS,
    RET_NOT_INITIALIZED, RET_PAUSE_SCAN_FAILURE, RET_PULSERATE_OUTOFRANGE,
    RET_PULSEWIDTH_OUTOFRANGE, RET_QCL_NUM_OUTOFRANGE, RET_RESUME_SCAN_FAILURE,
    RET_START_SWEEPSCAN_FAILURE, RET_STARTTUNE_FAILURE, RET_WW_OUTOFTUNINGRANGE,
};
use qcl_common::consts::{
    PULSE_RATE_MAX_HZ, PULSE_RATE_MIN_HZ, PULSE_WIDTH_MAX_US, PULSE_WIDTH_MIN_US,
    QCL_CURRENT_LIMITS_MA,
};
use qcl_common::driver::{
    ApiVersion, QclDriver, Response, ScanReading, SweepScanArgs, WwReading,
};
use qcl_common::units::Unit;
use std::time::Instant;
use tracing::{debug, info};

/// SDK version the simulator reports.
const SIM_API_VERSION: ApiVersion = ApiVersion {
    major: 2,
    minor: 5,
    patch: 0,
};

/// Simulation driver implementing the QclDriver trait.
pub struct SimulationDriver {
    settings: SimulationSettings,
    state: Mutex<SimState>,
}

impl SimulationDriver {
    /// Create a simulator with the given settings.
    pub fn new(settings: SimulationSettings) -> Self {
        let state = SimState::new(settings.interlock_set, settings.key_switch_set);
        Self {
            settings,
            state: Mutex::new(state),
        }
    }

    /// Settings in use.
    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Open or close the interlock, as an operator would at the bench.
    ///
    /// Opening it while armed disarms the laser.
    pub fn set_interlock(&self, closed: bool) {
        let mut state = self.state.lock();
        state.flags.set(SimFlags::INTERLOCK, closed);
        if !closed {
            drop_arming(&mut state);
        }
    }

    /// Turn the key switch, as an operator would at the bench.
    pub fn set_key_switch(&self, on: bool) {
        let mut state = self.state.lock();
        state.flags.set(SimFlags::KEY_SWITCH, on);
        if !on {
            drop_arming(&mut state);
        }
    }

    /// Lock the state after applying due transitions.
    fn settled(&self) -> parking_lot::MutexGuard<'_, SimState> {
        let mut state = self.state.lock();
        state.settle(Instant::now());
        state
    }

    /// Run `f` only with an open session.
    fn with_session<T: Default>(&self, f: impl FnOnce(&mut SimState) -> Response<T>) -> Response<T> {
        let mut state = self.settled();
        if !state.is_connected() {
            return Response::error(RET_NOT_INITIALIZED);
        }
        f(&mut state)
    }

    fn query_flag(&self, flag: SimFlags) -> Response<bool> {
        self.with_session(|state| Response::ok(state.flags.contains(flag)))
    }

    fn channel_index(&self, qcl: u8) -> Option<usize> {
        (1..=self.settings.qcl_count)
            .contains(&qcl)
            .then(|| usize::from(qcl) - 1)
    }

    fn in_tuning_range(&self, um: f32) -> bool {
        let [lo, hi] = self.settings.tuning_range_um;
        (lo..=hi).contains(&f64::from(um))
    }

    fn read_channel(&self, qcl: u8, read: impl FnOnce(&ChannelState) -> f32) -> Response<f32> {
        let Some(idx) = self.channel_index(qcl) else {
            return Response::error(RET_QCL_NUM_OUTOFRANGE);
        };
        self.with_session(|state| Response::ok(read(&state.channels[idx])))
    }
}

impl Default for SimulationDriver {
    fn default() -> Self {
        Self::new(SimulationSettings::default())
    }
}

fn drop_arming(state: &mut SimState) {
    state.arm_due = None;
    state.emission_due = None;
    state.flags.remove(SimFlags::ARMED | SimFlags::EMITTING);
}

impl QclDriver for SimulationDriver {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn api_version(&self) -> Response<ApiVersion> {
        self.with_session(|_| Response::ok(SIM_API_VERSION))
    }

    fn initialize(&self) -> Response<()> {
        let mut state = self.settled();
        if state.is_connected() || state.connect_due.is_some() {
            return Response::error(RET_ALREADY_CREATED);
        }
        info!(
            qcl_count = self.settings.qcl_count,
            "Initializing simulation driver"
        );
        state.connect_due = Some(Instant::now() + self.settings.connect_delay());
        Response::ok(())
    }

    fn deinitialize(&self) -> Response<()> {
        let mut state = self.settled();
        if !state.is_connected() && state.connect_due.is_none() {
            return Response::error(RET_NOT_INITIALIZED);
        }
        info!("Shutting down simulation driver");
        state.reset_session();
        Response::ok(())
    }

    fn is_connected(&self) -> Response<bool> {
        Response::ok(self.settled().is_connected())
    }

    fn num_installed_qcls(&self) -> Response<u8> {
        let count = self.settings.qcl_count;
        self.with_session(|_| Response::ok(count))
    }

    fn is_interlock_set(&self) -> Response<bool> {
        self.query_flag(SimFlags::INTERLOCK)
    }

    fn is_key_switch_set(&self) -> Response<bool> {
        self.query_flag(SimFlags::KEY_SWITCH)
    }

    fn arm_laser(&self) -> Response<()> {
        let delay = self.settings.arm_delay();
        self.with_session(|state| {
            if !state.flags.contains(SimFlags::INTERLOCK | SimFlags::KEY_SWITCH) {
                return Response::error(RET_INTERLOCKS_KEYSWITCH_NOTSET);
            }
            if state.flags.contains(SimFlags::ARMED) || state.arm_due.is_some() {
                return Response::error(RET_LASER_ALREADY_ARMED);
            }
            debug!(?delay, "arming, TECs settling");
            state.arm_due = Some(Instant::now() + delay);
            Response::ok(())
        })
    }

    fn disarm_laser(&self) -> Response<()> {
        self.with_session(|state| {
            if !state.flags.contains(SimFlags::ARMED) && state.arm_due.is_none() {
                return Response::error(RET_LASER_ALREADY_DISARMED);
            }
            drop_arming(state);
            Response::ok(())
        })
    }

    fn is_laser_armed(&self) -> Response<bool> {
        self.query_flag(SimFlags::ARMED)
    }

    fn tune_to_ww(&self, target: f32, units: u8, preferred_qcl: u8) -> Response<()> {
        if self.channel_index(preferred_qcl).is_none() {
            return Response::error(RET_QCL_NUM_OUTOFRANGE);
        }
        let Some(target_um) = to_microns(target, units) else {
            return Response::error(RET_STARTTUNE_FAILURE);
        };
        let in_range = self.in_tuning_range(target_um);
        let delay = self.settings.tune_delay();

        self.with_session(|state| {
            if !state.flags.contains(SimFlags::ARMED) {
                return Response::error(RET_LASER_NOT_ARMED);
            }
            if !in_range {
                return Response::error(RET_WW_OUTOFTUNINGRANGE);
            }
            debug!(target, units, preferred_qcl, target_um, ?delay, "tuning");
            state.flags.remove(SimFlags::TUNED);
            state.target_um = target_um;
            state.tune_due = Some(Instant::now() + delay);
            Response::ok(())
        })
    }

    fn is_tuned(&self) -> Response<bool> {
        self.query_flag(SimFlags::TUNED)
    }

    fn actual_ww(&self) -> Response<WwReading> {
        self.with_session(|state| {
            Response::ok(WwReading {
                value: state.position_um,
                units: Unit::SDK_MICRONS,
                light_valid: state.flags.contains(SimFlags::EMITTING),
            })
        })
    }

    fn turn_emission_on(&self) -> Response<()> {
        let delay = self.settings.emission_delay();
        self.with_session(|state| {
            if !state.flags.contains(SimFlags::ARMED) {
                return Response::error(RET_LASER_NOT_ARMED);
            }
            if !state.flags.contains(SimFlags::TUNED) {
                return Response::error(RET_LASER_NOT_TUNED);
            }
            if state.flags.contains(SimFlags::EMITTING) {
                return Response::error(RET_EMISSION_ALREADY_ON);
            }
            state.emission_due = Some((true, Instant::now() + delay));
            Response::ok(())
        })
    }

    fn turn_emission_off(&self) -> Response<()> {
        let delay = self.settings.emission_delay();
        self.with_session(|state| {
            if !state.flags.contains(SimFlags::EMITTING) {
                return Response::error(RET_EMISSION_ALREADY_OFF);
            }
            state.emission_due = Some((false, Instant::now() + delay));
            Response::ok(())
        })
    }

    fn is_emission_on(&self) -> Response<bool> {
        self.query_flag(SimFlags::EMITTING)
    }

    fn qcl_pulse_rate(&self, qcl: u8) -> Response<f32> {
        self.read_channel(qcl, |ch| ch.pulse_rate)
    }

    fn qcl_pulse_width(&self, qcl: u8) -> Response<f32> {
        self.read_channel(qcl, |ch| ch.pulse_width)
    }

    fn qcl_current(&self, qcl: u8) -> Response<f32> {
        self.read_channel(qcl, |ch| ch.current)
    }

    fn set_qcl_params(
        &self,
        qcl: u8,
        pulse_rate: f32,
        pulse_width: f32,
        current: f32,
    ) -> Response<()> {
        let Some(idx) = self.channel_index(qcl) else {
            return Response::error(RET_QCL_NUM_OUTOFRANGE);
        };
        if !(PULSE_RATE_MIN_HZ..=PULSE_RATE_MAX_HZ).contains(&f64::from(pulse_rate)) {
            return Response::error(RET_PULSERATE_OUTOFRANGE);
        }
        if !(PULSE_WIDTH_MIN_US..=PULSE_WIDTH_MAX_US).contains(&f64::from(pulse_width)) {
            return Response::error(RET_PULSEWIDTH_OUTOFRANGE);
        }
        if !(0.0..=QCL_CURRENT_LIMITS_MA[idx]).contains(&f64::from(current)) {
            return Response::error(RET_CURRENT_OUTOFRANGE);
        }
        self.with_session(|state| {
            state.channels[idx].pulse_rate = pulse_rate;
            state.channels[idx].pulse_width = pulse_width;
            state.channels[idx].current = current;
            Response::ok(())
        })
    }

    fn start_sweep_scan(&self, args: SweepScanArgs) -> Response<()> {
        let (Some(start_um), Some(end_um)) =
            (to_microns(args.start, args.units), to_microns(args.end, args.units))
        else {
            return Response::error(RET_START_SWEEPSCAN_FAILURE);
        };
        if !(args.speed > 0.0) || args.repetitions == 0 {
            return Response::error(RET_START_SWEEPSCAN_FAILURE);
        }
        let in_range = self.in_tuning_range(start_um) && self.in_tuning_range(end_um);

        self.with_session(|state| {
            if !state.flags.contains(SimFlags::ARMED) {
                return Response::error(RET_LASER_NOT_ARMED);
            }
            if state.scan.is_some() {
                return Response::error(RET_START_SWEEPSCAN_FAILURE);
            }
            if !in_range {
                return Response::error(RET_WW_OUTOFTUNINGRANGE);
            }
            debug!(?args, "sweep scan started");
            state.scan = Some(SweepScan::new(args, Instant::now()));
            state.flags.insert(SimFlags::SCAN_ACTIVE);
            state.flags.remove(SimFlags::TUNED);
            Response::ok(())
        })
    }

    fn stop_scan(&self) -> Response<()> {
        self.with_session(|state| {
            if state.scan.take().is_none() {
                return Response::error(RET_NO_SCAN_INPROGRESS);
            }
            state.flags.remove(SimFlags::SCAN_ACTIVE | SimFlags::SCAN_PAUSED);
            Response::ok(())
        })
    }

    fn pause_scan(&self) -> Response<()> {
        self.with_session(|state| {
            let Some(scan) = state.scan.as_mut() else {
                return Response::error(RET_NO_SCAN_INPROGRESS);
            };
            if scan.is_paused() {
                return Response::error(RET_PAUSE_SCAN_FAILURE);
            }
            scan.pause(Instant::now());
            state.flags.insert(SimFlags::SCAN_PAUSED);
            Response::ok(())
        })
    }

    fn resume_scan(&self) -> Response<()> {
        self.with_session(|state| {
            let Some(scan) = state.scan.as_mut() else {
                return Response::error(RET_NO_SCAN_INPROGRESS);
            };
            if !scan.is_paused() {
                return Response::error(RET_RESUME_SCAN_FAILURE);
            }
            scan.resume(Instant::now());
            state.flags.remove(SimFlags::SCAN_PAUSED);
            Response::ok(())
        })
    }

    fn scan_status(&self) -> Response<ScanReading> {
        self.with_session(|state| {
            let reading = match &state.scan {
                Some(scan) => {
                    let progress = scan.progress(Instant::now());
                    ScanReading {
                        in_progress: true,
                        active: !scan.is_paused(),
                        paused: scan.is_paused(),
                        repetition: progress.repetition,
                        percent: progress.percent,
                        current_ww: progress.position,
                        units: scan.args.units,
                        tec_in_progress: false,
                        motion_in_progress: !scan.is_paused(),
                    }
                }
                None => ScanReading {
                    current_ww: state.position_um,
                    units: Unit::SDK_MICRONS,
                    tec_in_progress: state.arm_due.is_some(),
                    motion_in_progress: state.tune_due.is_some(),
                    ..ScanReading::default()
                },
            };
            Response::ok(reading)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    fn instant_settings() -> SimulationSettings {
        SimulationSettings {
            arm_delay_s: 0.0,
            tune_delay_s: 0.0,
            emission_delay_s: 0.0,
            connect_delay_s: 0.0,
            ..SimulationSettings::default()
        }
    }

    fn connected(settings: SimulationSettings) -> SimulationDriver {
        let driver = SimulationDriver::new(settings);
        assert!(driver.initialize().is_success());
        assert!(driver.is_connected().value);
        driver
    }

    #[test]
    fn queries_before_initialize_report_not_initialized() {
        let driver = SimulationDriver::default();
        assert_eq!(driver.is_connected(), Response::ok(false));
        assert_eq!(driver.is_laser_armed().code, RET_NOT_INITIALIZED);
        assert_eq!(driver.arm_laser().code, RET_NOT_INITIALIZED);
        assert_eq!(driver.deinitialize().code, RET_NOT_INITIALIZED);
    }

    #[test]
    fn second_initialize_is_rejected() {
        let driver = connected(instant_settings());
        assert_eq!(driver.initialize().code, RET_ALREADY_CREATED);
    }

    #[test]
    fn arming_needs_interlock_and_key_switch() {
        let driver = connected(SimulationSettings {
            key_switch_set: false,
            ..instant_settings()
        });
        assert_eq!(driver.arm_laser().code, RET_INTERLOCKS_KEYSWITCH_NOTSET);
        driver.set_key_switch(true);
        assert!(driver.arm_laser().is_success());
        assert_eq!(driver.is_laser_armed(), Response::ok(true));
        assert_eq!(driver.arm_laser().code, RET_LASER_ALREADY_ARMED);
    }

    #[test]
    fn tune_requires_arming_and_range() {
        let driver = connected(instant_settings());
        assert_eq!(
            driver.tune_to_ww(7.0, Unit::SDK_MICRONS, 1).code,
            RET_LASER_NOT_ARMED
        );
        driver.arm_laser();
        assert_eq!(
            driver.tune_to_ww(20.0, Unit::SDK_MICRONS, 1).code,
            RET_WW_OUTOFTUNINGRANGE
        );
        assert_eq!(
            driver.tune_to_ww(7.0, Unit::SDK_MICRONS, 9).code,
            RET_QCL_NUM_OUTOFRANGE
        );
        assert!(driver.tune_to_ww(1250.0, Unit::SDK_CM1, 1).is_success());
        assert_eq!(driver.is_tuned(), Response::ok(true));
        let ww = driver.actual_ww().value;
        assert!((ww.value - 8.0).abs() < 1e-4);
        assert_eq!(ww.units, Unit::SDK_MICRONS);
    }

    #[test]
    fn arm_delay_is_observed_by_polling() {
        let driver = connected(SimulationSettings {
            arm_delay_s: 0.05,
            ..instant_settings()
        });
        driver.arm_laser();
        assert_eq!(driver.is_laser_armed(), Response::ok(false));
        thread::sleep(Duration::from_millis(80));
        assert_eq!(driver.is_laser_armed(), Response::ok(true));
    }

    #[test]
    fn emission_needs_tuning() {
        let driver = connected(instant_settings());
        driver.arm_laser();
        assert_eq!(driver.turn_emission_on().code, RET_LASER_NOT_TUNED);
        driver.tune_to_ww(7.0, Unit::SDK_MICRONS, 1);
        assert!(driver.turn_emission_on().is_success());
        assert_eq!(driver.turn_emission_on().code, RET_EMISSION_ALREADY_ON);
        assert!(driver.actual_ww().value.light_valid);

        driver.set_interlock(false);
        assert_eq!(driver.is_emission_on(), Response::ok(false));
        assert_eq!(driver.is_laser_armed(), Response::ok(false));
    }

    #[test]
    fn controller_rechecks_channel_bounds() {
        let driver = connected(SimulationSettings {
            qcl_count: 2,
            ..instant_settings()
        });
        assert_eq!(driver.qcl_current(3).code, RET_QCL_NUM_OUTOFRANGE);
        assert_eq!(
            driver.set_qcl_params(1, 5.0, 1.0, 100.0).code,
            RET_PULSERATE_OUTOFRANGE
        );
        assert_eq!(
            driver.set_qcl_params(2, 1000.0, 1.0, 900.0).code,
            RET_CURRENT_OUTOFRANGE
        );
        assert!(driver.set_qcl_params(2, 2000.0, 2.0, 500.0).is_success());
        assert_eq!(driver.qcl_pulse_rate(2), Response::ok(2000.0));
        assert_eq!(driver.qcl_current(2), Response::ok(500.0));
    }

    #[test]
    fn scan_commands_follow_scan_state() {
        let driver = connected(instant_settings());
        assert_eq!(driver.stop_scan().code, RET_NO_SCAN_INPROGRESS);
        driver.arm_laser();

        let args = SweepScanArgs {
            start: 1100.0,
            end: 1200.0,
            speed: 10.0,
            units: Unit::SDK_CM1,
            repetitions: 1,
            bidirectional: false,
        };
        assert!(driver.start_sweep_scan(args).is_success());
        assert_eq!(driver.start_sweep_scan(args).code, RET_START_SWEEPSCAN_FAILURE);
        assert_eq!(driver.resume_scan().code, RET_RESUME_SCAN_FAILURE);

        let reading = driver.scan_status().value;
        assert!(reading.in_progress && reading.active);
        assert_eq!(reading.units, Unit::SDK_CM1);

        assert!(driver.pause_scan().is_success());
        assert_eq!(driver.pause_scan().code, RET_PAUSE_SCAN_FAILURE);
        assert!(driver.scan_status().value.paused);
        assert!(driver.resume_scan().is_success());
        assert!(driver.stop_scan().is_success());
        assert!(!driver.scan_status().value.in_progress);
    }

    #[test]
    fn deinitialize_resets_session_but_not_switches() {
        let driver = connected(instant_settings());
        driver.arm_laser();
        assert!(driver.deinitialize().is_success());
        assert_eq!(driver.is_connected(), Response::ok(false));
        assert!(driver.initialize().is_success());
        assert_eq!(driver.is_laser_armed(), Response::ok(false));
        assert_eq!(driver.is_interlock_set(), Response::ok(true));
    }

    #[test]
    fn deinitialize_cancels_pending_connect() {
        let driver = SimulationDriver::new(SimulationSettings {
            connect_delay_s: 0.05,
            ..instant_settings()
        });
        assert!(driver.initialize().is_success());
        assert!(driver.deinitialize().is_success());
        thread::sleep(Duration::from_millis(80));
        assert_eq!(driver.is_connected(), Response::ok(false));
        assert!(driver.initialize().is_success());
    }
}
