//! Emulated controller state.
//!
//! Slow hardware transitions (connect, arm, tune, emission) are modeled as
//! due times: the request records when the transition completes and every
//! later query settles the state against the clock first. Sweep scans are
//! pure functions of elapsed active time.

use bitflags::bitflags;
use qcl_common::consts::{QCL_CHANNEL_COUNT, QCL_CURRENT_LIMITS_MA};
use qcl_common::driver::SweepScanArgs;
use qcl_common::units::{Unit, reciprocal};
use std::time::{Duration, Instant};

bitflags! {
    /// Controller status bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SimFlags: u16 {
        /// Session open.
        const CONNECTED   = 1 << 0;
        /// Laser armed.
        const ARMED       = 1 << 1;
        /// Emission on.
        const EMITTING    = 1 << 2;
        /// Tuning complete.
        const TUNED       = 1 << 3;
        /// Interlock closed.
        const INTERLOCK   = 1 << 4;
        /// Key switch on.
        const KEY_SWITCH  = 1 << 5;
        /// Sweep scan running.
        const SCAN_ACTIVE = 1 << 6;
        /// Sweep scan paused.
        const SCAN_PAUSED = 1 << 7;
    }
}

/// Electrical settings of one emulated channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelState {
    pub pulse_rate: f32,
    pub pulse_width: f32,
    pub current: f32,
}

/// Convert a position in SDK unit `units` to µm. `None` for unknown codes.
pub fn to_microns(value: f32, units: u8) -> Option<f32> {
    match Unit::from_sdk_code(units).ok()? {
        Unit::Wavelength => Some(value),
        Unit::Wavenumber => Some(reciprocal(f64::from(value)) as f32),
    }
}

/// Progress of a sweep at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepProgress {
    /// 1-based repetition.
    pub repetition: u16,
    /// Percent of the current repetition.
    pub percent: u16,
    /// Position in the scan's units.
    pub position: f32,
    /// All repetitions done.
    pub finished: bool,
}

/// Running sweep scan.
#[derive(Debug, Clone)]
pub struct SweepScan {
    pub args: SweepScanArgs,
    started: Instant,
    paused_at: Option<Instant>,
    paused_total: Duration,
}

impl SweepScan {
    pub fn new(args: SweepScanArgs, now: Instant) -> Self {
        Self {
            args,
            started: now,
            paused_at: None,
            paused_total: Duration::ZERO,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn pause(&mut self, now: Instant) {
        self.paused_at.get_or_insert(now);
    }

    pub fn resume(&mut self, now: Instant) {
        if let Some(at) = self.paused_at.take() {
            self.paused_total += now.saturating_duration_since(at);
        }
    }

    /// Time spent sweeping, excluding pauses.
    fn active_time(&self, now: Instant) -> Duration {
        let until = self.paused_at.unwrap_or(now);
        until
            .saturating_duration_since(self.started)
            .saturating_sub(self.paused_total)
    }

    /// Duration of one pass from start to end.
    fn pass_time(&self) -> f64 {
        let span = f64::from((self.args.end - self.args.start).abs());
        (span / f64::from(self.args.speed)).max(1e-3)
    }

    pub fn progress(&self, now: Instant) -> SweepProgress {
        let pass = self.pass_time();
        let elapsed = self.active_time(now).as_secs_f64();
        let reps = self.args.repetitions.max(1);
        let index = (elapsed / pass).floor();

        if index >= f64::from(reps) {
            let last_reversed = self.args.bidirectional && reps % 2 == 0;
            let position = if last_reversed {
                self.args.start
            } else {
                self.args.end
            };
            return SweepProgress {
                repetition: reps,
                percent: 100,
                position,
                finished: true,
            };
        }

        let fraction = (elapsed - index * pass) / pass;
        let reversed = self.args.bidirectional && (index as u32) % 2 == 1;
        let (from, to) = if reversed {
            (self.args.end, self.args.start)
        } else {
            (self.args.start, self.args.end)
        };
        SweepProgress {
            repetition: index as u16 + 1,
            percent: (fraction * 100.0).clamp(0.0, 100.0) as u16,
            position: from + (to - from) * fraction as f32,
            finished: false,
        }
    }
}

/// Whole emulated controller.
#[derive(Debug)]
pub struct SimState {
    pub flags: SimFlags,
    pub connect_due: Option<Instant>,
    pub arm_due: Option<Instant>,
    pub tune_due: Option<Instant>,
    /// Pending emission change: (target, due).
    pub emission_due: Option<(bool, Instant)>,
    /// Current position (µm), 0 before the first tune.
    pub position_um: f32,
    /// Position being tuned to (µm).
    pub target_um: f32,
    pub channels: [ChannelState; QCL_CHANNEL_COUNT],
    pub scan: Option<SweepScan>,
}

impl SimState {
    pub fn new(interlock_set: bool, key_switch_set: bool) -> Self {
        let mut flags = SimFlags::empty();
        flags.set(SimFlags::INTERLOCK, interlock_set);
        flags.set(SimFlags::KEY_SWITCH, key_switch_set);

        let channels = QCL_CURRENT_LIMITS_MA.map(|limit| ChannelState {
            pulse_rate: 10_000.0,
            pulse_width: 0.5,
            current: (limit * 0.8) as f32,
        });

        Self {
            flags,
            connect_due: None,
            arm_due: None,
            tune_due: None,
            emission_due: None,
            position_um: 0.0,
            target_um: 0.0,
            channels,
            scan: None,
        }
    }

    /// Apply every transition whose due time has passed.
    pub fn settle(&mut self, now: Instant) {
        if self.connect_due.is_some_and(|due| due <= now) {
            self.connect_due = None;
            self.flags.insert(SimFlags::CONNECTED);
        }
        if self.arm_due.is_some_and(|due| due <= now) {
            self.arm_due = None;
            self.flags.insert(SimFlags::ARMED);
        }
        if self.tune_due.is_some_and(|due| due <= now) {
            self.tune_due = None;
            self.position_um = self.target_um;
            self.flags.insert(SimFlags::TUNED);
        }
        if let Some((on, due)) = self.emission_due {
            if due <= now {
                self.emission_due = None;
                self.flags.set(SimFlags::EMITTING, on);
            }
        }
        if let Some(scan) = &self.scan {
            let progress = scan.progress(now);
            if let Some(um) = to_microns(progress.position, scan.args.units) {
                self.position_um = um;
            }
            if progress.finished {
                self.scan = None;
                self.flags
                    .remove(SimFlags::SCAN_ACTIVE | SimFlags::SCAN_PAUSED);
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.flags.contains(SimFlags::CONNECTED)
    }

    /// Close the session: everything but the physical switches resets.
    pub fn reset_session(&mut self) {
        self.flags &= SimFlags::INTERLOCK | SimFlags::KEY_SWITCH;
        self.connect_due = None;
        self.arm_due = None;
        self.tune_due = None;
        self.emission_due = None;
        self.scan = None;
    }
}
