//! # QCL Control Binary
//!
//! Command-line front end for a mid-infrared QCL instrument. Each invocation
//! connects, runs one command, prints the result and disconnects.
//!
//! # Usage
//!
//! ```bash
//! # Status of the simulated instrument
//! qcl_control --config config/instrument.toml status
//!
//! # Arm, tune to 7 µm and show where the laser ended up
//! qcl_control tune --arm wl 7.0
//!
//! # Sweep 1200..1300 cm⁻¹ twice and follow progress
//! qcl_control scan --unit wn --start 1200 --end 1300 --speed 20 --repetitions 2 --follow
//!
//! # Full connect → tune → emit → disconnect sequence, JSON output
//! qcl_control --json demo
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use qcl_common::config::{ConfigError, ConfigLoader, InstrumentConfig};
use qcl_common::consts::DEFAULT_CONFIG_PATH;
use qcl_common::params::SweepScanRequest;
use qcl_common::units::Unit;
use qcl_control::{DriverRegistry, FieldValue, QclDevice};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// QCL Control - operate a mid-infrared quantum-cascade-laser instrument
#[derive(Parser, Debug)]
#[command(name = "qcl_control")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Connect, tune, arm and scan a mid-infrared QCL instrument")]
#[command(long_about = None)]
struct Args {
    /// Path to the instrument configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the configured driver.
    #[arg(short, long)]
    driver: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json_logs: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read and print every status field
    Status,
    /// Read and print sweep scan progress
    ScanStatus,
    /// Tune to a wavelength (wl, µm) or wavenumber (wn, cm⁻¹)
    Tune {
        /// Unit tag: wl|wavelength|um or wn|wavenumber|cm-1
        unit: Unit,
        /// Target position
        target: f64,
        /// Arm the laser first
        #[arg(long)]
        arm: bool,
    },
    /// Arm the laser
    Arm,
    /// Disarm the laser
    Disarm,
    /// Turn emission on or off
    Emission {
        /// Desired emission state
        state: Switch,
    },
    /// Read QCL channel parameters
    Params {
        /// Single channel (1-4); all channels when omitted
        #[arg(long)]
        channel: Option<u8>,
    },
    /// Write QCL channel parameters
    SetParams {
        /// Channel (1-4)
        #[arg(long)]
        channel: u8,
        /// Pulse rate (Hz)
        #[arg(long)]
        rate: f64,
        /// Pulse width (µs)
        #[arg(long)]
        width: f64,
        /// Drive current (mA)
        #[arg(long)]
        current: f64,
    },
    /// Start a sweep scan
    Scan {
        /// Unit of start, end and speed
        #[arg(long, default_value = "wn")]
        unit: Unit,
        /// Start position
        #[arg(long)]
        start: f64,
        /// End position
        #[arg(long)]
        end: f64,
        /// Sweep speed (unit per second)
        #[arg(long)]
        speed: f64,
        /// Number of repetitions
        #[arg(long, default_value_t = 1)]
        repetitions: u16,
        /// Sweep back and forth
        #[arg(long)]
        bidirectional: bool,
        /// Arm the laser first
        #[arg(long)]
        arm: bool,
        /// Follow progress until the scan ends
        #[arg(long)]
        follow: bool,
    },
    /// Poll scan progress until the scan ends or Ctrl-C
    Monitor {
        /// Poll interval in milliseconds
        #[arg(long, default_value_t = 500)]
        interval_ms: u64,
    },
    /// Connect, arm, tune, emit, report, then shut everything down
    Demo {
        /// Unit tag
        #[arg(long, default_value = "wl")]
        unit: Unit,
        /// Target position
        #[arg(long, default_value_t = 7.0)]
        target: f64,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Switch {
    On,
    Off,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("qcl_control failed: {}", e);
        eprintln!("error: {e}");
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let (mut config, from_file) = load_config(&args)?;
    setup_tracing(&args, &config);

    info!("QCL Control v{} starting...", env!("CARGO_PKG_VERSION"));
    if from_file {
        info!("Loaded configuration from {:?}", args.config);
    } else {
        warn!(
            "No configuration at {:?}, using built-in defaults",
            args.config
        );
    }

    if let Some(driver) = &args.driver {
        info!("Driver from CLI: {}", driver);
        config.driver.name = driver.clone();
    }

    let registry = DriverRegistry::with_builtin_drivers();
    let mut device = QclDevice::from_config(&config, &registry)?;
    device.connect()?;

    let outcome = execute(&args, &mut device);

    if let Err(e) = device.disconnect() {
        warn!("Disconnect failed: {}", e);
    }
    info!(diagnostics = ?device.diagnostics(), "QCL Control shutdown complete");
    outcome
}

/// Load the configuration file. A missing file at the default path falls
/// back to defaults; a missing file given explicitly is an error.
fn load_config(args: &Args) -> Result<(InstrumentConfig, bool), ConfigError> {
    match InstrumentConfig::load(&args.config) {
        Ok(config) => Ok((config, true)),
        Err(ConfigError::FileNotFound) if args.config == PathBuf::from(DEFAULT_CONFIG_PATH) => {
            Ok((InstrumentConfig::default(), false))
        }
        Err(e) => Err(e),
    }
}

fn execute(args: &Args, device: &mut QclDevice) -> Result<(), Box<dyn std::error::Error>> {
    match &args.command {
        Command::Status => {
            let status = device.status()?;
            print_output(args.json, &status, &status.fields())?;
        }
        Command::ScanStatus => {
            let scan = device.scan_status()?;
            print_output(args.json, &scan, &scan.fields())?;
        }
        Command::Tune { unit, target, arm } => {
            if *arm {
                device.arm()?;
            }
            device.tune(*unit, *target)?;
            let status = device.status()?;
            print_output(args.json, &status, &status.fields())?;
        }
        Command::Arm => device.arm()?,
        Command::Disarm => device.disarm()?,
        Command::Emission { state } => match state {
            Switch::On => device.enable_emission()?,
            Switch::Off => device.disable_emission()?,
        },
        Command::Params { channel } => {
            let params = match channel {
                Some(ch) => vec![device.qcl_params(*ch)?],
                None => device.all_qcl_params()?.to_vec(),
            };
            if args.json {
                println!("{}", serde_json::to_string_pretty(&params)?);
            } else {
                for p in &params {
                    println!(
                        "QCL {}: rate {:>9.1} Hz  width {:>6.3} µs  current {:>6.1} mA  duty {:.3} %",
                        p.channel,
                        p.pulse_rate_hz,
                        p.pulse_width_us,
                        p.current_ma,
                        p.duty_cycle_percent()
                    );
                }
            }
        }
        Command::SetParams {
            channel,
            rate,
            width,
            current,
        } => {
            device.set_qcl_params(*channel, *rate, *width, *current)?;
            info!("QCL {} parameters written", channel);
        }
        Command::Scan {
            unit,
            start,
            end,
            speed,
            repetitions,
            bidirectional,
            arm,
            follow,
        } => {
            if *arm {
                device.arm()?;
            }
            let request = SweepScanRequest {
                unit: *unit,
                start: *start,
                end: *end,
                speed: *speed,
                repetitions: *repetitions,
                bidirectional: *bidirectional,
            };
            device.start_sweep_scan(&request)?;
            if *follow {
                let interval = device.timing().poll_interval;
                monitor(args.json, device, interval)?;
            }
        }
        Command::Monitor { interval_ms } => {
            monitor(args.json, device, Duration::from_millis(*interval_ms))?;
        }
        Command::Demo { unit, target } => demo(args.json, device, *unit, *target)?,
    }
    Ok(())
}

/// Poll scan progress until the scan ends or the user interrupts.
fn monitor(
    json: bool,
    device: &mut QclDevice,
    interval: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        flag.store(false, Ordering::SeqCst);
    })?;

    while running.load(Ordering::SeqCst) {
        let scan = device.scan_status()?;
        if json {
            println!("{}", serde_json::to_string(&scan)?);
        } else {
            println!(
                "rep {}  {:>3}%  {}  {}",
                FieldValue::from(scan.repetition()),
                FieldValue::from(scan.percent()),
                FieldValue::from(scan.ww().map(|p| p.wavenumber_cm1())),
                if scan.paused() == Some(true) {
                    "paused"
                } else {
                    "sweeping"
                }
            );
        }
        if scan.in_progress() != Some(true) {
            info!("Scan finished");
            return Ok(());
        }
        thread::sleep(interval);
    }

    warn!("Monitoring interrupted, stopping scan");
    device.stop_scan()?;
    Ok(())
}

fn demo(
    json: bool,
    device: &mut QclDevice,
    unit: Unit,
    target: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    device.arm()?;
    device.tune(unit, target)?;
    device.enable_emission()?;

    let status = device.status()?;
    print_output(json, &status, &status.fields())?;

    device.disable_emission()?;
    device.disarm()?;
    Ok(())
}

fn print_output<T: Serialize>(
    json: bool,
    value: &T,
    fields: &[(&'static str, FieldValue)],
) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        for (label, value) in fields {
            println!("{label:<30} {value}");
        }
    }
    Ok(())
}

/// Setup tracing subscriber from `RUST_LOG`, the configured level and the
/// CLI flags.
fn setup_tracing(args: &Args, config: &InstrumentConfig) {
    let level = if args.verbose {
        "debug"
    } else {
        config.shared.log_level.as_filter()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if args.json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
