//! Simulation driver module.
//!
//! Software emulation of a four-QCL controller for development and testing
//! without physical hardware. Settings come from the `[driver.settings]`
//! table of `instrument.toml`:
//!
//! ```toml
//! [driver.settings]
//! qcl_count = 4
//! interlock_set = true
//! key_switch_set = true
//! arm_delay_s = 2.0
//! tune_delay_s = 1.0
//! emission_delay_s = 0.2
//! connect_delay_s = 0.5
//! tuning_range_um = [5.5, 11.0]
//! ```

mod driver;
mod state;

pub use driver::SimulationDriver;
pub use state::SimFlags;

use qcl_common::config::ConfigError;
use qcl_common::consts::QCL_CHANNEL_COUNT;
use qcl_common::driver::QclDriver;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Simulator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationSettings {
    /// Installed QCLs (1..=4).
    pub qcl_count: u8,
    /// Interlock closed at start.
    pub interlock_set: bool,
    /// Key switch on at start.
    pub key_switch_set: bool,
    /// Arm latency (TEC settling), seconds.
    pub arm_delay_s: f64,
    /// Tune latency, seconds.
    pub tune_delay_s: f64,
    /// Emission on/off latency, seconds.
    pub emission_delay_s: f64,
    /// Latency between initialize and the link reporting up, seconds.
    pub connect_delay_s: f64,
    /// Reachable wavelengths `[min, max]` in µm.
    pub tuning_range_um: [f64; 2],
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            qcl_count: QCL_CHANNEL_COUNT as u8,
            interlock_set: true,
            key_switch_set: true,
            arm_delay_s: 0.2,
            tune_delay_s: 0.1,
            emission_delay_s: 0.05,
            connect_delay_s: 0.0,
            tuning_range_um: [5.0, 11.0],
        }
    }
}

fn delay(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}

impl SimulationSettings {
    /// Parse the `[driver.settings]` table.
    pub fn from_table(table: &toml::Table) -> Result<Self, ConfigError> {
        let settings: Self = toml::Value::Table(table.clone())
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=QCL_CHANNEL_COUNT as u8).contains(&self.qcl_count) {
            return Err(ConfigError::ValidationError(format!(
                "qcl_count {} must be between 1 and {QCL_CHANNEL_COUNT}",
                self.qcl_count
            )));
        }
        for (name, value) in [
            ("arm_delay_s", self.arm_delay_s),
            ("tune_delay_s", self.tune_delay_s),
            ("emission_delay_s", self.emission_delay_s),
            ("connect_delay_s", self.connect_delay_s),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be a non-negative number of seconds"
                )));
            }
        }
        let [lo, hi] = self.tuning_range_um;
        if !(lo > 0.0 && lo < hi && hi.is_finite()) {
            return Err(ConfigError::ValidationError(format!(
                "tuning_range_um [{lo}, {hi}] must be positive and increasing"
            )));
        }
        Ok(())
    }

    /// Arm latency.
    pub fn arm_delay(&self) -> Duration {
        delay(self.arm_delay_s)
    }

    /// Tune latency.
    pub fn tune_delay(&self) -> Duration {
        delay(self.tune_delay_s)
    }

    /// Emission latency.
    pub fn emission_delay(&self) -> Duration {
        delay(self.emission_delay_s)
    }

    /// Connect latency.
    pub fn connect_delay(&self) -> Duration {
        delay(self.connect_delay_s)
    }
}

/// Factory function to create a simulation driver instance.
pub fn create_driver(settings: &toml::Table) -> Result<Box<dyn QclDriver>, ConfigError> {
    let settings = SimulationSettings::from_table(settings)?;
    Ok(Box::new(SimulationDriver::new(settings)))
}
