//! Driver registry for QCL drivers.
//!
//! Provides a `DriverRegistry` struct for registering and retrieving driver
//! factories. Constructed at startup and passed to `QclDevice::from_config`;
//! there is no global registry.

use crate::drivers::register_builtin_drivers;
use qcl_common::config::ConfigError;
use qcl_common::driver::{DriverFactory, QclDriver};
use std::collections::HashMap;
use tracing::debug;

/// Registry of available QCL drivers.
pub struct DriverRegistry {
    factories: HashMap<&'static str, DriverFactory>,
}

impl DriverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry holding every built-in driver.
    pub fn with_builtin_drivers() -> Self {
        let mut registry = Self::new();
        register_builtin_drivers(&mut registry);
        registry
    }

    /// Register a driver factory.
    ///
    /// # Panics
    /// Panics if a driver with the same name is already registered.
    pub fn register(&mut self, name: &'static str, factory: DriverFactory) {
        if self.factories.contains_key(name) {
            panic!("Driver '{name}' is already registered");
        }
        self.factories.insert(name, factory);
    }

    /// Get a driver factory by name.
    pub fn get_factory(&self, name: &str) -> Option<DriverFactory> {
        self.factories.get(name).copied()
    }

    /// Create a driver instance by name from its settings table.
    ///
    /// # Errors
    /// Returns `ConfigError::UnknownDriver` if no driver with the given name
    /// is registered, or the factory's error if the settings are invalid.
    pub fn create_driver(
        &self,
        name: &str,
        settings: &toml::Table,
    ) -> Result<Box<dyn QclDriver>, ConfigError> {
        let factory = self
            .get_factory(name)
            .ok_or_else(|| ConfigError::UnknownDriver(name.to_string()))?;
        debug!(driver = name, "creating driver");
        factory(settings)
    }

    /// List all registered driver names, sorted.
    pub fn list_drivers(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::simulation::SimulationDriver;

    fn create_test_driver(_settings: &toml::Table) -> Result<Box<dyn QclDriver>, ConfigError> {
        Ok(Box::new(SimulationDriver::default()))
    }

    #[test]
    fn registry_register_and_create() {
        let mut reg = DriverRegistry::new();
        reg.register("test_driver", create_test_driver);

        let driver = reg
            .create_driver("test_driver", &toml::Table::new())
            .expect("should create");
        assert_eq!(driver.name(), "simulation");
    }

    #[test]
    fn registry_driver_not_found() {
        let reg = DriverRegistry::new();
        let result = reg.create_driver("nonexistent", &toml::Table::new());
        assert!(matches!(result, Err(ConfigError::UnknownDriver(name)) if name == "nonexistent"));
    }

    #[test]
    fn registry_list_drivers() {
        let mut reg = DriverRegistry::new();
        reg.register("beta", create_test_driver);
        reg.register("alpha", create_test_driver);
        assert_eq!(reg.list_drivers(), vec!["alpha", "beta"]);
    }

    #[test]
    fn builtin_registry_has_simulation() {
        let reg = DriverRegistry::with_builtin_drivers();
        assert_eq!(reg.list_drivers(), vec!["simulation"]);
    }

    #[test]
    fn factory_errors_propagate() {
        let reg = DriverRegistry::with_builtin_drivers();
        let settings: toml::Table = toml::from_str("qcl_count = 9").unwrap();
        assert!(matches!(
            reg.create_driver("simulation", &settings),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn registry_duplicate_panics() {
        let mut reg = DriverRegistry::new();
        reg.register("dup", create_test_driver);
        reg.register("dup", create_test_driver);
    }
}
