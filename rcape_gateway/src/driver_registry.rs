//! Driver registry for cape drivers.
//!
//! Provides a `DriverRegistry` struct for registering and retrieving driver
//! factories. This uses constructor-injection rather than global state.

use rcape_common::cape::config::GatewayConfig;
use rcape_common::cape::driver::{CapeDriver, DriverFactory};
use rcape_common::cape::error::GatewayError;
use std::collections::HashMap;

/// Registry of available drivers.
///
/// Constructed at startup, populated via `register()`, and consulted by
/// `Gateway::from_config`. No global state, testable in isolation.
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

    /// Registry holding every driver compiled into this build.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        crate::drivers::register_builtin(&mut registry);
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

    /// Create a driver instance by name.
    ///
    /// # Errors
    /// Returns `GatewayError::DriverNotFound` if no driver with the given name is registered.
    pub fn create_driver(
        &self,
        name: &str,
        config: &GatewayConfig,
    ) -> Result<Box<dyn CapeDriver>, GatewayError> {
        let factory = self
            .get_factory(name)
            .ok_or_else(|| GatewayError::DriverNotFound(name.to_string()))?;
        Ok(factory(config))
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

    struct TestDriver;

    impl CapeDriver for TestDriver {
        fn name(&self) -> &'static str {
            "test"
        }
        fn version(&self) -> &'static str {
            "0.1.0"
        }
        fn initialize(&self) -> i32 {
            0
        }
        fn cleanup(&self) -> i32 {
            0
        }
        fn get_state(&self) -> i32 {
            0
        }
        fn set_state(&self, _: i32) -> i32 {
            0
        }
        fn set_led(&self, _: i32, _: i32) -> i32 {
            0
        }
        fn blink_led(&self, _: i32, _: f32, _: f32) -> i32 {
            0
        }
        fn gpio_read_mmap(&self, _: i32) -> i32 {
            0
        }
        fn get_pause_button(&self) -> i32 {
            0
        }
        fn get_mode_button(&self) -> i32 {
            0
        }
        fn enable_motors(&self) -> i32 {
            0
        }
        fn disable_motors(&self) -> i32 {
            0
        }
        fn set_motor(&self, _: i32, _: f32) -> i32 {
            0
        }
        fn set_motor_all(&self, _: f32) -> i32 {
            0
        }
        fn set_motor_free_spin(&self, _: i32) -> i32 {
            0
        }
        fn set_motor_free_spin_all(&self) -> i32 {
            0
        }
        fn set_motor_brake(&self, _: i32) -> i32 {
            0
        }
        fn set_motor_brake_all(&self) -> i32 {
            0
        }
        fn get_encoder_pos(&self, _: i32) -> i32 {
            0
        }
        fn set_encoder_pos(&self, _: i32, _: i32) -> i32 {
            0
        }
        fn battery_voltage(&self) -> f32 {
            0.0
        }
        fn dc_jack_voltage(&self) -> f32 {
            0.0
        }
        fn adc_raw(&self, _: i32) -> i32 {
            0
        }
        fn adc_volt(&self, _: i32) -> f32 {
            0.0
        }
        fn enable_servo_power_rail(&self) -> i32 {
            0
        }
        fn disable_servo_power_rail(&self) -> i32 {
            0
        }
        fn send_servo_pulse_us(&self, _: i32, _: i32) -> i32 {
            0
        }
        fn send_servo_pulse_us_all(&self, _: i32) -> i32 {
            0
        }
        fn send_servo_pulse_normalized(&self, _: i32, _: f32) -> i32 {
            0
        }
        fn send_servo_pulse_normalized_all(&self, _: f32) -> i32 {
            0
        }
        fn send_esc_pulse_normalized(&self, _: i32, _: f32) -> i32 {
            0
        }
        fn send_esc_pulse_normalized_all(&self, _: f32) -> i32 {
            0
        }
        fn send_oneshot_pulse_normalized(&self, _: i32, _: f32) -> i32 {
            0
        }
        fn send_oneshot_pulse_normalized_all(&self, _: f32) -> i32 {
            0
        }
        fn initialize_dsm(&self) -> i32 {
            0
        }
        fn stop_dsm_service(&self) -> i32 {
            0
        }
        fn get_dsm_ch_raw(&self, _: i32) -> i32 {
            0
        }
        fn get_dsm_ch_normalized(&self, _: i32) -> f32 {
            0.0
        }
        fn is_new_dsm_data(&self) -> i32 {
            0
        }
        fn is_dsm_active(&self) -> i32 {
            0
        }
        fn ms_since_last_dsm_packet(&self) -> i32 {
            -1
        }
        fn nanos_since_last_dsm_packet(&self) -> u64 {
            u64::MAX
        }
        fn get_num_dsm_channels(&self) -> i32 {
            0
        }
        fn bind_dsm(&self) -> i32 {
            0
        }
        fn calibrate_dsm_routine(&self) -> i32 {
            0
        }
        fn initialize_barometer(&self, _: i32, _: i32) -> i32 {
            0
        }
        fn power_off_barometer(&self) -> i32 {
            0
        }
        fn read_barometer(&self) -> i32 {
            0
        }
        fn bmp_get_temperature(&self) -> f32 {
            0.0
        }
        fn bmp_get_pressure_pa(&self) -> f32 {
            0.0
        }
        fn bmp_get_altitude_m(&self) -> f32 {
            0.0
        }
        fn set_sea_level_pressure_pa(&self, _: f32) -> i32 {
            0
        }
        fn i2c_init(&self, _: i32, _: u8) -> i32 {
            0
        }
        fn i2c_close(&self, _: i32) -> i32 {
            0
        }
        fn i2c_set_device_address(&self, _: i32, _: u8) -> i32 {
            0
        }
        fn i2c_claim_bus(&self, _: i32) -> i32 {
            0
        }
        fn i2c_release_bus(&self, _: i32) -> i32 {
            0
        }
        fn i2c_get_in_use_state(&self, _: i32) -> i32 {
            0
        }
        fn i2c_read_byte(&self, _: i32, _: u8, _: &mut u8) -> i32 {
            0
        }
        fn i2c_read_bytes(&self, _: i32, _: u8, _: &mut [u8]) -> i32 {
            0
        }
        fn i2c_read_word(&self, _: i32, _: u8, _: &mut u16) -> i32 {
            0
        }
        fn i2c_read_bit(&self, _: i32, _: u8, _: u8, _: &mut u8) -> i32 {
            0
        }
        fn i2c_send_byte(&self, _: i32, _: u8) -> i32 {
            0
        }
        fn i2c_send_bytes(&self, _: i32, _: &[u8]) -> i32 {
            0
        }
        fn set_cpu_freq(&self, _: i32) -> i32 {
            0
        }
        fn get_cpu_freq(&self) -> i32 {
            0
        }
        fn get_bb_model(&self) -> i32 {
            0
        }
    }

    fn create_test_driver(_: &GatewayConfig) -> Box<dyn CapeDriver> {
        Box::new(TestDriver)
    }

    #[test]
    fn registry_register_and_create() {
        let mut reg = DriverRegistry::new();
        reg.register("test_driver", create_test_driver);

        let driver = reg
            .create_driver("test_driver", &GatewayConfig::default())
            .expect("should create");
        assert_eq!(driver.name(), "test");
    }

    #[test]
    fn registry_driver_not_found() {
        let reg = DriverRegistry::new();
        let result = reg.create_driver("nonexistent", &GatewayConfig::default());
        assert!(matches!(result, Err(GatewayError::DriverNotFound(_))));
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
        let reg = DriverRegistry::with_builtin();
        assert!(reg.list_drivers().contains(&"simulation"));
        let driver = reg
            .create_driver("simulation", &GatewayConfig::default())
            .expect("should create");
        assert_eq!(driver.name(), "simulation");
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn registry_duplicate_panics() {
        let mut reg = DriverRegistry::new();
        reg.register("dup", create_test_driver);
        reg.register("dup", create_test_driver);
    }
}
