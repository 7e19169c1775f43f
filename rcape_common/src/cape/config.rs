//! Gateway configuration types.
//!
//! - `GatewayConfig` - main configuration loaded from `cape.toml`
//! - `GatewaySection` - driver selection
//! - `SimulationConfig` - initial readings for the simulation driver

use crate::cape::error::GatewayError;
use crate::cape::types::BoardModel;
use crate::config::{ConfigLoader, SharedConfig};
use crate::consts::{ADC_COUNT, ADC_FULL_SCALE, DSM_MAX_CHANNELS, STANDARD_SEA_LEVEL_PA};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the driver used when none is configured.
pub const DEFAULT_DRIVER: &str = "simulation";

fn default_driver() -> String {
    DEFAULT_DRIVER.to_string()
}

fn default_board_model() -> i32 {
    BoardModel::default().code()
}

fn default_battery_voltage() -> f32 {
    8.2
}

fn default_dc_jack_voltage() -> f32 {
    12.0
}

fn default_dsm_channels() -> i32 {
    DSM_MAX_CHANNELS as i32
}

fn default_temperature_c() -> f32 {
    21.5
}

fn default_pressure_pa() -> f32 {
    STANDARD_SEA_LEVEL_PA as f32
}

/// Main configuration loaded from `cape.toml`.
///
/// Every section is optional; an empty file yields the simulation driver
/// with nominal readings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default)]
    pub shared: SharedConfig,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// `[gateway]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    /// Registered driver name ("simulation", "roboticscape").
    #[serde(default = "default_driver")]
    pub driver: String,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            driver: default_driver(),
        }
    }
}

/// `[simulation]` section: what the simulated board reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    /// Board model code reported by `get_bb_model` (0-3).
    #[serde(default = "default_board_model")]
    pub board_model: i32,

    /// LiPo voltage in volts.
    #[serde(default = "default_battery_voltage")]
    pub battery_voltage: f32,

    /// DC jack voltage in volts.
    #[serde(default = "default_dc_jack_voltage")]
    pub dc_jack_voltage: f32,

    /// Raw counts per ADC channel (0-4095).
    #[serde(default)]
    pub adc_raw: [i32; ADC_COUNT],

    /// Channels sent by the simulated transmitter (1-9).
    #[serde(default = "default_dsm_channels")]
    pub dsm_channels: i32,

    /// Temperature reported by the barometer in degrees Celsius.
    #[serde(default = "default_temperature_c")]
    pub temperature_c: f32,

    /// Pressure reported by the barometer in Pa.
    #[serde(default = "default_pressure_pa")]
    pub pressure_pa: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            board_model: default_board_model(),
            battery_voltage: default_battery_voltage(),
            dc_jack_voltage: default_dc_jack_voltage(),
            adc_raw: [0; ADC_COUNT],
            dsm_channels: default_dsm_channels(),
            temperature_c: default_temperature_c(),
            pressure_pa: default_pressure_pa(),
        }
    }
}

impl GatewayConfig {
    /// Load and validate a configuration file.
    ///
    /// # Errors
    /// Returns `GatewayError::Config` if the file cannot be read, parsed or
    /// fails validation.
    pub fn load_file(path: &Path) -> Result<Self, GatewayError> {
        let config = Self::load(path).map_err(|e| {
            GatewayError::Config(format!("{}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Validation Rules
    /// 1. `shared.service_name` not empty
    /// 2. `gateway.driver` not empty
    /// 3. `simulation.board_model` is a known model code
    /// 4. voltages finite and >= 0
    /// 5. ADC counts within 0..=4095
    /// 6. `simulation.dsm_channels` within 1..=9
    /// 7. `simulation.pressure_pa` finite and > 0
    pub fn validate(&self) -> Result<(), GatewayError> {
        self.shared
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        if self.gateway.driver.is_empty() {
            return Err(GatewayError::Config(
                "gateway.driver cannot be empty".to_string(),
            ));
        }

        let sim = &self.simulation;

        if BoardModel::try_from(sim.board_model as i64).is_err() {
            return Err(GatewayError::Config(format!(
                "simulation.board_model must be 0-3, got {}",
                sim.board_model
            )));
        }

        let usable_voltage = |v: f32| v.is_finite() && v >= 0.0;
        if !usable_voltage(sim.battery_voltage) || !usable_voltage(sim.dc_jack_voltage) {
            return Err(GatewayError::Config(format!(
                "simulation voltages must be >= 0 (battery {}, dc jack {})",
                sim.battery_voltage, sim.dc_jack_voltage
            )));
        }

        if let Some((channel, raw)) = sim
            .adc_raw
            .iter()
            .enumerate()
            .find(|(_, raw)| !(0..=ADC_FULL_SCALE).contains(*raw))
        {
            return Err(GatewayError::Config(format!(
                "simulation.adc_raw[{}] must be 0-{}, got {}",
                channel, ADC_FULL_SCALE, raw
            )));
        }

        if !(1..=DSM_MAX_CHANNELS as i32).contains(&sim.dsm_channels) {
            return Err(GatewayError::Config(format!(
                "simulation.dsm_channels must be 1-{}, got {}",
                DSM_MAX_CHANNELS, sim.dsm_channels
            )));
        }

        if !(sim.pressure_pa.is_finite() && sim.pressure_pa > 0.0) {
            return Err(GatewayError::Config(format!(
                "simulation.pressure_pa must be > 0, got {}",
                sim.pressure_pa
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn empty_file_yields_defaults() {
        let config = GatewayConfig::from_toml("").unwrap();
        assert_eq!(config, GatewayConfig::default());
        assert_eq!(config.gateway.driver, DEFAULT_DRIVER);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn full_file_parses() {
        let config = GatewayConfig::from_toml(
            r#"
[shared]
log_level = "trace"
service_name = "rover"

[gateway]
driver = "roboticscape"

[simulation]
board_model = 1
battery_voltage = 7.4
adc_raw = [0, 100, 200, 300, 400, 500, 4095]
dsm_channels = 6
"#,
        )
        .unwrap();
        assert_eq!(config.shared.log_level, LogLevel::Trace);
        assert_eq!(config.gateway.driver, "roboticscape");
        assert_eq!(config.simulation.board_model, 1);
        assert_eq!(config.simulation.adc_raw[6], 4095);
        assert_eq!(config.simulation.dsm_channels, 6);
        assert_eq!(config.simulation.dc_jack_voltage, 12.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(GatewayConfig::from_toml("[gateway]\nbus = 3\n").is_err());
    }

    #[test]
    fn validation_rejects_bad_simulation_values() {
        let mut config = GatewayConfig::default();
        config.simulation.adc_raw[2] = 5000;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("adc_raw[2]"));

        let mut config = GatewayConfig::default();
        config.simulation.dsm_channels = 10;
        assert!(config.validate().is_err());

        let mut config = GatewayConfig::default();
        config.simulation.board_model = 7;
        assert!(config.validate().is_err());

        let mut config = GatewayConfig::default();
        config.simulation.pressure_pa = 0.0;
        assert!(config.validate().is_err());

        let mut config = GatewayConfig::default();
        config.simulation.pressure_pa = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = GatewayConfig::default();
        config.simulation.battery_voltage = f32::NAN;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("voltages"));

        let mut config = GatewayConfig::default();
        config.simulation.dc_jack_voltage = f32::INFINITY;
        assert!(config.validate().is_err());

        let mut config = GatewayConfig::default();
        config.gateway.driver.clear();
        assert!(matches!(config.validate(), Err(GatewayError::Config(_))));
    }

    #[test]
    fn load_file_wraps_errors_with_path() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[simulation]\nbattery_voltage = -1.0\n").unwrap();
        file.flush().unwrap();
        assert!(matches!(
            GatewayConfig::load_file(file.path()),
            Err(GatewayError::Config(_))
        ));

        let err = GatewayConfig::load_file(Path::new("/nonexistent/cape.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/cape.toml"));
    }
}
