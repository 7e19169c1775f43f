//! Simulation driver module.
//!
//! This module provides an in-memory Robotics Cape for development and
//! testing without a BeagleBone.

mod driver;
mod state;

pub use driver::{CALL_LOG_CAPACITY, SimulationDriver};
pub use state::{
    BarometerState, DSM_ACTIVE_TIMEOUT, DsmState, I2cBusState, MotorOutput, Pulse, SimState,
};

use rcape_common::cape::config::GatewayConfig;
use rcape_common::cape::driver::CapeDriver;

/// Factory function to create a simulation driver instance.
pub fn create_driver(config: &GatewayConfig) -> Box<dyn CapeDriver> {
    Box::new(SimulationDriver::new(&config.simulation))
}
