//! Driver implementations.
//!
//! - [`simulation`] - in-memory board for development and testing
//! - `roboticscape` - FFI to `libroboticscape` (feature `native`)
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the `CapeDriver` trait from `rcape_common::cape::driver`
//! 3. Register its factory in [`register_builtin`]

#[cfg(feature = "native")]
pub mod roboticscape;
pub mod simulation;

use crate::driver_registry::DriverRegistry;

/// Register every driver compiled into this build.
pub fn register_builtin(registry: &mut DriverRegistry) {
    registry.register("simulation", simulation::create_driver);

    #[cfg(feature = "native")]
    registry.register("roboticscape", roboticscape::create_driver);
}
