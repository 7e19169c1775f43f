//! The gateway: one validated entry point to the hardware.
//!
//! `Gateway` owns the active driver and the lifecycle state. Every call runs
//! validate, lifecycle check, invoke and translate, in that order, and
//! returns on the first failure.

use crate::dispatch::{Native, invoke, translate};
use crate::driver_registry::DriverRegistry;
use crate::table::Op;
use parking_lot::RwLock;
use rcape_common::cape::config::GatewayConfig;
use rcape_common::cape::driver::CapeDriver;
use rcape_common::cape::error::GatewayError;
use rcape_common::cape::types::LifecycleState;
use rcape_common::cape::value::Value;
use tracing::{info, warn};

/// Validated hardware command gateway.
///
/// Hardware calls hold a shared lock on the lifecycle for the duration of
/// the native call; `initialize` and `cleanup` take it exclusively, so a
/// cleanup never overlaps an in-flight call. Hardware calls are not
/// serialized against each other.
pub struct Gateway {
    /// Active driver instance
    driver: Box<dyn CapeDriver>,
    /// Process-wide lifecycle as seen by this gateway
    lifecycle: RwLock<LifecycleState>,
}

impl Gateway {
    /// Wrap a driver. The gateway starts `Uninitialized`.
    pub fn new(driver: Box<dyn CapeDriver>) -> Self {
        Self {
            driver,
            lifecycle: RwLock::new(LifecycleState::Uninitialized),
        }
    }

    /// Validate `config` and build a gateway around the driver it names.
    ///
    /// # Errors
    /// `Config` if validation fails, `DriverNotFound` if the driver name is
    /// not registered.
    pub fn from_config(
        config: &GatewayConfig,
        registry: &DriverRegistry,
    ) -> Result<Self, GatewayError> {
        config.validate()?;
        let driver = registry.create_driver(&config.gateway.driver, config)?;
        info!(
            driver = driver.name(),
            version = driver.version(),
            "Created gateway"
        );
        Ok(Self::new(driver))
    }

    /// Name of the active driver.
    pub fn driver_name(&self) -> &'static str {
        self.driver.name()
    }

    /// Current lifecycle state.
    pub fn lifecycle(&self) -> LifecycleState {
        *self.lifecycle.read()
    }

    /// Call an operation by name (bare or `rc_`-prefixed).
    ///
    /// # Errors
    /// `UnknownOperation` for an unknown name, otherwise as [`Self::dispatch`].
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, GatewayError> {
        let op = Op::from_name(name)
            .ok_or_else(|| GatewayError::UnknownOperation(name.to_string()))?;
        self.dispatch(op, args)
    }

    /// Validate `args`, check the lifecycle, call the driver and translate
    /// the result.
    ///
    /// # Errors
    /// - `Argument` before anything else happens
    /// - `Lifecycle` if the hardware is not initialized (or, for
    ///   `initialize`/`cleanup`, in the wrong state)
    /// - `Driver` / `NotImplemented` from the native call
    pub fn dispatch(&self, op: Op, args: &[Value]) -> Result<Value, GatewayError> {
        let spec = op.spec();
        let args = spec.validate(args)?;

        match op {
            Op::Initialize => self.initialize(),
            Op::Cleanup => self.cleanup(),
            _ => {
                let state = self.lifecycle.read();
                if *state != LifecycleState::Initialized {
                    return Err(GatewayError::Lifecycle {
                        op: spec.name,
                        state: *state,
                    });
                }
                let native = invoke(self.driver.as_ref(), op, &args)?;
                translate(spec, native)
            }
        }
    }

    /// Bring up the hardware library. Valid only once, from `Uninitialized`.
    ///
    /// A failed native initialize leaves the state `Uninitialized`.
    pub fn initialize(&self) -> Result<Value, GatewayError> {
        let spec = Op::Initialize.spec();
        let mut state = self.lifecycle.write();
        if *state != LifecycleState::Uninitialized {
            return Err(GatewayError::Lifecycle {
                op: spec.name,
                state: *state,
            });
        }

        let value = translate(spec, Native::Status(self.driver.initialize()))?;
        *state = LifecycleState::Initialized;
        info!(driver = self.driver.name(), "Hardware initialized");
        Ok(value)
    }

    /// Release the hardware library. Valid only from `Initialized`.
    ///
    /// The state moves to `ShutDown` even if the native cleanup reports a
    /// failure; the failure is returned after the transition.
    pub fn cleanup(&self) -> Result<Value, GatewayError> {
        let mut state = self.lifecycle.write();
        if *state != LifecycleState::Initialized {
            return Err(GatewayError::Lifecycle {
                op: Op::Cleanup.spec().name,
                state: *state,
            });
        }
        self.release(&mut state)
    }

    /// Clean up if the hardware is still initialized.
    ///
    /// Returns `Ok(false)` when there was nothing to release, for instance
    /// because a script already called `cleanup` itself.
    pub fn shutdown(&self) -> Result<bool, GatewayError> {
        let mut state = self.lifecycle.write();
        if *state != LifecycleState::Initialized {
            return Ok(false);
        }
        self.release(&mut state).map(|_| true)
    }

    fn release(&self, state: &mut LifecycleState) -> Result<Value, GatewayError> {
        let status = self.driver.cleanup();
        *state = LifecycleState::ShutDown;
        info!(driver = self.driver.name(), status, "Hardware shut down");
        translate(Op::Cleanup.spec(), Native::Status(status))
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        if *self.lifecycle.get_mut() == LifecycleState::Initialized {
            warn!("Gateway dropped while initialized, running cleanup");
            if let Err(e) = self.cleanup() {
                warn!("Cleanup on drop failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::simulation::SimulationDriver;
    use rcape_common::cape::config::SimulationConfig;

    fn gateway() -> (Gateway, SimulationDriver) {
        let sim = SimulationDriver::new(&SimulationConfig::default());
        (Gateway::new(Box::new(sim.clone())), sim)
    }

    #[test]
    fn gateway_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Gateway>();
    }

    #[test]
    fn hardware_calls_need_initialize() {
        let (gw, sim) = gateway();
        let err = gw.call("battery_voltage", &[]).unwrap_err();
        assert_eq!(
            err,
            GatewayError::Lifecycle {
                op: "battery_voltage",
                state: LifecycleState::Uninitialized
            }
        );
        assert!(sim.native_calls().is_empty());
    }

    #[test]
    fn arguments_are_checked_before_lifecycle() {
        let (gw, _) = gateway();
        let err = gw
            .call("set_motor", &[Value::Int(9), Value::Float(0.5)])
            .unwrap_err();
        assert!(matches!(err, GatewayError::Argument(_)));
    }

    #[test]
    fn failed_initialize_can_be_retried() {
        let (gw, sim) = gateway();
        sim.inject_fault("rc_initialize", -1);
        assert!(matches!(
            gw.initialize(),
            Err(GatewayError::Driver { op: "initialize", code: -1 })
        ));
        assert_eq!(gw.lifecycle(), LifecycleState::Uninitialized);
        assert_eq!(gw.initialize(), Ok(Value::Int(0)));
        assert_eq!(gw.lifecycle(), LifecycleState::Initialized);
    }

    #[test]
    fn failed_cleanup_still_shuts_down() {
        let (gw, sim) = gateway();
        gw.initialize().unwrap();
        sim.inject_fault("rc_cleanup", -1);
        assert!(gw.cleanup().is_err());
        assert_eq!(gw.lifecycle(), LifecycleState::ShutDown);
    }

    #[test]
    fn shutdown_only_releases_initialized_hardware() {
        let (gw, sim) = gateway();
        assert_eq!(gw.shutdown(), Ok(false));
        assert_eq!(gw.lifecycle(), LifecycleState::Uninitialized);

        gw.initialize().unwrap();
        assert_eq!(gw.shutdown(), Ok(true));
        assert_eq!(gw.lifecycle(), LifecycleState::ShutDown);
        assert_eq!(gw.shutdown(), Ok(false));
        assert_eq!(sim.call_count("rc_cleanup"), 1);
    }

    #[test]
    fn shutdown_reports_failed_cleanup() {
        let (gw, sim) = gateway();
        gw.initialize().unwrap();
        sim.inject_fault("rc_cleanup", -2);
        assert_eq!(
            gw.shutdown(),
            Err(GatewayError::Driver { op: "cleanup", code: -2 })
        );
        assert_eq!(gw.lifecycle(), LifecycleState::ShutDown);
    }

    #[test]
    fn drop_cleans_up_initialized_gateway() {
        let (gw, sim) = gateway();
        gw.call("initialize", &[]).unwrap();
        drop(gw);
        assert_eq!(sim.call_count("rc_cleanup"), 1);
    }

    #[test]
    fn drop_leaves_uninitialized_gateway_alone() {
        let (gw, sim) = gateway();
        drop(gw);
        assert_eq!(sim.call_count("rc_cleanup"), 0);
    }

    #[test]
    fn from_config_rejects_unknown_driver() {
        let mut config = GatewayConfig::default();
        config.gateway.driver = "pigpio".to_string();
        let result = Gateway::from_config(&config, &DriverRegistry::with_builtin());
        assert!(matches!(result, Err(GatewayError::DriverNotFound(name)) if name == "pigpio"));
    }
}
