//! # rcape gateway
//!
//! Validated command gateway for the BeagleBone Robotics Cape hardware
//! library. Every hardware operation goes through one table-driven path:
//! argument validation, lifecycle check, native call, result translation.
//!
//! # Module Structure
//!
//! - [`table`] - the static operation table and the `Op` dispatch key
//! - [`operation`] - parameter descriptors and argument validation
//! - [`dispatch`] - native invocation and result translation
//! - [`core`] - the `Gateway` (driver ownership and lifecycle)
//! - [`driver_registry`] - driver factory registration
//! - [`drivers`] - simulation and native drivers
//! - [`script`] - line-oriented call surface used by the CLI
//!
//! # Architecture
//!
//! ```text
//! caller ──► Gateway::call(name, args)
//!              │
//!              ├─ OperationSpec::validate ──► ArgumentError
//!              ├─ lifecycle check ──────────► LifecycleError
//!              ├─ dispatch::invoke ──► CapeDriver (simulation | libroboticscape)
//!              └─ dispatch::translate ──► Value | DriverError | NotImplemented
//! ```
//!
//! # Example
//!
//! ```
//! use rcape_common::prelude::*;
//! use rcape_gateway::{DriverRegistry, Gateway};
//!
//! let gateway = Gateway::from_config(&GatewayConfig::default(), &DriverRegistry::with_builtin())
//!     .unwrap();
//! gateway.initialize().unwrap();
//!
//! assert_eq!(gateway.call("set_motor", &[Value::Int(3), Value::Float(0.5)]).unwrap(), Value::Int(0));
//! assert!(matches!(
//!     gateway.call("set_motor", &[Value::Int(9), Value::Float(0.5)]),
//!     Err(GatewayError::Argument(_))
//! ));
//! ```

pub mod core;
pub mod dispatch;
pub mod driver_registry;
pub mod drivers;
pub mod operation;
pub mod script;
pub mod table;

// Re-export key types for convenience
pub use crate::core::Gateway;
pub use crate::driver_registry::DriverRegistry;
pub use crate::operation::{Args, OperationSpec, ParamSpec, ResultKind};
pub use crate::table::{OPERATIONS, Op};
