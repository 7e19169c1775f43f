//! Prelude module for common re-exports.
//!
//! ```rust
//! use rcape_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::cape::config::{GatewayConfig, SimulationConfig};
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── Driver ─────────────────────────────────────────────────────────
pub use crate::cape::driver::{CapeDriver, DriverFactory, NOT_IMPLEMENTED, STATUS_OK};

// ─── Errors ─────────────────────────────────────────────────────────
pub use crate::cape::error::{ArgumentError, GatewayError};

// ─── Values ─────────────────────────────────────────────────────────
pub use crate::cape::constraint::Constraint;
pub use crate::cape::types::{
    BmpFilter, BmpOversample, BoardModel, Button, ButtonState, CpuFreq, Led, LifecycleState,
    RobotState,
};
pub use crate::cape::value::{ParamKind, Value};

// ─── Constants ──────────────────────────────────────────────────────
pub use crate::consts::{MOTOR_MAX, MOTOR_MIN};
