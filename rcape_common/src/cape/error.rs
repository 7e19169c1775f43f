//! Gateway error taxonomy.
//!
//! - `ArgumentError` - bad arity, type or value; raised before any native call
//! - `GatewayError` - everything a gateway call can fail with

use crate::cape::constraint::Constraint;
use crate::cape::types::LifecycleState;
use crate::cape::value::ParamKind;
use thiserror::Error;

/// Caller supplied arguments that do not match the operation descriptor.
///
/// Carries enough detail for the caller to tell which constraint failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArgumentError {
    /// Wrong number of positional arguments.
    #[error("{op}() takes {expected} argument(s) but {got} were given")]
    Arity {
        op: &'static str,
        expected: usize,
        got: usize,
    },

    /// Argument of the wrong type.
    #[error("{op}(): argument {position} ({param}) must be {expected}, got {got}")]
    Type {
        op: &'static str,
        param: &'static str,
        position: usize,
        expected: ParamKind,
        got: String,
    },

    /// Argument outside its validity constraint.
    #[error("{op}(): {param} must be {constraint}, got {value}")]
    OutOfRange {
        op: &'static str,
        param: &'static str,
        position: usize,
        constraint: Constraint,
        value: String,
    },
}

impl ArgumentError {
    /// Name of the parameter at fault, if the failure is about one parameter.
    pub fn param(&self) -> Option<&'static str> {
        match self {
            Self::Arity { .. } => None,
            Self::Type { param, .. } | Self::OutOfRange { param, .. } => Some(param),
        }
    }

    /// Violated constraint for range failures.
    pub fn constraint(&self) -> Option<&Constraint> {
        match self {
            Self::OutOfRange { constraint, .. } => Some(constraint),
            _ => None,
        }
    }
}

/// Error returned by every gateway operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// Arguments rejected before reaching the driver.
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    /// Native call reported failure after validation passed.
    #[error("{op}: driver returned failure status {code}")]
    Driver { op: &'static str, code: i32 },

    /// Operation recognized but not provided by the active driver.
    #[error("{op}: not implemented by the active driver")]
    NotImplemented { op: &'static str },

    /// Operation invoked in the wrong lifecycle state.
    #[error("{op}: not allowed while the hardware library is {state}")]
    Lifecycle {
        op: &'static str,
        state: LifecycleState,
    },

    /// No operation with this name.
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// No driver registered under this name.
    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    /// True for errors raised before any native call was made.
    pub fn is_pre_dispatch(&self) -> bool {
        matches!(
            self,
            Self::Argument(_) | Self::Lifecycle { .. } | Self::UnknownOperation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_message_names_constraint() {
        let err = ArgumentError::OutOfRange {
            op: "set_motor",
            param: "motor",
            position: 0,
            constraint: Constraint::IntRange { min: 1, max: 8 },
            value: "9".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "set_motor(): motor must be an integer in [1, 8], got 9"
        );
        assert_eq!(err.param(), Some("motor"));
        assert!(err.constraint().is_some());
    }

    #[test]
    fn argument_error_is_transparent() {
        let err: GatewayError = ArgumentError::Arity {
            op: "set_led",
            expected: 2,
            got: 1,
        }
        .into();
        assert_eq!(err.to_string(), "set_led() takes 2 argument(s) but 1 were given");
        assert!(err.is_pre_dispatch());
    }

    #[test]
    fn driver_error_is_post_dispatch() {
        let err = GatewayError::Driver { op: "set_motor", code: -1 };
        assert!(!err.is_pre_dispatch());
        assert!(err.to_string().contains("-1"));
    }

    #[test]
    fn lifecycle_error_names_state() {
        let err = GatewayError::Lifecycle {
            op: "adc_raw",
            state: LifecycleState::ShutDown,
        };
        assert!(err.to_string().contains("shut down"));
    }
}
