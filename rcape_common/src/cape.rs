//! Robotics Cape gateway types.
//!
//! Everything the gateway crate and its drivers share: the driver trait,
//! the error taxonomy, the dynamic value model, parameter constraints,
//! domain enums and configuration.

pub mod config;
pub mod constraint;
pub mod driver;
pub mod error;
pub mod types;
pub mod value;
