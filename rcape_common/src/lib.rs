//! rcape Common Library
//!
//! Shared constants, types and configuration loading for the Robotics Cape
//! command gateway workspace.
//!
//! # Module Structure
//!
//! - [`consts`] - Channel ranges, electrical limits and GPIO lines
//! - [`cape`] - Driver trait, errors, values, constraints and gateway config
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use rcape_common::prelude::*;
//!
//! let rule = Constraint::IntRange { min: MOTOR_MIN, max: MOTOR_MAX };
//! assert!(rule.check(&Value::Int(3)));
//! ```

pub mod cape;
pub mod config;
pub mod consts;
pub mod prelude;
