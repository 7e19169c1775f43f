//! Parameter validity constraints.
//!
//! A `Constraint` is a closed rule over one parameter value: an inclusive
//! range, an enumeration, a stepped range, a positivity requirement or a
//! sequence length bound. Checks are pure; callers decide what a failure
//! means.

use crate::cape::value::Value;
use core::fmt;

/// Validity rule attached to a parameter descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
    /// Any value of the right type.
    Any,
    /// Inclusive integer range.
    IntRange { min: i64, max: i64 },
    /// Integer enumeration.
    OneOf(&'static [i64]),
    /// Inclusive integer range restricted to multiples of `step`.
    MultipleOf { step: i64, min: i64, max: i64 },
    /// Inclusive float range.
    FloatRange { min: f64, max: f64 },
    /// Strictly positive float.
    Positive,
    /// Inclusive sequence length range.
    Length { min: usize, max: usize },
}

impl Constraint {
    /// Check `value` against this rule.
    ///
    /// Values of a kind the rule does not speak about are rejected; type
    /// checking happens before this is called.
    pub fn check(&self, value: &Value) -> bool {
        match *self {
            Self::Any => true,
            Self::IntRange { min, max } => value.as_int().is_some_and(|v| (min..=max).contains(&v)),
            Self::OneOf(set) => value.as_int().is_some_and(|v| set.contains(&v)),
            Self::MultipleOf { step, min, max } => value
                .as_int()
                .is_some_and(|v| v % step == 0 && (min..=max).contains(&v)),
            Self::FloatRange { min, max } => value
                .as_float()
                .is_some_and(|v| v.is_finite() && v >= min && v <= max),
            Self::Positive => value.as_float().is_some_and(|v| v.is_finite() && v > 0.0),
            Self::Length { min, max } => value.len().is_some_and(|n| (min..=max).contains(&n)),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any value"),
            Self::IntRange { min, max } => write!(f, "an integer in [{min}, {max}]"),
            Self::OneOf(set) => {
                let parts: Vec<String> = set.iter().map(|v| v.to_string()).collect();
                write!(f, "one of {{{}}}", parts.join(", "))
            }
            Self::MultipleOf { step, min, max } => {
                write!(f, "a multiple of {step} in [{min}, {max}]")
            }
            Self::FloatRange { min, max } => write!(f, "a number in [{min}, {max}]"),
            Self::Positive => write!(f, "a number > 0"),
            Self::Length { min, max } => write!(f, "a length in [{min}, {max}]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn int_range_is_inclusive() {
        let c = Constraint::IntRange { min: 1, max: 8 };
        assert!(c.check(&Value::Int(1)));
        assert!(c.check(&Value::Int(8)));
        assert!(!c.check(&Value::Int(0)));
        assert!(!c.check(&Value::Int(9)));
    }

    #[test]
    fn float_range_rejects_nan() {
        let c = Constraint::FloatRange { min: -1.0, max: 1.0 };
        assert!(c.check(&Value::Float(-1.0)));
        assert!(c.check(&Value::Int(1)));
        assert!(!c.check(&Value::Float(f64::NAN)));
        assert!(!c.check(&Value::Float(1.000_001)));
    }

    #[test]
    fn positive_excludes_zero() {
        assert!(!Constraint::Positive.check(&Value::Float(0.0)));
        assert!(Constraint::Positive.check(&Value::Float(0.001)));
        assert!(!Constraint::Positive.check(&Value::Float(f64::INFINITY)));
    }

    #[test]
    fn length_bounds_sequences() {
        let c = Constraint::Length { min: 1, max: 3 };
        assert!(!c.check(&Value::Bytes(vec![])));
        assert!(c.check(&Value::Bytes(vec![1, 2, 3])));
        assert!(!c.check(&Value::Words(vec![1, 2, 3, 4])));
        assert!(!c.check(&Value::Int(2)));
    }

    #[test]
    fn display_names_the_rule() {
        assert_eq!(
            Constraint::IntRange { min: 1, max: 2 }.to_string(),
            "an integer in [1, 2]"
        );
        assert_eq!(Constraint::OneOf(&[0, 1]).to_string(), "one of {0, 1}");
        assert_eq!(
            Constraint::MultipleOf { step: 4, min: 0, max: 16 }.to_string(),
            "a multiple of 4 in [0, 16]"
        );
    }

    proptest! {
        #[test]
        fn multiple_of_requires_both_step_and_range(v in -40i64..60) {
            let c = Constraint::MultipleOf { step: 4, min: 4, max: 20 };
            let expected = v % 4 == 0 && (4..=20).contains(&v);
            prop_assert_eq!(c.check(&Value::Int(v)), expected);
        }
    }
}
