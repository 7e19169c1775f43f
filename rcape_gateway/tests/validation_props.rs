//! Property tests for argument validation.
//!
//! Walk the whole operation table: every integer range accepts its bounds
//! and rejects the values just outside them, stepped codes accept only
//! multiples of their step, and float ranges hold at their edges.

use proptest::prelude::*;
use rcape_common::prelude::*;
use rcape_gateway::{OPERATIONS, OperationSpec, ParamSpec};

/// A value every constraint of `param` accepts.
fn valid(param: &ParamSpec) -> Value {
    match param.constraint {
        Constraint::Any => match param.kind {
            ParamKind::Int => Value::Int(0),
            ParamKind::Float => Value::Float(0.0),
            ParamKind::Bytes => Value::Bytes(vec![0]),
            ParamKind::Words => Value::Words(vec![0]),
        },
        Constraint::IntRange { min, .. } | Constraint::MultipleOf { min, .. } => Value::Int(min),
        Constraint::OneOf(set) => Value::Int(set[0]),
        Constraint::FloatRange { min, .. } => Value::Float(min),
        Constraint::Positive => Value::Float(1.0),
        Constraint::Length { min, .. } => match param.kind {
            ParamKind::Words => Value::Words(vec![0; min]),
            _ => Value::Bytes(vec![0; min]),
        },
    }
}

/// Valid arguments for `spec` with `value` at `position`.
fn args_with(spec: &OperationSpec, position: usize, value: Value) -> Vec<Value> {
    let mut args: Vec<Value> = spec.params.iter().map(valid).collect();
    args[position] = value;
    args
}

/// Every (operation, position, param) in the table.
fn params() -> impl Iterator<Item = (&'static OperationSpec, usize, &'static ParamSpec)> {
    OPERATIONS
        .iter()
        .flat_map(|spec| spec.params.iter().enumerate().map(move |(i, p)| (spec, i, p)))
}

fn rejects_at(spec: &OperationSpec, position: usize, value: Value) -> bool {
    matches!(
        spec.validate(&args_with(spec, position, value)),
        Err(ArgumentError::OutOfRange { position: p, .. }) if p == position
    )
}

#[test]
fn valid_arguments_pass_every_operation() {
    for spec in OPERATIONS {
        let args: Vec<Value> = spec.params.iter().map(valid).collect();
        assert!(spec.validate(&args).is_ok(), "{} rejected its own minimum", spec.name);
    }
}

#[test]
fn integer_ranges_are_inclusive() {
    for (spec, position, param) in params() {
        let Constraint::IntRange { min, max } = param.constraint else {
            continue;
        };
        for edge in [min, max] {
            assert!(
                spec.validate(&args_with(spec, position, Value::Int(edge))).is_ok(),
                "{}.{} rejected bound {}",
                spec.name,
                param.name,
                edge
            );
        }
        for outside in [min - 1, max + 1] {
            assert!(
                rejects_at(spec, position, Value::Int(outside)),
                "{}.{} accepted {}",
                spec.name,
                param.name,
                outside
            );
        }
    }
}

#[test]
fn enumerations_reject_other_values() {
    for (spec, position, param) in params() {
        let Constraint::OneOf(set) = param.constraint else {
            continue;
        };
        for &member in set {
            assert!(spec.validate(&args_with(spec, position, Value::Int(member))).is_ok());
        }
        let outside = set.iter().max().copied().unwrap_or_default() + 1;
        assert!(rejects_at(spec, position, Value::Int(outside)));
        assert!(rejects_at(spec, position, Value::Int(-1)));
    }
}

#[test]
fn float_ranges_hold_at_their_edges() {
    for (spec, position, param) in params() {
        let Constraint::FloatRange { min, max } = param.constraint else {
            continue;
        };
        assert!(spec.validate(&args_with(spec, position, Value::Float(min))).is_ok());
        assert!(spec.validate(&args_with(spec, position, Value::Float(max))).is_ok());
        let step = (max - min) * 1e-3;
        assert!(rejects_at(spec, position, Value::Float(min - step)));
        assert!(rejects_at(spec, position, Value::Float(max + step)));
        assert!(rejects_at(spec, position, Value::Float(f64::NAN)));
    }
}

#[test]
fn positive_parameters_reject_zero() {
    for (spec, position, param) in params() {
        if param.constraint != Constraint::Positive {
            continue;
        }
        assert!(rejects_at(spec, position, Value::Float(0.0)));
        assert!(rejects_at(spec, position, Value::Float(-1.0)));
        assert!(rejects_at(spec, position, Value::Float(f64::INFINITY)));
    }
}

#[test]
fn sequence_lengths_are_bounded() {
    for (spec, position, param) in params() {
        let Constraint::Length { max, .. } = param.constraint else {
            continue;
        };
        let (empty, full, over) = match param.kind {
            ParamKind::Words => (
                Value::Words(Vec::new()),
                Value::Words(vec![0xFFFF; max]),
                Value::Words(vec![0; max + 1]),
            ),
            _ => (
                Value::Bytes(Vec::new()),
                Value::Bytes(vec![0xFF; max]),
                Value::Bytes(vec![0; max + 1]),
            ),
        };
        assert!(rejects_at(spec, position, empty));
        assert!(spec.validate(&args_with(spec, position, full)).is_ok());
        assert!(rejects_at(spec, position, over));
    }
}

proptest! {
    #[test]
    fn stepped_codes_accept_only_multiples(v in -8i64..=40) {
        for (spec, position, param) in params() {
            let Constraint::MultipleOf { step, min, max } = param.constraint else {
                continue;
            };
            let ok = spec.validate(&args_with(spec, position, Value::Int(v))).is_ok();
            prop_assert_eq!(ok, v % step == 0 && (min..=max).contains(&v));
        }
    }

    #[test]
    fn integer_ranges_match_containment(v in -300i64..=300) {
        for (spec, position, param) in params() {
            let Constraint::IntRange { min, max } = param.constraint else {
                continue;
            };
            let ok = spec.validate(&args_with(spec, position, Value::Int(v))).is_ok();
            prop_assert_eq!(ok, (min..=max).contains(&v), "{}.{} = {}", spec.name, param.name, v);
        }
    }

    #[test]
    fn floats_pass_anywhere_inside_their_range(t in 0.0f64..=1.0) {
        for (spec, position, param) in params() {
            let Constraint::FloatRange { min, max } = param.constraint else {
                continue;
            };
            let v = min + t * (max - min);
            prop_assert!(spec.validate(&args_with(spec, position, Value::Float(v))).is_ok());
        }
    }

    #[test]
    fn arity_mismatch_is_reported_first(extra in 1usize..4) {
        for spec in OPERATIONS {
            let args = vec![Value::Bytes(Vec::new()); spec.params.len() + extra];
            let is_arity = matches!(
                spec.validate(&args),
                Err(ArgumentError::Arity { .. })
            );
            prop_assert!(is_arity);
        }
    }
}
