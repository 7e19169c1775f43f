//! Operation descriptors and argument validation.
//!
//! An [`OperationSpec`] is the static description of one hardware
//! operation: its name, the native symbol it forwards to, an ordered list
//! of typed [`ParamSpec`]s and the kind of result it produces.
//! [`OperationSpec::validate`] is the single boundary where dynamic
//! arguments become trusted ones.
//!
//! # Validation order
//!
//! 1. Arity
//! 2. Type of every argument, in declared order
//! 3. Constraint of every argument, in declared order
//!
//! The first failure is reported; violations are never aggregated.

use crate::table::Op;
use rcape_common::cape::constraint::Constraint;
use rcape_common::cape::error::ArgumentError;
use rcape_common::cape::value::{ParamKind, Value};
use serde::Serialize;

/// Typed parameter descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    /// Parameter name as shown in errors and listings.
    pub name: &'static str,
    /// Accepted value kind.
    pub kind: ParamKind,
    /// Validity rule.
    pub constraint: Constraint,
}

impl ParamSpec {
    /// Integer in `[min, max]`.
    pub const fn int(name: &'static str, min: i64, max: i64) -> Self {
        Self {
            name,
            kind: ParamKind::Int,
            constraint: Constraint::IntRange { min, max },
        }
    }

    /// Any value representable as a native `int`.
    pub const fn native_int(name: &'static str) -> Self {
        Self::int(name, i32::MIN as i64, i32::MAX as i64)
    }

    /// Integer from a fixed set.
    pub const fn one_of(name: &'static str, set: &'static [i64]) -> Self {
        Self {
            name,
            kind: ParamKind::Int,
            constraint: Constraint::OneOf(set),
        }
    }

    /// Multiple of `step` in `[min, max]`.
    pub const fn multiple_of(name: &'static str, step: i64, min: i64, max: i64) -> Self {
        Self {
            name,
            kind: ParamKind::Int,
            constraint: Constraint::MultipleOf { step, min, max },
        }
    }

    /// Float in `[min, max]`.
    pub const fn float(name: &'static str, min: f64, max: f64) -> Self {
        Self {
            name,
            kind: ParamKind::Float,
            constraint: Constraint::FloatRange { min, max },
        }
    }

    /// Strictly positive float.
    pub const fn positive(name: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Float,
            constraint: Constraint::Positive,
        }
    }

    /// Byte sequence of `1..=max` elements.
    pub const fn bytes(name: &'static str, max: usize) -> Self {
        Self {
            name,
            kind: ParamKind::Bytes,
            constraint: Constraint::Length { min: 1, max },
        }
    }

    /// Word sequence of `1..=max` elements.
    pub const fn words(name: &'static str, max: usize) -> Self {
        Self {
            name,
            kind: ParamKind::Words,
            constraint: Constraint::Length { min: 1, max },
        }
    }
}

/// What an operation hands back on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    /// Integer status, always 0 on success.
    Status,
    /// Integer reading.
    Int,
    /// Boolean as integer (0/1).
    Flag,
    /// Float reading in physical units.
    Float,
    /// Elapsed time as an integer.
    Duration,
    /// Byte sequence.
    Bytes,
    /// 16-bit word sequence.
    Words,
}

/// Static description of one hardware operation.
#[derive(Debug)]
pub struct OperationSpec {
    /// Dispatch key.
    pub op: Op,
    /// Caller-facing name.
    pub name: &'static str,
    /// Native entry point(s) the operation forwards to.
    pub native: &'static str,
    /// Positional parameters.
    pub params: &'static [ParamSpec],
    /// Result kind on success.
    pub result: ResultKind,
    /// One-line description.
    pub summary: &'static str,
}

impl OperationSpec {
    /// Validate positional arguments against this descriptor.
    ///
    /// # Errors
    /// Returns the first [`ArgumentError`] found, in the order described in
    /// the module documentation.
    pub fn validate<'a>(&self, args: &'a [Value]) -> Result<Args<'a>, ArgumentError> {
        if args.len() != self.params.len() {
            return Err(ArgumentError::Arity {
                op: self.name,
                expected: self.params.len(),
                got: args.len(),
            });
        }

        for (position, (param, value)) in self.params.iter().zip(args).enumerate() {
            if !value.fits(param.kind) {
                return Err(ArgumentError::Type {
                    op: self.name,
                    param: param.name,
                    position,
                    expected: param.kind,
                    got: value.type_name().to_string(),
                });
            }
        }

        for (position, (param, value)) in self.params.iter().zip(args).enumerate() {
            if !param.constraint.check(value) {
                return Err(ArgumentError::OutOfRange {
                    op: self.name,
                    param: param.name,
                    position,
                    constraint: param.constraint,
                    value: describe(value),
                });
            }
        }

        Ok(Args {
            op: self.name,
            params: self.params,
            values: args,
        })
    }

    /// True for `initialize` and `cleanup`.
    pub fn is_lifecycle(&self) -> bool {
        matches!(self.op, Op::Initialize | Op::Cleanup)
    }

    /// Human-readable signature, e.g. `set_motor(motor: int, duty: float)`.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| format!("{}: {}", p.name, p.kind))
            .collect();
        format!("{}({})", self.name, params.join(", "))
    }
}

/// Argument value as shown in range errors; long sequences show their length.
fn describe(value: &Value) -> String {
    match value {
        Value::Bytes(v) => format!("{} byte(s)", v.len()),
        Value::Words(v) => format!("{} word(s)", v.len()),
        other => other.to_string(),
    }
}

/// Arguments that passed validation.
///
/// Accessors still return `Result` so a descriptor/dispatch mismatch shows
/// up as an error instead of a panic.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    op: &'static str,
    params: &'static [ParamSpec],
    values: &'a [Value],
}

impl<'a> Args<'a> {
    fn mismatch(&self, position: usize, expected: ParamKind) -> ArgumentError {
        let got = self
            .values
            .get(position)
            .map_or("missing", Value::type_name);
        ArgumentError::Type {
            op: self.op,
            param: self.params.get(position).map_or("?", |p| p.name),
            position,
            expected,
            got: got.to_string(),
        }
    }

    /// Integer argument at `position`.
    pub fn int(&self, position: usize) -> Result<i64, ArgumentError> {
        self.values
            .get(position)
            .and_then(Value::as_int)
            .ok_or_else(|| self.mismatch(position, ParamKind::Int))
    }

    /// Float argument at `position` (integers widened).
    pub fn float(&self, position: usize) -> Result<f64, ArgumentError> {
        self.values
            .get(position)
            .and_then(Value::as_float)
            .ok_or_else(|| self.mismatch(position, ParamKind::Float))
    }

    /// Integer argument at `position` decoded into a code enum.
    pub fn code<T: TryFrom<i64>>(&self, position: usize) -> Result<T, ArgumentError> {
        let raw = self.int(position)?;
        T::try_from(raw).map_err(|_| ArgumentError::OutOfRange {
            op: self.op,
            param: self.params[position].name,
            position,
            constraint: self.params[position].constraint,
            value: raw.to_string(),
        })
    }

    /// Byte sequence argument at `position`.
    pub fn bytes(&self, position: usize) -> Result<&'a [u8], ArgumentError> {
        self.values
            .get(position)
            .and_then(Value::as_bytes)
            .ok_or_else(|| self.mismatch(position, ParamKind::Bytes))
    }

    /// Word sequence argument at `position`.
    pub fn words(&self, position: usize) -> Result<&'a [u16], ArgumentError> {
        self.values
            .get(position)
            .and_then(Value::as_words)
            .ok_or_else(|| self.mismatch(position, ParamKind::Words))
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the operation takes no arguments.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
