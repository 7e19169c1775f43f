//! Line-oriented call surface.
//!
//! One call per line, `name arg arg ...`, with `#` starting a comment:
//!
//! ```text
//! # spin motor 3 forward at half power
//! enable_motors
//! set_motor 3 0.5
//! i2c_write_bytes 1 0x6B 0x00,0x01
//! ```
//!
//! Tokens are parsed by the kind of the parameter they bind to: integers
//! (decimal or `0x` hex), floats, or comma-separated byte/word lists.
//! Range checks are left to the gateway so errors read the same whichever
//! way an operation is called.

use crate::core::Gateway;
use crate::table::Op;
use rcape_common::cape::error::GatewayError;
use rcape_common::cape::value::{ParamKind, Value};
use serde::Serialize;
use std::io::BufRead;
use thiserror::Error;
use tracing::warn;

/// A parsed line.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub op: Op,
    pub args: Vec<Value>,
}

/// Why a line or a script failed.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    #[error("argument {position} ('{token}') is not a valid {kind}")]
    BadToken {
        position: usize,
        token: String,
        kind: ParamKind,
    },

    #[error("line {line}: {message}")]
    Line { line: usize, message: String },

    #[error("line {line}: {source}")]
    Call {
        line: usize,
        #[source]
        source: GatewayError,
    },

    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

fn parse_int(token: &str) -> Option<i64> {
    let (negative, digits) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    // Exactly one optional leading '-'; the body is bare digits.
    if !digits.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) if !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()) => {
            i64::from_str_radix(hex, 16).ok()?
        }
        Some(_) => return None,
        None if digits.chars().all(|c| c.is_ascii_digit()) => digits.parse::<i64>().ok()?,
        None => return None,
    };
    Some(if negative { -magnitude } else { magnitude })
}

fn parse_list<T: TryFrom<i64>>(token: &str) -> Option<Vec<T>> {
    token
        .split(',')
        .map(|part| parse_int(part.trim()).and_then(|v| T::try_from(v).ok()))
        .collect()
}

/// Parse a token for a parameter of `kind`.
fn parse_token(token: &str, kind: ParamKind) -> Option<Value> {
    match kind {
        ParamKind::Int => parse_int(token).map(Value::Int),
        ParamKind::Float => parse_int(token)
            .map(Value::Int)
            .or_else(|| token.parse::<f64>().ok().map(Value::Float)),
        ParamKind::Bytes => parse_list::<u8>(token).map(Value::Bytes),
        ParamKind::Words => parse_list::<u16>(token).map(Value::Words),
    }
}

/// Parse one line. Blank lines and comments yield `None`.
///
/// Surplus tokens are still parsed (as numbers) so the gateway can report
/// the arity mismatch.
pub fn parse_line(line: &str) -> Result<Option<Command>, ScriptError> {
    let code = line.split('#').next().unwrap_or_default();
    let mut tokens = code.split_whitespace();
    let Some(name) = tokens.next() else {
        return Ok(None);
    };
    let op = Op::from_name(name).ok_or_else(|| ScriptError::UnknownOperation(name.to_string()))?;
    let params = op.spec().params;

    let args = tokens
        .enumerate()
        .map(|(position, token)| {
            let kind = params.get(position).map_or(ParamKind::Float, |p| p.kind);
            parse_token(token, kind).ok_or_else(|| ScriptError::BadToken {
                position,
                token: token.to_string(),
                kind,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(Command { op, args }))
}

/// Result of one executed line, as reported to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub line: usize,
    pub op: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Totals for a finished script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub executed: usize,
    pub failed: usize,
}

/// Runs scripts against a gateway.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptRunner {
    /// Continue after a failing line instead of stopping.
    pub keep_going: bool,
}

impl ScriptRunner {
    pub fn new(keep_going: bool) -> Self {
        Self { keep_going }
    }

    /// Execute every line of `input`, reporting each executed line.
    ///
    /// # Errors
    /// The first failing line, unless `keep_going` is set; I/O errors
    /// always stop the run.
    pub fn run<R: BufRead>(
        &self,
        gateway: &Gateway,
        input: R,
        mut report: impl FnMut(&Outcome),
    ) -> Result<Summary, ScriptError> {
        let mut summary = Summary::default();

        for (idx, line) in input.lines().enumerate() {
            let line_no = idx + 1;
            let text = line?;

            let (op, result) = match parse_line(&text) {
                Ok(None) => continue,
                Ok(Some(cmd)) => {
                    let result = gateway.dispatch(cmd.op, &cmd.args);
                    (cmd.op.name().to_string(), result.map_err(LineFailure::Call))
                }
                Err(e) => {
                    let name = text.split_whitespace().next().unwrap_or_default();
                    (name.to_string(), Err(LineFailure::Parse(e.to_string())))
                }
            };

            summary.executed += 1;
            let outcome = match &result {
                Ok(value) => Outcome {
                    line: line_no,
                    op,
                    value: Some(value.clone()),
                    error: None,
                },
                Err(failure) => Outcome {
                    line: line_no,
                    op,
                    value: None,
                    error: Some(failure.to_string()),
                },
            };
            report(&outcome);

            if let Err(failure) = result {
                summary.failed += 1;
                if !self.keep_going {
                    return Err(failure.at(line_no));
                }
            }
        }

        Ok(summary)
    }

    /// Initialize the gateway, run `input`, then clean up unless the
    /// script already did.
    ///
    /// # Errors
    /// The script's own failure wins over a failing cleanup, which is then
    /// only logged.
    pub fn run_managed<R: BufRead>(
        &self,
        gateway: &Gateway,
        input: R,
        report: impl FnMut(&Outcome),
    ) -> Result<Summary, ScriptError> {
        gateway.initialize()?;
        let result = self.run(gateway, input, report);
        let shutdown = gateway.shutdown();

        let summary = match result {
            Ok(summary) => summary,
            Err(e) => {
                if let Err(cleanup) = shutdown {
                    warn!("Cleanup after failed script also failed: {}", cleanup);
                }
                return Err(e);
            }
        };
        shutdown?;
        Ok(summary)
    }
}

enum LineFailure {
    Parse(String),
    Call(GatewayError),
}

impl LineFailure {
    fn at(self, line: usize) -> ScriptError {
        match self {
            Self::Parse(message) => ScriptError::Line { line, message },
            Self::Call(source) => ScriptError::Call { line, source },
        }
    }
}

impl std::fmt::Display for LineFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => f.write_str(message),
            Self::Call(e) => write!(f, "{e}"),
        }
    }
}
