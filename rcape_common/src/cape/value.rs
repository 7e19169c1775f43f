//! Dynamic argument and result values.
//!
//! `Value` is what a dynamic caller hands to the gateway and what it gets
//! back. Parameters are typed by `ParamKind`; floats accept integer values
//! (widened), never the reverse.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Semantic parameter type used for arity/type checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Int,
    Float,
    Bytes,
    Words,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Bytes => write!(f, "bytes"),
            Self::Words => write!(f, "words"),
        }
    }
}

/// A caller-supplied argument or a translated native result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// No meaningful result.
    #[default]
    None,
    Int(i64),
    Float(f64),
    Bytes(Vec<u8>),
    Words(Vec<u16>),
}

impl Value {
    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bytes(_) => "bytes",
            Self::Words(_) => "words",
        }
    }

    /// True if this value can be bound to a parameter of `kind`.
    pub fn fits(&self, kind: ParamKind) -> bool {
        matches!(
            (self, kind),
            (Self::Int(_), ParamKind::Int)
                | (Self::Int(_) | Self::Float(_), ParamKind::Float)
                | (Self::Bytes(_), ParamKind::Bytes)
                | (Self::Words(_), ParamKind::Words)
        )
    }

    /// Integer payload.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Float payload, widening integers.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Byte payload.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(v) => Some(v),
            _ => None,
        }
    }

    /// Word payload.
    pub fn as_words(&self) -> Option<&[u16]> {
        match self {
            Self::Words(v) => Some(v),
            _ => None,
        }
    }

    /// Length of a sequence payload.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Bytes(v) => Some(v.len()),
            Self::Words(v) => Some(v.len()),
            _ => None,
        }
    }

    /// Whether a sequence payload has no elements.
    pub fn is_empty(&self) -> Option<bool> {
        self.len().map(|n| n == 0)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bytes(v) => {
                let parts: Vec<String> = v.iter().map(|b| format!("0x{b:02x}")).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::Words(v) => {
                let parts: Vec<String> = v.iter().map(|w| format!("0x{w:04x}")).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v as f64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Int(v as i64)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<Vec<u16>> for Value {
    fn from(v: Vec<u16>) -> Self {
        Self::Words(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_widens_to_float_but_not_back() {
        assert!(Value::Int(3).fits(ParamKind::Float));
        assert!(!Value::Float(3.0).fits(ParamKind::Int));
        assert_eq!(Value::Int(3).as_float(), Some(3.0));
        assert_eq!(Value::Float(3.0).as_int(), None);
    }

    #[test]
    fn sequences_only_fit_their_own_kind() {
        assert!(Value::Bytes(vec![1]).fits(ParamKind::Bytes));
        assert!(!Value::Bytes(vec![1]).fits(ParamKind::Words));
        assert!(!Value::Words(vec![1]).fits(ParamKind::Int));
        assert_eq!(Value::Words(vec![1, 2]).len(), Some(2));
    }

    #[test]
    fn emptiness_is_only_defined_for_sequences() {
        assert_eq!(Value::Bytes(Vec::new()).is_empty(), Some(true));
        assert_eq!(Value::Words(vec![7]).is_empty(), Some(false));
        assert_eq!(Value::Int(0).is_empty(), None);
        assert_eq!(Value::None.is_empty(), None);
    }

    #[test]
    fn display_formats_sequences_as_hex() {
        assert_eq!(Value::Bytes(vec![0x0a, 0xff]).to_string(), "[0x0a, 0xff]");
        assert_eq!(Value::Words(vec![0x1234]).to_string(), "[0x1234]");
        assert_eq!(Value::Int(-7).to_string(), "-7");
    }

    #[test]
    fn bool_converts_to_flag() {
        assert_eq!(Value::from(true), Value::Int(1));
        assert_eq!(Value::from(false), Value::Int(0));
    }
}
