//! Storage value model.
//!
//! Invariants:
//! - `Value` is the only representation that crosses the statement
//!   boundary; entities and identities are built from it.
//! - `Null` means SQL NULL; it passes through every converter unchanged.
//! - `Composite` carries the per-column values of a multi-column field,
//!   in column order.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt::{self, Display};
use thiserror::Error as ThisError;

///
/// ConvertError
///

#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum ConvertError {
    #[error("cannot convert {from} to {to}")]
    Unsupported { from: &'static str, to: &'static str },

    #[error("composite value has arity {found}, expected {expected}")]
    CompositeArity { expected: usize, found: usize },

    #[error("value {value} does not fit {to}")]
    OutOfRange { value: String, to: &'static str },
}

///
/// Value
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Composite(Vec<Value>),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Stable label used in conversion and diagnostic messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Date(_) => "date",
            Self::Timestamp(_) => "timestamp",
            Self::Composite(_) => "composite",
        }
    }

    /// Split a field value into exactly `arity` per-column values.
    ///
    /// Single-column fields pass through; multi-column fields must carry
    /// a `Composite` of matching arity.
    pub fn into_columns(self, arity: usize) -> Result<Vec<Self>, ConvertError> {
        if arity == 1 {
            return Ok(vec![self]);
        }

        match self {
            Self::Null => Ok(vec![Self::Null; arity]),
            Self::Composite(values) if values.len() == arity => Ok(values),
            Self::Composite(values) => Err(ConvertError::CompositeArity {
                expected: arity,
                found: values.len(),
            }),
            other => Err(ConvertError::Unsupported {
                from: other.type_name(),
                to: "composite",
            }),
        }
    }

    /// Reassemble per-column values into one field value.
    #[must_use]
    pub fn from_columns(mut values: Vec<Self>) -> Self {
        if values.len() == 1 {
            values.remove(0)
        } else {
            Self::Composite(values)
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "'{v}'"),
            Self::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Self::Date(v) => write!(f, "{v}"),
            Self::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
            Self::Composite(values) => {
                f.write_str("(")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_columns_passes_single_column_values_through() {
        let cols = Value::Int(7)
            .into_columns(1)
            .expect("single-column split should succeed");
        assert_eq!(cols, vec![Value::Int(7)]);
    }

    #[test]
    fn into_columns_splits_matching_composite() {
        let cols = Value::Composite(vec![Value::Int(1), Value::Text("a".into())])
            .into_columns(2)
            .expect("matching composite should split");
        assert_eq!(cols, vec![Value::Int(1), Value::Text("a".into())]);
    }

    #[test]
    fn into_columns_rejects_arity_mismatch() {
        let err = Value::Composite(vec![Value::Int(1)])
            .into_columns(2)
            .expect_err("short composite should fail");
        assert_eq!(
            err,
            ConvertError::CompositeArity {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn into_columns_expands_null_across_columns() {
        let cols = Value::Null
            .into_columns(3)
            .expect("null should expand to every column");
        assert_eq!(cols, vec![Value::Null, Value::Null, Value::Null]);
    }

    #[test]
    fn into_columns_rejects_scalar_for_multi_column_field() {
        let err = Value::Int(1)
            .into_columns(2)
            .expect_err("scalar cannot fill two columns");
        assert!(matches!(err, ConvertError::Unsupported { .. }));
    }

    #[test]
    fn from_columns_unwraps_single_values() {
        assert_eq!(Value::from_columns(vec![Value::Int(3)]), Value::Int(3));
    }

    #[test]
    fn from_columns_wraps_multi_values() {
        let v = Value::from_columns(vec![Value::Int(3), Value::Int(4)]);
        assert_eq!(v, Value::Composite(vec![Value::Int(3), Value::Int(4)]));
    }

    #[test]
    fn display_quotes_text_and_uppercases_null() {
        assert_eq!(Value::Text("abc".into()).to_string(), "'abc'");
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(
            Value::Composite(vec![Value::Int(1), Value::Null]).to_string(),
            "(1, NULL)"
        );
    }
}
