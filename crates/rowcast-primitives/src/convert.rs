//! Value converters between in-memory and storage representations.
//!
//! Converters are plain function pointers so field descriptors stay
//! cheap to clone and trivially immutable. Every converter passes
//! `Null` through unchanged; SQL NULL has no in-memory counterpart to
//! convert.

use crate::value::{ConvertError, Value};
use chrono::DateTime;

/// Bidirectional conversion contract carried by field descriptors.
pub type ConvertFn = fn(&Value) -> Result<Value, ConvertError>;

/// Identity conversion; the default for fields whose storage and
/// in-memory representations coincide.
pub fn pass(value: &Value) -> Result<Value, ConvertError> {
    Ok(value.clone())
}

/// `Bool` → `Int` (0/1), for engines without a boolean column type.
pub fn bool_to_smallint(value: &Value) -> Result<Value, ConvertError> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Bool(v) => Ok(Value::Int(i64::from(*v))),
        other => Err(ConvertError::Unsupported {
            from: other.type_name(),
            to: "int",
        }),
    }
}

/// `Int` (0/1) → `Bool`.
pub fn smallint_to_bool(value: &Value) -> Result<Value, ConvertError> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Int(0) => Ok(Value::Bool(false)),
        Value::Int(1) => Ok(Value::Bool(true)),
        Value::Int(v) => Err(ConvertError::OutOfRange {
            value: v.to_string(),
            to: "bool",
        }),
        other => Err(ConvertError::Unsupported {
            from: other.type_name(),
            to: "bool",
        }),
    }
}

/// `Timestamp` → `Int` epoch milliseconds.
pub fn timestamp_to_bigint(value: &Value) -> Result<Value, ConvertError> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Timestamp(v) => Ok(Value::Int(v.timestamp_millis())),
        other => Err(ConvertError::Unsupported {
            from: other.type_name(),
            to: "int",
        }),
    }
}

/// `Int` epoch milliseconds → `Timestamp`.
pub fn bigint_to_timestamp(value: &Value) -> Result<Value, ConvertError> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Int(v) => DateTime::from_timestamp_millis(*v).map_or_else(
            || {
                Err(ConvertError::OutOfRange {
                    value: v.to_string(),
                    to: "timestamp",
                })
            },
            |ts| Ok(Value::Timestamp(ts)),
        ),
        other => Err(ConvertError::Unsupported {
            from: other.type_name(),
            to: "timestamp",
        }),
    }
}
