//! Identity invariants and construction.
//!
//! Invariants:
//! - An identity is an ordered tuple of typed values; its arity must
//!   equal the identity-column count of the owning engine.
//! - Identities are either fully populated or absent; there is no
//!   partially-constructed state.
//! - Equality is component-wise.

use crate::error::IdentityShapeError;
use derive_more::{Deref, IntoIterator};
use rowcast_primitives::Value;
use std::fmt::{self, Display};

///
/// Identity
///

#[derive(Clone, Debug, Deref, IntoIterator, PartialEq)]
pub struct Identity(#[into_iterator(owned, ref)] Vec<Value>);

impl Identity {
    #[must_use]
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn single(value: Value) -> Self {
        Self(vec![value])
    }

    /// Number of identity components.
    #[must_use]
    pub fn size(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.0
    }

    /// Check the arity against an engine's identity-column count.
    pub fn ensure_size(&self, expected: usize, type_name: &str) -> Result<(), IdentityShapeError> {
        if self.size() == expected {
            Ok(())
        } else {
            Err(IdentityShapeError {
                type_name: type_name.to_string(),
                expected,
                found: self.size(),
            })
        }
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_component_wise() {
        let a = Identity::new(vec![Value::Int(1), Value::Text("x".into())]);
        let b = Identity::new(vec![Value::Int(1), Value::Text("x".into())]);
        let c = Identity::new(vec![Value::Int(1), Value::Text("y".into())]);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn ensure_size_accepts_matching_arity() {
        let id = Identity::single(Value::Int(1));
        id.ensure_size(1, "Animal")
            .expect("matching arity should pass");
    }

    #[test]
    fn ensure_size_rejects_mismatched_arity() {
        let id = Identity::new(vec![Value::Int(1), Value::Int(2)]);
        let err = id
            .ensure_size(1, "Animal")
            .expect_err("mismatched arity should fail");

        assert_eq!(err.expected, 1);
        assert_eq!(err.found, 2);
        assert_eq!(err.type_name, "Animal");
    }

    #[test]
    fn display_renders_a_tuple() {
        let id = Identity::new(vec![Value::Int(7), Value::Text("k".into())]);
        assert_eq!(id.to_string(), "(7, 'k')");
    }

    #[test]
    fn iteration_walks_components_in_order() {
        let id = Identity::new(vec![Value::Int(1), Value::Int(2)]);
        let seen: Vec<&Value> = (&id).into_iter().collect();
        assert_eq!(seen, vec![&Value::Int(1), &Value::Int(2)]);
    }
}
