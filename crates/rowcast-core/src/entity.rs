//! Per-operation entity payload.

use rowcast_primitives::Value;

///
/// EntityData
///
/// The field values of one logical instance, index-aligned with the
/// owning engine's resolved field list. Caller-owned, mutable only
/// between operations; the engine never retains a reference past a
/// call.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityData {
    values: Vec<Value>,
}

impl EntityData {
    #[must_use]
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// An all-`Null` payload of the given arity, ready for `load`.
    #[must_use]
    pub fn with_arity(arity: usize) -> Self {
        Self {
            values: vec![Value::Null; arity],
        }
    }

    #[must_use]
    pub fn value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn set_value(&mut self, index: usize, value: Value) {
        if self.values.len() <= index {
            self.values.resize(index + 1, Value::Null);
        }
        self.values[index] = value;
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
