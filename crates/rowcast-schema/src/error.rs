use std::collections::BTreeMap;
use std::fmt::{self, Display};
use thiserror::Error as ThisError;

///
/// SchemaError
///
/// Fatal construction-time failures. A registry that produces any of
/// these is unusable; no partial engine is made available.
///

#[derive(Debug, ThisError)]
pub enum SchemaError {
    #[error("type '{name}' already registered")]
    DuplicateType { name: String },

    #[error("registry already validated; cannot register '{name}'")]
    RegistryFrozen { name: String },

    #[error("circular extends chain at '{name}'")]
    CircularExtends { name: String },

    #[error("extends target '{target}' of '{name}' is not registered")]
    UnknownExtends { name: String, target: String },

    #[error("identity field '{field}' on '{type_name}' has no storage metadata")]
    IdentityWithoutStorage { type_name: String, field: String },

    #[error("identity field '{field}' on '{type_name}' must map to exactly one column")]
    IdentityColumnCount { type_name: String, field: String },

    #[error("type '{type_name}' has no field '{field}'")]
    UnknownField { type_name: String, field: String },

    #[error("field '{field}' on '{type_name}' is not a relation")]
    NotARelation { type_name: String, field: String },

    #[error("engine parent mismatch for '{name}': expected '{expected}', found '{found}'")]
    ParentMismatch {
        name: String,
        expected: String,
        found: String,
    },

    #[error(
        "{context} override on '{type_name}.{field}' has arity {found}, expected {expected}"
    )]
    OverrideArity {
        type_name: String,
        field: String,
        context: &'static str,
        expected: usize,
        found: usize,
    },
}

///
/// ErrorTree
///
/// Route-keyed aggregation of validation failures. Routes are type
/// names, or `type.field` for field-level failures; iteration order is
/// deterministic.
///

#[derive(Debug, Default)]
pub struct ErrorTree {
    entries: BTreeMap<String, Vec<String>>,
}

impl ErrorTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one failure under a route.
    pub fn add(&mut self, route: &str, message: impl Display) {
        self.entries
            .entry(route.to_string())
            .or_default()
            .push(message.to_string());
    }

    /// Total number of recorded messages across all routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Messages recorded under one route.
    #[must_use]
    pub fn messages_for(&self, route: &str) -> &[String] {
        self.entries.get(route).map_or(&[], Vec::as_slice)
    }

    pub fn routes(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(route, messages)| (route.as_str(), messages.as_slice()))
    }

    /// Empty tree → `Ok`, otherwise the tree itself as the error.
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (route, messages) in &self.entries {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{route}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}
