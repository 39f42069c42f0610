use crate::{Error, error::SchemaError, node::TypeDescriptor, validate::validate_registry};
use std::{collections::BTreeMap, sync::Arc, sync::OnceLock};
use thiserror::Error as ThisError;

///
/// ResolutionError
///

#[derive(Debug, ThisError)]
#[error("type '{name}' is not registered")]
pub struct ResolutionError {
    pub name: String,
}

///
/// Registry
///
/// Arena of type descriptors keyed by type name. Built once during
/// schema load (a single-threaded phase), validated once, and frozen:
/// registration after successful validation is rejected so no caller
/// can observe a half-rebuilt schema.
///

#[derive(Debug, Default)]
pub struct Registry {
    types: BTreeMap<String, Arc<TypeDescriptor>>,
    validated: OnceLock<()>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under its type name.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> Result<(), SchemaError> {
        if self.validated.get().is_some() {
            return Err(SchemaError::RegistryFrozen {
                name: descriptor.name.clone(),
            });
        }
        if self.types.contains_key(&descriptor.name) {
            return Err(SchemaError::DuplicateType {
                name: descriptor.name.clone(),
            });
        }

        self.types
            .insert(descriptor.name.clone(), Arc::new(descriptor));
        Ok(())
    }

    /// Look up a descriptor by type name.
    pub fn resolve(&self, name: &str) -> Result<&Arc<TypeDescriptor>, ResolutionError> {
        self.types.get(name).ok_or_else(|| ResolutionError {
            name: name.to_string(),
        })
    }

    /// Iterate descriptors in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<TypeDescriptor>> {
        self.types.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    #[must_use]
    pub fn is_validated(&self) -> bool {
        self.validated.get().is_some()
    }

    /// Validate the registry, at most once per registry.
    ///
    /// A successful validation freezes the registry. A failed validation
    /// leaves it open so the loader can report and abort.
    pub fn validate(&self) -> Result<(), Error> {
        if self.is_validated() {
            return Ok(());
        }

        validate_registry(self).map_err(Error::Validation)?;
        self.validated.set(()).ok();

        Ok(())
    }
}
