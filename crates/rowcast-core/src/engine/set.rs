use crate::{
    engine::{Engine, table_info, table_info::TableInfo},
    error::{Error, ResolutionError, SchemaError},
};
use rowcast_schema::Registry;
use std::{collections::BTreeMap, sync::Arc};

///
/// EngineSet
///
/// All engines of one schema, built in dependency order (parents before
/// children) from a validated registry, plus the table metadata
/// resolved in a separate pass once every engine exists.
///

#[derive(Debug)]
pub struct EngineSet {
    engines: BTreeMap<String, Arc<Engine>>,
    tables: BTreeMap<String, TableInfo>,
}

impl EngineSet {
    /// Validate the registry and build every engine, parents first.
    pub fn build(registry: &Registry) -> Result<Self, Error> {
        registry.validate()?;

        let mut engines: BTreeMap<String, Arc<Engine>> = BTreeMap::new();
        let mut remaining: Vec<_> = registry.iter().collect();

        while !remaining.is_empty() {
            let mut deferred = Vec::new();
            let mut progressed = false;

            for descriptor in remaining {
                let parent = match &descriptor.extends {
                    None => None,
                    Some(target) => match engines.get(target) {
                        Some(engine) => Some(Arc::clone(engine)),
                        None => {
                            deferred.push(descriptor);
                            continue;
                        }
                    },
                };

                let engine = Engine::new(registry, &descriptor.name, parent)?;
                engines.insert(descriptor.name.clone(), engine);
                progressed = true;
            }

            if !progressed {
                return Err(SchemaError::CircularExtends {
                    name: deferred[0].name.clone(),
                }
                .into());
            }
            remaining = deferred;
        }

        let tables = table_info::resolve_tables(&engines);

        Ok(Self { engines, tables })
    }

    pub fn engine(&self, name: &str) -> Result<&Arc<Engine>, ResolutionError> {
        self.engines.get(name).ok_or_else(|| ResolutionError {
            name: name.to_string(),
        })
    }

    #[must_use]
    pub fn table_info(&self, table: &str) -> Option<&TableInfo> {
        self.tables.get(table)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Engine>> {
        self.engines.values()
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableInfo> {
        self.tables.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowcast_primitives::SqlType;
    use rowcast_schema::{FieldDescriptor, Storage, TypeDescriptor};

    fn id_field() -> FieldDescriptor {
        FieldDescriptor::stored("id", Storage::column("id", SqlType::BigInt))
    }

    #[test]
    fn build_wires_parents_regardless_of_registration_order() {
        let mut registry = Registry::new();
        // Children registered before their parents.
        registry
            .register(TypeDescriptor::new("Puppy", "puppy").with_extends("Dog"))
            .expect("registration should succeed");
        registry
            .register(TypeDescriptor::new("Dog", "dog").with_extends("Animal"))
            .expect("registration should succeed");
        registry
            .register(TypeDescriptor::new("Animal", "animal").with_identity(id_field()))
            .expect("registration should succeed");

        let set = EngineSet::build(&registry).expect("engine set should build");
        assert_eq!(set.len(), 3);

        let puppy = set.engine("Puppy").expect("leaf engine should exist");
        let dog = puppy.extends().expect("puppy should extend dog");
        assert_eq!(dog.name(), "Dog");
        let animal = dog.extends().expect("dog should extend animal");
        assert_eq!(animal.name(), "Animal");
        assert!(animal.extends().is_none());
    }

    #[test]
    fn build_rejects_an_invalid_registry() {
        let mut registry = Registry::new();
        registry
            .register(TypeDescriptor::new("Dog", "dog").with_extends("Ghost"))
            .expect("registration should succeed");

        let err = EngineSet::build(&registry).expect_err("broken registry should fail");
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn unknown_engine_lookup_fails_resolution() {
        let mut registry = Registry::new();
        registry
            .register(TypeDescriptor::new("Animal", "animal").with_identity(id_field()))
            .expect("registration should succeed");

        let set = EngineSet::build(&registry).expect("engine set should build");
        let err = set
            .engine("Ghost")
            .expect_err("unknown engine should not resolve");
        assert_eq!(err.name, "Ghost");
    }
}
