//! Shared fixtures: a recording connection and the Animal/Dog schema
//! used across the engine tests.

#![allow(dead_code)]

use rowcast_core::{StatementError, prelude::*};
use std::collections::VecDeque;

///
/// RecordingConnection
///
/// Logs every statement with its parameters; replies from canned
/// result and generated-key queues.
///

pub struct RecordingConnection {
    pub calls: Vec<(String, Vec<Value>)>,
    pub results: VecDeque<Vec<Vec<Value>>>,
    pub keys: VecDeque<Value>,
    pub affected: u64,
}

impl RecordingConnection {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            results: VecDeque::new(),
            keys: VecDeque::new(),
            affected: 1,
        }
    }

    pub fn statements(&self) -> Vec<&str> {
        self.calls.iter().map(|(sql, _)| sql.as_str()).collect()
    }
}

impl Connection for RecordingConnection {
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64, StatementError> {
        self.calls.push((sql.to_string(), params.to_vec()));
        Ok(self.affected)
    }

    fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Vec<Value>>, StatementError> {
        self.calls.push((sql.to_string(), params.to_vec()));
        Ok(self.results.pop_front().unwrap_or_default())
    }

    fn generated_key(&mut self) -> Result<Value, StatementError> {
        self.keys.pop_front().ok_or(StatementError::NoGeneratedKey)
    }
}

pub fn id_field() -> FieldDescriptor {
    FieldDescriptor::stored("id", Storage::column("id", SqlType::BigInt))
}

pub fn animal() -> TypeDescriptor {
    TypeDescriptor::new("Animal", "animal")
        .with_identity(id_field())
        .with_field(FieldDescriptor::stored(
            "species",
            Storage::column("species", SqlType::Varchar),
        ))
        .with_field(FieldDescriptor::transient("scratch"))
}

pub fn dog() -> TypeDescriptor {
    TypeDescriptor::new("Dog", "dog")
        .with_extends("Animal")
        .with_field(FieldDescriptor::stored(
            "breed",
            Storage::column("breed", SqlType::Varchar),
        ))
}

pub fn registry_of(descriptors: Vec<TypeDescriptor>) -> Registry {
    let mut registry = Registry::new();
    for descriptor in descriptors {
        registry
            .register(descriptor)
            .expect("fixture registration should succeed");
    }
    registry
}

pub fn animal_dog_registry() -> Registry {
    registry_of(vec![animal(), dog()])
}

/// Dog entity payload aligned with the resolved field list
/// `[species (joined), breed (own)]`.
pub fn dog_entity(species: &str, breed: &str) -> EntityData {
    EntityData::new(vec![
        Value::Text(species.to_string()),
        Value::Text(breed.to_string()),
    ])
}
