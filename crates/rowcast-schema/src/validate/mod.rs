//! Load-time registry validation.
//!
//! Validation is staged and deterministic: per-type structural checks
//! first, then registry-wide passes that need the full arena (extends
//! chains, identity overrides, relation overrides). All failures are
//! aggregated into one route-keyed tree so a broken schema reports
//! everything at once.

use crate::{
    error::ErrorTree,
    node::{FieldDescriptor, TypeDescriptor},
    registry::Registry,
};
use std::collections::HashSet;
use std::sync::Arc;

pub(crate) fn validate_registry(registry: &Registry) -> Result<(), ErrorTree> {
    let mut errors = ErrorTree::new();

    // Phase 1: local invariants of each descriptor.
    for descriptor in registry.iter() {
        validate_type(descriptor, &mut errors);
    }

    // Phase 2: invariants that span the arena.
    validate_chains(registry, &mut errors);
    validate_relations(registry, &mut errors);

    errors.result()
}

fn validate_type(descriptor: &TypeDescriptor, errors: &mut ErrorTree) {
    if descriptor.extends.is_none() && descriptor.identities.is_empty() {
        errors.add(&descriptor.name, "declares no identity fields");
    }

    for identity in &descriptor.identities {
        let route = field_route(descriptor, identity);
        if identity.transient {
            errors.add(&route, "identity fields cannot be transient");
        }
        match &identity.storage {
            None => errors.add(&route, "identity field has no storage metadata"),
            Some(storage) if storage.columns.len() != 1 => {
                errors.add(
                    &route,
                    format!(
                        "identity field must map to exactly one column, found {}",
                        storage.columns.len()
                    ),
                );
            }
            Some(_) => {}
        }
    }
}

fn validate_chains(registry: &Registry, errors: &mut ErrorTree) {
    for descriptor in registry.iter() {
        match chain_root(registry, descriptor) {
            Ok(root) => validate_identity_overrides(descriptor, &root, errors),
            Err(issue) => errors.add(&descriptor.name, issue),
        }
    }
}

// A derived type may redeclare an identity field to rename its column,
// but never introduce an identity the root does not have; identity
// arity is fixed at the root.
fn validate_identity_overrides(
    descriptor: &TypeDescriptor,
    root: &Arc<TypeDescriptor>,
    errors: &mut ErrorTree,
) {
    if descriptor.name == root.name {
        return;
    }

    for identity in &descriptor.identities {
        if root.get_identity(&identity.name).is_none() {
            errors.add(
                &field_route(descriptor, identity),
                format!(
                    "identity field does not match any identity of root type '{}'",
                    root.name
                ),
            );
        }
    }
}

fn validate_relations(registry: &Registry, errors: &mut ErrorTree) {
    for descriptor in registry.iter() {
        let Some(owning_arity) = identity_arity(registry, descriptor) else {
            // Chain failures for this type are already recorded.
            continue;
        };

        for field in &descriptor.fields {
            let Some(relation) = &field.relation else {
                continue;
            };
            let route = field_route(descriptor, field);

            let Ok(related) = registry.resolve(&relation.target) else {
                errors.add(
                    &route,
                    format!("relation target '{}' is not registered", relation.target),
                );
                continue;
            };

            if !relation.many_key.is_empty() && relation.many_key.len() != owning_arity {
                errors.add(
                    &route,
                    format!(
                        "many-key override has arity {}, expected {owning_arity}",
                        relation.many_key.len()
                    ),
                );
            }

            if let Some(related_arity) = identity_arity(registry, related)
                && !relation.name_columns.is_empty()
                && relation.name_columns.len() != related_arity
            {
                errors.add(
                    &route,
                    format!(
                        "name override has arity {}, expected {related_arity}",
                        relation.name_columns.len()
                    ),
                );
            }
        }
    }
}

/// Walk the extends chain to its root.
fn chain_root<'a>(
    registry: &'a Registry,
    descriptor: &'a TypeDescriptor,
) -> Result<Arc<TypeDescriptor>, String> {
    let mut seen = HashSet::from([descriptor.name.as_str()]);
    let mut current = descriptor;

    while let Some(target) = &current.extends {
        let Ok(parent) = registry.resolve(target) else {
            return Err(format!("extends target '{target}' is not registered"));
        };
        if !seen.insert(parent.name.as_str()) {
            return Err(format!("circular extends chain through '{}'", parent.name));
        }
        current = parent.as_ref();
    }

    // Re-resolve by name to return an owned handle into the arena.
    registry
        .resolve(&current.name)
        .map(Arc::clone)
        .map_err(|err| err.to_string())
}

// Identity arity of a type is the identity count of its chain root.
fn identity_arity(registry: &Registry, descriptor: &TypeDescriptor) -> Option<usize> {
    chain_root(registry, descriptor)
        .map(|root| root.identities.len())
        .ok()
}

fn field_route(descriptor: &TypeDescriptor, field: &FieldDescriptor) -> String {
    format!("{}.{}", descriptor.name, field.name)
}
