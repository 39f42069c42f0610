//! Construction-time inheritance resolution.
//!
//! Reconciles a type hierarchy with a table hierarchy in two passes:
//! walk leaf to root collecting the chain (rejecting cycles), then walk
//! back down collecting persistable fields level by level. The root's
//! identity fields are canonical; a leaf may redeclare one to rename
//! its physical column without changing identity arity or order.

use crate::error::SchemaError;
use rowcast_primitives::{ConvertFn, SqlType};
use rowcast_schema::{Column, FieldDescriptor, Registry, Relation, TypeDescriptor};
use std::collections::HashSet;
use std::sync::Arc;

///
/// ColumnInfo
///
/// One resolved identity column: physical name, type code, and the
/// converter pair between in-memory and storage representations.
///

#[derive(Clone, Debug)]
pub struct ColumnInfo {
    pub name: String,
    pub sql_type: SqlType,
    pub to_storage: ConvertFn,
    pub from_storage: ConvertFn,
}

///
/// Placement
///
/// Where a resolved field physically lives relative to the leaf table.
/// `Joined` fields carry the alias used to disambiguate their source
/// table in generated SQL, and the identity column names of their own
/// level for the join condition.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Placement {
    Own,
    Joined {
        alias: String,
        join_columns: Vec<String>,
    },
}

///
/// FieldInfo
///

#[derive(Clone, Debug)]
pub struct FieldInfo {
    pub name: String,
    pub table: String,
    pub placement: Placement,
    pub columns: Vec<Column>,
    pub to_storage: ConvertFn,
    pub from_storage: ConvertFn,
    pub relation: Option<Relation>,
}

impl FieldInfo {
    /// Table qualifier for this field in generated SQL.
    #[must_use]
    pub fn qualifier(&self) -> &str {
        match &self.placement {
            Placement::Own => &self.table,
            Placement::Joined { alias, .. } => alias,
        }
    }

    #[must_use]
    pub const fn is_joined(&self) -> bool {
        matches!(self.placement, Placement::Joined { .. })
    }

    /// Whether the field maps to columns of its source table. Relation
    /// fields resolved through a join table do not.
    #[must_use]
    pub fn is_stored(&self) -> bool {
        !self.columns.is_empty()
    }
}

///
/// ResolvedChain
///

#[derive(Debug)]
pub(crate) struct ResolvedChain {
    pub ids: Vec<ColumnInfo>,
    pub fields: Vec<FieldInfo>,
}

/// Resolve identity columns and fields for a leaf type across its full
/// extends chain.
pub(crate) fn resolve_chain(
    registry: &Registry,
    leaf: &Arc<TypeDescriptor>,
) -> Result<ResolvedChain, SchemaError> {
    let chain = collect_chain(registry, leaf)?;
    let root = &chain[chain.len() - 1];

    let ids = identity_columns(root, leaf)?;

    let mut fields = Vec::new();
    for level in chain.iter().rev() {
        let joined = level.table != leaf.table;
        let join_columns = if joined {
            level_identity_names(root, level)?
        } else {
            Vec::new()
        };

        for field in &level.fields {
            if !field.is_persistable() {
                continue;
            }

            let placement = if joined {
                Placement::Joined {
                    alias: format!("{}_f{}", level.table, fields.len()),
                    join_columns: join_columns.clone(),
                }
            } else {
                Placement::Own
            };

            fields.push(field_info(level, field, placement));
        }
    }

    Ok(ResolvedChain { ids, fields })
}

/// Resolve only the identity columns of a type, honoring its chain.
/// Used by the relation loader for the related side of an association.
pub(crate) fn resolve_identity_columns(
    registry: &Registry,
    descriptor: &Arc<TypeDescriptor>,
) -> Result<Vec<ColumnInfo>, SchemaError> {
    let chain = collect_chain(registry, descriptor)?;
    identity_columns(&chain[chain.len() - 1], descriptor)
}

// Walk leaf to root, rejecting unknown targets and cycles. The result
// is leaf-first and never empty.
fn collect_chain(
    registry: &Registry,
    leaf: &Arc<TypeDescriptor>,
) -> Result<Vec<Arc<TypeDescriptor>>, SchemaError> {
    let mut chain = vec![Arc::clone(leaf)];
    let mut seen: HashSet<String> = HashSet::from([leaf.name.clone()]);

    loop {
        let current = &chain[chain.len() - 1];
        let Some(target) = current.extends.clone() else {
            return Ok(chain);
        };

        let parent = registry
            .resolve(&target)
            .map_err(|_| SchemaError::UnknownExtends {
                name: current.name.clone(),
                target: target.clone(),
            })?;
        if !seen.insert(parent.name.clone()) {
            return Err(SchemaError::CircularExtends {
                name: parent.name.clone(),
            });
        }

        chain.push(Arc::clone(parent));
    }
}

// The root's identity fields are canonical; the leaf may override the
// physical column name of a matching field. Type code and converters
// always come from the root.
fn identity_columns(
    root: &Arc<TypeDescriptor>,
    leaf: &Arc<TypeDescriptor>,
) -> Result<Vec<ColumnInfo>, SchemaError> {
    let mut ids = Vec::with_capacity(root.identities.len());

    for identity in &root.identities {
        let (storage, column) = single_identity_column(root, identity)?;

        let name = leaf
            .get_identity(&identity.name)
            .and_then(|f| f.storage.as_ref())
            .and_then(|s| s.columns.first())
            .map_or_else(|| column.name.clone(), |c| c.name.clone());

        ids.push(ColumnInfo {
            name,
            sql_type: column.sql_type,
            to_storage: storage.to_storage,
            from_storage: storage.from_storage,
        });
    }

    Ok(ids)
}

// Identity column names as declared at one chain level, falling back to
// the root's names where the level does not redeclare.
fn level_identity_names(
    root: &Arc<TypeDescriptor>,
    level: &Arc<TypeDescriptor>,
) -> Result<Vec<String>, SchemaError> {
    let mut names = Vec::with_capacity(root.identities.len());

    for identity in &root.identities {
        let (_, root_column) = single_identity_column(root, identity)?;
        let name = level
            .get_identity(&identity.name)
            .and_then(|f| f.storage.as_ref())
            .and_then(|s| s.columns.first())
            .map_or_else(|| root_column.name.clone(), |c| c.name.clone());
        names.push(name);
    }

    Ok(names)
}

fn single_identity_column<'a>(
    owner: &TypeDescriptor,
    identity: &'a FieldDescriptor,
) -> Result<(&'a rowcast_schema::Storage, &'a Column), SchemaError> {
    let storage =
        identity
            .storage
            .as_ref()
            .ok_or_else(|| SchemaError::IdentityWithoutStorage {
                type_name: owner.name.clone(),
                field: identity.name.clone(),
            })?;

    if storage.columns.len() != 1 {
        return Err(SchemaError::IdentityColumnCount {
            type_name: owner.name.clone(),
            field: identity.name.clone(),
        });
    }

    Ok((storage, &storage.columns[0]))
}

fn field_info(
    level: &Arc<TypeDescriptor>,
    field: &FieldDescriptor,
    placement: Placement,
) -> FieldInfo {
    let (columns, to_storage, from_storage) = field.storage.as_ref().map_or_else(
        || {
            (
                Vec::new(),
                rowcast_primitives::convert::pass as ConvertFn,
                rowcast_primitives::convert::pass as ConvertFn,
            )
        },
        |storage| {
            (
                storage.columns.clone(),
                storage.to_storage,
                storage.from_storage,
            )
        },
    );

    FieldInfo {
        name: field.name.clone(),
        table: level.table.clone(),
        placement,
        columns,
        to_storage,
        from_storage,
        relation: field.relation.clone(),
    }
}
