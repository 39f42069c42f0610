//! Relation loader resolution for to-many associations.
//!
//! Resolves identity and SQL metadata for both sides of an association
//! into an immutable loader: the owning side's key columns (optionally
//! renamed by a many-key override) and the related side's identity
//! columns (optionally renamed by a name override). Override arity must
//! match the respective identity arity exactly.

use crate::{
    engine::{
        Engine,
        resolve::{ColumnInfo, resolve_identity_columns},
    },
    error::{Error, SchemaError, StatementError},
    identity::Identity,
    sql::{Connection, identity_params},
};
use rowcast_primitives::Value;
use rowcast_schema::Registry;

///
/// RelationLoader
///

#[derive(Debug)]
pub struct RelationLoader {
    many_table: String,
    owner_columns: Vec<ColumnInfo>,
    related_columns: Vec<ColumnInfo>,
    sql: String,
}

impl RelationLoader {
    #[must_use]
    pub fn many_table(&self) -> &str {
        &self.many_table
    }

    #[must_use]
    pub fn owner_columns(&self) -> &[ColumnInfo] {
        &self.owner_columns
    }

    #[must_use]
    pub fn related_columns(&self) -> &[ColumnInfo] {
        &self.related_columns
    }

    #[must_use]
    pub fn statement(&self) -> &str {
        &self.sql
    }

    /// Load the identities related to one owning instance.
    pub fn load(
        &self,
        conn: &mut dyn Connection,
        identity: &Identity,
    ) -> Result<Vec<Identity>, Error> {
        identity.ensure_size(self.owner_columns.len(), &self.many_table)?;

        let params = identity_params(&self.owner_columns, identity)?;
        let rows = conn.query(&self.sql, &params).map_err(Error::Statement)?;

        let mut related = Vec::with_capacity(rows.len());
        for row in rows {
            if row.len() != self.related_columns.len() {
                return Err(StatementError::RowShape {
                    expected: self.related_columns.len(),
                    found: row.len(),
                }
                .into());
            }

            let values = row
                .iter()
                .zip(&self.related_columns)
                .map(|(value, column)| Ok((column.from_storage)(value)?))
                .collect::<Result<Vec<Value>, StatementError>>()?;
            related.push(Identity::new(values));
        }

        Ok(related)
    }
}

pub(crate) fn build_relation_loader(
    registry: &Registry,
    engine: &Engine,
    field_name: &str,
) -> Result<RelationLoader, Error> {
    let descriptor = engine.descriptor();

    let field =
        descriptor
            .get_field(field_name)
            .ok_or_else(|| SchemaError::UnknownField {
                type_name: descriptor.name.clone(),
                field: field_name.to_string(),
            })?;
    let relation = field
        .relation
        .as_ref()
        .ok_or_else(|| SchemaError::NotARelation {
            type_name: descriptor.name.clone(),
            field: field_name.to_string(),
        })?;

    let mut owner_columns = engine.identity_columns().to_vec();

    let related_descriptor = registry.resolve(&relation.target)?;
    let mut related_columns = resolve_identity_columns(registry, related_descriptor)?;

    let many_table = relation
        .many_table
        .clone()
        .unwrap_or_else(|| related_descriptor.table.clone());

    if !relation.many_key.is_empty() {
        if relation.many_key.len() != owner_columns.len() {
            return Err(SchemaError::OverrideArity {
                type_name: descriptor.name.clone(),
                field: field_name.to_string(),
                context: "many-key",
                expected: owner_columns.len(),
                found: relation.many_key.len(),
            }
            .into());
        }
        for (column, name) in owner_columns.iter_mut().zip(&relation.many_key) {
            column.name.clone_from(name);
        }
    }

    if !relation.name_columns.is_empty() {
        if relation.name_columns.len() != related_columns.len() {
            return Err(SchemaError::OverrideArity {
                type_name: descriptor.name.clone(),
                field: field_name.to_string(),
                context: "name",
                expected: related_columns.len(),
                found: relation.name_columns.len(),
            }
            .into());
        }
        for (column, name) in related_columns.iter_mut().zip(&relation.name_columns) {
            column.name.clone_from(name);
        }
    }

    let select = related_columns
        .iter()
        .map(|c| c.name.clone())
        .collect::<Vec<_>>()
        .join(", ");
    let predicate = owner_columns
        .iter()
        .map(|c| format!("{} = ?", c.name))
        .collect::<Vec<_>>()
        .join(" AND ");
    let sql = format!("SELECT {select} FROM {many_table} WHERE {predicate}");

    Ok(RelationLoader {
        many_table,
        owner_columns,
        related_columns,
        sql,
    })
}
