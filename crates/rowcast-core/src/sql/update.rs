use crate::{
    engine::resolve::{ColumnInfo, FieldInfo},
    entity::EntityData,
    error::StatementError,
    identity::Identity,
    sql::{Binding, Connection, binding_params, identity_params, own_bindings},
};
use rowcast_primitives::Value;

///
/// UpdateStatement
///
/// Updates one row of the engine's own table, writing only the columns
/// whose stored value actually changed between the old and new entity.
/// Columns belonging to other levels of the chain are never touched,
/// so a concurrent update to an ancestor table cannot be clobbered.
///

#[derive(Debug)]
pub struct UpdateStatement {
    table: String,
    ids: Vec<ColumnInfo>,
    bindings: Vec<Binding>,
}

impl UpdateStatement {
    #[must_use]
    pub(crate) fn new(table: &str, ids: &[ColumnInfo], fields: &[FieldInfo]) -> Self {
        Self {
            table: table.to_string(),
            ids: ids.to_vec(),
            bindings: own_bindings(fields),
        }
    }

    /// Execute the update; returns the number of rows written, which is
    /// zero without touching the connection when nothing changed.
    pub fn execute(
        &self,
        conn: &mut dyn Connection,
        identity: &Identity,
        new_entity: &EntityData,
        old_entity: &EntityData,
    ) -> Result<u64, StatementError> {
        let mut assignments: Vec<String> = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        for binding in &self.bindings {
            let new_values = binding_params(binding, new_entity)?;
            let old_values = binding_params(binding, old_entity)?;

            for (column, (new_value, old_value)) in binding
                .columns
                .iter()
                .zip(new_values.into_iter().zip(old_values))
            {
                if new_value != old_value {
                    assignments.push(format!("{} = ?", column.name));
                    params.push(new_value);
                }
            }
        }

        if assignments.is_empty() {
            return Ok(0);
        }

        let predicate = self
            .ids
            .iter()
            .map(|col| format!("{} = ?", col.name))
            .collect::<Vec<_>>()
            .join(" AND ");
        let sql = format!(
            "UPDATE {} SET {} WHERE {predicate}",
            self.table,
            assignments.join(", ")
        );

        params.extend(identity_params(&self.ids, identity)?);
        let rows = conn.execute(&sql, &params)?;
        if rows == 0 {
            return Err(StatementError::NotFound {
                table: self.table.clone(),
                identity: identity.to_string(),
            });
        }

        Ok(rows)
    }
}
