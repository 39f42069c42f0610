use crate::{
    engine::resolve::{ColumnInfo, FieldInfo, Placement},
    entity::EntityData,
    error::StatementError,
    identity::Identity,
    sql::{Connection, decode_row, identity_params, identity_predicate},
};
use rowcast_primitives::AccessMode;

///
/// LoadStatement
///
/// Loads one logical instance by identity in a single SELECT that
/// joins every ancestor table of the chain under its resolved alias.
/// No per-level cascade is issued; the resolved field list already
/// carries the aliases the join needs.
///

#[derive(Debug)]
pub struct LoadStatement {
    table: String,
    ids: Vec<ColumnInfo>,
    fields: Vec<FieldInfo>,
    select_columns: Vec<String>,
    join_clauses: Vec<String>,
    sql_shared: String,
    sql_locked: String,
}

impl LoadStatement {
    #[must_use]
    pub(crate) fn new(table: &str, ids: &[ColumnInfo], fields: &[FieldInfo]) -> Self {
        let select_columns: Vec<String> = fields
            .iter()
            .filter(|f| f.is_stored())
            .flat_map(|f| {
                f.columns
                    .iter()
                    .map(|c| format!("{}.{}", f.qualifier(), c.name))
            })
            .collect();

        let join_clauses: Vec<String> = fields
            .iter()
            .filter_map(|f| match &f.placement {
                Placement::Own => None,
                Placement::Joined {
                    alias,
                    join_columns,
                } => {
                    let condition = ids
                        .iter()
                        .zip(join_columns)
                        .map(|(id, join_column)| {
                            format!("{table}.{} = {alias}.{join_column}", id.name)
                        })
                        .collect::<Vec<_>>()
                        .join(" AND ");
                    Some(format!("JOIN {} {alias} ON {condition}", f.table))
                }
            })
            .collect();

        let mut sql = format!("SELECT {} FROM {table}", select_columns.join(", "));
        for clause in &join_clauses {
            sql.push(' ');
            sql.push_str(clause);
        }
        sql.push_str(" WHERE ");
        sql.push_str(&identity_predicate(table, ids));

        let sql_locked = format!("{sql} FOR UPDATE");

        Self {
            table: table.to_string(),
            ids: ids.to_vec(),
            fields: fields.to_vec(),
            select_columns,
            join_clauses,
            sql_shared: sql,
            sql_locked,
        }
    }

    #[must_use]
    pub fn statement(&self, access: AccessMode) -> &str {
        if access.is_locking() {
            &self.sql_locked
        } else {
            &self.sql_shared
        }
    }

    #[must_use]
    pub(crate) fn select_columns(&self) -> &[String] {
        &self.select_columns
    }

    #[must_use]
    pub(crate) fn join_clauses(&self) -> &[String] {
        &self.join_clauses
    }

    pub fn execute(
        &self,
        conn: &mut dyn Connection,
        entity: &mut EntityData,
        identity: &Identity,
        access: AccessMode,
    ) -> Result<(), StatementError> {
        let params = identity_params(&self.ids, identity)?;
        let rows = conn.query(self.statement(access), &params)?;

        let Some(row) = rows.first() else {
            return Err(StatementError::NotFound {
                table: self.table.clone(),
                identity: identity.to_string(),
            });
        };

        *entity = decode_row(&self.fields, row)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::tests_support::{
        column_info, joined_field, own_field, recording_connection,
    };
    use rowcast_primitives::Value;

    fn statement() -> LoadStatement {
        LoadStatement::new(
            "dog",
            &[column_info("id")],
            &[
                joined_field("species", "species", "animal", "animal_f0", vec!["id".into()]),
                own_field("breed", "breed", "dog"),
            ],
        )
    }

    #[test]
    fn load_joins_ancestor_tables_under_their_aliases() {
        assert_eq!(
            statement().statement(AccessMode::Shared),
            "SELECT animal_f0.species, dog.breed FROM dog \
             JOIN animal animal_f0 ON dog.id = animal_f0.id WHERE dog.id = ?"
        );
    }

    #[test]
    fn locked_access_appends_for_update() {
        let statement = statement();
        let locked = statement.statement(AccessMode::Locked);
        assert!(locked.ends_with("WHERE dog.id = ? FOR UPDATE"));
        assert_ne!(locked, statement.statement(AccessMode::Shared));
    }

    #[test]
    fn load_fills_the_entity_from_the_row() {
        let statement = statement();
        let mut conn = recording_connection();
        conn.results.push_back(vec![vec![
            Value::Text("canis".into()),
            Value::Text("beagle".into()),
        ]]);

        let mut entity = EntityData::with_arity(2);
        statement
            .execute(
                &mut conn,
                &mut entity,
                &Identity::single(Value::Int(1)),
                AccessMode::Shared,
            )
            .expect("load should succeed");

        assert_eq!(entity.value(0), Some(&Value::Text("canis".into())));
        assert_eq!(entity.value(1), Some(&Value::Text("beagle".into())));
    }

    #[test]
    fn missing_row_reports_not_found() {
        let statement = statement();
        let mut conn = recording_connection();

        let err = statement
            .execute(
                &mut conn,
                &mut EntityData::with_arity(2),
                &Identity::single(Value::Int(404)),
                AccessMode::Shared,
            )
            .expect_err("missing row should fail");
        assert!(matches!(err, StatementError::NotFound { .. }));
    }
}
