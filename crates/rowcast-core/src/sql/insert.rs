use crate::{
    engine::resolve::{ColumnInfo, FieldInfo},
    entity::EntityData,
    error::StatementError,
    identity::Identity,
    sql::{Binding, Connection, binding_params, identity_params, own_bindings, placeholders},
};

///
/// InsertStatement
///
/// Inserts one row into the engine's own table. When no identity is
/// supplied the row's key is generated by the connection; generation
/// only happens at the root of a cascade and only for single-column
/// identities.
///

#[derive(Debug)]
pub struct InsertStatement {
    table: String,
    ids: Vec<ColumnInfo>,
    bindings: Vec<Binding>,
    sql_with_identity: String,
    sql_generated: String,
}

impl InsertStatement {
    #[must_use]
    pub(crate) fn new(table: &str, ids: &[ColumnInfo], fields: &[FieldInfo]) -> Self {
        let bindings = own_bindings(fields);

        let field_columns: Vec<&str> = bindings
            .iter()
            .flat_map(|b| b.columns.iter().map(|c| c.name.as_str()))
            .collect();

        let mut all_columns: Vec<&str> = ids.iter().map(|c| c.name.as_str()).collect();
        all_columns.extend(&field_columns);

        let sql_with_identity = format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            all_columns.join(", "),
            placeholders(all_columns.len())
        );
        let sql_generated = format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            field_columns.join(", "),
            placeholders(field_columns.len())
        );

        Self {
            table: table.to_string(),
            ids: ids.to_vec(),
            bindings,
            sql_with_identity,
            sql_generated,
        }
    }

    #[must_use]
    pub fn statement(&self) -> &str {
        &self.sql_with_identity
    }

    pub fn execute(
        &self,
        conn: &mut dyn Connection,
        identity: Option<&Identity>,
        entity: &EntityData,
    ) -> Result<Identity, StatementError> {
        let mut field_values = Vec::new();
        for binding in &self.bindings {
            field_values.extend(binding_params(binding, entity)?);
        }

        match identity {
            Some(identity) => {
                let mut params = identity_params(&self.ids, identity)?;
                params.extend(field_values);
                conn.execute(&self.sql_with_identity, &params)?;
                Ok(identity.clone())
            }
            None => {
                if self.ids.len() != 1 {
                    return Err(StatementError::CompositeGeneratedKey {
                        table: self.table.clone(),
                        arity: self.ids.len(),
                    });
                }

                conn.execute(&self.sql_generated, &field_values)?;
                let raw = conn.generated_key()?;
                let value = (self.ids[0].from_storage)(&raw)?;
                Ok(Identity::single(value))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::tests_support::{column_info, own_field, recording_connection};
    use rowcast_primitives::Value;

    #[test]
    fn insert_with_identity_binds_ids_before_fields() {
        let statement = InsertStatement::new(
            "dog",
            &[column_info("id")],
            &[own_field("breed", "breed", "dog")],
        );
        let mut conn = recording_connection();

        let identity = Identity::single(Value::Int(5));
        let entity = EntityData::new(vec![Value::Text("beagle".into())]);
        let out = statement
            .execute(&mut conn, Some(&identity), &entity)
            .expect("insert should succeed");

        assert_eq!(out, identity);
        let (sql, params) = conn.calls.last().expect("one statement should execute");
        assert_eq!(sql, "INSERT INTO dog (id, breed) VALUES (?, ?)");
        assert_eq!(
            params,
            &vec![Value::Int(5), Value::Text("beagle".into())]
        );
    }

    #[test]
    fn insert_without_identity_uses_the_generated_key() {
        let statement = InsertStatement::new(
            "animal",
            &[column_info("id")],
            &[own_field("species", "species", "animal")],
        );
        let mut conn = recording_connection();
        conn.next_key = Some(Value::Int(41));

        let entity = EntityData::new(vec![Value::Text("canis".into())]);
        let identity = statement
            .execute(&mut conn, None, &entity)
            .expect("insert should succeed");

        assert_eq!(identity, Identity::single(Value::Int(41)));
        let (sql, _) = conn.calls.last().expect("one statement should execute");
        assert_eq!(sql, "INSERT INTO animal (species) VALUES (?)");
    }

    #[test]
    fn composite_identities_cannot_be_generated() {
        let statement = InsertStatement::new(
            "pair",
            &[column_info("hi"), column_info("lo")],
            &[],
        );
        let mut conn = recording_connection();

        let err = statement
            .execute(&mut conn, None, &EntityData::default())
            .expect_err("composite generation should fail");
        assert!(matches!(
            err,
            StatementError::CompositeGeneratedKey { arity: 2, .. }
        ));
        assert!(conn.calls.is_empty());
    }
}
