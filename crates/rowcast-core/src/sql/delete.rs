use crate::{
    engine::resolve::ColumnInfo,
    error::StatementError,
    identity::Identity,
    sql::{Connection, identity_params},
};

///
/// DeleteStatement
///
/// Removes one row from the engine's own table by identity. Removing a
/// row that is already gone is not an error here; the cascading engine
/// decides what a zero count means.
///

#[derive(Debug)]
pub struct DeleteStatement {
    ids: Vec<ColumnInfo>,
    sql: String,
}

impl DeleteStatement {
    #[must_use]
    pub(crate) fn new(table: &str, ids: &[ColumnInfo]) -> Self {
        let predicate = ids
            .iter()
            .map(|col| format!("{} = ?", col.name))
            .collect::<Vec<_>>()
            .join(" AND ");

        Self {
            ids: ids.to_vec(),
            sql: format!("DELETE FROM {table} WHERE {predicate}"),
        }
    }

    #[must_use]
    pub fn statement(&self) -> &str {
        &self.sql
    }

    pub fn execute(
        &self,
        conn: &mut dyn Connection,
        identity: &Identity,
    ) -> Result<u64, StatementError> {
        conn.execute(&self.sql, &identity_params(&self.ids, identity)?)
    }
}
