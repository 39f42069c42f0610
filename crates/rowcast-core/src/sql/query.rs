use crate::{
    engine::resolve::FieldInfo,
    entity::EntityData,
    error::StatementError,
    sql::{Connection, PreparedQuery, QueryExpression, decode_row},
};
use rowcast_primitives::{AccessMode, Value};

///
/// SelectExpression
///
/// Minimal query expression: a select list, optional join clauses, and
/// `column = ?` conditions. Renders locking reads with a FOR UPDATE
/// suffix.
///

#[derive(Clone, Debug, Default)]
pub struct SelectExpression {
    table: String,
    columns: Vec<String>,
    joins: Vec<String>,
    conditions: Vec<String>,
}

impl SelectExpression {
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            joins: Vec::new(),
            conditions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.columns.push(column.into());
        self
    }

    #[must_use]
    pub fn with_join(mut self, clause: impl Into<String>) -> Self {
        self.joins.push(clause.into());
        self
    }

    /// Add a `column = ?` condition.
    #[must_use]
    pub fn with_condition(mut self, column: impl Into<String>) -> Self {
        self.conditions.push(column.into());
        self
    }
}

impl QueryExpression for SelectExpression {
    fn statement(&self, locked: bool) -> String {
        let mut sql = format!("SELECT {} FROM {}", self.columns.join(", "), self.table);

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }

        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            let predicate = self
                .conditions
                .iter()
                .map(|c| format!("{c} = ?"))
                .collect::<Vec<_>>()
                .join(" AND ");
            sql.push_str(&predicate);
        }

        if locked {
            sql.push_str(" FOR UPDATE");
        }

        sql
    }
}

///
/// QueryStatement
///
/// Renders a query expression at the requested access mode and decodes
/// result rows against the engine's resolved field list. The
/// expression's select list must match that field list in column
/// order; `Engine::finder` produces one that does.
///

#[derive(Debug)]
pub struct QueryStatement {
    default_access: AccessMode,
    fields: Vec<FieldInfo>,
}

impl QueryStatement {
    #[must_use]
    pub(crate) fn new(default_access: AccessMode, fields: &[FieldInfo]) -> Self {
        Self {
            default_access,
            fields: fields.to_vec(),
        }
    }

    /// Render the expression; `None` falls back to the descriptor's
    /// default access mode.
    #[must_use]
    pub fn prepare(
        &self,
        expression: &dyn QueryExpression,
        access: Option<AccessMode>,
    ) -> PreparedQuery {
        let access = access.unwrap_or(self.default_access);
        PreparedQuery {
            sql: expression.statement(access.is_locking()),
            access,
        }
    }

    pub fn execute(
        &self,
        conn: &mut dyn Connection,
        prepared: &PreparedQuery,
        params: &[Value],
    ) -> Result<Vec<EntityData>, StatementError> {
        let rows = conn.query(&prepared.sql, params)?;
        rows.iter().map(|row| decode_row(&self.fields, row)).collect()
    }
}
