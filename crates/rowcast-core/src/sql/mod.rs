//! Statement execution: the connection seam, query expressions, and
//! the per-verb statement executors built from resolved metadata.
//!
//! Each executor performs exactly one table's worth of SQL work; the
//! cascading engine owns multi-table ordering.

mod delete;
mod insert;
mod load;
mod query;
mod update;

pub use delete::DeleteStatement;
pub use insert::InsertStatement;
pub use load::LoadStatement;
pub use query::{QueryStatement, SelectExpression};
pub use update::UpdateStatement;

use crate::{
    engine::resolve::{ColumnInfo, FieldInfo},
    entity::EntityData,
    error::StatementError,
    identity::Identity,
};
use rowcast_primitives::{AccessMode, ConvertFn, Value};
use rowcast_schema::Column;

///
/// Connection
///
/// An open, transactional connection handle. Ownership stays with the
/// caller across a whole cascade; the engine only borrows it for the
/// duration of one call.
///

pub trait Connection {
    /// Execute a parameterized statement, returning affected rows.
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64, StatementError>;

    /// Run a parameterized query, returning result rows.
    fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Vec<Value>>, StatementError>;

    /// The key generated by the most recent insert on this connection.
    fn generated_key(&mut self) -> Result<Value, StatementError>;
}

///
/// QueryExpression
///
/// Abstract filter/selection rendered to literal SQL at the requested
/// access mode; locking reads produce different text than shared reads.
///

pub trait QueryExpression {
    fn statement(&self, locked: bool) -> String;
}

///
/// PreparedQuery
///

#[derive(Clone, Debug)]
pub struct PreparedQuery {
    pub sql: String,
    pub access: AccessMode,
}

///
/// Binding
///
/// One resolved field bound into a statement: its index in the entity
/// payload plus the column set and converter it writes through.
///

#[derive(Clone, Debug)]
pub(crate) struct Binding {
    pub index: usize,
    pub name: String,
    pub columns: Vec<Column>,
    pub to_storage: ConvertFn,
}

/// Bindings for the fields stored in the engine's own table.
pub(crate) fn own_bindings(fields: &[FieldInfo]) -> Vec<Binding> {
    fields
        .iter()
        .enumerate()
        .filter(|(_, f)| !f.is_joined() && f.is_stored())
        .map(|(index, f)| Binding {
            index,
            name: f.name.clone(),
            columns: f.columns.clone(),
            to_storage: f.to_storage,
        })
        .collect()
}

/// Per-column storage values for one bound field.
pub(crate) fn binding_params(
    binding: &Binding,
    entity: &EntityData,
) -> Result<Vec<Value>, StatementError> {
    let value = entity
        .value(binding.index)
        .ok_or_else(|| StatementError::MissingField {
            field: binding.name.clone(),
        })?;
    let stored = (binding.to_storage)(value)?;

    Ok(stored.into_columns(binding.columns.len())?)
}

/// Storage values for the identity columns, in column order.
pub(crate) fn identity_params(
    ids: &[ColumnInfo],
    identity: &Identity,
) -> Result<Vec<Value>, StatementError> {
    identity
        .values()
        .iter()
        .zip(ids)
        .map(|(value, col)| Ok((col.to_storage)(value)?))
        .collect()
}

/// `a = ? AND b = ?` over the identity columns, qualified by `table`.
pub(crate) fn identity_predicate(table: &str, ids: &[ColumnInfo]) -> String {
    ids.iter()
        .map(|col| format!("{table}.{} = ?", col.name))
        .collect::<Vec<_>>()
        .join(" AND ")
}

pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Decode one result row into an entity payload aligned with the
/// resolved field list. Fields without columns (join-table relations)
/// decode to `Null`.
pub(crate) fn decode_row(
    fields: &[FieldInfo],
    row: &[Value],
) -> Result<EntityData, StatementError> {
    let expected: usize = fields.iter().map(|f| f.columns.len()).sum();
    if row.len() != expected {
        return Err(StatementError::RowShape {
            expected,
            found: row.len(),
        });
    }

    let mut entity = EntityData::with_arity(fields.len());
    let mut cursor = 0;
    for (index, field) in fields.iter().enumerate() {
        if !field.is_stored() {
            continue;
        }

        let raw = row[cursor..cursor + field.columns.len()].to_vec();
        cursor += field.columns.len();

        let stored = Value::from_columns(raw);
        entity.set_value(index, (field.from_storage)(&stored)?);
    }

    Ok(entity)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::resolve::Placement;
    use rowcast_primitives::{SqlType, convert};

    fn field(name: &str, columns: Vec<Column>) -> FieldInfo {
        FieldInfo {
            name: name.into(),
            table: "t".into(),
            placement: Placement::Own,
            columns,
            to_storage: convert::pass,
            from_storage: convert::pass,
            relation: None,
        }
    }

    #[test]
    fn own_bindings_skip_joined_and_unstored_fields() {
        let mut joined = field("parent_col", vec![Column::new("p", SqlType::Integer)]);
        joined.placement = Placement::Joined {
            alias: "pt_f0".into(),
            join_columns: vec!["id".into()],
        };
        let fields = vec![
            joined,
            field("own", vec![Column::new("own", SqlType::Integer)]),
            field("relation_only", Vec::new()),
        ];

        let bindings = own_bindings(&fields);
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].name, "own");
        assert_eq!(bindings[0].index, 1);
    }

    #[test]
    fn decode_row_maps_columns_back_to_fields() {
        let fields = vec![
            field("a", vec![Column::new("a", SqlType::Integer)]),
            field(
                "pair",
                vec![
                    Column::new("hi", SqlType::Integer),
                    Column::new("lo", SqlType::Integer),
                ],
            ),
            field("rel", Vec::new()),
        ];
        let row = vec![Value::Int(1), Value::Int(2), Value::Int(3)];

        let entity = decode_row(&fields, &row).expect("row should decode");
        assert_eq!(entity.value(0), Some(&Value::Int(1)));
        assert_eq!(
            entity.value(1),
            Some(&Value::Composite(vec![Value::Int(2), Value::Int(3)]))
        );
        assert_eq!(entity.value(2), Some(&Value::Null));
    }

    #[test]
    fn decode_row_rejects_shape_mismatch() {
        let fields = vec![field("a", vec![Column::new("a", SqlType::Integer)])];
        let err = decode_row(&fields, &[]).expect_err("short row should fail");
        assert!(matches!(
            err,
            StatementError::RowShape {
                expected: 1,
                found: 0
            }
        ));
    }

    #[test]
    fn placeholders_join_with_commas() {
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?, ?, ?");
    }
}
