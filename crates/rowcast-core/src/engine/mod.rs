//! The per-type persistence engine and its cascading entry points.
//!
//! One engine exists per persistent type, wired to its parent engine at
//! construction. Engines are immutable after construction and shared
//! read-only across concurrent operations; all per-operation state
//! (connection, identity, entity payload) is caller-owned.

pub mod relation;
pub mod resolve;
mod set;
mod table_info;

pub use relation::RelationLoader;
pub use resolve::{ColumnInfo, FieldInfo, Placement};
pub use set::EngineSet;
pub use table_info::{ForeignKey, TableInfo};

use crate::{
    entity::EntityData,
    error::{Error, SchemaError},
    identity::Identity,
    obs::sink::{ExecKind, MetricsEvent, Span, record},
    sql::{
        Connection, DeleteStatement, InsertStatement, LoadStatement, PreparedQuery,
        QueryExpression, QueryStatement, SelectExpression, UpdateStatement,
    },
};
use rowcast_primitives::{AccessMode, Value};
use rowcast_schema::{Registry, TypeDescriptor};
use std::sync::Arc;

///
/// Engine
///
/// Performs persistence of one type against its table chain. Holds the
/// resolved identity columns and fields for the whole extends chain,
/// the parent engine (shared, fixed at construction), and the five
/// statement executors (exclusively owned).
///

#[derive(Debug)]
pub struct Engine {
    descriptor: Arc<TypeDescriptor>,
    extends: Option<Arc<Engine>>,
    ids: Vec<ColumnInfo>,
    fields: Vec<FieldInfo>,
    insert_statement: InsertStatement,
    update_statement: UpdateStatement,
    delete_statement: DeleteStatement,
    load_statement: LoadStatement,
    query_statement: QueryStatement,
}

impl Engine {
    /// Construct the engine for `name`, wiring the already-constructed
    /// parent engine. Engines must be built in dependency order; the
    /// parent must match the descriptor's `extends` declaration.
    pub fn new(
        registry: &Registry,
        name: &str,
        extends: Option<Arc<Self>>,
    ) -> Result<Arc<Self>, Error> {
        let descriptor = Arc::clone(registry.resolve(name)?);

        let wired = match (&descriptor.extends, &extends) {
            (None, None) => true,
            (Some(expected), Some(parent)) => parent.name() == expected,
            _ => false,
        };
        if !wired {
            return Err(SchemaError::ParentMismatch {
                name: descriptor.name.clone(),
                expected: descriptor.extends.clone().unwrap_or_else(|| "none".into()),
                found: extends
                    .as_ref()
                    .map_or_else(|| "none".into(), |p| p.name().to_string()),
            }
            .into());
        }

        let resolved = resolve::resolve_chain(registry, &descriptor)?;

        let insert_statement =
            InsertStatement::new(&descriptor.table, &resolved.ids, &resolved.fields);
        let update_statement =
            UpdateStatement::new(&descriptor.table, &resolved.ids, &resolved.fields);
        let delete_statement = DeleteStatement::new(&descriptor.table, &resolved.ids);
        let load_statement =
            LoadStatement::new(&descriptor.table, &resolved.ids, &resolved.fields);
        let query_statement = QueryStatement::new(descriptor.access, &resolved.fields);

        Ok(Arc::new(Self {
            descriptor,
            extends,
            ids: resolved.ids,
            fields: resolved.fields,
            insert_statement,
            update_statement,
            delete_statement,
            load_statement,
            query_statement,
        }))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.descriptor.table
    }

    #[must_use]
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    #[must_use]
    pub const fn extends(&self) -> Option<&Arc<Self>> {
        self.extends.as_ref()
    }

    #[must_use]
    pub fn identity_columns(&self) -> &[ColumnInfo] {
        &self.ids
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    /// Create the instance across the chain, returning its identity.
    ///
    /// The ancestor row is created first so the descendant row's
    /// foreign key has a target; identity generation happens once, at
    /// the root. A parent sharing this engine's table needs no insert
    /// of its own, the one INSERT here covers the inherited columns.
    pub fn create(
        &self,
        conn: &mut dyn Connection,
        entity: &EntityData,
        identity: Option<Identity>,
    ) -> Result<Identity, Error> {
        let mut span = Span::new(ExecKind::Create, self.name());
        if let Some(id) = &identity {
            id.ensure_size(self.ids.len(), self.name())?;
        }

        let identity = match &self.extends {
            Some(parent) if parent.table() != self.table() => {
                record(MetricsEvent::CascadeStep {
                    kind: ExecKind::Create,
                    type_name: self.name().to_string(),
                });
                Some(parent.create(conn, entity, identity)?)
            }
            _ => identity,
        };

        let identity = self
            .insert_statement
            .execute(conn, identity.as_ref(), entity)?;
        span.set_rows(1);

        Ok(identity)
    }

    /// Store changed columns across the whole chain.
    ///
    /// This level writes first, then the cascade continues to the
    /// parent unconditionally; each level's executor knows which
    /// columns belong to it, so shared-table chains stay correct.
    pub fn store(
        &self,
        conn: &mut dyn Connection,
        identity: &Identity,
        new_entity: &EntityData,
        old_entity: &EntityData,
    ) -> Result<(), Error> {
        let mut span = Span::new(ExecKind::Store, self.name());
        identity.ensure_size(self.ids.len(), self.name())?;

        let rows = self
            .update_statement
            .execute(conn, identity, new_entity, old_entity)?;
        span.set_rows(rows);

        if let Some(parent) = &self.extends {
            record(MetricsEvent::CascadeStep {
                kind: ExecKind::Store,
                type_name: self.name().to_string(),
            });
            parent.store(conn, identity, new_entity, old_entity)?;
        }

        Ok(())
    }

    /// Delete the instance across the chain.
    ///
    /// The child row references the parent row, so this level deletes
    /// before the cascade reaches the parent.
    pub fn delete(&self, conn: &mut dyn Connection, identity: &Identity) -> Result<(), Error> {
        let mut span = Span::new(ExecKind::Delete, self.name());
        identity.ensure_size(self.ids.len(), self.name())?;

        let rows = self.delete_statement.execute(conn, identity)?;
        span.set_rows(rows);

        if let Some(parent) = &self.extends {
            record(MetricsEvent::CascadeStep {
                kind: ExecKind::Delete,
                type_name: self.name().to_string(),
            });
            parent.delete(conn, identity)?;
        }

        Ok(())
    }

    /// Load the instance by identity in one chain-joining SELECT; no
    /// per-level cascade is issued.
    pub fn load(
        &self,
        conn: &mut dyn Connection,
        entity: &mut EntityData,
        identity: &Identity,
        access: AccessMode,
    ) -> Result<(), Error> {
        let mut span = Span::new(ExecKind::Load, self.name());
        identity.ensure_size(self.ids.len(), self.name())?;

        self.load_statement.execute(conn, entity, identity, access)?;
        span.set_rows(1);

        Ok(())
    }

    /// Render a query expression at the requested access mode; `None`
    /// falls back to the descriptor's default.
    #[must_use]
    pub fn prepare_query(
        &self,
        expression: &dyn QueryExpression,
        access: Option<AccessMode>,
    ) -> PreparedQuery {
        self.query_statement.prepare(expression, access)
    }

    /// Execute a query whose select list matches this engine's resolved
    /// columns; `finder` builds such an expression.
    pub fn query(
        &self,
        conn: &mut dyn Connection,
        expression: &dyn QueryExpression,
        params: &[Value],
        access: Option<AccessMode>,
    ) -> Result<Vec<EntityData>, Error> {
        let mut span = Span::new(ExecKind::Query, self.name());

        let prepared = self.query_statement.prepare(expression, access);
        let rows = self.query_statement.execute(conn, &prepared, params)?;
        span.set_rows(u64::try_from(rows.len()).unwrap_or(u64::MAX));

        Ok(rows)
    }

    /// A query expression selecting this engine's full resolved column
    /// list, joins included, ready for caller conditions.
    #[must_use]
    pub fn finder(&self) -> SelectExpression {
        let mut expression = SelectExpression::new(self.table());
        for column in self.load_statement.select_columns() {
            expression = expression.with_column(column.clone());
        }
        for clause in self.load_statement.join_clauses() {
            expression = expression.with_join(clause.clone());
        }
        expression
    }

    /// Build the loader for a to-many relation field of this type.
    pub fn relation_loader(
        &self,
        registry: &Registry,
        field_name: &str,
    ) -> Result<RelationLoader, Error> {
        relation::build_relation_loader(registry, self, field_name)
    }
}
