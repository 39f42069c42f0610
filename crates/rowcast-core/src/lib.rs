//! Core runtime for rowcast: the identity model, per-type cascading
//! engines, statement executors, relation loaders, and observability.
//!
//! Engines are immutable after construction and shared read-only; the
//! caller owns the connection, the transaction, and every per-operation
//! payload. Cascading failures are fail-fast: the first statement error
//! aborts the cascade and propagates unchanged.

pub mod engine;
pub mod entity;
pub mod error;
pub mod identity;
pub mod obs;
pub mod sql;

pub use engine::{Engine, EngineSet, RelationLoader, TableInfo};
pub use entity::EntityData;
pub use error::{Error, IdentityShapeError, StatementError};
pub use identity::Identity;

///
/// Prelude
///
/// Domain vocabulary only; executors, sinks, and helpers stay one
/// module level down.
///

pub mod prelude {
    pub use crate::{
        engine::{Engine, EngineSet, RelationLoader},
        entity::EntityData,
        identity::Identity,
        sql::{Connection, QueryExpression, SelectExpression},
    };
    pub use rowcast_primitives::{AccessMode, SqlType, Value};
    pub use rowcast_schema::{FieldDescriptor, Registry, Relation, Storage, TypeDescriptor};
}
