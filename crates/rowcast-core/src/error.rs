use rowcast_primitives::ConvertError;
use rowcast_schema::error::ErrorTree;
use thiserror::Error as ThisError;

pub use rowcast_schema::error::SchemaError;
pub use rowcast_schema::registry::ResolutionError;

///
/// IdentityShapeError
///
/// The identity tuple passed to an operation does not match the
/// engine's identity-column count. Always a caller bug; raised before
/// any statement executes and never retried.
///

#[derive(Debug, ThisError)]
#[error("identity for '{type_name}' has arity {found}, expected {expected}")]
pub struct IdentityShapeError {
    pub type_name: String,
    pub expected: usize,
    pub found: usize,
}

///
/// StatementError
///
/// Failures raised while executing one table's worth of SQL work. The
/// cascading engine performs no local recovery; these propagate
/// unchanged to the caller, which owns rollback.
///

#[derive(Debug, ThisError)]
pub enum StatementError {
    #[error("sql execution failed: {message}")]
    Sql { message: String },

    #[error("connection lost: {message}")]
    ConnectionLost { message: String },

    #[error("no generated key available")]
    NoGeneratedKey,

    #[error("cannot generate a {arity}-column identity for table '{table}'")]
    CompositeGeneratedKey { table: String, arity: usize },

    #[error("row not found in '{table}' for identity {identity}")]
    NotFound { table: String, identity: String },

    #[error("field '{field}' missing from entity payload")]
    MissingField { field: String },

    #[error("result row has {found} columns, expected {expected}")]
    RowShape { expected: usize, found: usize },

    #[error(transparent)]
    Convert(#[from] ConvertError),
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("schema validation failed: {0}")]
    Validation(ErrorTree),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Identity(#[from] IdentityShapeError),

    #[error(transparent)]
    Statement(#[from] StatementError),
}

impl From<rowcast_schema::Error> for Error {
    fn from(err: rowcast_schema::Error) -> Self {
        match err {
            rowcast_schema::Error::Validation(tree) => Self::Validation(tree),
            rowcast_schema::Error::Schema(e) => Self::Schema(e),
            rowcast_schema::Error::Resolution(e) => Self::Resolution(e),
        }
    }
}
