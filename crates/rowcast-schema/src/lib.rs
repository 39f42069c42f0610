//! Descriptor model for rowcast: persistent type descriptors, the
//! descriptor registry, and load-time schema validation.
//!
//! Descriptors are built once by a loader, validated once, and shared
//! read-only for the remainder of the process lifetime.

pub mod error;
pub mod node;
pub mod registry;
pub mod validate;

use crate::error::ErrorTree;
use crate::registry::ResolutionError;
use thiserror::Error as ThisError;

pub use error::SchemaError;
pub use node::{Column, FieldDescriptor, Relation, Storage, TypeDescriptor};
pub use registry::Registry;

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("validation failed: {0}")]
    Validation(ErrorTree),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        error::{ErrorTree, SchemaError},
        node::{Column, FieldDescriptor, Relation, Storage, TypeDescriptor},
        registry::{Registry, ResolutionError},
    };
    pub use rowcast_primitives::{AccessMode, ConvertFn, SqlType, Value};
}
