//! Descriptor nodes: persistent types, fields, columns, relations.

mod descriptor;
mod field;

pub use descriptor::TypeDescriptor;
pub use field::{Column, FieldDescriptor, Relation, Storage};
