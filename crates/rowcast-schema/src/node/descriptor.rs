use crate::node::FieldDescriptor;
use rowcast_primitives::AccessMode;
use serde::Serialize;

///
/// TypeDescriptor
///
/// One mapped persistent type. Immutable after load; `extends` names
/// the parent type and is resolved through the registry, so multiple
/// descriptors form a tree without holding live references to each
/// other.
///

#[derive(Clone, Debug, Serialize)]
pub struct TypeDescriptor {
    pub name: String,
    pub table: String,
    pub extends: Option<String>,
    pub identities: Vec<FieldDescriptor>,
    pub fields: Vec<FieldDescriptor>,
    pub access: AccessMode,
}

impl TypeDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            extends: None,
            identities: Vec::new(),
            fields: Vec::new(),
            access: AccessMode::Shared,
        }
    }

    #[must_use]
    pub fn with_extends(mut self, parent: impl Into<String>) -> Self {
        self.extends = Some(parent.into());
        self
    }

    #[must_use]
    pub fn with_identity(mut self, field: FieldDescriptor) -> Self {
        self.identities.push(field);
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn with_access(mut self, access: AccessMode) -> Self {
        self.access = access;
        self
    }

    #[must_use]
    pub fn get_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn get_identity(&self, name: &str) -> Option<&FieldDescriptor> {
        self.identities.iter().find(|f| f.name == name)
    }
}
