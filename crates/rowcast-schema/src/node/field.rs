use rowcast_primitives::{ConvertFn, SqlType, convert};
use serde::Serialize;

///
/// Column
///

#[derive(Clone, Debug, Serialize)]
pub struct Column {
    pub name: String,
    pub sql_type: SqlType,
}

impl Column {
    #[must_use]
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
        }
    }
}

///
/// Storage
///
/// Physical column mapping for one field. A field may span several
/// columns; converters translate between the in-memory value and the
/// per-column storage representation.
///

#[derive(Clone, Debug, Serialize)]
pub struct Storage {
    pub columns: Vec<Column>,

    #[serde(skip)]
    pub to_storage: ConvertFn,

    #[serde(skip)]
    pub from_storage: ConvertFn,
}

impl Storage {
    /// Single-column storage with identity converters.
    #[must_use]
    pub fn column(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self::columns(vec![Column::new(name, sql_type)])
    }

    /// Multi-column storage with identity converters.
    #[must_use]
    pub fn columns(columns: Vec<Column>) -> Self {
        Self {
            columns,
            to_storage: convert::pass,
            from_storage: convert::pass,
        }
    }

    #[must_use]
    pub fn with_converters(mut self, to_storage: ConvertFn, from_storage: ConvertFn) -> Self {
        self.to_storage = to_storage;
        self.from_storage = from_storage;
        self
    }
}

///
/// Relation
///
/// Reference metadata for a field pointing at another persistent type.
/// `many_table` names the join table of a many-to-many association;
/// `many_key` overrides the owning-side key column names and
/// `name_columns` the related-side identity column names. Overrides
/// must match the respective identity arity exactly.
///

#[derive(Clone, Debug, Serialize)]
pub struct Relation {
    pub target: String,
    pub many_table: Option<String>,
    pub many_key: Vec<String>,
    pub name_columns: Vec<String>,
}

impl Relation {
    #[must_use]
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            many_table: None,
            many_key: Vec::new(),
            name_columns: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_many_table(mut self, table: impl Into<String>) -> Self {
        self.many_table = Some(table.into());
        self
    }

    #[must_use]
    pub fn with_many_key(mut self, columns: Vec<String>) -> Self {
        self.many_key = columns;
        self
    }

    #[must_use]
    pub fn with_name_columns(mut self, columns: Vec<String>) -> Self {
        self.name_columns = columns;
        self
    }
}

///
/// FieldDescriptor
///
/// One mapped field. A field is persistable when it is non-transient
/// and carries storage or relation metadata; anything else exists only
/// in the object model and never reaches generated SQL.
///

#[derive(Clone, Debug, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub transient: bool,
    pub storage: Option<Storage>,
    pub relation: Option<Relation>,
}

impl FieldDescriptor {
    /// Field mapped to physical storage.
    #[must_use]
    pub fn stored(name: impl Into<String>, storage: Storage) -> Self {
        Self {
            name: name.into(),
            transient: false,
            storage: Some(storage),
            relation: None,
        }
    }

    /// Field excluded from persistence.
    #[must_use]
    pub fn transient(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transient: true,
            storage: None,
            relation: None,
        }
    }

    /// Field present in the object model with no storage or relation
    /// metadata; skipped by resolution.
    #[must_use]
    pub fn unmapped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transient: false,
            storage: None,
            relation: None,
        }
    }

    #[must_use]
    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relation = Some(relation);
        self
    }

    #[must_use]
    pub fn is_persistable(&self) -> bool {
        !self.transient && (self.storage.is_some() || self.relation.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_fields_are_persistable() {
        let f = FieldDescriptor::stored("name", Storage::column("name", SqlType::Varchar));
        assert!(f.is_persistable());
        assert_eq!(f.storage.as_ref().map(|s| s.columns.len()), Some(1));
    }

    #[test]
    fn transient_and_unmapped_fields_are_not_persistable() {
        assert!(!FieldDescriptor::transient("scratch").is_persistable());
        assert!(!FieldDescriptor::unmapped("derived").is_persistable());
    }

    #[test]
    fn relation_only_fields_are_persistable() {
        let f = FieldDescriptor::unmapped("toys").with_relation(Relation::to("Toy"));
        assert!(f.is_persistable());
        assert!(f.storage.is_none());
    }

    #[test]
    fn storage_defaults_to_pass_converters() {
        let s = Storage::column("id", SqlType::BigInt);
        let v = rowcast_primitives::Value::Int(1);
        assert_eq!((s.to_storage)(&v).expect("pass never fails"), v);
        assert_eq!((s.from_storage)(&v).expect("pass never fails"), v);
    }

    #[test]
    fn serialization_skips_converters() {
        let f = FieldDescriptor::stored("id", Storage::column("id", SqlType::BigInt));
        let json = serde_json::to_value(&f).expect("field descriptor should serialize");
        let storage = json
            .get("storage")
            .expect("storage metadata should serialize");
        assert!(storage.get("to_storage").is_none());
        assert_eq!(storage["columns"][0]["name"], "id");
    }
}
