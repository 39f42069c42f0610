//! SQL type codes and access-mode vocabulary.

use serde::Serialize;
use std::fmt::{self, Display};

///
/// SqlType
///
/// Storage type code carried per column by field descriptors. The code
/// travels into generated SQL diagnostics only; it never changes how a
/// statement is built.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum SqlType {
    Boolean,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Numeric,
    Char,
    Varchar,
    Date,
    Timestamp,
    Blob,
}

impl SqlType {
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Boolean => "BOOLEAN",
            Self::SmallInt => "SMALLINT",
            Self::Integer => "INTEGER",
            Self::BigInt => "BIGINT",
            Self::Real => "REAL",
            Self::Double => "DOUBLE",
            Self::Numeric => "NUMERIC",
            Self::Char => "CHAR",
            Self::Varchar => "VARCHAR",
            Self::Date => "DATE",
            Self::Timestamp => "TIMESTAMP",
            Self::Blob => "BLOB",
        }
    }
}

impl Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

///
/// AccessMode
///
/// Whether a read acquires a shared view or a locking view. Locking
/// reads render different literal SQL than shared reads.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub enum AccessMode {
    #[default]
    Shared,
    Locked,
}

impl AccessMode {
    #[must_use]
    pub const fn is_locking(self) -> bool {
        matches!(self, Self::Locked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_uppercase_sql() {
        assert_eq!(SqlType::BigInt.keyword(), "BIGINT");
        assert_eq!(SqlType::Varchar.to_string(), "VARCHAR");
    }

    #[test]
    fn only_locked_mode_locks() {
        assert!(AccessMode::Locked.is_locking());
        assert!(!AccessMode::Shared.is_locking());
        assert_eq!(AccessMode::default(), AccessMode::Shared);
    }
}
