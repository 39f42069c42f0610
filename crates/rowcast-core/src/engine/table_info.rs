//! Table metadata resolved after engine construction.
//!
//! Foreign-key links between chain tables can only be derived once all
//! engines of a schema exist, so this runs as a separate pass over the
//! completed engine map.

use crate::engine::Engine;
use serde::Serialize;
use std::{collections::BTreeMap, sync::Arc};

///
/// ForeignKey
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ForeignKey {
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
}

///
/// TableInfo
///

#[derive(Clone, Debug, Serialize)]
pub struct TableInfo {
    pub table: String,
    pub columns: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
}

pub(crate) fn resolve_tables(
    engines: &BTreeMap<String, Arc<Engine>>,
) -> BTreeMap<String, TableInfo> {
    let mut tables: BTreeMap<String, TableInfo> = BTreeMap::new();

    for engine in engines.values() {
        let info = tables
            .entry(engine.table().to_string())
            .or_insert_with(|| TableInfo {
                table: engine.table().to_string(),
                columns: Vec::new(),
                foreign_keys: Vec::new(),
            });

        for column in engine.identity_columns() {
            push_unique(&mut info.columns, &column.name);
        }
        for field in engine.fields() {
            if field.is_joined() {
                continue;
            }
            for column in &field.columns {
                push_unique(&mut info.columns, &column.name);
            }
        }

        if let Some(parent) = engine.extends()
            && parent.table() != engine.table()
        {
            let link = ForeignKey {
                columns: engine
                    .identity_columns()
                    .iter()
                    .map(|c| c.name.clone())
                    .collect(),
                referenced_table: parent.table().to_string(),
                referenced_columns: parent
                    .identity_columns()
                    .iter()
                    .map(|c| c.name.clone())
                    .collect(),
            };
            if !info.foreign_keys.contains(&link) {
                info.foreign_keys.push(link);
            }
        }
    }

    tables
}

fn push_unique(columns: &mut Vec<String>, name: &str) {
    if !columns.iter().any(|c| c == name) {
        columns.push(name.to_string());
    }
}
