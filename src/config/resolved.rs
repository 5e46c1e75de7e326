//! Resolved schema registry: validated, flattened and read-only for the process lifetime.

use crate::action::Action;
use crate::config::ScalarType;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Field descriptor as served by the introspection endpoint.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldInfo {
    pub name: String,
    pub db_name: String,
    pub kind: &'static str,
    #[serde(rename = "type")]
    pub type_: ScalarType,
    pub native_type: String,
    pub is_id: bool,
    pub is_unique: bool,
    pub is_required: bool,
    pub is_list: bool,
    pub has_default_value: bool,
    pub is_generated: bool,
    pub is_updated_at: bool,
}

impl FieldInfo {
    /// SQL cast for a bound value of this field (e.g. "uuid", "int4[]").
    pub fn cast(&self) -> String {
        if self.is_list {
            format!("{}[]", self.native_type)
        } else {
            self.native_type.clone()
        }
    }
}

#[derive(Clone, Debug)]
pub struct ResolvedTable {
    /// Model name as declared (e.g. "UserProfile").
    pub model: String,
    /// URL key (e.g. "userProfile").
    pub key: String,
    pub schema_name: String,
    pub db_name: String,
    pub fields: Vec<FieldInfo>,
    /// Field-name sets that identify one record: the primary key and each unique key.
    pub unique_keys: Vec<Vec<String>>,
    pub operations: BTreeSet<Action>,
    pub read_only: bool,
}

impl ResolvedTable {
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn supports(&self, action: Action) -> bool {
        self.operations.contains(&action)
    }

    /// Fields clients see: everything except generated columns.
    pub fn exposed_fields(&self) -> Vec<&FieldInfo> {
        self.fields.iter().filter(|f| !f.is_generated).collect()
    }
}

#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    tables: BTreeMap<String, ResolvedTable>,
}

impl SchemaRegistry {
    pub fn new(tables: impl IntoIterator<Item = ResolvedTable>) -> Self {
        SchemaRegistry {
            tables: tables.into_iter().map(|t| (t.key.clone(), t)).collect(),
        }
    }

    /// Table keys, sorted.
    pub fn tables(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    pub fn table(&self, key: &str) -> Option<&ResolvedTable> {
        self.tables.get(key)
    }

    pub fn operations(&self, key: &str) -> Option<&BTreeSet<Action>> {
        self.tables.get(key).map(|t| &t.operations)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
