//! Declared schema types: the JSON shape of a schema file, also produced by introspection.

use serde::{Deserialize, Serialize};

/// Scalar type of a field, in the vocabulary clients see.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarType {
    String,
    Int,
    BigInt,
    Float,
    Decimal,
    Boolean,
    DateTime,
    Json,
    Bytes,
    Unsupported,
}

impl ScalarType {
    /// PostgreSQL type used for casts when a field does not declare one.
    pub fn default_native_type(&self) -> &'static str {
        match self {
            ScalarType::String => "text",
            ScalarType::Int => "int4",
            ScalarType::BigInt => "int8",
            ScalarType::Float => "float8",
            ScalarType::Decimal => "numeric",
            ScalarType::Boolean => "bool",
            ScalarType::DateTime => "timestamptz",
            ScalarType::Json => "jsonb",
            ScalarType::Bytes => "bytea",
            ScalarType::Unsupported => "text",
        }
    }

    /// Map a PostgreSQL `udt_name` (element type for arrays) to a scalar type.
    pub fn from_pg(udt_name: &str) -> ScalarType {
        match udt_name.to_lowercase().as_str() {
            "int2" | "int4" => ScalarType::Int,
            "int8" => ScalarType::BigInt,
            "float4" | "float8" => ScalarType::Float,
            "numeric" | "money" => ScalarType::Decimal,
            "bool" => ScalarType::Boolean,
            "text" | "varchar" | "bpchar" | "char" | "name" | "uuid" | "citext" | "inet" | "xml" => ScalarType::String,
            "timestamp" | "timestamptz" | "date" | "time" | "timetz" => ScalarType::DateTime,
            "json" | "jsonb" => ScalarType::Json,
            "bytea" => ScalarType::Bytes,
            _ => ScalarType::Unsupported,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    /// Column name when it differs from the field name.
    #[serde(default)]
    pub db_name: Option<String>,
    #[serde(rename = "type")]
    pub type_: ScalarType,
    /// PostgreSQL element type (e.g. "uuid", "varchar"). Defaults from `type`.
    #[serde(default)]
    pub native_type: Option<String>,
    #[serde(default)]
    pub is_id: bool,
    #[serde(default)]
    pub is_unique: bool,
    #[serde(default = "default_true")]
    pub is_required: bool,
    #[serde(default)]
    pub is_list: bool,
    #[serde(default)]
    pub has_default_value: bool,
    #[serde(default)]
    pub is_generated: bool,
    #[serde(default)]
    pub is_updated_at: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    /// Table name when it differs from the model name.
    #[serde(default)]
    pub db_name: Option<String>,
    pub fields: Vec<FieldConfig>,
    /// Composite unique keys (field names). Single-field keys can use `is_unique` instead.
    #[serde(default)]
    pub unique: Vec<Vec<String>>,
    /// Exposed operations. When absent: every non-raw action, or the read-only set for views.
    #[serde(default)]
    pub operations: Option<Vec<String>>,
    #[serde(default)]
    pub read_only: bool,
}

/// A full schema: every model the bridge exposes.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// PostgreSQL schema holding the tables. Falls back to the configured default.
    #[serde(default)]
    pub schema: Option<String>,
    pub models: Vec<ModelConfig>,
}
