//! Build the schema registry from a declared schema file or from the live database.

use crate::action::{Action, ALL_ACTIONS, READ_ONLY_ACTIONS};
use crate::case::database_name;
use crate::config::resolved::{FieldInfo, ResolvedTable, SchemaRegistry};
use crate::config::types::*;
use crate::config::{is_identifier, validate};
use crate::error::ConfigError;
use sqlx::PgPool;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Build the registry from a schema config (validates first).
/// `default_schema` is used when the config does not name a PostgreSQL schema.
pub fn resolve(config: &SchemaConfig, default_schema: &str) -> Result<SchemaRegistry, ConfigError> {
    validate(config)?;
    let schema_name = config.schema.as_deref().unwrap_or(default_schema);

    let mut tables = Vec::with_capacity(config.models.len());
    for model in &config.models {
        let fields: Vec<FieldInfo> = model
            .fields
            .iter()
            .map(|f| FieldInfo {
                name: f.name.clone(),
                db_name: f.db_name.clone().unwrap_or_else(|| f.name.clone()),
                kind: "scalar",
                type_: f.type_,
                native_type: f
                    .native_type
                    .clone()
                    .unwrap_or_else(|| f.type_.default_native_type().to_string()),
                is_id: f.is_id,
                is_unique: f.is_unique,
                is_required: f.is_required,
                is_list: f.is_list,
                has_default_value: f.has_default_value,
                is_generated: f.is_generated,
                is_updated_at: f.is_updated_at,
            })
            .collect();

        let mut unique_keys = Vec::new();
        let pk: Vec<String> = fields.iter().filter(|f| f.is_id).map(|f| f.name.clone()).collect();
        if !pk.is_empty() {
            unique_keys.push(pk);
        }
        for f in fields.iter().filter(|f| f.is_unique && !f.is_id) {
            unique_keys.push(vec![f.name.clone()]);
        }
        unique_keys.extend(model.unique.iter().cloned());

        let tables_ops: BTreeSet<Action> = match &model.operations {
            Some(ops) => ops.iter().filter_map(|o| Action::parse(o)).collect(),
            None if model.read_only => READ_ONLY_ACTIONS.into_iter().collect(),
            None => ALL_ACTIONS.into_iter().collect(),
        };
        let operations = if model.read_only {
            let dropped: Vec<_> = tables_ops.iter().filter(|a| a.is_write()).collect();
            if !dropped.is_empty() {
                tracing::warn!(model = %model.name, ?dropped, "read-only model: write operations ignored");
            }
            tables_ops.into_iter().filter(|a| !a.is_write()).collect()
        } else {
            tables_ops
        };

        tables.push(ResolvedTable {
            model: model.name.clone(),
            key: database_name(&model.name),
            schema_name: schema_name.to_string(),
            db_name: model.db_name.clone().unwrap_or_else(|| model.name.clone()),
            fields,
            unique_keys,
            operations,
            read_only: model.read_only,
        });
    }

    Ok(SchemaRegistry::new(tables))
}

/// Read a declared schema JSON file.
pub async fn load_from_path(path: impl AsRef<Path>) -> Result<SchemaConfig, ConfigError> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&text).map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))
}

struct ColumnRow {
    table: String,
    column: String,
    udt_name: String,
    data_type: String,
    is_nullable: String,
    column_default: Option<String>,
    is_generated: String,
    is_identity: String,
}

struct KeyRow {
    table: String,
    constraint: String,
    constraint_type: String,
    column: String,
}

/// Describe every table and view of `schema` as a schema config.
/// Names that are not plain identifiers are skipped with a warning.
pub async fn introspect(pool: &PgPool, schema: &str) -> Result<SchemaConfig, ConfigError> {
    let load = |e: sqlx::Error| ConfigError::Load(format!("introspect {}: {}", schema, e));

    let tables_sql = "SELECT table_name::text, table_type::text FROM information_schema.tables \
                      WHERE table_schema = $1 AND table_type IN ('BASE TABLE', 'VIEW') ORDER BY table_name";
    tracing::debug!(sql = %tables_sql, "query");
    let tables = sqlx::query_as::<_, (String, String)>(tables_sql)
        .bind(schema)
        .fetch_all(pool)
        .await
        .map_err(load)?;

    let columns_sql = "SELECT table_name::text, column_name::text, udt_name::text, data_type::text, \
                       is_nullable::text, column_default::text, is_generated::text, is_identity::text \
                       FROM information_schema.columns WHERE table_schema = $1 \
                       ORDER BY table_name, ordinal_position";
    tracing::debug!(sql = %columns_sql, "query");
    let columns: Vec<ColumnRow> = sqlx::query_as::<
        _,
        (String, String, String, String, String, Option<String>, String, String),
    >(columns_sql)
    .bind(schema)
    .fetch_all(pool)
    .await
    .map_err(load)?
    .into_iter()
    .map(
        |(table, column, udt_name, data_type, is_nullable, column_default, is_generated, is_identity)| ColumnRow {
            table,
            column,
            udt_name,
            data_type,
            is_nullable,
            column_default,
            is_generated,
            is_identity,
        },
    )
    .collect();

    let keys_sql = "SELECT tc.table_name::text, tc.constraint_name::text, tc.constraint_type::text, kcu.column_name::text \
                    FROM information_schema.table_constraints tc \
                    JOIN information_schema.key_column_usage kcu \
                      ON tc.constraint_name = kcu.constraint_name \
                     AND tc.table_schema = kcu.table_schema \
                     AND tc.table_name = kcu.table_name \
                    WHERE tc.table_schema = $1 AND tc.constraint_type IN ('PRIMARY KEY', 'UNIQUE') \
                    ORDER BY tc.table_name, tc.constraint_name, kcu.ordinal_position";
    tracing::debug!(sql = %keys_sql, "query");
    let keys: Vec<KeyRow> = sqlx::query_as::<_, (String, String, String, String)>(keys_sql)
        .bind(schema)
        .fetch_all(pool)
        .await
        .map_err(load)?
        .into_iter()
        .map(|(table, constraint, constraint_type, column)| KeyRow {
            table,
            constraint,
            constraint_type,
            column,
        })
        .collect();

    let config = build_schema_config(schema, &tables, &columns, &keys);
    tracing::info!(schema = %schema, models = config.models.len(), "schema introspected");
    Ok(config)
}

fn build_schema_config(schema: &str, tables: &[(String, String)], columns: &[ColumnRow], keys: &[KeyRow]) -> SchemaConfig {
    // (table, constraint) -> (type, columns in key order)
    let mut constraints: BTreeMap<(&str, &str), (&str, Vec<&str>)> = BTreeMap::new();
    for k in keys {
        constraints
            .entry((k.table.as_str(), k.constraint.as_str()))
            .or_insert_with(|| (k.constraint_type.as_str(), Vec::new()))
            .1
            .push(k.column.as_str());
    }

    let mut models = Vec::new();
    for (table, table_type) in tables {
        if !is_identifier(table) {
            tracing::warn!(table = %table, "skipping table: name is not a plain identifier");
            continue;
        }
        let table_keys: Vec<(&str, &Vec<&str>)> = constraints
            .iter()
            .filter(|((t, _), _)| *t == table.as_str())
            .map(|(_, (ty, cols))| (*ty, cols))
            .collect();
        let in_key = |column: &str, ty: &str, single: bool| {
            table_keys
                .iter()
                .any(|(t, cols)| *t == ty && (!single || cols.len() == 1) && cols.contains(&column))
        };

        let fields: Vec<FieldConfig> = columns
            .iter()
            .filter(|c| c.table == *table)
            .filter(|c| {
                let ok = is_identifier(&c.column);
                if !ok {
                    tracing::warn!(table = %table, column = %c.column, "skipping column: name is not a plain identifier");
                }
                ok
            })
            .map(|c| {
                let is_list = c.data_type.eq_ignore_ascii_case("ARRAY");
                let udt = if is_list { c.udt_name.trim_start_matches('_') } else { c.udt_name.as_str() };
                FieldConfig {
                    name: c.column.clone(),
                    db_name: None,
                    type_: ScalarType::from_pg(udt),
                    native_type: Some(udt.to_string()),
                    is_id: in_key(&c.column, "PRIMARY KEY", false),
                    is_unique: in_key(&c.column, "UNIQUE", true),
                    is_required: c.is_nullable.eq_ignore_ascii_case("NO"),
                    is_list,
                    has_default_value: c.column_default.is_some() || c.is_identity.eq_ignore_ascii_case("YES"),
                    is_generated: c.is_generated.eq_ignore_ascii_case("ALWAYS"),
                    is_updated_at: false,
                }
            })
            .collect();

        let unique: Vec<Vec<String>> = table_keys
            .iter()
            .filter(|(ty, cols)| *ty == "UNIQUE" && cols.len() > 1)
            .map(|(_, cols)| cols.iter().map(|c| c.to_string()).collect::<Vec<String>>())
            .filter(|cols| cols.iter().all(|c| fields.iter().any(|f| f.name == *c)))
            .collect();

        models.push(ModelConfig {
            name: table.clone(),
            db_name: None,
            fields,
            unique,
            operations: None,
            read_only: table_type.eq_ignore_ascii_case("VIEW"),
        });
    }

    SchemaConfig {
        schema: Some(schema.to_string()),
        models,
    }
}
