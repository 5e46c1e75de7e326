//! Schema validation: identifiers, uniqueness of names and keys, operation lists.

use crate::action::Action;
use crate::case::database_name;
use crate::config::SchemaConfig;
use crate::error::ConfigError;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static identifier pattern"))
}

/// Native types are spliced into casts: letters, digits, underscores, dots and inner spaces only.
fn native_type_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*( [A-Za-z0-9_]+)*$").expect("static native type pattern"))
}

/// Model and field names end up in URLs and JSON keys; keep them plain identifiers.
pub fn is_identifier(s: &str) -> bool {
    identifier_re().is_match(s)
}

pub fn validate(config: &SchemaConfig) -> Result<(), ConfigError> {
    let mut model_names = HashSet::new();
    let mut keys = HashSet::new();

    for model in &config.models {
        if !is_identifier(&model.name) {
            return Err(ConfigError::InvalidIdentifier(model.name.clone()));
        }
        if !model_names.insert(model.name.as_str()) || !keys.insert(database_name(&model.name)) {
            return Err(ConfigError::DuplicateModel(model.name.clone()));
        }

        let mut field_names = HashSet::new();
        for field in &model.fields {
            if !is_identifier(&field.name) {
                return Err(ConfigError::InvalidIdentifier(format!("{}.{}", model.name, field.name)));
            }
            if let Some(native) = &field.native_type {
                if !native_type_re().is_match(native) {
                    return Err(ConfigError::InvalidIdentifier(format!(
                        "{}.{} native type '{}'",
                        model.name, field.name, native
                    )));
                }
            }
            if !field_names.insert(field.name.as_str()) {
                return Err(ConfigError::DuplicateField {
                    model: model.name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        for key in &model.unique {
            if key.is_empty() {
                return Err(ConfigError::Load(format!("model {}: empty unique key", model.name)));
            }
            for name in key {
                if !field_names.contains(name.as_str()) {
                    return Err(ConfigError::Load(format!(
                        "model {}: unique key references unknown field '{}'",
                        model.name, name
                    )));
                }
            }
        }

        for op in model.operations.iter().flatten() {
            if Action::is_raw(op) {
                return Err(ConfigError::RawOperation {
                    model: model.name.clone(),
                    operation: op.clone(),
                });
            }
            if Action::parse(op).is_none() {
                return Err(ConfigError::UnknownOperation {
                    model: model.name.clone(),
                    operation: op.clone(),
                });
            }
        }
    }

    Ok(())
}
