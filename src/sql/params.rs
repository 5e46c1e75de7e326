//! Convert JSON argument values into text bind parameters, checked against the field's type.
//! Every placeholder is cast to the field's native type in SQL, so values travel as text.

use crate::config::{FieldInfo, ScalarType};
use crate::error::AppError;
use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::Database;

#[derive(Clone, Debug, PartialEq)]
pub enum PgBindValue {
    Null,
    Text(String),
}

impl PgBindValue {
    #[cfg(test)]
    pub fn text(s: impl Into<String>) -> Self {
        PgBindValue::Text(s.into())
    }

    /// Convert a value for `field`. Lists must be JSON arrays and become array literals.
    pub fn from_json(field: &FieldInfo, v: &Value) -> Result<Self, AppError> {
        if v.is_null() {
            return Ok(PgBindValue::Null);
        }
        if field.is_list {
            let items = v
                .as_array()
                .ok_or_else(|| mismatch(field, "an array"))?;
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                match scalar_text(field, item)? {
                    None => parts.push("NULL".to_string()),
                    Some(s) => parts.push(format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))),
                }
            }
            return Ok(PgBindValue::Text(format!("{{{}}}", parts.join(","))));
        }
        Ok(match scalar_text(field, v)? {
            None => PgBindValue::Null,
            Some(s) => PgBindValue::Text(s),
        })
    }
}

fn mismatch(field: &FieldInfo, expected: &str) -> AppError {
    AppError::BadRequest(format!("{} must be {}", field.name, expected))
}

/// Text form of one scalar, or None for null.
fn scalar_text(field: &FieldInfo, v: &Value) -> Result<Option<String>, AppError> {
    if v.is_null() {
        return Ok(None);
    }
    let text = match field.type_ {
        ScalarType::String => {
            let s = v.as_str().ok_or_else(|| mismatch(field, "a string"))?;
            if field.native_type.eq_ignore_ascii_case("uuid") && uuid::Uuid::parse_str(s).is_err() {
                return Err(mismatch(field, "a valid UUID"));
            }
            s.to_string()
        }
        ScalarType::Int => v
            .as_i64()
            .filter(|n| i32::try_from(*n).is_ok() || !field.native_type.eq_ignore_ascii_case("int4"))
            .ok_or_else(|| mismatch(field, "an integer"))?
            .to_string(),
        ScalarType::BigInt => match v {
            Value::Number(n) => n.as_i64().ok_or_else(|| mismatch(field, "an integer"))?.to_string(),
            Value::String(s) => s
                .parse::<i64>()
                .map_err(|_| mismatch(field, "an integer"))?
                .to_string(),
            _ => return Err(mismatch(field, "an integer")),
        },
        ScalarType::Float => v.as_f64().ok_or_else(|| mismatch(field, "a number"))?.to_string(),
        ScalarType::Decimal => match v {
            Value::Number(n) => n.to_string(),
            Value::String(s) if s.trim().parse::<f64>().is_ok() => s.trim().to_string(),
            _ => return Err(mismatch(field, "a decimal number")),
        },
        ScalarType::Boolean => v.as_bool().ok_or_else(|| mismatch(field, "a boolean"))?.to_string(),
        ScalarType::DateTime => {
            let s = v.as_str().ok_or_else(|| mismatch(field, "an ISO-8601 date-time string"))?;
            if !is_datetime(s) {
                return Err(mismatch(field, "an ISO-8601 date-time string"));
            }
            s.to_string()
        }
        ScalarType::Json => v.to_string(),
        ScalarType::Bytes | ScalarType::Unsupported => {
            v.as_str().ok_or_else(|| mismatch(field, "a string"))?.to_string()
        }
    };
    Ok(Some(text))
}

fn is_datetime(s: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(s).is_ok()
        || chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").is_ok()
        || chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

impl<'q> Encode<'q, Postgres> for PgBindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        match self {
            PgBindValue::Null => Ok(IsNull::Yes),
            PgBindValue::Text(s) => <&str as Encode<Postgres>>::encode_by_ref(&s.as_str(), buf),
        }
    }
}

impl sqlx::Type<Postgres> for PgBindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}

#[cfg(test)]
pub(crate) fn field(name: &str, type_: ScalarType) -> FieldInfo {
    FieldInfo {
        name: name.into(),
        db_name: name.into(),
        kind: "scalar",
        type_,
        native_type: type_.default_native_type().into(),
        is_id: false,
        is_unique: false,
        is_required: true,
        is_list: false,
        has_default_value: false,
        is_generated: false,
        is_updated_at: false,
    }
}
