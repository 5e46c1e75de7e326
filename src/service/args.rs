//! Typed action arguments parsed from a request body: `where`, `data`, `select`, `orderBy`, `take`, `skip`.
//! Shapes are checked against the table's fields; values are checked later when bound.

use crate::action::Action;
use crate::config::{FieldInfo, ResolvedTable, ScalarType};
use crate::error::AppError;
use serde_json::{Map, Value};
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FieldOp {
    Equals(Value),
    Not(Value),
    In(Vec<Value>),
    NotIn(Vec<Value>),
    Lt(Value),
    Lte(Value),
    Gt(Value),
    Gte(Value),
    Contains(String),
    StartsWith(String),
    EndsWith(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
    Field {
        field: String,
        op: FieldOp,
        insensitive: bool,
    },
}

/// Assignment in an update's `data`.
#[derive(Clone, Debug, PartialEq)]
pub enum DataOp {
    Set(Value),
    Increment(Value),
    Decrement(Value),
    Multiply(Value),
    Divide(Value),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FindArgs {
    pub filter: Option<Condition>,
    pub select: Option<Vec<String>>,
    pub order_by: Vec<(String, SortOrder)>,
    pub take: Option<u64>,
    pub skip: Option<u64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CreateArgs {
    pub data: Vec<(String, Value)>,
    pub select: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CreateManyArgs {
    pub data: Vec<Vec<(String, Value)>>,
    pub skip_duplicates: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateArgs {
    pub filter: Condition,
    pub data: Vec<(String, DataOp)>,
    pub select: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateManyArgs {
    pub filter: Option<Condition>,
    pub data: Vec<(String, DataOp)>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DeleteArgs {
    pub filter: Condition,
    pub select: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DeleteManyArgs {
    pub filter: Option<Condition>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ActionArgs {
    FindUnique(FindArgs),
    FindFirst(FindArgs),
    FindMany(FindArgs),
    Create(CreateArgs),
    CreateMany(CreateManyArgs),
    Update(UpdateArgs),
    UpdateMany(UpdateManyArgs),
    Delete(DeleteArgs),
    DeleteMany(DeleteManyArgs),
}

fn bad(msg: impl Into<String>) -> AppError {
    AppError::BadRequest(msg.into())
}

impl ActionArgs {
    /// Parse `body` (null counts as `{}`) into the argument shape of `action`.
    pub fn parse(table: &ResolvedTable, action: Action, body: &Value) -> Result<Self, AppError> {
        let empty = Map::new();
        let obj = match body {
            Value::Null => &empty,
            Value::Object(m) => m,
            _ => return Err(bad("arguments must be a JSON object")),
        };
        let p = ArgParser { table, obj };

        Ok(match action {
            Action::FindUnique => {
                p.allow(&["where", "select"])?;
                let filter = p.unique_where(action)?;
                ActionArgs::FindUnique(FindArgs {
                    filter: Some(filter),
                    select: p.select()?,
                    ..FindArgs::default()
                })
            }
            Action::FindFirst | Action::FindMany => {
                p.allow(&["where", "select", "orderBy", "take", "skip"])?;
                let args = FindArgs {
                    filter: p.optional_where()?,
                    select: p.select()?,
                    order_by: p.order_by()?,
                    take: p.count("take")?,
                    skip: p.count("skip")?,
                };
                if action == Action::FindFirst {
                    ActionArgs::FindFirst(args)
                } else {
                    ActionArgs::FindMany(args)
                }
            }
            Action::Create => {
                p.allow(&["data", "select"])?;
                let data = p.obj.get("data").ok_or_else(|| bad("create requires 'data'"))?;
                ActionArgs::Create(CreateArgs {
                    data: p.create_data(data)?,
                    select: p.select()?,
                })
            }
            Action::CreateMany => {
                p.allow(&["data", "skipDuplicates"])?;
                let rows = match p.obj.get("data") {
                    Some(Value::Array(items)) => items.iter().map(|d| p.create_data(d)).collect::<Result<Vec<_>, _>>()?,
                    Some(single @ Value::Object(_)) => vec![p.create_data(single)?],
                    _ => return Err(bad("createMany requires 'data' as an array of objects")),
                };
                let skip_duplicates = match p.obj.get("skipDuplicates") {
                    None | Some(Value::Null) => false,
                    Some(Value::Bool(b)) => *b,
                    Some(_) => return Err(bad("skipDuplicates must be a boolean")),
                };
                ActionArgs::CreateMany(CreateManyArgs {
                    data: rows,
                    skip_duplicates,
                })
            }
            Action::Update => {
                p.allow(&["where", "data", "select"])?;
                ActionArgs::Update(UpdateArgs {
                    filter: p.unique_where(action)?,
                    data: p.update_data()?,
                    select: p.select()?,
                })
            }
            Action::UpdateMany => {
                p.allow(&["where", "data"])?;
                ActionArgs::UpdateMany(UpdateManyArgs {
                    filter: p.optional_where()?,
                    data: p.update_data()?,
                })
            }
            Action::Delete => {
                p.allow(&["where", "select"])?;
                ActionArgs::Delete(DeleteArgs {
                    filter: p.unique_where(action)?,
                    select: p.select()?,
                })
            }
            Action::DeleteMany => {
                p.allow(&["where"])?;
                ActionArgs::DeleteMany(DeleteManyArgs {
                    filter: p.optional_where()?,
                })
            }
            Action::Upsert | Action::Aggregate | Action::GroupBy => {
                return Err(AppError::Execution(format!("{} is not supported", action)));
            }
        })
    }
}

struct ArgParser<'a> {
    table: &'a ResolvedTable,
    obj: &'a Map<String, Value>,
}

impl<'a> ArgParser<'a> {
    fn allow(&self, keys: &[&str]) -> Result<(), AppError> {
        match self.obj.keys().find(|k| !keys.contains(&k.as_str())) {
            Some(k) => Err(bad(format!("unknown argument '{}'", k))),
            None => Ok(()),
        }
    }

    fn field(&self, name: &str) -> Result<&'a FieldInfo, AppError> {
        self.table
            .field(name)
            .ok_or_else(|| bad(format!("unknown field '{}' on {}", name, self.table.model)))
    }

    fn optional_where(&self) -> Result<Option<Condition>, AppError> {
        match self.obj.get("where") {
            None | Some(Value::Null) => Ok(None),
            Some(w) => self.condition(w).map(Some),
        }
    }

    /// `where` that identifies one record: equality on every field of some unique key.
    fn unique_where(&self, action: Action) -> Result<Condition, AppError> {
        let w = self
            .obj
            .get("where")
            .filter(|w| !w.is_null())
            .ok_or_else(|| bad(format!("{} requires 'where'", action)))?;
        let filter = self.condition(w)?;
        if !is_unique_filter(self.table, &filter) {
            return Err(bad(format!(
                "{} requires 'where' to match an id or unique field of {}",
                action, self.table.model
            )));
        }
        Ok(filter)
    }

    fn condition(&self, v: &Value) -> Result<Condition, AppError> {
        let obj = v.as_object().ok_or_else(|| bad("'where' must be an object"))?;
        let mut parts = Vec::new();
        for (key, value) in obj {
            match key.as_str() {
                "AND" => parts.push(Condition::And(self.condition_list(value)?)),
                "OR" => parts.push(Condition::Or(self.condition_list(value)?)),
                "NOT" => parts.push(self.negation(value)?),
                _ => {
                    if let Some(key_fields) = self.compound_key(key) {
                        let inner = value
                            .as_object()
                            .ok_or_else(|| bad(format!("'{}' must be an object", key)))?;
                        for name in key_fields {
                            let v = inner.get(name).ok_or_else(|| bad(format!("'{}' requires '{}'", key, name)))?;
                            parts.push(Condition::Field {
                                field: name.clone(),
                                op: FieldOp::Equals(v.clone()),
                                insensitive: false,
                            });
                        }
                    } else {
                        let field = self.field(key)?;
                        parts.extend(self.field_conditions(field, value)?);
                    }
                }
            }
        }
        Ok(if parts.len() == 1 {
            parts.remove(0)
        } else {
            Condition::And(parts)
        })
    }

    /// `NOT: {..}` negates the object; `NOT: [..]` requires every listed condition to be false.
    fn negation(&self, v: &Value) -> Result<Condition, AppError> {
        Ok(match v {
            Value::Array(_) => Condition::And(
                self.condition_list(v)?
                    .into_iter()
                    .map(|c| Condition::Not(Box::new(c)))
                    .collect(),
            ),
            _ => Condition::Not(Box::new(self.condition(v)?)),
        })
    }

    fn condition_list(&self, v: &Value) -> Result<Vec<Condition>, AppError> {
        match v {
            Value::Array(items) => items.iter().map(|i| self.condition(i)).collect(),
            Value::Object(_) => Ok(vec![self.condition(v)?]),
            _ => Err(bad("logical operators take an object or an array of objects")),
        }
    }

    /// Composite unique key addressed by its joined name, e.g. `orgId_userId`.
    fn compound_key(&self, key: &str) -> Option<&'a Vec<String>> {
        if self.table.field(key).is_some() {
            return None;
        }
        self.table
            .unique_keys
            .iter()
            .find(|k| k.len() > 1 && k.join("_") == key)
    }

    fn field_conditions(&self, field: &FieldInfo, v: &Value) -> Result<Vec<Condition>, AppError> {
        let ops = match v {
            Value::Object(ops) => ops,
            _ => {
                return Ok(vec![Condition::Field {
                    field: field.name.clone(),
                    op: FieldOp::Equals(v.clone()),
                    insensitive: false,
                }])
            }
        };
        let insensitive = match ops.get("mode") {
            None => false,
            Some(Value::String(m)) if m == "insensitive" => true,
            Some(Value::String(m)) if m == "default" => false,
            Some(_) => return Err(bad("mode must be 'default' or 'insensitive'")),
        };
        let is_text = field.type_ == ScalarType::String && !field.is_list;
        let text = |op: &str, v: &Value| -> Result<String, AppError> {
            if !is_text {
                return Err(bad(format!("'{}' only applies to string fields ({})", op, field.name)));
            }
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| bad(format!("'{}' on {} takes a string", op, field.name)))
        };
        let list = |op: &str, v: &Value| -> Result<Vec<Value>, AppError> {
            v.as_array()
                .cloned()
                .ok_or_else(|| bad(format!("'{}' on {} takes an array", op, field.name)))
        };

        let mut out = Vec::new();
        for (op, value) in ops {
            let op = match op.as_str() {
                "mode" => continue,
                "equals" => FieldOp::Equals(value.clone()),
                "not" => {
                    if value.is_object() {
                        let nested = self.field_conditions(field, value)?;
                        out.push(Condition::Not(Box::new(Condition::And(nested))));
                        continue;
                    }
                    FieldOp::Not(value.clone())
                }
                "in" => FieldOp::In(list("in", value)?),
                "notIn" => FieldOp::NotIn(list("notIn", value)?),
                "lt" => FieldOp::Lt(value.clone()),
                "lte" => FieldOp::Lte(value.clone()),
                "gt" => FieldOp::Gt(value.clone()),
                "gte" => FieldOp::Gte(value.clone()),
                "contains" => FieldOp::Contains(text("contains", value)?),
                "startsWith" => FieldOp::StartsWith(text("startsWith", value)?),
                "endsWith" => FieldOp::EndsWith(text("endsWith", value)?),
                other => return Err(bad(format!("unknown filter '{}' on {}", other, field.name))),
            };
            out.push(Condition::Field {
                field: field.name.clone(),
                op,
                insensitive: insensitive && is_text,
            });
        }
        if out.is_empty() {
            return Err(bad(format!("empty filter on {}", field.name)));
        }
        Ok(out)
    }

    fn select(&self) -> Result<Option<Vec<String>>, AppError> {
        let sel = match self.obj.get("select") {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Object(m)) => m,
            Some(_) => return Err(bad("'select' must be an object")),
        };
        let mut fields = Vec::new();
        for (name, on) in sel {
            self.field(name)?;
            match on {
                Value::Bool(true) => fields.push(name.clone()),
                Value::Bool(false) => {}
                _ => return Err(bad(format!("select.{} must be a boolean", name))),
            }
        }
        if fields.is_empty() {
            return Err(bad("'select' must pick at least one field"));
        }
        // declaration order, not key order
        fields.sort_by_key(|n| self.table.fields.iter().position(|f| f.name == *n));
        Ok(Some(fields))
    }

    fn order_by(&self) -> Result<Vec<(String, SortOrder)>, AppError> {
        let entries: Vec<&Value> = match self.obj.get("orderBy") {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(items)) => items.iter().collect(),
            Some(v @ Value::Object(_)) => vec![v],
            Some(_) => return Err(bad("'orderBy' must be an object or an array of objects")),
        };
        let mut out = Vec::with_capacity(entries.len());
        for entry in entries {
            let obj = entry
                .as_object()
                .filter(|o| o.len() == 1)
                .ok_or_else(|| bad("each orderBy entry must name exactly one field"))?;
            for (name, dir) in obj {
                self.field(name)?;
                let dir = match dir.as_str() {
                    Some("asc") => SortOrder::Asc,
                    Some("desc") => SortOrder::Desc,
                    _ => return Err(bad(format!("orderBy.{} must be 'asc' or 'desc'", name))),
                };
                out.push((name.clone(), dir));
            }
        }
        Ok(out)
    }

    fn count(&self, key: &str) -> Result<Option<u64>, AppError> {
        match self.obj.get(key) {
            None | Some(Value::Null) => Ok(None),
            // LIMIT/OFFSET are bigint
            Some(v) => v
                .as_u64()
                .filter(|n| i64::try_from(*n).is_ok())
                .map(Some)
                .ok_or_else(|| bad(format!("'{}' must be a non-negative integer within bigint range", key))),
        }
    }

    fn writable(&self, name: &str) -> Result<&'a FieldInfo, AppError> {
        let field = self.field(name)?;
        if field.is_generated {
            return Err(bad(format!("{} is generated and cannot be written", name)));
        }
        Ok(field)
    }

    fn create_data(&self, data: &Value) -> Result<Vec<(String, Value)>, AppError> {
        let obj = data.as_object().ok_or_else(|| bad("'data' must be an object"))?;
        let mut out = Vec::with_capacity(obj.len());
        for (name, value) in obj {
            self.writable(name)?;
            out.push((name.clone(), value.clone()));
        }
        let given: HashSet<&str> = obj.keys().map(String::as_str).collect();
        if let Some(missing) = self.table.fields.iter().find(|f| {
            f.is_required
                && !f.has_default_value
                && !f.is_generated
                && !f.is_updated_at
                && !f.is_list
                && !given.contains(f.name.as_str())
        }) {
            return Err(bad(format!("missing required field '{}'", missing.name)));
        }
        Ok(out)
    }

    fn update_data(&self) -> Result<Vec<(String, DataOp)>, AppError> {
        let obj = match self.obj.get("data") {
            Some(Value::Object(m)) => m,
            _ => return Err(bad("update requires 'data' as an object")),
        };
        let mut out = Vec::with_capacity(obj.len());
        for (name, value) in obj {
            let field = self.writable(name)?;
            let op = match value {
                Value::Object(ops) if field.type_ != ScalarType::Json => {
                    if ops.len() != 1 {
                        return Err(bad(format!("data.{} takes exactly one operation", name)));
                    }
                    let (op, v) = ops.iter().next().ok_or_else(|| bad("empty operation"))?;
                    let numeric = matches!(
                        field.type_,
                        ScalarType::Int | ScalarType::BigInt | ScalarType::Float | ScalarType::Decimal
                    ) && !field.is_list;
                    match op.as_str() {
                        "set" => DataOp::Set(v.clone()),
                        "increment" | "decrement" | "multiply" | "divide" if !numeric => {
                            return Err(bad(format!("'{}' only applies to numeric fields ({})", op, name)))
                        }
                        "increment" => DataOp::Increment(v.clone()),
                        "decrement" => DataOp::Decrement(v.clone()),
                        "multiply" => DataOp::Multiply(v.clone()),
                        "divide" => DataOp::Divide(v.clone()),
                        other => return Err(bad(format!("unknown update operation '{}' on {}", other, name))),
                    }
                }
                other => DataOp::Set(other.clone()),
            };
            out.push((name.clone(), op));
        }
        Ok(out)
    }
}

/// True when the top-level equalities cover every field of one of the table's unique keys.
pub fn is_unique_filter(table: &ResolvedTable, filter: &Condition) -> bool {
    let top: Vec<&Condition> = match filter {
        Condition::And(parts) => parts.iter().collect(),
        other => vec![other],
    };
    let equal: HashSet<&str> = top
        .iter()
        .filter_map(|c| match c {
            Condition::Field {
                field,
                op: FieldOp::Equals(v),
                insensitive: false,
            } if !v.is_null() => Some(field.as_str()),
            _ => None,
        })
        .collect();
    table
        .unique_keys
        .iter()
        .any(|key| key.iter().all(|f| equal.contains(f.as_str())))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::resolve;
    use serde_json::json;

    pub(crate) fn user_table() -> ResolvedTable {
        let config = serde_json::from_value(json!({
            "models": [{
                "name": "User",
                "fields": [
                    { "name": "id", "type": "Int", "is_id": true, "has_default_value": true },
                    { "name": "email", "type": "String", "is_unique": true },
                    { "name": "name", "type": "String", "is_required": false },
                    { "name": "age", "type": "Int", "is_required": false },
                    { "name": "orgId", "type": "Int", "is_required": false },
                    { "name": "meta", "type": "Json", "is_required": false },
                    { "name": "updatedAt", "type": "DateTime", "is_updated_at": true },
                    { "name": "search", "type": "Unsupported", "native_type": "tsvector", "is_generated": true }
                ],
                "unique": [["orgId", "name"]]
            }]
        }))
        .unwrap();
        resolve(&config, "public").unwrap().table("user").unwrap().clone()
    }

    fn parse(action: Action, body: Value) -> Result<ActionArgs, AppError> {
        ActionArgs::parse(&user_table(), action, &body)
    }

    #[test]
    fn find_many_full_shape() {
        let args = parse(
            Action::FindMany,
            json!({
                "where": { "age": { "gte": 18, "lt": 65 }, "name": { "contains": "an", "mode": "insensitive" } },
                "select": { "name": true, "id": true },
                "orderBy": [{ "age": "desc" }, { "id": "asc" }],
                "take": 10,
                "skip": 5
            }),
        )
        .unwrap();
        let ActionArgs::FindMany(f) = args else { panic!("expected findMany") };
        assert_eq!(f.select, Some(vec!["id".to_string(), "name".to_string()]));
        assert_eq!(f.order_by, vec![("age".into(), SortOrder::Desc), ("id".into(), SortOrder::Asc)]);
        assert_eq!((f.take, f.skip), (Some(10), Some(5)));
        let Some(Condition::And(parts)) = f.filter else { panic!("expected AND") };
        assert_eq!(parts.len(), 3);
        assert!(parts.contains(&Condition::Field {
            field: "name".into(),
            op: FieldOp::Contains("an".into()),
            insensitive: true
        }));
    }

    #[test]
    fn null_body_is_empty_arguments() {
        assert_eq!(parse(Action::FindMany, Value::Null).unwrap(), ActionArgs::FindMany(FindArgs::default()));
        assert!(matches!(
            parse(Action::DeleteMany, Value::Null).unwrap(),
            ActionArgs::DeleteMany(DeleteManyArgs { filter: None })
        ));
        assert!(parse(Action::FindMany, json!([1, 2])).is_err());
    }

    #[test]
    fn unknown_keys_and_fields_are_rejected() {
        assert!(parse(Action::FindMany, json!({ "limit": 3 })).is_err());
        assert!(parse(Action::FindMany, json!({ "where": { "ghost": 1 } })).is_err());
        assert!(parse(Action::FindMany, json!({ "where": { "age": { "near": 3 } } })).is_err());
        assert!(parse(Action::FindMany, json!({ "where": { "age": { "contains": "1" } } })).is_err());
        assert!(parse(Action::FindMany, json!({ "take": -1 })).is_err());
        assert!(parse(Action::FindMany, json!({ "take": 18446744073709551615u64 })).is_err());
        assert!(parse(Action::FindMany, json!({ "skip": (i64::MAX as u64) + 1 })).is_err());
        assert!(parse(Action::FindMany, json!({ "take": i64::MAX })).is_ok());
        assert!(parse(Action::FindMany, json!({ "orderBy": { "age": "desc", "id": "asc" } })).is_err());
    }

    #[test]
    fn find_unique_needs_a_unique_key() {
        assert!(parse(Action::FindUnique, json!({ "where": { "id": 1 } })).is_ok());
        assert!(parse(Action::FindUnique, json!({ "where": { "email": "a@b.c", "age": 3 } })).is_ok());
        assert!(parse(Action::FindUnique, json!({ "where": { "age": 3 } })).is_err());
        assert!(parse(Action::FindUnique, json!({ "where": { "id": { "gt": 1 } } })).is_err());
        assert!(parse(Action::FindUnique, json!({})).is_err());
    }

    #[test]
    fn compound_unique_key_by_joined_name() {
        let args = parse(Action::Delete, json!({ "where": { "orgId_name": { "orgId": 1, "name": "x" } } })).unwrap();
        let ActionArgs::Delete(d) = args else { panic!("expected delete") };
        assert_eq!(
            d.filter,
            Condition::And(vec![
                Condition::Field { field: "orgId".into(), op: FieldOp::Equals(json!(1)), insensitive: false },
                Condition::Field { field: "name".into(), op: FieldOp::Equals(json!("x")), insensitive: false },
            ])
        );
    }

    #[test]
    fn logical_operators_nest() {
        let args = parse(
            Action::FindFirst,
            json!({ "where": { "OR": [{ "age": null }, { "NOT": { "name": "bob" } }] } }),
        )
        .unwrap();
        let ActionArgs::FindFirst(f) = args else { panic!("expected findFirst") };
        let Some(Condition::Or(branches)) = f.filter else { panic!("expected OR") };
        assert_eq!(branches.len(), 2);
        assert!(matches!(branches[1], Condition::Not(_)));
    }

    #[test]
    fn create_checks_required_and_generated_fields() {
        assert!(parse(Action::Create, json!({ "data": { "email": "a@b.c" } })).is_ok());
        let missing = parse(Action::Create, json!({ "data": { "name": "a" } })).unwrap_err();
        assert!(missing.to_string().contains("email"));
        assert!(parse(Action::Create, json!({ "data": { "email": "a@b.c", "search": "x" } })).is_err());
        assert!(parse(Action::Create, json!({})).is_err());
    }

    #[test]
    fn create_many_accepts_single_object() {
        let args = parse(Action::CreateMany, json!({ "data": { "email": "a@b.c" }, "skipDuplicates": true })).unwrap();
        let ActionArgs::CreateMany(c) = args else { panic!("expected createMany") };
        assert_eq!(c.data.len(), 1);
        assert!(c.skip_duplicates);
    }

    #[test]
    fn update_operations() {
        let args = parse(
            Action::Update,
            json!({ "where": { "id": 1 }, "data": { "age": { "increment": 1 }, "meta": { "k": "v" }, "name": { "set": null } } }),
        )
        .unwrap();
        let ActionArgs::Update(u) = args else { panic!("expected update") };
        assert!(u.data.contains(&("age".into(), DataOp::Increment(json!(1)))));
        assert!(u.data.contains(&("meta".into(), DataOp::Set(json!({ "k": "v" })))));
        assert!(u.data.contains(&("name".into(), DataOp::Set(Value::Null))));

        assert!(parse(Action::Update, json!({ "where": { "id": 1 }, "data": { "name": { "increment": 1 } } })).is_err());
        assert!(parse(Action::Update, json!({ "where": { "age": 1 }, "data": {} })).is_err());
        assert!(parse(Action::UpdateMany, json!({ "data": { "age": 3 } })).is_ok());
    }

    #[test]
    fn unwired_actions_are_not_parsed() {
        assert!(matches!(parse(Action::Upsert, json!({})), Err(AppError::Execution(_))));
    }
}
