//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from a resolved table and typed arguments.
//! Record results come back as one `row_to_json` value per row; bulk writes as a row count.

use crate::config::{FieldInfo, ResolvedTable};
use crate::error::AppError;
use crate::service::{Condition, DataOp, FieldOp, FindArgs, SortOrder};
use crate::sql::PgBindValue;
use serde_json::Value;

/// Quote identifier for PostgreSQL (safe: only from the registry).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn qualified_table(table: &ResolvedTable) -> String {
    format!("{}.{}", quoted(&table.schema_name), quoted(&table.db_name))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: PgBindValue) -> u32 {
        self.params.push(v);
        self.params.len() as u32
    }

    /// Bind `v` for `field` and return its cast placeholder, e.g. `$3::int4`.
    fn bind(&mut self, field: &FieldInfo, v: &Value) -> Result<String, AppError> {
        let n = self.push_param(PgBindValue::from_json(field, v)?);
        Ok(format!("${}::{}", n, field.cast()))
    }

    fn bind_text(&mut self, s: String) -> String {
        let n = self.push_param(PgBindValue::Text(s));
        format!("${}::text", n)
    }
}

fn field<'t>(table: &'t ResolvedTable, name: &str) -> Result<&'t FieldInfo, AppError> {
    table
        .field(name)
        .ok_or_else(|| AppError::BadRequest(format!("unknown field '{}' on {}", name, table.model)))
}

/// Output columns under their field names: `"db" AS "name"`. `None` selects every field.
fn column_list(table: &ResolvedTable, select: Option<&[String]>) -> String {
    table
        .fields
        .iter()
        .filter(|f| select.map_or(true, |s| s.contains(&f.name)))
        .map(|f| format!("{} AS {}", quoted(&f.db_name), quoted(&f.name)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn like_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

/// Render a filter tree to a boolean SQL expression, binding every value.
pub fn render_condition(table: &ResolvedTable, cond: &Condition, q: &mut QueryBuf) -> Result<String, AppError> {
    Ok(match cond {
        Condition::And(parts) if parts.is_empty() => "TRUE".to_string(),
        Condition::Or(parts) if parts.is_empty() => "FALSE".to_string(),
        Condition::And(parts) | Condition::Or(parts) => {
            let sep = if matches!(cond, Condition::And(_)) { " AND " } else { " OR " };
            let rendered = parts
                .iter()
                .map(|p| render_condition(table, p, q))
                .collect::<Result<Vec<_>, _>>()?;
            format!("({})", rendered.join(sep))
        }
        Condition::Not(inner) => format!("NOT ({})", render_condition(table, inner, q)?),
        Condition::Field {
            field: name,
            op,
            insensitive,
        } => {
            let f = field(table, name)?;
            let col = quoted(&f.db_name);
            let like = if *insensitive { "ILIKE" } else { "LIKE" };
            // json has no equality operator; compare as jsonb
            let as_jsonb = !f.is_list && f.native_type.eq_ignore_ascii_case("json");
            let eq_col = if as_jsonb { format!("{}::jsonb", col) } else { col.clone() };
            let eq_bind = |q: &mut QueryBuf, v: &Value| -> Result<String, AppError> {
                let ph = q.bind(f, v)?;
                Ok(if as_jsonb { format!("{}::jsonb", ph) } else { ph })
            };
            match op {
                FieldOp::Equals(Value::Null) => format!("{} IS NULL", col),
                FieldOp::Not(Value::Null) => format!("{} IS NOT NULL", col),
                FieldOp::Equals(Value::String(s)) if *insensitive => {
                    format!("{}::text ILIKE {}", col, q.bind_text(like_escape(s)))
                }
                FieldOp::Equals(v) => format!("{} = {}", eq_col, eq_bind(q, v)?),
                FieldOp::Not(v) => format!("{} <> {}", eq_col, eq_bind(q, v)?),
                FieldOp::In(vs) | FieldOp::NotIn(vs) => {
                    let negated = matches!(op, FieldOp::NotIn(_));
                    if vs.is_empty() {
                        return Ok(if negated { "TRUE" } else { "FALSE" }.to_string());
                    }
                    let phs = vs.iter().map(|v| eq_bind(q, v)).collect::<Result<Vec<_>, _>>()?;
                    let kw = if negated { "NOT IN" } else { "IN" };
                    format!("{} {} ({})", eq_col, kw, phs.join(", "))
                }
                FieldOp::Lt(v) => format!("{} < {}", col, q.bind(f, v)?),
                FieldOp::Lte(v) => format!("{} <= {}", col, q.bind(f, v)?),
                FieldOp::Gt(v) => format!("{} > {}", col, q.bind(f, v)?),
                FieldOp::Gte(v) => format!("{} >= {}", col, q.bind(f, v)?),
                FieldOp::Contains(s) => {
                    format!("{}::text {} {}", col, like, q.bind_text(format!("%{}%", like_escape(s))))
                }
                FieldOp::StartsWith(s) => {
                    format!("{}::text {} {}", col, like, q.bind_text(format!("{}%", like_escape(s))))
                }
                FieldOp::EndsWith(s) => {
                    format!("{}::text {} {}", col, like, q.bind_text(format!("%{}", like_escape(s))))
                }
            }
        }
    })
}

fn where_clause(table: &ResolvedTable, cond: Option<&Condition>, q: &mut QueryBuf) -> Result<String, AppError> {
    match cond {
        None => Ok(String::new()),
        Some(c) => Ok(format!(" WHERE {}", render_condition(table, c, q)?)),
    }
}

/// ORDER BY from arguments, else by id fields so paging is stable.
fn order_clause(table: &ResolvedTable, order_by: &[(String, SortOrder)]) -> Result<String, AppError> {
    let parts: Vec<String> = if order_by.is_empty() {
        table
            .fields
            .iter()
            .filter(|f| f.is_id)
            .map(|f| quoted(&f.db_name))
            .collect()
    } else {
        order_by
            .iter()
            .map(|(name, dir)| -> Result<String, AppError> {
                let f = field(table, name)?;
                let dir = match dir {
                    SortOrder::Asc => "ASC",
                    SortOrder::Desc => "DESC",
                };
                Ok(format!("{} {}", quoted(&f.db_name), dir))
            })
            .collect::<Result<_, _>>()?
    };
    if parts.is_empty() {
        Ok(String::new())
    } else {
        Ok(format!(" ORDER BY {}", parts.join(", ")))
    }
}

/// SELECT rows as JSON. `take` overrides the argument's `take` (e.g. 1 for findFirst).
pub fn select(table: &ResolvedTable, args: &FindArgs, take: Option<u64>) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(table, args.filter.as_ref(), &mut q)?;
    let order_sql = order_clause(table, &args.order_by)?;
    let limit_sql = take.or(args.take).map(|n| format!(" LIMIT {}", n)).unwrap_or_default();
    let offset_sql = args.skip.map(|n| format!(" OFFSET {}", n)).unwrap_or_default();
    q.sql = format!(
        "SELECT row_to_json(r) FROM (SELECT {} FROM {}{}{}{}{}) r",
        column_list(table, args.select.as_deref()),
        qualified_table(table),
        where_sql,
        order_sql,
        limit_sql,
        offset_sql
    );
    Ok(q)
}

/// INSERT ... VALUES for one or more rows. Columns missing from a row use DEFAULT;
/// `updatedAt` fields not given are set to NOW().
fn insert_statement(table: &ResolvedTable, rows: &[Vec<(String, Value)>], q: &mut QueryBuf) -> Result<String, AppError> {
    let mut columns: Vec<&FieldInfo> = table
        .fields
        .iter()
        .filter(|f| f.is_updated_at || rows.iter().any(|r| r.iter().any(|(n, _)| *n == f.name)))
        .collect();
    if columns.is_empty() {
        // VALUES needs at least one column; let the first writable one take its default.
        let first = table
            .fields
            .iter()
            .find(|f| !f.is_generated)
            .ok_or_else(|| AppError::BadRequest(format!("{} has no writable fields", table.model)))?;
        columns.push(first);
    }

    let mut tuples = Vec::with_capacity(rows.len());
    for row in rows {
        let mut values = Vec::with_capacity(columns.len());
        for c in &columns {
            match row.iter().find(|(n, _)| *n == c.name) {
                Some((_, v)) => values.push(q.bind(c, v)?),
                None if c.is_updated_at => values.push("NOW()".to_string()),
                None => values.push("DEFAULT".to_string()),
            }
        }
        tuples.push(format!("({})", values.join(", ")));
    }

    Ok(format!(
        "INSERT INTO {} ({}) VALUES {}",
        qualified_table(table),
        columns.iter().map(|c| quoted(&c.db_name)).collect::<Vec<_>>().join(", "),
        tuples.join(", ")
    ))
}

/// INSERT one row, returning it as JSON.
pub fn insert(table: &ResolvedTable, data: &[(String, Value)], select: Option<&[String]>) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let rows = [data.to_vec()];
    let stmt = insert_statement(table, &rows, &mut q)?;
    q.sql = format!(
        "WITH r AS ({} RETURNING {}) SELECT row_to_json(r) FROM r",
        stmt,
        column_list(table, select)
    );
    Ok(q)
}

/// INSERT many rows in one statement, returning the number inserted.
pub fn insert_many(table: &ResolvedTable, rows: &[Vec<(String, Value)>], skip_duplicates: bool) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let stmt = insert_statement(table, rows, &mut q)?;
    let conflict = if skip_duplicates { " ON CONFLICT DO NOTHING" } else { "" };
    q.sql = format!("WITH r AS ({}{} RETURNING 1) SELECT count(*) FROM r", stmt, conflict);
    Ok(q)
}

fn set_clause(table: &ResolvedTable, data: &[(String, DataOp)], q: &mut QueryBuf) -> Result<Vec<String>, AppError> {
    let mut sets = Vec::with_capacity(data.len() + 1);
    for (name, op) in data {
        let f = field(table, name)?;
        let col = quoted(&f.db_name);
        let rhs = match op {
            DataOp::Set(v) => q.bind(f, v)?,
            DataOp::Increment(v) => format!("{} + {}", col, q.bind(f, v)?),
            DataOp::Decrement(v) => format!("{} - {}", col, q.bind(f, v)?),
            DataOp::Multiply(v) => format!("{} * {}", col, q.bind(f, v)?),
            DataOp::Divide(v) => format!("{} / {}", col, q.bind(f, v)?),
        };
        sets.push(format!("{} = {}", col, rhs));
    }
    if !sets.is_empty() {
        for f in table.fields.iter().filter(|f| f.is_updated_at) {
            if !data.iter().any(|(n, _)| *n == f.name) {
                sets.push(format!("{} = NOW()", quoted(&f.db_name)));
            }
        }
    }
    Ok(sets)
}

/// `ctid` of the first row matching `filter`, locked for the enclosing write.
fn single_row(table: &ResolvedTable, filter: &Condition, q: &mut QueryBuf) -> Result<String, AppError> {
    Ok(format!(
        "ctid = (SELECT ctid FROM {} WHERE {} LIMIT 1 FOR UPDATE)",
        qualified_table(table),
        render_condition(table, filter, q)?
    ))
}

/// UPDATE the single row matching `filter`, returning it. Empty data just reads the row.
pub fn update_one(
    table: &ResolvedTable,
    filter: &Condition,
    data: &[(String, DataOp)],
    select: Option<&[String]>,
) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let sets = set_clause(table, data, &mut q)?;
    if sets.is_empty() {
        let where_sql = render_condition(table, filter, &mut q)?;
        q.sql = format!(
            "SELECT row_to_json(r) FROM (SELECT {} FROM {} WHERE {} LIMIT 1) r",
            column_list(table, select),
            qualified_table(table),
            where_sql
        );
        return Ok(q);
    }
    let target = single_row(table, filter, &mut q)?;
    q.sql = format!(
        "WITH r AS (UPDATE {} SET {} WHERE {} RETURNING {}) SELECT row_to_json(r) FROM r",
        qualified_table(table),
        sets.join(", "),
        target,
        column_list(table, select)
    );
    Ok(q)
}

/// UPDATE every row matching `filter`, returning the count.
pub fn update_many(table: &ResolvedTable, filter: Option<&Condition>, data: &[(String, DataOp)]) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let sets = set_clause(table, data, &mut q)?;
    let where_sql = where_clause(table, filter, &mut q)?;
    q.sql = if sets.is_empty() {
        format!("SELECT count(*) FROM {}{}", qualified_table(table), where_sql)
    } else {
        format!(
            "WITH r AS (UPDATE {} SET {}{} RETURNING 1) SELECT count(*) FROM r",
            qualified_table(table),
            sets.join(", "),
            where_sql
        )
    };
    Ok(q)
}

/// DELETE the single row matching `filter`, returning it.
pub fn delete_one(table: &ResolvedTable, filter: &Condition, select: Option<&[String]>) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let target = single_row(table, filter, &mut q)?;
    q.sql = format!(
        "WITH r AS (DELETE FROM {} WHERE {} RETURNING {}) SELECT row_to_json(r) FROM r",
        qualified_table(table),
        target,
        column_list(table, select)
    );
    Ok(q)
}

/// DELETE every row matching `filter`, returning the count.
pub fn delete_many(table: &ResolvedTable, filter: Option<&Condition>) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(table, filter, &mut q)?;
    q.sql = format!(
        "WITH r AS (DELETE FROM {}{} RETURNING 1) SELECT count(*) FROM r",
        qualified_table(table),
        where_sql
    );
    Ok(q)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::service::args::tests::user_table;
    use crate::service::ActionArgs;
    use serde_json::json;

    const USER: &str = "\"public\".\"User\"";
    const ALL_COLS: &str = "\"id\" AS \"id\", \"email\" AS \"email\", \"name\" AS \"name\", \"age\" AS \"age\", \
                            \"orgId\" AS \"orgId\", \"meta\" AS \"meta\", \"updatedAt\" AS \"updatedAt\", \"search\" AS \"search\"";

    fn args(action: Action, body: Value) -> ActionArgs {
        ActionArgs::parse(&user_table(), action, &body).unwrap()
    }

    fn text(params: &[PgBindValue]) -> Vec<Option<&str>> {
        params
            .iter()
            .map(|p| match p {
                PgBindValue::Null => None,
                PgBindValue::Text(s) => Some(s.as_str()),
            })
            .collect()
    }

    #[test]
    fn select_with_filter_order_and_paging() {
        let ActionArgs::FindMany(a) = args(
            Action::FindMany,
            json!({
                "where": { "age": { "gte": 18 }, "name": { "startsWith": "a_b", "mode": "insensitive" } },
                "select": { "id": true, "name": true },
                "orderBy": { "age": "desc" },
                "take": 10,
                "skip": 20
            }),
        ) else {
            panic!("expected findMany")
        };
        let q = select(&user_table(), &a, None).unwrap();
        assert_eq!(
            q.sql,
            format!(
                "SELECT row_to_json(r) FROM (SELECT \"id\" AS \"id\", \"name\" AS \"name\" FROM {} \
                 WHERE (\"age\" >= $1::int4 AND \"name\"::text ILIKE $2::text) ORDER BY \"age\" DESC LIMIT 10 OFFSET 20) r",
                USER
            )
        );
        assert_eq!(text(&q.params), vec![Some("18"), Some("a\\_b%")]);
    }

    #[test]
    fn select_defaults_to_id_order() {
        let q = select(&user_table(), &FindArgs::default(), Some(1)).unwrap();
        assert_eq!(
            q.sql,
            format!("SELECT row_to_json(r) FROM (SELECT {} FROM {} ORDER BY \"id\" LIMIT 1) r", ALL_COLS, USER)
        );
        assert!(q.params.is_empty());
    }

    #[test]
    fn null_and_set_filters() {
        let ActionArgs::FindMany(a) = args(
            Action::FindMany,
            json!({ "where": { "OR": [{ "name": null }, { "age": { "in": [1, 2] } }, { "orgId": { "notIn": [] } }] } }),
        ) else {
            panic!("expected findMany")
        };
        let mut q = QueryBuf::new();
        let sql = render_condition(&user_table(), a.filter.as_ref().unwrap(), &mut q).unwrap();
        assert_eq!(sql, "(\"name\" IS NULL OR \"age\" IN ($1::int4, $2::int4) OR TRUE)");
        assert_eq!(text(&q.params), vec![Some("1"), Some("2")]);
    }

    #[test]
    fn bad_values_fail_before_sql() {
        let ActionArgs::FindMany(a) = args(Action::FindMany, json!({ "where": { "age": "old" } })) else {
            panic!("expected findMany")
        };
        assert!(matches!(select(&user_table(), &a, None), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn insert_returns_row_and_stamps_updated_at() {
        let ActionArgs::Create(c) = args(Action::Create, json!({ "data": { "email": "a@b.c", "age": 3 } })) else {
            panic!("expected create")
        };
        let q = insert(&user_table(), &c.data, None).unwrap();
        assert_eq!(
            q.sql,
            format!(
                "WITH r AS (INSERT INTO {} (\"email\", \"age\", \"updatedAt\") VALUES ($1::text, $2::int4, NOW()) \
                 RETURNING {}) SELECT row_to_json(r) FROM r",
                USER, ALL_COLS
            )
        );
        assert_eq!(text(&q.params), vec![Some("a@b.c"), Some("3")]);
    }

    #[test]
    fn insert_many_fills_gaps_with_default() {
        let ActionArgs::CreateMany(c) = args(
            Action::CreateMany,
            json!({ "data": [{ "email": "a@b.c" }, { "email": "d@e.f", "name": "d" }], "skipDuplicates": true }),
        ) else {
            panic!("expected createMany")
        };
        let q = insert_many(&user_table(), &c.data, c.skip_duplicates).unwrap();
        assert_eq!(
            q.sql,
            format!(
                "WITH r AS (INSERT INTO {} (\"email\", \"name\", \"updatedAt\") VALUES ($1::text, DEFAULT, NOW()), \
                 ($2::text, $3::text, NOW()) ON CONFLICT DO NOTHING RETURNING 1) SELECT count(*) FROM r",
                USER
            )
        );
    }

    #[test]
    fn update_one_targets_a_single_locked_row() {
        let ActionArgs::Update(u) = args(
            Action::Update,
            json!({ "where": { "id": 7 }, "data": { "age": { "increment": 1 } }, "select": { "age": true } }),
        ) else {
            panic!("expected update")
        };
        let q = update_one(&user_table(), &u.filter, &u.data, u.select.as_deref()).unwrap();
        assert_eq!(
            q.sql,
            format!(
                "WITH r AS (UPDATE {0} SET \"age\" = \"age\" + $1::int4, \"updatedAt\" = NOW() \
                 WHERE ctid = (SELECT ctid FROM {0} WHERE \"id\" = $2::int4 LIMIT 1 FOR UPDATE) \
                 RETURNING \"age\" AS \"age\") SELECT row_to_json(r) FROM r",
                USER
            )
        );
        assert_eq!(text(&q.params), vec![Some("1"), Some("7")]);
    }

    #[test]
    fn update_many_and_delete_many_count_rows() {
        let ActionArgs::UpdateMany(u) = args(Action::UpdateMany, json!({ "where": { "age": { "lt": 18 } }, "data": { "name": null } }))
        else {
            panic!("expected updateMany")
        };
        let q = update_many(&user_table(), u.filter.as_ref(), &u.data).unwrap();
        assert_eq!(
            q.sql,
            format!(
                "WITH r AS (UPDATE {} SET \"name\" = $1::text, \"updatedAt\" = NOW() WHERE \"age\" < $2::int4 RETURNING 1) \
                 SELECT count(*) FROM r",
                USER
            )
        );
        assert_eq!(text(&q.params), vec![None, Some("18")]);

        let q = delete_many(&user_table(), None).unwrap();
        assert_eq!(q.sql, format!("WITH r AS (DELETE FROM {} RETURNING 1) SELECT count(*) FROM r", USER));
    }

    #[test]
    fn delete_one_by_unique_email() {
        let ActionArgs::Delete(d) = args(Action::Delete, json!({ "where": { "email": "a@b.c" } })) else {
            panic!("expected delete")
        };
        let q = delete_one(&user_table(), &d.filter, None).unwrap();
        assert!(q.sql.starts_with(&format!("WITH r AS (DELETE FROM {} WHERE ctid = (SELECT ctid FROM {} WHERE \"email\" = $1::text", USER, USER)));
        assert_eq!(text(&q.params), vec![Some("a@b.c")]);
    }

    #[test]
    fn like_patterns_are_escaped() {
        assert_eq!(like_escape("50%_off\\"), "50\\%\\_off\\\\");
    }

    #[test]
    fn not_list_negates_each_condition() {
        let ActionArgs::FindMany(a) = args(
            Action::FindMany,
            json!({ "where": { "NOT": [{ "name": "a" }, { "name": "b" }] } }),
        ) else {
            panic!("expected findMany")
        };
        let mut q = QueryBuf::new();
        let sql = render_condition(&user_table(), a.filter.as_ref().unwrap(), &mut q).unwrap();
        assert_eq!(sql, "(NOT (\"name\" = $1::text) AND NOT (\"name\" = $2::text))");
        assert_eq!(text(&q.params), vec![Some("a"), Some("b")]);

        let ActionArgs::FindMany(a) = args(Action::FindMany, json!({ "where": { "NOT": { "name": "a", "age": 3 } } })) else {
            panic!("expected findMany")
        };
        let mut q = QueryBuf::new();
        let sql = render_condition(&user_table(), a.filter.as_ref().unwrap(), &mut q).unwrap();
        assert_eq!(sql, "NOT ((\"age\" = $1::int4 AND \"name\" = $2::text))");
    }

    #[test]
    fn json_columns_compare_as_jsonb() {
        let mut table = user_table();
        let meta = table.fields.iter_mut().find(|f| f.name == "meta").unwrap();
        meta.native_type = "json".into();

        let ActionArgs::FindMany(a) = ActionArgs::parse(
            &table,
            Action::FindMany,
            &json!({ "where": { "meta": { "equals": { "k": 1 } } } }),
        )
        .unwrap() else {
            panic!("expected findMany")
        };
        let mut q = QueryBuf::new();
        let sql = render_condition(&table, a.filter.as_ref().unwrap(), &mut q).unwrap();
        assert_eq!(sql, "\"meta\"::jsonb = $1::json::jsonb");
    }
}
