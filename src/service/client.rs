//! Execution client: runs one table action against the data store.

use crate::action::Action;
use crate::config::ResolvedTable;
use crate::error::AppError;
use crate::service::ActionArgs;
use crate::sql::{delete_many, delete_one, insert, insert_many, select, update_many, update_one, QueryBuf};
use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::{PgConnection, PgPool};

/// One generic call per table action. The body arrives exactly as the client sent it.
#[async_trait]
pub trait ExecutionClient: Send + Sync {
    async fn invoke(&self, table: &ResolvedTable, action: Action, body: Value) -> Result<Value, AppError>;

    /// Round-trip to the store for readiness checks.
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// PostgreSQL execution over a shared pool; each call checks out one connection for its duration.
#[derive(Clone)]
pub struct PgExecutionClient {
    pool: PgPool,
}

impl PgExecutionClient {
    pub fn new(pool: PgPool) -> Self {
        PgExecutionClient { pool }
    }
}

#[async_trait]
impl ExecutionClient for PgExecutionClient {
    async fn invoke(&self, table: &ResolvedTable, action: Action, body: Value) -> Result<Value, AppError> {
        let args = ActionArgs::parse(table, action, &body)?;
        let mut conn = self.pool.acquire().await?;
        let conn: &mut PgConnection = &mut conn;

        match args {
            ActionArgs::FindUnique(a) | ActionArgs::FindFirst(a) => {
                let q = select(table, &a, Some(1))?;
                Ok(fetch_optional(conn, &q).await?.unwrap_or(Value::Null))
            }
            ActionArgs::FindMany(a) => {
                let q = select(table, &a, None)?;
                Ok(Value::Array(fetch_all(conn, &q).await?))
            }
            ActionArgs::Create(a) => {
                let q = insert(table, &a.data, a.select.as_deref())?;
                fetch_optional(conn, &q)
                    .await?
                    .ok_or_else(|| AppError::Execution(format!("insert into {} returned no row", table.model)))
            }
            ActionArgs::CreateMany(a) => {
                if a.data.is_empty() {
                    return Ok(json!({ "count": 0 }));
                }
                let q = insert_many(table, &a.data, a.skip_duplicates)?;
                Ok(json!({ "count": fetch_count(conn, &q).await? }))
            }
            ActionArgs::Update(a) => {
                let q = update_one(table, &a.filter, &a.data, a.select.as_deref())?;
                fetch_optional(conn, &q)
                    .await?
                    .ok_or_else(|| AppError::RecordNotFound(format!("no {} record matches the update filter", table.model)))
            }
            ActionArgs::UpdateMany(a) => {
                let q = update_many(table, a.filter.as_ref(), &a.data)?;
                Ok(json!({ "count": fetch_count(conn, &q).await? }))
            }
            ActionArgs::Delete(a) => {
                let q = delete_one(table, &a.filter, a.select.as_deref())?;
                fetch_optional(conn, &q)
                    .await?
                    .ok_or_else(|| AppError::RecordNotFound(format!("no {} record matches the delete filter", table.model)))
            }
            ActionArgs::DeleteMany(a) => {
                let q = delete_many(table, a.filter.as_ref())?;
                Ok(json!({ "count": fetch_count(conn, &q).await? }))
            }
        }
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn query_json(q: &QueryBuf) -> sqlx::query::QueryScalar<'_, sqlx::Postgres, Value, sqlx::postgres::PgArguments> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let mut query = sqlx::query_scalar::<_, Value>(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    query
}

async fn fetch_optional(conn: &mut PgConnection, q: &QueryBuf) -> Result<Option<Value>, AppError> {
    Ok(query_json(q).fetch_optional(conn).await?)
}

async fn fetch_all(conn: &mut PgConnection, q: &QueryBuf) -> Result<Vec<Value>, AppError> {
    Ok(query_json(q).fetch_all(conn).await?)
}

async fn fetch_count(conn: &mut PgConnection, q: &QueryBuf) -> Result<i64, AppError> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let mut query = sqlx::query_scalar::<_, i64>(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    Ok(query.fetch_one(conn).await?)
}
