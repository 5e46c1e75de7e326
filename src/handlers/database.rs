//! Schema introspection handlers: table list and per-table field descriptors.

use crate::config::FieldInfo;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};

pub async fn list_tables(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.schema.tables().into_iter().map(String::from).collect())
}

pub async fn table_fields(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<Json<Vec<FieldInfo>>, AppError> {
    let resolved = state
        .schema
        .table(&table)
        .ok_or_else(|| AppError::UnknownTable(table.clone()))?;
    Ok(Json(resolved.exposed_fields().into_iter().cloned().collect()))
}
