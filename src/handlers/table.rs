//! Generic table action handler: /{table}/{action}[/{target}] for any method.

use crate::error::AppError;
use crate::service::{dispatch, DispatchRequest};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::Method,
    response::IntoResponse,
    Json,
};

async fn run(
    state: &AppState,
    method: Method,
    table: &str,
    action: &str,
    target: Option<&str>,
    body: &[u8],
) -> Result<impl IntoResponse, AppError> {
    let req = DispatchRequest {
        method,
        table,
        action,
        target,
    };
    let (status, value) = dispatch(&state.schema, state.client.as_ref(), req, body, state.require_target).await?;
    Ok((status, Json(value)))
}

pub async fn table_action(
    State(state): State<AppState>,
    method: Method,
    Path((table, action)): Path<(String, String)>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    run(&state, method, &table, &action, None, &body).await
}

pub async fn table_action_target(
    State(state): State<AppState>,
    method: Method,
    Path((table, action, target)): Path<(String, String, String)>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    run(&state, method, &table, &action, Some(&target), &body).await
}
