#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use table_bridge::{app, resolve, Action, AppError, AppState, ExecutionClient, SchemaConfig, Settings};
use table_bridge::config::ResolvedTable;
use tower::ServiceExt;

/// Records every call and answers with a fixed reply.
pub struct RecordingClient {
    pub calls: Mutex<Vec<(String, Action, Value)>>,
    reply: Result<Value, String>,
}

impl RecordingClient {
    pub fn replying(value: Value) -> Arc<Self> {
        Arc::new(RecordingClient {
            calls: Mutex::new(Vec::new()),
            reply: Ok(value),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(RecordingClient {
            calls: Mutex::new(Vec::new()),
            reply: Err(message.to_string()),
        })
    }

    pub fn calls(&self) -> Vec<(String, Action, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExecutionClient for RecordingClient {
    async fn invoke(&self, table: &ResolvedTable, action: Action, body: Value) -> Result<Value, AppError> {
        self.calls.lock().unwrap().push((table.key.clone(), action, body));
        match &self.reply {
            Ok(v) => Ok(v.clone()),
            Err(m) => Err(AppError::Execution(m.clone())),
        }
    }
}

pub fn schema() -> SchemaConfig {
    serde_json::from_value(json!({
        "models": [
            {
                "name": "User",
                "fields": [
                    { "name": "id", "type": "Int", "is_id": true, "has_default_value": true },
                    { "name": "email", "type": "String", "is_unique": true },
                    { "name": "name", "type": "String", "is_required": false },
                    { "name": "search", "type": "String", "is_generated": true, "is_required": false }
                ]
            },
            {
                "name": "BlogPost",
                "fields": [
                    { "name": "id", "type": "String", "native_type": "uuid", "is_id": true },
                    { "name": "title", "type": "String" }
                ],
                "operations": ["findMany", "findUnique"]
            },
            {
                "name": "ActiveUser",
                "fields": [{ "name": "id", "type": "Int", "is_id": true }],
                "read_only": true
            }
        ]
    }))
    .unwrap()
}

pub fn router(client: Arc<RecordingClient>, require_target: bool) -> Router {
    router_with(client, require_target, &Settings::default())
}

pub fn router_with(client: Arc<RecordingClient>, require_target: bool, settings: &Settings) -> Router {
    let registry = resolve(&schema(), "public").unwrap();
    let state = AppState::new(registry, client).with_require_target(require_target);
    app(state, settings)
}

pub async fn send(router: Router, method: Method, uri: &str, body: &str) -> (StatusCode, Vec<u8>) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, bytes)
}

pub async fn send_json(router: Router, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
    let (status, bytes) = send(router, method, uri, body).await;
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}
