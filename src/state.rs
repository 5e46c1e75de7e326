//! Shared application state for all routes. The schema registry is fixed at startup.

use crate::config::SchemaRegistry;
use crate::service::ExecutionClient;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub schema: Arc<SchemaRegistry>,
    pub client: Arc<dyn ExecutionClient>,
    pub require_target: bool,
}

impl AppState {
    pub fn new(schema: SchemaRegistry, client: Arc<dyn ExecutionClient>) -> Self {
        AppState {
            schema: Arc::new(schema),
            client,
            require_target: false,
        }
    }

    pub fn with_require_target(mut self, require_target: bool) -> Self {
        self.require_target = require_target;
        self
    }
}
