//! Bridge routes: schema introspection and generic table dispatch.
//! The literal `database` segment wins over a table of that name.

use crate::handlers::{list_tables, table_action, table_action_target, table_fields};
use crate::state::AppState;
use axum::{routing::any, routing::get, Router};

pub fn bridge_routes(state: AppState) -> Router {
    Router::new()
        .route("/database/tables", get(list_tables))
        .route("/database/:table/field", get(table_fields))
        .route("/:table/:action", any(table_action))
        .route("/:table/:action/:target", any(table_action_target))
        .with_state(state)
}
