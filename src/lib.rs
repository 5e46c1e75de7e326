//! Table bridge: exposes a Prisma-style table/action API over PostgreSQL.
//!
//! Requests to `/{table}/{action}[/{target}]` are validated against a schema registry
//! (declared file or introspected) and executed through an [`ExecutionClient`].

pub mod action;
pub mod case;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;

pub use action::Action;
pub use config::{
    introspect, load_from_path, resolve, SchemaConfig, SchemaRegistry, SchemaSource, Settings,
};
pub use error::{AppError, ConfigError};
pub use routes::{app, bridge_routes, common_routes};
pub use service::{ExecutionClient, PgExecutionClient};
pub use state::AppState;
