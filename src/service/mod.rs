//! Table action service: typed arguments, execution client, dispatch.

pub mod args;
mod client;
mod dispatch;

pub use args::{
    is_unique_filter, ActionArgs, Condition, CreateArgs, CreateManyArgs, DataOp, DeleteArgs, DeleteManyArgs, FieldOp,
    FindArgs, SortOrder, UpdateArgs, UpdateManyArgs,
};
pub use client::{ExecutionClient, PgExecutionClient};
pub use dispatch::{dispatch, parse_body, resolve_route, DispatchRequest, Route};
