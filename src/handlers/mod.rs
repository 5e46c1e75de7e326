//! HTTP handlers for table actions and schema introspection.

pub mod database;
pub mod table;
pub use database::*;
pub use table::*;
