//! Table actions and their HTTP contract: required method and success status.

use axum::http::{Method, StatusCode};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    FindUnique,
    FindFirst,
    FindMany,
    Create,
    CreateMany,
    Update,
    UpdateMany,
    Delete,
    DeleteMany,
    Upsert,
    Aggregate,
    GroupBy,
}

/// Operations a model supports unless it is read-only or declares its own list.
pub const ALL_ACTIONS: [Action; 12] = [
    Action::FindUnique,
    Action::FindFirst,
    Action::FindMany,
    Action::Create,
    Action::CreateMany,
    Action::Update,
    Action::UpdateMany,
    Action::Delete,
    Action::DeleteMany,
    Action::Upsert,
    Action::Aggregate,
    Action::GroupBy,
];

/// Operations exposed for views and other read-only relations.
pub const READ_ONLY_ACTIONS: [Action; 5] = [
    Action::FindUnique,
    Action::FindFirst,
    Action::FindMany,
    Action::Aggregate,
    Action::GroupBy,
];

/// Raw SQL/command operations. Never part of a table's operation set.
pub const RAW_OPERATIONS: &[&str] = &["queryRaw", "executeRaw", "findRaw", "aggregateRaw", "runCommandRaw"];

impl Action {
    pub fn parse(name: &str) -> Option<Action> {
        ALL_ACTIONS.iter().copied().find(|a| a.as_str() == name)
    }

    pub fn is_raw(name: &str) -> bool {
        RAW_OPERATIONS.contains(&name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::FindUnique => "findUnique",
            Action::FindFirst => "findFirst",
            Action::FindMany => "findMany",
            Action::Create => "create",
            Action::CreateMany => "createMany",
            Action::Update => "update",
            Action::UpdateMany => "updateMany",
            Action::Delete => "delete",
            Action::DeleteMany => "deleteMany",
            Action::Upsert => "upsert",
            Action::Aggregate => "aggregate",
            Action::GroupBy => "groupBy",
        }
    }

    /// HTTP method a request must use. `None` for recognized actions that are not wired.
    pub fn required_method(&self) -> Option<Method> {
        match self {
            Action::FindUnique | Action::FindFirst | Action::FindMany | Action::Create | Action::CreateMany => {
                Some(Method::POST)
            }
            Action::Update | Action::UpdateMany => Some(Method::PUT),
            Action::Delete | Action::DeleteMany => Some(Method::DELETE),
            Action::Upsert | Action::Aggregate | Action::GroupBy => None,
        }
    }

    /// Creates answer 201; everything else that returns a result answers 200.
    pub fn success_status(&self) -> StatusCode {
        match self {
            Action::Create | Action::CreateMany => StatusCode::CREATED,
            _ => StatusCode::OK,
        }
    }

    /// Actions addressing one record. These may require a target path segment.
    pub fn is_single_record(&self) -> bool {
        matches!(
            self,
            Action::FindUnique | Action::FindFirst | Action::Update | Action::Delete
        )
    }

    pub fn is_write(&self) -> bool {
        !matches!(
            self,
            Action::FindUnique | Action::FindFirst | Action::FindMany | Action::Aggregate | Action::GroupBy
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
