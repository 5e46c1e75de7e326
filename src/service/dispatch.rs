//! Request dispatch: resolves table, action, target and method, then makes one execution call.

use crate::action::Action;
use crate::config::{ResolvedTable, SchemaRegistry};
use crate::error::AppError;
use crate::service::ExecutionClient;
use axum::http::{Method, StatusCode};
use serde_json::Value;

/// Path segments of a bridge request, as received.
#[derive(Debug, Clone)]
pub struct DispatchRequest<'a> {
    pub method: Method,
    pub table: &'a str,
    pub action: &'a str,
    pub target: Option<&'a str>,
}

/// Resolved route. Only produced once every routing rule has passed.
#[derive(Debug)]
pub struct Route<'r> {
    pub table: &'r ResolvedTable,
    pub action: Action,
}

/// Applies the routing rules in order: table, action, target, method.
pub fn resolve_route<'r>(
    registry: &'r SchemaRegistry,
    req: &DispatchRequest<'_>,
    require_target: bool,
) -> Result<Route<'r>, AppError> {
    let table = registry
        .table(req.table)
        .ok_or_else(|| AppError::UnknownTable(req.table.to_string()))?;

    let action = Action::parse(req.action)
        .filter(|a| table.supports(*a))
        .ok_or_else(|| AppError::UnknownAction {
            table: req.table.to_string(),
            action: req.action.to_string(),
        })?;

    if require_target && action.is_single_record() && req.target.map_or(true, str::is_empty) {
        return Err(AppError::MissingTarget(action.to_string()));
    }

    match action.required_method() {
        Some(expected) if expected == req.method => Ok(Route { table, action }),
        Some(expected) => Err(AppError::MethodMismatch {
            action: action.to_string(),
            expected,
            got: req.method.clone(),
        }),
        None => Err(AppError::MethodMismatch {
            action: action.to_string(),
            expected: Method::POST,
            got: req.method.clone(),
        }),
    }
}

/// Empty or whitespace-only bodies count as no arguments.
pub fn parse_body(raw: &[u8]) -> Result<Value, AppError> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(raw).map_err(|e| AppError::BadRequest(format!("invalid JSON body: {}", e)))
}

/// Full dispatch: route, parse body, one client call. The body reaches the client unmodified.
pub async fn dispatch(
    registry: &SchemaRegistry,
    client: &dyn ExecutionClient,
    req: DispatchRequest<'_>,
    raw_body: &[u8],
    require_target: bool,
) -> Result<(StatusCode, Value), AppError> {
    let route = match resolve_route(registry, &req, require_target) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(
                method = %req.method,
                table = req.table,
                action = req.action,
                path_target = ?req.target,
                reason = %e,
                "request rejected"
            );
            return Err(e);
        }
    };
    let body = parse_body(raw_body)?;

    tracing::debug!(
        table = %route.table.key,
        action = %route.action,
        path_target = ?req.target,
        "dispatching"
    );
    let value = client.invoke(route.table, route.action, body).await?;
    Ok((route.action.success_status(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve, SchemaConfig};
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        let config: SchemaConfig = serde_json::from_value(json!({
            "models": [
                { "name": "User", "fields": [{ "name": "id", "type": "Int", "is_id": true }] },
                { "name": "AuditLog", "fields": [{ "name": "id", "type": "Int", "is_id": true }], "read_only": true }
            ]
        }))
        .unwrap();
        resolve(&config, "public").unwrap()
    }

    fn req<'a>(method: Method, table: &'a str, action: &'a str, target: Option<&'a str>) -> DispatchRequest<'a> {
        DispatchRequest {
            method,
            table,
            action,
            target,
        }
    }

    #[test]
    fn resolves_supported_action() {
        let reg = registry();
        let route = resolve_route(&reg, &req(Method::POST, "user", "create", None), false).unwrap();
        assert_eq!(route.table.model, "User");
        assert_eq!(route.action, Action::Create);
    }

    #[test]
    fn table_and_action_lookups_fail_with_not_found() {
        let reg = registry();
        let err = resolve_route(&reg, &req(Method::POST, "ghost", "create", None), false).unwrap_err();
        assert!(matches!(err, AppError::UnknownTable(_)));

        // keys are case sensitive
        let err = resolve_route(&reg, &req(Method::POST, "User", "create", None), false).unwrap_err();
        assert!(matches!(err, AppError::UnknownTable(_)));

        let err = resolve_route(&reg, &req(Method::POST, "user", "explode", None), false).unwrap_err();
        assert!(matches!(err, AppError::UnknownAction { .. }));

        let err = resolve_route(&reg, &req(Method::POST, "user", "queryRaw", None), false).unwrap_err();
        assert!(matches!(err, AppError::UnknownAction { .. }));

        let err = resolve_route(&reg, &req(Method::POST, "auditLog", "create", None), false).unwrap_err();
        assert!(matches!(err, AppError::UnknownAction { .. }));
    }

    #[test]
    fn method_is_checked_after_action() {
        let reg = registry();
        let err = resolve_route(&reg, &req(Method::GET, "user", "create", None), false).unwrap_err();
        assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED);

        let err = resolve_route(&reg, &req(Method::POST, "user", "update", None), false).unwrap_err();
        assert!(matches!(err, AppError::MethodMismatch { ref expected, .. } if *expected == Method::PUT));

        // recognized but unwired
        for action in ["upsert", "aggregate", "groupBy"] {
            let err = resolve_route(&reg, &req(Method::POST, "user", action, None), false).unwrap_err();
            assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED, "{}", action);
        }
    }

    #[test]
    fn target_required_only_when_enabled() {
        let reg = registry();
        assert!(resolve_route(&reg, &req(Method::PUT, "user", "update", None), false).is_ok());

        let err = resolve_route(&reg, &req(Method::PUT, "user", "update", None), true).unwrap_err();
        assert!(matches!(err, AppError::MissingTarget(_)));
        assert!(resolve_route(&reg, &req(Method::PUT, "user", "update", Some("42")), true).is_ok());

        // bulk actions never need one
        assert!(resolve_route(&reg, &req(Method::PUT, "user", "updateMany", None), true).is_ok());
    }

    #[test]
    fn body_parsing() {
        assert_eq!(parse_body(b"").unwrap(), Value::Null);
        assert_eq!(parse_body(b"  \n").unwrap(), Value::Null);
        assert_eq!(parse_body(br#"{"data":{"a":1}}"#).unwrap(), json!({"data": {"a": 1}}));
        assert!(matches!(parse_body(b"{nope"), Err(AppError::BadRequest(_))));
    }
}
