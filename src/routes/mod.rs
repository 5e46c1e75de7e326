//! Router assembly.

mod bridge;
mod common;

pub use bridge::bridge_routes;
pub use common::common_routes;

use crate::config::Settings;
use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, Router};
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Full application: common routes at the root, bridge routes under the API prefix.
pub fn app(state: AppState, settings: &Settings) -> Router {
    let bridge = bridge_routes(state.clone());
    let router = if settings.api_prefix.is_empty() {
        common_routes(state).merge(bridge)
    } else {
        common_routes(state).nest(&settings.api_prefix, bridge)
    };
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(settings.body_limit)),
    )
}
