pub mod portfolio;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::main_lib::AppState;

pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(portfolio::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
