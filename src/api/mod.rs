//! API 模块
//!
//! 提供 REST API 支持。

pub mod app_state;
pub mod dto;
pub mod extract;
pub mod handlers;
pub mod routes;

use crate::api::app_state::AppState;
use crate::api::handlers::prediction_handler::root;
use crate::observability::metrics_middleware;
use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn create_router(app_state: AppState) -> Router {
    let api = Router::new().merge(routes::study_routes::create_study_router());

    Router::new()
        .route("/", get(root))
        .nest("/api/v1", api)
        // 按状态码类别统计每个响应
        .layer(axum::middleware::from_fn_with_state(
            app_state.metrics.clone(),
            metrics_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
