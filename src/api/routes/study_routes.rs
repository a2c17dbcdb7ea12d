//! Study Routes
//!
//! 定义预测、学习计划和难度系数相关的 API 路由。

use crate::api::handlers::{ease_handler::*, prediction_handler::*, schedule_handler::*};
use axum::{Router, routing::post};

use crate::api::app_state::AppState;

/// 创建学习路由器
pub fn create_study_router() -> Router<AppState> {
    Router::new()
        .route("/predict", post(predict_interval))
        .route("/schedule", post(generate_schedule))
        .route("/update_ease_factor", post(update_ease_factor))
}
