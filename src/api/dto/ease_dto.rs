//! 难度系数 DTO

use serde::{Deserialize, Serialize};

/// 难度系数更新参数（查询字符串）
#[derive(Debug, Deserialize)]
pub struct UpdateEaseFactorParams {
    /// 当前难度系数
    pub current_ease: f64,
    /// 本次复习表现（0-1）
    pub performance: f64,
}

/// 难度系数更新响应
#[derive(Debug, Serialize)]
pub struct UpdateEaseFactorResponse {
    pub old_ease_factor: f64,
    /// 保留两位小数
    pub new_ease_factor: f64,
    pub success: bool,
}

impl UpdateEaseFactorResponse {
    pub fn new(old_ease_factor: f64, new_ease_factor: f64) -> Self {
        Self {
            old_ease_factor,
            new_ease_factor: (new_ease_factor * 100.0).round() / 100.0,
            success: true,
        }
    }
}
