//! 预测 DTO
//!
//! 单条预测的请求与响应结构。请求体直接使用扁平的 `RawStudyFeature`。

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::schedule::PredictionResult;

pub use crate::models::feature::RawStudyFeature as PredictionRequest;

/// 预测响应
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    /// 最佳复习间隔（天）
    pub optimal_interval_days: u32,
    /// 下次复习日期（ISO 8601）
    pub next_review_date: NaiveDate,
    /// 是否由训练模型给出
    pub success: bool,
}

impl From<PredictionResult> for PredictionResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            optimal_interval_days: result.optimal_interval_days,
            next_review_date: result.next_review_date,
            success: result.success,
        }
    }
}
