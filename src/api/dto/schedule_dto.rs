//! 学习计划 DTO
//!
//! 定义学习计划相关的请求和响应数据结构。

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::feature::RawStudyItem;
use crate::models::schedule::ScheduleEntry;

/// 学习计划请求
#[derive(Debug, Deserialize, Validate)]
pub struct ScheduleRequest {
    /// 学习条目
    pub items: Vec<RawStudyItem>,
    /// 时间窗口（天），缺省时使用配置值
    #[serde(default)]
    #[validate(range(min = 0, max = 3650))]
    pub days_ahead: Option<i64>,
}

/// 学习计划响应
#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    /// 排序后的计划
    pub schedule: Vec<ScheduleEntry>,
    /// 计划条目数
    pub total_items: usize,
    /// 请求是否成功
    pub success: bool,
}

impl From<Vec<ScheduleEntry>> for ScheduleResponse {
    fn from(schedule: Vec<ScheduleEntry>) -> Self {
        Self {
            total_items: schedule.len(),
            schedule,
            success: true,
        }
    }
}
