//! 核心数据模型模块
//!
//! 定义学习特征、预测结果和学习计划条目。

pub mod feature;
pub mod schedule;

pub use feature::*;
pub use schedule::*;
