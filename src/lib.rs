//! Cadence - 间隔重复学习调度服务
//!
//! 根据学习者的表现特征预测最佳复习间隔，并为一批学习条目生成
//! 按优先级排序的复习计划。训练模型不可用时退化为确定性的启发式算法。

pub mod api;
pub mod config;
pub mod error;
pub mod inference;
pub mod models;
pub mod observability;
pub mod services;
