//! DTO 模块
//!
//! 数据传输对象，用于 API 请求和响应的序列化。

pub mod ease_dto;
pub mod prediction_dto;
pub mod schedule_dto;

pub use ease_dto::*;
pub use prediction_dto::*;
pub use schedule_dto::*;
