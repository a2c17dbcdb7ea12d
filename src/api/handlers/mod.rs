//! Handlers 模块
//!
//! HTTP 请求处理程序。

pub mod ease_handler;
pub mod prediction_handler;
pub mod schedule_handler;

pub use ease_handler::*;
pub use prediction_handler::*;
pub use schedule_handler::*;
