//! 请求提取器
//!
//! 包装 axum 的 `Json` 与 `Query`，使解析失败也返回统一的 `ErrorResponse`。

use axum::extract::{FromRequest, FromRequestParts, Query};

use crate::error::AppError;

/// JSON 请求体
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// 查询字符串参数
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
