//! 错误处理模块
//!
//! 定义应用程序的错误类型和错误处理逻辑。

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 应用程序错误类型
#[derive(Error, Debug)]
pub enum AppError {
    /// 参数验证错误
    #[error("参数验证失败: {0}")]
    Validation(String),

    /// 请求无法解析（JSON 格式、查询参数类型等）
    #[error("请求格式错误: {message}")]
    InvalidRequest { message: String, details: String },

    /// 模型加载失败（进程退化为启发式模式）
    #[error("模型加载失败: {0}")]
    ModelLoad(String),

    /// 模型不可用或推理失败
    #[error("模型不可用: {0}")]
    ModelUnavailable(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 内部错误
    #[error("内部错误: {0}")]
    Internal(String),
}

impl From<figment::Error> for AppError {
    fn from(e: figment::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest {
            message: "请求体不是有效的 JSON".to_string(),
            details: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidRequest {
            message: "查询参数无效".to_string(),
            details: rejection.body_text(),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Internal(e.to_string())
    }
}

/// AppError 的 Axum 响应实现
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = (&self).into();
        let mut response = ErrorResponse::new(&code, &self.to_string())
            .with_request_id(&uuid::Uuid::new_v4().to_string());
        if let AppError::InvalidRequest { details, .. } = &self {
            response = response.with_details(details);
        }
        let body = Json(response);
        (
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body,
        )
            .into_response()
    }
}

/// 错误响应
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误代码
    pub code: String,
    /// 错误消息
    pub message: String,
    /// 详细信息
    pub details: Option<String>,
    /// 请求 ID
    pub request_id: Option<String>,
}

impl ErrorResponse {
    /// 创建新错误响应
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
            request_id: None,
        }
    }

    /// 添加详细信息
    pub fn with_details(mut self, details: &str) -> Self {
        self.details = Some(details.to_string());
        self
    }

    /// 添加请求 ID
    pub fn with_request_id(mut self, request_id: &str) -> Self {
        self.request_id = Some(request_id.to_string());
        self
    }
}

/// HTTP 状态码映射
impl From<&AppError> for (u16, String) {
    fn from(err: &AppError) -> (u16, String) {
        match err {
            AppError::Validation(_) | AppError::InvalidRequest { .. } => {
                (400, "BAD_REQUEST".to_string())
            }
            AppError::ModelUnavailable(_) => (503, "MODEL_UNAVAILABLE".to_string()),
            AppError::ModelLoad(_) => (500, "MODEL_LOAD_ERROR".to_string()),
            AppError::Config(_) => (500, "CONFIG_ERROR".to_string()),
            _ => (500, "INTERNAL_ERROR".to_string()),
        }
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, AppError>;
