use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// 服务地址
    pub host: String,
    /// 服务端口
    pub port: u16,
}

/// 间隔预测模型配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ModelConfig {
    /// 是否尝试加载训练好的模型
    pub enabled: bool,
    /// 模型文件路径（JSON）
    pub artifact_path: Option<PathBuf>,
}

/// 调度配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SchedulerConfig {
    /// 请求未指定时的默认时间窗口（天）
    pub default_days_ahead: u32,
    /// 允许的最大时间窗口（天）
    pub max_days_ahead: u32,
    /// 批量条目数达到该值时启用并行处理
    pub parallel_threshold: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: String,
    /// 结构化日志格式
    pub structured: bool,
    /// 日志文件目录
    pub log_dir: Option<PathBuf>,
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// 服务器配置
    pub server: ServerConfig,
    /// 模型配置
    pub model: ModelConfig,
    /// 调度配置
    pub scheduler: SchedulerConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 应用名称
    pub app_name: String,
    /// 环境
    pub environment: String,
}

impl AppConfig {
    /// 创建开发环境配置
    pub fn development() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".into(),
                port: 8000,
            },
            model: ModelConfig {
                enabled: true,
                artifact_path: Some(PathBuf::from("./model/interval_model.json")),
            },
            scheduler: SchedulerConfig {
                default_days_ahead: 30,
                max_days_ahead: 3650,
                parallel_threshold: 64,
            },
            logging: LoggingConfig {
                level: "debug".into(),
                structured: false,
                log_dir: None,
            },
            app_name: "cadence".into(),
            environment: "development".into(),
        }
    }

    /// 创建生产环境配置
    pub fn production() -> Self {
        let mut config = Self::development();
        config.environment = "production".into();
        config.logging.level = "info".into();
        config.logging.structured = true;
        config.logging.log_dir = Some(PathBuf::from("./logs"));
        config
    }
}
