use crate::config::config::AppConfig;
use crate::error::Result;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::PathBuf;

/// 环境变量前缀
const ENV_PREFIX: &str = "CADENCE_";
/// 选择配置预设的环境变量
const ENVIRONMENT_VAR: &str = "CADENCE_ENVIRONMENT";

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从默认路径加载配置
    ///
    /// 合并顺序：
    /// 1. 环境预设（`CADENCE_ENVIRONMENT=production` 时为生产预设，否则为开发预设）
    /// 2. ./cadence.toml
    /// 3. 环境变量（`CADENCE_SERVER__PORT=9000`）
    pub fn load() -> Result<AppConfig> {
        let environment = std::env::var(ENVIRONMENT_VAR).unwrap_or_default();
        Self::load_with(defaults_for(&environment), default_config_path())
    }

    /// 以开发预设为基础，从指定路径加载配置
    pub fn load_from(path: PathBuf) -> Result<AppConfig> {
        Self::load_with(AppConfig::development(), path)
    }

    /// 以给定预设为基础，从指定路径加载配置
    pub fn load_with(defaults: AppConfig, path: PathBuf) -> Result<AppConfig> {
        let config = Figment::from(Serialized::defaults(defaults))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        Ok(config)
    }

    /// 验证配置
    pub fn validate(config: &AppConfig) -> std::result::Result<(), ConfigValidationError> {
        if config.server.port == 0 {
            return Err(ConfigValidationError::InvalidPort);
        }

        if config.scheduler.parallel_threshold == 0 {
            return Err(ConfigValidationError::InvalidParallelThreshold);
        }

        if config.scheduler.default_days_ahead > config.scheduler.max_days_ahead {
            return Err(ConfigValidationError::HorizonExceedsMax {
                default: config.scheduler.default_days_ahead,
                max: config.scheduler.max_days_ahead,
            });
        }

        if config.model.enabled && config.model.artifact_path.is_none() {
            return Err(ConfigValidationError::InvalidPath(
                "model.artifact_path is required when model.enabled = true".to_string(),
            ));
        }

        Ok(())
    }
}

/// 配置验证错误
#[derive(thiserror::Error, Debug)]
pub enum ConfigValidationError {
    #[error("服务端口无效，必须大于 0")]
    InvalidPort,

    #[error("并行阈值无效，必须大于 0")]
    InvalidParallelThreshold,

    #[error("默认时间窗口 {default} 超过最大值 {max}")]
    HorizonExceedsMax { default: u32, max: u32 },

    #[error("配置路径无效: {0}")]
    InvalidPath(String),
}

/// 按环境名称选择配置预设
pub fn defaults_for(environment: &str) -> AppConfig {
    match environment.trim().to_lowercase().as_str() {
        "production" | "prod" => AppConfig::production(),
        _ => AppConfig::development(),
    }
}

/// 获取默认配置文件路径
pub fn default_config_path() -> PathBuf {
    PathBuf::from("cadence.toml")
}
