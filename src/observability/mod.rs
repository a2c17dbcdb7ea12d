//! 可观测性模块
//!
//! 提供 Prometheus 指标、结构化日志和健康检查。

use axum::{
    Json, Router,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::config::LoggingConfig;
use crate::models::schedule::PredictionStrategy;

// ===== Metrics =====

/// 预测器、调度器和 HTTP 层共享的 Prometheus 指标
#[derive(Clone)]
pub struct SchedulerMetrics {
    registry: Registry,
    predictions_total: IntCounterVec,
    model_faults_total: IntCounter,
    schedule_batch_items: Histogram,
    schedule_entries: Histogram,
    http_requests_total: IntCounterVec,
    model_loaded: IntGauge,
}

impl std::fmt::Debug for SchedulerMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerMetrics")
            .field("model_faults_total", &self.model_faults_total.get())
            .field("model_loaded", &self.model_loaded.get())
            .finish()
    }
}

impl SchedulerMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("cadence".to_string()), None)?;
        let batch_buckets = vec![0.0, 1.0, 5.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 5000.0];

        let predictions_total = IntCounterVec::new(
            Opts::new("predictions_total", "Interval predictions by strategy"),
            &["strategy"],
        )?;
        let model_faults_total = IntCounter::new(
            "model_faults_total",
            "Model inference failures recovered by the fallback heuristic",
        )?;
        let schedule_batch_items = Histogram::with_opts(
            HistogramOpts::new("schedule_batch_items", "Items submitted per schedule request")
                .buckets(batch_buckets.clone()),
        )?;
        let schedule_entries = Histogram::with_opts(
            HistogramOpts::new("schedule_entries", "Entries returned per schedule request")
                .buckets(batch_buckets),
        )?;
        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "HTTP requests by status class"),
            &["status"],
        )?;
        let model_loaded = IntGauge::new("model_loaded", "1 when a trained model is loaded")?;

        registry.register(Box::new(predictions_total.clone()))?;
        registry.register(Box::new(model_faults_total.clone()))?;
        registry.register(Box::new(schedule_batch_items.clone()))?;
        registry.register(Box::new(schedule_entries.clone()))?;
        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(model_loaded.clone()))?;

        Ok(Self {
            registry,
            predictions_total,
            model_faults_total,
            schedule_batch_items,
            schedule_entries,
            http_requests_total,
            model_loaded,
        })
    }

    /// 记录一次预测
    pub fn record_prediction(&self, strategy: PredictionStrategy) {
        self.predictions_total
            .with_label_values(&[strategy.as_str()])
            .inc();
    }

    /// 记录模型推理失败
    pub fn record_model_fault(&self) {
        self.model_faults_total.inc();
    }

    /// 记录调度批次
    pub fn record_schedule(&self, items: usize, entries: usize) {
        self.schedule_batch_items.observe(items as f64);
        self.schedule_entries.observe(entries as f64);
    }

    /// 记录 HTTP 请求
    pub fn record_http_request(&self, status: u16) {
        let class = match status {
            100..=199 => "1xx",
            200..=299 => "2xx",
            300..=399 => "3xx",
            400..=499 => "4xx",
            _ => "5xx",
        };
        self.http_requests_total.with_label_values(&[class]).inc();
    }

    pub fn set_model_loaded(&self, loaded: bool) {
        self.model_loaded.set(i64::from(loaded));
    }

    pub fn model_faults(&self) -> u64 {
        self.model_faults_total.get()
    }

    pub fn predictions(&self, strategy: PredictionStrategy) -> u64 {
        self.predictions_total
            .with_label_values(&[strategy.as_str()])
            .get()
    }

    /// 生成 Prometheus 格式指标
    pub fn gather(&self) -> String {
        let mut buffer = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buffer) {
            tracing::error!("Failed to encode metrics: {}", e);
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

// ===== Health Check =====

/// 健康检查状态
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub model_loaded: bool,
    pub model_name: Option<String>,
    pub timestamp: String,
    pub version: String,
    pub uptime_seconds: f64,
    pub checks: Vec<HealthCheck>,
}

/// 单个健康检查项
#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: String,
    pub message: Option<String>,
}

/// 健康检查结果
#[derive(Clone)]
pub struct HealthCheckResult {
    pub name: String,
    pub healthy: bool,
    pub message: String,
}

/// 可观测性状态
#[derive(Clone)]
pub struct ObservabilityState {
    pub metrics: SchedulerMetrics,
    pub health_checks: Arc<Mutex<Vec<HealthCheckResult>>>,
    pub model_name: Option<String>,
    pub start_time: DateTime<Utc>,
    pub version: String,
}

impl ObservabilityState {
    pub fn new(version: String, metrics: SchedulerMetrics, model_name: Option<String>) -> Self {
        metrics.set_model_loaded(model_name.is_some());

        Self {
            metrics,
            health_checks: Arc::new(Mutex::new(Vec::new())),
            model_name,
            start_time: Utc::now(),
            version,
        }
    }

    /// 添加健康检查结果
    pub async fn add_health_check(&self, result: HealthCheckResult) {
        let mut checks = self.health_checks.lock().await;
        checks.retain(|c| c.name != result.name);
        checks.push(result);
    }

    /// 获取应用正常运行时间
    pub fn uptime_seconds(&self) -> f64 {
        (Utc::now() - self.start_time).num_seconds() as f64
    }
}

// ===== Health Check Handlers =====

/// 获取完整健康状态
pub async fn health_check(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    let checks = state.health_checks.lock().await;
    let all_healthy = checks.iter().all(|c| c.healthy);

    let health_status = HealthStatus {
        status: if all_healthy {
            "healthy".to_string()
        } else {
            "unhealthy".to_string()
        },
        model_loaded: state.model_name.is_some(),
        model_name: state.model_name.clone(),
        timestamp: Utc::now().to_rfc3339(),
        version: state.version.clone(),
        uptime_seconds: state.uptime_seconds(),
        checks: checks
            .iter()
            .map(|c| HealthCheck {
                name: c.name.clone(),
                status: if c.healthy {
                    "healthy".to_string()
                } else {
                    "unhealthy".to_string()
                },
                message: Some(c.message.clone()),
            })
            .collect(),
    };

    let status_code = if all_healthy {
        axum::http::StatusCode::OK
    } else {
        axum::http::StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(health_status))
}

/// 简单存活检查
pub async fn liveness() -> impl IntoResponse {
    "OK"
}

/// 就绪检查
pub async fn readiness(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    let checks = state.health_checks.lock().await;
    let all_healthy = checks.iter().all(|c| c.healthy);

    if all_healthy {
        (axum::http::StatusCode::OK, "Ready")
    } else {
        (axum::http::StatusCode::SERVICE_UNAVAILABLE, "Not Ready")
    }
}

/// Prometheus 指标端点
pub async fn metrics(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    (axum::http::StatusCode::OK, state.metrics.gather())
}

/// 版本信息端点
pub async fn version(State(state): State<Arc<ObservabilityState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "version": state.version,
        "uptime_seconds": state.uptime_seconds(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// 创建可观测性路由
pub fn create_observability_router(state: Arc<ObservabilityState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
        .route("/health/ready", get(readiness))
        .route("/metrics", get(metrics))
        .route("/version", get(version))
        .with_state(state)
}

// ===== Structured Logging =====

/// 初始化结构化日志
///
/// 配置了 `log_dir` 时按天滚动写入文件；返回的 guard 必须存活到进程退出。
pub fn init_tracing(config: &LoggingConfig) -> Option<WorkerGuard> {
    let level = if config.level.is_empty() {
        "info"
    } else {
        config.level.as_str()
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (result, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "cadence.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let builder = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true);
            let result = if config.structured {
                builder.json().try_init()
            } else {
                builder.try_init()
            };
            (result, Some(guard))
        }
        None => {
            let builder = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(true)
                .with_line_number(true);
            let result = if config.structured {
                builder.json().try_init()
            } else {
                builder.try_init()
            };
            (result, None)
        }
    };

    if let Err(e) = result {
        eprintln!("tracing subscriber already initialized: {}", e);
    }
    guard
}

// ===== Request Metrics Middleware =====

/// 记录请求指标的中间件
pub async fn metrics_middleware(
    State(metrics): State<SchedulerMetrics>,
    req: Request,
    next: Next,
) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    metrics.record_http_request(response.status().as_u16());
    tracing::debug!(
        "{} {} -> {} in {}ms",
        method,
        path,
        response.status(),
        start.elapsed().as_millis()
    );

    response
}
