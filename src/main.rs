use anyhow::Context;
use cadence::api::{self, app_state::AppState};
use cadence::config::loader::ConfigLoader;
use cadence::inference::{create_model_provider, load_or_fallback};
use cadence::observability::{
    HealthCheckResult, ObservabilityState, SchedulerMetrics, create_observability_router,
    init_tracing,
};
use cadence::services::{IntervalPredictor, Scheduler, SystemClock, create_study_service};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::load().context("failed to load configuration")?;
    ConfigLoader::validate(&config).context("invalid configuration")?;

    let _log_guard = init_tracing(&config.logging);
    info!(
        "Starting {} ({} environment)...",
        config.app_name, config.environment
    );

    let metrics = SchedulerMetrics::new().context("failed to register metrics")?;
    info!("Metrics registry initialized");

    let provider = create_model_provider(&config.model);
    let model = load_or_fallback(provider.as_ref());

    let predictor = IntervalPredictor::new(model).with_metrics(metrics.clone());
    let model_name = predictor.model_name();
    match &model_name {
        Some(name) => info!("Interval predictor using model: {}", name),
        None => info!("Interval predictor using fallback heuristic"),
    }

    let scheduler = Scheduler::new(predictor, config.scheduler.parallel_threshold)
        .with_metrics(metrics.clone());
    let study_service = create_study_service(scheduler, Arc::new(SystemClock));
    info!("Study service initialized");

    let app_state = AppState::new(study_service, config.scheduler.clone(), metrics.clone());

    // 创建可观测性状态并集成路由
    let observability_state = Arc::new(ObservabilityState::new(
        env!("CARGO_PKG_VERSION").to_string(),
        metrics,
        model_name.clone(),
    ));
    observability_state
        .add_health_check(HealthCheckResult {
            name: "interval_model".to_string(),
            healthy: true,
            message: match &model_name {
                Some(name) => format!("loaded: {}", name),
                None => "fallback-only".to_string(),
            },
        })
        .await;

    let api_router = api::create_router(app_state);
    let router = create_observability_router(observability_state).merge(api_router);
    info!("API router created with observability endpoints");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
