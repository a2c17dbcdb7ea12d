use crate::config::config::SchedulerConfig;
use crate::observability::SchedulerMetrics;
use crate::services::study::StudyService;
use std::sync::Arc;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Prediction and scheduling service
    pub study_service: Arc<dyn StudyService>,
    /// Horizon defaults and limits
    pub scheduler_config: SchedulerConfig,
    /// Metrics registry handles
    pub metrics: SchedulerMetrics,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("study_service", &"Arc<dyn StudyService>")
            .field("scheduler_config", &self.scheduler_config)
            .field("metrics", &self.metrics)
            .finish()
    }
}

impl AppState {
    /// Create new application state
    pub fn new(
        study_service: Box<dyn StudyService>,
        scheduler_config: SchedulerConfig,
        metrics: SchedulerMetrics,
    ) -> Self {
        Self {
            study_service: Arc::from(study_service),
            scheduler_config,
            metrics,
        }
    }
}
