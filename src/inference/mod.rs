//! Interval Model
//!
//! The trained model is a black box behind [`IntervalModel`]: it turns a
//! canonical feature into a fixed-order numeric vector and maps that vector to
//! a number of days. [`ModelProvider`] performs the one-time load at startup.

pub mod artifact;

pub use artifact::{ArtifactModel, ModelArtifact};

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::config::ModelConfig;
use crate::error::{AppError, Result};
use crate::models::feature::StudyFeature;

/// Number of columns in a feature vector.
pub const FEATURE_COUNT: usize = 9;

/// A loaded interval model. Shared read-only across requests.
#[cfg_attr(test, mockall::automock)]
pub trait IntervalModel: Send + Sync {
    /// Human readable identifier, used in logs and health output.
    fn name(&self) -> String;

    /// Encode a feature into the model's input vector.
    fn encode(&self, feature: &StudyFeature) -> Vec<f64>;

    /// Predicted interval in days. Errors are recovered by the predictor.
    fn infer(&self, vector: &[f64]) -> Result<f64>;

    /// Upper bound of the model's output range in days.
    fn max_days(&self) -> f64;

    /// Lower bound of the model's output range in days.
    fn min_days(&self) -> f64;
}

/// Ordinal encoding with the built-in category codes.
pub fn ordinal_encode(feature: &StudyFeature) -> Vec<f64> {
    vec![
        feature.difficulty.ordinal(),
        feature.subject.ordinal(),
        feature.response_time,
        f64::from(feature.previous_attempts),
        feature.success_rate,
        feature.days_since_last_review,
        f64::from(feature.study_streak),
        feature.current_accuracy,
        feature.ease_factor,
    ]
}

/// Source of a trained model.
pub trait ModelProvider: Send + Sync {
    fn load(&self) -> Result<Arc<dyn IntervalModel>>;
}

/// Loads a JSON [`ModelArtifact`] from disk.
pub struct ArtifactModelProvider {
    path: PathBuf,
}

impl ArtifactModelProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ModelProvider for ArtifactModelProvider {
    fn load(&self) -> Result<Arc<dyn IntervalModel>> {
        tracing::info!("Looking for interval model at {}", self.path.display());

        let raw = std::fs::read_to_string(&self.path).map_err(|e| {
            AppError::ModelLoad(format!(
                "cannot read model artifact {}: {}",
                self.path.display(),
                e
            ))
        })?;
        let artifact: ModelArtifact = serde_json::from_str(&raw).map_err(|e| {
            AppError::ModelLoad(format!(
                "corrupt model artifact {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let model = ArtifactModel::new(artifact)?;
        tracing::info!("Interval model loaded: {}", model.name());
        Ok(Arc::new(model))
    }
}

/// Provider for deployments without a model; always fails to load.
pub struct NoModelProvider;

impl ModelProvider for NoModelProvider {
    fn load(&self) -> Result<Arc<dyn IntervalModel>> {
        Err(AppError::ModelLoad("model loading disabled".to_string()))
    }
}

pub fn create_model_provider(config: &ModelConfig) -> Box<dyn ModelProvider> {
    match (&config.artifact_path, config.enabled) {
        (Some(path), true) => Box::new(ArtifactModelProvider::new(path.clone())),
        _ => Box::new(NoModelProvider),
    }
}

/// Load once at startup. A failed load is logged and pins the process to the
/// fallback heuristic.
pub fn load_or_fallback(provider: &dyn ModelProvider) -> Option<Arc<dyn IntervalModel>> {
    match provider.load() {
        Ok(model) => Some(model),
        Err(e) => {
            tracing::warn!("Running in fallback-only mode: {}", e);
            None
        }
    }
}
