//! Interval Predictor
//!
//! Two explicit branches: the trained model when one is loaded and inference
//! succeeds, otherwise a deterministic spaced-repetition heuristic. The
//! predictor never fails its caller.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Result;
use crate::inference::IntervalModel;
use crate::models::feature::{Difficulty, StudyFeature};
use crate::models::schedule::{Prediction, PredictionStrategy};
use crate::observability::SchedulerMetrics;

pub const MIN_INTERVAL_DAYS: u32 = 1;
pub const MAX_INTERVAL_DAYS: u32 = 365;

/// Streak bonus stops growing after this many consecutive sessions.
const STREAK_CAP: u32 = 10;
const STREAK_STEP: f64 = 0.05;

/// Base interval of the fallback heuristic, in days.
fn base_interval(difficulty: Difficulty) -> f64 {
    match difficulty {
        Difficulty::Easy => 4.0,
        Difficulty::Medium => 2.0,
        Difficulty::Hard => 1.0,
    }
}

fn streak_bonus(study_streak: u32) -> f64 {
    1.0 + f64::from(study_streak.min(STREAK_CAP)) * STREAK_STEP
}

fn clamp_days(days: f64) -> u32 {
    if days.is_nan() {
        return MIN_INTERVAL_DAYS;
    }
    (days.round() as i64).clamp(i64::from(MIN_INTERVAL_DAYS), i64::from(MAX_INTERVAL_DAYS)) as u32
}

/// Spaced-repetition heuristic used whenever the model branch is unavailable.
pub fn fallback_interval(feature: &StudyFeature) -> u32 {
    let days = base_interval(feature.difficulty)
        * feature.ease_factor
        * (0.5 + feature.success_rate)
        * streak_bonus(feature.study_streak);
    clamp_days(days)
}

/// Business adjustments applied on top of the raw model output.
fn adjust_model_output(raw_days: f64, feature: &StudyFeature, min_days: f64, max_days: f64) -> f64 {
    let mut days = raw_days;

    if feature.success_rate < 0.3 {
        days = (days * 0.3).max(1.0);
    } else if feature.success_rate < 0.6 {
        days = (days * 0.6).max(1.0);
    } else if feature.success_rate > 0.9 {
        days = (days * 1.3).min(max_days);
    }

    days *= match feature.difficulty {
        Difficulty::Easy => 1.2,
        Difficulty::Medium => 1.0,
        Difficulty::Hard => 0.7,
    };

    days.clamp(min_days, max_days)
}

/// Picks the model or fallback branch for each feature.
#[derive(Clone, Default)]
pub struct IntervalPredictor {
    model: Option<Arc<dyn IntervalModel>>,
    metrics: Option<SchedulerMetrics>,
}

impl std::fmt::Debug for IntervalPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntervalPredictor")
            .field("model", &self.model.as_ref().map(|m| m.name()))
            .finish()
    }
}

impl IntervalPredictor {
    pub fn new(model: Option<Arc<dyn IntervalModel>>) -> Self {
        Self {
            model,
            metrics: None,
        }
    }

    /// Predictor that only ever runs the heuristic.
    pub fn fallback_only() -> Self {
        Self::new(None)
    }

    pub fn with_metrics(mut self, metrics: SchedulerMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn model_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn model_name(&self) -> Option<String> {
        self.model.as_ref().map(|m| m.name())
    }

    fn infer(model: &dyn IntervalModel, feature: &StudyFeature) -> Result<u32> {
        let raw = model.infer(&model.encode(feature))?;
        let adjusted = adjust_model_output(raw, feature, model.min_days(), model.max_days());
        Ok(clamp_days(adjusted))
    }

    /// Interval in [1, 365] days for one feature.
    pub fn predict(&self, feature: &StudyFeature) -> Prediction {
        let prediction = match &self.model {
            Some(model) => match Self::infer(model.as_ref(), feature) {
                Ok(interval_days) => Prediction {
                    interval_days,
                    strategy: PredictionStrategy::Model,
                },
                Err(e) => {
                    warn!("Model inference failed, using fallback: {}", e);
                    if let Some(metrics) = &self.metrics {
                        metrics.record_model_fault();
                    }
                    Prediction {
                        interval_days: fallback_interval(feature),
                        strategy: PredictionStrategy::Fallback,
                    }
                }
            },
            None => Prediction {
                interval_days: fallback_interval(feature),
                strategy: PredictionStrategy::Fallback,
            },
        };

        debug!(
            "Predicted {} days via {} for {} {}",
            prediction.interval_days, prediction.strategy, feature.difficulty, feature.subject
        );
        if let Some(metrics) = &self.metrics {
            metrics.record_prediction(prediction.strategy);
        }

        prediction
    }
}
