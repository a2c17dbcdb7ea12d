use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use crate::models::feature::{Difficulty, Subject};

/// Which branch of the predictor produced an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStrategy {
    Model,
    Fallback,
}

impl PredictionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for PredictionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interval chosen by the predictor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prediction {
    /// Always within [1, 365].
    pub interval_days: u32,
    pub strategy: PredictionStrategy,
}

impl Prediction {
    /// True when the trained model produced the interval.
    pub fn success(&self) -> bool {
        self.strategy == PredictionStrategy::Model
    }
}

/// Outcome of a single-item prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub optimal_interval_days: u32,
    pub next_review_date: NaiveDate,
    pub success: bool,
    #[serde(skip)]
    pub strategy: PredictionStrategy,
}

/// One line of a study schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleEntry {
    pub item_id: String,
    pub subject: Subject,
    pub difficulty: Difficulty,
    pub next_review_date: NaiveDate,
    /// Negative when the review is already overdue.
    pub days_until_review: i64,
    pub priority: f64,
    pub success_rate: f64,
}

impl ScheduleEntry {
    pub fn is_overdue(&self) -> bool {
        self.days_until_review < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_serializes_iso_date() {
        let entry = ScheduleEntry {
            item_id: "history_001".to_string(),
            subject: Subject::History,
            difficulty: Difficulty::Hard,
            next_review_date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            days_until_review: -2,
            priority: 12.5,
            success_rate: 0.4,
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["next_review_date"], "2024-03-09");
        assert_eq!(json["difficulty"], "hard");
        assert_eq!(json["days_until_review"], -2);
        assert!(entry.is_overdue());
    }

    #[test]
    fn test_prediction_success_tracks_strategy() {
        let model = Prediction {
            interval_days: 3,
            strategy: PredictionStrategy::Model,
        };
        let fallback = Prediction {
            interval_days: 3,
            strategy: PredictionStrategy::Fallback,
        };

        assert!(model.success());
        assert!(!fallback.success());
    }
}
