//! 学习服务
//!
//! 供 HTTP 处理程序使用的调度引擎异步门面。

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::models::feature::{RawStudyFeature, RawStudyItem};
use crate::models::schedule::{PredictionResult, ScheduleEntry};
use crate::services::clock::Clock;
use crate::services::ease::update_ease_factor;
use crate::services::scheduler::Scheduler;

#[async_trait]
pub trait StudyService: Send + Sync {
    async fn predict(&self, raw: RawStudyFeature) -> Result<PredictionResult>;
    async fn schedule(&self, items: Vec<RawStudyItem>, days_ahead: u32)
    -> Result<Vec<ScheduleEntry>>;
    fn update_ease_factor(&self, current_ease: f64, performance: f64) -> Result<f64>;
    fn model_name(&self) -> Option<String>;
}

pub struct StudyServiceImpl {
    scheduler: Arc<Scheduler>,
    clock: Arc<dyn Clock>,
}

impl StudyServiceImpl {
    pub fn new(scheduler: Scheduler, clock: Arc<dyn Clock>) -> Self {
        Self {
            scheduler: Arc::new(scheduler),
            clock,
        }
    }
}

#[async_trait]
impl StudyService for StudyServiceImpl {
    async fn predict(&self, raw: RawStudyFeature) -> Result<PredictionResult> {
        self.scheduler.predict(&raw, self.clock.today())
    }

    async fn schedule(
        &self,
        items: Vec<RawStudyItem>,
        days_ahead: u32,
    ) -> Result<Vec<ScheduleEntry>> {
        let scheduler = self.scheduler.clone();
        let now = self.clock.today();

        tokio::task::spawn_blocking(move || scheduler.generate_schedule(&items, days_ahead, now))
            .await?
    }

    fn update_ease_factor(&self, current_ease: f64, performance: f64) -> Result<f64> {
        update_ease_factor(current_ease, performance)
    }

    fn model_name(&self) -> Option<String> {
        self.scheduler.predictor().model_name()
    }
}

pub fn create_study_service(scheduler: Scheduler, clock: Arc<dyn Clock>) -> Box<dyn StudyService> {
    Box::new(StudyServiceImpl::new(scheduler, clock))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::clock::MockClock;
    use crate::services::predictor::IntervalPredictor;
    use chrono::NaiveDate;
    use serde_json::json;

    fn service(today: NaiveDate) -> Box<dyn StudyService> {
        let mut clock = MockClock::new();
        clock.expect_today().return_const(today);
        create_study_service(
            Scheduler::new(IntervalPredictor::fallback_only(), 2),
            Arc::new(clock),
        )
    }

    #[tokio::test]
    async fn test_predict_uses_clock() {
        let today = NaiveDate::from_ymd_opt(2025, 12, 20).unwrap();
        let raw: RawStudyFeature = serde_json::from_value(json!({
            "difficulty": "easy",
            "success_rate": 0.8,
            "study_streak": 3
        }))
        .unwrap();

        let result = service(today).predict(raw).await.unwrap();
        assert_eq!(result.optimal_interval_days, 15);
        assert_eq!(
            result.next_review_date,
            NaiveDate::from_ymd_opt(2026, 1, 4).unwrap()
        );
    }

    #[tokio::test]
    async fn test_schedule_runs_off_runtime_thread() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let items: Vec<RawStudyItem> = serde_json::from_value(json!([
            { "item_id": "a", "difficulty": "hard", "last_review_date": "2024-12-01" },
            { "item_id": "b", "difficulty": "easy", "success_rate": 1.0 },
            { "item_id": "c", "difficulty": "medium" }
        ]))
        .unwrap();

        let schedule = service(today).schedule(items, 3).await.unwrap();
        let ids: Vec<&str> = schedule.iter().map(|e| e.item_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(schedule[0].is_overdue());
    }

    #[test]
    fn test_model_name_without_model() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(service(today).model_name().is_none());
    }
}
