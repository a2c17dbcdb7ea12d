//! Study Scheduler
//!
//! Map-then-sort pipeline: every item is normalized, predicted and dated on
//! its own, then the batch is filtered by the horizon and ordered by a fully
//! defined key so the output never depends on how the map step was run.

use std::cmp::Ordering;

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::models::feature::{RawStudyFeature, RawStudyItem, StudyFeature, StudyItem};
use crate::models::schedule::{PredictionResult, ScheduleEntry};
use crate::observability::SchedulerMetrics;
use crate::services::date_resolver::{days_between, resolve};
use crate::services::normalizer::{normalize, normalize_item};
use crate::services::predictor::IntervalPredictor;

/// Batches smaller than this are processed on the calling thread.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64;

/// Priority of an entry within a horizon of `days_ahead` days.
///
/// `urgency * (1 + (1 - success_rate))`, where urgency is
/// `max(0, days_ahead - d)` for upcoming reviews and `days_ahead + |d|` for
/// overdue ones.
pub fn priority(days_until_review: i64, days_ahead: u32, success_rate: f64) -> f64 {
    let days_ahead = i64::from(days_ahead);
    let urgency = if days_until_review < 0 {
        days_ahead.saturating_add(days_until_review.saturating_neg())
    } else {
        (days_ahead - days_until_review).max(0)
    };
    urgency as f64 * (1.0 + (1.0 - success_rate.clamp(0.0, 1.0)))
}

/// Schedule order: overdue first, then priority descending, sooner review,
/// weaker success rate, and finally item id.
pub fn compare_entries(a: &ScheduleEntry, b: &ScheduleEntry) -> Ordering {
    b.is_overdue()
        .cmp(&a.is_overdue())
        .then_with(|| b.priority.total_cmp(&a.priority))
        .then_with(|| a.days_until_review.cmp(&b.days_until_review))
        .then_with(|| a.success_rate.total_cmp(&b.success_rate))
        .then_with(|| a.item_id.cmp(&b.item_id))
}

/// Stateless scheduling engine over a shared predictor.
#[derive(Debug, Clone)]
pub struct Scheduler {
    predictor: IntervalPredictor,
    parallel_threshold: usize,
    metrics: Option<SchedulerMetrics>,
}

impl Scheduler {
    pub fn new(predictor: IntervalPredictor, parallel_threshold: usize) -> Self {
        Self {
            predictor,
            parallel_threshold: parallel_threshold.max(1),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: SchedulerMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn predictor(&self) -> &IntervalPredictor {
        &self.predictor
    }

    fn anchor(feature: &StudyFeature, now: NaiveDate) -> NaiveDate {
        feature.last_review_date.unwrap_or(now)
    }

    /// Normalize, predict and date a single feature set.
    pub fn predict(&self, raw: &RawStudyFeature, now: NaiveDate) -> Result<PredictionResult> {
        let feature = normalize(raw)?;
        self.predict_feature(&feature, now)
    }

    /// Predict and date an already canonical feature.
    pub fn predict_feature(&self, feature: &StudyFeature, now: NaiveDate) -> Result<PredictionResult> {
        let prediction = self.predictor.predict(feature);
        let next_review_date = resolve(
            i64::from(prediction.interval_days),
            Self::anchor(feature, now),
        )?;

        Ok(PredictionResult {
            optimal_interval_days: prediction.interval_days,
            next_review_date,
            success: prediction.success(),
            strategy: prediction.strategy,
        })
    }

    /// Entry for one item, or `None` when it falls beyond the horizon.
    fn plan_item(
        &self,
        item: &StudyItem,
        days_ahead: u32,
        now: NaiveDate,
    ) -> Result<Option<ScheduleEntry>> {
        let result = self.predict_feature(&item.feature, now)?;
        let days_until_review = days_between(now, result.next_review_date);

        if days_until_review > i64::from(days_ahead) {
            return Ok(None);
        }

        Ok(Some(ScheduleEntry {
            item_id: item.item_id.clone(),
            subject: item.feature.subject.clone(),
            difficulty: item.feature.difficulty,
            next_review_date: result.next_review_date,
            days_until_review,
            priority: priority(days_until_review, days_ahead, item.feature.success_rate),
            success_rate: item.feature.success_rate,
        }))
    }

    fn normalize_raw(index: usize, raw: &RawStudyItem) -> Result<StudyItem> {
        normalize_item(raw).map_err(|e| match e {
            AppError::Validation(msg) => AppError::Validation(format!("items[{}]: {}", index, msg)),
            other => other,
        })
    }

    /// Ordered schedule of every item due within `days_ahead` days of `now`.
    ///
    /// The whole batch is normalized before any interval is predicted, so the
    /// first invalid item, in input order, rejects the batch without running
    /// the predictor. Overdue items are always kept. An empty batch yields an
    /// empty schedule.
    pub fn generate_schedule(
        &self,
        items: &[RawStudyItem],
        days_ahead: u32,
        now: NaiveDate,
    ) -> Result<Vec<ScheduleEntry>> {
        let parallel = items.len() >= self.parallel_threshold;
        debug!(
            "Scheduling {} items, horizon {} days, parallel={}",
            items.len(),
            days_ahead,
            parallel
        );

        // Collected per item first so the reported error is the earliest one.
        let normalized: Vec<Result<StudyItem>> = if parallel {
            items
                .par_iter()
                .enumerate()
                .map(|(index, raw)| Self::normalize_raw(index, raw))
                .collect()
        } else {
            items
                .iter()
                .enumerate()
                .map(|(index, raw)| Self::normalize_raw(index, raw))
                .collect()
        };
        let normalized = normalized.into_iter().collect::<Result<Vec<_>>>()?;

        let planned: Vec<Result<Option<ScheduleEntry>>> = if parallel {
            normalized
                .par_iter()
                .map(|item| self.plan_item(item, days_ahead, now))
                .collect()
        } else {
            normalized
                .iter()
                .map(|item| self.plan_item(item, days_ahead, now))
                .collect()
        };

        let mut schedule = Vec::with_capacity(planned.len());
        for entry in planned {
            if let Some(entry) = entry? {
                schedule.push(entry);
            }
        }
        schedule.sort_by(compare_entries);

        if let Some(metrics) = &self.metrics {
            metrics.record_schedule(items.len(), schedule.len());
        }
        info!(
            "Schedule generated: {} of {} items within {} days",
            schedule.len(),
            items.len(),
            days_ahead
        );

        Ok(schedule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::feature::{Difficulty, Subject};
    use crate::models::schedule::PredictionStrategy;
    use crate::services::predictor::fallback_interval;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn raw_item(value: Value) -> RawStudyItem {
        serde_json::from_value(value).unwrap()
    }

    /// Hard math item whose fallback review falls `days_until` days from today.
    fn item_due_in(id: &str, days_until: i64, success_rate: f64) -> RawStudyItem {
        let mut feature = StudyFeature::new(Difficulty::Hard, Subject::Math);
        feature.ease_factor = 1.3;
        feature.success_rate = success_rate;
        let interval = i64::from(fallback_interval(&feature));
        let last_review = resolve(days_until - interval, today()).unwrap();

        raw_item(json!({
            "item_id": id,
            "difficulty": "hard",
            "subject": "math",
            "success_rate": success_rate,
            "ease_factor": 1.3,
            "last_review_date": last_review.to_string(),
        }))
    }

    fn scheduler() -> Scheduler {
        Scheduler::new(IntervalPredictor::fallback_only(), DEFAULT_PARALLEL_THRESHOLD)
    }

    #[rstest]
    #[case(5, 30, 0.5, 37.5)]
    #[case(30, 30, 0.0, 0.0)]
    #[case(-3, 30, 1.0, 33.0)]
    #[case(-2, 0, 0.0, 4.0)]
    #[case(0, 0, 0.5, 0.0)]
    fn test_priority_formula(
        #[case] days_until: i64,
        #[case] days_ahead: u32,
        #[case] success_rate: f64,
        #[case] expected: f64,
    ) {
        assert_eq!(priority(days_until, days_ahead, success_rate), expected);
    }

    #[test]
    fn test_predict_reference_scenario() {
        let raw: RawStudyFeature = serde_json::from_value(json!({
            "difficulty": "easy",
            "ease_factor": 2.5,
            "success_rate": 0.8,
            "study_streak": 3
        }))
        .unwrap();

        let result = scheduler().predict(&raw, today()).unwrap();
        assert_eq!(result.optimal_interval_days, 15);
        assert_eq!(result.next_review_date, NaiveDate::from_ymd_opt(2024, 3, 25).unwrap());
        assert!(!result.success);
    }

    #[test]
    fn test_empty_batch() {
        assert!(scheduler().generate_schedule(&[], 30, today()).unwrap().is_empty());
    }

    #[test]
    fn test_empty_batch_is_recorded() {
        let metrics = SchedulerMetrics::new().unwrap();
        let scheduler = scheduler().with_metrics(metrics.clone());

        scheduler.generate_schedule(&[], 30, today()).unwrap();
        assert!(metrics.gather().contains("cadence_schedule_batch_items_count 1"));
    }

    #[rstest]
    #[case(usize::MAX)]
    #[case(1)]
    fn test_rejected_batch_runs_no_predictions(#[case] threshold: usize) {
        let metrics = SchedulerMetrics::new().unwrap();
        let predictor = IntervalPredictor::fallback_only().with_metrics(metrics.clone());
        let scheduler = Scheduler::new(predictor, threshold).with_metrics(metrics.clone());
        let items = vec![
            raw_item(json!({ "item_id": "a", "difficulty": "easy" })),
            raw_item(json!({ "item_id": "b", "difficulty": "medium" })),
            raw_item(json!({ "item_id": "c", "difficulty": "extreme" })),
        ];

        assert!(scheduler.generate_schedule(&items, 30, today()).is_err());
        assert_eq!(metrics.predictions(PredictionStrategy::Fallback), 0);
        assert_eq!(metrics.predictions(PredictionStrategy::Model), 0);
    }

    #[test]
    fn test_first_invalid_item_reported_in_parallel() {
        let mut items: Vec<RawStudyItem> = (0..100)
            .map(|i| raw_item(json!({ "item_id": format!("ok_{}", i), "difficulty": "hard" })))
            .collect();
        items[40] = raw_item(json!({ "item_id": "first", "difficulty": "extreme" }));
        items[90] = raw_item(json!({ "item_id": "second" }));

        let scheduler = Scheduler::new(IntervalPredictor::fallback_only(), 1);
        match scheduler.generate_schedule(&items, 30, today()) {
            Err(AppError::Validation(msg)) => assert!(msg.contains("items[40]"), "{}", msg),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_horizon_filter() {
        let beyond = item_due_in("beyond", 3, 0.5);
        let overdue = item_due_in("overdue", -1, 0.5);

        for days_ahead in [0, 1, 2] {
            let schedule = scheduler()
                .generate_schedule(&[beyond.clone(), overdue.clone()], days_ahead, today())
                .unwrap();
            assert_eq!(schedule.len(), 1);
            assert_eq!(schedule[0].item_id, "overdue");
            assert_eq!(schedule[0].days_until_review, -1);
        }

        let schedule = scheduler()
            .generate_schedule(&[beyond, overdue], 3, today())
            .unwrap();
        assert_eq!(schedule.len(), 2);
    }

    #[test]
    fn test_days_ahead_zero_keeps_due_today() {
        let due_today = item_due_in("today", 0, 0.5);
        let tomorrow = item_due_in("tomorrow", 1, 0.5);

        let schedule = scheduler()
            .generate_schedule(&[due_today, tomorrow], 0, today())
            .unwrap();
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].item_id, "today");
        assert_eq!(schedule[0].days_until_review, 0);
    }

    #[test]
    fn test_weaker_item_due_today_sorts_first() {
        let strong = item_due_in("strong", 0, 0.9);
        let weak = item_due_in("weak", 0, 0.1);

        for days_ahead in [0, 7] {
            let schedule = scheduler()
                .generate_schedule(&[strong.clone(), weak.clone()], days_ahead, today())
                .unwrap();
            assert_eq!(schedule[0].item_id, "weak");
            assert_eq!(schedule[1].item_id, "strong");
        }
    }

    #[test]
    fn test_overdue_outranks_upcoming() {
        // overdue by one day with perfect recall: (10 + 1) * 1.0 = 11
        let overdue = item_due_in("overdue", -1, 1.0);
        // due today with no recall: 10 * 2.0 = 20
        let today_item = item_due_in("due", 0, 0.0);

        let schedule = scheduler()
            .generate_schedule(&[today_item, overdue], 10, today())
            .unwrap();
        assert_eq!(schedule[0].item_id, "overdue");
        assert!(schedule[0].priority < schedule[1].priority);
    }

    #[test]
    fn test_longer_overdue_first() {
        let a = item_due_in("a", -8, 0.5);
        let b = item_due_in("b", -4, 0.5);

        let schedule = scheduler().generate_schedule(&[b, a], 5, today()).unwrap();
        assert_eq!(schedule[0].item_id, "a");
        assert_eq!(schedule[0].days_until_review, -8);
        assert_eq!(schedule[1].days_until_review, -4);
    }

    #[test]
    fn test_duplicates_pass_through() {
        let item = item_due_in("dup", 0, 0.5);
        let schedule = scheduler()
            .generate_schedule(&[item.clone(), item], 5, today())
            .unwrap();
        assert_eq!(schedule.len(), 2);
        assert!(schedule.iter().all(|e| e.item_id == "dup"));
    }

    #[test]
    fn test_invalid_item_rejects_batch() {
        let good = item_due_in("good", 0, 0.5);
        let bad = raw_item(json!({ "item_id": "bad", "difficulty": "extreme" }));

        match scheduler().generate_schedule(&[good, bad], 30, today()) {
            Err(AppError::Validation(msg)) => {
                assert!(msg.contains("items[1]"));
                assert!(msg.contains("bad"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let items: Vec<RawStudyItem> = (0..200)
            .map(|i| {
                raw_item(json!({
                    "item_id": format!("item_{:03}", i % 150),
                    "difficulty": (["easy", "medium", "hard"][i % 3]),
                    "subject": (["math", "art", "chemistry"][i % 3]),
                    "success_rate": (i % 11) as f64 / 10.0,
                    "ease_factor": 1.3 + (i % 7) as f64 * 0.2,
                    "study_streak": i % 13,
                    "last_review_date": format!("2024-02-{:02}", 1 + i % 28),
                }))
            })
            .collect();

        let sequential = Scheduler::new(IntervalPredictor::fallback_only(), usize::MAX)
            .generate_schedule(&items, 14, today())
            .unwrap();
        let parallel = Scheduler::new(IntervalPredictor::fallback_only(), 1)
            .generate_schedule(&items, 14, today())
            .unwrap();

        assert!(!sequential.is_empty());
        assert_eq!(sequential, parallel);
    }
}
