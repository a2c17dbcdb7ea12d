//! Feature Normalizer

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::feature::{
    Difficulty, EASE_FACTOR_DEFAULT, EASE_FACTOR_MAX, EASE_FACTOR_MIN, RawStudyFeature,
    RawStudyItem, StudyFeature, StudyItem, Subject,
};

/// Numeric value of a loosely typed field. Absent, non-numeric and
/// non-finite values yield `None`.
fn number(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn non_negative(value: Option<&Value>) -> f64 {
    number(value).unwrap_or(0.0).max(0.0)
}

fn unit_interval(value: Option<&Value>) -> f64 {
    number(value).unwrap_or(0.0).clamp(0.0, 1.0)
}

fn count(value: Option<&Value>) -> u32 {
    // `as` saturates at u32::MAX
    non_negative(value).trunc() as u32
}

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Clamp an ease factor into [1.3, 2.5].
pub fn clamp_ease_factor(value: f64) -> f64 {
    value.clamp(EASE_FACTOR_MIN, EASE_FACTOR_MAX)
}

/// Turn a raw feature set into a canonical one.
///
/// Difficulty is the only required field. Every numeric field falls back to 0
/// (ease factor to 2.5) and bounded fields are clamped.
pub fn normalize(raw: &RawStudyFeature) -> Result<StudyFeature> {
    let difficulty = match text(raw.difficulty.as_ref()) {
        Some(value) => Difficulty::parse(&value).ok_or_else(|| {
            AppError::Validation(format!(
                "difficulty must be one of easy, medium, hard; got '{}'",
                value
            ))
        })?,
        None => {
            return Err(AppError::Validation(
                "difficulty is required".to_string(),
            ));
        }
    };

    let subject = text(raw.subject.as_ref())
        .map(|s| Subject::parse(&s))
        .unwrap_or_default();

    let ease_factor = number(raw.ease_factor.as_ref())
        .map(clamp_ease_factor)
        .unwrap_or(EASE_FACTOR_DEFAULT);

    let last_review_date = match raw.last_review_date.as_ref() {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| {
                AppError::Validation(format!("last_review_date '{}' is not YYYY-MM-DD: {}", s, e))
            })?,
        ),
        Some(other) => {
            return Err(AppError::Validation(format!(
                "last_review_date must be a YYYY-MM-DD string, got {}",
                other
            )));
        }
    };

    Ok(StudyFeature {
        difficulty,
        subject,
        response_time: non_negative(raw.response_time.as_ref()),
        previous_attempts: count(raw.previous_attempts.as_ref()),
        success_rate: unit_interval(raw.success_rate.as_ref()),
        days_since_last_review: non_negative(raw.days_since_last_review.as_ref()),
        study_streak: count(raw.study_streak.as_ref()),
        current_accuracy: unit_interval(raw.current_accuracy.as_ref()),
        ease_factor,
        last_review_date,
    })
}

/// Normalize a raw item; the item id must be a non-empty string or a number.
pub fn normalize_item(raw: &RawStudyItem) -> Result<StudyItem> {
    let item_id = text(raw.item_id.as_ref())
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::Validation("item_id is required".to_string()))?;

    let feature = normalize(&raw.feature)
        .map_err(|e| match e {
            AppError::Validation(msg) => AppError::Validation(format!("item '{}': {}", item_id, msg)),
            other => other,
        })?;

    Ok(StudyItem { item_id, feature })
}
