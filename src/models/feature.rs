use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Lower bound of the ease factor.
pub const EASE_FACTOR_MIN: f64 = 1.3;
/// Upper bound of the ease factor, also its default.
pub const EASE_FACTOR_MAX: f64 = 2.5;
pub const EASE_FACTOR_DEFAULT: f64 = EASE_FACTOR_MAX;

/// Item difficulty as reported by the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// Ordinal code used when a model carries no vocabulary of its own.
    pub fn ordinal(&self) -> f64 {
        match self {
            Self::Easy => 0.0,
            Self::Medium => 1.0,
            Self::Hard => 2.0,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subject of a study item. The known list is advisory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subject {
    Math,
    Science,
    Language,
    History,
    Art,
    Other(String),
}

impl Subject {
    pub const UNSPECIFIED: &'static str = "unspecified";

    pub fn parse(value: &str) -> Self {
        let value = value.trim().to_lowercase();
        match value.as_str() {
            "math" => Self::Math,
            "science" => Self::Science,
            "language" => Self::Language,
            "history" => Self::History,
            "art" => Self::Art,
            "" => Self::Other(Self::UNSPECIFIED.to_string()),
            _ => Self::Other(value),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Math => "math",
            Self::Science => "science",
            Self::Language => "language",
            Self::History => "history",
            Self::Art => "art",
            Self::Other(name) => name,
        }
    }

    /// Ordinal code; every open subject shares code 0 with the first class.
    pub fn ordinal(&self) -> f64 {
        match self {
            Self::Math => 0.0,
            Self::Science => 1.0,
            Self::Language => 2.0,
            Self::History => 3.0,
            Self::Art => 4.0,
            Self::Other(_) => 0.0,
        }
    }
}

impl Default for Subject {
    fn default() -> Self {
        Self::Other(Self::UNSPECIFIED.to_string())
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Subject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Canonical, validated feature set of one study item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyFeature {
    pub difficulty: Difficulty,
    pub subject: Subject,
    /// Seconds, never negative.
    pub response_time: f64,
    pub previous_attempts: u32,
    /// Clamped to [0, 1].
    pub success_rate: f64,
    pub days_since_last_review: f64,
    pub study_streak: u32,
    /// Clamped to [0, 1].
    pub current_accuracy: f64,
    /// Clamped to [1.3, 2.5].
    pub ease_factor: f64,
    /// Anchor for the next review date; `None` means "today".
    pub last_review_date: Option<NaiveDate>,
}

impl StudyFeature {
    /// Feature with every optional field at its default.
    pub fn new(difficulty: Difficulty, subject: Subject) -> Self {
        Self {
            difficulty,
            subject,
            response_time: 0.0,
            previous_attempts: 0,
            success_rate: 0.0,
            days_since_last_review: 0.0,
            study_streak: 0,
            current_accuracy: 0.0,
            ease_factor: EASE_FACTOR_DEFAULT,
            last_review_date: None,
        }
    }
}

/// Canonical study item: a feature set plus the caller's identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyItem {
    pub item_id: String,
    #[serde(flatten)]
    pub feature: StudyFeature,
}

/// Feature set as received from the boundary.
///
/// Every field is optional and loosely typed so that the normalizer, not the
/// deserializer, decides defaults and rejections. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawStudyFeature {
    pub difficulty: Option<Value>,
    pub subject: Option<Value>,
    pub response_time: Option<Value>,
    pub previous_attempts: Option<Value>,
    pub success_rate: Option<Value>,
    pub days_since_last_review: Option<Value>,
    pub study_streak: Option<Value>,
    pub current_accuracy: Option<Value>,
    pub ease_factor: Option<Value>,
    pub last_review_date: Option<Value>,
}

/// Study item as received from the boundary.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStudyItem {
    #[serde(default)]
    pub item_id: Option<Value>,
    #[serde(flatten)]
    pub feature: RawStudyFeature,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_parse_is_case_insensitive() {
        assert_eq!(Difficulty::parse(" Hard "), Some(Difficulty::Hard));
        assert_eq!(Difficulty::parse("EASY"), Some(Difficulty::Easy));
        assert_eq!(Difficulty::parse("extreme"), None);
    }

    #[test]
    fn test_subject_is_open() {
        assert_eq!(Subject::parse("Math"), Subject::Math);
        assert_eq!(
            Subject::parse("Geography"),
            Subject::Other("geography".to_string())
        );
        assert_eq!(Subject::parse("  ").as_str(), Subject::UNSPECIFIED);
    }

    #[test]
    fn test_item_serializes_flat() {
        let item = StudyItem {
            item_id: "math_001".to_string(),
            feature: StudyFeature::new(Difficulty::Medium, Subject::Math),
        };
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["item_id"], "math_001");
        assert_eq!(json["difficulty"], "medium");
        assert_eq!(json["subject"], "math");
        assert_eq!(json["ease_factor"], 2.5);
    }

    #[test]
    fn test_raw_item_ignores_unknown_fields() {
        let raw: RawStudyItem = serde_json::from_value(serde_json::json!({
            "item_id": "a",
            "difficulty": "easy",
            "color": "blue"
        }))
        .unwrap();

        assert_eq!(raw.item_id, Some(Value::from("a")));
        assert_eq!(raw.feature.difficulty, Some(Value::from("easy")));
        assert!(raw.feature.success_rate.is_none());
    }
}
