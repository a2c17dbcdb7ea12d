//! JSON model artifact: label vocabularies, a standard scaler and a small
//! dense network whose sigmoid output is mapped back to days.

use serde::{Deserialize, Serialize};

use super::{FEATURE_COUNT, IntervalModel};
use crate::error::{AppError, Result};
use crate::models::feature::StudyFeature;

fn default_difficulty_classes() -> Vec<String> {
    ["easy", "hard", "medium"].map(String::from).to_vec()
}

fn default_subject_classes() -> Vec<String> {
    ["art", "history", "language", "math", "science"]
        .map(String::from)
        .to_vec()
}

/// Per-column standardization: `(x - mean) / scale`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Linear,
    Relu,
    Sigmoid,
    Tanh,
}

impl Activation {
    fn apply(self, x: f64) -> f64 {
        match self {
            Self::Linear => x,
            Self::Relu => x.max(0.0),
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Self::Tanh => x.tanh(),
        }
    }
}

/// Fully connected layer, weights laid out as `[output][input]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    pub activation: Activation,
}

impl DenseLayer {
    fn forward(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| {
                let sum: f64 = row.iter().zip(input).map(|(w, x)| w * x).sum();
                self.activation.apply(sum + b)
            })
            .collect()
    }
}

/// Range the normalized network output is mapped onto.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputRange {
    pub min_days: f64,
    pub max_days: f64,
    /// When true the network emits a value in [0, 1].
    #[serde(default = "default_normalized")]
    pub normalized: bool,
}

fn default_normalized() -> bool {
    true
}

impl Default for OutputRange {
    fn default() -> Self {
        Self {
            min_days: 1.0,
            max_days: 90.0,
            normalized: true,
        }
    }
}

/// On-disk model description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default = "default_difficulty_classes")]
    pub difficulty_classes: Vec<String>,
    #[serde(default = "default_subject_classes")]
    pub subject_classes: Vec<String>,
    pub scaler: Scaler,
    pub layers: Vec<DenseLayer>,
    #[serde(default)]
    pub output: OutputRange,
}

impl ModelArtifact {
    /// Check every dimension so that inference can never index out of bounds.
    pub fn validate(&self) -> Result<()> {
        let corrupt = |msg: String| Err(AppError::ModelLoad(msg));

        if self.scaler.mean.len() != FEATURE_COUNT || self.scaler.scale.len() != FEATURE_COUNT {
            return corrupt(format!(
                "scaler must have {} columns, got mean={} scale={}",
                FEATURE_COUNT,
                self.scaler.mean.len(),
                self.scaler.scale.len()
            ));
        }
        if self
            .scaler
            .scale
            .iter()
            .chain(&self.scaler.mean)
            .any(|v| !v.is_finite())
            || self.scaler.scale.iter().any(|s| *s == 0.0)
        {
            return corrupt("scaler contains zero or non-finite values".to_string());
        }
        if self.layers.is_empty() {
            return corrupt("model has no layers".to_string());
        }

        let mut width = FEATURE_COUNT;
        for (index, layer) in self.layers.iter().enumerate() {
            if layer.weights.is_empty() || layer.weights.len() != layer.bias.len() {
                return corrupt(format!(
                    "layer {}: {} weight rows but {} biases",
                    index,
                    layer.weights.len(),
                    layer.bias.len()
                ));
            }
            if let Some(row) = layer.weights.iter().find(|row| row.len() != width) {
                return corrupt(format!(
                    "layer {}: expected {} inputs, got {}",
                    index,
                    width,
                    row.len()
                ));
            }
            width = layer.weights.len();
        }
        if width != 1 {
            return corrupt(format!("model must emit one value, emits {}", width));
        }

        let range = &self.output;
        if !(range.min_days.is_finite() && range.max_days.is_finite())
            || range.min_days < 0.0
            || range.min_days >= range.max_days
        {
            return corrupt(format!(
                "invalid output range [{}, {}]",
                range.min_days, range.max_days
            ));
        }

        Ok(())
    }
}

/// A validated artifact ready for inference.
#[derive(Debug, Clone)]
pub struct ArtifactModel {
    artifact: ModelArtifact,
}

impl ArtifactModel {
    pub fn new(artifact: ModelArtifact) -> Result<Self> {
        artifact.validate()?;
        Ok(Self { artifact })
    }

    /// Unknown categories take code 0.
    fn category_code(classes: &[String], value: &str) -> f64 {
        classes
            .iter()
            .position(|c| c == value)
            .map_or(0.0, |i| i as f64)
    }
}

impl IntervalModel for ArtifactModel {
    fn name(&self) -> String {
        match &self.artifact.version {
            Some(version) => format!("{}@{}", self.artifact.name, version),
            None => self.artifact.name.clone(),
        }
    }

    fn encode(&self, feature: &StudyFeature) -> Vec<f64> {
        let mut vector = super::ordinal_encode(feature);
        vector[0] = Self::category_code(
            &self.artifact.difficulty_classes,
            feature.difficulty.as_str(),
        );
        vector[1] = Self::category_code(&self.artifact.subject_classes, feature.subject.as_str());
        vector
    }

    fn infer(&self, vector: &[f64]) -> Result<f64> {
        if vector.len() != FEATURE_COUNT {
            return Err(AppError::ModelUnavailable(format!(
                "expected {} features, got {}",
                FEATURE_COUNT,
                vector.len()
            )));
        }

        let scaler = &self.artifact.scaler;
        let mut activations: Vec<f64> = vector
            .iter()
            .zip(scaler.mean.iter().zip(&scaler.scale))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect();

        for layer in &self.artifact.layers {
            activations = layer.forward(&activations);
        }

        let raw = activations.first().copied().unwrap_or(f64::NAN);
        if !raw.is_finite() {
            return Err(AppError::ModelUnavailable(format!(
                "model produced non-finite output: {}",
                raw
            )));
        }

        let range = &self.artifact.output;
        if range.normalized {
            Ok(range.min_days + raw * (range.max_days - range.min_days))
        } else {
            Ok(raw)
        }
    }

    fn max_days(&self) -> f64 {
        self.artifact.output.max_days
    }

    fn min_days(&self) -> f64 {
        self.artifact.output.min_days
    }
}
