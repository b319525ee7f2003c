//! Pre-trained regression artifacts
//!
//! Models are trained and evaluated offline; the server only reads the
//! resulting JSON artifact:
//!
//! ```json
//! {
//!   "target": "overall_collaboration_score",
//!   "intercept": 2.1,
//!   "coefficients": { "meeting_number": 0.05, "gini_coefficient": -1.2 },
//!   "evaluation": { "r2": 0.81, "mse": 0.04, "cv_scores": [0.78, 0.80, 0.75] }
//! }
//! ```

use super::{ModelError, ModelResult, Predictor};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Offline evaluation of a trained model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Coefficient of determination on the held-out set
    pub r2: f64,
    /// Mean squared error on the held-out set
    pub mse: f64,
    /// Per-fold cross-validation scores
    #[serde(default)]
    pub cv_scores: Vec<f64>,
}

impl EvaluationReport {
    pub fn cv_mean(&self) -> Option<f64> {
        if self.cv_scores.is_empty() {
            None
        } else {
            Some(self.cv_scores.iter().sum::<f64>() / self.cv_scores.len() as f64)
        }
    }
}

/// Linear model: `intercept + Σ coefficient_i * feature_i`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    intercept: f64,
    features: Vec<String>,
    weights: Vec<f64>,
}

impl LinearModel {
    pub fn new(intercept: f64, coefficients: IndexMap<String, f64>) -> Self {
        let (features, weights) = coefficients.into_iter().unzip();
        Self {
            intercept,
            features,
            weights,
        }
    }
}

impl Predictor for LinearModel {
    fn features(&self) -> &[String] {
        &self.features
    }

    fn predict(&self, features: &[f64]) -> f64 {
        self.weights
            .iter()
            .zip(features)
            .fold(self.intercept, |acc, (w, x)| acc + w * x)
    }
}

/// On-disk model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub target: String,
    pub intercept: f64,
    pub coefficients: IndexMap<String, f64>,
    pub evaluation: EvaluationReport,
}

impl ModelArtifact {
    pub fn load(path: &Path) -> ModelResult<Self> {
        let raw = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> ModelResult<Self> {
        let artifact: ModelArtifact = serde_json::from_str(raw)?;
        if artifact.coefficients.is_empty() {
            return Err(ModelError::Invalid("model has no coefficients".to_string()));
        }
        Ok(artifact)
    }

    pub fn into_parts(self) -> (LinearModel, EvaluationReport) {
        (
            LinearModel::new(self.intercept, self.coefficients),
            self.evaluation,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTIFACT: &str = r#"{
        "target": "overall_collaboration_score",
        "intercept": 1.0,
        "coefficients": { "meeting_number": 0.5, "degree_centrality": 2.0 },
        "evaluation": { "r2": 0.8, "mse": 0.05, "cv_scores": [0.7, 0.8, 0.9] }
    }"#;

    #[test]
    fn test_linear_prediction() {
        let (model, _) = ModelArtifact::from_json(ARTIFACT).unwrap().into_parts();
        assert_eq!(model.features(), ["meeting_number", "degree_centrality"]);
        assert_eq!(model.predict(&[2.0, 0.25]), 1.0 + 1.0 + 0.5);
    }

    #[test]
    fn test_cv_mean() {
        let artifact = ModelArtifact::from_json(ARTIFACT).unwrap();
        let mean = artifact.evaluation.cv_mean().unwrap();
        assert!((mean - 0.8).abs() < 1e-12);

        let report = EvaluationReport {
            r2: 0.0,
            mse: 0.0,
            cv_scores: vec![],
        };
        assert_eq!(report.cv_mean(), None);
    }

    #[test]
    fn test_invalid_artifacts() {
        assert!(matches!(
            ModelArtifact::from_json("{not json"),
            Err(ModelError::Json(_))
        ));

        let empty = r#"{"target":"t","intercept":0,"coefficients":{},"evaluation":{"r2":0,"mse":0}}"#;
        assert!(matches!(
            ModelArtifact::from_json(empty),
            Err(ModelError::Invalid(_))
        ));
    }
}
