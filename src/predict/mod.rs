//! Prediction views
//!
//! A [`PredictionView`] applies a pre-trained [`Predictor`] to the records
//! matching the cascading filters and reports the mean estimate next to the
//! model's offline evaluation. Nothing is trained here.

pub mod model;

pub use model::{EvaluationReport, LinearModel, ModelArtifact};

use crate::dataset::{Dataset, DatasetResult};
use crate::filter::{self, Level, Selection};
use crate::view::ViewOptions;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Model artifact errors
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Failed to read model {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed model artifact: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid model artifact: {0}")]
    Invalid(String),
}

pub type ModelResult<T> = Result<T, ModelError>;

/// A trained regression model over named feature columns
pub trait Predictor: Send + Sync + fmt::Debug {
    /// Feature column names, in the order `predict` expects them
    fn features(&self) -> &[String];

    fn predict(&self, features: &[f64]) -> f64;
}

#[derive(Debug, Clone)]
enum ModelSlot {
    Ready {
        predictor: Arc<dyn Predictor>,
        evaluation: EvaluationReport,
    },
    Unavailable(String),
}

/// Result of applying the model to a selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub view: String,
    pub title: String,
    pub selection: Selection,
    pub options: ViewOptions,
    pub available: bool,
    /// Mean prediction over the matching records
    pub estimate: Option<f64>,
    /// Mean observed target over the matching records
    pub observed: Option<f64>,
    /// Records that contributed to the estimate
    pub records: usize,
    pub evaluation: Option<EvaluationReport>,
    pub markdown: String,
}

#[derive(Debug, Clone)]
pub struct PredictionView {
    id: String,
    title: String,
    target: String,
    dataset: Arc<Dataset>,
    model: ModelSlot,
}

impl PredictionView {
    /// Fails if the dataset lacks one of the predictor's feature columns
    pub fn new(
        dataset: Arc<Dataset>,
        id: impl Into<String>,
        title: impl Into<String>,
        target: impl Into<String>,
        predictor: Arc<dyn Predictor>,
        evaluation: EvaluationReport,
    ) -> DatasetResult<Self> {
        dataset.require_columns(predictor.features().iter().map(String::as_str))?;
        Ok(Self {
            id: id.into(),
            title: title.into(),
            target: target.into(),
            dataset,
            model: ModelSlot::Ready {
                predictor,
                evaluation,
            },
        })
    }

    /// A view whose model could not be loaded
    pub fn unavailable(
        dataset: Arc<Dataset>,
        id: impl Into<String>,
        title: impl Into<String>,
        target: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            target: target.into(),
            dataset,
            model: ModelSlot::Unavailable(reason.into()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_available(&self) -> bool {
        matches!(self.model, ModelSlot::Ready { .. })
    }

    pub fn options_for(&self, level: Level, selection: &Selection) -> Vec<filter::DropdownOption> {
        filter::options_for(&self.dataset, level, selection)
    }

    pub fn reset(&self) -> Selection {
        Selection::empty()
    }

    pub fn predict(&self, selection: &Selection) -> Prediction {
        let selection = filter::normalize(&self.dataset, selection);
        let options = ViewOptions::compute(&self.dataset, &selection);

        let (available, estimate, observed, records, evaluation) = match &self.model {
            ModelSlot::Unavailable(_) => (false, None, None, 0, None),
            ModelSlot::Ready { evaluation, .. } if selection.is_empty() => {
                (true, None, None, 0, Some(evaluation.clone()))
            }
            ModelSlot::Ready {
                predictor,
                evaluation,
            } => {
                let (estimate, observed, records) = self.estimate(predictor.as_ref(), &selection);
                (true, estimate, observed, records, Some(evaluation.clone()))
            }
        };

        debug!(
            "Prediction '{}' over {} records: {:?}",
            self.id, records, estimate
        );

        let mut prediction = Prediction {
            view: self.id.clone(),
            title: self.title.clone(),
            selection,
            options,
            available,
            estimate,
            observed,
            records,
            evaluation,
            markdown: String::new(),
        };
        prediction.markdown = self.markdown(&prediction);
        prediction
    }

    fn estimate(
        &self,
        predictor: &dyn Predictor,
        selection: &Selection,
    ) -> (Option<f64>, Option<f64>, usize) {
        let mut features = Vec::with_capacity(predictor.features().len());
        let mut predicted = Vec::new();
        let mut observed = Vec::new();

        for row in self.dataset.rows().filter(|row| selection.matches(row)) {
            features.clear();
            for name in predictor.features() {
                match row.value(name) {
                    Some(v) => features.push(v),
                    None => break,
                }
            }
            if features.len() != predictor.features().len() {
                continue;
            }
            predicted.push(predictor.predict(&features));
            if let Some(actual) = row.metric(&self.target) {
                observed.push(actual);
            }
        }

        (mean(&predicted), mean(&observed), predicted.len())
    }

    fn markdown(&self, prediction: &Prediction) -> String {
        let mut out = format!("#### {}\n\n", self.title);

        if let ModelSlot::Unavailable(reason) = &self.model {
            out.push_str(&format!("Model unavailable: {}\n", reason));
            return out;
        }

        if prediction.selection.is_empty() {
            out.push_str("Select a project to see a prediction.\n");
        } else {
            match prediction.estimate {
                Some(estimate) => {
                    out.push_str(&format!(
                        "**Predicted score:** {:.3} (mean over {} records)\n",
                        estimate, prediction.records
                    ));
                    if let Some(observed) = prediction.observed {
                        out.push_str(&format!("\n**Observed mean:** {:.3}\n", observed));
                    }
                }
                None => out.push_str("No records match the selected filters.\n"),
            }
        }

        if let Some(eval) = &prediction.evaluation {
            out.push_str(&evaluation_table(eval));
        }
        out
    }
}

/// Offline evaluation as a Markdown table
fn evaluation_table(eval: &EvaluationReport) -> String {
    let mut table = format!(
        "\n| Metric | Value |\n|---|---|\n| R² | {:.3} |\n| MSE | {:.3} |\n",
        eval.r2, eval.mse
    );
    if let Some(cv) = eval.cv_mean() {
        table.push_str(&format!(
            "| Cross-validation (mean of {} folds) | {:.3} |\n",
            eval.cv_scores.len(),
            cv
        ));
    }
    table
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DatasetBuilder;
    use indexmap::IndexMap;

    fn dataset() -> Arc<Dataset> {
        let mut b = DatasetBuilder::new(["degree_centrality", "overall_collaboration_score"]);
        b.push(1, 1, 1, &[Some(0.5), Some(4.0)]).unwrap();
        b.push(1, 2, 1, &[Some(1.0), Some(5.0)]).unwrap();
        b.push(1, 2, 2, &[None, Some(3.0)]).unwrap();
        b.push(2, 1, 3, &[Some(0.0), Some(2.0)]).unwrap();
        Arc::new(b.build())
    }

    fn view() -> PredictionView {
        let coefficients: IndexMap<String, f64> =
            [("meeting_number".to_string(), 1.0), ("degree_centrality".to_string(), 2.0)]
                .into_iter()
                .collect();
        PredictionView::new(
            dataset(),
            "overall",
            "Overall Collaboration Score",
            "overall_collaboration_score",
            Arc::new(LinearModel::new(0.0, coefficients)),
            EvaluationReport {
                r2: 0.9,
                mse: 0.1,
                cv_scores: vec![0.8, 0.9],
            },
        )
        .unwrap()
    }

    #[test]
    fn test_estimate_skips_rows_missing_features() {
        let v = view();
        let p = v.predict(&Selection::empty().with(Level::Project, [1]));

        assert!(p.available);
        // (1 + 1.0) and (2 + 2.0); the row without degree centrality is skipped
        assert_eq!(p.records, 2);
        assert_eq!(p.estimate, Some(3.0));
        assert_eq!(p.observed, Some(4.5));
        assert!(p.markdown.contains("**Predicted score:** 3.000"));
        assert!(p.markdown.contains("| R² | 0.900 |"));
        assert!(p.markdown.contains("mean of 2 folds"));
    }

    #[test]
    fn test_empty_selection_has_no_estimate() {
        let p = view().predict(&Selection::empty());
        assert!(p.available);
        assert_eq!(p.estimate, None);
        assert_eq!(p.evaluation.as_ref().map(|e| e.r2), Some(0.9));
        assert!(p.markdown.contains("| R² | 0.900 |"));
        assert_eq!(p.options.project.len(), 2);
        assert!(p.markdown.contains("Select a project"));
    }

    #[test]
    fn test_zero_rows() {
        let v = view();
        let sel = Selection::empty()
            .with(Level::Project, [1])
            .with(Level::Meeting, [2])
            .with(Level::Speaker, [2]);
        let p = v.predict(&sel);
        assert_eq!(p.records, 0);
        assert_eq!(p.estimate, None);
        assert!(p.markdown.contains("No records match"));
    }

    #[test]
    fn test_unavailable_model() {
        let v = PredictionView::unavailable(dataset(), "self", "Self", "self_score", "file not found");
        assert!(!v.is_available());
        let p = v.predict(&Selection::empty().with(Level::Project, [1]));
        assert!(!p.available);
        assert_eq!(p.estimate, None);
        assert!(p.markdown.contains("Model unavailable: file not found"));
    }

    #[test]
    fn test_missing_feature_column_is_rejected() {
        let coefficients: IndexMap<String, f64> =
            [("gini_coefficient".to_string(), 1.0)].into_iter().collect();
        let result = PredictionView::new(
            dataset(),
            "overall",
            "Overall",
            "overall_collaboration_score",
            Arc::new(LinearModel::new(0.0, coefficients)),
            EvaluationReport {
                r2: 0.0,
                mse: 0.0,
                cv_scores: vec![],
            },
        );
        assert!(result.is_err());
    }
}
