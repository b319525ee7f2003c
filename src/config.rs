//! Application configuration
//!
//! Loaded from YAML when a config file is given, otherwise the built-in
//! defaults describe the Monitoring, Subjective and ML dashboards.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub dashboards: Vec<DashboardConfig>,
}

/// HTTP listener configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub address: String,
    /// Port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 8050,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// CSV dataset, read once at startup
    pub path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/dataset_collaboration_with_survey_scores.csv"),
        }
    }
}

/// One dashboard mounted at `/{slug}/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub slug: String,
    /// Navigation label
    pub title: String,
    /// Page heading
    pub heading: String,
    /// Markdown shown above the views
    #[serde(default)]
    pub intro: Option<String>,
    #[serde(default)]
    pub exclude: Vec<ExcludeRule>,
    #[serde(default)]
    pub views: Vec<ViewConfig>,
    #[serde(default)]
    pub predictions: Vec<PredictionConfig>,
}

/// Drop records whose `column` equals `equals`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludeRule {
    pub column: String,
    pub equals: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    pub id: String,
    pub column: String,
    pub label: String,
    #[serde(default)]
    pub view_type_toggle: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionConfig {
    pub id: String,
    pub title: String,
    /// Column the model predicts
    pub target: String,
    /// JSON model artifact
    pub model: PathBuf,
}

const SURVEY_SENTINEL: f64 = -1.0;

const ML_INTRO: &str = "\
### Machine Learning
Collaboration scores are predicted from features derived from meeting recordings. \
Models were tuned with grid search and evaluated offline:
- **R² score**: share of the variance in the score explained by the features (higher is better).
- **MSE**: mean squared difference between predicted and reported scores (lower is better).
- **Cross-validation**: consistency of the score across data folds.

Features: meeting number, Gini coefficient, degree centrality, normalized speech frequency.";

impl Default for AppConfig {
    fn default() -> Self {
        let view = |id: &str, column: &str, label: &str, toggle: bool| ViewConfig {
            id: id.to_string(),
            column: column.to_string(),
            label: label.to_string(),
            view_type_toggle: toggle,
        };
        let prediction = |id: &str, title: &str, target: &str| PredictionConfig {
            id: id.to_string(),
            title: title.to_string(),
            target: target.to_string(),
            model: PathBuf::from(format!("models/{}.json", id)),
        };

        Self {
            server: ServerConfig::default(),
            data: DataConfig::default(),
            dashboards: vec![
                DashboardConfig {
                    slug: "dash".to_string(),
                    title: "Monitoring".to_string(),
                    heading: "Social Network Analysis".to_string(),
                    intro: None,
                    exclude: Vec::new(),
                    views: vec![
                        view("speech-frequency", "speech_frequency", "Speech Frequency", false),
                        view("degree-centrality", "degree_centrality", "Degree Centrality", false),
                        view("gini-coefficient", "gini_coefficient", "Gini Coefficient", false),
                    ],
                    predictions: Vec::new(),
                },
                DashboardConfig {
                    slug: "subjective".to_string(),
                    title: "Subjective Scoring".to_string(),
                    heading: "Subjective Scoring".to_string(),
                    intro: None,
                    exclude: vec![
                        ExcludeRule {
                            column: "overall_collaboration_score".to_string(),
                            equals: SURVEY_SENTINEL,
                        },
                        ExcludeRule {
                            column: "individual_collaboration_score".to_string(),
                            equals: SURVEY_SENTINEL,
                        },
                    ],
                    views: vec![
                        view("overall", "overall_collaboration_score", "Overall Collaboration Score", true),
                        view("individual-others", "individual_collaboration_score", "Individual Collaboration Score (Others)", true),
                        view("individual-self", "self_collaboration_score", "Individual Collaboration Score (Self)", true),
                    ],
                    predictions: Vec::new(),
                },
                DashboardConfig {
                    slug: "ml".to_string(),
                    title: "ML".to_string(),
                    heading: "Prediction by Machine Learning".to_string(),
                    intro: Some(ML_INTRO.to_string()),
                    exclude: Vec::new(),
                    views: Vec::new(),
                    predictions: vec![
                        prediction("overall", "Overall Collaboration Score", "overall_collaboration_score"),
                        prediction("individual-others", "Individual Collaboration Score", "individual_collaboration_score"),
                        prediction("individual-self", "Self-Interaction Individual Collaboration Score", "self_collaboration_score"),
                    ],
                },
            ],
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_yaml_str(&raw)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn from_yaml_str(raw: &str) -> ConfigResult<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Check identifiers are present, URL-safe and unique
    pub fn validate(&self) -> ConfigResult<()> {
        if self.dashboards.is_empty() {
            return Err(ConfigError::Invalid("no dashboards configured".to_string()));
        }

        let mut slugs = HashSet::new();
        for dashboard in &self.dashboards {
            check_identifier("dashboard slug", &dashboard.slug)?;
            if dashboard.slug == "api" {
                return Err(ConfigError::Invalid(
                    "dashboard slug 'api' is reserved".to_string(),
                ));
            }
            if !slugs.insert(dashboard.slug.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate dashboard slug '{}'",
                    dashboard.slug
                )));
            }

            let mut ids = HashSet::new();
            for id in dashboard.views.iter().map(|v| &v.id) {
                check_identifier("view id", id)?;
                if !ids.insert(id.as_str()) {
                    return Err(ConfigError::Invalid(format!(
                        "duplicate view id '{}' in dashboard '{}'",
                        id, dashboard.slug
                    )));
                }
            }

            let mut ids = HashSet::new();
            for id in dashboard.predictions.iter().map(|p| &p.id) {
                check_identifier("prediction id", id)?;
                if !ids.insert(id.as_str()) {
                    return Err(ConfigError::Invalid(format!(
                        "duplicate prediction id '{}' in dashboard '{}'",
                        id, dashboard.slug
                    )));
                }
            }
        }
        Ok(())
    }
}

fn check_identifier(kind: &str, value: &str) -> ConfigResult<()> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("invalid {} '{}'", kind, value)))
    }
}
