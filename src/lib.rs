//! Collabviz
//!
//! Interactive dashboards over per-speaker collaboration metrics recorded
//! in team meetings. One process serves several dashboards, each under its
//! own path prefix:
//!
//! - `/dash/`: social network analysis metrics (speech frequency, degree
//!   centrality, Gini coefficient)
//! - `/subjective/`: survey-based collaboration scores
//! - `/ml/`: estimates from pre-trained regression models
//!
//! Every view narrows the shared dataset through cascading
//! project → meeting → speaker filters and redraws its chart.
//!
//! ## Example Usage
//!
//! ```rust
//! use collabviz::{DatasetBuilder, Level, MetricSpec, MetricView, Selection};
//! use std::sync::Arc;
//!
//! let mut builder = DatasetBuilder::new(["degree_centrality"]);
//! builder.push(1, 1, 1, &[Some(0.5)]).unwrap();
//! builder.push(1, 2, 1, &[Some(0.7)]).unwrap();
//!
//! let view = MetricView::new(
//!     Arc::new(builder.build()),
//!     MetricSpec::new("degree-centrality", "degree_centrality", "Degree Centrality"),
//! )
//! .unwrap();
//!
//! let selection = Selection::empty().with(Level::Project, [1]);
//! let figure = view.render(&selection);
//! assert_eq!(figure.trace_count(), 1);
//! ```

pub mod chart;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod filter;
pub mod http;
pub mod predict;
pub mod view;

// Re-export main types for convenience
pub use chart::{Figure, LinearGradient, Rgb, Trace, BLUE_RED};

pub use config::{AppConfig, ConfigError, ConfigResult, DashboardConfig, ServerConfig};

pub use dashboard::{build_dashboards, Dashboard, DashboardLayout};

pub use dataset::{Dataset, DatasetBuilder, DatasetError, DatasetLoader, DatasetResult, Row};

pub use filter::{normalize, options_for, CascadeState, DropdownOption, Level, Selection};

pub use http::{build_router, ApiError, AppState, HttpServer};

pub use predict::{
    EvaluationReport, LinearModel, ModelArtifact, ModelError, ModelResult, Prediction,
    PredictionView, Predictor,
};

pub use view::{MetricSpec, MetricView, RenderMode, ViewOptions, ViewState, ViewType};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
