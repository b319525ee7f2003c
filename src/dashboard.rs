//! Dashboards: groups of views mounted under one path prefix

use crate::config::{AppConfig, DashboardConfig};
use crate::dataset::{Dataset, DatasetResult};
use crate::predict::{ModelArtifact, PredictionView};
use crate::view::{MetricSpec, MetricView};
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Link in the shared navigation bar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

/// Descriptor of a metric view for the page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewDescriptor {
    pub id: String,
    pub title: String,
    pub view_type_toggle: bool,
}

/// Descriptor of a prediction view for the page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionDescriptor {
    pub id: String,
    pub title: String,
    pub available: bool,
}

/// Dashboard manifest served to the page on load
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardLayout {
    pub slug: String,
    pub title: String,
    pub heading: String,
    pub intro: Option<String>,
    pub nav: Vec<NavLink>,
    pub views: Vec<ViewDescriptor>,
    pub predictions: Vec<PredictionDescriptor>,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    slug: String,
    title: String,
    heading: String,
    intro: Option<String>,
    dataset: Arc<Dataset>,
    views: IndexMap<String, MetricView>,
    predictions: IndexMap<String, PredictionView>,
}

impl Dashboard {
    /// Build a dashboard over `dataset`.
    ///
    /// Exclusion rules derive the dashboard's own dataset. A missing metric
    /// column is fatal; an unreadable model only disables its view.
    pub fn from_config(config: &DashboardConfig, dataset: &Arc<Dataset>) -> DatasetResult<Self> {
        let mut scoped = Arc::clone(dataset);
        for rule in &config.exclude {
            let before = scoped.len();
            scoped = Arc::new(scoped.excluding(&rule.column, rule.equals)?);
            info!(
                "Dashboard '{}': excluded {} records where {} == {}",
                config.slug,
                before - scoped.len(),
                rule.column,
                rule.equals
            );
        }

        let mut views = IndexMap::new();
        for view in &config.views {
            let mut spec = MetricSpec::new(&view.id, &view.column, &view.label);
            spec.view_type_toggle = view.view_type_toggle;
            views.insert(view.id.clone(), MetricView::new(Arc::clone(&scoped), spec)?);
        }

        let mut predictions = IndexMap::new();
        for pred in &config.predictions {
            let prediction = match ModelArtifact::load(&pred.model) {
                Ok(artifact) => {
                    if artifact.target != pred.target {
                        warn!(
                            "Prediction '{}': model was trained for '{}', configured target is '{}'",
                            pred.id, artifact.target, pred.target
                        );
                    }
                    let (model, evaluation) = artifact.into_parts();
                    PredictionView::new(
                        Arc::clone(&scoped),
                        &pred.id,
                        &pred.title,
                        &pred.target,
                        Arc::new(model),
                        evaluation,
                    )?
                }
                Err(e) => {
                    warn!("Prediction '{}' disabled: {}", pred.id, e);
                    PredictionView::unavailable(
                        Arc::clone(&scoped),
                        &pred.id,
                        &pred.title,
                        &pred.target,
                        e.to_string(),
                    )
                }
            };
            predictions.insert(pred.id.clone(), prediction);
        }

        Ok(Self {
            slug: config.slug.clone(),
            title: config.title.clone(),
            heading: config.heading.clone(),
            intro: config.intro.clone(),
            dataset: scoped,
            views,
            predictions,
        })
    }

    /// Direct construction, mainly for tests
    pub fn new(
        slug: impl Into<String>,
        title: impl Into<String>,
        dataset: Arc<Dataset>,
        views: Vec<MetricView>,
        predictions: Vec<PredictionView>,
    ) -> Self {
        let title = title.into();
        Self {
            slug: slug.into(),
            heading: title.clone(),
            title,
            intro: None,
            dataset,
            views: views
                .into_iter()
                .map(|v| (v.id().to_string(), v))
                .collect(),
            predictions: predictions
                .into_iter()
                .map(|p| (p.id().to_string(), p))
                .collect(),
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Path prefix, with trailing slash
    pub fn prefix(&self) -> String {
        format!("/{}/", self.slug)
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn view(&self, id: &str) -> Option<&MetricView> {
        self.views.get(id)
    }

    pub fn views(&self) -> impl Iterator<Item = &MetricView> {
        self.views.values()
    }

    pub fn prediction(&self, id: &str) -> Option<&PredictionView> {
        self.predictions.get(id)
    }

    pub fn predictions(&self) -> impl Iterator<Item = &PredictionView> {
        self.predictions.values()
    }

    pub fn nav_link(&self) -> NavLink {
        NavLink {
            label: self.title.clone(),
            href: self.prefix(),
        }
    }

    pub fn layout(&self, nav: &[NavLink]) -> DashboardLayout {
        DashboardLayout {
            slug: self.slug.clone(),
            title: self.title.clone(),
            heading: self.heading.clone(),
            intro: self.intro.clone(),
            nav: nav.to_vec(),
            views: self
                .views
                .values()
                .map(|v| ViewDescriptor {
                    id: v.id().to_string(),
                    title: v.spec().label.clone(),
                    view_type_toggle: v.spec().view_type_toggle,
                })
                .collect(),
            predictions: self
                .predictions
                .values()
                .map(|p| PredictionDescriptor {
                    id: p.id().to_string(),
                    title: p.title().to_string(),
                    available: p.is_available(),
                })
                .collect(),
        }
    }
}

/// Build every configured dashboard over the shared dataset
pub fn build_dashboards(config: &AppConfig, dataset: Arc<Dataset>) -> DatasetResult<Vec<Dashboard>> {
    let dashboards = config
        .dashboards
        .iter()
        .map(|cfg| Dashboard::from_config(cfg, &dataset))
        .collect::<DatasetResult<Vec<_>>>()?;

    for dashboard in &dashboards {
        info!(
            "Mounted dashboard '{}' at {} ({} views, {} predictions)",
            dashboard.title,
            dashboard.prefix(),
            dashboard.views.len(),
            dashboard.predictions.len()
        );
    }
    Ok(dashboards)
}
