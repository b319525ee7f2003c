//! HTTP surface: dashboard pages and their JSON API

pub mod handler;
pub mod server;

pub use handler::ApiError;
pub use server::{build_router, HttpServer};

use crate::config::AppConfig;
use crate::dashboard::{build_dashboards, Dashboard, NavLink};
use crate::dataset::{Dataset, DatasetResult};
use indexmap::IndexMap;
use std::sync::Arc;

/// Read-only state shared by all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    dashboards: IndexMap<String, Dashboard>,
    nav: Vec<NavLink>,
    records: usize,
}

impl AppState {
    pub fn new(dashboards: Vec<Dashboard>, records: usize) -> Self {
        let nav = dashboards.iter().map(Dashboard::nav_link).collect();
        Self {
            dashboards: dashboards
                .into_iter()
                .map(|d| (d.slug().to_string(), d))
                .collect(),
            nav,
            records,
        }
    }

    /// Build every configured dashboard over the loaded dataset
    pub fn from_config(config: &AppConfig, dataset: Arc<Dataset>) -> DatasetResult<Self> {
        let records = dataset.len();
        let dashboards = build_dashboards(config, dataset)?;
        Ok(Self::new(dashboards, records))
    }

    pub fn dashboard(&self, slug: &str) -> Option<&Dashboard> {
        self.dashboards.get(slug)
    }

    pub fn dashboards(&self) -> impl Iterator<Item = &Dashboard> {
        self.dashboards.values()
    }

    pub fn nav(&self) -> &[NavLink] {
        &self.nav
    }

    /// Records in the shared dataset
    pub fn records(&self) -> usize {
        self.records
    }
}
