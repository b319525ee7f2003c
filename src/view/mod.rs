//! Filterable metric views
//!
//! A [`MetricView`] binds one metric column of the shared dataset to the
//! cascading filters and draws it in one of three modes:
//! - empty frame while nothing is selected
//! - aggregate bars once at least one meeting is selected
//! - per-speaker trend lines otherwise
//!
//! Every operation is a pure function of the dataset and the selection.

mod render;

use crate::chart::Figure;
use crate::dataset::{Dataset, DatasetError, DatasetResult};
use crate::filter::{self, CascadeState, DropdownOption, Level, Selection};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// What a view plots and how it is labeled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSpec {
    /// URL-safe identifier, unique within a dashboard
    pub id: String,
    /// Dataset column holding the metric
    pub column: String,
    /// Human-readable metric name used in titles and axes
    pub label: String,
    /// Offer the Total / By Speakers toggle for trend mode
    #[serde(default)]
    pub view_type_toggle: bool,
}

impl MetricSpec {
    pub fn new(id: impl Into<String>, column: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            column: column.into(),
            label: label.into(),
            view_type_toggle: false,
        }
    }

    pub fn with_view_type_toggle(mut self) -> Self {
        self.view_type_toggle = true;
        self
    }

    pub fn trend_title(&self) -> String {
        format!("{} by Meeting and Speaker", self.label)
    }

    pub fn aggregate_title(&self) -> String {
        format!("{} for Selected Meetings", self.label)
    }
}

/// Trend-mode presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewType {
    /// Mean across speakers, one line
    Total,
    /// One line per speaker
    BySpeakers,
}

impl FromStr for ViewType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "total" => Ok(ViewType::Total),
            "by_speakers" => Ok(ViewType::BySpeakers),
            other => Err(format!("unknown view type '{}'", other)),
        }
    }
}

/// Which of the mutually exclusive chart modes a selection triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    Empty,
    Aggregate,
    Trend,
}

impl RenderMode {
    pub fn for_selection(selection: &Selection) -> Self {
        if selection.is_empty() {
            RenderMode::Empty
        } else if !selection.meeting.is_empty() {
            RenderMode::Aggregate
        } else {
            RenderMode::Trend
        }
    }
}

/// Option lists for all three dropdowns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewOptions {
    pub project: Vec<DropdownOption>,
    pub meeting: Vec<DropdownOption>,
    pub speaker: Vec<DropdownOption>,
}

impl ViewOptions {
    pub fn compute(dataset: &Dataset, selection: &Selection) -> Self {
        Self {
            project: filter::options_for(dataset, Level::Project, selection),
            meeting: filter::options_for(dataset, Level::Meeting, selection),
            speaker: filter::options_for(dataset, Level::Speaker, selection),
        }
    }
}

/// Everything the page needs after a filter event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub view: String,
    pub selection: Selection,
    pub cascade: CascadeState,
    pub mode: RenderMode,
    pub view_type: ViewType,
    pub options: ViewOptions,
    pub figure: Figure,
}

/// One metric, one chart, three dropdowns
#[derive(Debug, Clone)]
pub struct MetricView {
    dataset: Arc<Dataset>,
    spec: MetricSpec,
}

impl MetricView {
    /// Fails if the dataset lacks the metric column
    pub fn new(dataset: Arc<Dataset>, spec: MetricSpec) -> DatasetResult<Self> {
        if !dataset.has_metric(&spec.column) {
            return Err(DatasetError::MissingColumn(spec.column.clone()));
        }
        Ok(Self { dataset, spec })
    }

    pub fn spec(&self) -> &MetricSpec {
        &self.spec
    }

    pub fn id(&self) -> &str {
        &self.spec.id
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    /// Trend presentation used when the caller does not choose one
    pub fn default_view_type(&self) -> ViewType {
        if self.spec.view_type_toggle {
            ViewType::Total
        } else {
            ViewType::BySpeakers
        }
    }

    pub fn options_for(&self, level: Level, selection: &Selection) -> Vec<DropdownOption> {
        filter::options_for(&self.dataset, level, selection)
    }

    /// Empty selection for every level of this view
    pub fn reset(&self) -> Selection {
        Selection::empty()
    }

    pub fn normalize(&self, selection: &Selection) -> Selection {
        filter::normalize(&self.dataset, selection)
    }

    pub fn render(&self, selection: &Selection) -> Figure {
        self.render_with(selection, self.default_view_type())
    }

    /// Render with an explicit trend presentation. `Total` is honored only
    /// by views that offer the toggle.
    pub fn render_with(&self, selection: &Selection, view_type: ViewType) -> Figure {
        let Some(column) = self.dataset.metric(&self.spec.column) else {
            return render::empty_frame(&self.spec);
        };

        let mode = RenderMode::for_selection(selection);
        let figure = match mode {
            RenderMode::Empty => render::empty_frame(&self.spec),
            RenderMode::Aggregate => render::aggregate(&self.dataset, column, selection, &self.spec),
            RenderMode::Trend => match self.effective_view_type(view_type) {
                ViewType::Total => render::trend_total(&self.dataset, column, selection, &self.spec),
                ViewType::BySpeakers => {
                    render::trend_by_speaker(&self.dataset, column, selection, &self.spec)
                }
            },
        };

        debug!(
            "Rendered view '{}' in {:?} mode with {} traces",
            self.spec.id,
            mode,
            figure.trace_count()
        );
        figure
    }

    /// Normalize the selection, then compute options and the chart
    pub fn state(&self, selection: &Selection, view_type: Option<ViewType>) -> ViewState {
        let selection = self.normalize(selection);
        let view_type = self.effective_view_type(view_type.unwrap_or(self.default_view_type()));
        ViewState {
            view: self.spec.id.clone(),
            cascade: selection.cascade_state(),
            mode: RenderMode::for_selection(&selection),
            view_type,
            options: ViewOptions::compute(&self.dataset, &selection),
            figure: self.render_with(&selection, view_type),
            selection,
        }
    }

    fn effective_view_type(&self, requested: ViewType) -> ViewType {
        if self.spec.view_type_toggle {
            requested
        } else {
            ViewType::BySpeakers
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::Trace;
    use crate::dataset::DatasetBuilder;

    fn view(toggle: bool) -> MetricView {
        let mut b = DatasetBuilder::new(["score"]);
        b.push(1, 2, 1, &[Some(2.0)]).unwrap();
        b.push(1, 1, 1, &[Some(4.0)]).unwrap();
        b.push(1, 1, 2, &[Some(6.0)]).unwrap();
        b.push(1, 2, 2, &[None]).unwrap();
        let mut spec = MetricSpec::new("score", "score", "Score");
        if toggle {
            spec = spec.with_view_type_toggle();
        }
        MetricView::new(Arc::new(b.build()), spec).unwrap()
    }

    #[test]
    fn test_missing_column_is_rejected() {
        let ds = Arc::new(DatasetBuilder::new(["score"]).build());
        let err = MetricView::new(ds, MetricSpec::new("gini", "gini_coefficient", "Gini")).unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn(_)));
    }

    #[test]
    fn test_render_mode_selection() {
        assert_eq!(RenderMode::for_selection(&Selection::empty()), RenderMode::Empty);
        let sel = Selection::empty().with(Level::Project, [1]);
        assert_eq!(RenderMode::for_selection(&sel), RenderMode::Trend);
        let sel = sel.with(Level::Meeting, [1]);
        assert_eq!(RenderMode::for_selection(&sel), RenderMode::Aggregate);
    }

    #[test]
    fn test_trend_lines_sorted_by_meeting_and_skip_missing() {
        let v = view(false);
        let fig = v.render(&Selection::empty().with(Level::Project, [1]));
        let lines: Vec<_> = fig.scatters().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].name.as_deref(), Some("Speaker 1"));
        assert_eq!(lines[0].x, vec![Some(1), Some(2)]);
        assert_eq!(lines[0].y, vec![Some(4.0), Some(2.0)]);
        // speaker 2 has no value in meeting 2
        assert_eq!(lines[1].x, vec![Some(1)]);
    }

    #[test]
    fn test_total_view_type_averages_speakers() {
        let v = view(true);
        assert_eq!(v.default_view_type(), ViewType::Total);

        let sel = Selection::empty().with(Level::Project, [1]);
        let fig = v.render_with(&sel, ViewType::Total);
        assert_eq!(fig.trace_count(), 1);
        match &fig.data[0] {
            Trace::Scatter(line) => {
                assert_eq!(line.name.as_deref(), Some("All Speakers"));
                assert_eq!(line.x, vec![Some(1), Some(2)]);
                assert_eq!(line.y, vec![Some(5.0), Some(2.0)]);
            }
            other => panic!("unexpected trace {other:?}"),
        }

        let fig = v.render_with(&sel, ViewType::BySpeakers);
        assert_eq!(fig.trace_count(), 2);
    }

    #[test]
    fn test_total_ignored_without_toggle() {
        let v = view(false);
        let sel = Selection::empty().with(Level::Project, [1]);
        assert_eq!(v.render_with(&sel, ViewType::Total), v.render(&sel));
        assert_eq!(v.state(&sel, Some(ViewType::Total)).view_type, ViewType::BySpeakers);
    }

    #[test]
    fn test_state_normalizes_selection() {
        let v = view(false);
        let sel = Selection::empty()
            .with(Level::Project, [1])
            .with(Level::Speaker, [2]);
        let state = v.state(&sel, None);

        assert!(state.selection.speaker.is_empty());
        assert_eq!(state.mode, RenderMode::Trend);
        assert_eq!(state.cascade, CascadeState::Partial);
        assert_eq!(state.options.meeting.len(), 2);
        assert!(state.options.speaker.is_empty());
    }

    #[test]
    fn test_view_type_parsing() {
        assert_eq!("total".parse::<ViewType>().unwrap(), ViewType::Total);
        assert_eq!("by_speakers".parse::<ViewType>().unwrap(), ViewType::BySpeakers);
        assert!("pie".parse::<ViewType>().is_err());
    }
}
