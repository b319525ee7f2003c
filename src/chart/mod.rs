//! Chart descriptions
//!
//! A [`Figure`] serializes to the JSON shape Plotly.js expects for
//! `Plotly.react(div, figure.data, figure.layout)`. Figures are plain data:
//! they are rebuilt on every filter change and compared by value.

pub mod color;

pub use color::{LinearGradient, Rgb, BLUE_RED};

use serde::Serialize;

/// Complete chart: traces plus layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    /// An empty, labeled frame: axes and title, no traces
    pub fn frame(title: impl Into<String>, x_title: &str, y_title: &str, show_legend: bool) -> Self {
        Self {
            data: Vec::new(),
            layout: Layout {
                title: Title::new(title),
                xaxis: Axis::titled(x_title),
                yaxis: Axis::titled(y_title),
                showlegend: show_legend,
            },
        }
    }

    pub fn with_trace(mut self, trace: Trace) -> Self {
        self.data.push(trace);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn trace_count(&self) -> usize {
        self.data.len()
    }

    pub fn bars(&self) -> impl Iterator<Item = &BarTrace> {
        self.data.iter().filter_map(|t| match t {
            Trace::Bar(bar) => Some(bar),
            _ => None,
        })
    }

    pub fn scatters(&self) -> impl Iterator<Item = &ScatterTrace> {
        self.data.iter().filter_map(|t| match t {
            Trace::Scatter(s) => Some(s),
            _ => None,
        })
    }
}

/// A single data series
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Bar(BarTrace),
    Scatter(ScatterTrace),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarTrace {
    pub x: Vec<i64>,
    pub y: Vec<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub text: Vec<String>,
    pub marker: Marker,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterTrace {
    pub x: Vec<Option<i64>>,
    pub y: Vec<Option<f64>>,
    pub mode: ScatterMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoverinfo: Option<String>,
}

impl ScatterTrace {
    /// A connected, marker-annotated line
    pub fn line(name: impl Into<String>, points: impl IntoIterator<Item = (i64, f64)>) -> Self {
        let (x, y) = points.into_iter().map(|(x, y)| (Some(x), Some(y))).unzip();
        Self {
            x,
            y,
            mode: ScatterMode::LinesMarkers,
            name: Some(name.into()),
            marker: None,
            hoverinfo: None,
        }
    }

    /// A trace with no visible points that only contributes a color bar
    pub fn color_legend(gradient: &LinearGradient, max: f64, title: impl Into<String>) -> Self {
        Self {
            x: vec![None],
            y: vec![None],
            mode: ScatterMode::Markers,
            name: None,
            marker: Some(Marker {
                color: Vec::new(),
                colorscale: Some(gradient.colorscale()),
                cmin: Some(0.0),
                cmax: Some(max),
                colorbar: Some(ColorBar {
                    title: ColorBarTitle {
                        text: title.into(),
                        side: "right".to_string(),
                    },
                }),
            }),
            hoverinfo: Some("none".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScatterMode {
    #[serde(rename = "lines+markers")]
    LinesMarkers,
    #[serde(rename = "markers")]
    Markers,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Marker {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub color: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorscale: Option<Vec<(f64, String)>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmax: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorbar: Option<ColorBar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorBar {
    pub title: ColorBarTitle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorBarTitle {
    pub text: String,
    pub side: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: Title,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub showlegend: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

impl Title {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: Title,
}

impl Axis {
    pub fn titled(text: &str) -> Self {
        Self {
            title: Title::new(text),
        }
    }
}
