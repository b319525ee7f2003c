//! Figure builders for the three render modes

use super::MetricSpec;
use crate::chart::{BarTrace, Figure, Marker, ScatterTrace, Trace, BLUE_RED};
use crate::dataset::{Dataset, MetricColumn, Row};
use crate::filter::Selection;
use indexmap::IndexMap;

pub(crate) const MEETING_AXIS: &str = "Meeting Number";
pub(crate) const SPEAKER_AXIS: &str = "Speaker Number";

/// Empty, labeled frame shared by the empty-selection and zero-row paths
pub(crate) fn empty_frame(spec: &MetricSpec) -> Figure {
    Figure::frame(spec.trend_title(), MEETING_AXIS, &spec.label, true)
}

/// Matching rows that hold a value in `column`
fn matching_values<'a>(
    dataset: &'a Dataset,
    column: &'a MetricColumn,
    selection: &'a Selection,
) -> impl Iterator<Item = (Row<'a>, f64)> + 'a {
    dataset
        .rows()
        .filter(move |row| selection.matches(row))
        .filter_map(move |row| column.get(row.index()).map(|v| (row, v)))
}

/// Bars summed per (meeting, speaker), colored by value / max
pub(crate) fn aggregate(
    dataset: &Dataset,
    column: &MetricColumn,
    selection: &Selection,
    spec: &MetricSpec,
) -> Figure {
    let mut groups: IndexMap<(i64, i64), f64> = IndexMap::new();
    for (row, value) in matching_values(dataset, column, selection) {
        *groups.entry((row.meeting(), row.speaker())).or_insert(0.0) += value;
    }

    if groups.is_empty() {
        return empty_frame(spec);
    }

    let max = groups.values().copied().fold(f64::NEG_INFINITY, f64::max);
    let scale = |v: f64| if max > 0.0 { v / max } else { 0.0 };

    let bar = BarTrace {
        x: groups.keys().map(|(_, speaker)| *speaker).collect(),
        y: groups.values().copied().collect(),
        text: groups
            .keys()
            .map(|(meeting, _)| format!("Meeting {}", meeting))
            .collect(),
        marker: Marker {
            color: groups.values().map(|v| BLUE_RED.hex(scale(*v))).collect(),
            ..Marker::default()
        },
    };

    Figure::frame(spec.aggregate_title(), SPEAKER_AXIS, &spec.label, false)
        .with_trace(Trace::Bar(bar))
        .with_trace(Trace::Scatter(ScatterTrace::color_legend(
            &BLUE_RED,
            max,
            spec.label.clone(),
        )))
}

/// One line per speaker over meeting numbers
pub(crate) fn trend_by_speaker(
    dataset: &Dataset,
    column: &MetricColumn,
    selection: &Selection,
    spec: &MetricSpec,
) -> Figure {
    let mut series: IndexMap<i64, Vec<(i64, f64)>> = IndexMap::new();
    for (row, value) in matching_values(dataset, column, selection) {
        series
            .entry(row.speaker())
            .or_default()
            .push((row.meeting(), value));
    }

    if series.is_empty() {
        return empty_frame(spec);
    }

    let mut figure = empty_frame(spec);
    for (speaker, mut points) in series {
        points.sort_by_key(|(meeting, _)| *meeting);
        figure = figure.with_trace(Trace::Scatter(ScatterTrace::line(
            format!("Speaker {}", speaker),
            points,
        )));
    }
    figure
}

/// A single line of the mean value per meeting across all speakers
pub(crate) fn trend_total(
    dataset: &Dataset,
    column: &MetricColumn,
    selection: &Selection,
    spec: &MetricSpec,
) -> Figure {
    let mut per_meeting: IndexMap<i64, (f64, usize)> = IndexMap::new();
    for (row, value) in matching_values(dataset, column, selection) {
        let entry = per_meeting.entry(row.meeting()).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    if per_meeting.is_empty() {
        return empty_frame(spec);
    }

    let mut points: Vec<(i64, f64)> = per_meeting
        .into_iter()
        .map(|(meeting, (sum, count))| (meeting, sum / count as f64))
        .collect();
    points.sort_by_key(|(meeting, _)| *meeting);

    empty_frame(spec).with_trace(Trace::Scatter(ScatterTrace::line("All Speakers", points)))
}
