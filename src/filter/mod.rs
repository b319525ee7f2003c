//! Cascading filters: project → meeting → speaker
//!
//! A [`Selection`] holds the chosen identifiers per [`Level`]. Options at a
//! dependent level are computed from the rows matching every selection at
//! the levels above it; a dependent level offers nothing until all of its
//! upstream levels have a selection.

use crate::dataset::{Dataset, Row, MEETING_COLUMN, PROJECT_COLUMN, SPEAKER_COLUMN};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Filter level, ordered from least to most dependent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Project,
    Meeting,
    Speaker,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Project, Level::Meeting, Level::Speaker];

    /// Dataset column backing this level
    pub fn column(&self) -> &'static str {
        match self {
            Level::Project => PROJECT_COLUMN,
            Level::Meeting => MEETING_COLUMN,
            Level::Speaker => SPEAKER_COLUMN,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Level::Project => "Project",
            Level::Meeting => "Meeting",
            Level::Speaker => "Speaker",
        }
    }

    /// All levels this one depends on, nearest last
    pub fn ancestors(&self) -> &'static [Level] {
        match self {
            Level::Project => &[],
            Level::Meeting => &[Level::Project],
            Level::Speaker => &[Level::Project, Level::Meeting],
        }
    }

    pub fn key(&self, row: &Row<'_>) -> i64 {
        match self {
            Level::Project => row.project(),
            Level::Meeting => row.meeting(),
            Level::Speaker => row.speaker(),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Project => "project",
            Level::Meeting => "meeting",
            Level::Speaker => "speaker",
        })
    }
}

/// A dropdown entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: i64,
}

impl DropdownOption {
    pub fn new(level: Level, value: i64) -> Self {
        Self {
            label: format!("{} {}", level.label(), value),
            value,
        }
    }
}

/// How much of the cascade is filled in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeState {
    NoneSelected,
    Partial,
    Full,
}

/// Selected identifiers per level. An empty set means "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default)]
    pub project: BTreeSet<i64>,
    #[serde(default)]
    pub meeting: BTreeSet<i64>,
    #[serde(default)]
    pub speaker: BTreeSet<i64>,
}

impl Selection {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with<I>(mut self, level: Level, values: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        *self.get_mut(level) = values.into_iter().collect();
        self
    }

    pub fn get(&self, level: Level) -> &BTreeSet<i64> {
        match level {
            Level::Project => &self.project,
            Level::Meeting => &self.meeting,
            Level::Speaker => &self.speaker,
        }
    }

    pub fn get_mut(&mut self, level: Level) -> &mut BTreeSet<i64> {
        match level {
            Level::Project => &mut self.project,
            Level::Meeting => &mut self.meeting,
            Level::Speaker => &mut self.speaker,
        }
    }

    pub fn is_empty(&self) -> bool {
        Level::ALL.iter().all(|l| self.get(*l).is_empty())
    }

    pub fn cascade_state(&self) -> CascadeState {
        let filled = Level::ALL
            .iter()
            .filter(|l| !self.get(**l).is_empty())
            .count();
        match filled {
            0 => CascadeState::NoneSelected,
            n if n == Level::ALL.len() => CascadeState::Full,
            _ => CascadeState::Partial,
        }
    }

    /// True if the row satisfies every non-empty level
    pub fn matches(&self, row: &Row<'_>) -> bool {
        self.matches_levels(row, &Level::ALL)
    }

    fn matches_levels(&self, row: &Row<'_>, levels: &[Level]) -> bool {
        levels.iter().all(|level| {
            let selected = self.get(*level);
            selected.is_empty() || selected.contains(&level.key(row))
        })
    }
}

/// Valid options at `level` given the current selection.
///
/// Values keep the order in which they first appear in the dataset.
pub fn options_for(dataset: &Dataset, level: Level, selection: &Selection) -> Vec<DropdownOption> {
    let ancestors = level.ancestors();
    if ancestors.iter().any(|l| selection.get(*l).is_empty()) {
        return Vec::new();
    }

    let values: IndexSet<i64> = dataset
        .rows()
        .filter(|row| selection.matches_levels(row, ancestors))
        .map(|row| level.key(&row))
        .collect();

    values
        .into_iter()
        .map(|value| DropdownOption::new(level, value))
        .collect()
}

/// Drop selected values that are no longer offered, top-down.
pub fn normalize(dataset: &Dataset, selection: &Selection) -> Selection {
    let mut normalized = Selection::empty();
    for level in Level::ALL {
        let offered: BTreeSet<i64> = options_for(dataset, level, &normalized)
            .into_iter()
            .map(|opt| opt.value)
            .collect();
        *normalized.get_mut(level) = selection
            .get(level)
            .intersection(&offered)
            .copied()
            .collect();
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DatasetBuilder;

    fn dataset() -> Dataset {
        let mut b = DatasetBuilder::new(["degree_centrality"]);
        b.push(1, 3, 1, &[Some(1.0)]).unwrap();
        b.push(1, 1, 2, &[Some(2.0)]).unwrap();
        b.push(1, 3, 2, &[Some(3.0)]).unwrap();
        b.push(2, 2, 7, &[Some(4.0)]).unwrap();
        b.push(2, 3, 8, &[Some(5.0)]).unwrap();
        b.build()
    }

    fn values(options: &[DropdownOption]) -> Vec<i64> {
        options.iter().map(|o| o.value).collect()
    }

    #[test]
    fn test_project_options_list_every_project() {
        let ds = dataset();
        let options = options_for(&ds, Level::Project, &Selection::empty());
        assert_eq!(values(&options), vec![1, 2]);
        assert_eq!(options[0].label, "Project 1");
    }

    #[test]
    fn test_meeting_options_follow_projects() {
        let ds = dataset();
        assert!(options_for(&ds, Level::Meeting, &Selection::empty()).is_empty());

        let sel = Selection::empty().with(Level::Project, [1]);
        assert_eq!(values(&options_for(&ds, Level::Meeting, &sel)), vec![3, 1]);

        let sel = Selection::empty().with(Level::Project, [1, 2]);
        assert_eq!(values(&options_for(&ds, Level::Meeting, &sel)), vec![3, 1, 2]);
    }

    #[test]
    fn test_speaker_options_need_meetings() {
        let ds = dataset();
        let sel = Selection::empty().with(Level::Project, [1]);
        assert!(options_for(&ds, Level::Speaker, &sel).is_empty());

        let sel = sel.with(Level::Meeting, [3]);
        let options = options_for(&ds, Level::Speaker, &sel);
        assert_eq!(values(&options), vec![1, 2]);
        assert_eq!(options[1].label, "Speaker 2");

        // meetings without a project still offer nothing
        let sel = Selection::empty().with(Level::Meeting, [3]);
        assert!(options_for(&ds, Level::Speaker, &sel).is_empty());
    }

    #[test]
    fn test_cascade_state() {
        assert_eq!(Selection::empty().cascade_state(), CascadeState::NoneSelected);
        let sel = Selection::empty().with(Level::Project, [1]);
        assert_eq!(sel.cascade_state(), CascadeState::Partial);
        let sel = sel.with(Level::Meeting, [3]).with(Level::Speaker, [2]);
        assert_eq!(sel.cascade_state(), CascadeState::Full);
    }

    #[test]
    fn test_normalize_drops_stale_values() {
        let ds = dataset();
        let sel = Selection::empty()
            .with(Level::Project, [2, 9])
            .with(Level::Meeting, [1, 3])
            .with(Level::Speaker, [2, 8]);

        let normalized = normalize(&ds, &sel);
        assert_eq!(normalized.project, BTreeSet::from([2]));
        assert_eq!(normalized.meeting, BTreeSet::from([3]));
        assert_eq!(normalized.speaker, BTreeSet::from([8]));

        // clearing meetings clears speakers
        let sel = Selection::empty()
            .with(Level::Project, [1])
            .with(Level::Speaker, [1]);
        assert!(normalize(&ds, &sel).speaker.is_empty());
    }

    #[test]
    fn test_level_names() {
        assert_eq!(Level::Speaker.to_string(), "speaker");
        assert_eq!(Level::Meeting.column(), MEETING_COLUMN);
        assert_eq!(Level::Speaker.ancestors(), &[Level::Project, Level::Meeting]);
    }
}
