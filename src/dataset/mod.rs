//! Meeting-metrics dataset
//!
//! The dataset is a table of per-speaker meeting records:
//! - identifier columns: project, meeting number, speaker number
//! - any number of numeric metric columns (speech frequency, degree
//!   centrality, Gini coefficient, survey scores, ...)
//!
//! It is loaded once at startup and never mutated afterwards; views share it
//! through an `Arc<Dataset>`.

pub mod columnar;
pub mod loader;

pub use columnar::{ColumnStore, MetricColumn};
pub use loader::DatasetLoader;

use thiserror::Error;

/// Header of the project identifier column
pub const PROJECT_COLUMN: &str = "project";
/// Header of the meeting number column
pub const MEETING_COLUMN: &str = "meeting_number";
/// Header of the speaker number column
pub const SPEAKER_COLUMN: &str = "speaker_number";

/// Dataset errors
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Failed to read dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset is missing required column '{0}'")]
    MissingColumn(String),

    #[error("Invalid {column} value '{value}' on line {line}")]
    InvalidIdentifier {
        column: String,
        value: String,
        line: u64,
    },

    #[error("Record has {actual} metric values, expected {expected}")]
    ArityMismatch { expected: usize, actual: usize },
}

pub type DatasetResult<T> = Result<T, DatasetError>;

/// Immutable table of meeting records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    projects: Vec<i64>,
    meetings: Vec<i64>,
    speakers: Vec<i64>,
    metrics: ColumnStore,
}

impl Dataset {
    /// Number of records
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        (index < self.len()).then_some(Row {
            dataset: self,
            index,
        })
    }

    /// Iterate over all records in file order
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        (0..self.len()).map(move |index| Row {
            dataset: self,
            index,
        })
    }

    pub fn metric(&self, name: &str) -> Option<&MetricColumn> {
        self.metrics.column(name)
    }

    pub fn has_metric(&self, name: &str) -> bool {
        self.metrics.contains(name)
    }

    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.metrics.names()
    }

    /// True for identifier columns and metric columns alike
    pub fn has_column(&self, name: &str) -> bool {
        matches!(name, PROJECT_COLUMN | MEETING_COLUMN | SPEAKER_COLUMN) || self.has_metric(name)
    }

    /// Fail unless every named column is present
    pub fn require_columns<'a, I>(&self, names: I) -> DatasetResult<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for name in names {
            if !self.has_column(name) {
                return Err(DatasetError::MissingColumn(name.to_string()));
            }
        }
        Ok(())
    }

    /// Derive a dataset without the records whose `column` equals `value`.
    ///
    /// Records with a missing value in `column` are kept.
    pub fn excluding(&self, column: &str, value: f64) -> DatasetResult<Dataset> {
        if !self.has_column(column) {
            return Err(DatasetError::MissingColumn(column.to_string()));
        }

        let keep: Vec<usize> = self
            .rows()
            .filter(|row| row.value(column) != Some(value))
            .map(|row| row.index())
            .collect();

        Ok(Dataset {
            projects: keep.iter().map(|&i| self.projects[i]).collect(),
            meetings: keep.iter().map(|&i| self.meetings[i]).collect(),
            speakers: keep.iter().map(|&i| self.speakers[i]).collect(),
            metrics: self.metrics.select_rows(&keep),
        })
    }
}

/// Borrowed view of a single record
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    dataset: &'a Dataset,
    index: usize,
}

impl<'a> Row<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn project(&self) -> i64 {
        self.dataset.projects[self.index]
    }

    pub fn meeting(&self) -> i64 {
        self.dataset.meetings[self.index]
    }

    pub fn speaker(&self) -> i64 {
        self.dataset.speakers[self.index]
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.dataset.metric(name).and_then(|col| col.get(self.index))
    }

    /// Numeric value of any column, identifier columns included
    pub fn value(&self, name: &str) -> Option<f64> {
        match name {
            PROJECT_COLUMN => Some(self.project() as f64),
            MEETING_COLUMN => Some(self.meeting() as f64),
            SPEAKER_COLUMN => Some(self.speaker() as f64),
            _ => self.metric(name),
        }
    }
}

/// Incremental builder used by the CSV loader, tests and benchmarks
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    dataset: Dataset,
}

impl DatasetBuilder {
    pub fn new<I, S>(metric_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut metrics = ColumnStore::new();
        for name in metric_names {
            metrics.add_column(name);
        }
        Self {
            dataset: Dataset {
                metrics,
                ..Dataset::default()
            },
        }
    }

    /// Append a record; `values` follow the order of the metric names
    pub fn push(
        &mut self,
        project: i64,
        meeting: i64,
        speaker: i64,
        values: &[Option<f64>],
    ) -> DatasetResult<()> {
        let expected = self.dataset.metrics.width();
        if values.len() != expected {
            return Err(DatasetError::ArityMismatch {
                expected,
                actual: values.len(),
            });
        }

        self.dataset.projects.push(project);
        self.dataset.meetings.push(meeting);
        self.dataset.speakers.push(speaker);
        for (position, value) in values.iter().enumerate() {
            if let Some(col) = self.dataset.metrics.column_at_mut(position) {
                col.push(*value);
            }
        }
        Ok(())
    }

    pub fn build(self) -> Dataset {
        self.dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        let mut builder = DatasetBuilder::new(["degree_centrality", "overall_collaboration_score"]);
        builder.push(1, 1, 1, &[Some(0.5), Some(4.0)]).unwrap();
        builder.push(1, 1, 2, &[Some(0.25), Some(-1.0)]).unwrap();
        builder.push(2, 1, 1, &[None, Some(3.0)]).unwrap();
        builder.build()
    }

    #[test]
    fn test_rows_and_values() {
        let ds = sample();
        assert_eq!(ds.len(), 3);

        let row = ds.row(1).unwrap();
        assert_eq!(row.project(), 1);
        assert_eq!(row.speaker(), 2);
        assert_eq!(row.metric("degree_centrality"), Some(0.25));
        assert_eq!(row.value(MEETING_COLUMN), Some(1.0));
        assert_eq!(row.metric("unknown"), None);
        assert!(ds.row(3).is_none());
    }

    #[test]
    fn test_builder_rejects_wrong_arity() {
        let mut builder = DatasetBuilder::new(["a", "b"]);
        let err = builder.push(1, 1, 1, &[Some(1.0)]).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::ArityMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_require_columns() {
        let ds = sample();
        assert!(ds
            .require_columns([PROJECT_COLUMN, "degree_centrality"])
            .is_ok());
        let err = ds.require_columns(["gini_coefficient"]).unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn(ref c) if c == "gini_coefficient"));
    }

    #[test]
    fn test_excluding_sentinel_rows() {
        let ds = sample();
        let filtered = ds.excluding("overall_collaboration_score", -1.0).unwrap();

        assert_eq!(filtered.len(), 2);
        let speakers: Vec<i64> = filtered.rows().map(|r| r.speaker()).collect();
        assert_eq!(speakers, vec![1, 1]);
        assert_eq!(filtered.row(1).unwrap().project(), 2);
        assert_eq!(filtered.row(1).unwrap().metric("degree_centrality"), None);

        // source is untouched
        assert_eq!(ds.len(), 3);
        assert!(ds.excluding("missing", 0.0).is_err());
    }
}
