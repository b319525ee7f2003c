//! Columnar storage for metric values.
//!
//! Every metric lives in its own contiguous column indexed by row number,
//! so a view only touches the one column it plots.

use indexmap::IndexMap;

/// A single numeric metric column. Missing or unparsable cells are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricColumn {
    values: Vec<Option<f64>>,
}

impl MetricColumn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: Option<f64>) {
        self.values.push(value.filter(|v| v.is_finite()));
    }

    pub fn get(&self, idx: usize) -> Option<f64> {
        self.values.get(idx).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Manages the metric columns of a dataset, keyed by CSV header name.
///
/// Column order follows the header order of the source file.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ColumnStore {
    columns: IndexMap<String, MetricColumn>,
}

impl ColumnStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty column. Re-registering an existing name is a no-op.
    pub fn add_column(&mut self, name: impl Into<String>) {
        self.columns.entry(name.into()).or_default();
    }

    pub fn column(&self, name: &str) -> Option<&MetricColumn> {
        self.columns.get(name)
    }

    pub fn column_at_mut(&mut self, position: usize) -> Option<&mut MetricColumn> {
        self.columns.get_index_mut(position).map(|(_, col)| col)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Build a new store holding only the given rows, in the given order
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|(name, col)| {
                let mut selected = MetricColumn::with_capacity(rows.len());
                for &idx in rows {
                    selected.push(col.get(idx));
                }
                (name.clone(), selected)
            })
            .collect();
        Self { columns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_drops_non_finite_values() {
        let mut col = MetricColumn::new();
        col.push(Some(1.5));
        col.push(Some(f64::NAN));
        col.push(None);
        col.push(Some(f64::INFINITY));

        assert_eq!(col.len(), 4);
        assert_eq!(col.get(0), Some(1.5));
        assert_eq!(col.get(1), None);
        assert_eq!(col.get(3), None);
        assert_eq!(col.get(10), None);
    }

    #[test]
    fn test_store_keeps_header_order() {
        let mut store = ColumnStore::new();
        store.add_column("gini_coefficient");
        store.add_column("degree_centrality");
        store.add_column("gini_coefficient");

        let names: Vec<&str> = store.names().collect();
        assert_eq!(names, vec!["gini_coefficient", "degree_centrality"]);
        assert_eq!(store.width(), 2);
    }

    #[test]
    fn test_select_rows() {
        let mut store = ColumnStore::new();
        store.add_column("score");
        let col = store.column_at_mut(0).unwrap();
        col.push(Some(1.0));
        col.push(Some(2.0));
        col.push(None);

        let selected = store.select_rows(&[2, 0]);
        let col = selected.column("score").unwrap();
        assert_eq!(col.len(), 2);
        assert_eq!(col.get(0), None);
        assert_eq!(col.get(1), Some(1.0));
    }
}
