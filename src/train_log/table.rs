//! Metric Table - step-indexed rows of named scalar metrics
//!
//! Rows keep the order in which their step was first recorded; columns keep
//! the order in which each metric name was first seen. Recording into an
//! existing step merges into that row (last write wins per column).

use super::MetricValue;
use rustc_hash::FxHashMap;

/// One row: metric name -> value.
pub type MetricRow = FxHashMap<String, MetricValue>;

/// In-memory table of metrics keyed by training step.
///
/// ## Example
///
/// ```rust
/// use runlog::train_log::{MetricTable, MetricValue};
///
/// let mut table = MetricTable::new();
/// table.merge(10, [("loss".to_string(), MetricValue::Float(0.9))]);
/// table.merge(10, [("lr".to_string(), MetricValue::Float(1e-3))]);
///
/// assert_eq!(table.len(), 1);
/// assert_eq!(table.columns(), ["loss", "lr"]);
/// assert_eq!(table.value(10, "loss"), Some(MetricValue::Float(0.9)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricTable {
    rows: Vec<(i64, MetricRow)>,
    index: FxHashMap<i64, usize>,
    columns: Vec<String>,
}

impl MetricTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of steps (rows).
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no step has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Merge `fields` into the row for `step`, creating the row if needed.
    ///
    /// Existing columns of the row that are not in `fields` are kept.
    pub fn merge<I>(&mut self, step: i64, fields: I)
    where
        I: IntoIterator<Item = (String, MetricValue)>,
    {
        let slot = match self.index.get(&step) {
            Some(&slot) => slot,
            None => {
                self.rows.push((step, MetricRow::default()));
                self.index.insert(step, self.rows.len() - 1);
                self.rows.len() - 1
            }
        };

        let row = &mut self.rows[slot].1;
        for (name, value) in fields {
            if !row.contains_key(&name) && !self.columns.contains(&name) {
                self.columns.push(name.clone());
            }
            row.insert(name, value);
        }
    }

    /// Register a column without a value so that schema order survives a
    /// reload even when no early row carries it.
    pub(crate) fn ensure_column(&mut self, name: &str) {
        if !self.columns.iter().any(|c| c == name) {
            self.columns.push(name.to_string());
        }
    }

    /// Steps in first-insertion order.
    pub fn steps(&self) -> impl Iterator<Item = i64> + '_ {
        self.rows.iter().map(|(step, _)| *step)
    }

    /// Rows in first-insertion order.
    pub fn rows(&self) -> impl Iterator<Item = (i64, &MetricRow)> + '_ {
        self.rows.iter().map(|(step, row)| (*step, row))
    }

    /// Union of all metric names, in first-seen order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row for `step`, if recorded.
    #[must_use]
    pub fn row(&self, step: i64) -> Option<&MetricRow> {
        self.index.get(&step).map(|&slot| &self.rows[slot].1)
    }

    /// Single cell lookup.
    #[must_use]
    pub fn value(&self, step: i64, column: &str) -> Option<MetricValue> {
        self.row(step).and_then(|row| row.get(column).copied())
    }
}
