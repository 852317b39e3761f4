//! Column projection for snapshots carrying extra bookkeeping fields.

use super::expected::ExpectedTable;
use super::row::Row;

/// Restricts rows to a named subset of columns.
///
/// Projected rows list their columns in projection order. Applying the
/// same projection twice yields the same rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnProjection {
    columns: Vec<String>,
}

impl ColumnProjection {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Project onto the columns an expected table declares.
    pub fn onto(expected: &ExpectedTable) -> Self {
        Self::new(expected.columns().iter().cloned())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Columns absent from `row` stay absent.
    pub fn apply(&self, row: &Row) -> Row {
        self.columns
            .iter()
            .filter_map(|column| row.get(column).map(|value| (column.as_str(), value)))
            .collect()
    }

    pub fn apply_all(&self, rows: &[Row]) -> Vec<Row> {
        rows.iter().map(|row| self.apply(row)).collect()
    }
}
