//! Expected tables supplied by scenario steps.

use std::collections::HashSet;

use super::diff::{diff, TableDiff};
use super::projection::ColumnProjection;
use super::row::Row;

/// Errors building an expected table from raw cells.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("Table has no header row")]
    Empty,

    #[error("Header has an empty column name at position {0}")]
    BlankColumn(usize),

    #[error("Column '{0}' is declared more than once")]
    DuplicateColumn(String),

    #[error("Row {row} has {found} cells, header declares {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Rows a verification step expects, over a fixed set of declared columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedTable {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl ExpectedTable {
    /// Build from raw cells; the first row holds the column names.
    ///
    /// A header without data rows declares that the service holds nothing.
    pub fn from_cells(cells: &[Vec<String>]) -> Result<Self, TableError> {
        let (header, body) = cells.split_first().ok_or(TableError::Empty)?;

        let columns: Vec<String> = header.iter().map(|c| c.trim().to_string()).collect();
        if columns.is_empty() {
            return Err(TableError::Empty);
        }

        let mut seen = HashSet::new();
        for (position, column) in columns.iter().enumerate() {
            if column.is_empty() {
                return Err(TableError::BlankColumn(position));
            }
            if !seen.insert(column.as_str()) {
                return Err(TableError::DuplicateColumn(column.clone()));
            }
        }

        let rows = body
            .iter()
            .enumerate()
            .map(|(i, cells)| {
                if cells.len() != columns.len() {
                    return Err(TableError::RaggedRow {
                        row: i + 1,
                        expected: columns.len(),
                        found: cells.len(),
                    });
                }
                Ok(columns
                    .iter()
                    .zip(cells)
                    .map(|(column, cell)| (column.clone(), cell.trim().to_string()))
                    .collect())
            })
            .collect::<Result<Vec<Row>, _>>()?;

        Ok(Self { columns, rows })
    }

    /// Declared column names, in declaration order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Compare against `actual`, optionally projected first.
    pub fn diff(&self, actual: &[Row], projection: Option<&ColumnProjection>) -> TableDiff {
        diff(self, actual, projection)
    }
}
