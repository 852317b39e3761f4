//! Multiset comparison of expected tables against live snapshots.

use std::fmt;

use super::expected::ExpectedTable;
use super::projection::ColumnProjection;
use super::row::Row;

/// Outcome of comparing an expected table with a snapshot.
///
/// Empty `missing` and `unexpected` means the two row multisets are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDiff {
    columns: Vec<String>,
    missing: Vec<Row>,
    unexpected: Vec<Row>,
}

impl TableDiff {
    pub fn is_match(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty()
    }

    /// Expected rows with no matching actual row.
    pub fn missing(&self) -> &[Row] {
        &self.missing
    }

    /// Actual rows (after projection) no expected row accounted for.
    pub fn unexpected(&self) -> &[Row] {
        &self.unexpected
    }

    /// `Ok` on a match, the diff itself otherwise.
    pub fn into_result(self) -> Result<(), TableDiff> {
        if self.is_match() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Expected columns first, then any extra columns of unexpected rows.
    fn display_columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        for row in &self.unexpected {
            for column in row.columns() {
                if !columns.contains(&column) {
                    columns.push(column);
                }
            }
        }
        columns
    }
}

/// Compare `expected` with `actual`, projecting `actual` first when asked.
///
/// Rows are matched one-to-one regardless of order; duplicates must appear
/// the same number of times on both sides.
pub fn diff(
    expected: &ExpectedTable,
    actual: &[Row],
    projection: Option<&ColumnProjection>,
) -> TableDiff {
    let actual = match projection {
        Some(projection) => projection.apply_all(actual),
        None => actual.to_vec(),
    };

    let mut claimed = vec![false; actual.len()];
    let mut missing = Vec::new();

    for row in expected.rows() {
        let found = actual
            .iter()
            .enumerate()
            .position(|(i, candidate)| !claimed[i] && candidate == row);
        match found {
            Some(i) => claimed[i] = true,
            None => missing.push(row.clone()),
        }
    }

    let unexpected = actual
        .into_iter()
        .zip(claimed)
        .filter_map(|(row, claimed)| (!claimed).then_some(row))
        .collect();

    TableDiff {
        columns: expected.columns().to_vec(),
        missing,
        unexpected,
    }
}

impl fmt::Display for TableDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_match() {
            return f.write_str("Tables are identical");
        }

        let columns = self.display_columns();
        let lines: Vec<(&str, Vec<&str>)> = std::iter::once(("  ", columns.clone()))
            .chain(self.missing.iter().map(|row| ("- ", cells(row, &columns))))
            .chain(self.unexpected.iter().map(|row| ("+ ", cells(row, &columns))))
            .collect();

        let widths: Vec<usize> = (0..columns.len())
            .map(|i| lines.iter().map(|(_, c)| c[i].chars().count()).max().unwrap_or(0))
            .collect();

        write!(
            f,
            "Tables were not identical ({} missing, {} unexpected):",
            self.missing.len(),
            self.unexpected.len()
        )?;
        for (marker, cells) in &lines {
            write!(f, "\n    {marker}|")?;
            for (cell, width) in cells.iter().zip(&widths) {
                write!(f, " {cell:<width$} |")?;
            }
        }
        Ok(())
    }
}

fn cells<'a>(row: &'a Row, columns: &[&str]) -> Vec<&'a str> {
    columns.iter().map(|c| row.get(c).unwrap_or("")).collect()
}
