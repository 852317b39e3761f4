//! Tabular state: rows, expected tables, projection and diffing.

mod diff;
mod expected;
mod projection;
mod row;

pub use diff::{diff, TableDiff};
pub use expected::{ExpectedTable, TableError};
pub use projection::ColumnProjection;
pub use row::{Row, RowDecodeError};
