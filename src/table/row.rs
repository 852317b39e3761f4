//! Flat, string-valued records.

use std::fmt;

use serde_json::Value;

/// Errors decoding a service response into rows.
#[derive(Debug, thiserror::Error)]
pub enum RowDecodeError {
    #[error("Response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a JSON array of records, got {0}")]
    NotAnArray(&'static str),

    #[error("Element {index} is not a record, got {kind}")]
    NotARecord { index: usize, kind: &'static str },

    #[error("Element {index} has nested value in column '{column}'")]
    NestedValue { index: usize, column: String },
}

/// An ordered mapping from column name to value.
///
/// Column order is kept for display; equality ignores it, so two rows are
/// equal when they carry the same columns with the same values.
#[derive(Debug, Clone, Default)]
pub struct Row {
    fields: Vec<(String, String)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from pairs. A repeated column keeps its first position
    /// and takes the last value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut row = Self::new();
        for (column, value) in pairs {
            row.insert(column, value);
        }
        row
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(c, _)| *c == column) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(c, v)| (c.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Decode a JSON body holding an array of flat records.
    pub fn decode_all(body: &[u8]) -> Result<Vec<Row>, RowDecodeError> {
        let value: Value = serde_json::from_slice(body)?;
        let elements = match value {
            Value::Array(elements) => elements,
            other => return Err(RowDecodeError::NotAnArray(kind_of(&other))),
        };

        elements
            .into_iter()
            .enumerate()
            .map(|(index, element)| Row::from_json(index, element))
            .collect()
    }

    /// Scalars are rendered as their JSON text, `null` as an empty cell.
    fn from_json(index: usize, element: Value) -> Result<Row, RowDecodeError> {
        let record = match element {
            Value::Object(record) => record,
            other => {
                return Err(RowDecodeError::NotARecord {
                    index,
                    kind: kind_of(&other),
                })
            }
        };

        let mut row = Row::new();
        for (column, value) in record {
            let cell = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(RowDecodeError::NestedValue { index, column });
                }
            };
            row.fields.push((column, cell));
        }
        Ok(row)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(c, v)| other.get(c) == Some(v))
    }
}

impl Eq for Row {}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (column, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{column}={value}")?;
        }
        f.write_str("}")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Row::from_pairs(iter)
    }
}
