//! A single parsed source row.

use chrono::NaiveDate;

use crate::error_handling::ParseError;

use super::schema::Schema;

/// One row of a source file, keyed by the schema's column names.
///
/// Empty fields are stored as `None`, so "absent" stays distinguishable from
/// zero or the empty string.
#[derive(Debug, Clone)]
pub struct Record {
    schema: &'static Schema,
    values: Vec<Option<String>>,
}

impl Record {
    pub(crate) fn new(schema: &'static Schema, values: Vec<Option<String>>) -> Self {
        debug_assert_eq!(schema.columns.len(), values.len());
        Self { schema, values }
    }

    /// Builds a record from `(column, value)` pairs; unspecified columns are absent.
    pub fn from_pairs(schema: &'static Schema, pairs: &[(&str, &str)]) -> Self {
        let mut values = vec![None; schema.columns.len()];
        for (column, value) in pairs {
            if let Some(index) = schema.position(column) {
                values[index] = normalize(value);
            }
        }
        Self { schema, values }
    }

    /// Raw text of a column, `None` when empty.
    pub fn text(&self, column: &str) -> Option<&str> {
        let index = self.schema.position(column);
        debug_assert!(
            index.is_some(),
            "column '{}' is not part of the {} schema",
            column,
            self.schema.name
        );
        index.and_then(|i| self.values[i].as_deref())
    }

    pub fn required_text(&self, column: &str) -> Result<&str, ParseError> {
        self.text(column)
            .ok_or_else(|| ParseError::MissingValue(column.to_string()))
    }

    pub fn integer(&self, column: &str) -> Result<Option<i64>, ParseError> {
        self.parsed(column, |v| v.parse::<i64>().ok())
    }

    pub fn required_integer(&self, column: &str) -> Result<i64, ParseError> {
        self.integer(column)?
            .ok_or_else(|| ParseError::MissingValue(column.to_string()))
    }

    pub fn float(&self, column: &str) -> Result<Option<f64>, ParseError> {
        self.parsed(column, |v| v.parse::<f64>().ok())
    }

    /// Parses a `YYYY-MM-DD` column.
    pub fn date(&self, column: &str) -> Result<Option<NaiveDate>, ParseError> {
        self.parsed(column, |v| NaiveDate::parse_from_str(v, "%Y-%m-%d").ok())
    }

    fn parsed<T>(
        &self,
        column: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<Option<T>, ParseError> {
        match self.text(column) {
            None => Ok(None),
            Some(raw) => parse(raw.trim())
                .map(Some)
                .ok_or_else(|| ParseError::InvalidValue {
                    column: column.to_string(),
                    value: raw.to_string(),
                }),
        }
    }
}

/// Empty and whitespace-only fields become `None`.
pub(crate) fn normalize(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}
