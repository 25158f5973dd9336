//! Validation of export options and collection of rejected rows.
//!
//! - [`Validate`] / [`ValidationError`] report every problem in a configuration
//!   at once instead of stopping at the first.
//! - [`RowErrorPolicy`] decides what the export driver does with a row that
//!   fails to convert; [`RowErrorCollector`] keeps the rejected rows when the
//!   policy is not fail-fast.

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Result type for validation operations.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Types that can check their own consistency.
pub trait Validate {
    fn validate(&self) -> ValidationResult;
}

/// A single validation error with context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// The field that failed validation (optional)
    pub field: Option<String>,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    pub fn field<S: Into<String>, M: Into<String>>(field: S, message: M) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field {
            Some(ref field) => write!(f, "[{}] {}", field, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ValidationError {}

/// All errors of one failed validation, usable as a single `anyhow` error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "invalid options: {joined}")
    }
}

impl std::error::Error for ValidationErrors {}

/// Reject an empty (or whitespace-only) string.
pub fn not_empty(field: &str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        Err(vec![ValidationError::field(field, "must not be empty")])
    } else {
        Ok(())
    }
}

/// Combine multiple validation results.
pub fn combine_validations(results: Vec<ValidationResult>) -> ValidationResult {
    let mut all_errors = Vec::new();
    for result in results {
        if let Err(mut errors) = result {
            all_errors.append(&mut errors);
        }
    }
    if all_errors.is_empty() {
        Ok(())
    } else {
        Err(all_errors)
    }
}

/// What the export driver does with a row that fails to convert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowErrorPolicy {
    /// Abort the export on the first bad row; nothing is written.
    #[default]
    FailFast,
    /// Leave bad rows out of the output and record them in a collector.
    SkipAndCollect,
}

/// One row that failed conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRow {
    /// Zero-based position of the row in the source result set.
    pub row: usize,
    /// Dotted path of the offending field, when known.
    pub field: Option<String>,
    pub message: String,
}

impl RejectedRow {
    pub fn new(row: usize, err: &ConvertError) -> Self {
        Self {
            row,
            field: err.field().map(str::to_string),
            message: err.to_string(),
        }
    }
}

/// Collects rejected rows for reporting or a dead-letter file.
#[derive(Debug, Clone, Default)]
pub struct RowErrorCollector {
    rows: Vec<RejectedRow>,
}

impl RowErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, row: RejectedRow) {
        self.rows.push(row);
    }

    pub fn error_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[RejectedRow] {
        &self.rows
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.rows)
    }

    /// Write the rejected rows as a JSON array.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

impl fmt::Display for RowErrorCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RowErrorCollector({} rejected rows)", self.error_count())
    }
}
