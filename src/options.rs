//! Export job options.
//!
//! Options are plain serde data so they can come from a JSON file, a template
//! parameter map or code. Required keys are the database coordinates, the query
//! and the output prefix; everything else has a default.
//!
//! ```
//! use rowcast::options::ExportOptions;
//! use rowcast::validation::Validate;
//!
//! let opts = ExportOptions::from_json_str(r#"{
//!     "project_id": "p", "instance_id": "i", "database_id": "d",
//!     "sql_query": "SELECT 1", "output": "out/rows"
//! }"#).unwrap();
//! assert!(opts.validate().is_ok());
//! assert_eq!(opts.output_path().to_str(), Some("out/rows.csv"));
//! ```

use crate::encode::OutputFormat;
use crate::source::RpcPriority;
use crate::validation::{
    RowErrorPolicy, Validate, ValidationError, ValidationResult, combine_validations, not_empty,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const COMPRESSION_EXTENSIONS: &[&str] = &[".gz", ".gzip", ".zst", ".zstd", ".bz2", ".bzip2", ".xz"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    pub project_id: String,
    pub instance_id: String,
    pub database_id: String,
    pub sql_query: String,
    /// Output path prefix; the format suffix is appended by [`Self::output_path`].
    pub output: String,
    #[serde(default)]
    pub priority: RpcPriority,
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default)]
    pub on_row_error: RowErrorPolicy,
}

fn default_delimiter() -> char {
    ','
}

impl ExportOptions {
    pub fn new(
        project_id: impl Into<String>,
        instance_id: impl Into<String>,
        database_id: impl Into<String>,
        sql_query: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            instance_id: instance_id.into(),
            database_id: database_id.into(),
            sql_query: sql_query.into(),
            output: output.into(),
            priority: RpcPriority::default(),
            format: OutputFormat::default(),
            delimiter: default_delimiter(),
            on_row_error: RowErrorPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: RpcPriority) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_row_error_policy(mut self, policy: RowErrorPolicy) -> Self {
        self.on_row_error = policy;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("parse export options")
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read options {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// The single output file: `output` plus the format suffix.
    ///
    /// The suffix is not doubled when `output` already carries it, optionally
    /// followed by a compression extension (`rows.csv.gz`).
    pub fn output_path(&self) -> PathBuf {
        let lower = self.output.to_ascii_lowercase();
        let stem = COMPRESSION_EXTENSIONS
            .iter()
            .find_map(|ext| lower.strip_suffix(ext))
            .unwrap_or(&lower);
        if stem.ends_with(self.format.suffix()) {
            PathBuf::from(&self.output)
        } else {
            PathBuf::from(format!("{}{}", self.output, self.format.suffix()))
        }
    }

    /// Delimiter as a byte. Only meaningful after [`Validate::validate`] passed.
    pub fn delimiter_byte(&self) -> u8 {
        u8::try_from(self.delimiter).unwrap_or(b',')
    }
}

impl Validate for ExportOptions {
    fn validate(&self) -> ValidationResult {
        let mut results = vec![
            not_empty("project_id", &self.project_id),
            not_empty("instance_id", &self.instance_id),
            not_empty("database_id", &self.database_id),
            not_empty("sql_query", &self.sql_query),
            not_empty("output", &self.output),
        ];
        let d = self.delimiter;
        if !d.is_ascii() || matches!(d, '"' | '\n' | '\r') {
            results.push(Err(vec![ValidationError::field(
                "delimiter",
                format!("{d:?} cannot delimit CSV fields"),
            )]));
        }
        combine_validations(results)
    }
}
