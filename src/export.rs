//! Export driver: source -> converter -> sink.
//!
//! [`run_export`] validates the options, reads every row from the
//! [`RecordSource`], converts each row with the encoder for the configured
//! [`OutputFormat`] and writes the lines to one output file. Rows are written in
//! the order the source returned them, whatever the [`ExecMode`].
//!
//! Nothing is written until every row has been converted, so a fail-fast run
//! that hits a bad row leaves no truncated file behind.

use crate::encode::{OutputFormat, RecordEncoder};
use crate::error::ConvertResult;
use crate::options::ExportOptions;
use crate::sink::write_lines;
use crate::source::{ReadRequest, RecordSource};
use crate::validation::{
    RejectedRow, RowErrorCollector, RowErrorPolicy, Validate, ValidationErrors,
};
use crate::value::Record;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// How rows are converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// Convert rows one after another on the calling thread.
    Sequential,
    /// Convert contiguous chunks of rows on the rayon pool. `partitions`
    /// defaults to `2 * num_cpus`, clamped to the row count.
    Parallel { partitions: Option<usize> },
}

impl Default for ExecMode {
    fn default() -> Self {
        Self::Parallel { partitions: None }
    }
}

/// Outcome of a completed export.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub rows_read: usize,
    pub rows_written: usize,
    /// Rows left out under [`RowErrorPolicy::SkipAndCollect`].
    pub rejected: RowErrorCollector,
}

/// Encode every record, keeping input order. One result per record.
pub fn encode_all(
    encoder: &dyn RecordEncoder,
    records: &[Record],
    mode: ExecMode,
) -> Vec<ConvertResult<String>> {
    match mode {
        ExecMode::Sequential => records.iter().map(|r| encoder.encode(r)).collect(),
        ExecMode::Parallel { partitions } => encode_par(encoder, records, partitions),
    }
}

#[cfg(feature = "parallel-io")]
fn encode_par(
    encoder: &dyn RecordEncoder,
    records: &[Record],
    partitions: Option<usize>,
) -> Vec<ConvertResult<String>> {
    use rayon::prelude::*;
    let n = records.len();
    if n == 0 {
        return Vec::new();
    }
    let parts = partitions
        .unwrap_or_else(|| 2 * num_cpus::get().max(2))
        .clamp(1, n);
    let chunk = n.div_ceil(parts);

    // Chunks come back in index order, so flattening restores row order.
    records
        .par_chunks(chunk)
        .map(|rows| rows.iter().map(|r| encoder.encode(r)).collect::<Vec<_>>())
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}

#[cfg(not(feature = "parallel-io"))]
fn encode_par(
    encoder: &dyn RecordEncoder,
    records: &[Record],
    _partitions: Option<usize>,
) -> Vec<ConvertResult<String>> {
    records.iter().map(|r| encoder.encode(r)).collect()
}

/// Encode every record, failing on the first bad row (by row index).
///
/// # Errors
/// The first row's [`ConvertError`](crate::ConvertError), with the row number
/// as context.
pub fn convert_rows(
    encoder: &dyn RecordEncoder,
    records: &[Record],
    mode: ExecMode,
) -> Result<Vec<String>> {
    encode_all(encoder, records, mode)
        .into_iter()
        .enumerate()
        .map(|(i, res)| res.with_context(|| format!("convert row #{}", i + 1)))
        .collect()
}

/// Apply `policy` to per-row results, returning the good lines and the
/// rejected rows.
fn apply_policy(
    results: Vec<ConvertResult<String>>,
    policy: RowErrorPolicy,
) -> Result<(Vec<String>, RowErrorCollector)> {
    let mut lines = Vec::with_capacity(results.len());
    let mut rejected = RowErrorCollector::new();
    for (i, res) in results.into_iter().enumerate() {
        match (res, policy) {
            (Ok(line), _) => lines.push(line),
            (Err(e), RowErrorPolicy::FailFast) => {
                return Err(e).with_context(|| format!("convert row #{}", i + 1));
            }
            (Err(e), RowErrorPolicy::SkipAndCollect) => {
                warn!(row = i, error = %e, "skipping row that failed to convert");
                rejected.add(RejectedRow::new(i, &e));
            }
        }
    }
    Ok((lines, rejected))
}

/// Run one export job end to end.
///
/// # Errors
/// Invalid options, a failed read, a row conversion failure under
/// [`RowErrorPolicy::FailFast`], or a sink write failure.
pub fn run_export(
    source: &dyn RecordSource,
    options: &ExportOptions,
    mode: ExecMode,
) -> Result<ExportSummary> {
    options.validate().map_err(ValidationErrors)?;
    let path = options.output_path();
    let request = ReadRequest::from(options);
    info!(
        database = %options.database_id,
        priority = %request.priority,
        format = %options.format,
        path = %path.display(),
        "starting export"
    );
    let started = Instant::now();

    let records = source
        .read(&request)
        .with_context(|| format!("read from database {}", options.database_id))?;
    let encoder = options.format.encoder(options.delimiter_byte());
    let results = encode_all(encoder.as_ref(), &records, mode);
    let (lines, rejected) = apply_policy(results, options.on_row_error)?;
    let rows_written = write_lines(&path, &lines)?;

    info!(
        rows_read = records.len(),
        rows_written,
        rejected = rejected.error_count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "export finished"
    );
    Ok(ExportSummary {
        path,
        format: options.format,
        rows_read: records.len(),
        rows_written,
        rejected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::CsvEncoder;
    use crate::types::{Field, Schema, TypeCode};
    use crate::value::Value;
    use std::sync::Arc;

    fn rows(n: i64) -> Vec<Record> {
        let schema = Arc::new(
            Schema::new(vec![
                Field::new("n", TypeCode::Int64),
                Field::new("s", TypeCode::String),
            ])
            .unwrap(),
        );
        (0..n)
            .map(|i| {
                let s = if i % 3 == 0 { Value::Null } else { Value::from(format!("r{i}")) };
                Record::new(Arc::clone(&schema), vec![i.into(), s]).unwrap()
            })
            .collect()
    }

    #[test]
    fn parallel_matches_sequential() -> Result<()> {
        let records = rows(103);
        let enc = CsvEncoder::new();
        let seq = convert_rows(&enc, &records, ExecMode::Sequential)?;
        for partitions in [None, Some(1), Some(7), Some(500)] {
            let par = convert_rows(&enc, &records, ExecMode::Parallel { partitions })?;
            assert_eq!(par, seq);
        }
        assert_eq!(seq[0], "\"0\",");
        assert_eq!(seq[1], "\"1\",\"r1\"");
        Ok(())
    }

    #[test]
    fn first_bad_row_is_reported() {
        let mut records = rows(5);
        let schema = Arc::clone(records[0].schema());
        records[3] = Record::new(schema, vec![Value::from("x"), Value::Null]).unwrap();
        let err = convert_rows(&CsvEncoder::new(), &records, ExecMode::default()).unwrap_err();
        assert_eq!(err.to_string(), "convert row #4");
    }

    #[test]
    fn skip_policy_collects() -> Result<()> {
        let results = vec![
            Ok("a".to_string()),
            Err(crate::ConvertError::malformed("INT64", "STRING").in_field("n")),
            Ok("c".to_string()),
        ];
        let (lines, rejected) = apply_policy(results, RowErrorPolicy::SkipAndCollect)?;
        assert_eq!(lines, vec!["a", "c"]);
        assert_eq!(rejected.rows()[0].row, 1);
        Ok(())
    }
}
