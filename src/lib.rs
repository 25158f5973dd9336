//! # Rowcast
//!
//! Converts typed database rows into flat text lines for columnar and text
//! sinks. Each [`Record`] is an ordered list of named, typed, nullable fields
//! (scalars, arrays, nested records) and becomes either:
//!
//! - **one CSV line** - fixed column order from the schema, every non-null field
//!   quoted, NULL as an empty unquoted field, arrays embedded as a JSON literal
//!   in a single field; or
//! - **one JSON object** - nested records as nested objects, NULL fields omitted
//!   at every level, null array elements kept as `null`.
//!
//! ## Quick Start
//!
//! ```
//! use rowcast::testing::type_coverage_record;
//! use rowcast::{CsvEncoder, JsonEncoder, RecordEncoder};
//! # fn main() -> anyhow::Result<()> {
//! let rec = type_coverage_record()?;
//!
//! assert_eq!(
//!     CsvEncoder::new().encode(&rec)?,
//!     r#""42","Al, ice","[""a"",null,""b""]","2024-01-01T00:00:00Z","#
//! );
//! assert_eq!(
//!     JsonEncoder::new().encode(&rec)?,
//!     r#"{"id":42,"name":"Al, ice","tags":["a",null,"b"],"when":"2024-01-01T00:00:00Z"}"#
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Running an export
//!
//! [`run_export`] wires a [`RecordSource`] to an encoder and a single output file:
//!
//! ```no_run
//! use rowcast::*;
//! # fn main() -> anyhow::Result<()> {
//! let source = VecSource::new(testing::sample_records()?);
//! let opts = ExportOptions::new("proj", "inst", "db", "SELECT * FROM orders", "out/orders")
//!     .with_format(OutputFormat::Json);
//! let summary = run_export(&source, &opts, ExecMode::default())?;
//! println!("wrote {} rows to {}", summary.rows_written, summary.path.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel-io` - convert rows on the rayon pool in [`ExecMode::Parallel`]
//! - `compression-gzip`, `compression-zstd`, `compression-bzip2`, `compression-xz` -
//!   compress the output file when its extension asks for it
//!
//! ## Module Overview
//!
//! - [`types`] - type codes, schemas and renderer classification
//! - [`value`] - field values and records
//! - [`render`] - per-type CSV text and JSON value rendering
//! - [`encode`] - the CSV and JSON record encoders and the shape cache
//! - [`options`], [`source`], [`sink`], [`export`] - the export job around the core
//! - [`testing`] - builders and fixtures for tests

pub mod encode;
pub mod error;
pub mod export;
pub mod options;
pub mod render;
pub mod sink;
pub mod source;
pub mod testing;
pub mod types;
pub mod validation;
pub mod value;

pub use encode::{CsvEncoder, JsonEncoder, OutputFormat, RecordEncoder, ShapeCache};
pub use error::{ConvertError, ConvertResult};
pub use export::{ExecMode, ExportSummary, convert_rows, encode_all, run_export};
pub use options::ExportOptions;
pub use sink::write_lines;
pub use source::{ReadRequest, RecordSource, RpcPriority, VecSource};
pub use types::{ElementKey, Field, RendererKey, ScalarKey, Schema, TypeCode, classify};
pub use validation::{RowErrorPolicy, Validate};
pub use value::{Record, Value};
