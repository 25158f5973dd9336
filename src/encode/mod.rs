//! Row-level encoders.
//!
//! A [`RecordEncoder`] turns one [`Record`] into one self-contained line of text:
//!
//! - [`CsvEncoder`] - one field per schema column, every non-null field quoted,
//!   NULL as an empty unquoted field.
//! - [`JsonEncoder`] - one JSON object, NULL fields omitted at every nesting level.
//!
//! Neither encoder appends a record separator; that is the sink's job.
//!
//! Both encoders resolve the per-column renderer plan through a [`ShapeCache`],
//! keyed by schema, so classification runs once per distinct record shape.

pub mod csv;
pub mod json;

pub use self::csv::CsvEncoder;
pub use self::json::JsonEncoder;

use crate::error::{ConvertError, ConvertResult};
use crate::types::{RendererKey, Schema, classify};
use crate::value::Record;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Converts one record into one line of text.
///
/// Implementations are pure: the same record always produces byte-identical
/// output, and an encoder can be shared across threads.
pub trait RecordEncoder: Send + Sync {
    /// Encode `record` as a single line without a trailing separator.
    ///
    /// # Errors
    /// Any [`ConvertError`] aborts the whole row; no partial line is returned.
    fn encode(&self, record: &Record) -> ConvertResult<String>;

    /// The output format this encoder produces.
    fn format(&self) -> OutputFormat;
}

/// Output text format of an export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    /// File suffix appended to the output prefix.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Csv => ".csv",
            Self::Json => ".jsonl",
        }
    }

    /// Construct an encoder for this format. `delimiter` only affects CSV.
    pub fn encoder(self, delimiter: u8) -> Box<dyn RecordEncoder> {
        match self {
            Self::Csv => Box::new(CsvEncoder::with_delimiter(delimiter)),
            Self::Json => Box::new(JsonEncoder::new()),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => f.write_str("csv"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Classify every column of `schema`, in schema order.
///
/// # Errors
/// The first column whose type does not classify, tagged with its name.
pub fn build_plan(schema: &Schema) -> ConvertResult<Arc<[RendererKey]>> {
    schema
        .fields()
        .iter()
        .map(|field| classify(&field.code).map_err(|e| e.in_field(&field.name)))
        .collect()
}

/// Memoized renderer plans per record shape.
///
/// Lookups take a read lock; a missing plan is built outside any lock and then
/// inserted with `or_insert`, so racing first builds for one shape all end up
/// with the same plan. Recomputing a plan is always equivalent to reusing it.
#[derive(Debug, Default)]
pub struct ShapeCache {
    plans: RwLock<HashMap<Arc<Schema>, Arc<[RendererKey]>>>,
}

impl ShapeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer plan for `schema`, building and caching it on first use.
    ///
    /// # Errors
    /// Failures are not cached; every row of an unsupported shape fails again.
    pub fn plan(&self, schema: &Arc<Schema>) -> ConvertResult<Arc<[RendererKey]>> {
        let cached = self
            .plans
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(schema)
            .cloned();
        if let Some(plan) = cached {
            return Ok(plan);
        }

        let plan = build_plan(schema)?;
        debug!(columns = schema.len(), "built renderer plan for new record shape");
        let mut plans = self.plans.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(plans.entry(Arc::clone(schema)).or_insert(plan)))
    }

    /// Number of distinct shapes cached so far.
    pub fn len(&self) -> usize {
        self.plans.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.plans
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Reject `STRUCT` and `ARRAY<STRUCT>` columns, which only have a JSON form.
pub(crate) fn reject_record_columns(schema: &Schema, plan: &[RendererKey]) -> ConvertResult<()> {
    for (field, key) in schema.fields().iter().zip(plan) {
        if matches!(
            key,
            RendererKey::Record | RendererKey::Array(crate::types::ElementKey::Record)
        ) {
            return Err(ConvertError::unsupported(field.code.clone()).in_field(&field.name));
        }
    }
    Ok(())
}
