//! CSV line encoder.
//!
//! Every schema column yields exactly one field, in schema order. Non-null
//! fields are always quoted (embedded quotes doubled), so delimiters and line
//! breaks inside a value never split the record. NULL is an empty, unquoted
//! field, which keeps it distinguishable from an empty string (`""`).
//!
//! `STRUCT` and `ARRAY<STRUCT>` columns have no CSV form and fail the row with
//! `UnsupportedType`; callers exporting nested data must use JSON output.

use super::{OutputFormat, RecordEncoder, ShapeCache, reject_record_columns};
use crate::error::{ConvertError, ConvertResult};
use crate::render::csv_text;
use crate::value::Record;
use ::csv::{QuoteStyle, Terminator, WriterBuilder};

/// Encodes records as single CSV lines with no record terminator.
pub struct CsvEncoder {
    delimiter: u8,
    builder: WriterBuilder,
    cache: ShapeCache,
}

impl Default for CsvEncoder {
    fn default() -> Self {
        Self::with_delimiter(b',')
    }
}

impl CsvEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        let mut builder = WriterBuilder::new();
        builder
            .delimiter(delimiter)
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::Any(b'\n'))
            .has_headers(false)
            .buffer_capacity(1024);
        Self {
            delimiter,
            builder,
            cache: ShapeCache::new(),
        }
    }

    /// Header line naming every column, quoted like a data line.
    pub fn header(&self, record: &Record) -> ConvertResult<String> {
        let names = record.schema().fields().iter().map(|f| Some(f.name.as_str()));
        self.join(names)
    }

    /// Join fields into one line. `None` is a NULL field and stays empty and
    /// unquoted; everything else is quoted by a single writer per line.
    fn join<'a>(&self, fields: impl IntoIterator<Item = Option<&'a str>>) -> ConvertResult<String> {
        let mut wtr = self.builder.from_writer(Vec::new());
        let mut spans = Vec::new();
        for field in fields {
            let Some(text) = field else {
                spans.push(None);
                continue;
            };
            let start = wtr.get_ref().len();
            // A record end closes the quote; the span leaves out the terminator.
            wtr.write_record([text])?;
            wtr.flush()?;
            spans.push(Some(start..wtr.get_ref().len() - 1));
        }
        let quoted = wtr.into_inner().map_err(|e| e.into_error())?;

        let mut line = Vec::with_capacity(quoted.len() + spans.len());
        for (i, span) in spans.into_iter().enumerate() {
            if i > 0 {
                line.push(self.delimiter);
            }
            if let Some(span) = span {
                line.extend_from_slice(&quoted[span]);
            }
        }
        into_text(line)
    }
}

fn into_text(line: Vec<u8>) -> ConvertResult<String> {
    String::from_utf8(line).map_err(|e| ConvertError::malformed("UTF-8 text", e.to_string()))
}

impl RecordEncoder for CsvEncoder {
    fn encode(&self, record: &Record) -> ConvertResult<String> {
        let plan = self.cache.plan(record.schema())?;
        reject_record_columns(record.schema(), &plan)?;

        let texts = record
            .iter()
            .zip(plan.iter())
            .map(|((field, value), key)| csv_text(*key, value).map_err(|e| e.in_field(&field.name)))
            .collect::<ConvertResult<Vec<_>>>()?;
        self.join(texts.iter().map(Option::as_deref))
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Csv
    }
}
