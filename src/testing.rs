//! Test helpers: a fluent [`RecordBuilder`] and ready-made record fixtures.
//!
//! ```
//! use rowcast::testing::RecordBuilder;
//! use rowcast::{CsvEncoder, RecordEncoder, TypeCode};
//!
//! let rec = RecordBuilder::new()
//!     .field("id", TypeCode::Int64, 1i64)
//!     .null("note", TypeCode::String)
//!     .build()
//!     .unwrap();
//! assert_eq!(CsvEncoder::new().encode(&rec).unwrap(), "\"1\",");
//! ```

use crate::error::{ConvertError, ConvertResult};
use crate::types::{Field, Schema, TypeCode};
use crate::value::{Record, Value};
use chrono::{DateTime, NaiveDate, Utc};

/// Builds a [`Record`] and its schema one column at a time.
#[derive(Debug, Default, Clone)]
pub struct RecordBuilder {
    fields: Vec<Field>,
    values: Vec<Value>,
}

impl RecordBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column with a value.
    #[must_use]
    pub fn field(mut self, name: &str, code: TypeCode, value: impl Into<Value>) -> Self {
        self.fields.push(Field::new(name, code));
        self.values.push(value.into());
        self
    }

    /// Append a NULL column.
    #[must_use]
    pub fn null(self, name: &str, code: TypeCode) -> Self {
        self.field(name, code, Value::Null)
    }

    /// # Errors
    /// Duplicate column names.
    pub fn build(self) -> ConvertResult<Record> {
        let schema = Schema::new(self.fields)?.into_shared();
        Record::new(schema, self.values)
    }
}

/// Array value from anything convertible to [`Value`], `None` as a null element.
pub fn array<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Value {
    Value::Array(items.into_iter().map(Into::into).collect())
}

/// Parse an RFC 3339 timestamp into UTC.
pub fn timestamp(text: &str) -> ConvertResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| ConvertError::malformed("RFC 3339 timestamp", e.to_string()))
}

pub fn date(text: &str) -> ConvertResult<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|e| ConvertError::malformed("YYYY-MM-DD date", e.to_string()))
}

/// The mixed-type row used throughout the docs:
/// `{id: 42, name: "Al, ice", tags: ["a", null, "b"], when: 2024-01-01T00:00:00Z, note: NULL}`.
pub fn type_coverage_record() -> ConvertResult<Record> {
    RecordBuilder::new()
        .field("id", TypeCode::Int64, 42i64)
        .field("name", TypeCode::String, "Al, ice")
        .field(
            "tags",
            TypeCode::array(TypeCode::String),
            array([Some("a"), None, Some("b")]),
        )
        .field("when", TypeCode::Timestamp, timestamp("2024-01-01T00:00:00Z")?)
        .null("note", TypeCode::String)
        .build()
}

/// Three rows of one order-like shape covering every scalar type.
pub fn sample_records() -> ConvertResult<Vec<Record>> {
    let row = |id: i64,
               paid: Option<bool>,
               total: Option<f64>,
               placed: &str,
               payload: Option<&[u8]>|
     -> ConvertResult<Record> {
        RecordBuilder::new()
            .field("order_id", TypeCode::Int64, id)
            .field("paid", TypeCode::Bool, paid)
            .field("total", TypeCode::Float64, total)
            .field("weight", TypeCode::Float32, 1.25f32)
            .field("amount", TypeCode::NumericText, format!("{id}.50"))
            .field("status", TypeCode::Enum, id % 3)
            .field("placed_on", TypeCode::Date, date(placed)?)
            .field("meta", TypeCode::JsonText, format!(r#"{{"src":"web","n":{id}}}"#))
            .field("payload", TypeCode::Bytes, payload.map(<[u8]>::to_vec))
            .field("proto", TypeCode::ProtoBytes, vec![0x08, id as u8])
            .build()
    };
    Ok(vec![
        row(1, Some(true), Some(19.99), "2024-03-01", Some(&b"hello"[..]))?,
        row(2, Some(false), None, "2024-03-02", None)?,
        row(3, None, Some(0.5), "2024-03-03", Some(&[0xff, 0xfe][..]))?,
    ])
}
