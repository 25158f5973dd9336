//! Field values and records.

use crate::error::{ConvertError, ConvertResult};
use crate::types::Schema;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

/// One column value as decoded by the source.
///
/// Text-like codes (`STRING`, `NUMERIC_TEXT`, `JSON_TEXT`) all carry
/// [`Value::String`]; `ENUM` carries [`Value::Int64`]; `PROTO_BYTES` carries
/// [`Value::Bytes`]. Array elements may individually be [`Value::Null`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    String(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Array(Vec<Value>),
    Record(Record),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short shape name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Bool(_) => "BOOL",
            Self::Int64(_) => "INT64",
            Self::Float32(_) => "FLOAT32",
            Self::Float64(_) => "FLOAT64",
            Self::String(_) => "STRING",
            Self::Bytes(_) => "BYTES",
            Self::Date(_) => "DATE",
            Self::Timestamp(_) => "TIMESTAMP",
            Self::Array(_) => "ARRAY",
            Self::Record(_) => "STRUCT",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Self::Record(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// One row: a schema plus one value per field, in schema order.
///
/// Records are immutable once built. The schema is shared so that every row of
/// a result set points at the same [`Schema`] allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema: Arc<Schema>,
    values: Vec<Value>,
}

impl Record {
    /// # Errors
    /// [`ConvertError::MalformedValue`] when the value count differs from the
    /// schema's field count.
    pub fn new(schema: Arc<Schema>, values: Vec<Value>) -> ConvertResult<Self> {
        if schema.len() != values.len() {
            return Err(ConvertError::malformed(
                format!("{} values", schema.len()),
                format!("{} values", values.len()),
            ));
        }
        Ok(Self { schema, values })
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema.index_of(name).map(|i| &self.values[i])
    }

    /// `true` for a NULL field; also `true` for a name the schema lacks.
    pub fn is_null(&self, name: &str) -> bool {
        self.get(name).is_none_or(Value::is_null)
    }

    /// Iterate `(field, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&crate::types::Field, &Value)> {
        self.schema.fields().iter().zip(self.values.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Field, TypeCode};

    fn schema() -> Arc<Schema> {
        Schema::new(vec![
            Field::new("id", TypeCode::Int64),
            Field::new("note", TypeCode::String),
        ])
        .unwrap()
        .into_shared()
    }

    #[test]
    fn record_checks_arity() {
        let err = Record::new(schema(), vec![Value::Int64(1)]).unwrap_err();
        assert!(err.is_malformed_value());
    }

    #[test]
    fn lookup_by_name() -> anyhow::Result<()> {
        let rec = Record::new(schema(), vec![7i64.into(), Value::from(None::<String>)])?;
        assert_eq!(rec.get("id"), Some(&Value::Int64(7)));
        assert!(rec.is_null("note"));
        assert!(!rec.is_null("id"));
        assert!(rec.is_null("missing"));
        Ok(())
    }
}
