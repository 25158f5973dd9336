//! Per-type value rendering.
//!
//! Each supported type has two renderings:
//!
//! | Type | CSV text | JSON value |
//! |---|---|---|
//! | `BOOL` | `true` / `false` | boolean |
//! | `INT64`, `ENUM` | decimal integer | number |
//! | `FLOAT32`, `FLOAT64` | shortest round-trip decimal | number |
//! | `STRING`, `NUMERIC_TEXT` | literal text | string |
//! | `JSON_TEXT` | literal text | parsed and embedded |
//! | `BYTES`, `PROTO_BYTES` | standard base64 | UTF-8 decoded, lossy |
//! | `DATE` | `YYYY-MM-DD` | same string |
//! | `TIMESTAMP` | RFC 3339, UTC, `Z` suffix | same string |
//! | `ARRAY<T>` | JSON array literal in one field | JSON array |
//!
//! Null handling is the caller's concern for whole columns: [`csv_text`] maps a
//! NULL column to `None` and the JSON encoder skips the key. Null array
//! elements always render as JSON `null`.
//!
//! Elements of a CSV-embedded array follow the CSV scalar rule, emitted as JSON
//! booleans and numbers where the type is boolean or numeric and as JSON strings
//! otherwise. Bytes inside a CSV array are therefore base64, never raw UTF-8.

use crate::error::{ConvertError, ConvertResult};
use crate::types::{ElementKey, RendererKey, ScalarKey, TypeCode};
use crate::value::Value;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Number, Value as JsonValue};
use std::fmt::Write;

impl ScalarKey {
    /// Name used in malformed-value errors.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "BOOL",
            Self::Int64 => "INT64",
            Self::Float32 => "FLOAT32",
            Self::Float64 => "FLOAT64",
            Self::Text => "STRING",
            Self::JsonText => "JSON",
            Self::Bytes => "BYTES",
            Self::Date => "DATE",
            Self::Timestamp => "TIMESTAMP",
        }
    }
}

fn mismatch(key: ScalarKey, value: &Value) -> ConvertError {
    ConvertError::malformed(key.name(), value.kind())
}

/// Render one CSV column. `Ok(None)` means the column is NULL.
///
/// # Errors
/// `UnsupportedType` for `STRUCT` and `ARRAY<STRUCT>` columns, which have no
/// CSV form. `MalformedValue` when the value does not match `key`.
pub fn csv_text(key: RendererKey, value: &Value) -> ConvertResult<Option<String>> {
    if value.is_null() {
        return Ok(None);
    }
    match key {
        RendererKey::Scalar(scalar) => csv_scalar(scalar, value).map(Some),
        RendererKey::Array(ElementKey::Scalar(scalar)) => csv_array(scalar, value).map(Some),
        RendererKey::Array(ElementKey::Record) => {
            Err(ConvertError::unsupported(TypeCode::array(TypeCode::Record)))
        }
        RendererKey::Record => Err(ConvertError::unsupported(TypeCode::Record)),
    }
}

/// CSV text of a non-null scalar.
pub fn csv_scalar(key: ScalarKey, value: &Value) -> ConvertResult<String> {
    match (key, value) {
        (ScalarKey::Bool, Value::Bool(b)) => Ok(b.to_string()),
        (ScalarKey::Int64, Value::Int64(n)) => Ok(n.to_string()),
        (ScalarKey::Float32, Value::Float32(f)) => Ok(float_text(widen_f32(*f))),
        (ScalarKey::Float64, Value::Float64(f)) => Ok(float_text(*f)),
        (ScalarKey::Text | ScalarKey::JsonText, Value::String(s)) => Ok(s.clone()),
        (ScalarKey::Bytes, Value::Bytes(b)) => Ok(STANDARD.encode(b)),
        (ScalarKey::Date, Value::Date(d)) => Ok(date_text(d)),
        (ScalarKey::Timestamp, Value::Timestamp(ts)) => Ok(timestamp_text(ts)),
        _ => Err(mismatch(key, value)),
    }
}

/// JSON value of a non-null scalar.
pub fn json_scalar(key: ScalarKey, value: &Value) -> ConvertResult<JsonValue> {
    match (key, value) {
        (ScalarKey::Bool, Value::Bool(b)) => Ok(JsonValue::Bool(*b)),
        (ScalarKey::Int64, Value::Int64(n)) => Ok(JsonValue::from(*n)),
        (ScalarKey::Float32, Value::Float32(f)) => float_number(widen_f32(*f)).map(JsonValue::Number),
        (ScalarKey::Float64, Value::Float64(f)) => float_number(*f).map(JsonValue::Number),
        (ScalarKey::Text, Value::String(s)) => Ok(JsonValue::String(s.clone())),
        (ScalarKey::JsonText, Value::String(s)) => serde_json::from_str(s)
            .map_err(|e| ConvertError::malformed("valid JSON text", e.to_string())),
        (ScalarKey::Bytes, Value::Bytes(b)) => {
            Ok(JsonValue::String(String::from_utf8_lossy(b).into_owned()))
        }
        (ScalarKey::Date, Value::Date(d)) => Ok(JsonValue::String(date_text(d))),
        (ScalarKey::Timestamp, Value::Timestamp(ts)) => Ok(JsonValue::String(timestamp_text(ts))),
        _ => Err(mismatch(key, value)),
    }
}

/// Build a JSON array from `value`, rendering non-null elements with `element`.
///
/// Null elements become JSON `null`. Element failures are tagged with their
/// index.
pub fn json_array<F>(value: &Value, mut element: F) -> ConvertResult<JsonValue>
where
    F: FnMut(&Value) -> ConvertResult<JsonValue>,
{
    let Value::Array(items) = value else {
        return Err(ConvertError::malformed("ARRAY", value.kind()));
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Null => Ok(JsonValue::Null),
            item => element(item).map_err(|e| e.in_field(&format!("[{i}]"))),
        })
        .collect::<ConvertResult<Vec<_>>>()
        .map(JsonValue::Array)
}

/// JSON array literal of a non-null scalar array, as embedded in one CSV field.
pub fn csv_array(key: ScalarKey, value: &Value) -> ConvertResult<String> {
    let array = json_array(value, |item| csv_element(key, item))?;
    Ok(serde_json::to_string(&array)?)
}

fn csv_element(key: ScalarKey, value: &Value) -> ConvertResult<JsonValue> {
    match key {
        ScalarKey::Bool | ScalarKey::Int64 | ScalarKey::Float32 | ScalarKey::Float64 => {
            json_scalar(key, value)
        }
        _ => csv_scalar(key, value).map(JsonValue::String),
    }
}

/// Widen through the shortest `f32` text so `0.1f32` stays `0.1`.
fn widen_f32(f: f32) -> f64 {
    f.to_string().parse().unwrap_or(f64::from(f))
}

fn float_number(f: f64) -> ConvertResult<Number> {
    Number::from_f64(f).ok_or_else(|| ConvertError::malformed("finite float", float_text(f)))
}

/// Shortest round-trip decimal text, matching serde_json's number output.
pub fn float_text(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f == f64::INFINITY {
        "Infinity".to_string()
    } else if f == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        Number::from_f64(f).map_or_else(|| f.to_string(), |n| n.to_string())
    }
}

pub fn date_text(d: &NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

/// `YYYY-MM-DDTHH:MM:SS[.nnnnnnnnn]Z`; the fraction appears only when non-zero.
pub fn timestamp_text(ts: &DateTime<Utc>) -> String {
    let mut out = ts.format("%Y-%m-%dT%H:%M:%S").to_string();
    let nanos = ts.timestamp_subsec_nanos() % 1_000_000_000;
    if nanos != 0 {
        let _ = write!(out, ".{nanos:09}");
    }
    out.push('Z');
    out
}
