//! JSON object encoder.
//!
//! Fields are visited in schema order. NULL fields are skipped entirely, so a
//! key is either present with a value or absent, never `"key": null`. Nested
//! `STRUCT` values recurse with the same rule; arrays keep their null elements.

use super::{OutputFormat, RecordEncoder, ShapeCache};
use crate::error::{ConvertError, ConvertResult};
use crate::render::{json_array, json_scalar};
use crate::types::{ElementKey, RendererKey};
use crate::value::{Record, Value};
use serde_json::{Map, Value as JsonValue};

/// Encodes records as compact JSON objects.
///
/// Keys follow schema order. Characters such as `<`, `>` and `&` are written
/// literally.
#[derive(Debug, Default)]
pub struct JsonEncoder {
    cache: ShapeCache,
}

impl JsonEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the JSON object for `record` without serializing it.
    pub fn to_value(&self, record: &Record) -> ConvertResult<JsonValue> {
        self.object(record).map(JsonValue::Object)
    }

    fn object(&self, record: &Record) -> ConvertResult<Map<String, JsonValue>> {
        let plan = self.cache.plan(record.schema())?;
        let mut out = Map::with_capacity(record.len());
        for ((field, value), key) in record.iter().zip(plan.iter()) {
            if value.is_null() {
                continue;
            }
            let rendered = self
                .field_value(*key, value)
                .map_err(|e| e.in_field(&field.name))?;
            out.insert(field.name.clone(), rendered);
        }
        Ok(out)
    }

    fn field_value(&self, key: RendererKey, value: &Value) -> ConvertResult<JsonValue> {
        match key {
            RendererKey::Scalar(scalar) => json_scalar(scalar, value),
            RendererKey::Array(ElementKey::Scalar(scalar)) => {
                json_array(value, |item| json_scalar(scalar, item))
            }
            RendererKey::Array(ElementKey::Record) => json_array(value, |item| self.nested(item)),
            RendererKey::Record => self.nested(value),
        }
    }

    fn nested(&self, value: &Value) -> ConvertResult<JsonValue> {
        match value {
            Value::Record(record) => self.to_value(record),
            other => Err(ConvertError::malformed("STRUCT", other.kind())),
        }
    }
}

impl RecordEncoder for JsonEncoder {
    fn encode(&self, record: &Record) -> ConvertResult<String> {
        let value = self.to_value(record)?;
        Ok(serde_json::to_string(&value)?)
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Field, Schema, TypeCode};
    use serde_json::json;
    use std::sync::Arc;

    fn address(city: Option<&str>) -> Record {
        let schema = Schema::new(vec![
            Field::new("city", TypeCode::String),
            Field::new("zip", TypeCode::Int64),
        ])
        .unwrap()
        .into_shared();
        Record::new(schema, vec![city.into(), Value::Null]).unwrap()
    }

    fn person(addresses: Value, home: Value) -> Record {
        let schema = Schema::new(vec![
            Field::new("name", TypeCode::String),
            Field::new("home", TypeCode::Record),
            Field::new("past", TypeCode::array(TypeCode::Record)),
        ])
        .unwrap()
        .into_shared();
        Record::new(schema, vec!["Al".into(), home, addresses]).unwrap()
    }

    #[test]
    fn nested_records_omit_nulls_at_every_level() -> anyhow::Result<()> {
        let rec = person(
            Value::Array(vec![address(Some("Oslo")).into(), Value::Null]),
            address(None).into(),
        );
        let enc = JsonEncoder::new();
        assert_eq!(
            enc.to_value(&rec)?,
            json!({"name": "Al", "home": {}, "past": [{"city": "Oslo"}, null]})
        );
        assert_eq!(
            enc.encode(&rec)?,
            r#"{"name":"Al","home":{},"past":[{"city":"Oslo"},null]}"#
        );
        Ok(())
    }

    #[test]
    fn record_field_with_scalar_value_is_malformed() {
        let rec = person(Value::Null, Value::Int64(3));
        let err = JsonEncoder::new().encode(&rec).unwrap_err();
        assert!(err.is_malformed_value());
        assert_eq!(err.field(), Some("home"));
    }

    #[test]
    fn nested_errors_carry_full_path() {
        let bad = Record::new(
            Schema::new(vec![Field::new("city", TypeCode::Int64)])
                .unwrap()
                .into_shared(),
            vec!["Oslo".into()],
        )
        .unwrap();
        let rec = person(Value::Array(vec![Value::Null, bad.into()]), Value::Null);
        let err = JsonEncoder::new().encode(&rec).unwrap_err();
        assert_eq!(err.field(), Some("past[1].city"));
    }

    #[test]
    fn html_characters_are_not_escaped() -> anyhow::Result<()> {
        let schema = Arc::new(Schema::new(vec![Field::new("s", TypeCode::String)])?);
        let rec = Record::new(schema, vec!["<a href='x'>&</a>".into()])?;
        assert_eq!(
            JsonEncoder::new().encode(&rec)?,
            r#"{"s":"<a href='x'>&</a>"}"#
        );
        Ok(())
    }
}
