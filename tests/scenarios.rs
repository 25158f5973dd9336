//! End-to-end conversion scenarios for both output formats.

use anyhow::Result;
use rowcast::testing::{RecordBuilder, array, date, sample_records, timestamp, type_coverage_record};
use rowcast::{CsvEncoder, JsonEncoder, RecordEncoder, TypeCode, Value};
use serde_json::json;

#[test]
fn type_coverage_csv() -> Result<()> {
    let rec = type_coverage_record()?;
    assert_eq!(
        CsvEncoder::new().encode(&rec)?,
        r#""42","Al, ice","[""a"",null,""b""]","2024-01-01T00:00:00Z","#
    );
    Ok(())
}

#[test]
fn type_coverage_json() -> Result<()> {
    let rec = type_coverage_record()?;
    assert_eq!(
        JsonEncoder::new().encode(&rec)?,
        r#"{"id":42,"name":"Al, ice","tags":["a",null,"b"],"when":"2024-01-01T00:00:00Z"}"#
    );
    Ok(())
}

#[test]
fn every_scalar_type_csv() -> Result<()> {
    let rows = sample_records()?;
    let enc = CsvEncoder::new();
    assert_eq!(
        enc.encode(&rows[0])?,
        concat!(
            r#""1","true","19.99","1.25","1.50","1","2024-03-01","#,
            r#""{""src"":""web"",""n"":1}","aGVsbG8=","CAE=""#
        )
    );
    assert_eq!(
        enc.encode(&rows[1])?,
        r#""2","false",,"1.25","2.50","2","2024-03-02","{""src"":""web"",""n"":2}",,"CAI=""#
    );
    Ok(())
}

#[test]
fn every_scalar_type_json() -> Result<()> {
    let rows = sample_records()?;
    let enc = JsonEncoder::new();
    assert_eq!(
        enc.to_value(&rows[2])?,
        json!({
            "order_id": 3,
            "total": 0.5,
            "weight": 1.25,
            "amount": "3.50",
            "status": 0,
            "placed_on": "2024-03-03",
            "meta": {"src": "web", "n": 3},
            "payload": "\u{fffd}\u{fffd}",
            "proto": "\u{8}\u{3}"
        })
    );
    Ok(())
}

#[test]
fn arrays_of_every_scalar_csv() -> Result<()> {
    let rec = RecordBuilder::new()
        .field("flags", TypeCode::array(TypeCode::Bool), array([Some(true), None]))
        .field("ids", TypeCode::array(TypeCode::Enum), array([1i64, -2]))
        .field("xs", TypeCode::array(TypeCode::Float32), array([0.1f32, 2.0]))
        .field("blobs", TypeCode::array(TypeCode::Bytes), array([b"hi".to_vec()]))
        .field("days", TypeCode::array(TypeCode::Date), array([date("2024-02-29")?]))
        .field(
            "seen",
            TypeCode::array(TypeCode::Timestamp),
            array([Some(timestamp("2024-01-01T12:30:00.25+02:00")?), None]),
        )
        .field("docs", TypeCode::array(TypeCode::JsonText), array(["{\"a\":1}"]))
        .field("empty", TypeCode::array(TypeCode::String), array(Vec::<String>::new()))
        .build()?;
    assert_eq!(
        CsvEncoder::new().encode(&rec)?,
        concat!(
            r#""[true,null]","[1,-2]","[0.1,2.0]","[""aGk=""]","[""2024-02-29""]","#,
            r#""[""2024-01-01T10:30:00.250000000Z"",null]","[""{\""a\"":1}""]","[]""#
        )
    );
    Ok(())
}

#[test]
fn arrays_in_json_keep_null_elements() -> Result<()> {
    let rec = RecordBuilder::new()
        .field("xs", TypeCode::array(TypeCode::Int64), array([Some(1i64), None, Some(3)]))
        .field("docs", TypeCode::array(TypeCode::JsonText), array([Some("[1]"), None]))
        .null("gone", TypeCode::array(TypeCode::String))
        .build()?;
    assert_eq!(
        JsonEncoder::new().encode(&rec)?,
        r#"{"xs":[1,null,3],"docs":[[1],null]}"#
    );
    Ok(())
}

#[test]
fn nested_records_json_only() -> Result<()> {
    let line_item = |sku: &str, qty: Option<i64>| {
        RecordBuilder::new()
            .field("sku", TypeCode::String, sku)
            .field("qty", TypeCode::Int64, qty)
            .build()
    };
    let customer = RecordBuilder::new()
        .field("name", TypeCode::String, "Bo")
        .null("email", TypeCode::String)
        .build()?;
    let order = RecordBuilder::new()
        .field("id", TypeCode::Int64, 9i64)
        .field("customer", TypeCode::Record, customer)
        .field(
            "items",
            TypeCode::array(TypeCode::Record),
            Value::Array(vec![
                line_item("a-1", Some(2))?.into(),
                Value::Null,
                line_item("b-2", None)?.into(),
            ]),
        )
        .build()?;

    assert_eq!(
        JsonEncoder::new().encode(&order)?,
        r#"{"id":9,"customer":{"name":"Bo"},"items":[{"sku":"a-1","qty":2},null,{"sku":"b-2"}]}"#
    );

    let err = CsvEncoder::new().encode(&order).unwrap_err();
    assert!(err.is_unsupported_type());
    assert_eq!(err.field(), Some("customer"));
    Ok(())
}

#[test]
fn unsupported_column_fails_the_row() -> Result<()> {
    let rec = RecordBuilder::new()
        .field("id", TypeCode::Int64, 1i64)
        .field("span", TypeCode::parse("INTERVAL"), "P1D")
        .build()?;
    for enc in [
        Box::new(CsvEncoder::new()) as Box<dyn RecordEncoder>,
        Box::new(JsonEncoder::new()),
    ] {
        let err = enc.encode(&rec).unwrap_err();
        assert!(err.is_unsupported_type(), "{}: {err}", enc.format());
        assert_eq!(err.field(), Some("span"));
    }
    Ok(())
}

#[test]
fn unsupported_array_element_fails_the_row() -> Result<()> {
    let rec = RecordBuilder::new()
        .field(
            "grid",
            TypeCode::parse("ARRAY<ARRAY<INT64>>"),
            Value::Array(vec![]),
        )
        .build()?;
    assert!(JsonEncoder::new().encode(&rec).unwrap_err().is_unsupported_type());
    assert!(CsvEncoder::new().encode(&rec).unwrap_err().is_unsupported_type());
    Ok(())
}

#[test]
fn mismatched_value_fails_the_row() -> Result<()> {
    let rec = RecordBuilder::new()
        .field("id", TypeCode::Int64, "forty-two")
        .build()?;
    let err = CsvEncoder::new().encode(&rec).unwrap_err();
    assert!(err.is_malformed_value());
    assert_eq!(
        err.to_string(),
        "malformed value at `id`: expected INT64, found STRING"
    );
    assert!(JsonEncoder::new().encode(&rec).unwrap_err().is_malformed_value());
    Ok(())
}
