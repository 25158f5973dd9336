//! Column type model.
//!
//! A [`Schema`] is the ordered list of `(name, TypeCode)` pairs that describes one
//! record shape. [`classify`] resolves a [`TypeCode`] to the [`RendererKey`] the
//! value renderer dispatches on; it is the single place where unsupported types
//! are rejected.

use crate::error::{ConvertError, ConvertResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The closed set of column type codes.
///
/// `Unsupported` carries a source type name that has no rendering rule. It is
/// representable so that a schema can describe any column the source reports,
/// but classifying it always fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeCode {
    Bool,
    Int64,
    Float32,
    Float64,
    String,
    Bytes,
    Date,
    Timestamp,
    JsonText,
    NumericText,
    Enum,
    ProtoBytes,
    Array(Box<TypeCode>),
    Record,
    Unsupported(String),
}

impl TypeCode {
    pub fn array(element: TypeCode) -> Self {
        Self::Array(Box::new(element))
    }

    /// Parse a source type name such as `INT64`, `PG_NUMERIC` or `ARRAY<STRING>`.
    ///
    /// Unknown names yield [`TypeCode::Unsupported`] instead of an error; the
    /// failure is reported when a row of that shape is converted.
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        let upper = name.to_ascii_uppercase();
        if let Some(inner) = upper
            .strip_prefix("ARRAY<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            return Self::array(Self::parse(inner));
        }
        match upper.as_str() {
            "BOOL" | "BOOLEAN" => Self::Bool,
            "INT64" => Self::Int64,
            "FLOAT32" => Self::Float32,
            "FLOAT64" => Self::Float64,
            "STRING" => Self::String,
            "BYTES" => Self::Bytes,
            "DATE" => Self::Date,
            "TIMESTAMP" => Self::Timestamp,
            "JSON" | "PG_JSONB" => Self::JsonText,
            "NUMERIC" | "PG_NUMERIC" => Self::NumericText,
            "ENUM" => Self::Enum,
            "PROTO" => Self::ProtoBytes,
            "STRUCT" | "RECORD" => Self::Record,
            _ => Self::Unsupported(name.to_string()),
        }
    }

}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("BOOL"),
            Self::Int64 => f.write_str("INT64"),
            Self::Float32 => f.write_str("FLOAT32"),
            Self::Float64 => f.write_str("FLOAT64"),
            Self::String => f.write_str("STRING"),
            Self::Bytes => f.write_str("BYTES"),
            Self::Date => f.write_str("DATE"),
            Self::Timestamp => f.write_str("TIMESTAMP"),
            Self::JsonText => f.write_str("JSON"),
            Self::NumericText => f.write_str("NUMERIC"),
            Self::Enum => f.write_str("ENUM"),
            Self::ProtoBytes => f.write_str("PROTO"),
            Self::Array(element) => write!(f, "ARRAY<{element}>"),
            Self::Record => f.write_str("STRUCT"),
            Self::Unsupported(name) => f.write_str(name),
        }
    }
}

/// One named, typed column of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub code: TypeCode,
}

impl Field {
    pub fn new(name: impl Into<String>, code: TypeCode) -> Self {
        Self {
            name: name.into(),
            code,
        }
    }
}

/// Ordered column list of one record shape.
///
/// Field order is the CSV column order. Names are unique within a schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Field>", into = "Vec<Field>")]
pub struct Schema {
    fields: Vec<Field>,
}

impl TryFrom<Vec<Field>> for Schema {
    type Error = ConvertError;

    fn try_from(fields: Vec<Field>) -> ConvertResult<Self> {
        Self::new(fields)
    }
}

impl From<Schema> for Vec<Field> {
    fn from(schema: Schema) -> Self {
        schema.fields
    }
}

impl Schema {
    /// Build a schema, rejecting duplicate field names.
    pub fn new(fields: Vec<Field>) -> ConvertResult<Self> {
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(ConvertError::malformed("unique field names", "duplicate")
                    .in_field(&field.name));
            }
        }
        Ok(Self { fields })
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// Scalar rendering rule, shared by columns and array elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKey {
    Bool,
    /// `INT64` and `ENUM`.
    Int64,
    Float32,
    Float64,
    /// `STRING` and `NUMERIC_TEXT`.
    Text,
    JsonText,
    /// `BYTES` and `PROTO_BYTES`.
    Bytes,
    Date,
    Timestamp,
}

/// Element rule of an array column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKey {
    Scalar(ScalarKey),
    Record,
}

/// Renderer selection key produced by [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RendererKey {
    Scalar(ScalarKey),
    Array(ElementKey),
    Record,
}

fn classify_scalar(code: &TypeCode) -> Option<ScalarKey> {
    Some(match code {
        TypeCode::Bool => ScalarKey::Bool,
        TypeCode::Int64 | TypeCode::Enum => ScalarKey::Int64,
        TypeCode::Float32 => ScalarKey::Float32,
        TypeCode::Float64 => ScalarKey::Float64,
        TypeCode::String | TypeCode::NumericText => ScalarKey::Text,
        TypeCode::JsonText => ScalarKey::JsonText,
        TypeCode::Bytes | TypeCode::ProtoBytes => ScalarKey::Bytes,
        TypeCode::Date => ScalarKey::Date,
        TypeCode::Timestamp => ScalarKey::Timestamp,
        TypeCode::Array(_) | TypeCode::Record | TypeCode::Unsupported(_) => return None,
    })
}

/// Resolve the rendering rule for a column type.
///
/// # Errors
/// [`ConvertError::UnsupportedType`] for `Unsupported` codes, for arrays of
/// arrays and for arrays of unsupported element types. The error carries the
/// offending code itself (the element code for array failures).
pub fn classify(code: &TypeCode) -> ConvertResult<RendererKey> {
    if let Some(scalar) = classify_scalar(code) {
        return Ok(RendererKey::Scalar(scalar));
    }
    match code {
        TypeCode::Record => Ok(RendererKey::Record),
        TypeCode::Array(element) => match element.as_ref() {
            TypeCode::Record => Ok(RendererKey::Array(ElementKey::Record)),
            other => classify_scalar(other)
                .map(|s| RendererKey::Array(ElementKey::Scalar(s)))
                .ok_or_else(|| ConvertError::unsupported(other.clone())),
        },
        other => Err(ConvertError::unsupported(other.clone())),
    }
}
