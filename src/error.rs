//! Conversion error taxonomy.
//!
//! Every failure while turning a [`Record`](crate::Record) into a text line is
//! fatal to that row. The encoders never emit partial output: a row either
//! converts completely or yields one [`ConvertError`].

use crate::types::TypeCode;

/// Result alias used throughout the conversion core.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Errors raised by the type model, the value renderer and the record encoders.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// A column (or array element) type is outside the supported set.
    #[error("unsupported type {code}{}", at(.field))]
    UnsupportedType {
        code: TypeCode,
        field: Option<String>,
    },

    /// A value's runtime shape does not match its declared type.
    #[error("malformed value{}: expected {expected}, found {found}", at(.field))]
    MalformedValue {
        field: Option<String>,
        expected: String,
        found: String,
    },

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

fn at(field: &Option<String>) -> String {
    match field {
        Some(f) => format!(" at `{f}`"),
        None => String::new(),
    }
}

impl ConvertError {
    pub fn unsupported(code: TypeCode) -> Self {
        Self::UnsupportedType { code, field: None }
    }

    pub fn malformed(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::MalformedValue {
            field: None,
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Prefix the error location with `segment`.
    ///
    /// Applied from the innermost field outwards, so a failure deep in a nested
    /// record reads `outer.inner[2]`.
    #[must_use]
    pub fn in_field(self, segment: &str) -> Self {
        let join = |field: Option<String>| match field {
            None => Some(segment.to_string()),
            Some(inner) if inner.starts_with('[') => Some(format!("{segment}{inner}")),
            Some(inner) => Some(format!("{segment}.{inner}")),
        };
        match self {
            Self::UnsupportedType { code, field } => Self::UnsupportedType {
                code,
                field: join(field),
            },
            Self::MalformedValue {
                field,
                expected,
                found,
            } => Self::MalformedValue {
                field: join(field),
                expected,
                found,
            },
            other => other,
        }
    }

    /// The dotted path of the offending field, when known.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::UnsupportedType { field, .. } | Self::MalformedValue { field, .. } => {
                field.as_deref()
            }
            _ => None,
        }
    }

    pub fn is_unsupported_type(&self) -> bool {
        matches!(self, Self::UnsupportedType { .. })
    }

    pub fn is_malformed_value(&self) -> bool {
        matches!(self, Self::MalformedValue { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_path_builds_outwards() {
        let err = ConvertError::malformed("INT64", "STRING")
            .in_field("[2]")
            .in_field("items")
            .in_field("order");
        assert_eq!(err.field(), Some("order.items[2]"));
        assert_eq!(
            err.to_string(),
            "malformed value at `order.items[2]`: expected INT64, found STRING"
        );
    }

    #[test]
    fn unsupported_display_names_code() {
        let err = ConvertError::unsupported(TypeCode::Unsupported("INTERVAL".into()));
        assert!(err.is_unsupported_type());
        assert_eq!(err.to_string(), "unsupported type INTERVAL");
    }
}
