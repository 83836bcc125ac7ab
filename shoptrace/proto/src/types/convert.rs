//! Unified type conversion for the `TagValue` type.
//!
//! Centralizes extraction logic so callers reading tags back (exporters,
//! assertions) do not match on the enum by hand.

use crate::types::error::ProtoError;
use crate::types::TagValue;

/// Trait for converting a `TagValue` into a concrete type.
///
/// # Errors
/// Returns `ProtoError::WrongValueType` if the conversion is not possible.
pub trait FromTagValue: Sized {
    fn from_tag_value(value: &TagValue) -> Result<Self, ProtoError>;
}

/// Trait for converting values into `TagValue`.
pub trait ToTagValue {
    fn to_tag_value(self) -> TagValue;
}

// Every type with Into<TagValue> converts for free.
impl<T: Into<TagValue>> ToTagValue for T {
    fn to_tag_value(self) -> TagValue {
        self.into()
    }
}

impl FromTagValue for String {
    fn from_tag_value(value: &TagValue) -> Result<Self, ProtoError> {
        match value {
            TagValue::Text(s) => Ok(s.clone()),
            TagValue::Bool(b) => Ok(b.to_string()),
            TagValue::I64(i) => Ok(i.to_string()),
            TagValue::F64(f) => Ok(f.to_string()),
        }
    }
}

impl FromTagValue for i64 {
    fn from_tag_value(value: &TagValue) -> Result<Self, ProtoError> {
        match value {
            TagValue::I64(x) => Ok(*x),
            _ => Err(ProtoError::WrongValueType),
        }
    }
}

impl FromTagValue for f64 {
    fn from_tag_value(value: &TagValue) -> Result<Self, ProtoError> {
        match value {
            TagValue::F64(x) => Ok(*x),
            TagValue::I64(x) => Ok(*x as f64),
            _ => Err(ProtoError::WrongValueType),
        }
    }
}

impl FromTagValue for bool {
    fn from_tag_value(value: &TagValue) -> Result<Self, ProtoError> {
        match value {
            TagValue::Bool(b) => Ok(*b),
            _ => Err(ProtoError::WrongValueType),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_from_any_value() {
        assert_eq!(
            String::from_tag_value(&TagValue::Text("x".into())),
            Ok("x".to_string())
        );
        assert_eq!(
            String::from_tag_value(&TagValue::I64(7)),
            Ok("7".to_string())
        );
        assert_eq!(
            String::from_tag_value(&TagValue::Bool(true)),
            Ok("true".to_string())
        );
    }

    #[test]
    fn test_numeric_widening() {
        assert_eq!(f64::from_tag_value(&TagValue::I64(3)), Ok(3.0));
        assert_eq!(
            i64::from_tag_value(&TagValue::F64(3.0)),
            Err(ProtoError::WrongValueType)
        );
    }

    #[test]
    fn test_bool_is_strict() {
        assert_eq!(bool::from_tag_value(&TagValue::Bool(false)), Ok(false));
        assert_eq!(
            bool::from_tag_value(&TagValue::Text("true".into())),
            Err(ProtoError::WrongValueType)
        );
    }
}
