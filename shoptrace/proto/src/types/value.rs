use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Value side of a span tag.
///
/// Tags carry a small closed set of scalar types; everything a caller can
/// reasonably hand over converts into one of these via `From`.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum TagValue {
    Bool(bool),
    I64(i64),
    F64(f64),
    Text(String),
}

impl Display for TagValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TagValue::Bool(x) => f.write_fmt(format_args!("{x}")),
            TagValue::I64(x) => f.write_fmt(format_args!("{x}")),
            TagValue::F64(x) => f.write_fmt(format_args!("{x}")),
            TagValue::Text(x) => f.write_fmt(format_args!("{x}")),
        }
    }
}

impl From<bool> for TagValue {
    fn from(value: bool) -> Self {
        TagValue::Bool(value)
    }
}

impl From<i32> for TagValue {
    fn from(value: i32) -> Self {
        TagValue::I64(value as i64)
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        TagValue::I64(value)
    }
}

impl From<u32> for TagValue {
    fn from(value: u32) -> Self {
        TagValue::I64(value as i64)
    }
}

impl From<f64> for TagValue {
    fn from(value: f64) -> Self {
        TagValue::F64(value)
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::Text(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        TagValue::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_primitives() {
        assert_eq!(TagValue::from(true), TagValue::Bool(true));
        assert_eq!(TagValue::from(3i32), TagValue::I64(3));
        assert_eq!(TagValue::from(3u32), TagValue::I64(3));
        assert_eq!(TagValue::from(1200i64), TagValue::I64(1200));
        assert_eq!(TagValue::from(0.75f64), TagValue::F64(0.75));
        assert_eq!(
            TagValue::from("electronics"),
            TagValue::Text("electronics".to_string())
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(TagValue::Bool(false).to_string(), "false");
        assert_eq!(TagValue::I64(42).to_string(), "42");
        assert_eq!(TagValue::Text("laptop".into()).to_string(), "laptop");
    }
}
