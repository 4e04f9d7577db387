//! Typed property values
//!
//! A property row carries exactly one populated value column. Modeling the
//! value as a tagged union makes that invariant unrepresentable to violate on
//! the write path; the read path still checks raw rows (see the repository).

use serde::{Deserialize, Serialize};

/// The type tag of a property value or filterable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Int,
    Double,
    Str,
    Bool,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Int => "int",
            ValueType::Double => "double",
            ValueType::Str => "string",
            ValueType::Bool => "bool",
        }
    }

    /// The property-table column holding values of this type.
    pub(crate) fn column(&self) -> &'static str {
        match self {
            ValueType::Int => "int_value",
            ValueType::Double => "double_value",
            ValueType::Str => "string_value",
            ValueType::Bool => "bool_value",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueType::Int | ValueType::Double)
    }
}

/// A single typed property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(String),
}

impl PropertyValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            PropertyValue::Int(_) => ValueType::Int,
            PropertyValue::Double(_) => ValueType::Double,
            PropertyValue::Str(_) => ValueType::Str,
            PropertyValue::Bool(_) => ValueType::Bool,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            PropertyValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Parse a raw filter literal into a value of the requested type.
    pub fn parse_typed(ty: ValueType, raw: &str) -> Option<PropertyValue> {
        match ty {
            ValueType::Int => raw.parse().ok().map(PropertyValue::Int),
            ValueType::Double => raw.parse().ok().map(PropertyValue::Double),
            ValueType::Str => Some(PropertyValue::Str(raw.to_string())),
            ValueType::Bool => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" => Some(PropertyValue::Bool(true)),
                "false" | "0" => Some(PropertyValue::Bool(false)),
                _ => None,
            },
        }
    }

    /// Best-effort conversion from a JSON value, for callers feeding custom
    /// properties from loosely-typed sources. Arrays and objects are kept as
    /// their JSON text; nulls carry no value.
    pub fn from_json(value: &serde_json::Value) -> Option<PropertyValue> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::Bool(b) => Some(PropertyValue::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(PropertyValue::Int(i))
                } else {
                    n.as_f64().map(PropertyValue::Double)
                }
            }
            serde_json::Value::String(s) => Some(PropertyValue::Str(s.clone())),
            other => Some(PropertyValue::Str(other.to_string())),
        }
    }
}

impl rusqlite::ToSql for PropertyValue {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        match self {
            PropertyValue::Int(v) => v.to_sql(),
            PropertyValue::Double(v) => v.to_sql(),
            PropertyValue::Str(v) => v.to_sql(),
            PropertyValue::Bool(v) => v.to_sql(),
        }
    }
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Int(v) => write!(f, "{}", v),
            PropertyValue::Double(v) => write!(f, "{}", v),
            PropertyValue::Str(v) => write!(f, "{}", v),
            PropertyValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_typed() {
        assert_eq!(
            PropertyValue::parse_typed(ValueType::Int, "42"),
            Some(PropertyValue::Int(42))
        );
        assert_eq!(
            PropertyValue::parse_typed(ValueType::Double, "0.75"),
            Some(PropertyValue::Double(0.75))
        );
        assert_eq!(
            PropertyValue::parse_typed(ValueType::Bool, "TRUE"),
            Some(PropertyValue::Bool(true))
        );
        assert_eq!(PropertyValue::parse_typed(ValueType::Int, "many"), None);
        assert_eq!(PropertyValue::parse_typed(ValueType::Bool, "maybe"), None);
    }

    #[test]
    fn test_from_json() {
        assert_eq!(
            PropertyValue::from_json(&serde_json::json!(3)),
            Some(PropertyValue::Int(3))
        );
        assert_eq!(
            PropertyValue::from_json(&serde_json::json!(2.5)),
            Some(PropertyValue::Double(2.5))
        );
        assert_eq!(PropertyValue::from_json(&serde_json::Value::Null), None);
        assert_eq!(
            PropertyValue::from_json(&serde_json::json!(["a", "b"])),
            Some(PropertyValue::Str("[\"a\",\"b\"]".to_string()))
        );
    }

    #[test]
    fn test_value_type_tags() {
        assert_eq!(PropertyValue::Int(1).value_type(), ValueType::Int);
        assert_eq!(PropertyValue::Str("x".into()).value_type(), ValueType::Str);
        assert!(ValueType::Double.is_numeric());
        assert!(!ValueType::Str.is_numeric());
    }
}
