use crate::error::{KwilLinkError, Result};
use crate::models::VarType;
use serde_json::Value as JsonValue;

/// A caller-supplied action argument.
///
/// Scalars and homogeneous arrays of scalars. Constructed per call
/// argument (usually from JSON via [`ParamValue::from_json`]) and consumed
/// immediately by the value codec; not retained after encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Null,
    Text(String),
    Int(i64),
    Bool(bool),
    Blob(Vec<u8>),
    Uuid(uuid::Uuid),
    /// Decimal value kept in its canonical string form to avoid
    /// floating-point precision loss
    Numeric(String),
    /// Homogeneous array; the declared element type comes from the first
    /// element
    Array(Vec<ParamValue>),
}

impl ParamValue {
    /// Convert a JSON value into a [`ParamValue`].
    ///
    /// Integers outside the i64 range are a hard error: the node's
    /// decimal-string path must be used instead, so callers pass big
    /// integers as strings like `"18446744073709551615"`.
    pub fn from_json(value: &JsonValue) -> Result<ParamValue> {
        match value {
            JsonValue::Null => Ok(ParamValue::Null),
            JsonValue::Bool(b) => Ok(ParamValue::Bool(*b)),
            JsonValue::String(s) => Ok(ParamValue::Text(s.clone())),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(ParamValue::Int(i))
                } else if n.is_u64() {
                    Err(KwilLinkError::CodecError(format!(
                        "integer {} exceeds the 64-bit signed range; pass it as a decimal string",
                        n
                    )))
                } else {
                    // Fractional numbers travel as canonical decimal strings
                    Ok(ParamValue::Numeric(n.to_string()))
                }
            }
            JsonValue::Array(items) => {
                let members = items
                    .iter()
                    .map(ParamValue::from_json)
                    .collect::<Result<Vec<_>>>()?;
                Ok(ParamValue::Array(members))
            }
            JsonValue::Object(_) => Err(KwilLinkError::CodecError(
                "nested objects are not encodable action arguments".to_string(),
            )),
        }
    }

    /// The inferred scalar type of this value.
    ///
    /// Arrays infer from their first element; an empty array infers null.
    /// UUID-shaped text reports [`VarType::Uuid`], matching the codec's
    /// precedence rules.
    pub fn var_type(&self) -> VarType {
        match self {
            ParamValue::Null => VarType::Null,
            ParamValue::Text(s) => {
                if uuid::Uuid::try_parse(s).is_ok() {
                    VarType::Uuid
                } else {
                    VarType::Text
                }
            }
            ParamValue::Int(_) => VarType::Int,
            ParamValue::Bool(_) => VarType::Bool,
            ParamValue::Blob(_) => VarType::Blob,
            ParamValue::Uuid(_) => VarType::Uuid,
            ParamValue::Numeric(_) => VarType::Numeric,
            ParamValue::Array(items) => items.first().map(ParamValue::var_type).unwrap_or(VarType::Null),
        }
    }

    /// Whether this is an array value.
    pub fn is_array(&self) -> bool {
        matches!(self, ParamValue::Array(_))
    }

    /// Canonical decimal string for numeric-compatible values, if any.
    pub fn numeric_repr(&self) -> Option<String> {
        match self {
            ParamValue::Numeric(s) => Some(s.clone()),
            ParamValue::Int(i) => Some(i.to_string()),
            ParamValue::Text(s) if crate::numeric::analyze_number(s).is_ok() => Some(s.clone()),
            _ => None,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        ParamValue::Int(i)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

impl From<uuid::Uuid> for ParamValue {
    fn from(u: uuid::Uuid) -> Self {
        ParamValue::Uuid(u)
    }
}

impl From<Vec<u8>> for ParamValue {
    fn from(b: Vec<u8>) -> Self {
        ParamValue::Blob(b)
    }
}
