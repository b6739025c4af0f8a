use crate::error::{KwilLinkError, Result};
use crate::numeric::NumericMeta;
use serde::{Deserialize, Serialize};

/// Scalar type names understood by the node.
///
/// The serialized names are the node's own type identifiers and are part
/// of the wire contract: they appear verbatim inside encoded type
/// descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarType {
    /// Absent value
    #[serde(rename = "null")]
    Null,
    /// UTF-8 string
    #[serde(rename = "text")]
    Text,
    /// 64-bit signed integer
    #[serde(rename = "int8")]
    Int,
    /// Boolean
    #[serde(rename = "bool")]
    Bool,
    /// Binary data
    #[serde(rename = "bytea")]
    Blob,
    /// 128-bit universally unique identifier
    #[serde(rename = "uuid")]
    Uuid,
    /// Fixed-point decimal with precision and scale metadata
    #[serde(rename = "numeric")]
    Numeric,
}

impl VarType {
    /// Wire name embedded in encoded type descriptors.
    pub fn as_str(&self) -> &'static str {
        match self {
            VarType::Null => "null",
            VarType::Text => "text",
            VarType::Int => "int8",
            VarType::Bool => "bool",
            VarType::Blob => "bytea",
            VarType::Uuid => "uuid",
            VarType::Numeric => "numeric",
        }
    }

    fn from_name(name: &str) -> Option<VarType> {
        match name {
            "null" => Some(VarType::Null),
            "text" => Some(VarType::Text),
            "int8" | "int" => Some(VarType::Int),
            "bool" | "boolean" => Some(VarType::Bool),
            "bytea" | "blob" => Some(VarType::Blob),
            "uuid" => Some(VarType::Uuid),
            "numeric" | "decimal" => Some(VarType::Numeric),
            _ => None,
        }
    }
}

/// Type descriptor attached to every encoded value.
///
/// Metadata is present only for numeric types and is omitted entirely
/// (not zero-filled) otherwise; the remote decoder distinguishes the two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataType {
    /// Scalar type name
    pub name: VarType,

    /// Whether the value is a homogeneous array of `name`
    pub is_array: bool,

    /// (precision, scale) for numeric types, absent for all others
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<(u16, u16)>,
}

impl DataType {
    /// Scalar descriptor without metadata.
    pub fn scalar(name: VarType) -> Self {
        Self {
            name,
            is_array: false,
            metadata: None,
        }
    }

    /// Array descriptor without metadata.
    pub fn array(name: VarType) -> Self {
        Self {
            name,
            is_array: true,
            metadata: None,
        }
    }

    /// Numeric descriptor with concrete precision and scale.
    pub fn numeric(meta: NumericMeta, is_array: bool) -> Self {
        Self {
            name: VarType::Numeric,
            is_array,
            metadata: Some((meta.precision, meta.scale)),
        }
    }

    /// Schema-declared metadata as a [`NumericMeta`], if any.
    pub fn numeric_meta(&self) -> Option<NumericMeta> {
        self.metadata.map(|(p, s)| NumericMeta::new(p, s))
    }

    /// Parse a schema-declared parameter type string.
    ///
    /// Accepts bare names (`text`, `uuid`), array suffixes (`text[]`),
    /// and numeric metadata (`numeric(10,2)`, `numeric(10,2)[]`).
    pub fn parse(decl: &str) -> Result<DataType> {
        let decl = decl.trim().to_ascii_lowercase();
        let (base, is_array) = match decl.strip_suffix("[]") {
            Some(b) => (b.trim(), true),
            None => (decl.as_str(), false),
        };

        let (name_part, metadata) = match base.split_once('(') {
            Some((name, rest)) => {
                let args = rest.strip_suffix(')').ok_or_else(|| {
                    KwilLinkError::SchemaError(format!("malformed type declaration '{}'", decl))
                })?;
                let (p, s) = args.split_once(',').ok_or_else(|| {
                    KwilLinkError::SchemaError(format!(
                        "type '{}' must declare both precision and scale",
                        decl
                    ))
                })?;
                let precision: u16 = p.trim().parse().map_err(|_| {
                    KwilLinkError::SchemaError(format!("invalid precision in '{}'", decl))
                })?;
                let scale: u16 = s.trim().parse().map_err(|_| {
                    KwilLinkError::SchemaError(format!("invalid scale in '{}'", decl))
                })?;
                (name.trim(), Some((precision, scale)))
            }
            None => (base, None),
        };

        let name = VarType::from_name(name_part).ok_or_else(|| {
            KwilLinkError::SchemaError(format!("unknown parameter type '{}'", decl))
        })?;

        if metadata.is_some() && name != VarType::Numeric {
            return Err(KwilLinkError::SchemaError(format!(
                "type '{}' does not take precision/scale metadata",
                decl
            )));
        }

        Ok(DataType {
            name,
            is_array,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare() {
        let dt = DataType::parse("text").unwrap();
        assert_eq!(dt.name, VarType::Text);
        assert!(!dt.is_array);
        assert!(dt.metadata.is_none());
    }

    #[test]
    fn test_parse_array() {
        let dt = DataType::parse("uuid[]").unwrap();
        assert_eq!(dt.name, VarType::Uuid);
        assert!(dt.is_array);
    }

    #[test]
    fn test_parse_numeric_metadata() {
        let dt = DataType::parse("numeric(10,2)").unwrap();
        assert_eq!(dt.name, VarType::Numeric);
        assert_eq!(dt.metadata, Some((10, 2)));

        let dt = DataType::parse("NUMERIC(10, 2)[]").unwrap();
        assert!(dt.is_array);
        assert_eq!(dt.metadata, Some((10, 2)));
    }

    #[test]
    fn test_parse_rejects_metadata_on_non_numeric() {
        assert!(DataType::parse("text(10,2)").is_err());
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(DataType::parse("varchar").is_err());
        assert!(DataType::parse("numeric(10").is_err());
        assert!(DataType::parse("numeric(10)").is_err());
    }
}
