//! Scalar and array value encoding.
//!
//! Every non-null value encodes as a `0x01` tag byte followed by its
//! type-specific bytes; null is exactly one `0x00` byte. Check order is a
//! wire contract: UUID-shaped text before the null check, null before
//! blobs, blobs before decimal-shaped numbers, then the generic scalar
//! switch.

use crate::error::{KwilLinkError, Result};
use crate::models::{DataType, EncodedValue, ParamValue};
use crate::numeric::is_decimal_shaped;

const NULL_TAG: u8 = 0x00;
const NOT_NULL_TAG: u8 = 0x01;

fn tagged(body: Vec<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 1);
    out.push(NOT_NULL_TAG);
    out.extend_from_slice(&body);
    out
}

/// Encode a single scalar value into its tagged byte form.
pub fn encode_value(value: &ParamValue) -> Result<Vec<u8>> {
    // UUID-shaped text wins over the generic text encoding even though
    // its static type is text: the node stores it as 16 raw bytes.
    if let ParamValue::Text(s) = value {
        if let Ok(u) = uuid::Uuid::try_parse(s) {
            return Ok(tagged(u.as_bytes().to_vec()));
        }
    }
    if let ParamValue::Uuid(u) = value {
        return Ok(tagged(u.as_bytes().to_vec()));
    }

    if matches!(value, ParamValue::Null) {
        return Ok(vec![NULL_TAG]);
    }

    if let ParamValue::Blob(b) = value {
        return Ok(tagged(b.clone()));
    }

    // Decimal-shaped numbers travel as canonical string bytes, never as
    // fixed-width binary.
    if let ParamValue::Numeric(repr) = value {
        if is_decimal_shaped(repr) {
            return Ok(tagged(repr.as_bytes().to_vec()));
        }
    }

    Ok(tagged(encode_not_null(value)?))
}

/// Encode a non-null scalar's type-specific bytes, without the tag byte.
pub fn encode_not_null(value: &ParamValue) -> Result<Vec<u8>> {
    match value {
        ParamValue::Text(s) => Ok(s.as_bytes().to_vec()),
        ParamValue::Int(i) => Ok(i.to_string().into_bytes()),
        ParamValue::Bool(b) => Ok(vec![u8::from(*b)]),
        ParamValue::Blob(b) => Ok(b.clone()),
        ParamValue::Uuid(u) => Ok(u.as_bytes().to_vec()),
        ParamValue::Numeric(repr) => {
            // Integral numerics also travel as string bytes; only the
            // repr's validity is checked here.
            crate::numeric::analyze_number(repr)?;
            Ok(repr.as_bytes().to_vec())
        }
        ParamValue::Null => Err(KwilLinkError::CodecError(
            "null has no not-null encoding".to_string(),
        )),
        ParamValue::Array(_) => Err(KwilLinkError::CodecError(
            "nested arrays are not encodable".to_string(),
        )),
    }
}

/// Encode a caller value against its resolved type descriptor.
///
/// Scalars produce a single-element record; arrays produce one element
/// per member. Member type conformance is validated by the build
/// pipeline against the schema, not re-verified here.
pub fn encode_param(value: &ParamValue, data_type: &DataType) -> Result<EncodedValue> {
    let elements = match value {
        ParamValue::Array(members) => {
            if !data_type.is_array {
                return Err(KwilLinkError::CodecError(format!(
                    "array value supplied for scalar type '{}'",
                    data_type.name.as_str()
                )));
            }
            members.iter().map(encode_value).collect::<Result<Vec<_>>>()?
        }
        scalar => {
            if data_type.is_array {
                return Err(KwilLinkError::CodecError(format!(
                    "scalar value supplied for array type '{}[]'",
                    data_type.name.as_str()
                )));
            }
            vec![encode_value(scalar)?]
        }
    };

    Ok(EncodedValue::new(data_type.clone(), elements))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VarType;

    #[test]
    fn test_null_is_single_zero_byte() {
        assert_eq!(encode_value(&ParamValue::Null).unwrap(), vec![0x00]);
    }

    #[test]
    fn test_non_null_starts_with_tag() {
        for v in [
            ParamValue::Text("hello".into()),
            ParamValue::Int(42),
            ParamValue::Bool(true),
            ParamValue::Blob(vec![0xde, 0xad]),
            ParamValue::Numeric("3.14".into()),
        ] {
            assert_eq!(encode_value(&v).unwrap()[0], 0x01, "value {:?}", v);
        }
    }

    #[test]
    fn test_uuid_text_encodes_as_raw_bytes() {
        let u = uuid::Uuid::parse_str("123e4567-e89b-12d3-a456-426614174000").unwrap();
        let encoded = encode_value(&ParamValue::Text(u.to_string())).unwrap();
        assert_eq!(encoded.len(), 17);
        assert_eq!(&encoded[1..], u.as_bytes());

        // Same bytes through the typed variant
        assert_eq!(encode_value(&ParamValue::Uuid(u)).unwrap(), encoded);
    }

    #[test]
    fn test_decimal_encodes_as_string_bytes() {
        let encoded = encode_value(&ParamValue::Numeric("123.456".into())).unwrap();
        assert_eq!(&encoded[1..], b"123.456");
    }

    #[test]
    fn test_int_encodes_as_string_bytes() {
        let encoded = encode_value(&ParamValue::Int(-17)).unwrap();
        assert_eq!(&encoded[1..], b"-17");
    }

    #[test]
    fn test_bool_encodes_as_single_byte() {
        assert_eq!(encode_value(&ParamValue::Bool(true)).unwrap(), vec![0x01, 0x01]);
        assert_eq!(encode_value(&ParamValue::Bool(false)).unwrap(), vec![0x01, 0x00]);
    }

    #[test]
    fn test_determinism() {
        let v = ParamValue::Text("same".into());
        assert_eq!(encode_value(&v).unwrap(), encode_value(&v).unwrap());
    }

    #[test]
    fn test_encode_param_scalar_and_array() {
        let dt = DataType::scalar(VarType::Int);
        let ev = encode_param(&ParamValue::Int(7), &dt).unwrap();
        assert_eq!(ev.elements().len(), 1);

        let dt = DataType::array(VarType::Int);
        let ev = encode_param(
            &ParamValue::Array(vec![ParamValue::Int(1), ParamValue::Int(2)]),
            &dt,
        )
        .unwrap();
        assert_eq!(ev.elements().len(), 2);
    }

    #[test]
    fn test_encode_param_shape_mismatch() {
        let dt = DataType::scalar(VarType::Int);
        assert!(encode_param(&ParamValue::Array(vec![]), &dt).is_err());

        let dt = DataType::array(VarType::Int);
        assert!(encode_param(&ParamValue::Int(1), &dt).is_err());
    }

    #[test]
    fn test_nested_array_rejected() {
        let dt = DataType::array(VarType::Int);
        let nested = ParamValue::Array(vec![ParamValue::Array(vec![ParamValue::Int(1)])]);
        assert!(encode_param(&nested, &dt).is_err());
    }
}
