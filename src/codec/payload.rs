//! Versioned call/execute payload assembly.
//!
//! Payload framing is little-endian; the type-descriptor sub-encoding is
//! big-endian throughout, matching the node's own internal encoder. The
//! asymmetry is deliberate and pinned by golden tests.

use crate::error::{KwilLinkError, Result};
use crate::models::{ActionPayload, DataType, EncodedValue};
use base64::{engine::general_purpose, Engine as _};
use bytes::BufMut;

/// Payload format version.
const PAYLOAD_VERSION: u16 = 0;

/// Encoded-value record version.
const ENCODED_VALUE_VERSION: u16 = 0;

/// Type-descriptor encoding version.
const DESCRIPTOR_VERSION: u16 = 0;

fn check_len(len: usize, what: &str, max: usize) -> Result<()> {
    if len > max {
        return Err(KwilLinkError::CodecError(format!(
            "{} length {} exceeds the wire maximum {}",
            what, len, max
        )));
    }
    Ok(())
}

/// Encode a type descriptor. All multi-byte fields are big-endian.
///
/// Layout: u16 version, u32 name length + UTF-8 name, u8 is_array, u16
/// metadata element count (0, or 2 followed by u16 precision and u16
/// scale). Non-numeric types omit metadata entirely rather than zero-fill
/// it.
pub fn encode_data_type(data_type: &DataType) -> Vec<u8> {
    let name = data_type.name.as_str().as_bytes();
    let mut buf = Vec::with_capacity(2 + 4 + name.len() + 1 + 2 + 4);

    buf.put_u16(DESCRIPTOR_VERSION);
    buf.put_u32(name.len() as u32);
    buf.put_slice(name);
    buf.put_u8(u8::from(data_type.is_array));
    match data_type.metadata {
        Some((precision, scale)) => {
            buf.put_u16(2);
            buf.put_u16(precision);
            buf.put_u16(scale);
        }
        None => buf.put_u16(0),
    }

    buf
}

/// Encode a value record: u16 LE version, u32 LE descriptor length +
/// descriptor bytes, u16 LE element count, then u32 LE length + bytes per
/// element.
pub fn encode_encoded_value(value: &EncodedValue) -> Result<Vec<u8>> {
    let descriptor = encode_data_type(value.data_type());
    check_len(value.elements().len(), "element count", u16::MAX as usize)?;

    let mut buf = Vec::new();
    buf.put_u16_le(ENCODED_VALUE_VERSION);
    buf.put_u32_le(descriptor.len() as u32);
    buf.put_slice(&descriptor);
    buf.put_u16_le(value.elements().len() as u16);
    for element in value.elements() {
        check_len(element.len(), "element", u32::MAX as usize)?;
        buf.put_u32_le(element.len() as u32);
        buf.put_slice(element);
    }

    Ok(buf)
}

fn put_string(buf: &mut Vec<u8>, s: &str) -> Result<()> {
    check_len(s.len(), "string", u32::MAX as usize)?;
    buf.put_u32_le(s.len() as u32);
    buf.put_slice(s.as_bytes());
    Ok(())
}

fn payload_header(payload: &ActionPayload) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.put_u16_le(PAYLOAD_VERSION);
    put_string(&mut buf, &payload.dbid)?;
    put_string(&mut buf, &payload.action)?;
    Ok(buf)
}

/// Binary form of a call payload. Exactly one argument row.
pub fn encode_call_bytes(payload: &ActionPayload) -> Result<Vec<u8>> {
    if payload.rows.len() != 1 {
        return Err(KwilLinkError::Precondition(format!(
            "a call payload carries exactly one argument row, got {}",
            payload.rows.len()
        )));
    }
    let row = &payload.rows[0];
    check_len(row.len(), "argument count", u16::MAX as usize)?;

    let mut buf = payload_header(payload)?;
    buf.put_u16_le(row.len() as u16);
    for value in row {
        let record = encode_encoded_value(value)?;
        buf.put_u32_le(record.len() as u32);
        buf.put_slice(&record);
    }

    Ok(buf)
}

/// Binary form of an execute payload. Supports bulk argument rows.
pub fn encode_execute_bytes(payload: &ActionPayload) -> Result<Vec<u8>> {
    check_len(payload.rows.len(), "row count", u16::MAX as usize)?;

    let mut buf = payload_header(payload)?;
    buf.put_u16_le(payload.rows.len() as u16);
    for row in &payload.rows {
        check_len(row.len(), "column count", u16::MAX as usize)?;
        buf.put_u16_le(row.len() as u16);
        for value in row {
            let record = encode_encoded_value(value)?;
            buf.put_u32_le(record.len() as u32);
            buf.put_slice(&record);
        }
    }

    Ok(buf)
}

/// Base64 wire form of a call payload.
pub fn encode_call(payload: &ActionPayload) -> Result<String> {
    Ok(general_purpose::STANDARD.encode(encode_call_bytes(payload)?))
}

/// Base64 wire form of an execute payload.
pub fn encode_execute(payload: &ActionPayload) -> Result<String> {
    Ok(general_purpose::STANDARD.encode(encode_execute_bytes(payload)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_param;
    use crate::models::{ParamValue, VarType};

    #[test]
    fn test_descriptor_is_big_endian() {
        let dt = DataType::scalar(VarType::Text);
        let bytes = encode_data_type(&dt);
        let expected: Vec<u8> = vec![
            0x00, 0x00, // version, BE
            0x00, 0x00, 0x00, 0x04, // name length 4, BE
            b't', b'e', b'x', b't', // "text"
            0x00, // not an array
            0x00, 0x00, // no metadata
        ];
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_descriptor_numeric_metadata() {
        let dt = DataType {
            name: VarType::Numeric,
            is_array: false,
            metadata: Some((10, 2)),
        };
        let bytes = encode_data_type(&dt);
        let expected: Vec<u8> = vec![
            0x00, 0x00, // version
            0x00, 0x00, 0x00, 0x07, // name length 7
            b'n', b'u', b'm', b'e', b'r', b'i', b'c',
            0x00, // not an array
            0x00, 0x02, // two metadata elements
            0x00, 0x0a, // precision 10, BE
            0x00, 0x02, // scale 2, BE
        ];
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_encoded_value_record_is_little_endian_framed() {
        let ev = encode_param(
            &ParamValue::Text("hi".into()),
            &DataType::scalar(VarType::Text),
        )
        .unwrap();
        let bytes = encode_encoded_value(&ev).unwrap();

        let descriptor = encode_data_type(ev.data_type());
        let mut expected: Vec<u8> = Vec::new();
        expected.extend_from_slice(&[0x00, 0x00]); // record version, LE
        expected.extend_from_slice(&(descriptor.len() as u32).to_le_bytes());
        expected.extend_from_slice(&descriptor);
        expected.extend_from_slice(&[0x01, 0x00]); // one element, LE
        expected.extend_from_slice(&3u32.to_le_bytes()); // tag + "hi"
        expected.extend_from_slice(&[0x01, b'h', b'i']);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_call_rejects_multiple_rows() {
        let row = vec![];
        let payload = ActionPayload::new("db", "act", vec![row.clone(), row]);
        assert!(encode_call_bytes(&payload).is_err());
    }

    #[test]
    fn test_execute_encodes_rows_with_column_counts() {
        let ev = encode_param(&ParamValue::Int(1), &DataType::scalar(VarType::Int)).unwrap();
        let payload = ActionPayload::new("db", "act", vec![vec![ev.clone()], vec![ev]]);
        let bytes = encode_execute_bytes(&payload).unwrap();

        // header: version + "db" + "act"
        assert_eq!(&bytes[..2], &[0x00, 0x00]);
        assert_eq!(&bytes[2..6], &2u32.to_le_bytes());
        assert_eq!(&bytes[6..8], b"db");
        assert_eq!(&bytes[8..12], &3u32.to_le_bytes());
        assert_eq!(&bytes[12..15], b"act");
        // two rows, one column each
        assert_eq!(&bytes[15..17], &[0x02, 0x00]);
        assert_eq!(&bytes[17..19], &[0x01, 0x00]);
    }

    #[test]
    fn test_determinism() {
        let ev = encode_param(&ParamValue::Int(9), &DataType::scalar(VarType::Int)).unwrap();
        let payload = ActionPayload::new("db", "act", vec![vec![ev]]);
        assert_eq!(
            encode_execute_bytes(&payload).unwrap(),
            encode_execute_bytes(&payload).unwrap()
        );
        assert_eq!(encode_execute(&payload).unwrap(), encode_execute(&payload).unwrap());
    }
}
