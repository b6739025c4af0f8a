//! Binary wire encoding for values and action payloads.
//!
//! The layouts in this module are an external compatibility contract with
//! the node's own decoder: field order, length-prefix widths, and the
//! mixed little-endian framing / big-endian type-descriptor encoding must
//! all be preserved exactly.

mod payload;
mod value;

pub use payload::{
    encode_call, encode_call_bytes, encode_data_type, encode_encoded_value, encode_execute,
    encode_execute_bytes,
};
pub use value::{encode_not_null, encode_param, encode_value};
