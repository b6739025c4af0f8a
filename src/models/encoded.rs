use crate::models::DataType;

/// A value after binary encoding: its type descriptor plus an ordered
/// list of length-prefixed element buffers.
///
/// Scalars carry exactly one element; arrays carry one per member.
/// Immutable once built; embedded into call/execute payloads by the
/// payload codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedValue {
    data_type: DataType,
    elements: Vec<Vec<u8>>,
}

impl EncodedValue {
    pub fn new(data_type: DataType, elements: Vec<Vec<u8>>) -> Self {
        Self {
            data_type,
            elements,
        }
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn elements(&self) -> &[Vec<u8>] {
        &self.elements
    }
}
