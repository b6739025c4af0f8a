use crate::models::EncodedValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payload type tag carried in the transaction body and in the signed
/// message template.
///
/// The serialized names are part of the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadType {
    #[serde(rename = "invalid")]
    Invalid,
    #[serde(rename = "deploy_schema")]
    DeploySchema,
    #[serde(rename = "drop_schema")]
    DropSchema,
    #[serde(rename = "execute")]
    Execute,
    #[serde(rename = "call")]
    Call,
    #[serde(rename = "transfer")]
    Transfer,
}

impl PayloadType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadType::Invalid => "invalid",
            PayloadType::DeploySchema => "deploy_schema",
            PayloadType::DropSchema => "drop_schema",
            PayloadType::Execute => "execute",
            PayloadType::Call => "call",
            PayloadType::Transfer => "transfer",
        }
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action invocation ready for the payload codec.
///
/// `rows` holds one encoded argument row per execution. A call payload
/// never carries more than one row; execute payloads support bulk rows.
#[derive(Debug, Clone)]
pub struct ActionPayload {
    /// Target namespace / database id
    pub dbid: String,
    /// Action name, lowercased
    pub action: String,
    /// Encoded argument rows
    pub rows: Vec<Vec<EncodedValue>>,
}

impl ActionPayload {
    pub fn new(dbid: impl Into<String>, action: impl Into<String>, rows: Vec<Vec<EncodedValue>>) -> Self {
        Self {
            dbid: dbid.into(),
            action: action.into(),
            rows,
        }
    }
}
