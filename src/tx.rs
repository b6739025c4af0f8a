//! Immutable transaction and call-message value objects.
//!
//! Both are created by the final signing step and never mutated
//! afterwards; adjustments go through a copy-and-override constructor
//! that clones every field and replaces only the given ones.

use crate::models::PayloadType;
use crate::signer::SignatureData;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Serialization tag stamped on every signed object.
pub const SERIALIZATION_TYPE: &str = "concat";

/// The canonical payload digest: the first 20 bytes of SHA-256.
pub fn payload_digest(payload: &[u8]) -> [u8; 20] {
    let hash = Sha256::digest(payload);
    let mut digest = [0u8; 20];
    digest.copy_from_slice(&hash[..20]);
    digest
}

/// Compose the message a signer approves for a transaction.
///
/// The node verifies this byte-exactly: fixed field order, single blank
/// lines, no leading or trailing whitespace.
pub fn transaction_sig_message(
    description: &str,
    payload_type: PayloadType,
    digest: &[u8; 20],
    fee: &str,
    nonce: u64,
    chain_id: &str,
) -> String {
    format!(
        "{}\n\nPayloadType: {}\nPayloadDigest: {}\nFee: {}\nNonce: {}\n\nKwil Chain ID: {}",
        description,
        payload_type,
        hex::encode(digest),
        fee,
        nonce,
        chain_id
    )
}

/// The signed portion of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxBody {
    /// Base64-encoded binary payload
    pub payload: String,

    #[serde(rename = "type")]
    pub payload_type: PayloadType,

    /// Fee as a decimal string
    pub fee: String,

    pub nonce: u64,

    pub chain_id: String,

    #[serde(default)]
    pub description: String,
}

/// Field overrides for [`Transaction::copy_with`].
#[derive(Debug, Default)]
pub struct TxOverride {
    pub fee: Option<String>,
    pub nonce: Option<u64>,
    pub description: Option<String>,
    pub signature: Option<SignatureData>,
    pub sender: Option<String>,
}

/// A transport-ready transaction.
///
/// Unsigned instances exist only as fee-estimation probes; the build
/// pipeline returns a fully signed instance or an error, never a partial
/// object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    signature: Option<SignatureData>,

    body: TxBody,

    /// Sender identifier, hex-encoded
    #[serde(skip_serializing_if = "Option::is_none")]
    sender: Option<String>,

    serialization: String,
}

impl Transaction {
    /// A pre-signature transaction used for fee estimation.
    pub fn unsigned(body: TxBody) -> Self {
        Self {
            signature: None,
            body,
            sender: None,
            serialization: SERIALIZATION_TYPE.to_string(),
        }
    }

    /// The terminal, signed form.
    pub fn signed(body: TxBody, signature: SignatureData, sender: String) -> Self {
        Self {
            signature: Some(signature),
            body,
            sender: Some(sender),
            serialization: SERIALIZATION_TYPE.to_string(),
        }
    }

    /// Copy-and-override constructor: clones all fields, replaces the
    /// given ones.
    pub fn copy_with(&self, overrides: TxOverride) -> Self {
        let mut next = self.clone();
        if let Some(fee) = overrides.fee {
            next.body.fee = fee;
        }
        if let Some(nonce) = overrides.nonce {
            next.body.nonce = nonce;
        }
        if let Some(description) = overrides.description {
            next.body.description = description;
        }
        if let Some(signature) = overrides.signature {
            next.signature = Some(signature);
        }
        if let Some(sender) = overrides.sender {
            next.sender = Some(sender);
        }
        next
    }

    pub fn body(&self) -> &TxBody {
        &self.body
    }

    pub fn signature(&self) -> Option<&SignatureData> {
        self.signature.as_ref()
    }

    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }
}

/// The body of a read-only call message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallBody {
    /// Base64-encoded binary call payload
    pub payload: String,

    /// Base64-encoded challenge for private mode; empty otherwise
    #[serde(default)]
    pub challenge: String,
}

/// A transport-ready call message.
///
/// Public view calls go out unsigned; private-mode calls carry a
/// challenge and a signature over the view-call message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    body: CallBody,

    #[serde(rename = "auth_type")]
    auth_type: crate::signer::SignatureType,

    #[serde(skip_serializing_if = "Option::is_none")]
    sender: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    signature: Option<SignatureData>,
}

impl Message {
    /// An unsigned public view call.
    pub fn unsigned(payload: String, sender: Option<String>) -> Self {
        Self {
            body: CallBody {
                payload,
                challenge: String::new(),
            },
            auth_type: crate::signer::SignatureType::Invalid,
            sender,
            signature: None,
        }
    }

    /// A private-mode call carrying the consumed challenge and a
    /// signature over the view-call message.
    pub fn signed(
        payload: String,
        challenge: String,
        signature: SignatureData,
        sender: String,
    ) -> Self {
        let auth_type = signature.sig_type;
        Self {
            body: CallBody { payload, challenge },
            auth_type,
            sender: Some(sender),
            signature: Some(signature),
        }
    }

    pub fn body(&self) -> &CallBody {
        &self.body
    }

    pub fn signature(&self) -> Option<&SignatureData> {
        self.signature.as_ref()
    }

    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    pub fn auth_type(&self) -> crate::signer::SignatureType {
        self.auth_type
    }
}
