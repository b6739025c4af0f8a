use crate::signer::SignatureData;
use serde::{Deserialize, Serialize};

/// Gateway authentication parameters fetched from the node.
///
/// Consumed once per handshake; the SDK never persists these. Domain,
/// version and chain id must match the client's configured values before
/// anything is signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayAuthInfo {
    /// One-time nonce embedded in the signed message
    pub nonce: String,

    /// Human-readable statement shown to the signer
    #[serde(default)]
    pub statement: String,

    /// RFC 3339 issuance timestamp
    pub issue_at: String,

    /// RFC 3339 expiry timestamp
    pub expiration_time: String,

    /// Chain id the gateway fronts
    pub chain_id: String,

    /// Gateway domain, e.g. `https://gateway.example.com`
    pub domain: String,

    /// Auth message format version
    pub version: String,

    /// Authentication endpoint URI
    pub uri: String,
}

/// Signed gateway authentication body submitted to obtain a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayAuthRequest {
    /// Echo of the nonce from [`GatewayAuthInfo`]
    pub nonce: String,

    /// Signer identifier, hex-encoded
    pub sender: String,

    /// Signature over the composed auth message
    pub signature: SignatureData,
}

/// Gateway session establishment result.
///
/// In a stateful transport the session cookie rides alongside this in the
/// HTTP response; the SDK treats the cookie as an opaque transport
/// concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSuccess {
    #[serde(default)]
    pub result: Option<String>,
}

/// Signature material for a private-mode view call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedCall {
    /// Signature over the composed call message
    pub signature: SignatureData,

    /// The consumed challenge, base64-encoded for the call body
    pub challenge: String,
}

/// Result of broadcasting a signed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResponse {
    /// Transaction hash, hex-encoded
    pub tx_hash: String,
}

/// Result of a read-only call message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallResponse {
    /// Query result rows as returned by the node
    #[serde(default)]
    pub result: serde_json::Value,
}
