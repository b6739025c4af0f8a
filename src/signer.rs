//! Uniform signing over heterogeneous key schemes.
//!
//! The node accepts signatures from secp256k1 wallets (Ethereum
//! personal-sign semantics), raw ed25519 keys, and out-of-process custom
//! signers. All three collapse into one closed [`Signer`] enum with a
//! single `sign(bytes)` entry point; signature-type inference is a match
//! over the variant, and an explicit type always overrides inference.

use crate::error::{KwilLinkError, Result};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::sync::Arc;

/// Signature scheme tag carried next to every signature on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureType {
    /// secp256k1 over an Ethereum personal-sign message
    #[serde(rename = "secp256k1_ep")]
    Secp256k1Personal,
    /// ed25519 over the raw message
    #[serde(rename = "ed25519")]
    Ed25519,
    /// Sentinel for an unset type; signing with it is always rejected
    #[serde(rename = "invalid")]
    Invalid,
}

impl SignatureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureType::Secp256k1Personal => "secp256k1_ep",
            SignatureType::Ed25519 => "ed25519",
            SignatureType::Invalid => "invalid",
        }
    }
}

/// A signature with its scheme tag, ready for a transaction, message, or
/// auth body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureData {
    /// Signature bytes, base64-encoded
    pub sig: String,

    #[serde(rename = "type")]
    pub sig_type: SignatureType,
}

impl SignatureData {
    pub fn new(raw: &[u8], sig_type: SignatureType) -> Self {
        Self {
            sig: general_purpose::STANDARD.encode(raw),
            sig_type,
        }
    }
}

/// Out-of-process signing callback.
///
/// Covers hardware wallets, remote signing services, and
/// network-specific signers: the implementation captures whatever
/// account or network context its ecosystem needs.
#[async_trait::async_trait]
pub trait CustomSigner: Send + Sync {
    /// Sign an opaque byte buffer, returning raw signature bytes.
    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>>;
}

/// A signing capability, polymorphic over key schemes.
#[derive(Clone)]
pub enum Signer {
    /// In-process secp256k1 key with Ethereum personal-sign semantics.
    /// Identifier: the 20-byte wallet address.
    Secp256k1Personal(k256::ecdsa::SigningKey),

    /// In-process ed25519 key signing the raw message.
    /// Identifier: the 32-byte public key.
    Ed25519(ed25519_dalek::SigningKey),

    /// Custom callback paired with an explicit scheme tag and the
    /// identifier bytes the node should attribute signatures to.
    Custom {
        callback: Arc<dyn CustomSigner>,
        signature_type: SignatureType,
        identifier: Vec<u8>,
    },
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signer::Secp256k1Personal(_) => f.write_str("Signer::Secp256k1Personal(<key>)"),
            Signer::Ed25519(_) => f.write_str("Signer::Ed25519(<key>)"),
            Signer::Custom { signature_type, .. } => {
                write!(f, "Signer::Custom({})", signature_type.as_str())
            }
        }
    }
}

impl Signer {
    /// The signature type inferred from the signer's shape.
    pub fn inferred_type(&self) -> SignatureType {
        match self {
            Signer::Secp256k1Personal(_) => SignatureType::Secp256k1Personal,
            Signer::Ed25519(_) => SignatureType::Ed25519,
            Signer::Custom { signature_type, .. } => *signature_type,
        }
    }

    /// Resolve the effective signature type: an explicit type always
    /// overrides inference.
    pub fn resolve_type(&self, explicit: Option<SignatureType>) -> SignatureType {
        explicit.unwrap_or_else(|| self.inferred_type())
    }

    /// The identifier the node attributes this signer's work to.
    pub fn identifier(&self) -> Vec<u8> {
        match self {
            Signer::Secp256k1Personal(key) => eth_address(key),
            Signer::Ed25519(key) => key.verifying_key().to_bytes().to_vec(),
            Signer::Custom { identifier, .. } => identifier.clone(),
        }
    }

    /// Hex form of [`Signer::identifier`], as used in `sender` fields.
    pub fn identifier_hex(&self) -> String {
        hex::encode(self.identifier())
    }
}

/// Sign a message with the given signer and signature type.
///
/// The `Invalid` sentinel is rejected here, immediately before use,
/// rather than deferred to the node.
pub async fn execute_sign(
    message: &[u8],
    signer: &Signer,
    signature_type: SignatureType,
) -> Result<Vec<u8>> {
    if signature_type == SignatureType::Invalid {
        return Err(KwilLinkError::SigningError(
            "cannot sign with the invalid signature type".to_string(),
        ));
    }

    match signer {
        Signer::Secp256k1Personal(key) => personal_sign(key, message),
        Signer::Ed25519(key) => {
            use ed25519_dalek::Signer as _;
            Ok(key.sign(message).to_bytes().to_vec())
        }
        Signer::Custom { callback, .. } => callback.sign(message).await,
    }
}

/// Ethereum personal-sign: keccak256 of the prefixed message, recoverable
/// signature serialized as r || s || v with v in {27, 28}.
fn personal_sign(key: &k256::ecdsa::SigningKey, message: &[u8]) -> Result<Vec<u8>> {
    let mut hasher = Keccak256::new();
    hasher.update(format!("\x19Ethereum Signed Message:\n{}", message.len()).as_bytes());
    hasher.update(message);
    let digest = hasher.finalize();

    let (signature, recovery_id) = key
        .sign_prehash_recoverable(&digest)
        .map_err(|e| KwilLinkError::SigningError(format!("secp256k1 signing failed: {}", e)))?;

    let mut out = signature.to_bytes().to_vec();
    out.push(recovery_id.to_byte() + 27);
    Ok(out)
}

/// 20-byte wallet address: keccak256 of the uncompressed public key body.
fn eth_address(key: &k256::ecdsa::SigningKey) -> Vec<u8> {
    use k256::elliptic_curve::sec1::ToEncodedPoint;
    let point = key.verifying_key().to_encoded_point(false);
    let digest = Keccak256::digest(&point.as_bytes()[1..]);
    digest[12..].to_vec()
}
