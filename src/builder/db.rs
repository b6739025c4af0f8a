//! Schema deployment and drop builder.
//!
//! Deploy/drop payloads are canonical JSON documents rather than the
//! binary action layout; they run through the same estimate → nonce →
//! sign pipeline as action transactions.

use crate::builder::assemble_signed_tx;
use crate::error::{KwilLinkError, Result};
use crate::models::PayloadType;
use crate::signer::{SignatureType, Signer};
use crate::transport::NodeProvider;
use crate::tx::Transaction;
use log::debug;
use std::sync::Arc;

/// Builder for schema lifecycle transactions.
pub struct DbBuilder {
    provider: Arc<dyn NodeProvider>,
    chain_id: String,
    signer: Option<Signer>,
    signature_type: Option<SignatureType>,
    description: String,
    nonce: Option<u64>,
}

impl DbBuilder {
    pub(crate) fn new(provider: Arc<dyn NodeProvider>, chain_id: String) -> Self {
        Self {
            provider,
            chain_id,
            signer: None,
            signature_type: None,
            description: String::new(),
            nonce: None,
        }
    }

    /// Signing capability used for the final signature.
    pub fn signer(mut self, signer: Signer) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Explicit signature type; overrides inference from the signer.
    pub fn signature_type(mut self, signature_type: SignatureType) -> Self {
        self.signature_type = Some(signature_type);
        self
    }

    /// Human-readable description embedded in the signed message.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Pin the transaction nonce instead of resolving it from the
    /// account.
    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    fn signer_and_type(&self) -> Result<(&Signer, SignatureType)> {
        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| KwilLinkError::Precondition("signer is required".to_string()))?;
        Ok((signer, signer.resolve_type(self.signature_type)))
    }

    /// Build a signed schema deployment transaction.
    ///
    /// The schema document is serialized as canonical JSON; the node
    /// compiles and validates it on its side.
    pub async fn deploy(&self, schema: &serde_json::Value) -> Result<Transaction> {
        if !schema.is_object() {
            return Err(KwilLinkError::Precondition(
                "schema document must be a JSON object".to_string(),
            ));
        }
        let (signer, signature_type) = self.signer_and_type()?;
        let payload_bytes = serde_json::to_vec(schema)?;
        debug!("[DB_BUILDER] deploying schema ({} bytes)", payload_bytes.len());

        assemble_signed_tx(
            self.provider.as_ref(),
            &self.chain_id,
            &payload_bytes,
            PayloadType::DeploySchema,
            &self.description,
            self.nonce,
            signer,
            signature_type,
        )
        .await
    }

    /// Build a signed drop-database transaction.
    pub async fn drop_database(&self, dbid: &str) -> Result<Transaction> {
        if dbid.is_empty() {
            return Err(KwilLinkError::Precondition("dbid is required".to_string()));
        }
        let (signer, signature_type) = self.signer_and_type()?;
        let payload_bytes = serde_json::to_vec(&serde_json::json!({ "dbid": dbid }))?;
        debug!("[DB_BUILDER] dropping dbid={}", dbid);

        assemble_signed_tx(
            self.provider.as_ref(),
            &self.chain_id,
            &payload_bytes,
            PayloadType::DropSchema,
            &self.description,
            self.nonce,
            signer,
            signature_type,
        )
        .await
    }
}
