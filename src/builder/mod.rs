//! Builders that turn caller intent into signed, transport-ready
//! objects.
//!
//! [`ActionBuilder`] covers action invocations (execute transactions and
//! view call messages); [`DbBuilder`] covers schema deployment and drop
//! transactions. Both run the same estimate → nonce → digest → sign
//! pipeline against the injected node provider.

mod action;
mod db;
mod input;

pub use action::ActionBuilder;
pub use db::DbBuilder;
pub use input::ActionInput;

use crate::error::{KwilLinkError, Result};
use crate::models::PayloadType;
use crate::signer::{execute_sign, SignatureData, SignatureType, Signer};
use crate::transport::NodeProvider;
use crate::tx::{payload_digest, transaction_sig_message, Transaction, TxBody, TxOverride};
use base64::{engine::general_purpose, Engine as _};
use log::debug;

/// Run the signing pipeline over already-encoded payload bytes:
/// fee estimate on the pre-signature transaction, nonce resolution,
/// digest, signature, final immutable object.
pub(crate) async fn assemble_signed_tx(
    provider: &dyn NodeProvider,
    chain_id: &str,
    payload_bytes: &[u8],
    payload_type: PayloadType,
    description: &str,
    pinned_nonce: Option<u64>,
    signer: &Signer,
    signature_type: SignatureType,
) -> Result<Transaction> {
    let unsigned = Transaction::unsigned(TxBody {
        payload: general_purpose::STANDARD.encode(payload_bytes),
        payload_type,
        fee: "0".to_string(),
        nonce: 0,
        chain_id: chain_id.to_string(),
        description: description.to_string(),
    });

    // A failed estimate is fatal for the build; nothing downstream runs.
    let fee = provider.estimate_cost(&unsigned).await?;
    debug!("[BUILD_TX] estimated fee={} type={}", fee, payload_type);

    let sender = signer.identifier_hex();
    let nonce = match pinned_nonce {
        Some(nonce) => nonce,
        None => {
            let account = provider.account(&sender).await?;
            let current = account.nonce.ok_or_else(|| {
                KwilLinkError::MissingData(format!("account '{}' returned no nonce", sender))
            })?;
            current + 1
        }
    };
    debug!("[BUILD_TX] resolved nonce={} sender={}", nonce, sender);

    let digest = payload_digest(payload_bytes);
    let message =
        transaction_sig_message(description, payload_type, &digest, &fee, nonce, chain_id);
    let raw = execute_sign(message.as_bytes(), signer, signature_type).await?;

    Ok(unsigned.copy_with(TxOverride {
        fee: Some(fee),
        nonce: Some(nonce),
        signature: Some(SignatureData::new(&raw, signature_type)),
        sender: Some(sender),
        ..Default::default()
    }))
}
