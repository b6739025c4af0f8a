//! Private-mode challenge/response authentication for view calls.
//!
//! Nodes running in private mode hand out one-time challenges; the caller
//! signs a short fixed-format message binding the challenge to the exact
//! call payload it authorizes.

use crate::codec::encode_call_bytes;
use crate::error::{KwilLinkError, Result};
use crate::models::{ActionPayload, SignedCall};
use crate::signer::{execute_sign, SignatureData, Signer};
use crate::transport::NodeProvider;
use crate::tx::payload_digest;
use base64::{engine::general_purpose, Engine as _};
use log::debug;

/// Compose the private-mode view-call message.
///
/// Verified byte-exactly by the node: fixed field order, one blank line
/// after the heading, no leading or trailing whitespace.
pub fn compose_call_message(dbid: &str, action: &str, digest: &[u8; 20], challenge: &str) -> String {
    format!(
        "Kwil view call.\n\nDBID: {}\nMethod: {}\nDigest: {}\nChallenge: {}",
        dbid,
        action,
        hex::encode(digest),
        challenge
    )
}

/// Convert the node's hex challenge into the base64 form carried in the
/// call body.
pub(crate) fn challenge_to_base64(challenge: &str) -> Result<String> {
    let raw = hex::decode(challenge).map_err(|_| {
        KwilLinkError::AuthenticationError(format!("node returned a malformed challenge '{}'", challenge))
    })?;
    Ok(general_purpose::STANDARD.encode(raw))
}

/// Fetch a one-time challenge and sign the given call payload under it.
///
/// More than one input row is rejected before any network round-trip: the
/// protocol authorizes exactly one call.
pub async fn challenge_and_sign(
    provider: &dyn NodeProvider,
    payload: &ActionPayload,
    signer: &Signer,
) -> Result<SignedCall> {
    if payload.rows.len() > 1 {
        return Err(KwilLinkError::Precondition(format!(
            "a view call authorizes a single input row, got {}",
            payload.rows.len()
        )));
    }

    let challenge = provider.challenge().await?;
    sign_with_challenge(payload, signer, &challenge).await
}

/// Sign a call payload under an already-fetched challenge.
pub(crate) async fn sign_with_challenge(
    payload: &ActionPayload,
    signer: &Signer,
    challenge: &str,
) -> Result<SignedCall> {
    let payload_bytes = encode_call_bytes(payload)?;
    let digest = payload_digest(&payload_bytes);
    let message = compose_call_message(&payload.dbid, &payload.action, &digest, challenge);

    let sig_type = signer.resolve_type(None);
    let raw = execute_sign(message.as_bytes(), signer, sig_type).await?;

    debug!(
        "[PRIVATE_AUTH] signed view call dbid={} action={}",
        payload.dbid, payload.action
    );

    Ok(SignedCall {
        signature: SignatureData::new(&raw, sig_type),
        challenge: challenge_to_base64(challenge)?,
    })
}
