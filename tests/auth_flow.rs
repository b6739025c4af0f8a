//! Gateway and private-mode authentication flows against a scripted mock
//! node.

mod common;

use base64::{engine::general_purpose, Engine as _};
use common::*;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use kwil_link::auth::{compose_call_message, compose_gateway_auth_message};
use kwil_link::codec::{encode_call_bytes, encode_param};
use kwil_link::models::{ActionPayload, DataType, ParamValue, VarType};
use kwil_link::tx::payload_digest;
use kwil_link::{ActionInput, KwilLinkError, SignatureType};
use std::sync::Arc;

fn verify_ed25519(signer_hex: &str, message: &[u8], sig_b64: &str) -> bool {
    let public = VerifyingKey::from_bytes(
        hex::decode(signer_hex).unwrap().as_slice().try_into().unwrap(),
    )
    .unwrap();
    let raw = general_purpose::STANDARD.decode(sig_b64).unwrap();
    let signature = Signature::from_slice(&raw).unwrap();
    public.verify(message, &signature).is_ok()
}

// =============================================================================
// Gateway (cookie) authentication
// =============================================================================

#[tokio::test]
async fn test_gateway_authentication_happy_path() {
    let provider = Arc::new(MockProvider {
        auth_info: Some(gateway_info()),
        ..Default::default()
    });
    let client = client_with(Arc::clone(&provider));
    let signer = ed25519_signer();

    let success = client.authenticate(&signer).await.unwrap();
    assert_eq!(success.result.as_deref(), Some("ok"));

    let requests = provider.auth_requests.lock().unwrap();
    let request = &requests[0];
    assert_eq!(request.nonce, "abc123");
    assert_eq!(request.sender, signer.identifier_hex());
    assert_eq!(request.signature.sig_type, SignatureType::Ed25519);

    // The signature covers the byte-exact composed message
    let message = compose_gateway_auth_message(&gateway_info());
    assert!(verify_ed25519(&request.sender, message.as_bytes(), &request.signature.sig));
}

#[tokio::test]
async fn test_gateway_domain_mismatch_is_fatal() {
    let mut info = gateway_info();
    info.domain = "https://evil.example.com".to_string();
    let provider = Arc::new(MockProvider {
        auth_info: Some(info),
        ..Default::default()
    });
    let client = client_with(Arc::clone(&provider));

    let err = client.authenticate(&ed25519_signer()).await.unwrap_err();
    assert!(matches!(err, KwilLinkError::AuthenticationError(_)));
    // Nothing was signed or submitted
    assert!(!provider.called("gateway_auth"));
}

#[tokio::test]
async fn test_gateway_version_mismatch_is_fatal() {
    let mut info = gateway_info();
    info.version = "2".to_string();
    let provider = Arc::new(MockProvider {
        auth_info: Some(info),
        ..Default::default()
    });
    let client = client_with(Arc::clone(&provider));

    let err = client.authenticate(&ed25519_signer()).await.unwrap_err();
    assert!(matches!(err, KwilLinkError::AuthenticationError(_)));
}

#[tokio::test]
async fn test_gateway_chain_id_mismatch_is_fatal() {
    let mut info = gateway_info();
    info.chain_id = "other-chain".to_string();
    let provider = Arc::new(MockProvider {
        auth_info: Some(info),
        ..Default::default()
    });
    let client = client_with(Arc::clone(&provider));

    let err = client.authenticate(&ed25519_signer()).await.unwrap_err();
    assert!(matches!(err, KwilLinkError::AuthenticationError(_)));
    assert!(!provider.called("gateway_auth"));
}

#[tokio::test]
async fn test_logout() {
    let provider = Arc::new(MockProvider::default());
    let client = client_with(Arc::clone(&provider));

    client.logout().await.unwrap();
    assert!(provider.called("gateway_logout"));
}

// =============================================================================
// Private-mode challenge/response
// =============================================================================

fn one_row_payload() -> ActionPayload {
    let user = encode_param(
        &ParamValue::Text("Luke".into()),
        &DataType::scalar(VarType::Text),
    )
    .unwrap();
    ActionPayload::new(DBID, "get_posts", vec![vec![user]])
}

#[tokio::test]
async fn test_challenge_and_sign_happy_path() {
    let provider = Arc::new(MockProvider::default());
    let client = client_with(Arc::clone(&provider));
    let signer = ed25519_signer();

    let payload = one_row_payload();
    let signed = client.challenge_and_sign(&payload, &signer).await.unwrap();

    // Challenge travels base64-encoded ("deadbeef" hex)
    assert_eq!(signed.challenge, "3q2+7w==");
    assert_eq!(signed.signature.sig_type, SignatureType::Ed25519);

    let digest = payload_digest(&encode_call_bytes(&payload).unwrap());
    let message = compose_call_message(DBID, "get_posts", &digest, "deadbeef");
    assert!(verify_ed25519(
        &signer.identifier_hex(),
        message.as_bytes(),
        &signed.signature.sig
    ));
}

#[tokio::test]
async fn test_challenge_and_sign_rejects_multiple_rows_before_network() {
    let provider = Arc::new(MockProvider::default());
    let client = client_with(Arc::clone(&provider));

    let row = one_row_payload().rows.remove(0);
    let payload = ActionPayload::new(DBID, "get_posts", vec![row.clone(), row]);

    let err = client
        .challenge_and_sign(&payload, &ed25519_signer())
        .await
        .unwrap_err();
    assert!(matches!(err, KwilLinkError::Precondition(_)));
    // Fatal precondition: no challenge was ever requested
    assert!(provider.call_log().is_empty());
}

#[tokio::test]
async fn test_build_msg_private_mode_with_pinned_challenge() {
    let provider = Arc::new(MockProvider::default());
    let client = client_with(Arc::clone(&provider));
    let signer = ed25519_signer();

    let builder = client
        .action()
        .dbid(DBID)
        .name("get_posts")
        .signer(signer.clone())
        .challenge("deadbeef");
    builder.concat(ActionInput::new().put("$user", "Luke")).unwrap();

    let msg = builder.build_msg().await.unwrap();

    // The pinned challenge was consumed; none was fetched
    assert!(!provider.called("challenge"));
    assert_eq!(msg.body().challenge, "3q2+7w==");
    assert_eq!(msg.auth_type(), SignatureType::Ed25519);
    assert_eq!(msg.sender(), Some(signer.identifier_hex().as_str()));
    assert!(msg.signature().is_some());
}

#[tokio::test]
async fn test_build_msg_fetches_challenge_when_not_pinned() {
    let provider = Arc::new(MockProvider::default());
    let client = client_with(Arc::clone(&provider));

    let builder = client
        .action()
        .dbid(DBID)
        .name("get_posts")
        .signer(ed25519_signer());
    builder.concat(ActionInput::new().put("$user", "Luke")).unwrap();

    let msg = builder.build_msg().await.unwrap();
    assert!(provider.called("challenge"));
    assert_eq!(msg.body().challenge, "3q2+7w==");
}

#[tokio::test]
async fn test_build_msg_unsigned_without_signer() {
    let provider = Arc::new(MockProvider::default());
    let client = client_with(Arc::clone(&provider));

    let builder = client.action().dbid(DBID).name("get_posts");
    builder.concat(ActionInput::new().put("$user", "Luke")).unwrap();

    let msg = builder.build_msg().await.unwrap();
    assert!(msg.signature().is_none());
    assert!(msg.sender().is_none());
    assert_eq!(msg.body().challenge, "");
    assert!(!provider.called("challenge"));
}

#[tokio::test]
async fn test_build_msg_rejects_multiple_rows_before_network() {
    let provider = Arc::new(MockProvider::default());
    let client = client_with(Arc::clone(&provider));

    let builder = client
        .action()
        .dbid(DBID)
        .name("get_posts")
        .signer(ed25519_signer());
    builder.concat(ActionInput::new().put("$user", "Luke")).unwrap();
    builder.concat(ActionInput::new().put("$user", "Leia")).unwrap();

    let err = builder.build_msg().await.unwrap_err();
    assert!(matches!(err, KwilLinkError::Precondition(_)));
    assert!(provider.call_log().is_empty());
}
