//! Cookie-based gateway authentication.
//!
//! The gateway issues signing parameters, the SDK verifies they belong to
//! the environment it was configured for, signs a fixed-format message,
//! and submits it; the session cookie rides the transport's cookie store
//! afterwards.

use crate::error::{KwilLinkError, Result};
use crate::models::{AuthSuccess, GatewayAuthInfo, GatewayAuthRequest};
use crate::signer::{execute_sign, SignatureData, Signer};
use crate::transport::NodeProvider;
use log::debug;
use std::sync::Arc;

/// Auth message format version this SDK speaks.
pub const GATEWAY_AUTH_VERSION: &str = "1";

/// Compose the gateway authentication message.
///
/// The gateway verifies this byte-exactly; field order and blank lines
/// are fixed, with no leading or trailing whitespace.
pub fn compose_gateway_auth_message(info: &GatewayAuthInfo) -> String {
    format!(
        "{} wants you to sign in with your account.\n\n{}\n\nURI: {}\nVersion: {}\nChain ID: {}\nNonce: {}\nIssued At: {}\nExpiration Time: {}",
        info.domain,
        info.statement,
        info.uri,
        info.version,
        info.chain_id,
        info.nonce,
        info.issue_at,
        info.expiration_time
    )
}

/// Gateway authentication flow bound to one client configuration.
pub struct GatewayAuth {
    provider: Arc<dyn NodeProvider>,
    domain: String,
    chain_id: String,
}

impl GatewayAuth {
    pub fn new(provider: Arc<dyn NodeProvider>, domain: impl Into<String>, chain_id: impl Into<String>) -> Self {
        Self {
            provider,
            domain: domain.into(),
            chain_id: chain_id.into(),
        }
    }

    /// Verify fetched parameters against the client's configuration.
    ///
    /// A mismatched domain, version, or chain id means the gateway is not
    /// the one this client was configured for; that is fatal, never
    /// silently coerced.
    fn verify_info(&self, info: &GatewayAuthInfo) -> Result<()> {
        if info.domain != self.domain {
            return Err(KwilLinkError::AuthenticationError(format!(
                "gateway domain mismatch: expected '{}', got '{}'",
                self.domain, info.domain
            )));
        }
        if info.version != GATEWAY_AUTH_VERSION {
            return Err(KwilLinkError::AuthenticationError(format!(
                "unsupported gateway auth version '{}' (supported: '{}')",
                info.version, GATEWAY_AUTH_VERSION
            )));
        }
        if info.chain_id != self.chain_id {
            return Err(KwilLinkError::AuthenticationError(format!(
                "gateway chain id mismatch: expected '{}', got '{}'",
                self.chain_id, info.chain_id
            )));
        }
        Ok(())
    }

    /// Authenticate the signer with the gateway and establish a session.
    pub async fn authenticate(&self, signer: &Signer) -> Result<AuthSuccess> {
        let info = self.provider.auth_info().await?;
        self.verify_info(&info)?;

        let message = compose_gateway_auth_message(&info);
        let sig_type = signer.resolve_type(None);
        let raw = execute_sign(message.as_bytes(), signer, sig_type).await?;

        let request = GatewayAuthRequest {
            nonce: info.nonce,
            sender: signer.identifier_hex(),
            signature: SignatureData::new(&raw, sig_type),
        };

        debug!("[GATEWAY_AUTH] authenticating sender={}", request.sender);
        self.provider.gateway_auth(&request).await
    }

    /// Invalidate the current gateway session.
    pub async fn logout(&self) -> Result<()> {
        debug!("[GATEWAY_AUTH] logging out");
        self.provider.gateway_logout().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> GatewayAuthInfo {
        GatewayAuthInfo {
            nonce: "abc123".to_string(),
            statement: "Sign in to the gateway.".to_string(),
            issue_at: "2024-01-01T00:00:00Z".to_string(),
            expiration_time: "2024-01-01T00:10:00Z".to_string(),
            chain_id: "kwil-chain-1".to_string(),
            domain: "https://gw.example.com".to_string(),
            version: "1".to_string(),
            uri: "https://gw.example.com/auth".to_string(),
        }
    }

    #[test]
    fn test_auth_message_is_byte_exact() {
        let message = compose_gateway_auth_message(&info());
        let expected = "https://gw.example.com wants you to sign in with your account.\n\
            \n\
            Sign in to the gateway.\n\
            \n\
            URI: https://gw.example.com/auth\n\
            Version: 1\n\
            Chain ID: kwil-chain-1\n\
            Nonce: abc123\n\
            Issued At: 2024-01-01T00:00:00Z\n\
            Expiration Time: 2024-01-01T00:10:00Z";
        assert_eq!(message, expected);
        assert!(!message.starts_with(char::is_whitespace));
        assert!(!message.ends_with(char::is_whitespace));
    }
}
