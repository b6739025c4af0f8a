#![allow(dead_code)]
//! Shared helpers for kwil-link integration tests.
//!
//! A configurable in-memory [`NodeProvider`] takes the place of a live
//! node; every call is recorded so tests can assert which network steps
//! ran (and, just as importantly, which never did).

use async_trait::async_trait;
use kwil_link::models::{
    Account, AuthSuccess, BroadcastResponse, CallResponse, GatewayAuthInfo, GatewayAuthRequest,
    SchemaDescriptor,
};
use kwil_link::{KwilLinkClient, KwilLinkError, Message, NodeProvider, Result, Signer, Transaction};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

pub const CHAIN_ID: &str = "kwil-chain-1";
pub const BASE_URL: &str = "http://localhost:8484";
pub const DBID: &str = "xsocial";

/// In-memory node with scriptable responses and a call log.
pub struct MockProvider {
    pub schema: Option<SchemaDescriptor>,
    pub fee: String,
    pub account_nonce: Option<u64>,
    pub challenge_hex: String,
    pub auth_info: Option<GatewayAuthInfo>,
    pub fail_estimate: bool,
    /// When set, `schema()` signals `entered_schema` and then blocks
    /// until `release_schema` has a permit.
    pub entered_schema: Option<Arc<Semaphore>>,
    pub release_schema: Option<Arc<Semaphore>>,
    pub calls: Mutex<Vec<String>>,
    pub auth_requests: Mutex<Vec<GatewayAuthRequest>>,
    pub broadcasts: Mutex<Vec<Transaction>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            schema: Some(social_schema()),
            fee: "100000".to_string(),
            account_nonce: Some(1),
            challenge_hex: "deadbeef".to_string(),
            auth_info: None,
            fail_estimate: false,
            entered_schema: None,
            release_schema: None,
            calls: Mutex::new(Vec::new()),
            auth_requests: Mutex::new(Vec::new()),
            broadcasts: Mutex::new(Vec::new()),
        }
    }
}

impl MockProvider {
    pub fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    pub fn call_log(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, name: &str) -> bool {
        self.call_log().iter().any(|c| c == name)
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.call_log().iter().filter(|c| c.as_str() == name).count()
    }
}

#[async_trait]
impl NodeProvider for MockProvider {
    async fn schema(&self, dbid: &str) -> Result<SchemaDescriptor> {
        self.record("schema");
        if let Some(entered) = &self.entered_schema {
            entered.add_permits(1);
        }
        if let Some(release) = &self.release_schema {
            let permit = release.acquire().await.expect("release semaphore closed");
            permit.forget();
        }
        self.schema.clone().ok_or_else(|| KwilLinkError::ServerError {
            status_code: 404,
            message: format!("namespace '{}' not found", dbid),
        })
    }

    async fn account(&self, identifier: &str) -> Result<Account> {
        self.record("account");
        Ok(Account {
            identifier: Some(identifier.to_string()),
            nonce: self.account_nonce,
            balance: Some("0".to_string()),
        })
    }

    async fn estimate_cost(&self, _tx: &Transaction) -> Result<String> {
        self.record("estimate");
        if self.fail_estimate {
            return Err(KwilLinkError::ServerError {
                status_code: 500,
                message: "estimator unavailable".to_string(),
            });
        }
        Ok(self.fee.clone())
    }

    async fn challenge(&self) -> Result<String> {
        self.record("challenge");
        Ok(self.challenge_hex.clone())
    }

    async fn broadcast(&self, tx: &Transaction) -> Result<BroadcastResponse> {
        self.record("broadcast");
        self.broadcasts.lock().unwrap().push(tx.clone());
        Ok(BroadcastResponse {
            tx_hash: "ab".repeat(32),
        })
    }

    async fn call(&self, _msg: &Message) -> Result<CallResponse> {
        self.record("call");
        Ok(CallResponse {
            result: serde_json::Value::Null,
        })
    }

    async fn auth_info(&self) -> Result<GatewayAuthInfo> {
        self.record("auth_info");
        self.auth_info.clone().ok_or_else(|| KwilLinkError::ServerError {
            status_code: 404,
            message: "gateway auth not configured".to_string(),
        })
    }

    async fn gateway_auth(&self, request: &GatewayAuthRequest) -> Result<AuthSuccess> {
        self.record("gateway_auth");
        self.auth_requests.lock().unwrap().push(request.clone());
        Ok(AuthSuccess {
            result: Some("ok".to_string()),
        })
    }

    async fn gateway_logout(&self) -> Result<()> {
        self.record("gateway_logout");
        Ok(())
    }

    async fn ping(&self) -> Result<String> {
        self.record("ping");
        Ok("pong".to_string())
    }
}

/// A schema with one execute action, one view action, and one private
/// action.
pub fn social_schema() -> SchemaDescriptor {
    serde_json::from_value(serde_json::json!({
        "owner": "ab01",
        "name": "social",
        "tables": [
            { "name": "posts", "columns": [
                { "name": "id", "type": "uuid" },
                { "name": "author", "type": "text" }
            ]}
        ],
        "actions": [
            {
                "name": "add_post",
                "parameters": [
                    { "name": "$id", "type": "uuid" },
                    { "name": "$user", "type": "text" }
                ],
                "modifiers": ["PUBLIC"]
            },
            {
                "name": "get_posts",
                "parameters": [{ "name": "$user", "type": "text" }],
                "modifiers": ["PUBLIC", "VIEW"]
            },
            {
                "name": "rate_post",
                "parameters": [
                    { "name": "$id", "type": "uuid" },
                    { "name": "$rating", "type": "numeric(5,2)" }
                ],
                "modifiers": ["PUBLIC"]
            },
            {
                "name": "admin_only",
                "parameters": [],
                "modifiers": ["PRIVATE"]
            }
        ]
    }))
    .expect("valid schema fixture")
}

pub fn ed25519_signer() -> Signer {
    Signer::Ed25519(ed25519_dalek::SigningKey::from_bytes(&[7u8; 32]))
}

pub fn client_with(provider: Arc<MockProvider>) -> KwilLinkClient {
    KwilLinkClient::builder()
        .base_url(BASE_URL)
        .chain_id(CHAIN_ID)
        .provider(provider)
        .build()
        .expect("client builds")
}

pub fn gateway_info() -> GatewayAuthInfo {
    GatewayAuthInfo {
        nonce: "abc123".to_string(),
        statement: "Sign in to the gateway.".to_string(),
        issue_at: "2024-01-01T00:00:00Z".to_string(),
        expiration_time: "2024-01-01T00:10:00Z".to_string(),
        chain_id: CHAIN_ID.to_string(),
        domain: BASE_URL.to_string(),
        version: "1".to_string(),
        uri: format!("{}/auth", BASE_URL),
    }
}
