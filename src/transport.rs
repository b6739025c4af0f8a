//! The node boundary: JSON-RPC-shaped calls consumed by the build
//! pipeline and the auth subsystem.
//!
//! [`NodeProvider`] is the seam tests mock; [`HttpProvider`] is the
//! reqwest-backed implementation the client wires up. Nothing here
//! retries: retry policy belongs to the transport layer above, never to
//! this core.

use crate::error::{KwilLinkError, Result};
use crate::models::{
    Account, AuthSuccess, BroadcastResponse, CallResponse, GatewayAuthInfo, GatewayAuthRequest,
    SchemaDescriptor,
};
use crate::tx::{Message, Transaction};
use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Remote node operations consumed by builders and auth flows.
#[async_trait::async_trait]
pub trait NodeProvider: Send + Sync {
    /// Resolve a deployed schema by dbid.
    async fn schema(&self, dbid: &str) -> Result<SchemaDescriptor>;

    /// Fetch account state for a hex identifier.
    async fn account(&self, identifier: &str) -> Result<Account>;

    /// Estimate the fee for a pre-signature transaction.
    async fn estimate_cost(&self, tx: &Transaction) -> Result<String>;

    /// Fetch a one-time private-mode challenge (hex).
    async fn challenge(&self) -> Result<String>;

    /// Submit a signed transaction.
    async fn broadcast(&self, tx: &Transaction) -> Result<BroadcastResponse>;

    /// Submit a read-only call message.
    async fn call(&self, msg: &Message) -> Result<CallResponse>;

    /// Fetch gateway authentication parameters.
    async fn auth_info(&self) -> Result<GatewayAuthInfo>;

    /// Submit a signed gateway authentication body.
    async fn gateway_auth(&self, request: &GatewayAuthRequest) -> Result<AuthSuccess>;

    /// Invalidate the gateway session.
    async fn gateway_logout(&self) -> Result<()>;

    /// Liveness probe.
    async fn ping(&self) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, P: Serialize> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    #[serde(default = "Option::default")]
    result: Option<T>,
    #[serde(default = "Option::default")]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
struct SchemaParams<'a> {
    dbid: &'a str,
}

#[derive(Debug, Deserialize)]
struct SchemaResult {
    schema: SchemaDescriptor,
}

#[derive(Debug, Serialize)]
struct AccountParams<'a> {
    identifier: &'a str,
}

#[derive(Debug, Serialize)]
struct TxParams<'a> {
    tx: &'a Transaction,
}

#[derive(Debug, Deserialize)]
struct EstimateResult {
    price: String,
}

#[derive(Debug, Deserialize)]
struct ChallengeResult {
    challenge: String,
}

#[derive(Debug, Deserialize)]
struct PingResult {
    message: String,
}

/// JSON-RPC node provider over HTTP.
///
/// The reqwest client is shared with the owning [`crate::KwilLinkClient`]
/// so the gateway session cookie set during authentication rides along on
/// every subsequent call.
#[derive(Debug)]
pub struct HttpProvider {
    base_url: String,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl HttpProvider {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            http,
            next_id: AtomicU64::new(1),
        }
    }

    async fn rpc<P: Serialize + Send + Sync, T: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<T> {
        let url = format!("{}/rpc/v1", self.base_url);
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        debug!("[RPC] POST {} method={}", url, method);
        let response = self.http.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            debug!("[RPC] method={} failed: status={} body={}", method, status, message);
            return Err(KwilLinkError::ServerError {
                status_code: status.as_u16(),
                message,
            });
        }

        let envelope: JsonRpcResponse<T> = response.json().await?;
        if let Some(err) = envelope.error {
            debug!("[RPC] method={} node error: code={} {}", method, err.code, err.message);
            return Err(KwilLinkError::ServerError {
                status_code: status.as_u16(),
                message: format!("{} (code {})", err.message, err.code),
            });
        }

        envelope.result.ok_or_else(|| KwilLinkError::ServerError {
            status_code: status.as_u16(),
            message: format!("empty result for method {}", method),
        })
    }

    async fn gateway_post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("[GATEWAY] POST {}", url);
        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(KwilLinkError::ServerError {
                status_code: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait::async_trait]
impl NodeProvider for HttpProvider {
    async fn schema(&self, dbid: &str) -> Result<SchemaDescriptor> {
        let result: SchemaResult = self.rpc("user.schema", SchemaParams { dbid }).await?;
        Ok(result.schema)
    }

    async fn account(&self, identifier: &str) -> Result<Account> {
        self.rpc("user.account", AccountParams { identifier }).await
    }

    async fn estimate_cost(&self, tx: &Transaction) -> Result<String> {
        let result: EstimateResult = self.rpc("user.estimate_price", TxParams { tx }).await?;
        Ok(result.price)
    }

    async fn challenge(&self) -> Result<String> {
        let result: ChallengeResult = self.rpc("user.challenge", serde_json::json!({})).await?;
        Ok(result.challenge)
    }

    async fn broadcast(&self, tx: &Transaction) -> Result<BroadcastResponse> {
        self.rpc("user.broadcast", TxParams { tx }).await
    }

    async fn call(&self, msg: &Message) -> Result<CallResponse> {
        self.rpc("user.call", msg).await
    }

    async fn auth_info(&self) -> Result<GatewayAuthInfo> {
        let url = format!("{}/auth", self.base_url);
        debug!("[GATEWAY] GET {}", url);
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(KwilLinkError::ServerError {
                status_code: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<GatewayAuthInfo>().await?)
    }

    async fn gateway_auth(&self, request: &GatewayAuthRequest) -> Result<AuthSuccess> {
        self.gateway_post("/auth", request).await
    }

    async fn gateway_logout(&self) -> Result<()> {
        let _: AuthSuccess = self.gateway_post("/logout", &serde_json::json!({})).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<String> {
        let result: PingResult = self.rpc("user.ping", serde_json::json!({})).await?;
        Ok(result.message)
    }
}
