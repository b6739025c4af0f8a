//! Main Kwil client with builder pattern.
//!
//! Provides the primary interface for connecting to Kwil nodes and
//! constructing signed transactions, call messages, and authenticated
//! sessions.

use crate::auth::GatewayAuth;
use crate::builder::{ActionBuilder, DbBuilder};
use crate::cache::{CacheMode, TtlCache};
use crate::error::{KwilLinkError, Result};
use crate::models::{
    ActionPayload, AuthSuccess, BroadcastResponse, CallResponse, SchemaDescriptor, SignedCall,
};
use crate::signer::Signer;
use crate::timeouts::KwilLinkTimeouts;
use crate::transport::{HttpProvider, NodeProvider};
use crate::tx::{Message, Transaction};
use log::debug;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_SCHEMA_TTL: Duration = Duration::from_secs(600);

/// Main Kwil client.
///
/// Use [`KwilLinkClientBuilder`] to construct instances with custom
/// configuration.
///
/// # Examples
///
/// ```rust,no_run
/// use kwil_link::KwilLinkClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = KwilLinkClient::builder()
///     .base_url("http://localhost:8484")
///     .chain_id("kwil-chain-1")
///     .timeouts(kwil_link::KwilLinkTimeouts::fast())
///     .build()?;
///
/// let message = client.ping().await?;
/// println!("node says: {}", message);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct KwilLinkClient {
    base_url: String,
    chain_id: String,
    provider: Arc<dyn NodeProvider>,
    schema_cache: Arc<TtlCache<SchemaDescriptor>>,
    timeouts: KwilLinkTimeouts,
}

impl KwilLinkClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> KwilLinkClientBuilder {
        KwilLinkClientBuilder::new()
    }

    /// Start building an action invocation.
    ///
    /// Each builder instance drives one logical call; run concurrent
    /// operations against separate builders.
    pub fn action(&self) -> ActionBuilder {
        ActionBuilder::new(
            Arc::clone(&self.provider),
            Arc::clone(&self.schema_cache),
            self.chain_id.clone(),
        )
    }

    /// Start building a schema deployment or drop transaction.
    pub fn db(&self) -> DbBuilder {
        DbBuilder::new(Arc::clone(&self.provider), self.chain_id.clone())
    }

    /// Authenticate with the gateway and establish a session cookie.
    pub async fn authenticate(&self, signer: &Signer) -> Result<AuthSuccess> {
        self.gateway().authenticate(signer).await
    }

    /// Invalidate the gateway session.
    pub async fn logout(&self) -> Result<()> {
        self.gateway().logout().await
    }

    /// Fetch a one-time challenge and sign the given call payload under
    /// the private-mode protocol.
    pub async fn challenge_and_sign(
        &self,
        payload: &ActionPayload,
        signer: &Signer,
    ) -> Result<SignedCall> {
        crate::auth::challenge_and_sign(self.provider.as_ref(), payload, signer).await
    }

    /// Submit a signed transaction to the node.
    pub async fn broadcast(&self, tx: &Transaction) -> Result<BroadcastResponse> {
        if !tx.is_signed() {
            return Err(KwilLinkError::Precondition(
                "cannot broadcast an unsigned transaction".to_string(),
            ));
        }
        debug!("[BROADCAST] type={}", tx.body().payload_type);
        self.provider.broadcast(tx).await
    }

    /// Submit a read-only call message to the node.
    pub async fn call(&self, msg: &Message) -> Result<CallResponse> {
        self.provider.call(msg).await
    }

    /// Resolve a deployed schema, consulting the client's schema cache.
    pub async fn schema(&self, dbid: &str) -> Result<SchemaDescriptor> {
        if let Some(schema) = self.schema_cache.get(dbid) {
            debug!("[SCHEMA_CACHE] hit dbid={}", dbid);
            return Ok(schema);
        }
        let schema = self.provider.schema(dbid).await?;
        self.schema_cache.set(dbid, schema.clone());
        Ok(schema)
    }

    /// Fetch account state for a hex identifier.
    pub async fn account(&self, identifier: &str) -> Result<crate::models::Account> {
        self.provider.account(identifier).await
    }

    /// Liveness probe against the node.
    pub async fn ping(&self) -> Result<String> {
        self.provider.ping().await
    }

    /// The configured chain id.
    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// The configured node URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The configured timeouts.
    pub fn timeouts(&self) -> &KwilLinkTimeouts {
        &self.timeouts
    }

    /// Stop background work (the schema cache sweeper, if active).
    ///
    /// Idempotent; the client remains usable afterwards with lazy cache
    /// expiry only.
    pub fn shutdown(&self) {
        self.schema_cache.shutdown();
    }

    fn gateway(&self) -> GatewayAuth {
        GatewayAuth::new(
            Arc::clone(&self.provider),
            self.base_url.as_str(),
            self.chain_id.as_str(),
        )
    }
}

/// Builder for configuring [`KwilLinkClient`] instances.
pub struct KwilLinkClientBuilder {
    base_url: Option<String>,
    chain_id: Option<String>,
    timeouts: KwilLinkTimeouts,
    schema_ttl: Duration,
    cache_mode: CacheMode,
    provider: Option<Arc<dyn NodeProvider>>,
}

impl KwilLinkClientBuilder {
    fn new() -> Self {
        Self {
            base_url: None,
            chain_id: None,
            timeouts: KwilLinkTimeouts::default(),
            schema_ttl: DEFAULT_SCHEMA_TTL,
            cache_mode: CacheMode::Passive,
            provider: None,
        }
    }

    /// Set the base URL for the node (required).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the chain id signed transactions are bound to (required).
    pub fn chain_id(mut self, chain_id: impl Into<String>) -> Self {
        self.chain_id = Some(chain_id.into());
        self
    }

    /// Set comprehensive timeout configuration for all operations.
    pub fn timeouts(mut self, timeouts: KwilLinkTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set the schema cache TTL (default: 10 minutes).
    pub fn schema_ttl(mut self, ttl: Duration) -> Self {
        self.schema_ttl = ttl;
        self
    }

    /// Set the schema cache mode (default: passive).
    ///
    /// Active mode runs a background sweeper and must be built inside a
    /// tokio runtime.
    pub fn cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    /// Replace the HTTP node provider.
    ///
    /// Useful for tests and for transports that are not plain HTTP.
    pub fn provider(mut self, provider: Arc<dyn NodeProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<KwilLinkClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| KwilLinkError::ConfigurationError("base_url is required".into()))?
            .trim_end_matches('/')
            .to_string();
        let chain_id = self
            .chain_id
            .ok_or_else(|| KwilLinkError::ConfigurationError("chain_id is required".into()))?;

        let provider = match self.provider {
            Some(provider) => provider,
            None => {
                // Cookie store carries the gateway session cookie across
                // calls; keep-alive pooling mirrors the node's own
                // connection handling.
                let http = reqwest::Client::builder()
                    .cookie_store(true)
                    .timeout(self.timeouts.receive_timeout)
                    .connect_timeout(self.timeouts.connection_timeout)
                    .pool_max_idle_per_host(10)
                    .build()
                    .map_err(|e| KwilLinkError::ConfigurationError(e.to_string()))?;
                Arc::new(HttpProvider::new(base_url.clone(), http))
            }
        };

        Ok(KwilLinkClient {
            base_url,
            chain_id,
            provider,
            schema_cache: Arc::new(TtlCache::new(self.schema_ttl, self.cache_mode)),
            timeouts: self.timeouts,
        })
    }
}
