//! # kwil-link
//!
//! Client SDK for Kwil ledger-database nodes: construct, cost-estimate,
//! sign, and submit state-changing and read-only operations, and
//! authenticate sessions with the node or its gateway.
//!
//! The crate is built around three pieces:
//!
//! - a versioned binary value/payload encoder producing the node's exact
//!   wire format ([`codec`]);
//! - a build pipeline that resolves a remote schema, validates inputs,
//!   estimates fees, resolves a nonce, and signs ([`builder`]);
//! - a pluggable signing layer uniform across secp256k1 wallets, ed25519
//!   keys, and custom signers ([`signer`]), backing both transaction
//!   signing and session authentication ([`auth`]).
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use kwil_link::{ActionInput, KwilLinkClient, Signer};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = KwilLinkClient::builder()
//!         .base_url("http://localhost:8484")
//!         .chain_id("kwil-chain-1")
//!         .build()?;
//!
//!     let key = ed25519_dalek::SigningKey::from_bytes(&[7u8; 32]);
//!     let signer = Signer::Ed25519(key);
//!
//!     let builder = client
//!         .action()
//!         .dbid("xf617af1ca774ebbd6d23e8fe12c56d41d25a22d81e88f67c6c6ee0d4")
//!         .name("add_post")
//!         .signer(signer)
//!         .description("add a post");
//!     builder.concat(
//!         ActionInput::new()
//!             .put("$id", "123e4567-e89b-12d3-a456-426614174000")
//!             .put("$user", "Luke"),
//!     )?;
//!
//!     let tx = builder.build_tx().await?;
//!     let receipt = client.broadcast(&tx).await?;
//!     println!("tx hash: {}", receipt.tx_hash);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod builder;
pub mod cache;
pub mod client;
pub mod codec;
pub mod error;
pub mod models;
pub mod numeric;
pub mod signer;
pub mod timeouts;
pub mod transport;
pub mod tx;

// Re-export commonly used items at crate root
pub use builder::{ActionBuilder, ActionInput, DbBuilder};
pub use cache::{CacheMode, TtlCache};
pub use client::{KwilLinkClient, KwilLinkClientBuilder};
pub use error::{KwilLinkError, Result};
pub use models::{ParamValue, PayloadType, SchemaDescriptor};
pub use signer::{CustomSigner, SignatureData, SignatureType, Signer};
pub use timeouts::KwilLinkTimeouts;
pub use transport::{HttpProvider, NodeProvider};
pub use tx::{Message, Transaction};
