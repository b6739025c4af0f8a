//! Error types for the kwil-link client library.

use thiserror::Error;

/// Errors returned by kwil-link operations.
///
/// Every failure aborts the current build or auth operation; nothing in
/// this crate retries automatically, and no partially signed object is
/// ever returned alongside an error.
#[derive(Debug, Error)]
pub enum KwilLinkError {
    /// Client or builder misconfiguration (missing base_url, chain id, ...)
    #[error("configuration error: {0}")]
    ConfigurationError(String),

    /// A required builder field is missing or invalid, checked before any
    /// network call
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// A mutating builder method was called while a build was in flight on
    /// the same instance
    #[error("build already in progress on this builder instance")]
    BuildInProgress,

    /// Namespace/action resolution failed: unknown dbid, unknown action,
    /// non-public action, or view/execute route mismatch
    #[error("schema error: {0}")]
    SchemaError(String),

    /// Caller inputs do not match the schema-declared parameters; the
    /// message names every offending parameter, not just the first
    #[error("invalid inputs: {0}")]
    InputValidation(String),

    /// A value cannot be represented in the wire encoding (e.g. an
    /// out-of-range big integer that must be passed as a decimal string)
    #[error("codec error: {0}")]
    CodecError(String),

    /// Signing failed or an invalid signature type was supplied
    #[error("signing error: {0}")]
    SigningError(String),

    /// Gateway or private-mode authentication failure, including
    /// domain/version/chain-id mismatches
    #[error("authentication error: {0}")]
    AuthenticationError(String),

    /// The node answered with a non-success status
    #[error("server error ({status_code}): {message}")]
    ServerError { status_code: u16, message: String },

    /// The node answered successfully but the response lacks data the
    /// pipeline cannot proceed without (e.g. an account with no nonce)
    #[error("node response missing data: {0}")]
    MissingData(String),

    /// HTTP-level failure from the transport
    #[error("transport error: {0}")]
    TransportError(#[from] reqwest::Error),

    /// JSON (de)serialization failure
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Convenience result type used throughout kwil-link.
pub type Result<T> = std::result::Result<T, KwilLinkError>;
