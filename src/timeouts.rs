//! Timeout configuration for Kwil client operations.
//!
//! Centralized timeout management for HTTP requests issued by the client
//! and its node provider.

use std::time::Duration;

/// Timeout configuration for Kwil client operations.
///
/// # Examples
///
/// ```rust
/// use kwil_link::KwilLinkTimeouts;
/// use std::time::Duration;
///
/// // Use defaults (recommended for most cases)
/// let timeouts = KwilLinkTimeouts::default();
///
/// // Custom timeouts for high-latency environments
/// let timeouts = KwilLinkTimeouts::builder()
///     .connection_timeout(Duration::from_secs(60))
///     .receive_timeout(Duration::from_secs(120))
///     .build();
///
/// // Aggressive timeouts for local development
/// let timeouts = KwilLinkTimeouts::fast();
/// ```
#[derive(Debug, Clone)]
pub struct KwilLinkTimeouts {
    /// Timeout for establishing connections (TCP + TLS handshake).
    /// Default: 10 seconds
    pub connection_timeout: Duration,

    /// Timeout for receiving a response after a request is sent.
    /// Default: 30 seconds
    pub receive_timeout: Duration,

    /// Timeout for sending data to the node.
    /// Default: 10 seconds
    pub send_timeout: Duration,
}

impl Default for KwilLinkTimeouts {
    fn default() -> Self {
        Self {
            connection_timeout: Duration::from_secs(10),
            receive_timeout: Duration::from_secs(30),
            send_timeout: Duration::from_secs(10),
        }
    }
}

impl KwilLinkTimeouts {
    /// Create a new builder for custom timeout configuration.
    pub fn builder() -> KwilLinkTimeoutsBuilder {
        KwilLinkTimeoutsBuilder::new()
    }

    /// Timeouts optimized for fast local development.
    pub fn fast() -> Self {
        Self {
            connection_timeout: Duration::from_secs(2),
            receive_timeout: Duration::from_secs(5),
            send_timeout: Duration::from_secs(2),
        }
    }

    /// Timeouts optimized for high-latency or unreliable networks.
    pub fn relaxed() -> Self {
        Self {
            connection_timeout: Duration::from_secs(30),
            receive_timeout: Duration::from_secs(120),
            send_timeout: Duration::from_secs(30),
        }
    }
}

/// Builder for creating custom [`KwilLinkTimeouts`] configurations.
#[derive(Debug, Clone)]
pub struct KwilLinkTimeoutsBuilder {
    timeouts: KwilLinkTimeouts,
}

impl KwilLinkTimeoutsBuilder {
    fn new() -> Self {
        Self {
            timeouts: KwilLinkTimeouts::default(),
        }
    }

    /// Set the connection timeout (TCP + TLS handshake).
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.connection_timeout = timeout;
        self
    }

    /// Set the connection timeout in seconds.
    pub fn connection_timeout_secs(self, secs: u64) -> Self {
        self.connection_timeout(Duration::from_secs(secs))
    }

    /// Set the receive timeout (waiting for a response after the request).
    pub fn receive_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.receive_timeout = timeout;
        self
    }

    /// Set the receive timeout in seconds.
    pub fn receive_timeout_secs(self, secs: u64) -> Self {
        self.receive_timeout(Duration::from_secs(secs))
    }

    /// Set the send timeout (writing data to the socket).
    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.send_timeout = timeout;
        self
    }

    /// Set the send timeout in seconds.
    pub fn send_timeout_secs(self, secs: u64) -> Self {
        self.send_timeout(Duration::from_secs(secs))
    }

    /// Build the timeout configuration.
    pub fn build(self) -> KwilLinkTimeouts {
        self.timeouts
    }
}
