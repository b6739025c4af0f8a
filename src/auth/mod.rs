//! Session authentication against the node and its gateway.
//!
//! Two independent protocols: cookie-based gateway auth (SIWE-style
//! signed message, session cookie on the transport) and private-mode
//! challenge/response auth for read-only calls.

mod gateway;
mod private;

pub use gateway::{compose_gateway_auth_message, GatewayAuth, GATEWAY_AUTH_VERSION};
pub use private::{challenge_and_sign, compose_call_message};

pub(crate) use private::sign_with_challenge;
