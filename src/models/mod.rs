//! Data models for the kwil-link client library.
//!
//! Wire-facing request/response structures, the node's type system, and
//! the immutable signed-object wrappers produced by the build pipeline.

mod account;
mod auth;
mod data_type;
mod encoded;
mod payload;
mod schema;
mod value;

pub use account::Account;
pub use auth::{AuthSuccess, BroadcastResponse, CallResponse, GatewayAuthInfo, GatewayAuthRequest, SignedCall};
pub use data_type::{DataType, VarType};
pub use encoded::EncodedValue;
pub use payload::{ActionPayload, PayloadType};
pub use schema::{AccessModifier, ActionDefinition, ActionParameter, ColumnDescriptor, SchemaDescriptor, TableDescriptor};
pub use value::ParamValue;
