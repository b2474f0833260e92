//! Download gateway
//!
//! Every request runs the same pipeline:
//! - Authorization: challenge token or private key, rejected early
//! - Resolution: the credentialed upstream URL for the resource
//! - Relay: a single upstream GET streamed straight back to the client

pub mod authorizer;
pub mod error_response;
pub mod headers;
pub mod middleware;
pub mod middleware_stack;
pub mod pipeline;
pub mod service;
pub mod streaming;
pub mod types;
pub mod url_resolver;

#[cfg(test)]
pub mod test_utils;


pub use authorizer::{AuthDecision, Authorizer, DenyReason};
pub use service::GatewayService;
pub use types::{GatewayError, GatewayResult, RelayError};
