//! Manifest Gateway - an authenticated download relay for game manifests
//!
//! Callers prove who they are with a challenge token or a private key; the
//! gateway then fetches the manifest or Lua script from a credentialed
//! upstream and streams it back without exposing the upstream credential.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod proxy;
pub mod steam;

pub use application::Application;
pub use error::{Error, Result};
