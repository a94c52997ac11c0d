//! # supagate-core
//!
//! Configuration and credential types shared by the Supagate crates.
//!
//! The gateway is configured once at startup into an immutable
//! [`GatewayConfig`]. Backend credentials are resolved from it into a
//! [`CredentialContext`], which every data-touching component borrows.

// Configuration types shared across all Supagate crates
pub mod config;
pub mod credentials;
pub mod error;

pub use config::{BackendConfig, Environment, GatewayConfig, ServerConfig};
pub use credentials::{CredentialContext, redact};
pub use error::ConfigError;
