//! Shared configuration, errors, and access policy for Vatrec.
//!
//! This crate provides common pieces used across all other crates:
//! - Application-wide error types
//! - Configuration management
//! - API-key access policy with constant-time verification

pub mod api_key;
pub mod config;
pub mod error;

pub use api_key::{ApiKeyError, ApiKeyPolicy, Access};
pub use config::{AppConfig, AuthConfig, ServerConfig, VatConfig};
pub use error::AppError;
