//! API-key access policy.
//!
//! The policy is decided once at startup. With no secret configured every
//! request is let through; otherwise the `X-API-Key` value must match the
//! secret exactly. Both sides are reduced to SHA-256 digests and compared
//! with a branch-free fold, so neither the length of the supplied key nor
//! the length of its common prefix with the secret affects timing.

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Message returned for every rejected credential.
pub const REJECTION_MESSAGE: &str = "Invalid or missing API key";

/// Outcome of a successful check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No secret is configured; the request was not checked.
    Bypass,
    /// The supplied key matched the configured secret.
    Granted,
}

/// Errors that can occur while checking an API key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiKeyError {
    /// The key was missing or did not match.
    #[error("Invalid or missing API key")]
    Rejected,
}

/// Configured secret, held only as its digest.
#[derive(Clone)]
pub struct ApiKey {
    digest: [u8; 32],
}

impl ApiKey {
    /// Creates a key from the raw secret.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            digest: digest(secret),
        }
    }

    /// Returns true if `candidate` equals the secret.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        constant_time_eq(&self.digest, &digest(candidate))
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Two-state access policy for the API.
#[derive(Debug, Clone)]
pub enum ApiKeyPolicy {
    /// Fail-open: every request is accepted.
    Disabled,
    /// Every request must carry the configured key.
    Enforced(ApiKey),
}

impl ApiKeyPolicy {
    /// Builds the policy from an optional secret. Empty secrets disable it.
    #[must_use]
    pub fn from_secret(secret: Option<&str>) -> Self {
        match secret {
            Some(secret) if !secret.is_empty() => Self::Enforced(ApiKey::new(secret)),
            _ => Self::Disabled,
        }
    }

    /// Returns true if requests are checked.
    #[must_use]
    pub const fn is_enforced(&self) -> bool {
        matches!(self, Self::Enforced(_))
    }

    /// Checks a supplied key against the policy.
    ///
    /// # Errors
    ///
    /// Returns [`ApiKeyError::Rejected`] when the policy is enforced and the
    /// key is absent or wrong. The error carries nothing about the candidate.
    pub fn verify(&self, provided: Option<&str>) -> Result<Access, ApiKeyError> {
        match self {
            Self::Disabled => Ok(Access::Bypass),
            Self::Enforced(key) => {
                // A missing key is checked like an empty one so both paths do the same work.
                let matched = key.matches(provided.unwrap_or_default());
                if matched && provided.is_some() {
                    Ok(Access::Granted)
                } else {
                    Err(ApiKeyError::Rejected)
                }
            }
        }
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

fn constant_time_eq(a: &[u8; 32], b: &[u8; 32]) -> bool {
    let diff = a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y));
    std::hint::black_box(diff) == 0
}
