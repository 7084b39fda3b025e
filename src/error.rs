//! Error taxonomy for the harness.

use crate::validators::AssertionError;
use reqwest::Method;
use thiserror::Error;

/// Errors that can occur while driving a lifecycle sequence.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Credential exchange failed or returned no token. Fatal for the whole
    /// run: every write operation depends on the bearer token.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// A step read a `TestState` field no earlier step had written. This is
    /// a harness bug (step ordering violated), reported by field name.
    #[error("state field `{0}` was read before any step wrote it")]
    PreconditionMissing(&'static str),

    /// A response did not match the expected shape or values.
    #[error(transparent)]
    Assertion(#[from] AssertionError),

    /// Network-level failure. Surfaced immediately, never retried.
    #[error("transport failure: {method} {url}: {source}")]
    Transport {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },
}
