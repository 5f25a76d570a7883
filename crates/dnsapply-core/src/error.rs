//! Error types for the reconciler.
//!
//! Fatal-vs-continue is decided at the call site, not here: the same
//! provider error is fatal during discovery and merely counted during a
//! best-effort apply loop.

use thiserror::Error;

/// Result type alias for reconciler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (missing or unparseable required input)
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP transport errors (from provider APIs)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Request rejected by the provider's input validation
    #[error("validation failed: {0}")]
    Validation(String),

    /// Provider-specific error
    #[error("provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// The configured zone does not exist at the provider
    #[error("configured DNS zone {zone:?} does not exist")]
    ZoneNotFound {
        /// The zone name that was looked up
        zone: String,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
