//! Error types for authentication operations

/// Errors from signing, token exchange, and session persistence.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Token endpoint responded without an `access_token` field
    #[error("NO_ACCESS_TOKEN_SENT_BY_SERVER")]
    NoAccessToken,

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("session store error: {0}")]
    Store(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
