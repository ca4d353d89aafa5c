//! Error taxonomy for API dispatch and OAuth flows
//!
//! All failures reach the caller through its error continuation; nothing
//! is thrown across the asynchronous boundary. `SessionExpired` is
//! advisory — the SDK never auto-retries; the caller drives the refresh
//! flow and re-sends.

/// Errors delivered to caller-supplied error continuations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// API error code 102: the access token is no longer valid
    #[error("SESSION_EXPIRED")]
    SessionExpired,

    /// Any other API error code; carries the raw body for diagnostics
    #[error("BAD_API_REQUEST  {0}")]
    BadApiRequest(String),

    /// Network or transport failure completing a dispatched call
    #[error("transport failure: {0}")]
    Transport(String),

    /// Token exchange or session persistence failure
    #[error(transparent)]
    Auth(#[from] okru_auth::Error),

    /// Unexpected failure constructing or processing a request. Check
    /// your application credentials, request parameters and network
    /// connection; if the problem persists, report it with a description
    /// of your actions.
    #[error("sdk failure, check your app info, request correctness and connection: {0}")]
    SdkFailure(String),
}

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;
