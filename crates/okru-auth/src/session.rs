//! In-memory session state
//!
//! Holds the access/refresh token pair. Invariant: either both tokens are
//! present (authenticated) or both are absent — the pair is only ever set
//! together, and a refresh replaces the access token only while a full
//! pair already exists.

use crate::error::{Error, Result};

/// The access/refresh token pair for one authorized user.
#[derive(Debug, Default, Clone)]
pub struct Session {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when a full token pair is held.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some() && self.refresh_token.is_some()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Install a full token pair (successful authorization exchange).
    pub fn set_pair(&mut self, access_token: String, refresh_token: String) {
        self.access_token = Some(access_token);
        self.refresh_token = Some(refresh_token);
    }

    /// Replace the access token after a refresh exchange.
    ///
    /// Rejected unless a full pair is already present, so the session can
    /// never hold exactly one token.
    pub fn set_access(&mut self, access_token: String) -> Result<()> {
        if !self.is_authenticated() {
            return Err(Error::Internal(
                "cannot refresh access token without an authenticated session".into(),
            ));
        }
        self.access_token = Some(access_token);
        Ok(())
    }

    /// Drop both tokens.
    pub fn clear(&mut self) {
        self.access_token = None;
        self.refresh_token = None;
    }
}
