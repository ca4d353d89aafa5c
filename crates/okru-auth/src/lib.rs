//! OK.ru OAuth2 authentication library
//!
//! Provides request signing, authorization-code and refresh-token exchange,
//! and session (token pair) storage for the OK.ru API client. This crate is
//! a standalone library with no dependency on the client facade — it can be
//! tested and used independently.
//!
//! Credential flow:
//! 1. Host navigates a browser to `token::build_authorization_url()`
//! 2. The redirect query string carries the authorization code
//! 3. `token::exchange_code()` trades the code for an access/refresh pair
//! 4. The pair lives in a `Session` and is optionally persisted via a
//!    `SessionStore`
//! 5. When the access token expires, `token::refresh_access_token()` mints
//!    a new one from the stored refresh token
//! 6. `signature::sign()` binds every API request to the access token

pub mod config;
pub mod constants;
pub mod error;
pub mod secret;
pub mod session;
pub mod signature;
pub mod store;
pub mod token;

pub use config::{ClientConfig, Endpoints};
pub use constants::*;
pub use error::{Error, Result};
pub use secret::Secret;
pub use session::Session;
pub use signature::sign;
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};
pub use token::{
    TokenPair, authorization_code_from_query, build_authorization_url, error_from_query,
    exchange_code, extract_string_field, refresh_access_token,
};
