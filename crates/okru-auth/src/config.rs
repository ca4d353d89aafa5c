//! Application credentials and endpoint configuration

use crate::constants::{API_ENDPOINT, AUTHORIZE_ENDPOINT, TOKEN_ENDPOINT};
use crate::secret::Secret;

/// Immutable application credentials, created once at construction.
///
/// `app_public_key` identifies the application in signed requests and is
/// not a secret. `app_secret_key` never leaves the client: it contributes
/// a digest to request signatures and is sent only to the token endpoint
/// over the `client_secret` form field.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub app_id: String,
    pub app_public_key: String,
    pub app_secret_key: Secret,
    pub redirect_url: String,
    /// Space- or semicolon-separated permission scope string
    pub permissions: String,
}

impl ClientConfig {
    pub fn new(
        app_id: impl Into<String>,
        app_public_key: impl Into<String>,
        app_secret_key: impl Into<Secret>,
        redirect_url: impl Into<String>,
        permissions: impl Into<String>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            app_public_key: app_public_key.into(),
            app_secret_key: app_secret_key.into(),
            redirect_url: redirect_url.into(),
            permissions: permissions.into(),
        }
    }
}

/// Endpoint set the client talks to. Defaults to production OK.ru.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub api: String,
    pub token: String,
    pub authorize: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api: API_ENDPOINT.into(),
            token: TOKEN_ENDPOINT.into(),
            authorize: AUTHORIZE_ENDPOINT.into(),
        }
    }
}
