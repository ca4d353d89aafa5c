//! OK.ru endpoint and storage-key constants
//!
//! Production endpoint set for the OK.ru REST API. The client carries an
//! `Endpoints` value defaulting to these so tests and alternative
//! deployments can point elsewhere. Application credentials are per-app
//! and live in `ClientConfig`, not here.

/// REST API endpoint, all signed calls go here
pub const API_ENDPOINT: &str = "https://api.odnoklassniki.ru/fb.do";

/// Token endpoint for code exchange and token refresh
pub const TOKEN_ENDPOINT: &str = "https://api.odnoklassniki.ru/oauth/token.do";

/// Authorization endpoint the host browser is navigated to
pub const AUTHORIZE_ENDPOINT: &str = "https://www.odnoklassniki.ru/oauth/authorize";

/// Default prefix for persisted session keys
pub const DEFAULT_SETTINGS_PREFIX: &str = "OK_SDK_";

/// Session-store key suffix for the access token
pub const KEY_SUFFIX_ACCESS_TOKEN: &str = "access_token";

/// Session-store key suffix for the refresh token
pub const KEY_SUFFIX_REFRESH_TOKEN: &str = "refresh_token";
