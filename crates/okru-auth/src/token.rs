//! OAuth token exchange and refresh
//!
//! Handles the two token endpoint interactions:
//! 1. Authorization code exchange (initial flow completion)
//! 2. Access token refresh from a stored refresh token
//!
//! Both POST to the token endpoint with different grant types. The
//! endpoint replies with loosely-shaped JSON; token fields are pulled out
//! by locating `"<name>":"` in the raw body and scanning to the closing
//! quote, which tolerates extra fields and non-strict bodies.
//!
//! Also owns the redirect-side helpers: building the authorization URL and
//! extracting the code or error from the browser redirect query string.

use tracing::debug;

use crate::config::{ClientConfig, Endpoints};
use crate::error::{Error, Result};

/// Token pair returned by the authorization-code grant.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Build the authorization URL the host browser is navigated to.
///
/// The redirect back to `redirect_url` carries the authorization code in
/// its query string. `layout=m` selects the mobile authorization page.
pub fn build_authorization_url(endpoints: &Endpoints, config: &ClientConfig) -> String {
    format!(
        "{}?client_id={}&scope={}&response_type=code&redirect_uri={}&layout=m",
        endpoints.authorize,
        config.app_id,
        urlencoding::encode(&config.permissions),
        urlencoding::encode(&config.redirect_url),
    )
}

/// Extract the authorization code from a redirect query string.
///
/// The code is everything after `code=` to the end of the string. `&` is
/// deliberately not a terminator: the code is the trailing token of the
/// redirect and may itself contain `&`-joined fragments.
pub fn authorization_code_from_query(query: &str) -> Option<String> {
    let start = query.find("code=")? + "code=".len();
    Some(query[start..].to_string())
}

/// Extract the error text from a redirect query string (after `error=`).
pub fn error_from_query(query: &str) -> Option<String> {
    let start = query.find("error=")? + "error=".len();
    Some(query[start..].to_string())
}

/// Exchange an authorization code for a token pair (initial flow).
///
/// The code was extracted from the browser redirect; it is consumed by
/// exactly one exchange.
pub async fn exchange_code(
    client: &reqwest::Client,
    endpoints: &Endpoints,
    config: &ClientConfig,
    code: &str,
) -> Result<TokenPair> {
    let body = post_token_request(
        client,
        endpoints,
        &[
            ("code", code),
            ("redirect_uri", config.redirect_url.as_str()),
            ("grant_type", "authorization_code"),
            ("client_id", config.app_id.as_str()),
            ("client_secret", config.app_secret_key.expose()),
        ],
    )
    .await?;

    let access_token = extract_string_field(&body, "access_token").ok_or(Error::NoAccessToken)?;
    let refresh_token = extract_string_field(&body, "refresh_token")
        .ok_or_else(|| Error::Internal("token response missing refresh_token".into()))?;
    debug!("authorization code exchanged for token pair");
    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Mint a new access token from a refresh token.
///
/// The refresh grant returns only a new access token; the refresh token
/// stays valid and unchanged.
pub async fn refresh_access_token(
    client: &reqwest::Client,
    endpoints: &Endpoints,
    config: &ClientConfig,
    refresh_token: &str,
) -> Result<String> {
    let body = post_token_request(
        client,
        endpoints,
        &[
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
            ("client_id", config.app_id.as_str()),
            ("client_secret", config.app_secret_key.expose()),
        ],
    )
    .await?;

    let access_token = extract_string_field(&body, "access_token").ok_or(Error::NoAccessToken)?;
    debug!("access token refreshed");
    Ok(access_token)
}

/// POST a form-urlencoded grant request and return the raw response body.
async fn post_token_request(
    client: &reqwest::Client,
    endpoints: &Endpoints,
    form: &[(&str, &str)],
) -> Result<String> {
    let response = client
        .post(&endpoints.token)
        .form(form)
        .send()
        .await
        .map_err(|e| Error::Http(format!("token request failed: {e}")))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::Http(format!("reading token response: {e}")))?;
    if !status.is_success() {
        return Err(Error::Http(format!("token endpoint returned {status}: {body}")));
    }
    Ok(body)
}

/// Pull a string field out of a raw JSON-ish body.
///
/// Locates the literal `"<name>":"` and scans to the next `"`. No byte
/// offsets beyond the pattern itself, so field order and extra fields in
/// the body don't matter.
pub fn extract_string_field(body: &str, name: &str) -> Option<String> {
    let pattern = format!("\"{name}\":\"");
    let start = body.find(&pattern)? + pattern.len();
    let rest = &body[start..];
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}
