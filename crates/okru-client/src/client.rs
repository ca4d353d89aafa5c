//! OAuth flow controller and API request dispatcher
//!
//! `OkClient` owns all mutable SDK state: the session (token pair) behind
//! a `RwLock`, the pending-call registry, and the two single-slot flow
//! callbacks. All mutation goes through its methods; there are no ambient
//! globals.
//!
//! Flow states: Idle → AwaitingRedirect → ExchangingToken →
//! Authenticated | Failed. Refresh enters ExchangingToken directly. There
//! is no queuing: starting a flow while one is outstanding replaces the
//! parked callback and the earlier continuation never fires (deliberate,
//! logged at `warn!`).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use okru_auth::constants::{
    DEFAULT_SETTINGS_PREFIX, KEY_SUFFIX_ACCESS_TOKEN, KEY_SUFFIX_REFRESH_TOKEN,
};
use okru_auth::{self as auth, ClientConfig, Endpoints, Session, SessionStore};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::callback::{ApiCallback, FlowCallback};
use crate::error::{Error, Result};
use crate::pending::PendingCalls;

/// Response-body marker for API error code 102 (expired session).
const MARKER_SESSION_EXPIRED: &str = "\"error_code\":102";

/// Response-body marker for any API error code.
const MARKER_ERROR_CODE: &str = "\"error_code\"";

/// Single-slot holder for a flow callback. A new flow overwrites the
/// previous slot; the displaced continuation is dropped unfired.
struct FlowSlot {
    name: &'static str,
    inner: Mutex<Option<FlowCallback>>,
}

impl FlowSlot {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: Mutex::new(None),
        }
    }

    fn set(&self, callback: FlowCallback) {
        let mut slot = self.lock();
        if slot.is_some() {
            warn!(flow = self.name, "flow already pending, replacing its callback");
        }
        *slot = Some(callback);
    }

    fn take(&self) -> Option<FlowCallback> {
        self.lock().take()
    }

    fn fail(&self, error: Error) {
        if let Some(callback) = self.take() {
            warn!(flow = self.name, error = %error, "flow failed");
            callback.deliver_error(error);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<FlowCallback>> {
        self.inner.lock().expect("flow slot poisoned")
    }
}

/// Asynchronous OK.ru API client.
pub struct OkClient {
    config: ClientConfig,
    endpoints: Endpoints,
    http: reqwest::Client,
    session: Arc<RwLock<Session>>,
    pending: Arc<PendingCalls>,
    auth_flow: Arc<FlowSlot>,
    update_flow: Arc<FlowSlot>,
    store: Option<Arc<dyn SessionStore>>,
    settings_prefix: String,
}

impl OkClient {
    /// Create a client against the production OK.ru endpoints.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_endpoints(config, Endpoints::default())
    }

    /// Create a client against a custom endpoint set (tests, staging).
    pub fn with_endpoints(config: ClientConfig, endpoints: Endpoints) -> Self {
        Self {
            config,
            endpoints,
            http: reqwest::Client::new(),
            session: Arc::new(RwLock::new(Session::new())),
            pending: Arc::new(PendingCalls::new()),
            auth_flow: Arc::new(FlowSlot::new("authorization")),
            update_flow: Arc::new(FlowSlot::new("refresh")),
            store: None,
            settings_prefix: DEFAULT_SETTINGS_PREFIX.into(),
        }
    }

    /// Attach a session store for persistence.
    pub fn with_session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the persisted-key prefix (default `OK_SDK_`).
    pub fn with_settings_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.settings_prefix = prefix.into();
        self
    }

    // --- OAuth flow controller ---------------------------------------

    /// Begin the authorization flow.
    ///
    /// Parks `callback` in the authorization slot and returns the URL the
    /// host must navigate its browser to. The redirect query string is
    /// then fed to [`handle_authorization_redirect`].
    ///
    /// [`handle_authorization_redirect`]: OkClient::handle_authorization_redirect
    pub fn start_authorization(&self, callback: FlowCallback) -> String {
        self.auth_flow.set(callback);
        auth::build_authorization_url(&self.endpoints, &self.config)
    }

    /// Inspect a browser redirect query string.
    ///
    /// A `code` parameter starts the authorization-code exchange; an
    /// `error` parameter fails the flow with the trailing error text. A
    /// query with neither is ignored (intermediate navigation).
    pub fn handle_authorization_redirect(&self, query: &str) {
        if let Some(code) = auth::authorization_code_from_query(query) {
            debug!("authorization code received, starting token exchange");
            self.spawn_code_exchange(code);
        } else if let Some(error) = auth::error_from_query(query) {
            self.auth_flow.fail(Error::SdkFailure(error));
        }
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// Parks `callback` in the refresh slot. On success the session's
    /// access token is replaced; the refresh token is untouched.
    pub fn refresh_token(&self, callback: FlowCallback) {
        self.update_flow.set(callback);

        let http = self.http.clone();
        let endpoints = self.endpoints.clone();
        let config = self.config.clone();
        let session = Arc::clone(&self.session);
        let slot = Arc::clone(&self.update_flow);
        let store = self.store.clone();
        let prefix = self.settings_prefix.clone();

        tokio::spawn(async move {
            let refresh = session.read().await.refresh_token().map(str::to_owned);
            let Some(refresh) = refresh else {
                slot.fail(Error::SdkFailure("no refresh token in session".into()));
                return;
            };

            match auth::refresh_access_token(&http, &endpoints, &config, &refresh).await {
                Ok(access) => {
                    if let Err(e) = session.write().await.set_access(access.clone()) {
                        slot.fail(Error::Auth(e));
                        return;
                    }
                    let Some(callback) = slot.take() else { return };
                    if callback.save_session {
                        if let Err(e) =
                            persist_tokens(store.as_deref(), &prefix, &access, &refresh)
                        {
                            callback.deliver_error(Error::Auth(e));
                            return;
                        }
                    }
                    debug!("refresh flow completed");
                    callback.deliver_success();
                }
                Err(e) => slot.fail(Error::Auth(e)),
            }
        });
    }

    fn spawn_code_exchange(&self, code: String) {
        let http = self.http.clone();
        let endpoints = self.endpoints.clone();
        let config = self.config.clone();
        let session = Arc::clone(&self.session);
        let slot = Arc::clone(&self.auth_flow);
        let store = self.store.clone();
        let prefix = self.settings_prefix.clone();

        tokio::spawn(async move {
            match auth::exchange_code(&http, &endpoints, &config, &code).await {
                Ok(pair) => {
                    session
                        .write()
                        .await
                        .set_pair(pair.access_token.clone(), pair.refresh_token.clone());
                    let Some(callback) = slot.take() else { return };
                    if callback.save_session {
                        if let Err(e) = persist_tokens(
                            store.as_deref(),
                            &prefix,
                            &pair.access_token,
                            &pair.refresh_token,
                        ) {
                            callback.deliver_error(Error::Auth(e));
                            return;
                        }
                    }
                    debug!("authorization flow completed");
                    callback.deliver_success();
                }
                Err(e) => slot.fail(Error::Auth(e)),
            }
        });
    }

    // --- API request dispatcher --------------------------------------

    /// Sign and dispatch an API call.
    ///
    /// Takes a copy of `parameters` (absent defaults to empty; the
    /// caller's map is never mutated), adds `sig`, `application_key`,
    /// `method` and `access_token`, and issues a GET. The callback is
    /// registered before the call goes out and receives exactly one
    /// delivery: the raw body on success, or a classified error.
    ///
    /// Construction failures (no access token) invoke `on_error` directly
    /// on the calling task without registering anything.
    pub async fn send_request(
        &self,
        method: &str,
        parameters: Option<&HashMap<String, String>>,
        callback: ApiCallback,
    ) {
        let access = self.session.read().await.access_token().map(str::to_owned);
        let Some(access) = access else {
            callback.deliver_error_direct(Error::SdkFailure(
                "no access token, authorize or load a session first".into(),
            ));
            return;
        };

        let mut params = parameters.cloned().unwrap_or_default();
        let sig = auth::sign(
            method,
            &params,
            &access,
            &self.config.app_public_key,
            self.config.app_secret_key.expose(),
        );
        params.insert("sig".into(), sig);
        params.insert("application_key".into(), self.config.app_public_key.clone());
        params.insert("method".into(), method.to_owned());
        params.insert("access_token".into(), access);

        let url = format!("{}?{}", self.endpoints.api, encode_query(&params));
        let handle = Uuid::new_v4();
        self.pending.insert(handle, callback);
        debug!(%handle, method, "dispatching api request");

        let http = self.http.clone();
        let pending = Arc::clone(&self.pending);
        tokio::spawn(async move {
            match fetch_body(&http, &url).await {
                Ok(body) => process_response(&pending, handle, &body),
                Err(error) => {
                    // Transport failures bypass delivery-context
                    // marshaling: they already complete off the original
                    // context and are handed to on_error as-is.
                    let callback = pending
                        .take(handle)
                        .expect("pending call lost before transport failure");
                    warn!(%handle, %error, "api request transport failure");
                    callback.deliver_error_direct(error);
                }
            }
        });
    }

    // --- Session management ------------------------------------------

    /// Persist the current token pair through the session store.
    ///
    /// Hard error to the caller when no store is configured, the session
    /// is unauthenticated, or the store write fails.
    pub async fn save_session(&self) -> Result<()> {
        let session = self.session.read().await;
        let (Some(access), Some(refresh)) = (session.access_token(), session.refresh_token())
        else {
            return Err(Error::SdkFailure("no session to save".into()));
        };
        persist_tokens(self.store.as_deref(), &self.settings_prefix, access, refresh)?;
        Ok(())
    }

    /// Load a previously persisted token pair.
    ///
    /// Returns `true` only when both tokens were present; partial data
    /// leaves the session untouched. Loaded tokens are not validated.
    pub async fn try_load_session(&self) -> bool {
        let Some(store) = self.store.as_deref() else {
            return false;
        };
        let access = store.get(&session_key(&self.settings_prefix, KEY_SUFFIX_ACCESS_TOKEN));
        let refresh = store.get(&session_key(&self.settings_prefix, KEY_SUFFIX_REFRESH_TOKEN));
        match (access, refresh) {
            (Some(access), Some(refresh)) => {
                self.session.write().await.set_pair(access, refresh);
                debug!("session loaded from store");
                true
            }
            _ => false,
        }
    }

    /// Drop the in-memory token pair and remove the persisted keys.
    /// A new pair must be obtained via [`start_authorization`].
    ///
    /// [`start_authorization`]: OkClient::start_authorization
    pub async fn reset_session(&self) -> Result<()> {
        self.session.write().await.clear();
        if let Some(store) = self.store.as_deref() {
            store.remove(&session_key(&self.settings_prefix, KEY_SUFFIX_ACCESS_TOKEN))?;
            store.remove(&session_key(&self.settings_prefix, KEY_SUFFIX_REFRESH_TOKEN))?;
        }
        Ok(())
    }

    /// True when a full token pair is held.
    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_authenticated()
    }

    /// Snapshot of the current access token.
    pub async fn access_token(&self) -> Option<String> {
        self.session.read().await.access_token().map(str::to_owned)
    }
}

/// Classify a completed response body and deliver the result.
///
/// Fetch-and-remove is atomic, so concurrent completions can never
/// double-deliver or lose the association. Classification: error code 102
/// is an expired session, any other error code is a bad request with the
/// body attached, anything else is success with the raw body (parsing the
/// API's response schema is the caller's responsibility).
fn process_response(pending: &PendingCalls, handle: Uuid, body: &str) {
    let callback = pending
        .take(handle)
        .expect("no pending call registered for completed handle");
    if body.contains(MARKER_SESSION_EXPIRED) {
        debug!(%handle, "api call rejected: session expired");
        callback.deliver_error(Error::SessionExpired);
    } else if body.contains(MARKER_ERROR_CODE) {
        debug!(%handle, "api call rejected with error code");
        callback.deliver_error(Error::BadApiRequest(body.to_owned()));
    } else {
        callback.deliver_success(body.to_owned());
    }
}

/// GET the url and read the full UTF-8 body.
async fn fetch_body(http: &reqwest::Client, url: &str) -> Result<String> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| Error::Transport(format!("api request failed: {e}")))?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Transport(format!("api endpoint returned {status}")));
    }
    response
        .text()
        .await
        .map_err(|e| Error::Transport(format!("reading api response: {e}")))
}

/// URL-encode a parameter map into a query string, `&`-joined.
fn encode_query(params: &HashMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn session_key(prefix: &str, suffix: &str) -> String {
    format!("{prefix}{suffix}")
}

/// Write both tokens through the store under the prefixed keys.
fn persist_tokens(
    store: Option<&dyn SessionStore>,
    prefix: &str,
    access: &str,
    refresh: &str,
) -> auth::Result<()> {
    let Some(store) = store else {
        return Err(auth::Error::Store("no session store configured".into()));
    };
    store.put(&session_key(prefix, KEY_SUFFIX_ACCESS_TOKEN), access)?;
    store.put(&session_key(prefix, KEY_SUFFIX_REFRESH_TOKEN), refresh)?;
    debug!("session persisted");
    Ok(())
}
