//! Asynchronous OK.ru API client
//!
//! The SDK facade over `okru-auth`: drives the OAuth authorization and
//! refresh flows, dispatches signed API calls, and correlates each
//! in-flight request with the callback that should receive its result.
//!
//! Call flow:
//! 1. `OkClient::start_authorization()` returns the URL for the host
//!    browser and parks the flow callback
//! 2. The host feeds the redirect query string to
//!    `handle_authorization_redirect()`, which exchanges the code
//! 3. `send_request()` signs and dispatches API calls; completions are
//!    matched back through the pending-call registry
//! 4. On a `SESSION_EXPIRED` error the host calls `refresh_token()` and
//!    re-sends
//!
//! Continuations are delivered through a host-supplied `DeliveryContext`
//! so results land on the host's owning execution context (UI loop,
//! actor, ...).

pub mod callback;
pub mod client;
pub mod context;
pub mod error;
pub mod pending;

pub use callback::{ApiCallback, CompletionFn, ErrorFn, FlowCallback, SuccessFn};
pub use client::OkClient;
pub use context::{ChannelContext, DeliveryContext, InlineContext, Task};
pub use error::{Error, Result};
pub use pending::PendingCalls;

pub use okru_auth::{
    ClientConfig, Endpoints, FileSessionStore, MemorySessionStore, Secret, SessionStore,
};
