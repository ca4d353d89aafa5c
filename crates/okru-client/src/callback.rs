//! Caller-supplied callback pairs
//!
//! A callback owns its continuations: it moves into the pending-call
//! registry or a flow slot at call time and each continuation fires at
//! most once. Delivery is marshaled onto the callback's `DeliveryContext`;
//! when the context or the matching continuation is absent, the result is
//! silently dropped (deliberate: fire-and-forget calls are allowed).

use std::sync::Arc;

use crate::context::DeliveryContext;
use crate::error::Error;

/// Success continuation for an API call; receives the raw response body.
pub type SuccessFn = Box<dyn FnOnce(String) + Send>;

/// Success continuation for an OAuth flow (no payload).
pub type CompletionFn = Box<dyn FnOnce() + Send>;

/// Error continuation.
pub type ErrorFn = Box<dyn FnOnce(Error) + Send>;

/// Callback pair for one API request.
#[derive(Default)]
pub struct ApiCallback {
    pub on_success: Option<SuccessFn>,
    pub on_error: Option<ErrorFn>,
    pub context: Option<Arc<dyn DeliveryContext>>,
}

impl ApiCallback {
    /// Post the success continuation onto the delivery context.
    pub(crate) fn deliver_success(self, body: String) {
        if let (Some(context), Some(on_success)) = (self.context, self.on_success) {
            context.post(Box::new(move || on_success(body)));
        }
    }

    /// Post the error continuation onto the delivery context.
    pub(crate) fn deliver_error(self, error: Error) {
        if let (Some(context), Some(on_error)) = (self.context, self.on_error) {
            context.post(Box::new(move || on_error(error)));
        }
    }

    /// Invoke the error continuation on the current task, bypassing the
    /// delivery context. Transport failures take this path: they already
    /// complete off the original context and are not re-marshaled.
    pub(crate) fn deliver_error_direct(self, error: Error) {
        if let Some(on_error) = self.on_error {
            on_error(error);
        }
    }
}

/// Callback pair for one OAuth flow (authorization or refresh).
#[derive(Default)]
pub struct FlowCallback {
    pub on_success: Option<CompletionFn>,
    pub on_error: Option<ErrorFn>,
    pub context: Option<Arc<dyn DeliveryContext>>,
    /// Persist the token pair through the session store on success
    pub save_session: bool,
}

impl FlowCallback {
    pub(crate) fn deliver_success(self) {
        if let (Some(context), Some(on_success)) = (self.context, self.on_success) {
            context.post(on_success);
        }
    }

    /// Error delivery requires both the continuation and the context;
    /// otherwise the failure is dropped.
    pub(crate) fn deliver_error(self, error: Error) {
        if let (Some(context), Some(on_error)) = (self.context, self.on_error) {
            context.post(Box::new(move || on_error(error)));
        }
    }
}
