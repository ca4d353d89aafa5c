//! Pending-call registry
//!
//! Maps in-flight request handles to their callbacks. Completions fire on
//! arbitrary worker tasks, so a single coarse mutex serializes all access;
//! there is no ordering requirement across distinct handles. Exactly one
//! entry exists per outstanding handle.

use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

use crate::callback::ApiCallback;

/// Thread-safe handle → callback registry.
#[derive(Default)]
pub struct PendingCalls {
    inner: Mutex<HashMap<Uuid, ApiCallback>>,
}

impl PendingCalls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback under a fresh handle.
    ///
    /// Panics if the handle is already present: duplicate registration is
    /// a programming error, not a recoverable condition.
    pub fn insert(&self, handle: Uuid, callback: ApiCallback) {
        let mut inner = self.lock();
        let previous = inner.insert(handle, callback);
        assert!(previous.is_none(), "duplicate pending-call handle {handle}");
    }

    /// Atomically fetch and remove the callback for a completed call.
    ///
    /// `None` on the completion path means the handle/callback association
    /// was lost — the dispatcher treats that as a broken invariant.
    pub fn take(&self, handle: Uuid) -> Option<ApiCallback> {
        self.lock().remove(&handle)
    }

    /// Drop a registration if present. Absent handles are a no-op.
    pub fn remove(&self, handle: Uuid) {
        self.lock().remove(&handle);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, ApiCallback>> {
        // Callbacks don't panic while the lock is held; poisoning here
        // means the process is already broken.
        self.inner.lock().expect("pending-call registry poisoned")
    }
}
