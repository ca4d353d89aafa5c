//! Continuation delivery contexts
//!
//! The SDK completes network calls on arbitrary tokio worker tasks, but
//! results usually belong on one specific execution context (a UI loop,
//! an actor). The host supplies that capability as a `DeliveryContext`:
//! "run this continuation over there". Once a task is posted it cannot be
//! withdrawn — there is no back-pressure or cancellation.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::warn;

/// A continuation ready to run on its owning context.
pub type Task = Box<dyn FnOnce() + Send>;

/// Host-supplied capability to run continuations on a specific execution
/// context.
pub trait DeliveryContext: Send + Sync {
    fn post(&self, task: Task);
}

/// Delivery context backed by an unbounded channel.
///
/// The host drains the receiver on its owning loop and runs each task.
/// If the receiver is dropped, posted continuations are discarded.
pub struct ChannelContext {
    tx: mpsc::UnboundedSender<Task>,
}

impl ChannelContext {
    /// Create a context and the receiver the host drains.
    pub fn channel() -> (Arc<Self>, mpsc::UnboundedReceiver<Task>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

impl DeliveryContext for ChannelContext {
    fn post(&self, task: Task) {
        if self.tx.send(task).is_err() {
            warn!("delivery context receiver dropped, continuation discarded");
        }
    }
}

/// Delivery context that runs continuations immediately on the posting
/// task. For hosts without thread-affinity requirements, and for tests.
pub struct InlineContext;

impl DeliveryContext for InlineContext {
    fn post(&self, task: Task) {
        task();
    }
}
