//! [`ShutdownSignal`] – one-shot stop request shared between the interrupt
//! handler thread and the control loop.
//!
//! Once triggered the signal stays triggered.  [`ShutdownSignal::wait`]
//! resolves immediately if it was triggered before the call.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    triggered: AtomicBool,
    notify: Notify,
}

/// Cloneable handle; every clone observes the same trigger.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<Inner>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown.  Safe to call from any thread, any number of times.
    pub fn trigger(&self) {
        self.inner.triggered.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_triggered(&self) -> bool {
        self.inner.triggered.load(Ordering::SeqCst)
    }

    /// Resolve once [`trigger`][Self::trigger] has been called.
    pub async fn wait(&self) {
        let notified = self.inner.notify.notified();
        if self.is_triggered() {
            return;
        }
        notified.await;
    }
}
