//! Cooperative shutdown controller.
//!
//! `main.rs` combines this with OS signals to perform graceful shutdown.
//! The polling loop checks it at the cadence sleep and at every retry
//! backoff so a signal never waits out a full retry budget.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::Notify;

/// Cooperative shutdown signal used for graceful exit.
#[derive(Clone, Debug, Default)]
pub struct ShutdownController {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    requested: AtomicBool,
    notify: Notify,
}

impl ShutdownController {
    /// Returns true if shutdown has been requested.
    pub fn is_shutdown_requested(&self) -> bool {
        self.inner.requested.load(Ordering::Relaxed)
    }

    /// Request shutdown and wake all waiters.
    pub fn request_shutdown(&self) {
        self.inner.requested.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Wait until shutdown is requested.
    pub async fn wait(&self) {
        if self.is_shutdown_requested() {
            return;
        }
        self.inner.notify.notified().await;
    }

    /// Sleep for `duration`, returning early if shutdown is requested.
    ///
    /// Returns true if the sleep completed, false if it was interrupted.
    pub async fn sleep(&self, duration: std::time::Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = self.wait() => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_not_requested_by_default() {
        let shutdown = ShutdownController::default();
        assert!(!shutdown.is_shutdown_requested());
    }

    #[tokio::test]
    async fn test_request_wakes_waiter() {
        let shutdown = ShutdownController::default();
        let waiter = shutdown.clone();

        let handle = tokio::spawn(async move {
            waiter.wait().await;
        });

        shutdown.request_shutdown();
        assert!(shutdown.is_shutdown_requested());
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("waiter should wake")
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_completes_without_shutdown() {
        let shutdown = ShutdownController::default();
        assert!(shutdown.sleep(Duration::from_secs(2)).await);
    }

    #[tokio::test]
    async fn test_sleep_interrupted_by_shutdown() {
        let shutdown = ShutdownController::default();
        shutdown.request_shutdown();
        assert!(!shutdown.sleep(Duration::from_secs(60)).await);
    }
}
