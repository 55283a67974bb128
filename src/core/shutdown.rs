//! Shutdown Coordination
//!
//! Signal handling plus a cancellation handle (`ShutdownSignal`) that long
//! waits can race against, so a scan aborts promptly on shutdown instead of
//! running out its remaining timeout budget.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Returned by cancellable waits when shutdown was requested first
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("shutdown requested")]
pub struct Cancelled;

/// Owns the shutdown flag and broadcast that every `ShutdownSignal` watches
pub struct ShutdownCoordinator {
    tx: broadcast::Sender<()>,
    requested: Arc<AtomicBool>,
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(8);
        Self {
            tx,
            requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Hand out a cancellation handle tied to this coordinator
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            requested: self.requested.clone(),
            rx: self.tx.subscribe(),
        }
    }

    pub fn trigger_shutdown(&self) {
        request(&self.requested, &self.tx);
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Run `future_fn` with process signal handlers feeding this coordinator
    pub async fn guard_with_coordinator<F, Fut, R, E>(future_fn: F) -> Result<R, E>
    where
        F: FnOnce(Self) -> Fut,
        Fut: Future<Output = Result<R, E>>,
    {
        let coordinator = Self::new();
        coordinator.install_signal_handlers();
        future_fn(coordinator).await
    }

    /// SIGINT, SIGTERM, SIGHUP and SIGQUIT request shutdown; a second
    /// signal exits with 130 without waiting for the scan to unwind
    fn install_signal_handlers(&self) {
        #[cfg(unix)]
        {
            use std::sync::atomic::AtomicUsize;
            use tokio::signal::unix::{signal, SignalKind};

            // SAFETY: restoring the default disposition has no preconditions
            unsafe {
                libc::signal(libc::SIGPIPE, libc::SIG_DFL);
            }

            let received = Arc::new(AtomicUsize::new(0));
            for kind in [
                SignalKind::interrupt(),
                SignalKind::terminate(),
                SignalKind::hangup(),
                SignalKind::quit(),
            ] {
                let tx = self.tx.clone();
                let requested = self.requested.clone();
                let received = received.clone();

                tokio::spawn(async move {
                    let Ok(mut stream) = signal(kind) else {
                        log::debug!("Could not install handler for {:?}", kind);
                        return;
                    };
                    while stream.recv().await.is_some() {
                        if received.fetch_add(1, Ordering::AcqRel) >= 1 {
                            log::warn!("Second shutdown signal received; exiting");
                            std::process::exit(130);
                        }
                        log::warn!("Shutdown requested; aborting scan");
                        request(&requested, &tx);
                    }
                });
            }
        }

        #[cfg(not(unix))]
        {
            let tx = self.tx.clone();
            let requested = self.requested.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::warn!("Shutdown requested; aborting scan");
                    request(&requested, &tx);
                }
            });
        }
    }
}

// Release pairs with the Acquire loads in the readers
fn request(requested: &AtomicBool, tx: &broadcast::Sender<()>) {
    requested.store(true, Ordering::Release);
    let _ = tx.send(());
}

/// Cancellation handle for one logical scan run
///
/// Once shutdown has been requested every subsequent wait returns
/// `Err(Cancelled)` immediately.
pub struct ShutdownSignal {
    requested: Arc<AtomicBool>,
    rx: broadcast::Receiver<()>,
}

impl ShutdownSignal {
    /// A signal that never fires, for runs without signal handling
    pub fn detached() -> Self {
        let (tx, rx) = broadcast::channel(1);
        drop(tx);
        Self {
            requested: Arc::new(AtomicBool::new(false)),
            rx,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Resolves once shutdown is requested
    pub async fn cancelled(&mut self) {
        if self.is_cancelled() {
            return;
        }
        match self.rx.recv().await {
            Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {}
            // All senders gone without a shutdown: nothing can fire anymore
            Err(broadcast::error::RecvError::Closed) => std::future::pending::<()>().await,
        }
    }

    /// Sleep for `duration` unless shutdown is requested first
    pub async fn sleep(&mut self, duration: Duration) -> Result<(), Cancelled> {
        self.run(tokio::time::sleep(duration)).await
    }

    /// Drive `future` to completion unless shutdown is requested first
    pub async fn run<F: Future>(&mut self, future: F) -> Result<F::Output, Cancelled> {
        if self.is_cancelled() {
            return Err(Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(Cancelled),
            output = future => Ok(output),
        }
    }
}

impl Clone for ShutdownSignal {
    fn clone(&self) -> Self {
        Self {
            requested: self.requested.clone(),
            rx: self.rx.resubscribe(),
        }
    }
}
