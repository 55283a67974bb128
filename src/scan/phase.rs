//! Phase Runner
//!
//! Start a remote operation, then poll its status until it reports 100%,
//! disappears, errors, or runs out of its wall-clock budget. Polls are
//! strictly serial and every wait races the shutdown signal.

use crate::client::error::ClientResult;
use crate::client::traits::ScannerApi;
use crate::client::types::{PhaseHandle, PhaseKind, PhaseParams, PhaseStatus, ScanTarget};
use crate::core::polling::PollPolicy;
use crate::core::shutdown::ShutdownSignal;
use crate::scan::error::{PhaseError, PhaseProgress};
use std::future::Future;
use std::time::Duration;
use tokio::time::{timeout, Instant};

/// A phase that reached 100%
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseOutcome {
    pub handle: PhaseHandle,
    pub elapsed: Duration,
    pub polls: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct PhaseRunner {
    kind: PhaseKind,
    policy: PollPolicy,
    max_transport_errors: u32,
}

impl PhaseRunner {
    pub fn new(kind: PhaseKind, policy: PollPolicy, max_transport_errors: u32) -> Self {
        Self {
            kind,
            policy,
            max_transport_errors: max_transport_errors.max(1),
        }
    }

    /// Drive one phase of `api` against `target`
    pub async fn run_phase(
        &self,
        api: &dyn ScannerApi,
        target: &ScanTarget,
        params: &PhaseParams,
        signal: &mut ShutdownSignal,
    ) -> Result<PhaseOutcome, PhaseError> {
        let kind = self.kind;
        self.run(
            || api.start_phase(target, params),
            move |handle| async move { api.query_status(kind, &handle).await },
            signal,
        )
        .await
    }

    /// Generic start-then-poll loop
    ///
    /// The first status query follows the start immediately; later ones wait
    /// the policy interval, clipped so no query is issued past the deadline.
    /// A query still in flight at the deadline is abandoned as a timeout.
    /// Transport failures are retried at the next scheduled poll until
    /// `max_transport_errors` of them occur in a row.
    pub async fn run<S, SFut, Q, QFut>(
        &self,
        start: S,
        mut status: Q,
        signal: &mut ShutdownSignal,
    ) -> Result<PhaseOutcome, PhaseError>
    where
        S: FnOnce() -> SFut,
        SFut: Future<Output = ClientResult<PhaseHandle>>,
        Q: FnMut(PhaseHandle) -> QFut,
        QFut: Future<Output = ClientResult<PhaseStatus>>,
    {
        let kind = self.kind;
        let started = Instant::now();
        let mut progress = PhaseProgress::default();

        let handle = match signal.run(start()).await {
            Err(_) => {
                return Err(PhaseError::Cancelled {
                    kind,
                    handle: None,
                    progress,
                })
            }
            Ok(Err(source)) => return Err(PhaseError::StartFailed { kind, source }),
            Ok(Ok(handle)) => handle,
        };
        log::info!("Started {} {}", kind, handle);

        let mut transport_errors = 0;
        loop {
            progress.elapsed = started.elapsed();
            if self.policy.is_exhausted(progress.elapsed) {
                return Err(PhaseError::Timeout {
                    kind,
                    handle,
                    timeout: self.policy.timeout,
                    progress,
                });
            }

            progress.polls += 1;
            // An answer landing after the deadline does not count
            let remaining = self.policy.timeout.saturating_sub(progress.elapsed);
            let polled = match signal.run(timeout(remaining, status(handle.clone()))).await {
                Ok(Ok(polled)) => polled,
                Ok(Err(_)) => {
                    progress.elapsed = started.elapsed();
                    return Err(PhaseError::Timeout {
                        kind,
                        handle,
                        timeout: self.policy.timeout,
                        progress,
                    });
                }
                Err(_) => {
                    progress.elapsed = started.elapsed();
                    return Err(PhaseError::Cancelled {
                        kind,
                        handle: Some(handle),
                        progress,
                    });
                }
            };
            progress.elapsed = started.elapsed();

            match polled {
                Ok(PhaseStatus::Progress(percent)) => {
                    transport_errors = 0;
                    progress.last_percent = Some(percent);
                    log::info!(
                        "{} {} at {}% ({:.0?} elapsed)",
                        kind,
                        handle,
                        percent,
                        progress.elapsed
                    );
                    if percent == PhaseStatus::COMPLETE {
                        return Ok(PhaseOutcome {
                            handle,
                            elapsed: progress.elapsed,
                            polls: progress.polls,
                        });
                    }
                }
                Ok(PhaseStatus::NotFound) => {
                    return Err(PhaseError::NotFound {
                        kind,
                        handle,
                        progress,
                    })
                }
                Err(source) if source.is_transient() => {
                    transport_errors += 1;
                    if transport_errors >= self.max_transport_errors {
                        return Err(PhaseError::PollFailed {
                            kind,
                            handle,
                            progress,
                            source,
                        });
                    }
                    log::warn!(
                        "{} {} status unavailable ({}/{}): {}",
                        kind,
                        handle,
                        transport_errors,
                        self.max_transport_errors,
                        source
                    );
                }
                Err(source) => {
                    return Err(PhaseError::PollFailed {
                        kind,
                        handle,
                        progress,
                        source,
                    })
                }
            }

            // None: budget spent, the check at the top of the loop reports it
            if let Some(delay) = self.policy.next_delay(started.elapsed()) {
                if signal.sleep(delay).await.is_err() {
                    progress.elapsed = started.elapsed();
                    return Err(PhaseError::Cancelled {
                        kind,
                        handle: Some(handle),
                        progress,
                    });
                }
            }
        }
    }
}
