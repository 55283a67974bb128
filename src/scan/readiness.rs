//! Readiness Prober

use crate::client::traits::ScannerApi;
use crate::core::polling::PollPolicy;
use crate::core::shutdown::ShutdownSignal;
use crate::scan::error::ScanError;
use crate::scan::state::ScanState;
use tokio::time::{timeout, Instant};

/// Waits until the scanner answers a version query
#[derive(Debug, Clone, Copy)]
pub struct ReadinessProber {
    policy: PollPolicy,
}

impl ReadinessProber {
    pub fn new(policy: PollPolicy) -> Self {
        Self { policy }
    }

    /// Probe at the policy interval; returns the scanner version
    ///
    /// No probe is issued once the budget has elapsed, and a probe still
    /// pending at the deadline counts as a timeout.
    pub async fn probe(
        &self,
        api: &dyn ScannerApi,
        signal: &mut ShutdownSignal,
    ) -> Result<String, ScanError> {
        let started = Instant::now();
        let mut attempts = 0;
        let mut last_error = None;

        loop {
            let elapsed = started.elapsed();
            if self.policy.is_exhausted(elapsed) {
                return Err(ScanError::ReadinessTimeout {
                    elapsed,
                    attempts,
                    last_error,
                });
            }

            attempts += 1;
            let remaining = self.policy.timeout.saturating_sub(elapsed);
            match signal.run(timeout(remaining, api.version())).await {
                Err(_) => {
                    return Err(ScanError::Cancelled {
                        stage: ScanState::Init,
                    })
                }
                Ok(Err(_)) => {
                    log::debug!("Readiness probe {} still pending at the deadline", attempts);
                    return Err(ScanError::ReadinessTimeout {
                        elapsed: started.elapsed(),
                        attempts,
                        last_error,
                    });
                }
                Ok(Ok(Ok(version))) => {
                    log::debug!("Scanner ready after {} probe(s)", attempts);
                    return Ok(version);
                }
                Ok(Ok(Err(err))) => {
                    log::debug!("Readiness probe {} failed: {}", attempts, err);
                    last_error = Some(err);
                }
            }

            if let Some(delay) = self.policy.next_delay(started.elapsed()) {
                if signal.sleep(delay).await.is_err() {
                    return Err(ScanError::Cancelled {
                        stage: ScanState::Init,
                    });
                }
            }
        }
    }
}
