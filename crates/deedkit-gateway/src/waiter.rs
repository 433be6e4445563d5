//! Submit-then-poll until a batch settles or a deadline passes.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use deedkit_core::Batch;

use crate::error::Result;
use crate::gateway::{LedgerGateway, SubmissionReceipt};
use crate::status::CommitStatus;
use crate::transport::HttpTransport;

/// How a wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// No wait was requested.
    NotWaited,
    /// The batch left `PENDING` before the deadline.
    Settled(CommitStatus),
    /// The deadline passed while the batch was still pending.
    TimedOut,
}

/// Everything observed while submitting and waiting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitReport {
    pub receipt: SubmissionReceipt,
    pub outcome: WaitOutcome,
    /// Status queries issued.
    pub polls: u32,
    pub elapsed: Duration,
}

/// Polls the status endpoint for a submitted batch.
///
/// Each query asks the ledger to block for the remaining time, so a wait of
/// `N` seconds normally costs one or two round trips. A status error ends
/// the wait and propagates; nothing is retried.
pub struct CommitWaiter<'a, T: HttpTransport> {
    gateway: &'a LedgerGateway<T>,
}

impl<'a, T: HttpTransport> CommitWaiter<'a, T> {
    pub fn new(gateway: &'a LedgerGateway<T>) -> Self {
        Self { gateway }
    }

    /// Submit `batch` and, when `timeout` is positive, wait for it to leave
    /// `PENDING`.
    ///
    /// The returned receipt is always the submission acknowledgement; the
    /// final status is only logged. Use [`submit_and_wait_outcome`] to see it.
    ///
    /// [`submit_and_wait_outcome`]: CommitWaiter::submit_and_wait_outcome
    pub async fn submit_and_wait(
        &self,
        batch: &Batch,
        resource_name: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<SubmissionReceipt> {
        Ok(self
            .submit_and_wait_outcome(batch, resource_name, timeout)
            .await?
            .receipt)
    }

    /// Like [`submit_and_wait`](CommitWaiter::submit_and_wait), returning
    /// the full report.
    pub async fn submit_and_wait_outcome(
        &self,
        batch: &Batch,
        resource_name: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<WaitReport> {
        let receipt = self.gateway.submit(batch, resource_name).await?;

        let timeout = match timeout {
            Some(t) if !t.is_zero() => t,
            _ => {
                return Ok(WaitReport {
                    receipt,
                    outcome: WaitOutcome::NotWaited,
                    polls: 0,
                    elapsed: Duration::ZERO,
                })
            }
        };

        let start = Instant::now();
        let mut elapsed = Duration::ZERO;
        let mut polls = 0u32;
        let mut last = CommitStatus::Pending;

        while elapsed < timeout {
            let remaining = timeout - elapsed;
            last = self
                .gateway
                .query_status(&receipt.batch_id, remaining.as_secs())
                .await?;
            polls += 1;
            elapsed = start.elapsed();

            if !last.is_pending() {
                break;
            }
            debug!(batch_id = %receipt.batch_id, polls, ?elapsed, "batch still pending");

            // A zero wait hint is answered at once; sit out the last fraction.
            let left = timeout.saturating_sub(elapsed);
            if !left.is_zero() && left.as_secs() == 0 {
                tokio::time::sleep(left).await;
                elapsed = start.elapsed();
            }
        }

        let outcome = if last.is_pending() {
            warn!(batch_id = %receipt.batch_id, ?timeout, polls, "gave up waiting for batch");
            WaitOutcome::TimedOut
        } else {
            info!(batch_id = %receipt.batch_id, status = %last, polls, ?elapsed, "batch settled");
            WaitOutcome::Settled(last)
        };

        Ok(WaitReport {
            receipt,
            outcome,
            polls,
            elapsed,
        })
    }
}

impl<T: HttpTransport> LedgerGateway<T> {
    /// Submit a batch and wait up to `timeout` for it to settle.
    pub async fn submit_and_wait(
        &self,
        batch: &Batch,
        resource_name: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<SubmissionReceipt> {
        CommitWaiter::new(self)
            .submit_and_wait(batch, resource_name, timeout)
            .await
    }
}
