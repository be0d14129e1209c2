//! Sequential batch execution against a [`ParcelLookup`].
//!
//! Each request gets exactly one lookup attempt, strictly one at a time, with
//! a [`Pacer`] pause between rows. A failed lookup becomes a
//! [`LookupResult::Failure`] for that row and the batch moves on, so a batch
//! of N requests always yields N results in input order.

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use utilix_client::ParcelLookup;
use utilix_core::{strip_apn_punctuation, BatchProgress, LookupRequest, LookupResult};

use crate::pacing::{FixedDelay, Pacer};

const CANCELLED_REASON: &str = "cancelled";

/// Final state of one batch run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchReport {
    /// One entry per input request, in input order.
    pub results: Vec<LookupResult>,
    /// Set when the run stopped early; skipped rows are recorded as failures.
    pub cancelled: bool,
}

impl BatchReport {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}

/// Drives lookups for a batch of requests and publishes progress.
///
/// `run` takes `&mut self`, so a runner can only execute one batch at a time.
/// Observers follow progress through [`BatchRunner::subscribe`].
pub struct BatchRunner<L, P = FixedDelay> {
    lookup: L,
    pacer: P,
    default_state: String,
    progress: watch::Sender<BatchProgress>,
    cancel: CancellationToken,
}

impl<L: ParcelLookup> BatchRunner<L, FixedDelay> {
    /// Creates a runner with the default fixed inter-row delay.
    pub fn new(lookup: L, default_state: impl Into<String>) -> Self {
        Self::with_pacer(lookup, FixedDelay::default(), default_state)
    }
}

impl<L: ParcelLookup, P: Pacer> BatchRunner<L, P> {
    pub fn with_pacer(lookup: L, pacer: P, default_state: impl Into<String>) -> Self {
        let (progress, _) = watch::channel(BatchProgress::default());
        Self {
            lookup,
            pacer,
            default_state: default_state.into(),
            progress,
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the runner's cancellation token with one owned by the caller.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Handle that sees every progress update as a read-only snapshot.
    pub fn subscribe(&self) -> watch::Receiver<BatchProgress> {
        self.progress.subscribe()
    }

    pub fn progress(&self) -> BatchProgress {
        *self.progress.borrow()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Looks up every request in order and returns one result per request.
    ///
    /// Lookup errors never abort the batch. If the cancellation token fires,
    /// no further lookups are started and the remaining rows are recorded as
    /// failures with reason `cancelled`.
    pub async fn run(&mut self, requests: &[LookupRequest]) -> BatchReport {
        let total = requests.len();
        self.progress.send_replace(BatchProgress { done: 0, total });
        tracing::info!(total, "starting batch lookup");

        let mut report = BatchReport {
            results: Vec::with_capacity(total),
            cancelled: false,
        };

        for (idx, request) in requests.iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::warn!(
                    processed = idx,
                    remaining = total - idx,
                    "batch cancelled; remaining rows recorded as failures"
                );
                report.cancelled = true;
                report
                    .results
                    .extend(requests[idx..].iter().map(cancelled_placeholder));
                break;
            }

            let prepared = request.prepared(&self.default_state);
            tracing::debug!(row = prepared.row_index, apn = %prepared.apn, "dispatching lookup");

            let result = match self.lookup.lookup(&prepared).await {
                Ok(info) => LookupResult::Success {
                    row_index: prepared.row_index,
                    info,
                },
                Err(e) => {
                    tracing::warn!(
                        row = prepared.row_index,
                        apn = %prepared.apn,
                        error = %e,
                        "parcel lookup failed; recording unavailable placeholder"
                    );
                    LookupResult::Failure {
                        row_index: prepared.row_index,
                        apn: prepared.apn,
                        reason: e.to_string(),
                    }
                }
            };
            report.results.push(result);
            self.progress.send_replace(BatchProgress {
                done: idx + 1,
                total,
            });

            if idx + 1 < total {
                tokio::select! {
                    () = self.pacer.pause() => {}
                    () = self.cancel.cancelled() => {}
                }
            }
        }

        tracing::info!(
            total,
            succeeded = report.succeeded(),
            failed = report.failed(),
            cancelled = report.cancelled,
            "batch lookup finished"
        );
        report
    }
}

fn cancelled_placeholder(request: &LookupRequest) -> LookupResult {
    LookupResult::Failure {
        row_index: request.row_index,
        apn: strip_apn_punctuation(&request.apn),
        reason: CANCELLED_REASON.to_string(),
    }
}
