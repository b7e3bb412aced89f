use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::application::usecases::{DispatchEventUseCase, DispatchOutcome};
use crate::application::{AppResult, DonationSource, SeenStore};
use crate::domain::{DonationId, from_donation_record};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PollReport {
    pub fetched: usize,
    pub duplicates: usize,
    pub invalid: usize,
    pub dispatched: usize,
    pub suppressed: usize,
    /// Marked seen without dispatch on the first poll when backlog skipping is on.
    pub backlog: usize,
}

pub struct PollDonationsUseCase {
    source: Arc<dyn DonationSource>,
    seen: Arc<dyn SeenStore>,
    dispatch: Arc<DispatchEventUseCase>,
    skip_backlog: bool,
    primed: AtomicBool,
}

impl PollDonationsUseCase {
    pub fn new(
        source: Arc<dyn DonationSource>,
        seen: Arc<dyn SeenStore>,
        dispatch: Arc<DispatchEventUseCase>,
    ) -> Self {
        Self {
            source,
            seen,
            dispatch,
            skip_backlog: false,
            primed: AtomicBool::new(false),
        }
    }

    pub fn with_skip_backlog(mut self, skip: bool) -> Self {
        self.skip_backlog = skip;
        self
    }

    /// One fetch + process cycle. A fetch failure leaves the seen set untouched.
    pub async fn execute(&self) -> AppResult<PollReport> {
        let records = self.source.fetch().await?;
        if self.seen.reserve(records.len()).await? {
            tracing::warn!(
                feed_len = records.len(),
                "donation feed is larger than the seen-id capacity; capacity raised to match"
            );
        }
        let backlog_pass = self.skip_backlog && !self.primed.swap(true, Ordering::SeqCst);

        let mut report = PollReport {
            fetched: records.len(),
            ..Default::default()
        };

        // provider order is preserved
        for raw in &records {
            let id = DonationId::from_record(raw);
            if self.seen.has_seen(&id).await? {
                report.duplicates += 1;
                continue;
            }
            self.seen.mark_seen(&id).await?;

            if backlog_pass {
                report.backlog += 1;
                continue;
            }

            let event = match from_donation_record(raw) {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!(donation_id = %id, "skipping donation record: {e}");
                    report.invalid += 1;
                    continue;
                }
            };

            match self.dispatch.execute(&event).await {
                DispatchOutcome::Suppressed => report.suppressed += 1,
                DispatchOutcome::Fired(_) => report.dispatched += 1,
            }
        }

        if report.backlog > 0 {
            tracing::info!(skipped = report.backlog, "initial donation backlog marked as seen");
        }

        Ok(report)
    }

    /// Polls every `every` until `token` is cancelled; the first poll runs immediately.
    /// A cycle still running when the next tick is due makes that tick be skipped.
    pub async fn run(&self, every: Duration, token: CancellationToken) {
        let mut ticker = tokio::time::interval(every.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!("donation poller stopped");
                    break;
                },
                _ = ticker.tick() => {
                    match self.execute().await {
                        Ok(report) => tracing::debug!(?report, "donation poll finished"),
                        Err(e) => tracing::warn!("Error checking for donations: {e}"),
                    }
                },
            }
        }
    }
}
