use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::aggregator::aggregate;
use crate::models::{FundingRow, MatchedRecord, PriceChangeRow};
use crate::notify::{Alert, Dispatcher};
use crate::sources::{TableSource, extract_or_empty};
use crate::tracker::NotifiedSet;

/// What one cycle saw and did.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub funding_rows: usize,
    pub pchange_rows: usize,
    pub matched: Vec<MatchedRecord>,
    /// Ids alerted on this cycle, in dispatch order.
    pub notified: Vec<String>,
    /// Channel deliveries that succeeded across all alerts.
    pub deliveries: usize,
}

/// Drives fetch, aggregate, diff and notify on a fixed interval.
/// The notified set lives here and nowhere else.
pub struct PollLoop {
    funding: Box<dyn TableSource<Row = FundingRow>>,
    pchange: Box<dyn TableSource<Row = PriceChangeRow>>,
    dispatcher: Dispatcher,
    notified: NotifiedSet,
    interval: Duration,
}

impl PollLoop {
    pub fn new(
        funding: Box<dyn TableSource<Row = FundingRow>>,
        pchange: Box<dyn TableSource<Row = PriceChangeRow>>,
        dispatcher: Dispatcher,
        notified: NotifiedSet,
        interval: Duration,
    ) -> Self {
        Self {
            funding,
            pchange,
            dispatcher,
            notified,
            interval,
        }
    }

    pub fn notified(&self) -> &NotifiedSet {
        &self.notified
    }

    /// Runs cycles until `shutdown` fires, checking it before each cycle and
    /// during the wait between cycles.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        tracing::info!("Polling every {}s", self.interval.as_secs());

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            let report = self.run_cycle().await;
            tracing::debug!(
                "Cycle done: {} funding rows, {} pchange rows, {} matched, {} new, {} deliveries, {} known",
                report.funding_rows,
                report.pchange_rows,
                report.matched.len(),
                report.notified.len(),
                report.deliveries,
                self.notified.len()
            );

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::info!("Poll loop stopped with {} known assets", self.notified().len());
    }

    /// One full cycle. Never fails: a broken source counts as empty and a
    /// broken channel is only logged.
    pub async fn run_cycle(&mut self) -> CycleReport {
        tracing::info!("Fetching funding and price-change listings...");

        // ── 1. Extract, A strictly before B ───────────────────────────
        let funding = extract_or_empty(self.funding.as_ref()).await;
        let pchange = extract_or_empty(self.pchange.as_ref()).await;

        // ── 2. Join ───────────────────────────────────────────────────
        let matched = aggregate(&funding, &pchange);

        // ── 3. Alert on assets not seen last cycle ────────────────────
        let fresh = self.notified.fresh(&matched);
        let mut notified = Vec::with_capacity(fresh.len());
        let mut deliveries = 0;

        if fresh.is_empty() {
            tracing::info!("No new assets to notify.");
        }
        for record in fresh {
            match self.dispatcher.dispatch(&Alert::for_record(record)).await {
                0 => tracing::warn!("No channel delivered the alert for {} ({})", record.name, record.id),
                n => {
                    tracing::info!("Notification sent for {} ({}) via {} channel(s)", record.name, record.id, n);
                    deliveries += n;
                }
            }
            notified.push(record.id.clone());
        }

        // ── 4. Log the full match set ─────────────────────────────────
        if matched.is_empty() {
            tracing::info!("No assets meet both conditions.");
        }
        for r in &matched {
            tracing::info!(
                "Asset: [{}]({}) (ID: {}), Funding Rate: {}%, 24h change: {}%",
                r.name,
                r.link,
                r.id,
                r.funding_rate,
                r.pchange_24h
            );
        }
        tracing::info!("----------------------------------------------------");

        // ── 5. Carry state to the next cycle ──────────────────────────
        self.notified.advance(&matched);

        CycleReport {
            funding_rows: funding.len(),
            pchange_rows: pchange.len(),
            matched,
            notified,
            deliveries,
        }
    }
}
