use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;

use quotefeed::{DynMarketData, StockSnapshot, TickerCategory};

use crate::config::Settings;
use crate::error::MarqueeError;
use crate::pipeline::{DemandSignal, SnapshotSender};

/// Fetches listing snapshots whenever demand is raised and streams them
/// into the channel one by one.
pub struct SnapshotProducer {
    source: DynMarketData,
    category: TickerCategory,
    items: SnapshotSender,
    demand: DemandSignal,
    listing_retry: Duration,
}

impl SnapshotProducer {
    pub fn new(
        source: DynMarketData,
        category: TickerCategory,
        items: SnapshotSender,
        demand: DemandSignal,
        cfg: &Settings,
    ) -> Self {
        Self {
            source,
            category,
            items,
            demand,
            listing_retry: cfg.listing_retry(),
        }
    }

    /// Runs until shutdown. A failed listing fetch stalls the cycle and is
    /// retried after a delay; it never kills the task. Channel loss is
    /// fatal.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<(), MarqueeError> {
        let mut cycle: u64 = 0;
        loop {
            tokio::select! {
                _ = self.demand.await_raised() => {}
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            tracing::info!(cycle, category = %self.category, "demand raised; starting fetch cycle");
            match self.fetch_cycle().await {
                Ok(batch) => {
                    tracing::info!(cycle, produced = batch.len(), "fetch cycle complete");
                    cycle += 1;
                }
                Err(MarqueeError::Feed(e)) => {
                    tracing::error!(error = %e, retry_in = ?self.listing_retry, "listing fetch failed");
                    tokio::select! {
                        _ = tokio::time::sleep(self.listing_retry) => {}
                        _ = shutdown.changed() => {
                            if *shutdown.borrow() {
                                break;
                            }
                        }
                    }
                }
                Err(e) => return Err(e),
            }
        }
        tracing::info!("producer stopped");
        Ok(())
    }

    /// One demand-driven fetch pass. Returns every snapshot pushed, the
    /// decorative terminator included; the return value feeds tests and
    /// logging, not the pipeline.
    pub async fn fetch_cycle(&self) -> Result<Vec<StockSnapshot>, MarqueeError> {
        let rows = self.source.listing(self.category).await?;
        // Lower immediately so a wake during this cycle does not queue a
        // duplicate refill.
        self.demand.lower();
        tracing::info!(rows = rows.len(), "listing fetched");

        let mut produced = Vec::with_capacity(rows.len() + 1);
        for row in &rows {
            let detail = match self.source.detail(&row.symbol).await {
                Ok(detail) => detail,
                Err(e) => {
                    tracing::error!(symbol = %row.symbol, error = %e, "enrichment failed; skipping symbol");
                    continue;
                }
            };
            let snapshot = StockSnapshot::from_parts(row, &detail);
            self.items.send(snapshot.clone()).await?;
            produced.push(snapshot);
        }

        let terminator = decorative_snapshot();
        self.items.send(terminator.clone()).await?;
        produced.push(terminator);
        Ok(produced)
    }
}

/// Synthetic terminator appended after every cycle so the renderer always
/// receives at least one item, even when the listing came back empty.
pub fn decorative_snapshot() -> StockSnapshot {
    let mut rng = rand::thread_rng();
    let last_price = rng.gen_range(10.0..20.0);
    StockSnapshot {
        symbol: "COM".to_string(),
        long_name: "Compleo Charging Solutions AG".to_string(),
        last_price,
        month_high: last_price - rng.gen_range(3.0..5.0),
        month_low: last_price - rng.gen_range(3.0..5.0),
        change_percent: rng.gen_range(100.0..200.0),
        currency: Some("EUR".to_string()),
    }
}
