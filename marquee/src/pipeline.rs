use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use quotefeed::StockSnapshot;

use crate::error::MarqueeError;

/// Pull-based backpressure flag between the renderer and the producer.
///
/// The renderer raises it when the channel runs dry; the producer clears it
/// once a fetch cycle is underway and the renderer clears it again after
/// waking. All operations are idempotent and none of them block.
#[derive(Debug, Clone)]
pub struct DemandSignal {
    flag: Arc<watch::Sender<bool>>,
}

impl DemandSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { flag: Arc::new(tx) }
    }

    pub fn raise(&self) {
        self.flag.send_replace(true);
    }

    pub fn lower(&self) {
        self.flag.send_replace(false);
    }

    /// Advisory read of the current flag.
    pub fn is_raised(&self) -> bool {
        *self.flag.subscribe().borrow()
    }

    /// Suspends until the flag is raised. Does not clear it; an already
    /// raised flag returns immediately.
    pub async fn await_raised(&self) {
        let mut rx = self.flag.subscribe();
        // Cannot fail: the sender half lives in self for the receiver's
        // whole lifetime.
        let _ = rx.wait_for(|raised| *raised).await;
    }
}

impl Default for DemandSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates the snapshot channel. `None` is the unbounded default; `Some`
/// switches to a bounded channel whose `send` exerts real backpressure.
pub fn snapshot_channel(capacity: Option<usize>) -> (SnapshotSender, SnapshotReceiver) {
    match capacity {
        Some(bound) => {
            let (tx, rx) = mpsc::channel(bound.max(1));
            (
                SnapshotSender(SenderKind::Bounded(tx)),
                SnapshotReceiver(ReceiverKind::Bounded(rx)),
            )
        }
        None => {
            let (tx, rx) = mpsc::unbounded_channel();
            (
                SnapshotSender(SenderKind::Unbounded(tx)),
                SnapshotReceiver(ReceiverKind::Unbounded(rx)),
            )
        }
    }
}

#[derive(Debug, Clone)]
pub struct SnapshotSender(SenderKind);

#[derive(Debug, Clone)]
enum SenderKind {
    Bounded(mpsc::Sender<StockSnapshot>),
    Unbounded(mpsc::UnboundedSender<StockSnapshot>),
}

impl SnapshotSender {
    /// Enqueues one snapshot. Never waits in unbounded mode; waits for a
    /// free slot in bounded mode.
    pub async fn send(&self, snapshot: StockSnapshot) -> Result<(), MarqueeError> {
        match &self.0 {
            SenderKind::Bounded(tx) => tx
                .send(snapshot)
                .await
                .map_err(|_| MarqueeError::ChannelClosed),
            SenderKind::Unbounded(tx) => {
                tx.send(snapshot).map_err(|_| MarqueeError::ChannelClosed)
            }
        }
    }
}

#[derive(Debug)]
pub struct SnapshotReceiver(ReceiverKind);

#[derive(Debug)]
enum ReceiverKind {
    Bounded(mpsc::Receiver<StockSnapshot>),
    Unbounded(mpsc::UnboundedReceiver<StockSnapshot>),
}

impl SnapshotReceiver {
    /// Next snapshot in FIFO order; `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<StockSnapshot> {
        match &mut self.0 {
            ReceiverKind::Bounded(rx) => rx.recv().await,
            ReceiverKind::Unbounded(rx) => rx.recv().await,
        }
    }

    /// Advisory emptiness check. Racy against concurrent sends; it only
    /// steers the demand hint, never the delivered data.
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            ReceiverKind::Bounded(rx) => rx.is_empty(),
            ReceiverKind::Unbounded(rx) => rx.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn snapshot(symbol: &str) -> StockSnapshot {
        StockSnapshot {
            symbol: symbol.into(),
            long_name: String::new(),
            last_price: 1.0,
            month_high: 2.0,
            month_low: 0.5,
            change_percent: 0.0,
            currency: None,
        }
    }

    #[tokio::test]
    async fn unbounded_channel_preserves_fifo_order() {
        let (tx, mut rx) = snapshot_channel(None);
        for symbol in ["A", "B", "C"] {
            tx.send(snapshot(symbol)).await.unwrap();
        }
        assert_eq!(rx.recv().await.unwrap().symbol, "A");
        assert_eq!(rx.recv().await.unwrap().symbol, "B");
        assert_eq!(rx.recv().await.unwrap().symbol, "C");
    }

    #[tokio::test]
    async fn bounded_channel_preserves_fifo_order() {
        let (tx, mut rx) = snapshot_channel(Some(8));
        for symbol in ["A", "B"] {
            tx.send(snapshot(symbol)).await.unwrap();
        }
        assert_eq!(rx.recv().await.unwrap().symbol, "A");
        assert_eq!(rx.recv().await.unwrap().symbol, "B");
    }

    #[tokio::test]
    async fn is_empty_tracks_queued_items() {
        let (tx, mut rx) = snapshot_channel(None);
        assert!(rx.is_empty());
        tx.send(snapshot("A")).await.unwrap();
        assert!(!rx.is_empty());
        let _ = rx.recv().await;
        assert!(rx.is_empty());
    }

    #[tokio::test]
    async fn send_into_dropped_receiver_reports_closed() {
        let (tx, rx) = snapshot_channel(None);
        drop(rx);
        assert!(matches!(
            tx.send(snapshot("A")).await,
            Err(MarqueeError::ChannelClosed)
        ));
    }

    #[tokio::test]
    async fn demand_raise_is_idempotent_and_await_does_not_clear() {
        let demand = DemandSignal::new();
        assert!(!demand.is_raised());

        demand.raise();
        demand.raise();
        assert!(demand.is_raised());

        // An already raised flag satisfies the wait immediately and the
        // flag stays raised afterwards.
        demand.await_raised().await;
        assert!(demand.is_raised());

        demand.lower();
        demand.lower();
        assert!(!demand.is_raised());
    }

    #[tokio::test]
    async fn await_raised_wakes_on_a_later_raise() {
        let demand = DemandSignal::new();
        let waiter = {
            let demand = demand.clone();
            tokio::spawn(async move {
                demand.await_raised().await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        demand.raise();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();
    }
}
