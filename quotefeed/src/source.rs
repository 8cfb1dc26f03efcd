use std::sync::Arc;

use async_trait::async_trait;

use crate::category::TickerCategory;
use crate::error::FeedError;
use crate::snapshot::{ListingRow, SymbolDetail};

/// Boundary between the pipeline and the market-data plumbing.
///
/// The production implementation is [`QuoteClient`](crate::QuoteClient);
/// tests substitute deterministic stubs.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Ordered rows of the category's listing page.
    async fn listing(&self, category: TickerCategory) -> Result<Vec<ListingRow>, FeedError>;

    /// Long name, currency and monthly price range for one symbol.
    async fn detail(&self, symbol: &str) -> Result<SymbolDetail, FeedError>;
}

pub type DynMarketData = Arc<dyn MarketData>;
