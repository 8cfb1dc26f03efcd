//! Market-listing collection plumbing for the marquee daemon.
//!
//! The crate wraps everything the pipeline treats as an external
//! collaborator: the category listing pages of the public financial data
//! source, the per-symbol chart and profile endpoints, and the cached,
//! rate-limited HTTP transport they share. The [`MarketData`] trait is the
//! boundary the daemon programs against; [`QuoteClient`] is the production
//! implementation.
//!
//! ## Request budget
//!
//! All outbound requests go through one [`ResponseCache`] and one
//! [`RequestThrottle`]. The cache answers repeat lookups within its TTL
//! without touching the network; the throttle paces everything else so the
//! source's request budget is respected.

pub mod cache;
pub mod category;
pub mod client;
pub mod error;
pub mod listing;
pub mod snapshot;
pub mod source;
pub mod throttle;

pub use cache::ResponseCache;
pub use category::TickerCategory;
pub use client::QuoteClient;
pub use error::FeedError;
pub use snapshot::{ListingRow, StockSnapshot, SymbolDetail};
pub use source::{DynMarketData, MarketData};
pub use throttle::RequestThrottle;
