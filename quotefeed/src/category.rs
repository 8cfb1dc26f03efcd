use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FeedError;

/// Listing page of the data source to pull snapshots from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickerCategory {
    Trending,
    MostActive,
    Gainers,
    Losers,
    WorldIndices,
    Etfs,
    Futures,
    Currencies,
    MutualFunds,
}

impl TickerCategory {
    pub const ALL: [TickerCategory; 9] = [
        TickerCategory::Trending,
        TickerCategory::MostActive,
        TickerCategory::Gainers,
        TickerCategory::Losers,
        TickerCategory::WorldIndices,
        TickerCategory::Etfs,
        TickerCategory::Futures,
        TickerCategory::Currencies,
        TickerCategory::MutualFunds,
    ];

    /// Path segment of the category's listing page on the source.
    pub fn slug(self) -> &'static str {
        match self {
            TickerCategory::Trending => "trending-tickers",
            TickerCategory::MostActive => "most-active",
            TickerCategory::Gainers => "gainers",
            TickerCategory::Losers => "losers",
            TickerCategory::WorldIndices => "world-indices",
            TickerCategory::Etfs => "efts",
            TickerCategory::Futures => "commodities",
            TickerCategory::Currencies => "currencies",
            TickerCategory::MutualFunds => "mutualfunds",
        }
    }
}

impl Default for TickerCategory {
    fn default() -> Self {
        TickerCategory::Trending
    }
}

impl fmt::Display for TickerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for TickerCategory {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        match name.as_str() {
            "trending" | "trending-tickers" => Ok(TickerCategory::Trending),
            "most-active" | "most_active" => Ok(TickerCategory::MostActive),
            "gainers" => Ok(TickerCategory::Gainers),
            "losers" => Ok(TickerCategory::Losers),
            "world-indices" | "world_indices" => Ok(TickerCategory::WorldIndices),
            "etfs" | "efts" => Ok(TickerCategory::Etfs),
            "futures" | "commodities" => Ok(TickerCategory::Futures),
            "currencies" => Ok(TickerCategory::Currencies),
            "mutual-funds" | "mutual_funds" | "mutualfunds" => Ok(TickerCategory::MutualFunds),
            _ => Err(FeedError::UnknownCategory(s.to_string())),
        }
    }
}
