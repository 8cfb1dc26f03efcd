use serde::{Deserialize, Serialize};

/// One ticker's price and metadata captured at fetch time.
///
/// Constructed once per fetch cycle and never mutated afterwards; the same
/// symbol may reappear in later cycles as a fresh, independent value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSnapshot {
    /// Short ticker identifier, never empty.
    pub symbol: String,
    /// Human-readable long name; empty when the source has none.
    pub long_name: String,
    /// Last traded price.
    pub last_price: f64,
    /// High over the most recent monthly interval.
    pub month_high: f64,
    /// Low over the most recent monthly interval.
    pub month_low: f64,
    /// Signed percent change.
    pub change_percent: f64,
    /// ISO-like currency code; absent when the source omits it.
    pub currency: Option<String>,
}

impl StockSnapshot {
    /// Combines a listing row with its enrichment into one snapshot.
    pub fn from_parts(row: &ListingRow, detail: &SymbolDetail) -> Self {
        Self {
            symbol: row.symbol.clone(),
            long_name: detail.long_name.clone(),
            last_price: row.last_price,
            month_high: detail.month_high,
            month_low: detail.month_low,
            change_percent: row.change_percent,
            currency: detail.currency.clone(),
        }
    }
}

/// One parsed row of a category listing table, in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRow {
    pub symbol: String,
    pub last_price: f64,
    pub change_percent: f64,
}

/// Per-symbol enrichment fetched alongside a listing row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolDetail {
    pub long_name: String,
    pub currency: Option<String>,
    pub month_high: f64,
    pub month_low: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_parts_keeps_every_field_verbatim() {
        let row = ListingRow {
            symbol: "AAPL".into(),
            last_price: 187.125,
            change_percent: -0.42,
        };
        let detail = SymbolDetail {
            long_name: "Apple Inc.".into(),
            currency: Some("USD".into()),
            month_high: 199.62,
            month_low: 180.17,
        };

        let snapshot = StockSnapshot::from_parts(&row, &detail);
        assert_eq!(snapshot.symbol, "AAPL");
        assert_eq!(snapshot.long_name, "Apple Inc.");
        assert_eq!(snapshot.last_price, 187.125);
        assert_eq!(snapshot.month_high, 199.62);
        assert_eq!(snapshot.month_low, 180.17);
        assert_eq!(snapshot.change_percent, -0.42);
        assert_eq!(snapshot.currency.as_deref(), Some("USD"));
    }

    #[test]
    fn absent_metadata_survives_construction() {
        let row = ListingRow {
            symbol: "^GSPC".into(),
            last_price: 5321.41,
            change_percent: 0.0,
        };
        let detail = SymbolDetail {
            long_name: String::new(),
            currency: None,
            month_high: 5400.0,
            month_low: 5100.0,
        };

        let snapshot = StockSnapshot::from_parts(&row, &detail);
        assert!(snapshot.long_name.is_empty());
        assert!(snapshot.currency.is_none());
    }
}
