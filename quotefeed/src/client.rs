use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::cache::ResponseCache;
use crate::category::TickerCategory;
use crate::error::FeedError;
use crate::listing;
use crate::snapshot::{ListingRow, SymbolDetail};
use crate::source::MarketData;
use crate::throttle::RequestThrottle;

const LISTING_BASE: &str = "https://finance.yahoo.com";
const CHART_BASE: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const SUMMARY_BASE: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";

// The listing pages reject clients that do not present a browser-like agent.
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Cached, rate-limited transport for the public financial data source.
///
/// One instance is shared by every fetch the producer issues; the cache and
/// throttle it carries are the cross-cutting request policy, not pipeline
/// logic.
pub struct QuoteClient {
    http: reqwest::Client,
    cache: ResponseCache,
    throttle: RequestThrottle,
}

impl QuoteClient {
    pub fn new(
        cache_ttl: Duration,
        quota_window: Duration,
        quota_limit: u32,
        request_timeout: Duration,
    ) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(request_timeout)
            .build()
            .map_err(|e| FeedError::Client { source: e })?;
        Ok(Self {
            http,
            cache: ResponseCache::new(cache_ttl),
            throttle: RequestThrottle::new(quota_window, quota_limit),
        })
    }

    /// Fetches `url`, consulting the cache first and pacing misses through
    /// the throttle.
    async fn get_text(&self, url: &str) -> Result<String, FeedError> {
        if let Some(body) = self.cache.get(url).await {
            tracing::debug!(%url, "cache hit");
            return Ok(body);
        }

        self.throttle.acquire().await;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| FeedError::Http {
                source: e,
                url: url.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await.map_err(|e| FeedError::Http {
            source: e,
            url: url.to_string(),
        })?;
        self.cache.put(url, body.clone()).await;
        Ok(body)
    }

    async fn get_json(&self, url: &str) -> Result<Value, FeedError> {
        let body = self.get_text(url).await?;
        serde_json::from_str(&body).map_err(|e| FeedError::Payload {
            source: e,
            url: url.to_string(),
        })
    }

    async fn month_range(&self, symbol: &str) -> Result<(f64, f64), FeedError> {
        let url = format!(
            "{CHART_BASE}/{}?range=1mo&interval=1mo",
            urlencoding::encode(symbol)
        );
        let payload = self.get_json(&url).await?;
        extract_month_range(symbol, &payload)
    }

    async fn profile(&self, symbol: &str) -> Result<(String, Option<String>), FeedError> {
        let url = format!(
            "{SUMMARY_BASE}/{}?modules=price,financialData",
            urlencoding::encode(symbol)
        );
        let payload = self.get_json(&url).await?;
        Ok(extract_profile(&payload))
    }
}

#[async_trait]
impl MarketData for QuoteClient {
    async fn listing(&self, category: TickerCategory) -> Result<Vec<ListingRow>, FeedError> {
        let url = format!("{LISTING_BASE}/{}", category.slug());
        tracing::info!(%category, %url, "fetching listing page");
        let body = self.get_text(&url).await?;
        listing::parse_listing(&body)
    }

    async fn detail(&self, symbol: &str) -> Result<SymbolDetail, FeedError> {
        let (month_high, month_low) = self.month_range(symbol).await?;
        let (long_name, currency) = self.profile(symbol).await?;
        Ok(SymbolDetail {
            long_name,
            currency,
            month_high,
            month_low,
        })
    }
}

/// Pulls the monthly high/low out of a chart payload.
///
/// The range endpoint answers one bucket for `range=1mo&interval=1mo`; a
/// payload without both extremes is unusable for the snapshot.
fn extract_month_range(symbol: &str, payload: &Value) -> Result<(f64, f64), FeedError> {
    let quote = payload
        .get("chart")
        .and_then(|c| c.get("result"))
        .and_then(|r| r.get(0))
        .and_then(|r| r.get("indicators"))
        .and_then(|i| i.get("quote"))
        .and_then(|q| q.get(0));

    let high = quote
        .and_then(|q| q.get("high"))
        .and_then(|h| h.get(0))
        .and_then(Value::as_f64)
        .ok_or(FeedError::MissingData {
            symbol: symbol.to_string(),
            field: "high",
        })?;
    let low = quote
        .and_then(|q| q.get("low"))
        .and_then(|l| l.get(0))
        .and_then(Value::as_f64)
        .ok_or(FeedError::MissingData {
            symbol: symbol.to_string(),
            field: "low",
        })?;
    Ok((high, low))
}

/// Long name and financial currency from a quote-summary payload. Both are
/// optional metadata; their absence is not an error.
fn extract_profile(payload: &Value) -> (String, Option<String>) {
    let result = payload
        .get("quoteSummary")
        .and_then(|q| q.get("result"))
        .and_then(|r| r.get(0));

    let long_name = result
        .and_then(|r| r.get("price"))
        .and_then(|p| p.get("longName"))
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    let currency = result
        .and_then(|r| r.get("financialData"))
        .and_then(|f| f.get("financialCurrency"))
        .and_then(Value::as_str)
        .map(str::to_string);
    (long_name, currency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn month_range_reads_the_first_bucket() {
        let payload = json!({
            "chart": {
                "result": [{
                    "indicators": {
                        "quote": [{
                            "high": [199.62, 195.0],
                            "low": [180.17, 182.5]
                        }]
                    }
                }]
            }
        });
        let (high, low) = extract_month_range("AAPL", &payload).unwrap();
        assert_eq!(high, 199.62);
        assert_eq!(low, 180.17);
    }

    #[test]
    fn month_range_without_extremes_is_missing_data() {
        let payload = json!({
            "chart": { "result": [{ "indicators": { "quote": [{ "high": [null] }] } }] }
        });
        assert!(matches!(
            extract_month_range("AAPL", &payload),
            Err(FeedError::MissingData { field: "high", .. })
        ));
    }

    #[test]
    fn profile_reads_name_and_currency() {
        let payload = json!({
            "quoteSummary": {
                "result": [{
                    "price": { "longName": "Apple Inc." },
                    "financialData": { "financialCurrency": "USD" }
                }]
            }
        });
        let (name, currency) = extract_profile(&payload);
        assert_eq!(name, "Apple Inc.");
        assert_eq!(currency.as_deref(), Some("USD"));
    }

    #[test]
    fn absent_profile_metadata_is_not_an_error() {
        let payload = json!({ "quoteSummary": { "result": [{}] } });
        let (name, currency) = extract_profile(&payload);
        assert!(name.is_empty());
        assert!(currency.is_none());
    }

    #[test]
    fn client_builds_with_default_knobs() {
        let client = QuoteClient::new(
            Duration::from_secs(300),
            Duration::from_secs(1),
            2,
            Duration::from_secs(10),
        );
        assert!(client.is_ok());
    }
}
