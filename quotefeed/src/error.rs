use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to build HTTP client: {source}")]
    Client {
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP request failed for {url}: {source}")]
    Http {
        #[source]
        source: reqwest::Error,
        url: String,
    },
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("malformed payload from {url}: {source}")]
    Payload {
        #[source]
        source: serde_json::Error,
        url: String,
    },
    #[error("listing page unusable: {0}")]
    Listing(String),
    #[error("missing {field} for {symbol}")]
    MissingData { symbol: String, field: &'static str },
    #[error("unknown ticker category: {0}")]
    UnknownCategory(String),
}
