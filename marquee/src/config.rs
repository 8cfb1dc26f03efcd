use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

use quotefeed::{FeedError, TickerCategory};

/// Command line arguments.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional path to a configuration file
    #[arg(short, long)]
    pub config: Option<String>,
}

/// Application configuration loaded from defaults, file and environment.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Listing category to pull each cycle.
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_rows")]
    pub rows: u32,
    #[serde(default = "default_cols")]
    pub cols: u32,
    /// Panel brightness in percent.
    #[serde(default = "default_brightness")]
    pub brightness: u8,
    /// Pause between scroll steps.
    #[serde(default = "default_frame_delay_ms")]
    pub frame_delay_ms: u64,
    /// Pause between two animated snapshots.
    #[serde(default = "default_item_delay_ms")]
    pub item_delay_ms: u64,
    /// Hard floor for the scroll offset when no line has cleared the edge.
    #[serde(default = "default_min_scroll_offset")]
    pub min_scroll_offset: i32,
    /// Delay before retrying a failed listing fetch.
    #[serde(default = "default_listing_retry_secs")]
    pub listing_retry_secs: u64,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_quota_window_secs")]
    pub quota_window_secs: u64,
    #[serde(default = "default_quota_limit")]
    pub quota_limit: u32,
    /// Bounded channel capacity; absent means unbounded.
    #[serde(default)]
    pub channel_capacity: Option<usize>,
    /// Output surface: "terminal" or "null".
    #[serde(default = "default_panel")]
    pub panel: String,
}

fn default_category() -> String {
    "trending".into()
}

fn default_rows() -> u32 {
    64
}

fn default_cols() -> u32 {
    64
}

fn default_brightness() -> u8 {
    70
}

fn default_frame_delay_ms() -> u64 {
    20
}

fn default_item_delay_ms() -> u64 {
    500
}

fn default_min_scroll_offset() -> i32 {
    -200
}

fn default_listing_retry_secs() -> u64 {
    30
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_quota_window_secs() -> u64 {
    1
}

fn default_quota_limit() -> u32 {
    2
}

fn default_panel() -> String {
    "terminal".into()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            category: default_category(),
            rows: default_rows(),
            cols: default_cols(),
            brightness: default_brightness(),
            frame_delay_ms: default_frame_delay_ms(),
            item_delay_ms: default_item_delay_ms(),
            min_scroll_offset: default_min_scroll_offset(),
            listing_retry_secs: default_listing_retry_secs(),
            request_timeout_ms: default_request_timeout_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
            quota_window_secs: default_quota_window_secs(),
            quota_limit: default_quota_limit(),
            channel_capacity: None,
            panel: default_panel(),
        }
    }
}

impl Settings {
    /// Loads configuration: serde defaults, then the optional file, then
    /// `MARQUEE_*` environment overrides.
    pub fn load(cli: &Cli) -> Result<Self, config::ConfigError> {
        let mut builder =
            config::Config::builder().add_source(config::Environment::with_prefix("MARQUEE"));
        if let Some(path) = &cli.config {
            builder = builder.add_source(config::File::with_name(path));
        }
        let cfg = builder.build()?;
        cfg.try_deserialize()
    }

    pub fn category(&self) -> Result<TickerCategory, FeedError> {
        self.category.parse()
    }

    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.frame_delay_ms)
    }

    pub fn item_delay(&self) -> Duration {
        Duration::from_millis(self.item_delay_ms)
    }

    pub fn listing_retry(&self) -> Duration {
        Duration::from_secs(self.listing_retry_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn quota_window(&self) -> Duration {
        Duration::from_secs(self.quota_window_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_reference_panel() {
        let settings = Settings::default();
        assert_eq!(settings.rows, 64);
        assert_eq!(settings.cols, 64);
        assert_eq!(settings.brightness, 70);
        assert_eq!(settings.category().unwrap(), TickerCategory::Trending);
        assert!(settings.channel_capacity.is_none());
    }

    #[test]
    fn load_without_file_or_env_matches_defaults() {
        let cli = Cli { config: None };
        let settings = Settings::load(&cli).unwrap();
        assert_eq!(settings.frame_delay(), Duration::from_millis(20));
        assert_eq!(settings.item_delay(), Duration::from_millis(500));
        assert_eq!(settings.min_scroll_offset, -200);
    }

    #[test]
    fn bad_category_is_rejected_at_parse_time() {
        let settings = Settings {
            category: "moonshots".into(),
            ..Settings::default()
        };
        assert!(settings.category().is_err());
    }
}
