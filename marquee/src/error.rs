use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarqueeError {
    #[error(transparent)]
    Feed(#[from] quotefeed::FeedError),
    #[error(transparent)]
    Config(#[from] ::config::ConfigError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("task join failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("snapshot channel closed")]
    ChannelClosed,
}
