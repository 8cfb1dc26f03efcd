//! Scrolling market-ticker marquee daemon.
//!
//! Two long-running tasks cooperate over two shared primitives: the
//! [`producer::SnapshotProducer`] waits for demand, fetches a listing batch
//! and streams snapshots into the channel; the [`renderer::MarqueeRenderer`]
//! drains the channel, raising the [`pipeline::DemandSignal`] whenever it
//! runs dry, and scrolls each snapshot across the panel.

pub mod config;
pub mod display;
pub mod error;
pub mod pipeline;
pub mod producer;
pub mod renderer;
