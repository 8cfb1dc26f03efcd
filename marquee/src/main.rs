use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::FmtSubscriber;

use marquee::config::{Cli, Settings};
use marquee::display::{DynPanel, FrameCanvas, NullPanel, TerminalPanel};
use marquee::error::MarqueeError;
use marquee::pipeline::{snapshot_channel, DemandSignal};
use marquee::producer::SnapshotProducer;
use marquee::renderer::MarqueeRenderer;
use quotefeed::{DynMarketData, QuoteClient};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), MarqueeError> {
    let subscriber = FmtSubscriber::builder().with_target(false).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let cli = Cli::parse();
    let settings = Settings::load(&cli)?;
    let category = settings.category()?;

    tracing::info!(
        %category,
        rows = settings.rows,
        cols = settings.cols,
        panel = %settings.panel,
        "starting marquee"
    );

    let source: DynMarketData = Arc::new(QuoteClient::new(
        settings.cache_ttl(),
        settings.quota_window(),
        settings.quota_limit,
        settings.request_timeout(),
    )?);

    let panel: DynPanel = match settings.panel.as_str() {
        "null" => Arc::new(NullPanel::new()),
        _ => Arc::new(TerminalPanel::new(settings.brightness)),
    };
    let canvas = FrameCanvas::new(settings.cols, settings.rows);

    let demand = DemandSignal::new();
    let (items_tx, items_rx) = snapshot_channel(settings.channel_capacity);

    let producer = SnapshotProducer::new(source, category, items_tx, demand.clone(), &settings);
    let renderer = MarqueeRenderer::new(items_rx, demand, canvas, panel, &settings);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let mut producer_task = tokio::spawn(producer.run(shutdown_rx.clone()));
    let mut renderer_task = tokio::spawn(renderer.run(shutdown_rx));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received; shutting down…");
            let _ = shutdown_tx.send(true);
            let _ = producer_task.await;
            let _ = renderer_task.await;
        }
        res = &mut producer_task => {
            settle("producer", res)?;
        }
        res = &mut renderer_task => {
            settle("renderer", res)?;
        }
    }

    tracing::info!("marquee stopped");
    Ok(())
}

/// Either task finishing on its own ends the process; a task error or
/// panic is fatal (there is no supervisor to restart it).
fn settle(
    task: &str,
    result: Result<Result<(), MarqueeError>, tokio::task::JoinError>,
) -> Result<(), MarqueeError> {
    match result {
        Ok(Ok(())) => {
            tracing::info!(task, "task exited");
            Ok(())
        }
        Ok(Err(e)) => {
            tracing::error!(task, error = %e, "task failed");
            Err(e)
        }
        Err(e) => {
            tracing::error!(task, error = %e, "task panicked");
            Err(MarqueeError::Join(e))
        }
    }
}
