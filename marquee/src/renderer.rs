use std::time::Duration;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::RgbColor;
use tokio::sync::watch;

use quotefeed::StockSnapshot;

use crate::config::Settings;
use crate::display::{DynPanel, FrameCanvas, HEADER_FONT, NAME_FONT, VALUE_FONT};
use crate::error::MarqueeError;
use crate::pipeline::{DemandSignal, SnapshotReceiver};

// Baselines of the three marquee lines.
const HEADER_BASELINE: i32 = 13;
const NAME_BASELINE: i32 = 20;
const VALUE_BASELINE: i32 = 30;

/// Drains the snapshot channel and scrolls each snapshot across the panel,
/// raising the demand signal whenever the channel runs dry.
pub struct MarqueeRenderer {
    items: SnapshotReceiver,
    demand: DemandSignal,
    canvas: FrameCanvas,
    panel: DynPanel,
    frame_delay: Duration,
    item_delay: Duration,
    min_offset: i32,
}

impl MarqueeRenderer {
    pub fn new(
        items: SnapshotReceiver,
        demand: DemandSignal,
        canvas: FrameCanvas,
        panel: DynPanel,
        cfg: &Settings,
    ) -> Self {
        Self {
            items,
            demand,
            canvas,
            panel,
            frame_delay: cfg.frame_delay(),
            item_delay: cfg.item_delay(),
            min_offset: cfg.min_scroll_offset,
        }
    }

    /// Runs until shutdown. A closed channel or a failing panel is fatal.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<(), MarqueeError> {
        let mut shown: u64 = 0;
        loop {
            if self.items.is_empty() {
                self.demand.raise();
            }

            let snapshot = tokio::select! {
                item = self.items.recv() => item.ok_or(MarqueeError::ChannelClosed)?,
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            };
            self.demand.lower();

            tracing::info!(shown, symbol = %snapshot.symbol, "displaying snapshot");
            self.animate(&snapshot).await?;
            shown += 1;

            tokio::select! {
                _ = tokio::time::sleep(self.item_delay) => {}
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!("renderer stopped");
        Ok(())
    }

    /// Scrolls the snapshot's three lines right-to-left, one pixel column
    /// per frame. Every snapshot starts at the right edge; the scroll ends
    /// early once the widest line has cleared the left edge.
    async fn animate(&mut self, snapshot: &StockSnapshot) -> Result<(), MarqueeError> {
        let header = header_line(snapshot);
        let value = value_line(snapshot);
        let value_color = change_color(snapshot.change_percent);

        let mut offset = self.canvas.width() as i32;
        while offset > self.min_offset {
            self.canvas.clear_frame();
            let header_width =
                self.canvas
                    .draw_text(&header, offset, HEADER_BASELINE, HEADER_FONT, Rgb888::BLUE);
            let name_width = self.canvas.draw_text(
                &snapshot.long_name,
                offset,
                NAME_BASELINE,
                NAME_FONT,
                Rgb888::BLUE,
            );
            let value_width =
                self.canvas
                    .draw_text(&value, offset, VALUE_BASELINE, VALUE_FONT, value_color);
            self.panel.present(&self.canvas).await?;
            tokio::time::sleep(self.frame_delay).await;

            let widest = header_width.max(name_width).max(value_width);
            if offset + widest < 0 {
                break;
            }
            offset -= 1;
        }
        Ok(())
    }
}

/// Green for flat or rising, red for falling.
fn change_color(change_percent: f64) -> Rgb888 {
    if change_percent < 0.0 {
        Rgb888::RED
    } else {
        Rgb888::GREEN
    }
}

/// `SYMBOL (CUR)`, or the bare symbol when the source gave no currency.
fn header_line(snapshot: &StockSnapshot) -> String {
    match &snapshot.currency {
        Some(currency) => format!("{} ({})", snapshot.symbol, currency.to_uppercase()),
        None => snapshot.symbol.clone(),
    }
}

fn value_line(snapshot: &StockSnapshot) -> String {
    format!(
        "{:<8.3} {:+.2}%",
        snapshot.last_price, snapshot.change_percent
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::NullPanel;
    use crate::pipeline::snapshot_channel;
    use std::sync::Arc;

    fn snapshot(change_percent: f64, currency: Option<&str>) -> StockSnapshot {
        StockSnapshot {
            symbol: "COM".into(),
            long_name: "Compleo Charging Solutions AG".into(),
            last_price: 12.5,
            month_high: 14.0,
            month_low: 9.0,
            change_percent,
            currency: currency.map(str::to_string),
        }
    }

    #[test]
    fn negative_change_renders_red_zero_and_up_render_green() {
        assert_eq!(change_color(-1.5), Rgb888::RED);
        assert_eq!(change_color(0.0), Rgb888::GREEN);
        assert_eq!(change_color(3.2), Rgb888::GREEN);
    }

    #[test]
    fn header_includes_uppercased_currency_when_present() {
        assert_eq!(header_line(&snapshot(0.0, Some("eur"))), "COM (EUR)");
        assert_eq!(header_line(&snapshot(0.0, None)), "COM");
    }

    #[test]
    fn value_line_pads_price_and_signs_the_change() {
        assert_eq!(value_line(&snapshot(1.234, None)), "12.500   +1.23%");
        assert_eq!(value_line(&snapshot(-1.5, None)), "12.500   -1.50%");
    }

    #[tokio::test]
    async fn animate_presents_frames_and_exits_early() {
        let (_tx, items) = snapshot_channel(None);
        let panel = Arc::new(NullPanel::new());
        let cfg = Settings {
            frame_delay_ms: 0,
            item_delay_ms: 0,
            min_scroll_offset: -500,
            ..Settings::default()
        };
        let canvas = FrameCanvas::new(16, 32);
        let mut renderer = MarqueeRenderer::new(
            items,
            DemandSignal::new(),
            canvas,
            panel.clone(),
            &cfg,
        );

        renderer.animate(&snapshot(1.0, Some("usd"))).await.unwrap();

        let frames = panel.frames_presented();
        assert!(frames > 0);
        // The longest line is far narrower than 500 columns, so the scroll
        // must stop well before the configured floor.
        assert!(frames < (16 + 500) as u64);
    }
}
