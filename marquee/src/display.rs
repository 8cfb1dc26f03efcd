use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use embedded_graphics::mono_font::ascii::{FONT_4X6, FONT_6X13_BOLD};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::MarqueeError;

/// Header line font (6x13 bold).
pub const HEADER_FONT: &MonoFont<'static> = &FONT_6X13_BOLD;
/// Long-name line font (4x6).
pub const NAME_FONT: &MonoFont<'static> = &FONT_4X6;
/// Price/change line font (4x6).
pub const VALUE_FONT: &MonoFont<'static> = &FONT_4X6;

/// Off-screen RGB framebuffer the renderer draws each frame into.
///
/// Drawing clips silently at the edges, so text may start or end outside
/// the visible area while scrolling.
#[derive(Debug, Clone)]
pub struct FrameCanvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgb888>,
}

impl FrameCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb888::BLACK; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resets every pixel to black.
    pub fn clear_frame(&mut self) {
        self.pixels.fill(Rgb888::BLACK);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb888> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Draws one text run with its baseline at `(x, y)` and returns the
    /// advance width of the run.
    pub fn draw_text(
        &mut self,
        text: &str,
        x: i32,
        y: i32,
        font: &MonoFont<'static>,
        color: Rgb888,
    ) -> i32 {
        let style = MonoTextStyle::new(font, color);
        let end = match Text::new(text, Point::new(x, y), style).draw(self) {
            Ok(point) => point,
            Err(never) => match never {},
        };
        end.x - x
    }
}

impl OriginDimensions for FrameCanvas {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for FrameCanvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Rgb888>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0
                && point.y >= 0
                && (point.x as u32) < self.width
                && (point.y as u32) < self.height
            {
                self.pixels[(point.y as u32 * self.width + point.x as u32) as usize] = color;
            }
        }
        Ok(())
    }
}

/// Output seam for completed frames: the visible half of the
/// double-buffered surface.
#[async_trait]
pub trait Panel: Send + Sync {
    /// Pushes a finished frame to the visible surface.
    async fn present(&self, frame: &FrameCanvas) -> Result<(), MarqueeError>;
}

pub type DynPanel = Arc<dyn Panel>;

/// Renders frames as ANSI half-blocks on stdout; the development stand-in
/// for a hardware matrix.
pub struct TerminalPanel {
    stdout: Mutex<tokio::io::Stdout>,
    brightness: u8,
}

impl TerminalPanel {
    pub fn new(brightness: u8) -> Self {
        Self {
            stdout: Mutex::new(tokio::io::stdout()),
            brightness: brightness.min(100),
        }
    }

    fn scaled(&self, color: Rgb888) -> (u8, u8, u8) {
        let level = u16::from(self.brightness);
        let scale = |channel: u8| (u16::from(channel) * level / 100) as u8;
        (scale(color.r()), scale(color.g()), scale(color.b()))
    }
}

#[async_trait]
impl Panel for TerminalPanel {
    async fn present(&self, frame: &FrameCanvas) -> Result<(), MarqueeError> {
        // One "▀" covers two pixel rows: foreground is the upper pixel,
        // background the lower one.
        let mut out = String::with_capacity((frame.width() * frame.height() * 20) as usize);
        out.push_str("\x1b[H");
        for y in (0..frame.height()).step_by(2) {
            for x in 0..frame.width() {
                let (tr, tg, tb) = self.scaled(frame.pixel(x, y).unwrap_or(Rgb888::BLACK));
                let (br, bg, bb) = self.scaled(frame.pixel(x, y + 1).unwrap_or(Rgb888::BLACK));
                out.push_str(&format!(
                    "\x1b[38;2;{tr};{tg};{tb}m\x1b[48;2;{br};{bg};{bb}m\u{2580}"
                ));
            }
            out.push_str("\x1b[0m\n");
        }

        let mut stdout = self.stdout.lock().await;
        stdout.write_all(out.as_bytes()).await?;
        stdout.flush().await?;
        Ok(())
    }
}

/// Discards frames, counting them. Deterministic surface for tests.
#[derive(Debug, Default)]
pub struct NullPanel {
    frames: AtomicU64,
}

impl NullPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Panel for NullPanel {
    async fn present(&self, _frame: &FrameCanvas) -> Result<(), MarqueeError> {
        self.frames.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
