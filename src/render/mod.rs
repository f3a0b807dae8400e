//! Reference terminal renderer.
//!
//! The screen itself never draws. This module reads its state after each
//! notification and paints the visible window onto a terminal:
//!
//! - [`FrameBuffer`]: one write per frame
//! - [`BlinkTicker`]: cursor blink pacing, driven by `ShowCursor`
//! - [`TerminalRenderer`]: viewport selection, prompt glyph, clipping

pub mod blink;
pub mod output;
pub mod terminal;

pub use blink::{BlinkTicker, Tick};
pub use output::FrameBuffer;
pub use terminal::{RenderStats, TerminalRenderer};

use std::ops::Range;
use std::time::Duration;

/// Configuration for the [`TerminalRenderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererConfig {
    /// Time between cursor visibility toggles while blinking.
    pub blink_interval: Duration,
    /// Drawn over the prompt placeholder, fitted to its width.
    pub prompt_glyph: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            blink_interval: Duration::from_millis(530),
            prompt_glyph: "> ".to_string(),
        }
    }
}

/// Indices of the lines to show in a viewport of `rows` lines.
///
/// Anchored to the bottom of the buffer, unless the cursor sits above
/// that window, in which case the window starts at the cursor's line.
pub fn visible_range(total: usize, rows: usize, cursor_y: i32) -> Range<usize> {
    let start = total.saturating_sub(rows);
    match usize::try_from(cursor_y) {
        Ok(y) if y < start => y..(y + rows).min(total),
        _ => start..total,
    }
}
