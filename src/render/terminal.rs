//! `TerminalRenderer`: paints a screen's visible window with crossterm.

use std::borrow::Cow;
use std::io::Write;

use crossbeam_channel::Receiver;
use crossterm::{
    cursor, queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use super::{visible_range, BlinkTicker, FrameBuffer, RendererConfig, Tick};
use crate::error::Result;
use crate::screen::wrap::byte_offset;
use crate::screen::{Line, Screen, ScreenEvent, PROMPT_WIDTH};

/// Render statistics for debugging/profiling.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderStats {
    /// Total frames rendered.
    pub frames: u64,
    /// Total bytes written to the output.
    pub bytes_written: u64,
}

/// Draws a [`Screen`] to any writer.
///
/// Feed it the screen's notifications with [`handle_event`](Self::handle_event)
/// (or [`sync`](Self::sync)) and it keeps the blink ticker in step with
/// `ShowCursor`; call [`render`](Self::render) to repaint.
pub struct TerminalRenderer<W: Write> {
    out: W,
    frame: FrameBuffer,
    config: RendererConfig,
    /// Prompt glyph fitted to the placeholder width.
    glyph: String,
    blink: Option<BlinkTicker>,
    cursor_on: bool,
    stats: RenderStats,
}

impl<W: Write> std::fmt::Debug for TerminalRenderer<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalRenderer")
            .field("config", &self.config)
            .field("blinking", &self.blink.is_some())
            .field("cursor_on", &self.cursor_on)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<W: Write> TerminalRenderer<W> {
    /// Create a renderer writing to `out`.
    pub fn new(out: W, config: RendererConfig) -> Self {
        let glyph = fit_to_width(&config.prompt_glyph, PROMPT_WIDTH);
        Self {
            out,
            frame: FrameBuffer::new(),
            config,
            glyph,
            blink: None,
            cursor_on: true,
            stats: RenderStats::default(),
        }
    }

    /// Renderer configuration.
    pub const fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Render statistics.
    pub const fn stats(&self) -> &RenderStats {
        &self.stats
    }

    /// Whether the cursor is currently drawn.
    pub const fn cursor_on(&self) -> bool {
        self.cursor_on
    }

    /// Whether the blink ticker is running.
    pub const fn is_blinking(&self) -> bool {
        self.blink.is_some()
    }

    /// Tick receiver while blinking, for use with `select!`.
    pub fn blink_receiver(&self) -> Option<&Receiver<Tick>> {
        self.blink.as_ref().map(BlinkTicker::receiver)
    }

    /// The underlying writer.
    pub const fn get_ref(&self) -> &W {
        &self.out
    }

    /// Consume the renderer, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// React to a screen notification.
    ///
    /// `ShowCursor(true)` starts the blink ticker, `ShowCursor(false)` stops
    /// it and leaves the cursor steadily drawn.
    pub fn handle_event(&mut self, event: &ScreenEvent) -> Result<()> {
        match event {
            ScreenEvent::ShowCursor(true) => self.start_blink()?,
            ScreenEvent::ShowCursor(false) => self.stop_blink(),
            _ => {}
        }
        Ok(())
    }

    fn start_blink(&mut self) -> Result<()> {
        if self.blink.is_none() {
            self.blink = Some(BlinkTicker::spawn(self.config.blink_interval)?);
        }
        self.cursor_on = true;
        Ok(())
    }

    fn stop_blink(&mut self) {
        if let Some(ticker) = self.blink.take() {
            ticker.join();
        }
        self.cursor_on = true;
    }

    /// Flip cursor visibility.
    pub fn toggle_cursor(&mut self) {
        self.cursor_on = !self.cursor_on;
    }

    /// Apply the latest blink tick, if any. Returns `true` if visibility changed.
    pub fn poll_blink(&mut self) -> bool {
        let Some(tick) = self.blink.as_ref().and_then(BlinkTicker::latest) else {
            return false;
        };
        if tick.visible == self.cursor_on {
            return false;
        }
        self.cursor_on = tick.visible;
        true
    }

    /// Drain pending notifications and blink ticks, repainting if anything
    /// happened. Returns whether a frame was drawn.
    pub fn sync(&mut self, events: &Receiver<ScreenEvent>, screen: &Screen) -> Result<bool> {
        let mut dirty = false;
        for event in events.try_iter() {
            self.handle_event(&event)?;
            dirty = true;
        }
        dirty |= self.poll_blink();
        if dirty {
            self.render(screen)?;
        }
        Ok(dirty)
    }

    /// Paint the visible window and cursor in a single write.
    pub fn render(&mut self, screen: &Screen) -> Result<()> {
        let cols = screen.config().cols;
        let rows = screen.config().rows;
        let lines = screen.lines();
        let window = visible_range(lines.len(), rows, screen.cursor().y());

        self.frame.clear();
        queue!(self.frame, cursor::Hide)?;

        let mut visible = lines.range(window.start, window.end);
        for row in 0..rows {
            queue!(
                self.frame,
                cursor::MoveTo(0, to_u16(row)),
                Clear(ClearType::CurrentLine)
            )?;
            if let Some(line) = visible.next() {
                let text = self.display_text(line);
                queue!(self.frame, Print(clip(&text, cols)))?;
            }
        }

        if self.cursor_on {
            if let Some((x, y)) = cursor_cell(screen, window.start) {
                queue!(self.frame, cursor::MoveTo(x, y), cursor::Show)?;
            }
        }

        self.frame.flush_to(&mut self.out)?;
        self.stats.frames += 1;
        self.stats.bytes_written += self.frame.len() as u64;
        tracing::trace!(
            top = window.start,
            bytes = self.frame.len(),
            "frame rendered"
        );
        Ok(())
    }

    /// Line text as drawn: prompt lines get the glyph over the placeholder.
    fn display_text<'a>(&self, line: &'a Line) -> Cow<'a, str> {
        if line.is_prompt() {
            let rest = &line.content[byte_offset(&line.content, PROMPT_WIDTH)..];
            Cow::Owned(format!("{}{rest}", self.glyph))
        } else {
            Cow::Borrowed(&line.content)
        }
    }
}

#[inline]
fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Terminal cell of the cursor, if it lies inside the window.
fn cursor_cell(screen: &Screen, top: usize) -> Option<(u16, u16)> {
    let pos = screen.cursor().position();
    let x = usize::try_from(pos.x).ok()?;
    let y = usize::try_from(pos.y).ok()?;
    let row = y.checked_sub(top)?;
    if row >= screen.config().rows {
        return None;
    }
    let col = screen
        .lines()
        .get(y)
        .map_or(x, |line| display_column(&line.content, x));
    Some((to_u16(col.min(screen.config().cols)), to_u16(row)))
}

/// Display column of character index `x`. Past the end, each missing
/// character counts as one padding cell.
fn display_column(text: &str, x: usize) -> usize {
    let mut width = 0;
    let mut seen = 0;
    for grapheme in text.graphemes(true).take(x) {
        width += grapheme.width();
        seen += 1;
    }
    width + (x - seen)
}

/// Longest prefix of `text` that fits in `cols` display columns.
fn clip(text: &str, cols: usize) -> &str {
    let mut width = 0;
    for (offset, grapheme) in text.grapheme_indices(true) {
        width += grapheme.width();
        if width > cols {
            return &text[..offset];
        }
    }
    text
}

/// `text` clipped and space-padded to exactly `cols` display columns.
fn fit_to_width(text: &str, cols: usize) -> String {
    let mut fitted = clip(text, cols).to_string();
    let width = fitted.width();
    fitted.extend(std::iter::repeat(' ').take(cols.saturating_sub(width)));
    fitted
}
