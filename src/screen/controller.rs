//! Screen controller: drives the text buffer and cursor.
//!
//! Every operation runs to completion before returning. Buffer and cursor
//! mutations are announced on the [`EventBus`] as they happen, followed by
//! the operation's `Prompt`/`ShowCursor` pair where one applies.
//!
//! # Example
//!
//! ```rust
//! use teletype::{Screen, ScreenConfig};
//!
//! let mut screen = Screen::new(ScreenConfig::new(10, 4)).unwrap();
//! screen.write("hello").unwrap();
//! screen.write(" brave world").unwrap();
//!
//! let lines: Vec<_> = screen.lines().iter().map(|l| l.content.as_str()).collect();
//! assert_eq!(lines, ["hello", "brave", "world"]);
//! assert_eq!((screen.cursor().x(), screen.cursor().y()), (5, 2));
//! ```

use crossbeam_channel::Receiver;
use unicode_segmentation::UnicodeSegmentation;

use super::cursor::{Cursor, CursorChange, Position};
use super::events::{EventBus, EventMask, ScreenEvent};
use super::module::{CapabilityTable, Module};
use super::text_buffer::{Line, LineKind, TextBuffer};
use super::wrap::{byte_offset, char_len, wrap};
use crate::config::ScreenConfig;
use crate::error::{Result, ScreenError};

/// Width of the prompt placeholder in characters.
pub const PROMPT_WIDTH: usize = 3;

/// Content of a fresh prompt line. The renderer draws the glyph over it.
pub const PROMPT_PLACEHOLDER: &str = "   ";

#[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
const PROMPT_X: i32 = PROMPT_WIDTH as i32;

#[inline]
fn to_coord(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// Negative coordinates address nothing; treat them as 0.
#[inline]
fn to_index(c: i32) -> usize {
    usize::try_from(c).unwrap_or(0)
}

/// Builder for a [`Screen`] with listeners and modules attached up front.
pub struct ScreenBuilder {
    config: ScreenConfig,
    events: EventBus,
    modules: Vec<Box<dyn Module>>,
}

impl ScreenBuilder {
    /// Start building a screen with the given configuration.
    pub fn new(config: ScreenConfig) -> Self {
        Self {
            config,
            events: EventBus::new(),
            modules: Vec::new(),
        }
    }

    /// Attach a synchronous listener. It will see the `Ready` event.
    #[must_use]
    pub fn listener(
        mut self,
        mask: EventMask,
        listener: impl FnMut(&mut Screen, &ScreenEvent) + 'static,
    ) -> Self {
        self.events.listen(mask, listener);
        self
    }

    /// Attach a module. Modules register in the order they are added.
    #[must_use]
    pub fn module(mut self, module: impl Module + 'static) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    /// Validate the configuration, compose modules and emit `Ready`.
    pub fn build(self) -> Result<Screen> {
        self.config.validate()?;

        let mut screen = Screen {
            config: self.config,
            lines: TextBuffer::new(),
            cursor: Cursor::new(),
            events: self.events,
            capabilities: CapabilityTable::new(),
            modules: Vec::with_capacity(self.modules.len()),
        };

        for mut module in self.modules {
            let name = module.name().to_owned();
            for (op, operation) in module.operations() {
                screen.capabilities.register(&name, op, operation);
            }
            module.init(&screen);
            screen.modules.push(module);
        }

        tracing::debug!(
            cols = screen.config.cols,
            rows = screen.config.rows,
            modules = screen.modules.len(),
            "screen ready"
        );
        screen.emit(ScreenEvent::Ready);
        Ok(screen)
    }
}

/// A fixed-width, scrolling surface of text lines with a cursor.
pub struct Screen {
    config: ScreenConfig,
    lines: TextBuffer,
    cursor: Cursor,
    events: EventBus,
    capabilities: CapabilityTable,
    modules: Vec<Box<dyn Module>>,
}

impl std::fmt::Debug for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screen")
            .field("config", &self.config)
            .field("lines", &self.lines.len())
            .field("cursor", &self.cursor.position())
            .field("events", &self.events)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

impl Screen {
    /// Create a screen with no listeners or modules.
    pub fn new(config: ScreenConfig) -> Result<Self> {
        ScreenBuilder::new(config).build()
    }

    /// Start building a screen.
    pub fn builder(config: ScreenConfig) -> ScreenBuilder {
        ScreenBuilder::new(config)
    }

    /// The configuration this screen was built with.
    pub const fn config(&self) -> &ScreenConfig {
        &self.config
    }

    /// The cursor.
    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// All lines, top to bottom.
    pub const fn lines(&self) -> &TextBuffer {
        &self.lines
    }

    /// A line by index.
    pub fn line(&self, index: usize) -> Result<&Line> {
        self.lines.get(index)
    }

    /// The line under the cursor, if the cursor is on one.
    pub fn current_line(&self) -> Option<&Line> {
        if self.cursor.is_unset() {
            return None;
        }
        self.lines.get(to_index(self.cursor.y())).ok()
    }

    /// True while the cursor sits on a prompt line.
    pub fn is_prompting(&self) -> bool {
        self.current_line().is_some_and(Line::is_prompt)
    }

    /// Attach a synchronous listener after construction.
    ///
    /// Listeners may call back into the screen. Events raised by such a
    /// nested call are delivered after the current event has reached every
    /// listener, still before the outermost operation returns.
    pub fn listen(
        &mut self,
        mask: EventMask,
        listener: impl FnMut(&mut Screen, &ScreenEvent) + 'static,
    ) {
        self.events.listen(mask, listener);
    }

    /// Open a channel receiving events that match `mask`.
    pub fn subscribe(&mut self, mask: EventMask) -> Receiver<ScreenEvent> {
        self.events.subscribe(mask)
    }

    /// Capabilities registered by modules.
    pub const fn capabilities(&self) -> &CapabilityTable {
        &self.capabilities
    }

    /// Names of attached modules, in registration order.
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|m| m.name())
    }

    /// Run a module-provided operation.
    pub fn invoke(&mut self, name: &str, arg: &str) -> Result<()> {
        let operation = self
            .capabilities
            .get(name)
            .ok_or_else(|| ScreenError::UnknownCapability(name.to_owned()))?;
        tracing::trace!(name, "invoking capability");
        operation(self, arg)
    }

    // ---------------------------------------------------------------------
    // Operations
    // ---------------------------------------------------------------------

    /// Insert `text` at the cursor, reflowing the line if it overflows.
    pub fn write(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.bootstrap();

        let row = to_index(self.cursor.y());
        while self.lines.len() <= row {
            self.push_line(Line::empty());
        }

        let line = self.lines.get(row)?;
        let kind = line.kind;
        let mut content = line.content.clone();

        let col = to_index(self.cursor.x());
        let len = char_len(&content);
        if col > len {
            content.extend(std::iter::repeat(' ').take(col - len));
        }

        let at = byte_offset(&content, col);
        let trailing = char_len(&content[at..]);
        content.insert_str(at, text);
        self.set_x(self.cursor.x().saturating_add(to_coord(char_len(text))));

        if char_len(&content) <= self.config.cols {
            self.replace_line(row, content)?;
        } else {
            self.reflow(row, kind, &content, trailing)?;
        }

        self.emit_prompt(false);
        Ok(())
    }

    /// Replace line `row` with `content` wrapped to the column width.
    ///
    /// The cursor ends on the last wrapped line, `trailing` characters
    /// before its end (clamped to column 0).
    fn reflow(&mut self, row: usize, kind: LineKind, content: &str, trailing: usize) -> Result<()> {
        let segments = wrap(content, self.config.cols);
        tracing::debug!(row, segments = segments.len(), trailing, "reflowing line");

        self.remove_line(row)?;
        for (i, segment) in segments.into_iter().enumerate() {
            let x = to_coord(char_len(&segment))
                .saturating_sub(to_coord(trailing))
                .max(0);
            let line = if i == 0 && kind == LineKind::Prompt {
                Line::prompt(segment)
            } else {
                Line::new(segment)
            };
            self.insert_line(row + i, line)?;
            self.set_y(self.cursor.y().saturating_add(1));
            self.set_x(x);
        }
        self.set_y(self.cursor.y() - 1);
        Ok(())
    }

    /// Write the first character of `text`, starting a new line first if
    /// the cursor is already at the column limit.
    pub fn write_char(&mut self, text: &str) -> Result<()> {
        let Some(ch) = text.graphemes(true).next() else {
            return Ok(());
        };
        self.bootstrap();

        if to_index(self.cursor.x()) >= self.config.cols {
            self.set_x(0);
            self.set_y(self.cursor.y().saturating_add(1));
        }

        self.write(ch)?;
        self.emit_prompt(false);
        Ok(())
    }

    /// Append `text` as new line(s) at the bottom, wrapped to the column width.
    ///
    /// Empty text appends one empty line.
    pub fn writeln(&mut self, text: &str) {
        if text.is_empty() {
            let index = self.push_line(Line::empty());
            self.set_x(0);
            self.set_y(to_coord(index));
        } else {
            for segment in wrap(text, self.config.cols) {
                let x = to_coord(char_len(&segment));
                self.push_line(Line::new(segment));
                self.set_x(x);
            }
            if let Some(last) = self.lines.last_index() {
                self.set_y(to_coord(last));
            }
        }
        self.emit_prompt(false);
    }

    /// Append a prompt line and park the cursor after its placeholder.
    pub fn prompt(&mut self) {
        let index = self.push_line(Line::prompt(PROMPT_PLACEHOLDER));
        self.set_y(to_coord(index));
        self.set_x(PROMPT_X);
        self.emit_prompt(true);
    }

    /// Move the cursor. Accepts a [`Position`] or an `(x, y)` pair.
    ///
    /// No bounds checking: the next write pads or creates lines as needed.
    pub fn set_cursor(&mut self, position: impl Into<Position>) {
        let change = self.cursor.set_position(position);
        self.emit_cursor(change);
    }

    /// Backward delete.
    ///
    /// At column 0 the cursor moves to the end of the previous line without
    /// deleting anything. Otherwise the last character of the line is
    /// removed. A prompt placeholder is never erased from its own end.
    pub fn del(&mut self) -> Result<()> {
        if self.cursor.is_unset() {
            return Ok(());
        }
        let x = self.cursor.x();
        let row = to_index(self.cursor.y());

        let (is_prompt, content) = match self.lines.get(row) {
            Ok(line) => (line.is_prompt(), Some(line.content.clone())),
            Err(_) => (false, None),
        };

        if is_prompt && x == PROMPT_X {
            return Ok(());
        }

        if x == 0 {
            if row == 0 {
                return Ok(());
            }
            if let Ok(prev) = self.lines.get(row - 1) {
                let end = to_coord(prev.len());
                self.set_y(to_coord(row - 1));
                self.set_x(end);
            }
            return Ok(());
        }

        if let Some(mut content) = content {
            if let Some((last, _)) = content.grapheme_indices(true).next_back() {
                content.truncate(last);
                self.replace_line(row, content)?;
            }
        }
        self.set_x(x - 1);
        Ok(())
    }

    /// Remove the line at `index`, or the last line when `index` is `None`
    /// or past the end.
    pub fn deleteln(&mut self, index: Option<usize>) -> Result<()> {
        let Some(last) = self.lines.last_index() else {
            return Ok(());
        };
        let index = index.filter(|&i| i <= last).unwrap_or(last);
        self.remove_line(index)?;
        tracing::debug!(index, remaining = self.lines.len(), "line deleted");

        match self.lines.last_index() {
            None => {
                let change = self.cursor.reset();
                self.emit_cursor(change);
            }
            Some(last) if self.cursor.y() > to_coord(last) => self.set_y(to_coord(last)),
            Some(_) => {}
        }
        Ok(())
    }

    /// Remove every line and return the cursor to the sentinel.
    pub fn clear(&mut self) {
        tracing::debug!(lines = self.lines.len(), "clearing screen");
        self.lines.clear();
        self.emit(ScreenEvent::Cleared);
        let change = self.cursor.reset();
        self.emit_cursor(change);
    }

    // ---------------------------------------------------------------------
    // Bookkeeping: every buffer/cursor mutation goes through these so the
    // matching notification is never missed.
    // ---------------------------------------------------------------------

    /// Deliver an event to subscribers and listeners.
    fn emit(&mut self, event: ScreenEvent) {
        if !self.events.enqueue(event) {
            return;
        }
        while let Some(event) = self.events.next_event() {
            let kind = event.kind();
            let mut listeners = self.events.take_listeners();
            for (mask, listener) in &mut listeners {
                if mask.intersects(kind) {
                    listener(self, &event);
                }
            }
            self.events.restore_listeners(listeners);
        }
    }

    /// Emit `ChangeX`/`ChangeY` for the axes in `change`.
    fn emit_cursor(&mut self, change: CursorChange) {
        if change.contains(CursorChange::X) {
            self.emit(ScreenEvent::ChangeX);
        }
        if change.contains(CursorChange::Y) {
            self.emit(ScreenEvent::ChangeY);
        }
    }

    /// Emit `Prompt(active)` followed by the derived `ShowCursor(active)`.
    fn emit_prompt(&mut self, active: bool) {
        self.emit(ScreenEvent::Prompt(active));
        self.emit(ScreenEvent::ShowCursor(active));
    }

    /// Give an unset cursor a home, creating the first line if needed.
    fn bootstrap(&mut self) {
        if !self.cursor.is_unset() {
            return;
        }
        if self.lines.is_empty() {
            self.push_line(Line::empty());
        }
        let change = self.cursor.set_position((0, 0));
        self.emit_cursor(change);
    }

    fn set_x(&mut self, x: i32) {
        let change = self.cursor.set_x(x);
        self.emit_cursor(change);
    }

    fn set_y(&mut self, y: i32) {
        let change = self.cursor.set_y(y);
        self.emit_cursor(change);
    }

    fn push_line(&mut self, line: Line) -> usize {
        let index = self.lines.push_line(line);
        self.emit(ScreenEvent::LineInserted(index));
        index
    }

    fn insert_line(&mut self, index: usize, line: Line) -> Result<()> {
        self.lines.insert_line(index, line)?;
        self.emit(ScreenEvent::LineInserted(index));
        Ok(())
    }

    fn replace_line(&mut self, index: usize, content: String) -> Result<()> {
        self.lines.replace_line(index, content)?;
        self.emit(ScreenEvent::LineReplaced(index));
        Ok(())
    }

    fn remove_line(&mut self, index: usize) -> Result<Line> {
        let line = self.lines.remove_line(index)?;
        self.emit(ScreenEvent::LineRemoved(index));
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::module::{Operation, Typewriter};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn screen(cols: usize) -> Screen {
        Screen::new(ScreenConfig::new(cols, 24)).unwrap()
    }

    fn texts(screen: &Screen) -> Vec<&str> {
        screen.lines().iter().map(|l| l.content.as_str()).collect()
    }

    fn pos(screen: &Screen) -> (i32, i32) {
        (screen.cursor().x(), screen.cursor().y())
    }

    fn recorder(screen: &mut Screen, mask: EventMask) -> Rc<RefCell<Vec<ScreenEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        screen.listen(mask, move |_, e| sink.borrow_mut().push(*e));
        seen
    }

    #[test]
    fn test_new_screen_is_empty() {
        let s = screen(80);
        assert!(s.lines().is_empty());
        assert_eq!(s.cursor().position(), Position::UNSET);
        assert!(s.current_line().is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = Screen::new(ScreenConfig::new(0, 24));
        assert!(matches!(result, Err(ScreenError::InvalidConfig(_))));
    }

    #[test]
    fn test_ready_emitted_once() {
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        let mut s = Screen::builder(ScreenConfig::default())
            .listener(EventMask::READY, move |_, _| seen.set(seen.get() + 1))
            .build()
            .unwrap();
        s.write("hi").unwrap();
        s.prompt();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_write_on_empty_buffer() {
        let mut s = screen(80);
        s.write("hi").unwrap();
        assert_eq!(texts(&s), vec!["hi"]);
        assert_eq!(pos(&s), (2, 0));
    }

    #[test]
    fn test_write_empty_is_noop() {
        let mut s = screen(80);
        let events = recorder(&mut s, EventMask::ALL);
        s.write("").unwrap();
        assert!(s.lines().is_empty());
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_write_pads_past_line_end() {
        let mut s = screen(80);
        s.write("ab").unwrap();
        s.set_cursor((5, 0));
        s.write("x").unwrap();
        assert_eq!(texts(&s), vec!["ab   x"]);
        assert_eq!(pos(&s), (6, 0));
    }

    #[test]
    fn test_write_inserts_mid_line() {
        let mut s = screen(80);
        s.write("held").unwrap();
        s.set_cursor((2, 0));
        s.write("llo wor").unwrap();
        assert_eq!(texts(&s), vec!["hello world"]);
        assert_eq!(pos(&s), (9, 0));
    }

    #[test]
    fn test_write_creates_lines_down_to_cursor() {
        let mut s = screen(80);
        s.write("top").unwrap();
        s.set_cursor((1, 3));
        s.write("z").unwrap();
        assert_eq!(texts(&s), vec!["top", "", "", " z"]);
        assert_eq!(pos(&s), (2, 3));
    }

    #[test]
    fn test_write_reflows_on_overflow() {
        let mut s = screen(10);
        s.write("hello").unwrap();
        s.write(" brave world").unwrap();
        assert_eq!(texts(&s), vec!["hello", "brave", "world"]);
        assert_eq!(pos(&s), (5, 2));
    }

    #[test]
    fn test_write_reflow_emits_line_events() {
        let mut s = screen(10);
        s.write("hello").unwrap();
        let events = recorder(&mut s, EventMask::LINES | EventMask::PROMPT);
        s.write(" brave world").unwrap();
        assert_eq!(
            *events.borrow(),
            vec![
                ScreenEvent::LineRemoved(0),
                ScreenEvent::LineInserted(0),
                ScreenEvent::LineInserted(1),
                ScreenEvent::LineInserted(2),
                ScreenEvent::Prompt(false),
            ]
        );
    }

    #[test]
    fn test_write_reflow_clamps_negative_column() {
        let mut s = screen(10);
        s.write("one two").unwrap();
        s.set_cursor((3, 0));
        s.write(" big").unwrap();
        assert_eq!(texts(&s), vec!["one big", "two"]);
        // " two" trails the cursor but the last segment is only 3 long
        assert_eq!(pos(&s), (0, 1));
    }

    #[test]
    fn test_write_reflow_hard_cut() {
        let mut s = screen(4);
        s.write("abcd").unwrap();
        s.write("efghij").unwrap();
        // "abcdefghij" cut at 4, one char consumed after each cut
        assert_eq!(texts(&s), vec!["abcd", "fghi", ""]);
        assert_eq!(pos(&s), (0, 2));
    }

    #[test]
    fn test_write_reflow_keeps_prompt_on_first_segment() {
        let mut s = screen(8);
        s.prompt();
        s.write("echo hi there").unwrap();
        let kinds: Vec<_> = s.lines().iter().map(|l| l.kind).collect();
        assert_eq!(texts(&s), vec!["   echo", "hi there"]);
        assert_eq!(kinds, vec![LineKind::Prompt, LineKind::Normal]);
    }

    #[test]
    fn test_write_bootstrap_on_nonempty_buffer() {
        let mut s = screen(80);
        s.writeln("ab");
        s.writeln("cd");
        s.set_cursor(Position::UNSET);

        s.write("x").unwrap();
        // No line created: the cursor homes to the existing first line
        assert_eq!(texts(&s), vec!["xab", "cd"]);
        assert_eq!(pos(&s), (1, 0));
    }

    #[test]
    fn test_write_bootstrap_on_partially_negative_cursor() {
        let mut s = screen(80);
        s.writeln("ab");
        s.set_cursor((-3, 2));
        s.write("x").unwrap();
        assert_eq!(texts(&s), vec!["xab"]);
        assert_eq!(pos(&s), (1, 0));

        s.set_cursor((4, -1));
        s.write_char("y").unwrap();
        assert_eq!(texts(&s), vec!["yxab"]);
        assert_eq!(pos(&s), (1, 0));
    }

    #[test]
    fn test_write_char_takes_first_character() {
        let mut s = screen(80);
        s.write_char("xyz").unwrap();
        assert_eq!(texts(&s), vec!["x"]);
        assert_eq!(pos(&s), (1, 0));

        s.write_char("").unwrap();
        assert_eq!(texts(&s), vec!["x"]);
    }

    #[test]
    fn test_write_char_wraps_before_writing() {
        let mut s = screen(3);
        for c in ["a", "b", "c", "d"] {
            s.write_char(c).unwrap();
        }
        assert_eq!(texts(&s), vec!["abc", "d"]);
        assert_eq!(pos(&s), (1, 1));
    }

    #[test]
    fn test_write_char_emits_prompt_false() {
        let mut s = screen(80);
        let events = recorder(&mut s, EventMask::PROMPT);
        s.write_char("a").unwrap();
        assert_eq!(
            *events.borrow(),
            vec![ScreenEvent::Prompt(false), ScreenEvent::Prompt(false)]
        );
    }

    #[test]
    fn test_writeln_empty_appends_one_line() {
        let mut s = screen(80);
        s.writeln("");
        assert_eq!(texts(&s), vec![""]);
        assert_eq!(pos(&s), (0, 0));

        s.write("abc").unwrap();
        s.set_cursor((1, 0));
        s.writeln("");
        assert_eq!(texts(&s), vec!["abc", ""]);
        assert_eq!(pos(&s), (0, 1));
    }

    #[test]
    fn test_writeln_wraps_and_appends() {
        let mut s = screen(10);
        s.writeln("first");
        s.writeln("hello brave world");
        assert_eq!(texts(&s), vec!["first", "hello", "brave", "world"]);
        assert_eq!(pos(&s), (5, 3));
    }

    #[test]
    fn test_prompt_appends_placeholder() {
        let mut s = screen(80);
        let events = recorder(&mut s, EventMask::PROMPT | EventMask::SHOW_CURSOR);
        s.writeln("hi");
        s.prompt();

        assert_eq!(texts(&s), vec!["hi", PROMPT_PLACEHOLDER]);
        assert_eq!(pos(&s), (3, 1));
        assert!(s.is_prompting());
        assert_eq!(
            events.borrow()[2..],
            [ScreenEvent::Prompt(true), ScreenEvent::ShowCursor(true)]
        );
    }

    #[test]
    fn test_del_protects_prompt() {
        let mut s = screen(80);
        s.prompt();
        s.del().unwrap();
        assert_eq!(texts(&s), vec![PROMPT_PLACEHOLDER]);
        assert_eq!(pos(&s), (3, 0));

        s.write("ls").unwrap();
        s.del().unwrap();
        s.del().unwrap();
        s.del().unwrap();
        assert_eq!(texts(&s), vec![PROMPT_PLACEHOLDER]);
        assert_eq!(pos(&s), (3, 0));
    }

    #[test]
    fn test_del_at_column_zero_moves_up() {
        let mut s = screen(80);
        s.writeln("ab");
        s.writeln("cd");
        s.set_cursor((0, 1));

        s.del().unwrap();
        assert_eq!(texts(&s), vec!["ab", "cd"]);
        assert_eq!(pos(&s), (2, 0));

        s.del().unwrap();
        assert_eq!(texts(&s), vec!["a", "cd"]);
        assert_eq!(pos(&s), (1, 0));
    }

    #[test]
    fn test_del_at_origin_is_noop() {
        let mut s = screen(80);
        s.del().unwrap();
        assert!(s.lines().is_empty());

        s.write("ab").unwrap();
        s.set_cursor((0, 0));
        s.del().unwrap();
        assert_eq!(texts(&s), vec!["ab"]);
        assert_eq!(pos(&s), (0, 0));
    }

    #[test]
    fn test_del_removes_last_character() {
        let mut s = screen(80);
        s.write("héllo").unwrap();
        s.del().unwrap();
        assert_eq!(texts(&s), vec!["héll"]);
        assert_eq!(pos(&s), (4, 0));
    }

    #[test]
    fn test_deleteln() {
        let mut s = screen(80);
        for t in ["a", "b", "c"] {
            s.writeln(t);
        }
        s.deleteln(Some(1)).unwrap();
        assert_eq!(texts(&s), vec!["a", "c"]);
        assert_eq!(pos(&s), (1, 1));

        s.deleteln(None).unwrap();
        assert_eq!(texts(&s), vec!["a"]);
        assert_eq!(pos(&s), (1, 0));

        s.deleteln(Some(99)).unwrap();
        assert!(s.lines().is_empty());
        assert_eq!(s.cursor().position(), Position::UNSET);

        // Empty buffer: nothing to do
        s.deleteln(None).unwrap();
    }

    #[test]
    fn test_clear_resets_to_sentinel() {
        let mut s = screen(80);
        s.writeln("one");
        s.prompt();
        let events = recorder(&mut s, EventMask::LINES | EventMask::CURSOR);
        s.clear();

        assert!(s.lines().is_empty());
        assert_eq!(s.cursor().position(), Position::UNSET);
        assert_eq!(
            *events.borrow(),
            vec![ScreenEvent::Cleared, ScreenEvent::ChangeX, ScreenEvent::ChangeY]
        );

        s.write("again").unwrap();
        assert_eq!(texts(&s), vec!["again"]);
    }

    #[test]
    fn test_set_cursor_emits_only_changed_axes() {
        let mut s = screen(80);
        s.write("abc").unwrap();
        let events = recorder(&mut s, EventMask::CURSOR);

        s.set_cursor(Position::new(1, 0));
        s.set_cursor((1, 0));
        assert_eq!(*events.borrow(), vec![ScreenEvent::ChangeX]);
    }

    #[test]
    fn test_subscriber_sees_operations_after_return() {
        let mut s = screen(80);
        let rx = s.subscribe(EventMask::PROMPT);
        s.prompt();
        s.write("x").unwrap();
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events, vec![ScreenEvent::Prompt(true), ScreenEvent::Prompt(false)]);
    }

    #[test]
    fn test_ready_listener_writes_banner() {
        let s = Screen::builder(ScreenConfig::new(20, 4))
            .listener(EventMask::READY, |screen, _| screen.writeln("READY"))
            .build()
            .unwrap();
        assert_eq!(texts(&s), vec!["READY"]);
        assert_eq!(pos(&s), (5, 0));
    }

    #[test]
    fn test_listener_reenters_during_prompt() {
        let mut s = Screen::builder(ScreenConfig::new(80, 24))
            .listener(EventMask::PROMPT, |screen, event| {
                if *event == ScreenEvent::Prompt(true) {
                    screen.write("ls").unwrap();
                }
            })
            .build()
            .unwrap();
        let events = recorder(&mut s, EventMask::ALL);

        s.prompt();
        assert_eq!(texts(&s), vec!["   ls"]);
        assert_eq!(pos(&s), (5, 0));

        // The nested write's events follow the one that triggered it
        assert_eq!(
            *events.borrow(),
            vec![
                ScreenEvent::LineInserted(0),
                ScreenEvent::ChangeY,
                ScreenEvent::ChangeX,
                ScreenEvent::Prompt(true),
                ScreenEvent::ChangeX,
                ScreenEvent::LineReplaced(0),
                ScreenEvent::Prompt(false),
                ScreenEvent::ShowCursor(false),
                ScreenEvent::ShowCursor(true),
            ]
        );
    }

    #[test]
    fn test_nested_events_reach_subscribers_in_order() {
        let mut s = Screen::builder(ScreenConfig::new(80, 24))
            .listener(EventMask::LINES, |screen, event| {
                if *event == ScreenEvent::LineInserted(0) {
                    screen.writeln("second");
                }
            })
            .build()
            .unwrap();
        let rx = s.subscribe(EventMask::LINES);

        s.writeln("first");
        assert_eq!(texts(&s), vec!["first", "second"]);
        assert_eq!(
            rx.try_iter().collect::<Vec<_>>(),
            vec![ScreenEvent::LineInserted(0), ScreenEvent::LineInserted(1)]
        );
    }

    #[test]
    fn test_listener_registered_during_delivery_is_kept() {
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        let mut s = Screen::builder(ScreenConfig::default())
            .listener(EventMask::READY, move |screen, _| {
                let seen = seen.clone();
                screen.listen(EventMask::PROMPT, move |_, _| seen.set(seen.get() + 1));
            })
            .build()
            .unwrap();

        s.prompt();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_typewriter_module() {
        let mut s = Screen::builder(ScreenConfig::new(4, 24))
            .module(Typewriter)
            .build()
            .unwrap();
        assert!(s.capabilities().contains("type"));
        assert_eq!(s.module_names().collect::<Vec<_>>(), vec!["typewriter"]);

        s.invoke("type", "hello").unwrap();
        assert_eq!(texts(&s), vec!["hell", "o"]);
    }

    #[test]
    fn test_invoke_unknown_capability() {
        let mut s = screen(80);
        let err = s.invoke("nope", "").unwrap_err();
        assert!(matches!(err, ScreenError::UnknownCapability(name) if name == "nope"));
    }

    struct Stamp {
        name: &'static str,
        mark: &'static str,
        saw_cols: Rc<Cell<usize>>,
    }

    impl Module for Stamp {
        fn name(&self) -> &str {
            self.name
        }

        fn operations(&self) -> Vec<(String, Operation)> {
            let mark = self.mark;
            let op: Operation = Rc::new(move |screen: &mut Screen, _: &str| -> Result<()> {
                screen.writeln(mark);
                Ok(())
            });
            let shadow: Operation = Rc::new(|_: &mut Screen, _: &str| -> Result<()> { Ok(()) });
            vec![("stamp".to_owned(), op), ("write".to_owned(), shadow)]
        }

        fn init(&mut self, screen: &Screen) {
            self.saw_cols.set(screen.config().cols);
        }
    }

    #[test]
    fn test_modules_first_registration_wins() {
        let first_cols = Rc::new(Cell::new(0));
        let second_cols = Rc::new(Cell::new(0));
        let mut s = Screen::builder(ScreenConfig::new(30, 5))
            .module(Stamp {
                name: "first",
                mark: "1",
                saw_cols: first_cols.clone(),
            })
            .module(Stamp {
                name: "second",
                mark: "2",
                saw_cols: second_cols.clone(),
            })
            .build()
            .unwrap();

        // Both init hooks ran
        assert_eq!(first_cols.get(), 30);
        assert_eq!(second_cols.get(), 30);

        // "write" is built in and was never taken over
        assert_eq!(s.capabilities().len(), 1);
        s.invoke("stamp", "").unwrap();
        assert_eq!(texts(&s), vec!["1"]);
    }
}
