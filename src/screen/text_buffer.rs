//! Text buffer: ordered, index-addressable storage for screen lines.
//!
//! Lines are kept top to bottom in display order with no gaps. There is no
//! scrollback limit; clipping to the viewport is left to the renderer.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::wrap::char_len;
use crate::error::{Result, ScreenError};

/// How a line behaves under backward deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    /// Ordinary content.
    #[default]
    Normal,
    /// Starts with the protected prompt placeholder.
    Prompt,
}

/// A single row of text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Line {
    /// The text content of the line.
    pub content: String,
    /// Prompt lines protect their leading placeholder from deletion.
    pub kind: LineKind,
}

impl Line {
    /// Create a normal line.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: LineKind::Normal,
        }
    }

    /// Create a prompt line.
    pub fn prompt(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: LineKind::Prompt,
        }
    }

    /// Create an empty normal line.
    pub const fn empty() -> Self {
        Self {
            content: String::new(),
            kind: LineKind::Normal,
        }
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        char_len(&self.content)
    }

    /// Check if the line has no content.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Check if this is a prompt line.
    pub fn is_prompt(&self) -> bool {
        self.kind == LineKind::Prompt
    }
}

/// Ordered sequence of lines.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    lines: VecDeque<Line>,
}

impl TextBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            lines: VecDeque::new(),
        }
    }

    /// Get the total number of lines in the buffer.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Index of the last line, if any.
    pub fn last_index(&self) -> Option<usize> {
        self.lines.len().checked_sub(1)
    }

    /// Get a line by index from the top of the buffer.
    pub fn get(&self, index: usize) -> Result<&Line> {
        let len = self.lines.len();
        self.lines
            .get(index)
            .ok_or(ScreenError::IndexOutOfRange { index, len })
    }

    /// Insert a line, shifting later lines down. `index == len()` appends.
    pub fn insert_line(&mut self, index: usize, line: Line) -> Result<()> {
        let len = self.lines.len();
        if index > len {
            return Err(ScreenError::IndexOutOfRange { index, len });
        }
        self.lines.insert(index, line);
        Ok(())
    }

    /// Append a line at the bottom, returning its index.
    pub fn push_line(&mut self, line: Line) -> usize {
        self.lines.push_back(line);
        self.lines.len() - 1
    }

    /// Replace the content of a line in place, keeping its kind.
    pub fn replace_line(&mut self, index: usize, content: impl Into<String>) -> Result<()> {
        let len = self.lines.len();
        let line = self
            .lines
            .get_mut(index)
            .ok_or(ScreenError::IndexOutOfRange { index, len })?;
        line.content = content.into();
        Ok(())
    }

    /// Remove a line, shifting later lines up.
    pub fn remove_line(&mut self, index: usize) -> Result<Line> {
        let len = self.lines.len();
        self.lines
            .remove(index)
            .ok_or(ScreenError::IndexOutOfRange { index, len })
    }

    /// Iterate over all lines, top to bottom.
    pub fn iter(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter()
    }

    /// Lines in `start..end`, clamped to the buffer.
    pub fn range(&self, start: usize, end: usize) -> impl Iterator<Item = &Line> {
        let end = end.min(self.lines.len());
        let start = start.min(end);
        self.lines.range(start..end)
    }

    /// Clear all content.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
