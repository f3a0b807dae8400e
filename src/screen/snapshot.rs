//! Serializable capture of screen state, for golden tests and debugging.

use serde::{Deserialize, Serialize};

use super::controller::Screen;
use super::cursor::Position;
use super::text_buffer::{Line, LineKind};
use crate::error::Result;

/// Snapshot of a single line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSnapshot {
    /// Line content.
    pub text: String,
    /// Line kind.
    pub kind: LineKind,
}

impl From<&Line> for LineSnapshot {
    fn from(line: &Line) -> Self {
        Self {
            text: line.content.clone(),
            kind: line.kind,
        }
    }
}

/// Snapshot of the whole screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSnapshot {
    /// Wrap width.
    pub cols: usize,
    /// Viewport height.
    pub rows: usize,
    /// Cursor position, `(-1, -1)` when unset.
    pub cursor: Position,
    /// Every line in the buffer, top to bottom.
    pub lines: Vec<LineSnapshot>,
}

impl ScreenSnapshot {
    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Text of every line, top to bottom.
    pub fn text(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }

    /// Plain-text rendering with line numbers and a cursor marker.
    pub fn to_debug_string(&self) -> String {
        use std::fmt::Write;

        let mut s = String::new();
        let _ = writeln!(s, "Size: {}x{}", self.cols, self.rows);
        let _ = writeln!(s, "Cursor: ({}, {})", self.cursor.x, self.cursor.y);
        s.push_str("---\n");
        for (row, line) in self.lines.iter().enumerate() {
            let marker = if i32::try_from(row).is_ok_and(|r| r == self.cursor.y) {
                format!(" <- cursor at col {}", self.cursor.x)
            } else {
                String::new()
            };
            let tag = if line.kind == LineKind::Prompt { '>' } else { ' ' };
            let _ = writeln!(s, "{row:3}{tag}|{}|{marker}", line.text);
        }
        s
    }
}

impl Screen {
    /// Capture the current buffer and cursor.
    pub fn snapshot(&self) -> ScreenSnapshot {
        ScreenSnapshot {
            cols: self.config().cols,
            rows: self.config().rows,
            cursor: self.cursor().position(),
            lines: self.lines().iter().map(LineSnapshot::from).collect(),
        }
    }
}
