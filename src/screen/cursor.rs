//! Cursor: the logical insertion point.
//!
//! Coordinates are signed so the cursor can sit at the `(-1, -1)` sentinel
//! before anything has been written. No bounds checking happens here; the
//! controller keeps the cursor consistent with the buffer.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Which coordinates a cursor mutation actually changed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CursorChange: u8 {
        /// Column changed.
        const X = 0b01;
        /// Row changed.
        const Y = 0b10;
    }
}

/// A cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Position {
    /// The "buffer empty / never written" position.
    pub const UNSET: Self = Self::new(-1, -1);

    /// Create a position.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Position {
    #[inline]
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Mutable (x, y) position with change reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    x: i32,
    y: i32,
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

impl Cursor {
    /// Create a cursor at the sentinel position.
    pub const fn new() -> Self {
        Self {
            x: Position::UNSET.x,
            y: Position::UNSET.y,
        }
    }

    /// Current column.
    #[inline]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Current row.
    #[inline]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Current position.
    #[inline]
    pub const fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// True at the sentinel, or anywhere with a negative coordinate.
    #[inline]
    pub const fn is_unset(&self) -> bool {
        self.x < 0 || self.y < 0
    }

    /// Set the column.
    pub fn set_x(&mut self, x: i32) -> CursorChange {
        if self.x == x {
            return CursorChange::empty();
        }
        self.x = x;
        CursorChange::X
    }

    /// Set the row.
    pub fn set_y(&mut self, y: i32) -> CursorChange {
        if self.y == y {
            return CursorChange::empty();
        }
        self.y = y;
        CursorChange::Y
    }

    /// Set both coordinates.
    pub fn set_position(&mut self, position: impl Into<Position>) -> CursorChange {
        let Position { x, y } = position.into();
        self.set_x(x) | self.set_y(y)
    }

    /// Return to the sentinel.
    pub fn reset(&mut self) -> CursorChange {
        self.set_position(Position::UNSET)
    }
}
