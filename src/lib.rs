//! # Teletype
//!
//! A line-mode, teleprinter-style text surface.
//!
//! Teletype models a fixed-column, scrolling sequence of text lines with an
//! addressable cursor. Writes that overflow the column width are reflowed
//! on word boundaries; prompts protect their leading glyph from deletion.
//!
//! ## Core Concepts
//!
//! - **Text buffer**: ordered lines, no scrollback limit
//! - **Cursor**: may sit past the end of a line; the next write pads
//! - **Reflow**: overflowing lines are re-wrapped in place
//! - **Notifications**: listeners and channel subscribers see every change
//! - **Modules**: named capabilities attached at construction
//!
//! Drawing is left to a renderer reading the screen after each
//! notification; [`render::TerminalRenderer`] is a crossterm one.
//!
//! ## Example
//!
//! ```rust
//! use teletype::{Screen, ScreenConfig};
//!
//! let mut screen = Screen::new(ScreenConfig::new(80, 24)).unwrap();
//! screen.writeln("READY");
//! screen.prompt();
//! screen.write("run").unwrap();
//!
//! assert_eq!(screen.line(1).unwrap().content, "   run");
//! assert_eq!(screen.cursor().x(), 6);
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod config;
pub mod error;
pub mod render;
pub mod screen;

// Re-exports for convenience
pub use config::ScreenConfig;
pub use error::{Result, ScreenError};
pub use render::{RendererConfig, TerminalRenderer};
pub use screen::{
    wrap, CapabilityTable, Cursor, CursorChange, EventMask, Line, LineKind, Module, Operation,
    Position, Screen, ScreenBuilder, ScreenEvent, ScreenSnapshot, TextBuffer, Typewriter,
};
