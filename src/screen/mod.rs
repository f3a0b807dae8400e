//! The screen: text buffer, cursor, wrapping and the controller tying
//! them together.

pub mod controller;
pub mod cursor;
pub mod events;
pub mod module;
pub mod snapshot;
pub mod text_buffer;
pub mod wrap;

pub use controller::{Screen, ScreenBuilder, PROMPT_PLACEHOLDER, PROMPT_WIDTH};
pub use cursor::{Cursor, CursorChange, Position};
pub use events::{EventBus, EventMask, Listener, ScreenEvent};
pub use module::{CapabilityTable, Module, Operation, Typewriter, BUILTIN_OPERATIONS};
pub use snapshot::{LineSnapshot, ScreenSnapshot};
pub use text_buffer::{Line, LineKind, TextBuffer};
pub use wrap::{char_len, wrap};
