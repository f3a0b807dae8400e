//! Module trait and the capability table it feeds.
//!
//! A module contributes named operations to a [`Screen`] at construction.
//! Operations only see the screen's public API, so they cannot bypass the
//! buffer/cursor invariants. Names are claimed once: built-in operation
//! names are reserved, and on a collision between modules the first
//! registration wins.

use std::collections::BTreeMap;
use std::rc::Rc;

use super::controller::Screen;
use crate::error::Result;

/// A named operation contributed by a module.
pub type Operation = Rc<dyn Fn(&mut Screen, &str) -> Result<()>>;

/// Names of the controller's own operations. Modules cannot claim these.
pub const BUILTIN_OPERATIONS: &[&str] = &[
    "write",
    "write_char",
    "writeln",
    "prompt",
    "set_cursor",
    "del",
    "deleteln",
    "clear",
    "invoke",
    "subscribe",
    "snapshot",
];

/// A capability provider attached to a screen at construction.
pub trait Module {
    /// Module name, used in diagnostics and [`Screen::capabilities`].
    fn name(&self) -> &str;

    /// The operations this module exposes.
    fn operations(&self) -> Vec<(String, Operation)>;

    /// Called once after the module's operations are registered.
    fn init(&mut self, _screen: &Screen) {}
}

struct Capability {
    module: String,
    operation: Operation,
}

/// Operations registered by modules, keyed by name.
#[derive(Default)]
pub struct CapabilityTable {
    entries: BTreeMap<String, Capability>,
}

impl std::fmt::Debug for CapabilityTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(name, cap)| (name, &cap.module)))
            .finish()
    }
}

impl CapabilityTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operation. Returns `false` if the name was already taken.
    pub fn register(&mut self, module: &str, name: String, operation: Operation) -> bool {
        if BUILTIN_OPERATIONS.contains(&name.as_str()) {
            tracing::warn!(module, %name, "capability name is reserved, skipping");
            return false;
        }
        if let Some(existing) = self.entries.get(&name) {
            tracing::warn!(
                module,
                %name,
                owner = existing.module.as_str(),
                "capability already registered, first registration wins"
            );
            return false;
        }
        tracing::debug!(module, %name, "capability registered");
        self.entries.insert(
            name,
            Capability {
                module: module.to_owned(),
                operation,
            },
        );
        true
    }

    /// Look up an operation by name.
    pub fn get(&self, name: &str) -> Option<Operation> {
        self.entries.get(name).map(|cap| cap.operation.clone())
    }

    /// Check whether a name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// `(operation, module)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, cap)| (name.as_str(), cap.module.as_str()))
    }

    /// Number of registered operations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Teleprinter echo: types its argument one character at a time.
#[derive(Debug, Default, Clone, Copy)]
pub struct Typewriter;

impl Module for Typewriter {
    fn name(&self) -> &str {
        "typewriter"
    }

    fn operations(&self) -> Vec<(String, Operation)> {
        let type_text: Operation = Rc::new(|screen: &mut Screen, text: &str| -> Result<()> {
            use unicode_segmentation::UnicodeSegmentation;
            for grapheme in text.graphemes(true) {
                screen.write_char(grapheme)?;
            }
            Ok(())
        });
        vec![("type".to_owned(), type_text)]
    }
}
