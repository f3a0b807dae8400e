//! Configuration for the screen.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScreenError};

/// Screen dimensions, fixed for the lifetime of a [`Screen`](crate::Screen).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenConfig {
    /// Wrap width in characters.
    pub cols: usize,
    /// Visible viewport height. Only the renderer looks at this.
    pub rows: usize,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self { cols: 80, rows: 24 }
    }
}

impl ScreenConfig {
    /// Create a configuration with the given dimensions.
    pub const fn new(cols: usize, rows: usize) -> Self {
        Self { cols, rows }
    }

    /// Reject zero dimensions.
    pub fn validate(&self) -> Result<()> {
        if self.cols == 0 {
            return Err(ScreenError::InvalidConfig("cols must be greater than 0".into()));
        }
        if self.rows == 0 {
            return Err(ScreenError::InvalidConfig("rows must be greater than 0".into()));
        }
        Ok(())
    }

    /// Parse and validate a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}
