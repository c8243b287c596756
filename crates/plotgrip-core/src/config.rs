//! Board configuration.

use crate::error::{CoordinatorError, CoordinatorResult};
use crate::input::MouseButton;
use crate::palette::{ColorRgba, Palette};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings shared by every object on a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Repaint only the moving artifacts over a cached background.
    pub blit: bool,
    /// Picking an artifact with this button deletes its object.
    pub delete_button: MouseButton,
    /// End the motion episode when the pointer leaves the canvas or the
    /// leader's region.
    pub reset_on_leave: bool,
    /// Palette colors, in cycling order. Empty means the default palette.
    pub palette: Vec<ColorRgba>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            blit: true,
            delete_button: MouseButton::Right,
            reset_on_leave: true,
            palette: Vec::new(),
        }
    }
}

impl BoardConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> CoordinatorResult<Self> {
        serde_json::from_str(json).map_err(|e| CoordinatorError::Config(e.to_string()))
    }

    /// Load a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> CoordinatorResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| CoordinatorError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Build the palette described by this configuration.
    pub fn palette(&self) -> Palette {
        Palette::from_colors(self.palette.clone())
    }
}
