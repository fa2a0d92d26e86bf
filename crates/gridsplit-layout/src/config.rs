#![forbid(unsafe_code)]

//! Splitter configuration as data.
//!
//! Every field has a default, so partial documents are accepted:
//!
//! ```toml
//! keyboard_step_px = 8
//! default_drag_bar_px = 6
//! ```
//!
//! ```rust,ignore
//! let config = SplitterConfig::from_toml_file("splitter.toml")?.validated()?;
//! ```

#[cfg(feature = "config")]
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::grid::{DEFAULT_DRAG_BAR_PX, GridTemplateOptions};

/// Tunables for keyboard steps and bar tracks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitterConfig {
    /// Pixels moved per arrow key press.
    pub keyboard_step_px: f64,
    /// Pixels moved per arrow key press with Shift held.
    pub keyboard_large_step_px: f64,
    /// Bar thickness when an item's drag bar has no explicit size.
    pub default_drag_bar_px: f64,
    /// Render bar tracks between items in grid templates.
    pub drag_bar_tracks: bool,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            keyboard_step_px: 10.0,
            keyboard_large_step_px: 50.0,
            default_drag_bar_px: DEFAULT_DRAG_BAR_PX,
            drag_bar_tracks: true,
        }
    }
}

impl SplitterConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, SplitterConfigError> {
        toml::from_str(s).map_err(SplitterConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, SplitterConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(SplitterConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, SplitterConfigError> {
        serde_json::from_str(s).map_err(SplitterConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SplitterConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(SplitterConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Check every value is usable. Returns one message per problem.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let steps = [
            ("keyboard_step_px", self.keyboard_step_px),
            ("keyboard_large_step_px", self.keyboard_large_step_px),
        ];
        for (name, value) in steps {
            if !value.is_finite() || value <= 0.0 {
                errors.push(format!("{name} must be finite and > 0, got {value}"));
            }
        }
        if !self.default_drag_bar_px.is_finite() || self.default_drag_bar_px < 0.0 {
            errors.push(format!(
                "default_drag_bar_px must be finite and >= 0, got {}",
                self.default_drag_bar_px
            ));
        }
        errors
    }

    /// Return `self` if [`validate`](Self::validate) finds nothing.
    pub fn validated(self) -> Result<Self, SplitterConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(SplitterConfigError::Validation(errors))
        }
    }

    /// Step for one keyboard press.
    #[must_use]
    pub fn keyboard_step(&self, large: bool) -> f64 {
        if large {
            self.keyboard_large_step_px
        } else {
            self.keyboard_step_px
        }
    }

    #[must_use]
    pub fn grid_template_options(&self) -> GridTemplateOptions {
        GridTemplateOptions {
            drag_bar_tracks: self.drag_bar_tracks,
            default_drag_bar_px: self.default_drag_bar_px,
        }
    }
}

/// Errors that can occur when loading a splitter configuration.
#[derive(Debug)]
pub enum SplitterConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for SplitterConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for SplitterConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
