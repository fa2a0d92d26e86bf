#![forbid(unsafe_code)]

//! Keyboard mapping for focused drag bars.
//!
//! Arrow keys along the bar's axis step the bar; the cross-axis arrows are
//! not consumed so the host can keep its own focus navigation. Shift selects
//! the large step from [`gridsplit_layout::SplitterConfig`].

use gridsplit_backend::Axis;
use gridsplit_layout::ResizeDirection;
use serde::{Deserialize, Serialize};

/// Arrow keys recognised on a focused bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarKey {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
}

impl BarKey {
    /// Parse a DOM `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            "ArrowLeft" | "Left" => Some(Self::ArrowLeft),
            "ArrowRight" | "Right" => Some(Self::ArrowRight),
            "ArrowUp" | "Up" => Some(Self::ArrowUp),
            "ArrowDown" | "Down" => Some(Self::ArrowDown),
            _ => None,
        }
    }

    #[must_use]
    pub const fn key_name(self) -> &'static str {
        match self {
            Self::ArrowLeft => "ArrowLeft",
            Self::ArrowRight => "ArrowRight",
            Self::ArrowUp => "ArrowUp",
            Self::ArrowDown => "ArrowDown",
        }
    }
}

/// One key press delivered to a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInput {
    pub key: BarKey,
    /// Shift held: use the large step.
    pub shift: bool,
}

impl KeyInput {
    #[must_use]
    pub const fn new(key: BarKey) -> Self {
        Self { key, shift: false }
    }

    #[must_use]
    pub const fn shifted(key: BarKey) -> Self {
        Self { key, shift: true }
    }

    /// Build from raw DOM event fields; `None` for keys bars do not handle.
    #[must_use]
    pub fn from_dom(key: &str, shift: bool) -> Option<Self> {
        BarKey::from_key_name(key).map(|key| Self { key, shift })
    }
}

/// Logical resize direction for `key` on a bar laid out along `axis`.
///
/// Right and Down grow the track before the bar. Writing direction is not
/// applied here; the engine mirrors horizontal steps in right-to-left
/// documents.
#[must_use]
pub const fn resize_direction(axis: Axis, key: BarKey) -> Option<ResizeDirection> {
    match (axis, key) {
        (Axis::Horizontal, BarKey::ArrowRight) | (Axis::Vertical, BarKey::ArrowDown) => {
            Some(ResizeDirection::Increase)
        }
        (Axis::Horizontal, BarKey::ArrowLeft) | (Axis::Vertical, BarKey::ArrowUp) => {
            Some(ResizeDirection::Decrease)
        }
        _ => None,
    }
}
