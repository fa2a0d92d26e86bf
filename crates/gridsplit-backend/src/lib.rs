#![forbid(unsafe_code)]
#![doc = "Host traits for gridsplit: document geometry, frame scheduling, and gesture listeners."]
#![doc = ""]
#![doc = "This crate defines the boundary between the split-layout engine and whatever"]
#![doc = "renders it (a DOM binding in the browser, `RecordingHost` in tests)."]

use serde::{Deserialize, Serialize};

/// Physical axis along which a group lays out its tracks.
///
/// A `columns` group distributes width (horizontal axis); a `rows` group
/// distributes height (vertical axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// CSS property that receives the track list for this axis.
    #[must_use]
    pub const fn track_property(self) -> &'static str {
        match self {
            Self::Horizontal => "grid-template-columns",
            Self::Vertical => "grid-template-rows",
        }
    }
}

/// Inline writing direction of the hosting document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritingDirection {
    #[default]
    Ltr,
    Rtl,
}

impl WritingDirection {
    /// Sign applied to horizontal pointer deltas.
    ///
    /// In right-to-left documents the first track sits on the right, so a
    /// rightward pointer motion shrinks it.
    #[must_use]
    pub const fn horizontal_sign(self) -> f64 {
        match self {
            Self::Ltr => 1.0,
            Self::Rtl => -1.0,
        }
    }
}

/// Pointer location in document pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
}

impl PointerPosition {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Coordinate along `axis`.
    #[must_use]
    pub const fn along(self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }
}

/// Opaque token for one scheduled animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameHandle(u64);

impl FrameHandle {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Geometry reads and track-list writes against rendered group elements.
///
/// Group elements are addressed by the layout id of the group they render.
pub trait LayoutDocument {
    /// Writing direction currently in effect for the splitter element.
    fn writing_direction(&self) -> WritingDirection;

    /// Rendered pixel extent of a group's container along `axis`.
    ///
    /// Detached or unknown elements report `0.0`.
    fn container_size(&self, group_id: &str, axis: Axis) -> f64;

    /// Replace the track list of a group's container along `axis`.
    ///
    /// A DOM host writes `template` to [`Axis::track_property`] on the
    /// group element.
    fn set_track_list(&mut self, group_id: &str, axis: Axis, template: &str);
}

/// Display-refresh scheduling (`requestAnimationFrame` on the web).
///
/// The host calls back into the engine with the returned handle once the
/// frame fires; cancelled handles must never be delivered.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;

    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Window-level pointer listeners installed for the duration of a drag.
pub trait GestureListeners {
    fn attach_gesture_listeners(&mut self);

    fn detach_gesture_listeners(&mut self);
}

/// Unified host combining document access, frame scheduling, and listeners.
pub trait SplitterHost {
    /// Document implementation.
    type Document: LayoutDocument;

    /// Frame scheduler implementation.
    type Frames: FrameScheduler;

    /// Gesture listener implementation.
    type Gestures: GestureListeners;

    /// Access the document (mutable for track-list writes).
    fn document(&mut self) -> &mut Self::Document;

    /// Access the frame scheduler.
    fn frames(&mut self) -> &mut Self::Frames;

    /// Access the gesture listener registry.
    fn gestures(&mut self) -> &mut Self::Gestures;
}
