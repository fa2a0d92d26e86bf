#![forbid(unsafe_code)]

//! Resizable split-layout engine.
//!
//! A layout is a tree of groups (rows or columns) and leaves, each sized in
//! pixels or `fr` units. [`SplitterEngine`] owns the derived
//! [`LayoutIndex`], renders CSS track lists through a
//! [`gridsplit_backend::SplitterHost`], and turns bar drags and keyboard
//! steps into conserved size updates.
//!
//! # Example
//!
//! ```ignore
//! use gridsplit_layout::{Direction, LayoutGroup, LayoutLeaf, Size, SplitterConfig, SplitterEngine};
//!
//! let model = LayoutGroup::new("root", Direction::Columns)
//!     .with_item(LayoutLeaf::new("nav", Size::px(240.0)))
//!     .with_item(LayoutLeaf::new("main", Size::fr(1.0)));
//! let mut engine = SplitterEngine::with_model(host, SplitterConfig::default(), &model)?;
//! engine.keyboard_resize("nav", ResizeDirection::Increase, false);
//! ```

pub mod config;
pub mod engine;
pub mod grid;
pub mod index;
pub mod model;
pub mod mutation;
pub mod resize;

pub use config::{SplitterConfig, SplitterConfigError};
pub use engine::{
    CancelReason, ResizeOutcome, ResizePhase, ResizeTransition, SplitterEngine,
};
pub use grid::{
    DEFAULT_DRAG_BAR_PX, GridTemplateOptions, bar_footprint, bar_track_px, grid_template,
};
pub use index::{EntryKind, GroupEntry, IndexEntry, LayoutIndex, ModelError};
pub use model::{
    Direction, DragBar, ItemId, LayoutGroup, LayoutItem, LayoutLeaf, Size, SizeParseError,
    SizeParseReason, Sticky, format_css_number,
};
pub use mutation::{
    AddOutcome, FixedSizesUpdate, MutationError, MutationFailure, MutationKind, Placement,
    RemovalPlan, RemoveOutcome,
};
pub use resize::{
    BarPair, DragSnapshot, ResizeApplied, ResizeDirection, ResizeNoopReason, apply_resize,
    resolve_bar,
};

pub use gridsplit_backend::{Axis, FrameHandle, PointerPosition, WritingDirection};
