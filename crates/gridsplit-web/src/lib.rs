#![forbid(unsafe_code)]

//! Web host adapter for the gridsplit splitter engine.
//!
//! The browser binding forwards DOM events to a [`BarPointerAdapter`] and
//! executes the [`BarCaptureCommand`]s it returns. [`RecordingHost`] stands in
//! for the DOM in tests and replay tooling.

pub mod bar_pointer;
pub mod keyboard;
pub mod recording_host;

pub use bar_pointer::{
    BarCaptureCommand, BarIgnoredReason, BarLifecyclePhase, BarLogOutcome, BarPointerAdapter,
    BarPointerButton, BarPointerConfig, BarPointerDispatch, BarPointerLogEntry,
};
pub use keyboard::{BarKey, KeyInput, resize_direction};
pub use recording_host::{HostCall, RecordingHost};
