#![forbid(unsafe_code)]

//! In-memory [`SplitterHost`] that records every call in order.
//!
//! Useful for deterministic tests and replay logs: container sizes are set
//! up front, frames are delivered explicitly, and the call log shows the
//! exact interleaving of track writes, frame requests, and listener changes.

use std::collections::{BTreeMap, VecDeque};

use gridsplit_backend::{
    Axis, FrameHandle, FrameScheduler, GestureListeners, LayoutDocument, SplitterHost,
    WritingDirection,
};
use serde::{Deserialize, Serialize};

/// One host call observed by [`RecordingHost`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum HostCall {
    SetTrackList {
        group: String,
        axis: Axis,
        /// `grid-template-columns` or `grid-template-rows`.
        property: String,
        template: String,
    },
    RequestFrame {
        frame: FrameHandle,
    },
    CancelFrame {
        frame: FrameHandle,
    },
    AttachListeners,
    DetachListeners,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    writing_direction: WritingDirection,
    container_sizes: BTreeMap<String, f64>,
    tracks: BTreeMap<String, String>,
    pending_frames: VecDeque<FrameHandle>,
    next_frame: u64,
    listeners_attached: bool,
    calls: Vec<HostCall>,
}

impl RecordingHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set_container_size`](Self::set_container_size).
    #[must_use]
    pub fn with_container(mut self, group_id: &str, px: f64) -> Self {
        self.set_container_size(group_id, px);
        self
    }

    #[must_use]
    pub fn with_writing_direction(mut self, direction: WritingDirection) -> Self {
        self.writing_direction = direction;
        self
    }

    /// Rendered extent of a group along its own axis.
    pub fn set_container_size(&mut self, group_id: &str, px: f64) {
        self.container_sizes.insert(group_id.to_owned(), px);
    }

    pub fn set_writing_direction(&mut self, direction: WritingDirection) {
        self.writing_direction = direction;
    }

    /// Last track list written for `group_id`.
    #[must_use]
    pub fn track(&self, group_id: &str) -> Option<&str> {
        self.tracks.get(group_id).map(String::as_str)
    }

    #[must_use]
    pub fn pending_frames(&self) -> Vec<FrameHandle> {
        self.pending_frames.iter().copied().collect()
    }

    /// Oldest frame still scheduled, removed from the queue.
    ///
    /// The caller is expected to deliver it to the engine.
    pub fn next_frame(&mut self) -> Option<FrameHandle> {
        self.pending_frames.pop_front()
    }

    #[must_use]
    pub const fn listeners_attached(&self) -> bool {
        self.listeners_attached
    }

    #[must_use]
    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    /// Drain the call log.
    pub fn take_calls(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut self.calls)
    }
}

impl LayoutDocument for RecordingHost {
    fn writing_direction(&self) -> WritingDirection {
        self.writing_direction
    }

    fn container_size(&self, group_id: &str, _axis: Axis) -> f64 {
        self.container_sizes.get(group_id).copied().unwrap_or(0.0)
    }

    fn set_track_list(&mut self, group_id: &str, axis: Axis, template: &str) {
        self.tracks.insert(group_id.to_owned(), template.to_owned());
        self.calls.push(HostCall::SetTrackList {
            group: group_id.to_owned(),
            axis,
            property: axis.track_property().to_owned(),
            template: template.to_owned(),
        });
    }
}

impl FrameScheduler for RecordingHost {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_frame = self.next_frame.saturating_add(1);
        let frame = FrameHandle::new(self.next_frame);
        self.pending_frames.push_back(frame);
        self.calls.push(HostCall::RequestFrame { frame });
        frame
    }

    fn cancel_frame(&mut self, frame: FrameHandle) {
        self.pending_frames.retain(|pending| *pending != frame);
        self.calls.push(HostCall::CancelFrame { frame });
    }
}

impl GestureListeners for RecordingHost {
    fn attach_gesture_listeners(&mut self) {
        self.listeners_attached = true;
        self.calls.push(HostCall::AttachListeners);
    }

    fn detach_gesture_listeners(&mut self) {
        self.listeners_attached = false;
        self.calls.push(HostCall::DetachListeners);
    }
}

impl SplitterHost for RecordingHost {
    type Document = Self;
    type Frames = Self;
    type Gestures = Self;

    fn document(&mut self) -> &mut Self {
        self
    }

    fn frames(&mut self) -> &mut Self {
        self
    }

    fn gestures(&mut self) -> &mut Self {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cancelled_frames_leave_the_queue() {
        let mut host = RecordingHost::new();
        let first = host.request_frame();
        let second = host.request_frame();
        host.cancel_frame(first);
        assert_eq!(host.pending_frames(), vec![second]);
        assert_eq!(host.next_frame(), Some(second));
        assert_eq!(host.next_frame(), None);
        assert_eq!(
            host.take_calls(),
            vec![
                HostCall::RequestFrame { frame: first },
                HostCall::RequestFrame { frame: second },
                HostCall::CancelFrame { frame: first },
            ]
        );
        assert!(host.calls().is_empty());
    }

    #[test]
    fn unknown_container_reports_zero() {
        let host = RecordingHost::new().with_container("root", 640.0);
        assert_eq!(host.container_size("root", Axis::Horizontal), 640.0);
        assert_eq!(host.container_size("other", Axis::Vertical), 0.0);
    }

    #[test]
    fn call_log_serializes_tagged() {
        let mut host = RecordingHost::new();
        host.set_track_list("root", Axis::Vertical, "1fr 4px 1fr");
        host.attach_gesture_listeners();
        let json = serde_json::to_value(host.calls()).expect("serialize");
        assert_eq!(json[0]["call"], "set_track_list");
        assert_eq!(json[0]["axis"], "vertical");
        assert_eq!(json[0]["property"], "grid-template-rows");
        assert_eq!(json[1]["call"], "attach_listeners");
        assert!(host.listeners_attached());
        assert_eq!(host.track("root"), Some("1fr 4px 1fr"));
    }
}
