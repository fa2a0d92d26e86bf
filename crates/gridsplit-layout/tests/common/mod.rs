//! In-memory host shared by the integration suites.

#![allow(dead_code)]

use std::collections::BTreeMap;

use gridsplit_backend::{
    Axis, FrameHandle, FrameScheduler, GestureListeners, LayoutDocument, SplitterHost,
    WritingDirection,
};

#[derive(Debug, Default)]
pub struct MemoryDocument {
    pub direction: WritingDirection,
    pub sizes: BTreeMap<String, f64>,
    pub tracks: BTreeMap<String, String>,
    pub writes: usize,
}

impl LayoutDocument for MemoryDocument {
    fn writing_direction(&self) -> WritingDirection {
        self.direction
    }

    fn container_size(&self, group_id: &str, _axis: Axis) -> f64 {
        self.sizes.get(group_id).copied().unwrap_or(0.0)
    }

    fn set_track_list(&mut self, group_id: &str, _axis: Axis, template: &str) {
        self.writes += 1;
        self.tracks.insert(group_id.to_owned(), template.to_owned());
    }
}

#[derive(Debug, Default)]
pub struct MemoryFrames {
    next: u64,
    pub pending: Vec<FrameHandle>,
}

impl FrameScheduler for MemoryFrames {
    fn request_frame(&mut self) -> FrameHandle {
        self.next += 1;
        let frame = FrameHandle::new(self.next);
        self.pending.push(frame);
        frame
    }

    fn cancel_frame(&mut self, frame: FrameHandle) {
        self.pending.retain(|pending| *pending != frame);
    }
}

#[derive(Debug, Default)]
pub struct MemoryListeners {
    pub attached: bool,
}

impl GestureListeners for MemoryListeners {
    fn attach_gesture_listeners(&mut self) {
        self.attached = true;
    }

    fn detach_gesture_listeners(&mut self) {
        self.attached = false;
    }
}

#[derive(Debug, Default)]
pub struct MemoryHost {
    pub document: MemoryDocument,
    pub frames: MemoryFrames,
    pub listeners: MemoryListeners,
}

impl MemoryHost {
    pub fn with_sizes(sizes: &[(&str, f64)]) -> Self {
        let mut host = Self::default();
        for (group, size) in sizes {
            host.document.sizes.insert((*group).to_owned(), *size);
        }
        host
    }

    pub fn track(&self, group_id: &str) -> Option<&str> {
        self.document.tracks.get(group_id).map(String::as_str)
    }

    /// Deliver the oldest pending frame, as a browser would.
    pub fn take_frame(&mut self) -> Option<FrameHandle> {
        if self.frames.pending.is_empty() {
            None
        } else {
            Some(self.frames.pending.remove(0))
        }
    }
}

impl SplitterHost for MemoryHost {
    type Document = MemoryDocument;
    type Frames = MemoryFrames;
    type Gestures = MemoryListeners;

    fn document(&mut self) -> &mut MemoryDocument {
        &mut self.document
    }

    fn frames(&mut self) -> &mut MemoryFrames {
        &mut self.frames
    }

    fn gestures(&mut self) -> &mut MemoryListeners {
        &mut self.listeners
    }
}
