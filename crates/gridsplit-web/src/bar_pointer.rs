#![forbid(unsafe_code)]

//! Deterministic pointer-capture adapter for drag bars.
//!
//! Bridges browser pointer, focus, and frame callbacks into
//! [`SplitterEngine`] calls while enforcing:
//! - one active pointer at a time,
//! - explicit capture acquire/release commands for JS hosts, and
//! - cancellation on interruption paths (blur/visibility/lost-capture).
//!
//! Every call returns a [`BarPointerDispatch`] whose log entry records the
//! phase, the engine transition id, and why a signal was ignored.

use gridsplit_backend::{FrameHandle, PointerPosition, SplitterHost};
use gridsplit_layout::{
    CancelReason, ItemId, ResizeNoopReason, ResizeOutcome, ResizePhase, ResizeTransition,
    SplitterEngine,
};
use serde::{Deserialize, Serialize};

use crate::keyboard::{KeyInput, resize_direction};

/// Mouse button reported with a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarPointerButton {
    Primary,
    Middle,
    Secondary,
}

impl BarPointerButton {
    /// Map a DOM `PointerEvent.button` value.
    #[must_use]
    pub const fn from_dom_button(button: i16) -> Option<Self> {
        match button {
            0 => Some(Self::Primary),
            1 => Some(Self::Middle),
            2 => Some(Self::Secondary),
            _ => None,
        }
    }
}

/// Adapter configuration for bar pointer lifecycle handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarPointerConfig {
    /// Button required to begin a drag.
    pub activation_button: BarPointerButton,
    /// If true, pointer leave cancels a drag whose capture was requested but never acknowledged.
    pub cancel_on_leave_without_capture: bool,
}

impl Default for BarPointerConfig {
    fn default() -> Self {
        Self {
            activation_button: BarPointerButton::Primary,
            cancel_on_leave_without_capture: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureState {
    Requested,
    Acquired,
}

impl CaptureState {
    const fn is_acquired(self) -> bool {
        matches!(self, Self::Acquired)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActivePointer {
    pointer_id: u32,
    bar: ItemId,
    button: BarPointerButton,
    capture_state: CaptureState,
}

impl ActivePointer {
    fn release_command(&self) -> Option<BarCaptureCommand> {
        self.capture_state
            .is_acquired()
            .then_some(BarCaptureCommand::Release {
                pointer_id: self.pointer_id,
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
struct DispatchContext {
    phase: BarLifecyclePhase,
    pointer_id: Option<u32>,
    bar: Option<ItemId>,
    position: Option<PointerPosition>,
}

/// Host command for `setPointerCapture()` / `releasePointerCapture()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum BarCaptureCommand {
    Acquire { pointer_id: u32 },
    Release { pointer_id: u32 },
}

/// Lifecycle phase recorded for one adapter dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarLifecyclePhase {
    PointerDown,
    PointerMove,
    PointerUp,
    PointerCancel,
    PointerLeave,
    Blur,
    VisibilityHidden,
    LostPointerCapture,
    CaptureAcquired,
    AnimationFrame,
    KeyDown,
    Disconnect,
}

/// Why an incoming signal was not forwarded, or why the engine declined it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "ignored", content = "detail", rename_all = "snake_case")]
pub enum BarIgnoredReason {
    InvalidPointerId,
    ButtonNotAllowed,
    ButtonMismatch,
    ActivePointerAlreadyInProgress,
    NoActivePointer,
    PointerMismatch,
    LeaveWhileCaptured,
    /// The engine left the drag on its own (model replaced, bar removed).
    DragEndedElsewhere,
    UnknownBar,
    KeyNotMapped,
    EngineNoop(ResizeNoopReason),
}

/// Outcome category for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarLogOutcome {
    Forwarded,
    CaptureStateUpdated,
    Ignored(BarIgnoredReason),
}

/// Structured lifecycle log record for one dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarPointerLogEntry {
    pub phase: BarLifecyclePhase,
    pub transition_id: Option<u64>,
    pub pointer_id: Option<u32>,
    pub bar: Option<ItemId>,
    pub position: Option<PointerPosition>,
    pub capture_command: Option<BarCaptureCommand>,
    pub outcome: BarLogOutcome,
}

/// Result of one lifecycle dispatch.
///
/// `transition` is present whenever the engine was called, including when
/// it answered with a no-op.
#[derive(Debug, Clone, PartialEq)]
pub struct BarPointerDispatch {
    pub transition: Option<ResizeTransition>,
    pub capture_command: Option<BarCaptureCommand>,
    pub log: BarPointerLogEntry,
}

impl BarPointerDispatch {
    fn ignored(context: DispatchContext, reason: BarIgnoredReason) -> Self {
        Self::ignored_with(context, reason, None, None)
    }

    fn ignored_with(
        context: DispatchContext,
        reason: BarIgnoredReason,
        transition: Option<ResizeTransition>,
        capture_command: Option<BarCaptureCommand>,
    ) -> Self {
        let transition_id = transition.as_ref().map(|t| t.transition_id);
        Self {
            transition,
            capture_command,
            log: BarPointerLogEntry {
                phase: context.phase,
                transition_id,
                pointer_id: context.pointer_id,
                bar: context.bar,
                position: context.position,
                capture_command,
                outcome: BarLogOutcome::Ignored(reason),
            },
        }
    }

    fn capture_state_updated(phase: BarLifecyclePhase, pointer_id: u32, bar: ItemId) -> Self {
        Self {
            transition: None,
            capture_command: None,
            log: BarPointerLogEntry {
                phase,
                transition_id: None,
                pointer_id: Some(pointer_id),
                bar: Some(bar),
                position: None,
                capture_command: None,
                outcome: BarLogOutcome::CaptureStateUpdated,
            },
        }
    }

    /// The engine accepted the signal.
    #[must_use]
    pub const fn forwarded(&self) -> bool {
        matches!(self.log.outcome, BarLogOutcome::Forwarded)
    }

    #[must_use]
    pub const fn ignored_reason(&self) -> Option<BarIgnoredReason> {
        match self.log.outcome {
            BarLogOutcome::Ignored(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Pointer-capture adapter that owns a [`SplitterEngine`].
///
/// Capture commands are meant to be wired to DOM `setPointerCapture()` and
/// `releasePointerCapture()` on the bar element. A release is only emitted
/// after the host confirmed the capture via
/// [`capture_acquired`](Self::capture_acquired).
#[derive(Debug)]
pub struct BarPointerAdapter<H: SplitterHost> {
    engine: SplitterEngine<H>,
    config: BarPointerConfig,
    active: Option<ActivePointer>,
}

impl<H: SplitterHost> BarPointerAdapter<H> {
    #[must_use]
    pub fn new(engine: SplitterEngine<H>, config: BarPointerConfig) -> Self {
        Self {
            engine,
            config,
            active: None,
        }
    }

    #[must_use]
    pub const fn config(&self) -> BarPointerConfig {
        self.config
    }

    #[must_use]
    pub const fn engine(&self) -> &SplitterEngine<H> {
        &self.engine
    }

    /// Direct engine access for model edits.
    ///
    /// A drag the engine cancels through this handle is noticed on the next
    /// pointer signal.
    pub fn engine_mut(&mut self) -> &mut SplitterEngine<H> {
        &mut self.engine
    }

    #[must_use]
    pub fn into_engine(self) -> SplitterEngine<H> {
        self.engine
    }

    #[must_use]
    pub fn active_pointer_id(&self) -> Option<u32> {
        self.active.as_ref().map(|active| active.pointer_id)
    }

    #[must_use]
    pub fn active_bar(&self) -> Option<&ItemId> {
        self.active.as_ref().map(|active| &active.bar)
    }

    /// Handle pointer-down on the bar following `bar`.
    pub fn pointer_down(
        &mut self,
        bar: &str,
        pointer_id: u32,
        button: BarPointerButton,
        position: PointerPosition,
    ) -> BarPointerDispatch {
        let context = DispatchContext {
            phase: BarLifecyclePhase::PointerDown,
            pointer_id: Some(pointer_id),
            bar: Some(ItemId::from(bar)),
            position: Some(position),
        };
        if pointer_id == 0 {
            return BarPointerDispatch::ignored(context, BarIgnoredReason::InvalidPointerId);
        }
        if button != self.config.activation_button {
            return BarPointerDispatch::ignored(context, BarIgnoredReason::ButtonNotAllowed);
        }
        if self.active.is_some() {
            return BarPointerDispatch::ignored(
                context,
                BarIgnoredReason::ActivePointerAlreadyInProgress,
            );
        }

        let dispatch = self.forward(
            context,
            Some(BarCaptureCommand::Acquire { pointer_id }),
            |engine| engine.begin_pointer_resize(bar, position),
        );
        if dispatch.forwarded() {
            self.active = Some(ActivePointer {
                pointer_id,
                bar: ItemId::from(bar),
                button,
                capture_state: CaptureState::Requested,
            });
        }
        dispatch
    }

    /// Mark browser pointer capture as successfully acquired.
    pub fn capture_acquired(&mut self, pointer_id: u32) -> BarPointerDispatch {
        let phase = BarLifecyclePhase::CaptureAcquired;
        let mut active = match self.current(phase, Some(pointer_id), None) {
            Ok(active) => active,
            Err(dispatch) => return *dispatch,
        };
        active.capture_state = CaptureState::Acquired;
        let bar = active.bar.clone();
        self.active = Some(active);
        BarPointerDispatch::capture_state_updated(phase, pointer_id, bar)
    }

    /// Record a pointer sample; the engine applies it on the next frame.
    pub fn pointer_move(&mut self, pointer_id: u32, position: PointerPosition) -> BarPointerDispatch {
        let phase = BarLifecyclePhase::PointerMove;
        let active = match self.current(phase, Some(pointer_id), Some(position)) {
            Ok(active) => active,
            Err(dispatch) => return *dispatch,
        };
        self.forward(
            DispatchContext {
                phase,
                pointer_id: Some(pointer_id),
                bar: Some(active.bar),
                position: Some(position),
            },
            None,
            |engine| engine.pointer_move(position),
        )
    }

    /// `requestAnimationFrame` callback for a frame the engine scheduled.
    pub fn animation_frame(&mut self, frame: FrameHandle) -> BarPointerDispatch {
        let context = DispatchContext {
            phase: BarLifecyclePhase::AnimationFrame,
            pointer_id: self.active_pointer_id(),
            bar: self.active_bar().cloned(),
            position: None,
        };
        self.forward(context, None, |engine| engine.on_frame(frame))
    }

    /// Handle pointer-up and release capture for the active pointer.
    pub fn pointer_up(
        &mut self,
        pointer_id: u32,
        button: BarPointerButton,
        position: PointerPosition,
    ) -> BarPointerDispatch {
        let phase = BarLifecyclePhase::PointerUp;
        let active = match self.current(phase, Some(pointer_id), Some(position)) {
            Ok(active) => active,
            Err(dispatch) => return *dispatch,
        };
        if active.button != button {
            return BarPointerDispatch::ignored(
                DispatchContext {
                    phase,
                    pointer_id: Some(pointer_id),
                    bar: Some(active.bar),
                    position: Some(position),
                },
                BarIgnoredReason::ButtonMismatch,
            );
        }

        let command = active.release_command();
        let dispatch = self.forward(
            DispatchContext {
                phase,
                pointer_id: Some(pointer_id),
                bar: Some(active.bar),
                position: Some(position),
            },
            command,
            |engine| engine.pointer_up(position),
        );
        if dispatch.forwarded() {
            self.active = None;
        }
        dispatch
    }

    /// Handle browser pointer-cancel events.
    pub fn pointer_cancel(&mut self, pointer_id: Option<u32>) -> BarPointerDispatch {
        self.cancel_active(
            BarLifecyclePhase::PointerCancel,
            pointer_id,
            CancelReason::PointerCancel,
            true,
        )
    }

    /// Handle pointer-leave lifecycle events.
    pub fn pointer_leave(&mut self, pointer_id: u32) -> BarPointerDispatch {
        let phase = BarLifecyclePhase::PointerLeave;
        let active = match self.current(phase, Some(pointer_id), None) {
            Ok(active) => active,
            Err(dispatch) => return *dispatch,
        };

        if matches!(active.capture_state, CaptureState::Requested)
            && self.config.cancel_on_leave_without_capture
        {
            self.cancel_active(phase, Some(pointer_id), CancelReason::PointerCancel, true)
        } else {
            BarPointerDispatch::ignored(
                DispatchContext {
                    phase,
                    pointer_id: Some(pointer_id),
                    bar: Some(active.bar),
                    position: None,
                },
                BarIgnoredReason::LeaveWhileCaptured,
            )
        }
    }

    /// Handle window blur.
    pub fn blur(&mut self) -> BarPointerDispatch {
        self.cancel_active(BarLifecyclePhase::Blur, None, CancelReason::Blur, true)
    }

    /// Handle `visibilitychange` to hidden.
    pub fn visibility_hidden(&mut self) -> BarPointerDispatch {
        self.cancel_active(
            BarLifecyclePhase::VisibilityHidden,
            None,
            CancelReason::VisibilityHidden,
            true,
        )
    }

    /// Handle `lostpointercapture`; the browser already released, so no command.
    pub fn lost_pointer_capture(&mut self, pointer_id: u32) -> BarPointerDispatch {
        self.cancel_active(
            BarLifecyclePhase::LostPointerCapture,
            Some(pointer_id),
            CancelReason::LostPointerCapture,
            false,
        )
    }

    /// Keyboard step on a focused bar.
    ///
    /// Keys are ignored while a pointer drag is active.
    pub fn key_down(&mut self, bar: &str, input: KeyInput) -> BarPointerDispatch {
        let context = DispatchContext {
            phase: BarLifecyclePhase::KeyDown,
            pointer_id: None,
            bar: Some(ItemId::from(bar)),
            position: None,
        };
        if self.active.is_some() {
            return BarPointerDispatch::ignored(
                context,
                BarIgnoredReason::ActivePointerAlreadyInProgress,
            );
        }
        let axis = self.engine.index().and_then(|index| {
            let parent = index.parent(bar)?;
            index.direction(parent.as_str()).map(|d| d.axis())
        });
        let Some(axis) = axis else {
            return BarPointerDispatch::ignored(context, BarIgnoredReason::UnknownBar);
        };
        let Some(direction) = resize_direction(axis, input.key) else {
            return BarPointerDispatch::ignored(context, BarIgnoredReason::KeyNotMapped);
        };
        self.forward(context, None, |engine| {
            engine.keyboard_resize(bar, direction, input.shift)
        })
    }

    /// Host element detached: cancel any drag and release capture.
    pub fn disconnect(&mut self) -> BarPointerDispatch {
        let active = self.active.take();
        let context = DispatchContext {
            phase: BarLifecyclePhase::Disconnect,
            pointer_id: active.as_ref().map(|a| a.pointer_id),
            bar: active.as_ref().map(|a| a.bar.clone()),
            position: None,
        };
        let command = active.as_ref().and_then(ActivePointer::release_command);
        match self.engine.disconnect() {
            Some(transition) => Self::forwarded(context, command, transition),
            None => BarPointerDispatch::ignored_with(
                context,
                BarIgnoredReason::NoActivePointer,
                None,
                command,
            ),
        }
    }

    fn cancel_active(
        &mut self,
        phase: BarLifecyclePhase,
        pointer_id: Option<u32>,
        reason: CancelReason,
        release_capture: bool,
    ) -> BarPointerDispatch {
        let active = match self.current(phase, pointer_id, None) {
            Ok(active) => active,
            Err(dispatch) => return *dispatch,
        };
        let command = if release_capture {
            active.release_command()
        } else {
            None
        };
        let dispatch = self.forward(
            DispatchContext {
                phase,
                pointer_id: Some(active.pointer_id),
                bar: Some(active.bar),
                position: None,
            },
            command,
            |engine| engine.cancel(reason),
        );
        if dispatch.forwarded() {
            self.active = None;
        }
        dispatch
    }

    /// Active pointer matching `pointer_id`, or the dispatch explaining why not.
    ///
    /// Clears a pointer whose drag the engine already ended.
    fn current(
        &mut self,
        phase: BarLifecyclePhase,
        pointer_id: Option<u32>,
        position: Option<PointerPosition>,
    ) -> Result<ActivePointer, Box<BarPointerDispatch>> {
        let Some(active) = self.active.clone() else {
            return Err(Box::new(BarPointerDispatch::ignored(
                DispatchContext {
                    phase,
                    pointer_id,
                    bar: None,
                    position,
                },
                BarIgnoredReason::NoActivePointer,
            )));
        };
        let context = DispatchContext {
            phase,
            pointer_id: pointer_id.or(Some(active.pointer_id)),
            bar: Some(active.bar.clone()),
            position,
        };
        if let Some(id) = pointer_id
            && id != active.pointer_id
        {
            return Err(Box::new(BarPointerDispatch::ignored(
                context,
                BarIgnoredReason::PointerMismatch,
            )));
        }
        if self.engine.phase() == ResizePhase::Idle {
            self.active = None;
            return Err(Box::new(BarPointerDispatch::ignored_with(
                context,
                BarIgnoredReason::DragEndedElsewhere,
                None,
                active.release_command(),
            )));
        }
        Ok(active)
    }

    fn forward(
        &mut self,
        context: DispatchContext,
        capture_command: Option<BarCaptureCommand>,
        call: impl FnOnce(&mut SplitterEngine<H>) -> ResizeTransition,
    ) -> BarPointerDispatch {
        let transition = call(&mut self.engine);
        let dispatch = match transition.outcome {
            ResizeOutcome::Noop { reason } => BarPointerDispatch::ignored_with(
                context,
                BarIgnoredReason::EngineNoop(reason),
                Some(transition),
                None,
            ),
            _ => Self::forwarded(context, capture_command, transition),
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(
            phase = ?dispatch.log.phase,
            transition_id = ?dispatch.log.transition_id,
            outcome = ?dispatch.log.outcome,
            "bar pointer dispatch"
        );

        dispatch
    }

    fn forwarded(
        context: DispatchContext,
        capture_command: Option<BarCaptureCommand>,
        transition: ResizeTransition,
    ) -> BarPointerDispatch {
        BarPointerDispatch {
            capture_command,
            log: BarPointerLogEntry {
                phase: context.phase,
                transition_id: Some(transition.transition_id),
                pointer_id: context.pointer_id,
                bar: context.bar,
                position: context.position,
                capture_command,
                outcome: BarLogOutcome::Forwarded,
            },
            transition: Some(transition),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::BarKey;
    use crate::recording_host::{HostCall, RecordingHost};
    use pretty_assertions::assert_eq;
    use gridsplit_layout::{
        Direction, LayoutGroup, LayoutLeaf, ResizeDirection, Size, SplitterConfig,
    };

    fn pos(x: f64, y: f64) -> PointerPosition {
        PointerPosition::new(x, y)
    }

    fn adapter() -> BarPointerAdapter<RecordingHost> {
        let model = LayoutGroup::new("root", Direction::Columns)
            .with_item(LayoutLeaf::new("a", Size::px(100.0)))
            .with_item(LayoutLeaf::new("b", Size::fr(1.0)));
        let host = RecordingHost::new().with_container("root", 600.0);
        let engine = SplitterEngine::with_model(host, SplitterConfig::default(), &model)
            .expect("valid model");
        BarPointerAdapter::new(engine, BarPointerConfig::default())
    }

    #[test]
    fn pointer_down_starts_drag_and_requests_capture() {
        let mut adapter = adapter();
        let dispatch = adapter.pointer_down("a", 11, BarPointerButton::Primary, pos(100.0, 5.0));
        assert!(dispatch.forwarded());
        assert_eq!(
            dispatch.capture_command,
            Some(BarCaptureCommand::Acquire { pointer_id: 11 })
        );
        assert_eq!(adapter.active_pointer_id(), Some(11));
        assert_eq!(adapter.engine().phase(), ResizePhase::Dragging);
        assert!(matches!(
            dispatch.transition.map(|t| t.outcome),
            Some(ResizeOutcome::DragStarted { .. })
        ));
    }

    #[test]
    fn pointer_id_zero_and_wrong_button_are_ignored() {
        let mut adapter = adapter();
        let zero = adapter.pointer_down("a", 0, BarPointerButton::Primary, pos(0.0, 0.0));
        assert_eq!(
            zero.ignored_reason(),
            Some(BarIgnoredReason::InvalidPointerId)
        );
        let secondary = adapter.pointer_down("a", 3, BarPointerButton::Secondary, pos(0.0, 0.0));
        assert_eq!(
            secondary.ignored_reason(),
            Some(BarIgnoredReason::ButtonNotAllowed)
        );
        assert!(secondary.transition.is_none());
        assert_eq!(adapter.engine().transition_count(), 0);
    }

    #[test]
    fn unknown_bar_surfaces_engine_noop_without_capture() {
        let mut adapter = adapter();
        let dispatch = adapter.pointer_down("ghost", 1, BarPointerButton::Primary, pos(0.0, 0.0));
        assert_eq!(
            dispatch.ignored_reason(),
            Some(BarIgnoredReason::EngineNoop(ResizeNoopReason::UnknownBar))
        );
        assert_eq!(dispatch.capture_command, None);
        assert!(dispatch.transition.is_some());
        assert_eq!(adapter.active_pointer_id(), None);
    }

    #[test]
    fn second_pointer_is_rejected_while_active() {
        let mut adapter = adapter();
        let _ = adapter.pointer_down("a", 1, BarPointerButton::Primary, pos(0.0, 0.0));
        let second = adapter.pointer_down("a", 2, BarPointerButton::Primary, pos(0.0, 0.0));
        assert_eq!(
            second.ignored_reason(),
            Some(BarIgnoredReason::ActivePointerAlreadyInProgress)
        );
        let mismatch = adapter.pointer_move(2, pos(10.0, 0.0));
        assert_eq!(
            mismatch.ignored_reason(),
            Some(BarIgnoredReason::PointerMismatch)
        );
        assert!(adapter.engine().pending_frame().is_none());
    }

    #[test]
    fn move_then_frame_resizes() {
        let mut adapter = adapter();
        let _ = adapter.pointer_down("a", 7, BarPointerButton::Primary, pos(100.0, 0.0));
        let moved = adapter.pointer_move(7, pos(160.0, 0.0));
        let Some(ResizeOutcome::SampleScheduled { frame, coalesced }) =
            moved.transition.map(|t| t.outcome)
        else {
            panic!("move schedules a frame");
        };
        assert!(!coalesced);
        let applied = adapter.animation_frame(frame);
        assert!(applied.forwarded());
        assert_eq!(applied.log.pointer_id, Some(7));
        assert_eq!(adapter.engine().host().track("root"), Some("160px 4px 1fr"));
    }

    #[test]
    fn pointer_up_releases_only_acquired_capture() {
        let mut adapter = adapter();
        let _ = adapter.pointer_down("a", 4, BarPointerButton::Primary, pos(0.0, 0.0));
        let up = adapter.pointer_up(4, BarPointerButton::Primary, pos(0.0, 0.0));
        assert!(up.forwarded());
        assert_eq!(up.capture_command, None);

        let _ = adapter.pointer_down("a", 5, BarPointerButton::Primary, pos(0.0, 0.0));
        let acquired = adapter.capture_acquired(5);
        assert_eq!(acquired.log.outcome, BarLogOutcome::CaptureStateUpdated);
        let up = adapter.pointer_up(5, BarPointerButton::Primary, pos(20.0, 0.0));
        assert_eq!(
            up.capture_command,
            Some(BarCaptureCommand::Release { pointer_id: 5 })
        );
        assert_eq!(adapter.active_pointer_id(), None);
        assert_eq!(adapter.engine().phase(), ResizePhase::Idle);
    }

    #[test]
    fn pointer_up_with_wrong_button_keeps_drag() {
        let mut adapter = adapter();
        let _ = adapter.pointer_down("a", 4, BarPointerButton::Primary, pos(0.0, 0.0));
        let up = adapter.pointer_up(4, BarPointerButton::Secondary, pos(0.0, 0.0));
        assert_eq!(up.ignored_reason(), Some(BarIgnoredReason::ButtonMismatch));
        assert_eq!(adapter.engine().phase(), ResizePhase::Dragging);
    }

    #[test]
    fn lost_capture_cancels_without_release() {
        let mut adapter = adapter();
        let _ = adapter.pointer_down("a", 9, BarPointerButton::Primary, pos(0.0, 0.0));
        let _ = adapter.capture_acquired(9);
        let lost = adapter.lost_pointer_capture(9);
        assert_eq!(lost.capture_command, None);
        assert!(matches!(
            lost.transition.map(|t| t.outcome),
            Some(ResizeOutcome::Canceled {
                reason: CancelReason::LostPointerCapture,
                ..
            })
        ));
        assert_eq!(adapter.active_pointer_id(), None);
    }

    #[test]
    fn leave_cancels_before_capture_ack_only() {
        let mut adapter = adapter();
        let _ = adapter.pointer_down("a", 2, BarPointerButton::Primary, pos(0.0, 0.0));
        let leave = adapter.pointer_leave(2);
        assert!(leave.forwarded());
        assert_eq!(adapter.engine().phase(), ResizePhase::Idle);

        let _ = adapter.pointer_down("a", 3, BarPointerButton::Primary, pos(0.0, 0.0));
        let _ = adapter.capture_acquired(3);
        let leave = adapter.pointer_leave(3);
        assert_eq!(
            leave.ignored_reason(),
            Some(BarIgnoredReason::LeaveWhileCaptured)
        );
        assert_eq!(adapter.engine().phase(), ResizePhase::Dragging);
    }

    #[test]
    fn blur_releases_and_cancels() {
        let mut adapter = adapter();
        let _ = adapter.pointer_down("a", 6, BarPointerButton::Primary, pos(0.0, 0.0));
        let _ = adapter.capture_acquired(6);
        let blur = adapter.blur();
        assert_eq!(blur.log.pointer_id, Some(6));
        assert_eq!(
            blur.capture_command,
            Some(BarCaptureCommand::Release { pointer_id: 6 })
        );
        assert!(!adapter.engine().host().listeners_attached());
        let again = adapter.blur();
        assert_eq!(
            again.ignored_reason(),
            Some(BarIgnoredReason::NoActivePointer)
        );
    }

    #[test]
    fn engine_side_cancel_is_noticed_on_next_signal() {
        let mut adapter = adapter();
        let _ = adapter.pointer_down("a", 8, BarPointerButton::Primary, pos(0.0, 0.0));
        let _ = adapter.capture_acquired(8);
        let _ = adapter.engine_mut().cancel(CancelReason::Programmatic);
        let moved = adapter.pointer_move(8, pos(30.0, 0.0));
        assert_eq!(
            moved.ignored_reason(),
            Some(BarIgnoredReason::DragEndedElsewhere)
        );
        assert_eq!(
            moved.capture_command,
            Some(BarCaptureCommand::Release { pointer_id: 8 })
        );
        assert_eq!(adapter.active_pointer_id(), None);
    }

    #[test]
    fn key_down_maps_arrows_on_bar_axis() {
        let mut adapter = adapter();
        let right = adapter.key_down("a", KeyInput::new(BarKey::ArrowRight));
        assert!(matches!(
            right.transition.map(|t| t.outcome),
            Some(ResizeOutcome::KeyboardApplied {
                direction: ResizeDirection::Increase,
                ..
            })
        ));
        let large = adapter.key_down("a", KeyInput::shifted(BarKey::ArrowLeft));
        assert!(large.forwarded());
        assert_eq!(adapter.engine().host().track("root"), Some("60px 4px 1fr"));

        let up = adapter.key_down("a", KeyInput::new(BarKey::ArrowUp));
        assert_eq!(up.ignored_reason(), Some(BarIgnoredReason::KeyNotMapped));
        let ghost = adapter.key_down("ghost", KeyInput::new(BarKey::ArrowRight));
        assert_eq!(ghost.ignored_reason(), Some(BarIgnoredReason::UnknownBar));
    }

    #[test]
    fn disconnect_releases_capture_and_detaches() {
        let mut adapter = adapter();
        let _ = adapter.pointer_down("a", 12, BarPointerButton::Primary, pos(0.0, 0.0));
        let _ = adapter.capture_acquired(12);
        let _ = adapter.pointer_move(12, pos(40.0, 0.0));
        let dispatch = adapter.disconnect();
        assert!(dispatch.forwarded());
        assert_eq!(
            dispatch.capture_command,
            Some(BarCaptureCommand::Release { pointer_id: 12 })
        );
        let host = adapter.engine().host();
        assert!(host.pending_frames().is_empty());
        assert_eq!(host.calls().last(), Some(&HostCall::DetachListeners));
        assert_eq!(
            adapter.disconnect().ignored_reason(),
            Some(BarIgnoredReason::NoActivePointer)
        );
    }

    #[test]
    fn dom_buttons_map() {
        assert_eq!(
            BarPointerButton::from_dom_button(0),
            Some(BarPointerButton::Primary)
        );
        assert_eq!(
            BarPointerButton::from_dom_button(2),
            Some(BarPointerButton::Secondary)
        );
        assert_eq!(BarPointerButton::from_dom_button(4), None);
    }
}
