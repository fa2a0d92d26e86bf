//! Splitter engine: owns the layout index and runs the resize state machine.
//!
//! The engine is host-driven and single-threaded. Every resize entry point
//! returns a [`ResizeTransition`] with a monotonically increasing id, so the
//! embedder can log or replay the exact sequence of state changes.
//!
//! ```text
//!            begin_pointer_resize
//!   Idle ───────────────────────────▶ Dragging ──┐ pointer_move / on_frame
//!    ▲                                   │  ▲    │
//!    │  pointer_up / cancel / disconnect │  └────┘
//!    └───────────────────────────────────┘
//! ```
//!
//! Pointer samples are coalesced to one application per frame. The delta of
//! each application is measured from the last applied coordinate, so a
//! superseded sample is never lost. Keyboard steps bypass batching and are
//! applied immediately.

use gridsplit_backend::{
    FrameHandle, FrameScheduler, GestureListeners, LayoutDocument, PointerPosition, SplitterHost,
};
use serde::{Deserialize, Serialize};

use crate::config::SplitterConfig;
use crate::grid::{GridTemplateOptions, bar_footprint};
use crate::index::{LayoutIndex, ModelError};
use crate::model::{LayoutGroup, LayoutLeaf};
use crate::mutation::{
    AddOutcome, MutationError, MutationFailure, MutationKind, Placement, RemoveOutcome,
};
use crate::resize::{
    BarPair, DragSnapshot, ResizeApplied, ResizeDirection, ResizeNoopReason, apply_resize,
    resolve_bar,
};

/// Coarse phase of the resize machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizePhase {
    Idle,
    Dragging,
}

/// Why an active drag ended without a pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    PointerCancel,
    Blur,
    VisibilityHidden,
    LostPointerCapture,
    Disconnected,
    ModelReplaced,
    Programmatic,
}

/// What one resize entry point did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResizeOutcome {
    DragStarted {
        pair: BarPair,
        origin: f64,
    },
    SampleScheduled {
        frame: FrameHandle,
        coalesced: bool,
    },
    Resized(ResizeApplied),
    Released {
        pair: BarPair,
        flushed: Option<ResizeApplied>,
    },
    Canceled {
        pair: BarPair,
        reason: CancelReason,
    },
    KeyboardApplied {
        direction: ResizeDirection,
        applied: ResizeApplied,
    },
    Noop {
        reason: ResizeNoopReason,
    },
}

/// One state-machine transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResizeTransition {
    pub transition_id: u64,
    pub from: ResizePhase,
    pub to: ResizePhase,
    pub outcome: ResizeOutcome,
}

impl ResizeTransition {
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        matches!(self.outcome, ResizeOutcome::Noop { .. })
    }

    /// Sizes written by this transition, if any.
    #[must_use]
    pub fn applied(&self) -> Option<&ResizeApplied> {
        match &self.outcome {
            ResizeOutcome::Resized(applied)
            | ResizeOutcome::KeyboardApplied { applied, .. }
            | ResizeOutcome::Released {
                flushed: Some(applied),
                ..
            } => Some(applied),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingSample {
    coordinate: f64,
    frame: FrameHandle,
}

#[derive(Debug, Clone, PartialEq)]
struct DragSession {
    snapshot: DragSnapshot,
    last_applied: f64,
    pending: Option<PendingSample>,
}

#[derive(Debug, Clone, PartialEq, Default)]
enum ResizeState {
    #[default]
    Idle,
    Dragging(DragSession),
}

impl ResizeState {
    fn session(&self) -> Option<&DragSession> {
        match self {
            Self::Idle => None,
            Self::Dragging(session) => Some(session),
        }
    }
}

fn render_group<H: SplitterHost>(
    host: &mut H,
    index: &LayoutIndex,
    group_id: &str,
    options: GridTemplateOptions,
) -> bool {
    let (Some(direction), Some(template)) = (
        index.direction(group_id),
        index.grid_template(group_id, options),
    ) else {
        return false;
    };
    host.document()
        .set_track_list(group_id, direction.axis(), &template);
    true
}

fn log_rejection(err: MutationError) -> MutationError {
    #[cfg(feature = "tracing")]
    tracing::warn!(kind = ?err.kind, reason = %err.reason, "layout mutation rejected");
    err
}

/// Layout splitter bound to a host.
pub struct SplitterEngine<H: SplitterHost> {
    host: H,
    config: SplitterConfig,
    index: Option<LayoutIndex>,
    state: ResizeState,
    transition_counter: u64,
}

impl<H: SplitterHost> SplitterEngine<H> {
    /// Engine with no layout; call [`set_model`](Self::set_model) next.
    #[must_use]
    pub fn new(host: H, config: SplitterConfig) -> Self {
        Self {
            host,
            config,
            index: None,
            state: ResizeState::Idle,
            transition_counter: 0,
        }
    }

    pub fn with_model(
        host: H,
        config: SplitterConfig,
        model: &LayoutGroup,
    ) -> Result<Self, ModelError> {
        let mut engine = Self::new(host, config);
        engine.set_model(model)?;
        Ok(engine)
    }

    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub const fn config(&self) -> &SplitterConfig {
        &self.config
    }

    #[must_use]
    pub const fn index(&self) -> Option<&LayoutIndex> {
        self.index.as_ref()
    }

    /// Current tree with current sizes.
    #[must_use]
    pub fn model(&self) -> Option<LayoutGroup> {
        self.index.as_ref().map(LayoutIndex::to_model)
    }

    #[must_use]
    pub const fn phase(&self) -> ResizePhase {
        match self.state {
            ResizeState::Idle => ResizePhase::Idle,
            ResizeState::Dragging(_) => ResizePhase::Dragging,
        }
    }

    /// Geometry captured for the active drag.
    #[must_use]
    pub fn active_drag(&self) -> Option<&DragSnapshot> {
        self.state.session().map(|session| &session.snapshot)
    }

    /// Frame the active drag is waiting on.
    #[must_use]
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.state
            .session()
            .and_then(|session| session.pending)
            .map(|pending| pending.frame)
    }

    #[must_use]
    pub fn transition_count(&self) -> u64 {
        self.transition_counter
    }

    #[must_use]
    pub fn grid_template(&self, group_id: &str) -> Option<String> {
        self.index
            .as_ref()?
            .grid_template(group_id, self.config.grid_template_options())
    }

    /// Replace the layout wholesale.
    ///
    /// Any active drag is cancelled first. On error the engine holds no
    /// layout.
    pub fn set_model(&mut self, model: &LayoutGroup) -> Result<(), ModelError> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("splitter.set_model", root = %model.id).entered();

        if self.phase() == ResizePhase::Dragging {
            let _ = self.cancel(CancelReason::ModelReplaced);
        }
        self.index = None;
        let index = LayoutIndex::build(model).inspect_err(|_err| {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_err, "layout model rejected");
        })?;
        self.index = Some(index);
        self.refresh_layout();
        Ok(())
    }

    /// Push every group's track list to the host, parents before children.
    ///
    /// Returns the number of groups rendered.
    pub fn refresh_layout(&mut self) -> usize {
        let Some(index) = self.index.as_ref() else {
            return 0;
        };
        let options = self.config.grid_template_options();
        index
            .groups_preorder()
            .iter()
            .filter(|group_id| render_group(&mut self.host, index, group_id.as_str(), options))
            .count()
    }

    fn drag_parent_conflict(&self, kind: MutationKind, touched: &str) -> Option<MutationError> {
        let session = self.state.session()?;
        (session.snapshot.pair.parent == touched).then(|| {
            MutationError::new(
                kind,
                MutationFailure::DragInProgress {
                    id: session.snapshot.pair.parent.clone(),
                },
            )
        })
    }

    /// Insert a leaf next to `sibling` and re-render `parent`.
    pub fn add_sibling_leaf(
        &mut self,
        parent: &str,
        sibling: &str,
        placement: Placement,
        leaf: LayoutLeaf,
        take_half_space: bool,
    ) -> Result<AddOutcome, MutationError> {
        let kind = MutationKind::AddSiblingLeaf;
        if let Some(err) = self.drag_parent_conflict(kind, parent) {
            return Err(log_rejection(err));
        }
        let Some(index) = self.index.as_mut() else {
            return Err(log_rejection(MutationError::new(kind, MutationFailure::NoLayout)));
        };
        let outcome = match index.add_sibling_leaf(parent, sibling, placement, leaf, take_half_space)
        {
            Ok(outcome) => outcome,
            Err(err) => return Err(log_rejection(err)),
        };
        let options = self.config.grid_template_options();
        render_group(&mut self.host, index, parent, options);
        Ok(outcome)
    }

    /// Remove `id` (cascading through emptied groups) and re-render the
    /// surviving parent.
    pub fn remove_item(&mut self, id: &str) -> Result<RemoveOutcome, MutationError> {
        let kind = MutationKind::RemoveItem;
        let Some(index) = self.index.as_ref() else {
            return Err(log_rejection(MutationError::new(kind, MutationFailure::NoLayout)));
        };
        let plan = match index.removal_plan(id) {
            Ok(plan) => plan,
            Err(err) => return Err(log_rejection(err)),
        };
        if let Some(session) = self.state.session() {
            let drag_parent = session.snapshot.pair.parent.as_str();
            if plan.parent == drag_parent || index.is_within(drag_parent, plan.top.as_str()) {
                let err = MutationError::new(
                    kind,
                    MutationFailure::DragInProgress {
                        id: session.snapshot.pair.parent.clone(),
                    },
                );
                return Err(log_rejection(err));
            }
        }

        let Some(index) = self.index.as_mut() else {
            return Err(log_rejection(MutationError::new(kind, MutationFailure::NoLayout)));
        };
        let outcome = match index.remove_item(id) {
            Ok(outcome) => outcome,
            Err(err) => return Err(log_rejection(err)),
        };
        let options = self.config.grid_template_options();
        render_group(&mut self.host, index, outcome.parent.as_str(), options);
        Ok(outcome)
    }

    fn capture_snapshot(&mut self, bar: &str) -> Result<DragSnapshot, ResizeNoopReason> {
        let Some(index) = self.index.as_ref() else {
            return Err(ResizeNoopReason::NoLayout);
        };
        let pair = resolve_bar(index, bar)?;
        let options = self.config.grid_template_options();
        let bar_footprint = index
            .children(pair.parent.as_str())
            .map_or(0.0, |items| bar_footprint(items, index, options));
        let document = self.host.document();
        Ok(DragSnapshot {
            container_size: document.container_size(pair.parent.as_str(), pair.axis),
            writing_direction: document.writing_direction(),
            fixed_sizes_sum: index.fixed_sizes_sum(pair.parent.as_str()).unwrap_or(0.0),
            bar_footprint,
            pair,
        })
    }

    fn apply_and_render(
        &mut self,
        snapshot: &mut DragSnapshot,
        increment_px: f64,
    ) -> Result<ResizeApplied, ResizeNoopReason> {
        let Some(index) = self.index.as_mut() else {
            return Err(ResizeNoopReason::NoLayout);
        };
        let applied = apply_resize(index, snapshot, increment_px)?;
        let options = self.config.grid_template_options();
        render_group(&mut self.host, index, applied.parent.as_str(), options);
        Ok(applied)
    }

    fn transition(&mut self, from: ResizePhase, outcome: ResizeOutcome) -> ResizeTransition {
        self.transition_counter = self.transition_counter.saturating_add(1);
        ResizeTransition {
            transition_id: self.transition_counter,
            from,
            to: self.phase(),
            outcome,
        }
    }

    fn noop(&mut self, reason: ResizeNoopReason) -> ResizeTransition {
        #[cfg(feature = "tracing")]
        tracing::debug!(reason = reason.as_str(), "resize ignored");
        let phase = self.phase();
        self.transition(phase, ResizeOutcome::Noop { reason })
    }

    /// Pointer went down on the bar following `bar`.
    ///
    /// Captures the drag geometry and attaches window gesture listeners.
    pub fn begin_pointer_resize(
        &mut self,
        bar: &str,
        position: PointerPosition,
    ) -> ResizeTransition {
        if self.phase() == ResizePhase::Dragging {
            return self.noop(ResizeNoopReason::ActiveDragInProgress);
        }
        let snapshot = match self.capture_snapshot(bar) {
            Ok(snapshot) => snapshot,
            Err(reason) => return self.noop(reason),
        };
        let origin = position.along(snapshot.pair.axis);
        let pair = snapshot.pair.clone();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            parent = %pair.parent,
            start = %pair.start,
            end = %pair.end,
            container_size = snapshot.container_size,
            origin,
            "drag started"
        );

        self.host.gestures().attach_gesture_listeners();
        self.state = ResizeState::Dragging(DragSession {
            snapshot,
            last_applied: origin,
            pending: None,
        });
        self.transition(ResizePhase::Idle, ResizeOutcome::DragStarted { pair, origin })
    }

    /// Record a pointer sample and schedule it for the next frame.
    ///
    /// A sample arriving before the pending frame fires replaces it.
    pub fn pointer_move(&mut self, position: PointerPosition) -> ResizeTransition {
        let outcome = match &mut self.state {
            ResizeState::Idle => None,
            ResizeState::Dragging(session) => {
                let coordinate = position.along(session.snapshot.pair.axis);
                let coalesced = match session.pending.take() {
                    Some(pending) => {
                        self.host.frames().cancel_frame(pending.frame);
                        true
                    }
                    None => false,
                };
                let frame = self.host.frames().request_frame();
                session.pending = Some(PendingSample { coordinate, frame });
                Some(ResizeOutcome::SampleScheduled { frame, coalesced })
            }
        };
        match outcome {
            Some(outcome) => self.transition(ResizePhase::Dragging, outcome),
            None => self.noop(ResizeNoopReason::IdleWithoutActiveDrag),
        }
    }

    /// Frame callback from the host scheduler.
    pub fn on_frame(&mut self, frame: FrameHandle) -> ResizeTransition {
        let ResizeState::Dragging(mut session) = std::mem::take(&mut self.state) else {
            return self.noop(ResizeNoopReason::IdleWithoutActiveDrag);
        };
        let result = match session.pending {
            Some(pending) if pending.frame == frame => {
                session.pending = None;
                let delta = pending.coordinate - session.last_applied;
                session.last_applied = pending.coordinate;
                self.apply_and_render(&mut session.snapshot, delta)
            }
            _ => Err(ResizeNoopReason::StaleFrame),
        };
        self.state = ResizeState::Dragging(session);
        match result {
            Ok(applied) => self.transition(ResizePhase::Dragging, ResizeOutcome::Resized(applied)),
            Err(reason) => self.noop(reason),
        }
    }

    /// Pointer released: apply the final coordinate and return to idle.
    pub fn pointer_up(&mut self, position: PointerPosition) -> ResizeTransition {
        let ResizeState::Dragging(mut session) = std::mem::take(&mut self.state) else {
            return self.noop(ResizeNoopReason::IdleWithoutActiveDrag);
        };
        if let Some(pending) = session.pending.take() {
            self.host.frames().cancel_frame(pending.frame);
        }
        let coordinate = position.along(session.snapshot.pair.axis);
        let delta = coordinate - session.last_applied;
        let flushed = match self.apply_and_render(&mut session.snapshot, delta) {
            Ok(applied) => Some(applied),
            Err(_reason) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(reason = _reason.as_str(), "release without final update");
                None
            }
        };
        self.host.gestures().detach_gesture_listeners();
        self.transition(
            ResizePhase::Dragging,
            ResizeOutcome::Released {
                pair: session.snapshot.pair,
                flushed,
            },
        )
    }

    /// Abort the active drag without applying the pending sample.
    pub fn cancel(&mut self, reason: CancelReason) -> ResizeTransition {
        let ResizeState::Dragging(session) = std::mem::take(&mut self.state) else {
            return self.noop(ResizeNoopReason::IdleWithoutActiveDrag);
        };
        if let Some(pending) = session.pending {
            self.host.frames().cancel_frame(pending.frame);
        }
        self.host.gestures().detach_gesture_listeners();

        #[cfg(feature = "tracing")]
        tracing::debug!(?reason, parent = %session.snapshot.pair.parent, "drag canceled");

        self.transition(
            ResizePhase::Dragging,
            ResizeOutcome::Canceled {
                pair: session.snapshot.pair,
                reason,
            },
        )
    }

    /// Host element detached: release everything the drag holds.
    pub fn disconnect(&mut self) -> Option<ResizeTransition> {
        (self.phase() == ResizePhase::Dragging).then(|| self.cancel(CancelReason::Disconnected))
    }

    /// One keyboard step on the bar following `bar`, applied immediately.
    pub fn keyboard_resize(
        &mut self,
        bar: &str,
        direction: ResizeDirection,
        large: bool,
    ) -> ResizeTransition {
        if self.phase() == ResizePhase::Dragging {
            return self.noop(ResizeNoopReason::ActiveDragInProgress);
        }
        let mut snapshot = match self.capture_snapshot(bar) {
            Ok(snapshot) => snapshot,
            Err(reason) => return self.noop(reason),
        };
        let step = self.config.keyboard_step(large) * direction.sign();
        match self.apply_and_render(&mut snapshot, step) {
            Ok(applied) => self.transition(
                ResizePhase::Idle,
                ResizeOutcome::KeyboardApplied { direction, applied },
            ),
            Err(reason) => self.noop(reason),
        }
    }
}

impl<H: SplitterHost> Drop for SplitterEngine<H> {
    fn drop(&mut self) {
        let _ = self.disconnect();
    }
}

impl<H: SplitterHost + std::fmt::Debug> std::fmt::Debug for SplitterEngine<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplitterEngine")
            .field("host", &self.host)
            .field("config", &self.config)
            .field("index", &self.index)
            .field("phase", &self.phase())
            .field("transition_counter", &self.transition_counter)
            .finish()
    }
}
