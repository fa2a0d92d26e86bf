//! Conserved size updates for the two siblings around a bar.
//!
//! A bar is addressed by the id of the item it follows (its start sibling);
//! the end sibling is the next item in the same group. Positive increments
//! grow the start sibling.

use std::fmt;

use gridsplit_backend::{Axis, WritingDirection};
use serde::{Deserialize, Serialize};

use crate::index::LayoutIndex;
use crate::model::{ItemId, Size};

const EPSILON: f64 = 1e-9;

/// Direction of a keyboard step along the bar's physical axis.
///
/// `Increase` moves the bar right (columns) or down (rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeDirection {
    Increase,
    Decrease,
}

impl ResizeDirection {
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Increase => 1.0,
            Self::Decrease => -1.0,
        }
    }
}

/// Why a resize request changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeNoopReason {
    NoLayout,
    IdleWithoutActiveDrag,
    ActiveDragInProgress,
    UnknownBar,
    NoSiblingAfterBar,
    HiddenBar,
    StaleFrame,
    ZeroContainerSize,
    NoAvailableSpace,
    SiblingsUnresolved,
    ZeroDelta,
    AtLimit,
}

impl ResizeNoopReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoLayout => "no_layout",
            Self::IdleWithoutActiveDrag => "idle_without_active_drag",
            Self::ActiveDragInProgress => "active_drag_in_progress",
            Self::UnknownBar => "unknown_bar",
            Self::NoSiblingAfterBar => "no_sibling_after_bar",
            Self::HiddenBar => "hidden_bar",
            Self::StaleFrame => "stale_frame",
            Self::ZeroContainerSize => "zero_container_size",
            Self::NoAvailableSpace => "no_available_space",
            Self::SiblingsUnresolved => "siblings_unresolved",
            Self::ZeroDelta => "zero_delta",
            Self::AtLimit => "at_limit",
        }
    }
}

impl fmt::Display for ResizeNoopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two siblings a bar resizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarPair {
    pub parent: ItemId,
    pub start: ItemId,
    pub end: ItemId,
    pub axis: Axis,
}

/// Geometry captured when a resize begins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragSnapshot {
    pub pair: BarPair,
    /// Parent container extent along the bar axis, in pixels.
    pub container_size: f64,
    /// Parent fixed-size sum, refreshed after each application.
    pub fixed_sizes_sum: f64,
    /// Pixels taken by the parent's bar tracks.
    pub bar_footprint: f64,
    pub writing_direction: WritingDirection,
}

impl DragSnapshot {
    /// Pixels left for flexible tracks.
    #[must_use]
    pub fn available_px(&self) -> f64 {
        self.container_size - self.fixed_sizes_sum - self.bar_footprint
    }

    /// Apply the writing-direction flip to a physical increment.
    #[must_use]
    pub fn signed_increment(&self, increment_px: f64) -> f64 {
        match self.pair.axis {
            Axis::Horizontal => increment_px * self.writing_direction.horizontal_sign(),
            Axis::Vertical => increment_px,
        }
    }
}

/// Sizes written by one successful application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResizeApplied {
    pub parent: ItemId,
    pub start: ItemId,
    pub end: ItemId,
    pub start_size: Size,
    pub end_size: Size,
    /// Pixels moved from the end sibling to the start sibling.
    pub applied_px: f64,
    /// Change of the root accumulator.
    pub root_fixed_sizes_delta: f64,
}

/// Resolve the bar that follows `bar_item`.
pub fn resolve_bar(index: &LayoutIndex, bar_item: &str) -> Result<BarPair, ResizeNoopReason> {
    let entry = index.entry(bar_item).ok_or(ResizeNoopReason::UnknownBar)?;
    if entry.drag_bar().is_some_and(|bar| bar.hidden) {
        return Err(ResizeNoopReason::HiddenBar);
    }
    let parent = entry.parent().ok_or(ResizeNoopReason::UnknownBar)?;
    let direction = index
        .direction(parent.as_str())
        .ok_or(ResizeNoopReason::UnknownBar)?;
    let items = index
        .children(parent.as_str())
        .ok_or(ResizeNoopReason::UnknownBar)?;
    let position = items
        .iter()
        .position(|id| id.as_str() == bar_item)
        .ok_or(ResizeNoopReason::SiblingsUnresolved)?;
    let end = items
        .get(position + 1)
        .ok_or(ResizeNoopReason::NoSiblingAfterBar)?;
    Ok(BarPair {
        parent: parent.clone(),
        start: items[position].clone(),
        end: end.clone(),
        axis: direction.axis(),
    })
}

fn still_adjacent(index: &LayoutIndex, pair: &BarPair) -> bool {
    index.children(pair.parent.as_str()).is_some_and(|items| {
        items
            .windows(2)
            .any(|window| window[0] == pair.start && window[1] == pair.end)
    })
}

/// Move `increment_px` (physical direction) from the end sibling to the start.
///
/// Both-flexible pairs trade `fr` units at the parent's current px-per-fr
/// ratio. Both-fixed pairs trade pixels. In a mixed pair only the fixed
/// sibling changes, bounded by the flexible sibling's pixel extent, and the
/// change is propagated as a fixed delta.
pub fn apply_resize(
    index: &mut LayoutIndex,
    snapshot: &mut DragSnapshot,
    increment_px: f64,
) -> Result<ResizeApplied, ResizeNoopReason> {
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!(
        "layout.apply_resize",
        parent = %snapshot.pair.parent,
        start = %snapshot.pair.start,
        increment_px
    )
    .entered();

    if !snapshot.container_size.is_finite() || snapshot.container_size <= 0.0 {
        return Err(ResizeNoopReason::ZeroContainerSize);
    }
    let signed = snapshot.signed_increment(increment_px);
    if !signed.is_finite() || signed.abs() < EPSILON {
        return Err(ResizeNoopReason::ZeroDelta);
    }
    if !still_adjacent(index, &snapshot.pair) {
        return Err(ResizeNoopReason::SiblingsUnresolved);
    }
    let pair = snapshot.pair.clone();
    let (Some(start_size), Some(end_size)) = (
        index.actual_size(pair.start.as_str()),
        index.actual_size(pair.end.as_str()),
    ) else {
        return Err(ResizeNoopReason::SiblingsUnresolved);
    };

    snapshot.fixed_sizes_sum = index.fixed_sizes_sum(pair.parent.as_str()).unwrap_or(0.0);
    let available = snapshot.available_px();
    let total_fr = index.total_flex(pair.parent.as_str()).unwrap_or(0.0);
    let fr_extent = |fr: f64| {
        if available > EPSILON && total_fr > EPSILON {
            fr / total_fr * available
        } else {
            0.0
        }
    };

    let (new_start, new_end, applied_px, root_delta) = match (start_size, end_size) {
        (Size::Fr(start), Size::Fr(end)) => {
            if available <= EPSILON || total_fr <= EPSILON {
                return Err(ResizeNoopReason::NoAvailableSpace);
            }
            let delta_fr = (signed * total_fr / available).clamp(-start, end);
            if delta_fr.abs() < EPSILON {
                return Err(ResizeNoopReason::AtLimit);
            }
            (
                Size::Fr(start + delta_fr),
                Size::Fr(end - delta_fr),
                delta_fr * available / total_fr,
                0.0,
            )
        }
        (Size::Px(start), Size::Px(end)) => {
            let delta = signed.clamp(-start, end);
            if delta.abs() < EPSILON {
                return Err(ResizeNoopReason::AtLimit);
            }
            let root_delta = index.propagate_fixed_delta(pair.start.as_str(), delta)
                + index.propagate_fixed_delta(pair.end.as_str(), -delta);
            (Size::Px(start + delta), Size::Px(end - delta), delta, root_delta)
        }
        (Size::Px(start), Size::Fr(end)) => {
            let delta = signed.clamp(-start, fr_extent(end));
            if delta.abs() < EPSILON {
                return Err(ResizeNoopReason::AtLimit);
            }
            let root_delta = index.propagate_fixed_delta(pair.start.as_str(), delta);
            (Size::Px(start + delta), Size::Fr(end), delta, root_delta)
        }
        (Size::Fr(start), Size::Px(end)) => {
            let delta = signed.clamp(-fr_extent(start), end);
            if delta.abs() < EPSILON {
                return Err(ResizeNoopReason::AtLimit);
            }
            let root_delta = index.propagate_fixed_delta(pair.end.as_str(), -delta);
            (Size::Fr(start), Size::Px(end - delta), delta, root_delta)
        }
    };
    index.set_actual_size(pair.start.as_str(), new_start);
    index.set_actual_size(pair.end.as_str(), new_end);
    snapshot.fixed_sizes_sum = index.fixed_sizes_sum(pair.parent.as_str()).unwrap_or(0.0);

    #[cfg(feature = "tracing")]
    tracing::debug!(
        start_size = %new_start,
        end_size = %new_end,
        applied_px,
        root_delta,
        "resize applied"
    );

    Ok(ResizeApplied {
        parent: pair.parent,
        start: pair.start,
        end: pair.end,
        start_size: new_start,
        end_size: new_end,
        applied_px,
        root_fixed_sizes_delta: root_delta,
    })
}
