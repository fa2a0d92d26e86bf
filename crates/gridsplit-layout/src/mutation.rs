//! Structural edits on the layout index: add a sibling leaf, remove an item.
//!
//! Both operations patch the index in place and keep every group's
//! fixed-size sum consistent with the attribution rule. Reported deltas are
//! the amounts that reached the root accumulator.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::index::{LayoutIndex, ModelError, validate_leaf};
use crate::model::{ItemId, LayoutLeaf, Size};

const DELTA_EPSILON: f64 = 1e-9;

/// Where a new leaf lands relative to its sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Before,
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    AddSiblingLeaf,
    RemoveItem,
}

/// Result of a successful add.
#[derive(Debug, Clone, PartialEq)]
pub struct AddOutcome {
    /// Position of the new leaf in its parent's items.
    pub inserted_at: usize,
    /// Pixels added to the root accumulator (`0.0` when not applicable).
    pub fixed_sizes_sum_increment: f64,
}

/// Root-level change caused by a removal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FixedSizesUpdate {
    /// No fixed sizes to update.
    NoUpdate,
    Decrement(f64),
}

impl FixedSizesUpdate {
    #[must_use]
    pub const fn amount(self) -> f64 {
        match self {
            Self::NoUpdate => 0.0,
            Self::Decrement(amount) => amount,
        }
    }
}

/// Result of a successful removal.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveOutcome {
    /// Surviving group the removed subtree was detached from.
    pub parent: ItemId,
    /// Every id dropped from the index, preorder from the detached node.
    pub removed: Vec<ItemId>,
    /// Groups removed because they became empty, nearest first.
    pub cascaded_removals: Vec<ItemId>,
    pub fixed_sizes_sum_decrement: FixedSizesUpdate,
}

impl RemoveOutcome {
    #[must_use]
    pub fn cascaded(&self) -> bool {
        !self.cascaded_removals.is_empty()
    }
}

/// Typed reason a mutation was refused.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationFailure {
    NoLayout,
    MissingParent { parent: ItemId },
    ParentNotGroup { parent: ItemId },
    MissingSibling { sibling: ItemId },
    SiblingNotInParent { parent: ItemId, sibling: ItemId },
    DuplicateId { id: ItemId },
    InvalidLeaf(ModelError),
    MissingItem { id: ItemId },
    CannotRemoveRoot { id: ItemId },
    DragInProgress { id: ItemId },
}

impl fmt::Display for MutationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLayout => write!(f, "no layout model has been set"),
            Self::MissingParent { parent } => write!(f, "parent {parent:?} not found"),
            Self::ParentNotGroup { parent } => write!(f, "parent {parent:?} is not a group"),
            Self::MissingSibling { sibling } => write!(f, "sibling {sibling:?} not found"),
            Self::SiblingNotInParent { parent, sibling } => {
                write!(f, "group {parent:?} does not contain sibling {sibling:?}")
            }
            Self::DuplicateId { id } => write!(f, "item id {id:?} already exists"),
            Self::InvalidLeaf(err) => write!(f, "invalid leaf: {err}"),
            Self::MissingItem { id } => write!(f, "item {id:?} not found"),
            Self::CannotRemoveRoot { id } => write!(f, "cannot remove root group {id:?}"),
            Self::DragInProgress { id } => {
                write!(f, "item {id:?} is part of an active resize drag")
            }
        }
    }
}

impl std::error::Error for MutationFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Self::InvalidLeaf(err) = self {
            return Some(err);
        }
        None
    }
}

/// Failed mutation with the operation that was attempted.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationError {
    pub kind: MutationKind,
    pub reason: MutationFailure,
}

impl MutationError {
    #[must_use]
    pub const fn new(kind: MutationKind, reason: MutationFailure) -> Self {
        Self { kind, reason }
    }
}

impl fmt::Display for MutationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} failed: {}", self.kind, self.reason)
    }
}

impl std::error::Error for MutationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.reason)
    }
}

/// What a removal would detach, computed without touching the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalPlan {
    /// Topmost node leaving the tree (the item or its highest emptied ancestor).
    pub top: ItemId,
    /// Surviving group `top` is detached from.
    pub parent: ItemId,
    pub cascaded: Vec<ItemId>,
}

impl LayoutIndex {
    /// Insert `leaf` next to `sibling` inside `parent`.
    pub fn add_sibling_leaf(
        &mut self,
        parent: &str,
        sibling: &str,
        placement: Placement,
        leaf: LayoutLeaf,
        take_half_space: bool,
    ) -> Result<AddOutcome, MutationError> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "layout.add_sibling_leaf",
            parent,
            sibling,
            leaf = %leaf.id,
            take_half_space
        )
        .entered();

        self.add_sibling_leaf_inner(parent, sibling, placement, leaf, take_half_space)
            .map_err(|reason| MutationError::new(MutationKind::AddSiblingLeaf, reason))
    }

    fn add_sibling_leaf_inner(
        &mut self,
        parent: &str,
        sibling: &str,
        placement: Placement,
        mut leaf: LayoutLeaf,
        take_half_space: bool,
    ) -> Result<AddOutcome, MutationFailure> {
        let entry = self.entry(parent).ok_or_else(|| MutationFailure::MissingParent {
            parent: ItemId::new(parent),
        })?;
        let items = entry
            .group()
            .ok_or_else(|| MutationFailure::ParentNotGroup {
                parent: ItemId::new(parent),
            })?
            .items();
        if !self.contains(sibling) {
            return Err(MutationFailure::MissingSibling {
                sibling: ItemId::new(sibling),
            });
        }
        let sibling_at = items
            .iter()
            .position(|id| id.as_str() == sibling)
            .ok_or_else(|| MutationFailure::SiblingNotInParent {
                parent: ItemId::new(parent),
                sibling: ItemId::new(sibling),
            })?;
        if self.contains(leaf.id.as_str()) {
            return Err(MutationFailure::DuplicateId { id: leaf.id });
        }
        validate_leaf(&leaf).map_err(MutationFailure::InvalidLeaf)?;

        let inserted_at = match placement {
            Placement::Before => sibling_at,
            Placement::After => sibling_at + 1,
        };
        if take_half_space && let Some(Size::Fr(fr)) = self.actual_size(sibling) {
            let half = fr / 2.0;
            self.set_actual_size(sibling, Size::Fr(half));
            leaf.size = Size::Fr(half);
        }

        self.insert_child(parent, inserted_at, &leaf)
            .map_err(MutationFailure::InvalidLeaf)?;
        let fixed_sizes_sum_increment = match leaf.size {
            Size::Px(px) => self.propagate_fixed_delta(leaf.id.as_str(), px),
            Size::Fr(_) => 0.0,
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(inserted_at, fixed_sizes_sum_increment, "leaf added");

        Ok(AddOutcome {
            inserted_at,
            fixed_sizes_sum_increment,
        })
    }

    /// Compute what removing `id` would detach, including cascades.
    pub fn removal_plan(&self, id: &str) -> Result<RemovalPlan, MutationError> {
        let fail = |reason| MutationError::new(MutationKind::RemoveItem, reason);
        if !self.contains(id) {
            return Err(fail(MutationFailure::MissingItem { id: ItemId::new(id) }));
        }
        if id == self.root().as_str() {
            return Err(fail(MutationFailure::CannotRemoveRoot { id: ItemId::new(id) }));
        }

        let mut top = ItemId::new(id);
        let mut cascaded = Vec::new();
        loop {
            let Some(parent) = self.parent(top.as_str()) else {
                return Err(fail(MutationFailure::MissingItem { id: top }));
            };
            let only_child = self
                .children(parent.as_str())
                .is_some_and(|items| items.len() == 1);
            if parent == self.root() || !only_child {
                return Ok(RemovalPlan {
                    parent: parent.clone(),
                    top,
                    cascaded,
                });
            }
            cascaded.push(parent.clone());
            top = parent.clone();
        }
    }

    /// Remove `id` and its subtree, cascading through emptied groups.
    pub fn remove_item(&mut self, id: &str) -> Result<RemoveOutcome, MutationError> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("layout.remove_item", id).entered();

        let plan = self.removal_plan(id)?;
        let footprint = self.footprint(plan.top.as_str());
        let root_delta = -self.propagate_fixed_delta(plan.top.as_str(), -footprint);
        let removed = self.detach_subtree(plan.top.as_str());
        let fixed_sizes_sum_decrement = if root_delta.abs() > DELTA_EPSILON {
            FixedSizesUpdate::Decrement(root_delta)
        } else {
            FixedSizesUpdate::NoUpdate
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            removed = removed.len(),
            cascaded = plan.cascaded.len(),
            decrement = fixed_sizes_sum_decrement.amount(),
            "item removed"
        );

        Ok(RemoveOutcome {
            parent: plan.parent,
            removed,
            cascaded_removals: plan.cascaded,
            fixed_sizes_sum_decrement,
        })
    }
}
