//! Derived id-keyed arena over the layout model.
//!
//! The index is the single source of truth for sizes once a model has been
//! supplied. Each node records its parent id (no owning back references)
//! and its current size; groups additionally record the ordered ids of their
//! children and a running sum of the pixel footprint of fixed-size
//! descendants attributed to them.
//!
//! # Attribution
//!
//! A fixed item's pixel size is added to each ancestor group walking upward.
//! The walk stops after the first ancestor that is itself fixed-size: that
//! group's own pixel size is all its ancestors see. The root group never
//! counts as fixed, so without fixed-size groups on the path every ancestor
//! receives exactly the item's pixel size.

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::model::{
    Direction, DragBar, ItemId, LayoutGroup, LayoutItem, LayoutLeaf, Size, Sticky,
};

const SUM_TOLERANCE: f64 = 1e-6;

/// Group-specific index data.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupEntry {
    direction: Direction,
    items: Vec<ItemId>,
    fixed_sizes_sum: f64,
}

impl GroupEntry {
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// Pixel footprint of fixed-size descendants attributed to this group.
    #[must_use]
    pub const fn fixed_sizes_sum(&self) -> f64 {
        self.fixed_sizes_sum
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryKind {
    Leaf,
    Group(GroupEntry),
}

/// Extended entry for one node.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    parent: Option<ItemId>,
    actual_size: Size,
    drag_bar: Option<DragBar>,
    sticky: Option<Sticky>,
    kind: EntryKind,
}

impl IndexEntry {
    #[must_use]
    pub fn parent(&self) -> Option<&ItemId> {
        self.parent.as_ref()
    }

    #[must_use]
    pub const fn actual_size(&self) -> Size {
        self.actual_size
    }

    #[must_use]
    pub fn drag_bar(&self) -> Option<&DragBar> {
        self.drag_bar.as_ref()
    }

    #[must_use]
    pub fn sticky(&self) -> Option<&Sticky> {
        self.sticky.as_ref()
    }

    #[must_use]
    pub const fn kind(&self) -> &EntryKind {
        &self.kind
    }

    #[must_use]
    pub const fn group(&self) -> Option<&GroupEntry> {
        match &self.kind {
            EntryKind::Group(group) => Some(group),
            EntryKind::Leaf => None,
        }
    }

    #[must_use]
    pub const fn is_group(&self) -> bool {
        matches!(self.kind, EntryKind::Group(_))
    }

    fn group_mut(&mut self) -> Option<&mut GroupEntry> {
        match &mut self.kind {
            EntryKind::Group(group) => Some(group),
            EntryKind::Leaf => None,
        }
    }
}

/// Malformed model or index corruption.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    EmptyId,
    DuplicateId {
        id: ItemId,
    },
    InvalidSize {
        id: ItemId,
        size: Size,
    },
    InvalidDragBarSize {
        id: ItemId,
        size: f64,
    },
    MissingChild {
        parent: ItemId,
        child: ItemId,
    },
    ParentMismatch {
        id: ItemId,
        expected: Option<ItemId>,
        actual: Option<ItemId>,
    },
    UnreachableNode {
        id: ItemId,
    },
    FixedSumDrift {
        group: ItemId,
        expected: f64,
        actual: f64,
    },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "layout item id must not be empty"),
            Self::DuplicateId { id } => write!(f, "duplicate layout item id {id:?}"),
            Self::InvalidSize { id, size } => {
                write!(f, "item {id:?} has invalid size {}", size.value())
            }
            Self::InvalidDragBarSize { id, size } => {
                write!(f, "item {id:?} has invalid drag bar size {size}")
            }
            Self::MissingChild { parent, child } => {
                write!(f, "group {parent:?} lists unknown child {child:?}")
            }
            Self::ParentMismatch {
                id,
                expected,
                actual,
            } => write!(
                f,
                "item {id:?} has parent {actual:?} but is listed under {expected:?}"
            ),
            Self::UnreachableNode { id } => {
                write!(f, "item {id:?} is not reachable from the root")
            }
            Self::FixedSumDrift {
                group,
                expected,
                actual,
            } => write!(
                f,
                "group {group:?} fixed size sum drifted: expected {expected}, found {actual}"
            ),
        }
    }
}

impl std::error::Error for ModelError {}

/// Validate the node-local fields of a leaf before it enters the index.
pub(crate) fn validate_leaf(leaf: &LayoutLeaf) -> Result<(), ModelError> {
    validate_node(&leaf.id, leaf.size, leaf.drag_bar.as_ref())
}

fn validate_node(id: &ItemId, size: Size, drag_bar: Option<&DragBar>) -> Result<(), ModelError> {
    if id.as_str().is_empty() {
        return Err(ModelError::EmptyId);
    }
    if !size.is_valid() {
        return Err(ModelError::InvalidSize {
            id: id.clone(),
            size,
        });
    }
    if let Some(bar_size) = drag_bar.and_then(|bar| bar.size)
        && !(bar_size.is_finite() && bar_size >= 0.0)
    {
        return Err(ModelError::InvalidDragBarSize {
            id: id.clone(),
            size: bar_size,
        });
    }
    Ok(())
}

/// Id-keyed arena derived from a [`LayoutGroup`].
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutIndex {
    root: ItemId,
    entries: FxHashMap<ItemId, IndexEntry>,
}

impl LayoutIndex {
    /// Build the index with a depth-first traversal of `root`.
    pub fn build(root: &LayoutGroup) -> Result<Self, ModelError> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("layout_index.build", root = %root.id).entered();

        let mut index = Self {
            root: root.id.clone(),
            entries: FxHashMap::default(),
        };
        index.insert_group(root, None)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            nodes = index.entries.len(),
            root_fixed_sizes_sum = index.root_fixed_sizes_sum(),
            "layout index built"
        );
        Ok(index)
    }

    /// Insert a group and its subtree, returning the footprint it
    /// contributes to its parent.
    fn insert_group(
        &mut self,
        group: &LayoutGroup,
        parent: Option<&ItemId>,
    ) -> Result<f64, ModelError> {
        validate_node(&group.id, group.size, group.drag_bar.as_ref())?;
        let items = group.items.iter().map(|item| item.id().clone()).collect();
        self.insert_entry(
            &group.id,
            IndexEntry {
                parent: parent.cloned(),
                actual_size: group.size,
                drag_bar: group.drag_bar.clone(),
                sticky: group.sticky.clone(),
                kind: EntryKind::Group(GroupEntry {
                    direction: group.direction,
                    items,
                    fixed_sizes_sum: 0.0,
                }),
            },
        )?;

        let mut sum = 0.0;
        for child in &group.items {
            sum += match child {
                LayoutItem::Leaf(leaf) => self.insert_leaf(leaf, &group.id)?,
                LayoutItem::Group(nested) => self.insert_group(nested, Some(&group.id))?,
            };
        }
        if let Some(entry) = self.entries.get_mut(group.id.as_str())
            && let Some(group_entry) = entry.group_mut()
        {
            group_entry.fixed_sizes_sum = sum;
        }

        Ok(match (parent, group.size) {
            (Some(_), Size::Px(px)) => px,
            _ => sum,
        })
    }

    fn insert_leaf(&mut self, leaf: &LayoutLeaf, parent: &ItemId) -> Result<f64, ModelError> {
        validate_leaf(leaf)?;
        self.insert_entry(
            &leaf.id,
            IndexEntry {
                parent: Some(parent.clone()),
                actual_size: leaf.size,
                drag_bar: leaf.drag_bar.clone(),
                sticky: leaf.sticky.clone(),
                kind: EntryKind::Leaf,
            },
        )?;
        Ok(leaf.size.fixed_px().unwrap_or(0.0))
    }

    fn insert_entry(&mut self, id: &ItemId, entry: IndexEntry) -> Result<(), ModelError> {
        if self.entries.contains_key(id.as_str()) {
            return Err(ModelError::DuplicateId { id: id.clone() });
        }
        self.entries.insert(id.clone(), entry);
        Ok(())
    }

    #[must_use]
    pub fn root(&self) -> &ItemId {
        &self.root
    }

    /// Number of indexed nodes, the root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    #[must_use]
    pub fn entry(&self, id: &str) -> Option<&IndexEntry> {
        self.entries.get(id)
    }

    #[must_use]
    pub fn parent(&self, id: &str) -> Option<&ItemId> {
        self.entries.get(id).and_then(IndexEntry::parent)
    }

    #[must_use]
    pub fn actual_size(&self, id: &str) -> Option<Size> {
        self.entries.get(id).map(IndexEntry::actual_size)
    }

    /// Ordered child ids of a group.
    #[must_use]
    pub fn children(&self, group_id: &str) -> Option<&[ItemId]> {
        self.entries
            .get(group_id)
            .and_then(IndexEntry::group)
            .map(GroupEntry::items)
    }

    #[must_use]
    pub fn direction(&self, group_id: &str) -> Option<Direction> {
        self.entries
            .get(group_id)
            .and_then(IndexEntry::group)
            .map(GroupEntry::direction)
    }

    #[must_use]
    pub fn fixed_sizes_sum(&self, group_id: &str) -> Option<f64> {
        self.entries
            .get(group_id)
            .and_then(IndexEntry::group)
            .map(GroupEntry::fixed_sizes_sum)
    }

    /// Root accumulator: the root group's attributed fixed footprint.
    #[must_use]
    pub fn root_fixed_sizes_sum(&self) -> f64 {
        self.fixed_sizes_sum(self.root.as_str()).unwrap_or(0.0)
    }

    /// Sum of `fr` units over a group's direct flexible children.
    #[must_use]
    pub fn total_flex(&self, group_id: &str) -> Option<f64> {
        let items = self.children(group_id)?;
        Some(
            items
                .iter()
                .filter_map(|id| self.actual_size(id.as_str()))
                .filter_map(Size::flex_units)
                .sum(),
        )
    }

    /// Whether `id` occupies a fixed pixel track. The root never does.
    #[must_use]
    pub fn is_fixed_item(&self, id: &str) -> bool {
        id != self.root.as_str()
            && self
                .actual_size(id)
                .is_some_and(|size| size.is_fixed())
    }

    /// Ancestor group ids, nearest first, ending at the root.
    #[must_use]
    pub fn ancestors(&self, id: &str) -> Vec<ItemId> {
        let mut chain = Vec::new();
        let mut cursor = self.parent(id);
        while let Some(parent) = cursor {
            chain.push(parent.clone());
            if chain.len() > self.entries.len() {
                break;
            }
            cursor = self.parent(parent.as_str());
        }
        chain
    }

    /// Groups that receive `id`'s fixed footprint, nearest first.
    ///
    /// The chain ends at the first fixed-size ancestor or at the root.
    #[must_use]
    pub fn attribution_chain(&self, id: &str) -> Vec<ItemId> {
        let mut chain = Vec::new();
        for ancestor in self.ancestors(id) {
            let boundary = self.is_fixed_item(ancestor.as_str());
            chain.push(ancestor);
            if boundary {
                break;
            }
        }
        chain
    }

    /// Pixel footprint `id` contributes to its parent's sum.
    #[must_use]
    pub fn footprint(&self, id: &str) -> f64 {
        let Some(entry) = self.entries.get(id) else {
            return 0.0;
        };
        match (entry.actual_size, &entry.kind) {
            (Size::Px(px), _) if id != self.root.as_str() => px,
            (_, EntryKind::Group(group)) => group.fixed_sizes_sum,
            _ => 0.0,
        }
    }

    /// Apply `delta` pixels along `id`'s attribution chain.
    ///
    /// Returns the portion that reached the root accumulator.
    pub(crate) fn propagate_fixed_delta(&mut self, id: &str, delta: f64) -> f64 {
        if delta == 0.0 {
            return 0.0;
        }
        let mut root_delta = 0.0;
        for group_id in self.attribution_chain(id) {
            if group_id == self.root {
                root_delta = delta;
            }
            if let Some(group) = self
                .entries
                .get_mut(group_id.as_str())
                .and_then(IndexEntry::group_mut)
            {
                group.fixed_sizes_sum += delta;
            }
        }
        root_delta
    }

    pub(crate) fn set_actual_size(&mut self, id: &str, size: Size) {
        if let Some(entry) = self.entries.get_mut(id) {
            entry.actual_size = size;
        }
    }

    pub(crate) fn insert_child(
        &mut self,
        parent: &str,
        position: usize,
        leaf: &LayoutLeaf,
    ) -> Result<(), ModelError> {
        let parent_id = ItemId::new(parent);
        self.insert_leaf(leaf, &parent_id)?;
        if let Some(group) = self.entries.get_mut(parent).and_then(IndexEntry::group_mut) {
            let position = position.min(group.items.len());
            group.items.insert(position, leaf.id.clone());
        }
        Ok(())
    }

    /// Detach `id` from its parent and drop its whole subtree.
    ///
    /// Returns the removed ids in preorder.
    pub(crate) fn detach_subtree(&mut self, id: &str) -> Vec<ItemId> {
        let removed = self.subtree_ids(id);
        if let Some(parent) = self.parent(id).cloned()
            && let Some(group) = self
                .entries
                .get_mut(parent.as_str())
                .and_then(IndexEntry::group_mut)
        {
            group.items.retain(|child| child.as_str() != id);
        }
        for removed_id in &removed {
            self.entries.remove(removed_id.as_str());
        }
        removed
    }

    /// `id` and all its descendants, preorder.
    #[must_use]
    pub fn subtree_ids(&self, id: &str) -> Vec<ItemId> {
        let Some((key, _)) = self.entries.get_key_value(id) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut stack = vec![key.clone()];
        while let Some(current) = stack.pop() {
            if let Some(children) = self.children(current.as_str()) {
                stack.extend(children.iter().rev().cloned());
            }
            out.push(current);
        }
        out
    }

    /// Whether `ancestor` is `id` itself or one of its ancestors.
    #[must_use]
    pub fn is_within(&self, id: &str, ancestor: &str) -> bool {
        if id == ancestor {
            return self.contains(id);
        }
        self.ancestors(id)
            .iter()
            .any(|group| group.as_str() == ancestor)
    }

    /// Group ids in depth-first preorder starting at the root.
    #[must_use]
    pub fn groups_preorder(&self) -> Vec<ItemId> {
        self.subtree_ids(self.root.as_str())
            .into_iter()
            .filter(|id| self.entries.get(id.as_str()).is_some_and(IndexEntry::is_group))
            .collect()
    }

    /// Groups whose subtree holds no leaf, sorted by id.
    #[must_use]
    pub fn unrenderable_groups(&self) -> Vec<ItemId> {
        let mut out: Vec<ItemId> = self
            .groups_preorder()
            .into_iter()
            .filter(|group| {
                !self
                    .subtree_ids(group.as_str())
                    .iter()
                    .any(|id| self.entries.get(id.as_str()).is_some_and(|e| !e.is_group()))
            })
            .collect();
        out.sort();
        out
    }

    /// Export the current tree with current sizes.
    #[must_use]
    pub fn to_model(&self) -> LayoutGroup {
        match self.export_item(self.root.as_str()) {
            Some(LayoutItem::Group(group)) => group,
            _ => LayoutGroup::new(self.root.clone(), Direction::Columns),
        }
    }

    fn export_item(&self, id: &str) -> Option<LayoutItem> {
        let (key, entry) = self.entries.get_key_value(id)?;
        Some(match &entry.kind {
            EntryKind::Leaf => LayoutItem::Leaf(LayoutLeaf {
                id: key.clone(),
                size: entry.actual_size,
                drag_bar: entry.drag_bar.clone(),
                sticky: entry.sticky.clone(),
            }),
            EntryKind::Group(group) => LayoutItem::Group(LayoutGroup {
                id: key.clone(),
                direction: group.direction,
                size: entry.actual_size,
                items: group
                    .items
                    .iter()
                    .filter_map(|child| self.export_item(child.as_str()))
                    .collect(),
                drag_bar: entry.drag_bar.clone(),
                sticky: entry.sticky.clone(),
            }),
        })
    }

    /// Verify parent links, reachability, and fixed-size sums from scratch.
    pub fn check_invariants(&self) -> Result<(), ModelError> {
        let root = self
            .entries
            .get(self.root.as_str())
            .ok_or_else(|| ModelError::UnreachableNode {
                id: self.root.clone(),
            })?;
        if root.parent.is_some() {
            return Err(ModelError::ParentMismatch {
                id: self.root.clone(),
                expected: None,
                actual: root.parent.clone(),
            });
        }

        let mut visited: FxHashSet<&str> = FxHashSet::default();
        visited.insert(self.root.as_str());
        let mut stack = vec![&self.root];
        while let Some(group_id) = stack.pop() {
            let Some(children) = self.children(group_id.as_str()) else {
                continue;
            };
            for child in children {
                let entry = self
                    .entries
                    .get(child.as_str())
                    .ok_or_else(|| ModelError::MissingChild {
                        parent: group_id.clone(),
                        child: child.clone(),
                    })?;
                if entry.parent.as_ref() != Some(group_id) {
                    return Err(ModelError::ParentMismatch {
                        id: child.clone(),
                        expected: Some(group_id.clone()),
                        actual: entry.parent.clone(),
                    });
                }
                if !visited.insert(child.as_str()) {
                    return Err(ModelError::DuplicateId { id: child.clone() });
                }
                if entry.is_group() {
                    stack.push(child);
                }
            }
        }
        if visited.len() != self.entries.len() {
            let mut orphans: Vec<&ItemId> = self
                .entries
                .keys()
                .filter(|id| !visited.contains(id.as_str()))
                .collect();
            orphans.sort();
            if let Some(orphan) = orphans.first() {
                return Err(ModelError::UnreachableNode {
                    id: (*orphan).clone(),
                });
            }
        }

        self.check_fixed_sum(&self.root).map(|_| ())
    }

    /// Recompute the footprint of `id` bottom-up and compare stored sums.
    fn check_fixed_sum(&self, id: &ItemId) -> Result<f64, ModelError> {
        let Some(entry) = self.entries.get(id.as_str()) else {
            return Ok(0.0);
        };
        let EntryKind::Group(group) = &entry.kind else {
            return Ok(entry.actual_size.fixed_px().unwrap_or(0.0));
        };
        let mut expected = 0.0;
        for child in &group.items {
            expected += self.check_fixed_sum(child)?;
        }
        if (expected - group.fixed_sizes_sum).abs() > SUM_TOLERANCE {
            return Err(ModelError::FixedSumDrift {
                group: id.clone(),
                expected,
                actual: group.fixed_sizes_sum,
            });
        }
        Ok(match entry.actual_size {
            Size::Px(px) if *id != self.root => px,
            _ => expected,
        })
    }
}
