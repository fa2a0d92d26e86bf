//! Declarative layout model supplied by embedders.
//!
//! A layout is a tree of [`LayoutGroup`]s and [`LayoutLeaf`]s. Groups split
//! their container into rows or columns; every item carries a [`Size`] that
//! is either a fixed pixel quantity or a proportional `fr` share of whatever
//! space the fixed items leave over.
//!
//! The model is plain data. All bookkeeping (parent links, fixed-size sums,
//! current sizes) lives in [`crate::LayoutIndex`].

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use gridsplit_backend::Axis;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Unique identifier of a group or leaf.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl From<String> for ItemId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl PartialEq<str> for ItemId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ItemId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Track direction of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Children sit side by side; bars move horizontally.
    Columns,
    /// Children are stacked; bars move vertically.
    Rows,
}

impl Direction {
    /// Physical axis the group's tracks are laid out along.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Columns => Axis::Horizontal,
            Self::Rows => Axis::Vertical,
        }
    }
}

/// Size of one track: absolute pixels or a flexible `fr` share.
///
/// Serialized as its CSS spelling (`"120px"`, `"1.5fr"`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Size {
    Px(f64),
    Fr(f64),
}

impl Size {
    #[must_use]
    pub const fn px(value: f64) -> Self {
        Self::Px(value)
    }

    #[must_use]
    pub const fn fr(value: f64) -> Self {
        Self::Fr(value)
    }

    /// Whether the size is an absolute pixel quantity.
    #[must_use]
    pub const fn is_fixed(self) -> bool {
        matches!(self, Self::Px(_))
    }

    /// Numeric value regardless of unit.
    #[must_use]
    pub const fn value(self) -> f64 {
        match self {
            Self::Px(value) | Self::Fr(value) => value,
        }
    }

    /// Pixel value for fixed sizes.
    #[must_use]
    pub const fn fixed_px(self) -> Option<f64> {
        match self {
            Self::Px(value) => Some(value),
            Self::Fr(_) => None,
        }
    }

    /// Flex units for flexible sizes.
    #[must_use]
    pub const fn flex_units(self) -> Option<f64> {
        match self {
            Self::Fr(value) => Some(value),
            Self::Px(_) => None,
        }
    }

    /// Sizes must be finite and non-negative.
    #[must_use]
    pub fn is_valid(self) -> bool {
        let value = self.value();
        value.is_finite() && value >= 0.0
    }

    /// Parse the CSS spelling of a size.
    pub fn parse(input: &str) -> Result<Self, SizeParseError> {
        let trimmed = input.trim();
        let (number, unit) = if let Some(number) = trimmed.strip_suffix("px") {
            (number, Self::Px as fn(f64) -> Self)
        } else if let Some(number) = trimmed.strip_suffix("fr") {
            (number, Self::Fr as fn(f64) -> Self)
        } else {
            return Err(SizeParseError {
                input: input.to_owned(),
                reason: SizeParseReason::MissingUnit,
            });
        };
        let value = number
            .trim_end()
            .parse::<f64>()
            .map_err(|_| SizeParseError {
                input: input.to_owned(),
                reason: SizeParseReason::InvalidNumber,
            })?;
        let size = unit(value);
        if !size.is_valid() {
            return Err(SizeParseError {
                input: input.to_owned(),
                reason: SizeParseReason::OutOfRange,
            });
        }
        Ok(size)
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::Fr(1.0)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(value) => write!(f, "{}px", format_css_number(*value)),
            Self::Fr(value) => write!(f, "{}fr", format_css_number(*value)),
        }
    }
}

impl FromStr for Size {
    type Err = SizeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Size {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Size {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(D::Error::custom)
    }
}

/// Why a size string was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeParseReason {
    MissingUnit,
    InvalidNumber,
    OutOfRange,
}

/// Error returned by [`Size::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeParseError {
    pub input: String,
    pub reason: SizeParseReason,
}

impl fmt::Display for SizeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self.reason {
            SizeParseReason::MissingUnit => "expected a `px` or `fr` unit",
            SizeParseReason::InvalidNumber => "invalid number",
            SizeParseReason::OutOfRange => "value must be finite and non-negative",
        };
        write!(f, "invalid size {:?}: {reason}", self.input)
    }
}

impl std::error::Error for SizeParseError {}

/// Format a CSS number with at most four decimals and no trailing zeros.
#[must_use]
pub fn format_css_number(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    if rounded == 0.0 {
        return "0".to_owned();
    }
    let mut text = format!("{rounded:.4}");
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    text
}

/// Settings for the bar rendered after an item inside its parent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DragBar {
    /// Hidden bars keep a zero-width track and cannot be dragged.
    #[serde(default)]
    pub hidden: bool,
    /// Track size in pixels; the configured default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    /// Accessible part name exposed on the bar element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part: Option<String>,
}

impl DragBar {
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            hidden: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn sized(px: f64) -> Self {
        Self {
            size: Some(px),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_part(mut self, part: impl Into<String>) -> Self {
        self.part = Some(part.into());
        self
    }
}

/// Edge offsets used to pin an item to a viewport edge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sticky {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
}

/// A partition with no children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutLeaf {
    pub id: ItemId,
    pub size: Size,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drag_bar: Option<DragBar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticky: Option<Sticky>,
}

impl LayoutLeaf {
    #[must_use]
    pub fn new(id: impl Into<ItemId>, size: Size) -> Self {
        Self {
            id: id.into(),
            size,
            drag_bar: None,
            sticky: None,
        }
    }

    #[must_use]
    pub fn with_drag_bar(mut self, drag_bar: DragBar) -> Self {
        self.drag_bar = Some(drag_bar);
        self
    }

    #[must_use]
    pub fn with_sticky(mut self, sticky: Sticky) -> Self {
        self.sticky = Some(sticky);
        self
    }
}

/// A container splitting its space among ordered children.
///
/// `size` and `drag_bar` describe the group's own track inside its parent
/// and are ignored on the root group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutGroup {
    pub id: ItemId,
    pub direction: Direction,
    #[serde(default)]
    pub size: Size,
    #[serde(default)]
    pub items: Vec<LayoutItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drag_bar: Option<DragBar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticky: Option<Sticky>,
}

impl LayoutGroup {
    #[must_use]
    pub fn new(id: impl Into<ItemId>, direction: Direction) -> Self {
        Self {
            id: id.into(),
            direction,
            size: Size::default(),
            items: Vec::new(),
            drag_bar: None,
            sticky: None,
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn with_item(mut self, item: impl Into<LayoutItem>) -> Self {
        self.items.push(item.into());
        self
    }

    #[must_use]
    pub fn with_items<I>(mut self, items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<LayoutItem>,
    {
        self.items.extend(items.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_drag_bar(mut self, drag_bar: DragBar) -> Self {
        self.drag_bar = Some(drag_bar);
        self
    }

    #[must_use]
    pub fn with_sticky(mut self, sticky: Sticky) -> Self {
        self.sticky = Some(sticky);
        self
    }
}

/// Node of the layout tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutItem {
    Group(LayoutGroup),
    Leaf(LayoutLeaf),
}

impl LayoutItem {
    #[must_use]
    pub fn id(&self) -> &ItemId {
        match self {
            Self::Group(group) => &group.id,
            Self::Leaf(leaf) => &leaf.id,
        }
    }

    #[must_use]
    pub fn size(&self) -> Size {
        match self {
            Self::Group(group) => group.size,
            Self::Leaf(leaf) => leaf.size,
        }
    }

    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }
}

impl From<LayoutLeaf> for LayoutItem {
    fn from(leaf: LayoutLeaf) -> Self {
        Self::Leaf(leaf)
    }
}

impl From<LayoutGroup> for LayoutItem {
    fn from(group: LayoutGroup) -> Self {
        Self::Group(group)
    }
}
