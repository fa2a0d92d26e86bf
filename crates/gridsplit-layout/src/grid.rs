//! CSS track lists for rendered groups.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::index::{IndexEntry, LayoutIndex};
use crate::model::{DragBar, ItemId, format_css_number};

/// Default pixel thickness of a visible bar track.
pub const DEFAULT_DRAG_BAR_PX: f64 = 4.0;

/// Knobs for [`grid_template`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridTemplateOptions {
    /// Emit a bar track between adjacent items.
    pub drag_bar_tracks: bool,
    /// Thickness used when a bar has no explicit size.
    pub default_drag_bar_px: f64,
}

impl Default for GridTemplateOptions {
    fn default() -> Self {
        Self {
            drag_bar_tracks: true,
            default_drag_bar_px: DEFAULT_DRAG_BAR_PX,
        }
    }
}

/// Pixel thickness of the bar track rendered after an item.
#[must_use]
pub fn bar_track_px(drag_bar: Option<&DragBar>, options: GridTemplateOptions) -> f64 {
    match drag_bar {
        Some(bar) if bar.hidden => 0.0,
        Some(DragBar {
            size: Some(size), ..
        }) => *size,
        _ => options.default_drag_bar_px,
    }
}

fn resolve<'a>(items: &[ItemId], index: &'a LayoutIndex) -> Vec<&'a IndexEntry> {
    items
        .iter()
        .filter_map(|id| index.entry(id.as_str()))
        .collect()
}

/// Track list for a group's ordered children.
///
/// Ids missing from the index are skipped. The last item never gets a
/// trailing bar track.
#[must_use]
pub fn grid_template(items: &[ItemId], index: &LayoutIndex, options: GridTemplateOptions) -> String {
    let entries = resolve(items, index);
    let last = entries.len().saturating_sub(1);
    let mut template = String::with_capacity(entries.len() * 12);
    for (position, entry) in entries.iter().enumerate() {
        if position > 0 {
            template.push(' ');
        }
        let _ = write!(template, "{}", entry.actual_size());
        if options.drag_bar_tracks && position < last {
            let bar = bar_track_px(entry.drag_bar(), options);
            let _ = write!(template, " {}px", format_css_number(bar));
        }
    }
    template
}

/// Total pixels taken by bar tracks among `items`.
#[must_use]
pub fn bar_footprint(items: &[ItemId], index: &LayoutIndex, options: GridTemplateOptions) -> f64 {
    if !options.drag_bar_tracks {
        return 0.0;
    }
    let entries = resolve(items, index);
    let Some((_, leading)) = entries.split_last() else {
        return 0.0;
    };
    leading
        .iter()
        .map(|entry| bar_track_px(entry.drag_bar(), options))
        .sum()
}

impl LayoutIndex {
    /// Track list for one group, or `None` when `group_id` is not a group.
    #[must_use]
    pub fn grid_template(&self, group_id: &str, options: GridTemplateOptions) -> Option<String> {
        self.children(group_id)
            .map(|items| grid_template(items, self, options))
    }
}
