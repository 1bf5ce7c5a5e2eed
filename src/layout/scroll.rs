//! Persistent scroll state for `Scrollable` nodes.
//!
//! A `Scrollable`'s offset must survive across frames — state objects
//! outlive the ephemeral widget that observes them — so it lives here
//! rather than on the render tree.

use std::collections::HashMap;

use crate::geometry::Rect;
use crate::widget::WidgetId;

/// Scroll state for a single `Scrollable` widget: its content extent,
/// viewport extent, and current offset. Offsets are clamped to
/// `[0, content_extent - viewport_extent]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollState {
    /// Horizontal scroll offset in cells.
    pub offset_x: i32,
    /// Vertical scroll offset in cells.
    pub offset_y: i32,
    /// Total content width in cells.
    pub content_width: i32,
    /// Total content height in cells.
    pub content_height: i32,
    /// Viewport width in cells.
    pub viewport_width: i32,
    /// Viewport height in cells.
    pub viewport_height: i32,
}

impl ScrollState {
    /// Create a new scroll state with a zero offset.
    pub const fn new(
        content_width: i32,
        content_height: i32,
        viewport_width: i32,
        viewport_height: i32,
    ) -> Self {
        Self {
            offset_x: 0,
            offset_y: 0,
            content_width,
            content_height,
            viewport_width,
            viewport_height,
        }
    }

    /// Whether horizontal scrolling is possible.
    pub const fn can_scroll_x(&self) -> bool {
        self.content_width > self.viewport_width
    }

    /// Whether vertical scrolling is possible.
    pub const fn can_scroll_y(&self) -> bool {
        self.content_height > self.viewport_height
    }

    /// Maximum horizontal scroll offset.
    pub fn max_offset_x(&self) -> i32 {
        (self.content_width - self.viewport_width).max(0)
    }

    /// Maximum vertical scroll offset.
    pub fn max_offset_y(&self) -> i32 {
        (self.content_height - self.viewport_height).max(0)
    }

    /// Re-measure the content/viewport extent this frame, re-clamping
    /// the existing offset rather than resetting it (so a rebuild that
    /// doesn't change content size preserves scroll position).
    pub fn remeasure(&mut self, content_width: i32, content_height: i32, viewport_width: i32, viewport_height: i32) {
        self.content_width = content_width;
        self.content_height = content_height;
        self.viewport_width = viewport_width;
        self.viewport_height = viewport_height;
        self.offset_x = self.offset_x.clamp(0, self.max_offset_x());
        self.offset_y = self.offset_y.clamp(0, self.max_offset_y());
    }

    /// Scroll by a relative offset, clamping to the valid range.
    pub fn scroll_by(&mut self, dx: i32, dy: i32) {
        self.offset_x = (self.offset_x + dx).clamp(0, self.max_offset_x());
        self.offset_y = (self.offset_y + dy).clamp(0, self.max_offset_y());
    }

    /// Scroll to an absolute position, clamping to the valid range.
    pub fn scroll_to(&mut self, x: i32, y: i32) {
        self.offset_x = x.clamp(0, self.max_offset_x());
        self.offset_y = y.clamp(0, self.max_offset_y());
    }

    /// Scroll the minimum amount necessary so that `target` (in content
    /// coordinates) is fully within the viewport.
    pub fn scroll_into_view(&mut self, target: Rect) {
        let vx0 = self.offset_x;
        let vy0 = self.offset_y;
        let vx1 = vx0 + self.viewport_width;
        let vy1 = vy0 + self.viewport_height;
        let tx0 = i32::from(target.position.x);
        let ty0 = i32::from(target.position.y);
        let tx1 = tx0 + i32::from(target.size.width);
        let ty1 = ty0 + i32::from(target.size.height);

        let mut new_x = self.offset_x;
        if tx0 < vx0 {
            new_x = tx0;
        } else if tx1 > vx1 {
            new_x = tx1 - self.viewport_width;
        }
        let mut new_y = self.offset_y;
        if ty0 < vy0 {
            new_y = ty0;
        } else if ty1 > vy1 {
            new_y = ty1 - self.viewport_height;
        }
        self.scroll_to(new_x, new_y);
    }

    /// The visible content rectangle, in content coordinates.
    pub fn visible_rect(&self) -> Rect {
        Rect::new(
            self.offset_x.max(0) as u16,
            self.offset_y.max(0) as u16,
            self.viewport_width.max(0) as u16,
            self.viewport_height.max(0) as u16,
        )
    }
}

/// Keys scroll state by the owning `Scrollable` widget's id, so state
/// persists across rebuilds of an otherwise-ephemeral widget tree.
#[derive(Default)]
pub struct ScrollManager {
    regions: HashMap<WidgetId, ScrollState>,
}

impl ScrollManager {
    /// Create an empty scroll manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch or create the scroll state for `widget_id`, re-measuring
    /// it against this frame's content/viewport extents.
    pub fn remeasure(
        &mut self,
        widget_id: &str,
        content_width: i32,
        content_height: i32,
        viewport_width: i32,
        viewport_height: i32,
    ) -> ScrollState {
        let state = self
            .regions
            .entry(widget_id.to_string())
            .or_insert_with(|| ScrollState::new(content_width, content_height, viewport_width, viewport_height));
        state.remeasure(content_width, content_height, viewport_width, viewport_height);
        *state
    }

    /// Get the scroll state for a widget, if registered.
    pub fn get(&self, widget_id: &str) -> Option<&ScrollState> {
        self.regions.get(widget_id)
    }

    /// Get a mutable handle to a widget's scroll state, if registered.
    pub fn get_mut(&mut self, widget_id: &str) -> Option<&mut ScrollState> {
        self.regions.get_mut(widget_id)
    }

    /// Drop scroll state for a widget no longer present in the tree.
    pub fn remove(&mut self, widget_id: &str) {
        self.regions.remove(widget_id);
    }

    /// Drop all scroll state whose id is not in `live_ids` (called once
    /// per frame after build, so state for removed `Scrollable`s
    /// doesn't leak forever).
    pub fn retain(&mut self, live_ids: &std::collections::HashSet<WidgetId>) {
        self.regions.retain(|id, _| live_ids.contains(id));
    }
}
