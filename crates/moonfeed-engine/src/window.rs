//! Windowed rendering of the feed.
//!
//! Only the rows intersecting the viewport, plus [`OVERSCAN`] rows on each
//! side, are materialized. Everything else is represented by the two spacer
//! heights of a [`Window`], so the total scroll extent stays exact.

use std::ops::Range;

use tracing::{debug, trace};

use crate::config::FollowPolicy;
use crate::layout::RowLayout;
use crate::measure::{RowMeasurementCache, RowState};

/// Rows rendered beyond each edge of the viewport.
pub const OVERSCAN: usize = 3;

/// Size of the feed container, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Result of one layout pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    /// Rows intersecting the viewport.
    pub visible: Range<usize>,
    /// `visible` widened by the overscan; the rows to materialize.
    pub rendered: Range<usize>,
    /// Effective scroll offset after clamping.
    pub scroll_offset: u64,
    /// Reserved space above the first rendered row.
    pub top_spacer: u64,
    /// Reserved space below the last rendered row.
    pub bottom_spacer: u64,
    pub total_height: u64,
}

impl Window {
    pub fn rendered_count(&self) -> usize {
        self.rendered.len()
    }

    pub fn contains(&self, row: usize) -> bool {
        self.visible.contains(&row)
    }
}

/// Compute the rows to render for a viewport.
///
/// `scroll_offset` is clamped to `[0, total_height - viewport_height]`.
/// Defined for every input: an empty feed or a zero-height viewport yields
/// empty ranges.
pub fn compute_window(
    total_rows: usize,
    viewport_height: u32,
    scroll_offset: u64,
    layout: &RowLayout,
    overscan: usize,
) -> Window {
    let total_rows = total_rows.min(layout.len());
    let total_height = layout.offset_of(total_rows);
    let max_scroll = total_height.saturating_sub(u64::from(viewport_height));
    let scroll_offset = scroll_offset.min(max_scroll);

    if total_rows == 0 || viewport_height == 0 || total_height == 0 {
        return Window {
            visible: 0..0,
            rendered: 0..0,
            scroll_offset,
            top_spacer: 0,
            bottom_spacer: total_height,
            total_height,
        };
    }

    let last_row = total_rows - 1;
    let first = layout.row_at_offset(scroll_offset).min(last_row);
    let bottom_edge = scroll_offset + u64::from(viewport_height) - 1;
    let last = layout.row_at_offset(bottom_edge).min(last_row);

    let visible = first..last + 1;
    let rendered = first.saturating_sub(overscan)..(last + 1 + overscan).min(total_rows);
    let top_spacer = layout.offset_of(rendered.start);
    let bottom_spacer = total_height - layout.offset_of(rendered.end);

    Window {
        visible,
        rendered,
        scroll_offset,
        top_spacer,
        bottom_spacer,
        total_height,
    }
}

/// Scroll state and row geometry of one feed view.
///
/// Owns the [`RowMeasurementCache`] together with the offset tree derived
/// from it; the two are only updated through this type so they never drift.
#[derive(Debug, Clone)]
pub struct WindowedRenderer {
    cache: RowMeasurementCache,
    layout: RowLayout,
    viewport: Viewport,
    scroll_offset: u64,
    follow: FollowPolicy,
    /// Whether the view is anchored to the bottom edge.
    pinned: bool,
    peak_rendered: usize,
}

impl WindowedRenderer {
    pub fn new(default_row_height: u32, follow: FollowPolicy) -> Self {
        Self {
            cache: RowMeasurementCache::new(default_row_height),
            layout: RowLayout::new(),
            viewport: Viewport::default(),
            scroll_offset: 0,
            follow,
            pinned: true,
            peak_rendered: 0,
        }
    }

    pub fn row_count(&self) -> usize {
        self.layout.len()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn cache(&self) -> &RowMeasurementCache {
        &self.cache
    }

    pub fn total_height(&self) -> u64 {
        self.layout.total_height()
    }

    pub fn row_top(&self, row: usize) -> u64 {
        self.layout.offset_of(row)
    }

    pub fn row_state(&self, row: usize) -> RowState {
        self.cache.row_state(row)
    }

    /// Largest number of rows a single pass has materialized so far.
    pub fn peak_rendered(&self) -> usize {
        self.peak_rendered
    }

    fn max_scroll(&self) -> u64 {
        self.layout
            .total_height()
            .saturating_sub(u64::from(self.viewport.height))
    }

    pub fn is_at_bottom(&self) -> bool {
        self.scroll_offset >= self.max_scroll()
    }

    /// Add a row at the end of the feed and follow it if the policy says so.
    pub fn push_row(&mut self) {
        let row = self.layout.len();
        self.layout.push(self.cache.get(row));
        let follow = match self.follow {
            FollowPolicy::Always => true,
            FollowPolicy::WhenAtBottom => self.pinned,
        };
        if follow {
            self.scroll_to_bottom();
        }
    }

    /// Replace all rows with `count` unmeasured ones. Used when the filtered
    /// list is rebuilt and row indices no longer mean the same content.
    pub fn reset_rows(&mut self, count: usize) {
        self.cache.invalidate_all();
        self.layout = RowLayout::uniform(count, self.cache.default_height());
        debug!("Feed layout reset to {} unmeasured rows", count);
        self.scroll_to_bottom();
    }

    /// Record the observed height of `row`. Rows below it shift; rows above
    /// keep their offsets. Returns false for rows that do not exist.
    pub fn record_height(&mut self, row: usize, height: u32) -> bool {
        if row >= self.layout.len() {
            trace!("Ignoring measurement for missing row {}", row);
            return false;
        }
        let previous = self.cache.set(row, height);
        if previous == height {
            return true;
        }
        let row_top = self.layout.offset_of(row);
        self.layout.set_height(row, height);

        if self.pinned {
            self.scroll_to_bottom();
        } else if row_top < self.scroll_offset {
            // A row above the viewport changed size; keep the visible rows
            // where they are on screen.
            let delta = i64::from(height) - i64::from(previous);
            self.scroll_offset = self.scroll_offset.saturating_add_signed(delta).min(self.max_scroll());
        }
        true
    }

    /// Resize the viewport. A width change drops every measurement because
    /// wrapped rows change height.
    pub fn set_viewport(&mut self, viewport: Viewport) -> bool {
        let width_changed = viewport.width != self.viewport.width;
        self.viewport = viewport;
        if width_changed && self.cache.measured_count() > 0 {
            debug!("Viewport width now {}, dropping {} row measurements", viewport.width, self.cache.measured_count());
            self.cache.invalidate_all();
            self.layout = RowLayout::uniform(self.layout.len(), self.cache.default_height());
        }
        if self.pinned {
            self.scroll_to_bottom();
        } else {
            self.scroll_offset = self.scroll_offset.min(self.max_scroll());
        }
        width_changed
    }

    /// User scroll to an absolute offset.
    pub fn scroll_to(&mut self, offset: u64) {
        self.scroll_offset = offset.min(self.max_scroll());
        self.pinned = self.is_at_bottom();
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = self.max_scroll();
        self.pinned = true;
    }

    /// Compute the current window.
    pub fn window(&mut self) -> Window {
        let window = compute_window(
            self.layout.len(),
            self.viewport.height,
            self.scroll_offset,
            &self.layout,
            OVERSCAN,
        );
        self.peak_rendered = self.peak_rendered.max(window.rendered_count());
        window
    }
}
