//! Horizontal viewport: which center columns are worth rendering.

use std::sync::Arc;

use crate::columns::column::Column;

/// Extra pixels rendered on each side of the viewport.
pub const VIEWPORT_BUFFER: f32 = 200.0;

/// Tracks the horizontal scroll state and the center columns within it.
#[derive(Debug, Default, Clone)]
pub struct ColumnViewportService {
    scroll_width: f32,
    scroll_position: f32,
    viewport_left: f32,
    viewport_right: f32,
    cols_in_viewport: Vec<Arc<Column>>,
    cols_in_viewport_ids: Vec<String>,
}

impl ColumnViewportService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a scroll. Returns `false` when nothing moved.
    ///
    /// `body_width` is the total width of the center columns, needed to
    /// mirror the viewport under RTL.
    pub fn set_scroll_position(&mut self, scroll_width: f32, scroll_position: f32, body_width: f32, rtl: bool) -> bool {
        if scroll_width == self.scroll_width && scroll_position == self.scroll_position {
            return false;
        }
        self.scroll_width = scroll_width;
        self.scroll_position = scroll_position;
        if rtl {
            self.viewport_left = body_width - scroll_position - scroll_width;
            self.viewport_right = body_width - scroll_position;
        } else {
            self.viewport_left = scroll_position;
            self.viewport_right = scroll_width + scroll_position;
        }
        true
    }

    /// Width of the visible body area, `0.0` until the host reports one.
    pub fn viewport_width(&self) -> f32 {
        self.scroll_width
    }

    pub fn scroll_position(&self) -> f32 {
        self.scroll_position
    }

    /// Whether `column` overlaps the viewport plus its buffer.
    pub fn is_column_in_viewport(&self, column: &Column) -> bool {
        let column_left = column.left().unwrap_or(0.0);
        let column_right = column_left + column.actual_width();
        let left_bound = self.viewport_left - VIEWPORT_BUFFER;
        let right_bound = self.viewport_right + VIEWPORT_BUFFER;
        let too_far_left = column_left < left_bound && column_right < left_bound;
        let too_far_right = column_left > right_bound && column_right > right_bound;
        !too_far_left && !too_far_right
    }

    /// Recompute the center columns in the viewport. Returns whether the set
    /// changed.
    ///
    /// Without virtualisation, or before the host reported a viewport width,
    /// every center column counts as in view.
    pub fn check_viewport_columns(&mut self, center_cols: &[Arc<Column>], suppress_virtualisation: bool) -> bool {
        let in_view: Vec<Arc<Column>> = if suppress_virtualisation || self.scroll_width <= 0.0 {
            center_cols.to_vec()
        } else {
            center_cols
                .iter()
                .filter(|c| self.is_column_in_viewport(c))
                .cloned()
                .collect()
        };
        let ids: Vec<String> = in_view.iter().map(|c| c.id().to_string()).collect();
        let changed = ids != self.cols_in_viewport_ids;
        self.cols_in_viewport = in_view;
        self.cols_in_viewport_ids = ids;
        changed
    }

    pub fn cols_in_viewport(&self) -> &[Arc<Column>] {
        &self.cols_in_viewport
    }

    /// Forget the columns in view; the scroll state is kept.
    pub fn clear(&mut self) {
        self.cols_in_viewport.clear();
        self.cols_in_viewport_ids.clear();
    }
}
