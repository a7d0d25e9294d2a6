//! Displayed columns.
//!
//! From the columns the model wants shown, drop those hidden by a closed or
//! open group, then split the rest into the left pinned, center and right
//! pinned sections and lay them out horizontally.

use std::sync::Arc;

use crate::col_def::ColumnGroupShow;
use crate::columns::column::Column;
use crate::columns::provided::{ProvidedColumn, depth_first_original_tree_search};

/// Whether the open/closed state of the column's ancestor groups shows it.
///
/// Padding groups are transparent: a column below padding is judged by the
/// first real group above it, using its own `columnGroupShow`.
pub fn is_shown_by_groups(column: &Column) -> bool {
    let mut show = column.column_group_show();
    let mut parent = column.original_parent();
    while let Some(group) = parent {
        if !group.is_padding() {
            if group.is_expandable() {
                let hidden = match show {
                    Some(ColumnGroupShow::Open) => !group.is_expanded(),
                    Some(ColumnGroupShow::Closed) => group.is_expanded(),
                    None => false,
                };
                if hidden {
                    return false;
                }
            }
            show = group.column_group_show();
        }
        parent = group.original_parent();
    }
    true
}

fn width_of(columns: &[Arc<Column>]) -> f32 {
    columns.iter().map(|c| c.actual_width()).sum()
}

/// The displayed columns and their layout.
#[derive(Debug, Default, Clone)]
pub struct VisibleColsService {
    left: Vec<Arc<Column>>,
    center: Vec<Arc<Column>>,
    right: Vec<Arc<Column>>,
    all: Vec<Arc<Column>>,
    left_width: f32,
    center_width: f32,
    right_width: f32,
}

impl VisibleColsService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the displayed columns from `cols_to_show`, in order.
    ///
    /// `tree` is the live tree; expandable flags are refreshed first since
    /// they depend on child visibility.
    pub fn refresh_displayed(&mut self, cols_to_show: &[Arc<Column>], tree: &[ProvidedColumn], rtl: bool) {
        depth_first_original_tree_search(None, tree, &mut |node, _| {
            if let ProvidedColumn::Group(group) = node {
                group.setup_expandable();
            }
        });

        self.left.clear();
        self.center.clear();
        self.right.clear();
        for column in cols_to_show.iter().filter(|c| is_shown_by_groups(c)) {
            if column.is_pinned_left() {
                self.left.push(column.clone());
            } else if column.is_pinned_right() {
                self.right.push(column.clone());
            } else {
                self.center.push(column.clone());
            }
        }

        self.all = if rtl {
            [&self.right, &self.center, &self.left].into_iter().flatten().cloned().collect()
        } else {
            [&self.left, &self.center, &self.right].into_iter().flatten().cloned().collect()
        };
    }

    /// Assign left offsets within each section; every other column in
    /// `known_cols` loses its offset.
    pub fn set_left_values(&self, known_cols: &[Arc<Column>], rtl: bool) {
        for section in [&self.left, &self.right, &self.center] {
            if rtl {
                let mut left = width_of(section);
                for column in section {
                    left -= column.actual_width();
                    column.set_left(Some(left));
                }
            } else {
                let mut left = 0.0;
                for column in section {
                    column.set_left(Some(left));
                    left += column.actual_width();
                }
            }
        }

        for column in known_cols {
            if !self.is_displayed(column) {
                column.set_left(None);
            }
        }
    }

    pub fn update_body_widths(&mut self) {
        self.left_width = width_of(&self.left);
        self.center_width = width_of(&self.center);
        self.right_width = width_of(&self.right);
    }

    /// Drop every displayed column, so nothing stale is drawn.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn left_cols(&self) -> &[Arc<Column>] {
        &self.left
    }

    pub fn center_cols(&self) -> &[Arc<Column>] {
        &self.center
    }

    pub fn right_cols(&self) -> &[Arc<Column>] {
        &self.right
    }

    /// Every displayed column, in screen order.
    pub fn all_cols(&self) -> &[Arc<Column>] {
        &self.all
    }

    pub fn is_displayed(&self, column: &Arc<Column>) -> bool {
        self.all.iter().any(|c| Arc::ptr_eq(c, column))
    }

    /// The displayed column right after `column`, if any.
    pub fn col_after(&self, column: &Arc<Column>) -> Option<Arc<Column>> {
        let index = self.all.iter().position(|c| Arc::ptr_eq(c, column))?;
        self.all.get(index + 1).cloned()
    }

    /// The displayed column right before `column`, if any.
    pub fn col_before(&self, column: &Arc<Column>) -> Option<Arc<Column>> {
        let index = self.all.iter().position(|c| Arc::ptr_eq(c, column))?;
        index.checked_sub(1).and_then(|i| self.all.get(i).cloned())
    }

    pub fn left_width(&self) -> f32 {
        self.left_width
    }

    pub fn center_width(&self) -> f32 {
        self.center_width
    }

    pub fn right_width(&self) -> f32 {
        self.right_width
    }
}
