//! Moving columns through the model.

use std::sync::Arc;

use crate::columns::column::{ColKey, Column};
use crate::columns::move_service::move_in_array;
use crate::error::ColumnWarning;
use crate::events::ColumnEventSource;

use super::{ColumnModel, contains};

impl ColumnModel {
    /// Move columns so the first lands at `to_index`, counted with the moved
    /// columns taken out.
    ///
    /// Refused, with a warning, when the index is out of range, or when the
    /// new order would split married children or unlock a locked column.
    pub fn move_columns(
        &mut self,
        keys: &[ColKey<'_>],
        to_index: usize,
        source: ColumnEventSource,
        finished: bool,
    ) -> bool {
        let Some(cols) = &self.cols else {
            return false;
        };

        let mut moved: Vec<Arc<Column>> = Vec::with_capacity(keys.len());
        for column in self.get_cols_for_keys(keys) {
            if !contains(&moved, &column) {
                moved.push(column);
            }
        }
        if moved.is_empty() {
            return false;
        }

        let max_index = cols.list.len() - moved.len();
        if to_index > max_index {
            self.ctx
                .warnings()
                .warn(ColumnWarning::MoveIndexOutOfRange { to_index, max_index });
            return false;
        }

        let mut proposed = cols.list.clone();
        move_in_array(&mut proposed, &moved, to_index);
        if !self.move_service.does_move_pass_married_children(&cols.tree, &proposed) {
            self.ctx.warnings().warn(ColumnWarning::MarriedChildrenBroken);
            return false;
        }
        if !self.move_service.does_move_pass_locked_positions(&proposed) {
            self.ctx.warnings().warn(ColumnWarning::LockedPositionsBroken);
            return false;
        }

        self.move_in_cols(&moved, to_index, source);
        self.dispatcher.column_moved(moved, Some(to_index), finished, source);
        true
    }

    pub fn move_column<'a>(
        &mut self,
        key: impl Into<ColKey<'a>>,
        to_index: usize,
        source: ColumnEventSource,
    ) -> bool {
        self.move_columns(&[key.into()], to_index, source, true)
    }

    /// Move the column at `from_index` in the live list.
    pub fn move_column_by_index(&mut self, from_index: usize, to_index: usize, source: ColumnEventSource) -> bool {
        let Some(column) = self.cols().get(from_index).cloned() else {
            return false;
        };
        self.move_column(&column, to_index, source)
    }
}
