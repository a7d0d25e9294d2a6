//! Resizing, sizing to fit, autosizing and the horizontal viewport.
//!
//! While resize operations are queued (the host has not laid out the grid
//! yet) every entry point here records itself and returns; the queue runs in
//! order once [`ColumnModel::process_resize_operations`] is called.

use std::sync::Arc;

use horizon_grid_core::logging::targets;

use crate::columns::column::Column;
use crate::columns::size::{self, SizeToFitParams, refresh_flexed_columns};
use crate::events::ColumnEventSource;
use crate::options::{AutoSizeStrategy, keys};

use super::{ColumnModel, contains};

impl ColumnModel {
    /// Set column widths by id.
    ///
    /// A resized column stops flexing. Once `finished`, the flex columns to
    /// the right of the last resized one share the remaining space.
    pub fn set_column_widths(&mut self, widths: &[(&str, f32)], finished: bool, source: ColumnEventSource) {
        if self.should_queue_resize_operations {
            let owned: Vec<(String, f32)> = widths.iter().map(|(id, w)| (id.to_string(), *w)).collect();
            self.push_resize_operation(move |model| {
                let widths: Vec<(&str, f32)> = owned.iter().map(|(id, w)| (id.as_str(), *w)).collect();
                model.set_column_widths(&widths, finished, source);
            });
            return;
        }

        let mut resized: Vec<Arc<Column>> = Vec::with_capacity(widths.len());
        for (col_id, width) in widths {
            let Some(column) = self.get_col(*col_id) else {
                continue;
            };
            if column.is_flex() {
                column.set_flex(None);
            }
            column.set_actual_width(*width);
            if !contains(&resized, &column) {
                resized.push(column);
            }
        }
        if resized.is_empty() {
            return;
        }

        let mut flexing = Vec::new();
        if finished {
            let outcome = refresh_flexed_columns(
                self.visible_cols.center_cols(),
                self.viewport.viewport_width(),
                &resized,
            );
            for column in outcome.changed {
                if !contains(&resized, &column) {
                    resized.push(column);
                }
            }
            flexing = outcome.flexing;
        }

        self.update_layout();
        self.check_viewport(false);
        self.dispatcher.column_resized(resized, flexing, finished, source);
    }

    /// Scale the displayed columns to fill `grid_width`.
    pub fn size_columns_to_fit(&mut self, grid_width: f32, params: &SizeToFitParams, source: ColumnEventSource) {
        if self.should_queue_resize_operations {
            let params = params.clone();
            self.push_resize_operation(move |model| model.size_columns_to_fit(grid_width, &params, source));
            return;
        }

        let sized = size::size_columns_to_fit(self.visible_cols.all_cols(), grid_width, params);
        if sized.is_empty() {
            return;
        }
        tracing::debug!(target: targets::COLUMN_SIZE, grid_width, columns = sized.len(), "sized columns to fit");
        self.update_layout();
        self.check_viewport(false);
        self.dispatcher.column_resized(sized, Vec::new(), true, source);
    }

    /// Size to fit the body: the pinned sections plus the viewport. Does
    /// nothing until the host reported a viewport width.
    pub fn size_columns_to_fit_grid_body(&mut self, params: &SizeToFitParams, source: ColumnEventSource) {
        let viewport_width = self.viewport.viewport_width();
        if viewport_width <= 0.0 {
            return;
        }
        let grid_width = self.visible_cols.left_width() + viewport_width + self.visible_cols.right_width();
        self.size_columns_to_fit(grid_width, params, source);
    }

    /// Size columns to their measured content. `col_ids` of `None` means
    /// every displayed column.
    ///
    /// Needs a content measurer in the options; columns it cannot measure
    /// keep their width.
    pub fn auto_size_columns(&mut self, col_ids: Option<Vec<String>>, skip_header: bool, source: ColumnEventSource) {
        if self.should_queue_resize_operations {
            self.push_resize_operation(move |model| model.auto_size_columns(col_ids, skip_header, source));
            return;
        }

        let Some(measurer) = self.ctx.options().with(|o| o.content_measurer.clone()) else {
            tracing::debug!(target: targets::COLUMN_SIZE, "no content measurer, skipping autosize");
            return;
        };
        let columns: Vec<Arc<Column>> = match &col_ids {
            Some(ids) => ids.iter().filter_map(|id| self.get_col(id)).collect(),
            None => self.visible_cols.all_cols().to_vec(),
        };

        let measured: Vec<(String, f32)> = columns
            .iter()
            .filter_map(|column| {
                let width = measurer.measure(column, skip_header)?;
                Some((column.id().to_string(), width))
            })
            .collect();
        let widths: Vec<(&str, f32)> = measured.iter().map(|(id, w)| (id.as_str(), *w)).collect();
        self.set_column_widths(&widths, true, source);
    }

    pub fn auto_size_all_columns(&mut self, skip_header: bool, source: ColumnEventSource) {
        self.auto_size_columns(None, skip_header, source);
    }

    /// Schedule the configured autosize strategy after the first load.
    pub(super) fn apply_autosize_strategy(&mut self) {
        let Some(strategy) = self.ctx.options().with(|o| o.auto_size_strategy.clone()) else {
            return;
        };
        match strategy {
            AutoSizeStrategy::FitGridWidth {
                default_min_width,
                default_max_width,
                column_limits,
            } => {
                let params = SizeToFitParams {
                    default_min_width,
                    default_max_width,
                    column_limits,
                };
                self.defer(move |model| {
                    model.size_columns_to_fit_grid_body(&params, ColumnEventSource::SizeColumnsToFit);
                });
            }
            AutoSizeStrategy::FitProvidedWidth { width } => {
                self.defer(move |model| {
                    model.size_columns_to_fit(width, &SizeToFitParams::default(), ColumnEventSource::SizeColumnsToFit);
                });
            }
            // Needs rendered rows, see `on_first_data_rendered`.
            AutoSizeStrategy::FitCellContents { .. } => {}
        }
    }

    /// The host rendered its first rows; content autosizing can run.
    pub fn on_first_data_rendered(&mut self) {
        let Some(AutoSizeStrategy::FitCellContents { col_ids, skip_header }) =
            self.ctx.options().with(|o| o.auto_size_strategy.clone())
        else {
            return;
        };
        self.defer(move |model| model.auto_size_columns(col_ids, skip_header, ColumnEventSource::AutosizeColumns));
    }

    /// Report the horizontal scroll state of the body.
    ///
    /// A new viewport width redistributes flex space first. Sends
    /// `VirtualColumnsChanged` when the columns in view changed.
    pub fn set_viewport_scroll(&mut self, scroll_width: f32, scroll_position: f32, after_scroll: bool) {
        let width_changed = scroll_width != self.viewport.viewport_width();
        let rtl = self.ctx.options().get(keys::ENABLE_RTL);
        let body_width = self.visible_cols.center_width();
        if !self
            .viewport
            .set_scroll_position(scroll_width, scroll_position, body_width, rtl)
        {
            return;
        }

        if width_changed {
            let outcome = refresh_flexed_columns(self.visible_cols.center_cols(), scroll_width, &[]);
            self.update_layout();
            self.dispatcher
                .column_resized(outcome.changed, outcome.flexing, true, ColumnEventSource::Flex);
        }
        self.check_viewport(after_scroll);
    }
}
