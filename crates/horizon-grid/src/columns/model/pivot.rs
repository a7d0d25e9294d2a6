//! Pivot mode and pivot result columns.

use std::sync::Arc;

use crate::col_def::ColumnDef;
use crate::columns::column::Column;
use crate::error::ColumnWarning;
use crate::events::ColumnEventSource;
use crate::options::keys;

use super::ColumnModel;

impl ColumnModel {
    pub fn is_pivot_mode(&self) -> bool {
        self.pivot_mode
    }

    /// Whether the live columns are pivot result columns.
    pub fn is_showing_pivot_result(&self) -> bool {
        self.showing_pivot_result
    }

    /// Pivot mode is on and at least one column is pivoted.
    pub fn is_pivot_active(&self) -> bool {
        self.pivot_mode && !self.func_cols.pivot_columns().is_empty()
    }

    /// Toggle pivot mode. Refused while tree data is on.
    pub fn set_pivot_mode(&mut self, pivot_mode: bool, source: ColumnEventSource) {
        if pivot_mode == self.pivot_mode || !self.is_pivot_setting_allowed(pivot_mode) {
            return;
        }
        self.pivot_mode = pivot_mode;
        tracing::debug!(target: horizon_grid_core::logging::targets::COLUMN_MODEL, pivot_mode, "pivot mode changed");

        if !self.ready {
            return;
        }
        // Auto columns may appear or go: custom group display only keeps
        // its own group column outside pivot mode.
        self.refresh_cols();
        self.refresh_visible(source);
        self.dispatcher.pivot_mode_changed();
    }

    pub(super) fn is_pivot_setting_allowed(&self, pivot_mode: bool) -> bool {
        if pivot_mode && self.ctx.options().get(keys::TREE_DATA) {
            self.ctx.warnings().warn_once(ColumnWarning::PivotModeWithTreeData);
            return false;
        }
        true
    }

    /// Supply the columns a pivot produced, or `None` to go back to the
    /// definition columns.
    pub fn set_pivot_result_cols(&mut self, defs: Option<&[ColumnDef]>, source: ColumnEventSource) {
        let changed = self.pivot_result_cols.set_pivot_result_cols(defs);
        if changed && self.ready {
            self.refresh_cols();
            self.refresh_visible(source);
        }
    }

    /// The current pivot result columns, if any.
    pub fn pivot_result_cols(&self) -> Option<&[Arc<Column>]> {
        self.pivot_result_cols
            .pivot_result_cols()
            .map(|cols| cols.list.as_slice())
    }

    /// The pivot result column with the given id.
    pub fn get_pivot_result_col(&self, col_id: &str) -> Option<Arc<Column>> {
        self.pivot_result_cols
            .pivot_result_cols()?
            .map
            .get(col_id)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::col_def::{ColDef, ColGroupDef};
    use crate::context::GridContext;
    use crate::events::ColumnEventKind;
    use crate::options::GridOptions;
    use parking_lot::Mutex;

    fn sales_model(options: GridOptions) -> ColumnModel {
        let mut model = ColumnModel::new(GridContext::new(options));
        model.set_column_defs(
            vec![
                ColDef::field("country").with_row_group(true).into(),
                ColDef::field("year").into(),
                ColDef::field("gold").with_agg_func("sum").into(),
            ],
            ColumnEventSource::Api,
        );
        model
    }

    fn displayed(model: &ColumnModel) -> Vec<&str> {
        model.visible_cols().all_cols().iter().map(|c| c.id()).collect()
    }

    #[test]
    fn test_pivot_mode_shows_auto_and_value_columns() {
        let mut model = sales_model(GridOptions::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        model.ctx().events().subscribe(move |e| sink.lock().push(e.kind()));

        model.set_pivot_mode(true, ColumnEventSource::Api);
        assert!(model.is_pivot_mode());
        assert!(!model.is_pivot_active());
        assert_eq!(displayed(&model), vec!["grid-auto-column", "gold"]);
        assert_eq!(seen.lock().last(), Some(&ColumnEventKind::PivotModeChanged));

        model.set_pivot_mode(false, ColumnEventSource::Api);
        assert_eq!(displayed(&model), vec!["grid-auto-column", "country", "year", "gold"]);
    }

    #[test]
    fn test_pivot_mode_refused_with_tree_data() {
        let mut model = sales_model(GridOptions {
            tree_data: true,
            ..Default::default()
        });
        model.set_pivot_mode(true, ColumnEventSource::Api);
        model.set_pivot_mode(true, ColumnEventSource::Api);

        assert!(!model.is_pivot_mode());
        assert_eq!(model.ctx().warnings().entries(), vec![ColumnWarning::PivotModeWithTreeData]);
    }

    #[test]
    fn test_pivot_result_columns_replace_definition_columns() {
        let mut model = sales_model(GridOptions {
            pivot_mode: true,
            ..Default::default()
        });
        let result: Vec<ColumnDef> = vec![
            ColGroupDef::new(
                "2000",
                vec![ColDef::new().with_col_id("pivot_2000_gold").into()],
            )
            .into(),
            ColGroupDef::new(
                "2004",
                vec![ColDef::new().with_col_id("pivot_2004_gold").into()],
            )
            .into(),
        ];
        model.set_pivot_result_cols(Some(&result), ColumnEventSource::Api);

        assert!(model.is_showing_pivot_result());
        assert_eq!(
            displayed(&model),
            vec!["grid-auto-column", "pivot_2000_gold", "pivot_2004_gold"]
        );
        assert_eq!(model.tree_depth(), 1);
        assert!(model.get_pivot_result_col("pivot_2004_gold").is_some_and(|c| !c.is_primary()));

        model.set_pivot_result_cols(None, ColumnEventSource::Api);
        assert!(!model.is_showing_pivot_result());
        assert_eq!(displayed(&model), vec!["grid-auto-column", "gold"]);
    }
}
