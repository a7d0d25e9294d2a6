//! Row-group, pivot and value column changes through the model.
//!
//! Keys resolve against the definition columns, so columns can be grouped
//! or aggregated while pivot result columns are showing.

use std::sync::Arc;

use crate::columns::column::{ColKey, Column};
use crate::columns::func_cols::FuncRole;
use crate::events::ColumnEventSource;

use super::ColumnModel;

impl ColumnModel {
    /// Replace the columns playing `role`.
    pub fn set_func_cols(&mut self, role: FuncRole, keys: &[ColKey<'_>], source: ColumnEventSource) {
        let columns = self.resolve_col_def_cols(keys);
        let changed = self.func_cols.set_columns(role, columns);
        self.after_func_cols_changed(role, changed, source);
    }

    /// Add columns to those playing `role`.
    pub fn add_func_cols(&mut self, role: FuncRole, keys: &[ColKey<'_>], source: ColumnEventSource) {
        let columns = self.resolve_col_def_cols(keys);
        let added = self.func_cols.add_columns(role, &columns);
        self.after_func_cols_changed(role, added, source);
    }

    /// Remove columns from those playing `role`.
    pub fn remove_func_cols(&mut self, role: FuncRole, keys: &[ColKey<'_>], source: ColumnEventSource) {
        let columns = self.resolve_col_def_cols(keys);
        let removed = self.func_cols.remove_columns(role, &columns);
        self.after_func_cols_changed(role, removed, source);
    }

    pub fn set_row_group_columns(&mut self, keys: &[ColKey<'_>], source: ColumnEventSource) {
        self.set_func_cols(FuncRole::RowGroup, keys, source);
    }

    pub fn add_row_group_columns(&mut self, keys: &[ColKey<'_>], source: ColumnEventSource) {
        self.add_func_cols(FuncRole::RowGroup, keys, source);
    }

    pub fn remove_row_group_columns(&mut self, keys: &[ColKey<'_>], source: ColumnEventSource) {
        self.remove_func_cols(FuncRole::RowGroup, keys, source);
    }

    pub fn set_pivot_columns(&mut self, keys: &[ColKey<'_>], source: ColumnEventSource) {
        self.set_func_cols(FuncRole::Pivot, keys, source);
    }

    pub fn add_pivot_columns(&mut self, keys: &[ColKey<'_>], source: ColumnEventSource) {
        self.add_func_cols(FuncRole::Pivot, keys, source);
    }

    pub fn remove_pivot_columns(&mut self, keys: &[ColKey<'_>], source: ColumnEventSource) {
        self.remove_func_cols(FuncRole::Pivot, keys, source);
    }

    pub fn set_value_columns(&mut self, keys: &[ColKey<'_>], source: ColumnEventSource) {
        self.set_func_cols(FuncRole::Value, keys, source);
    }

    pub fn add_value_columns(&mut self, keys: &[ColKey<'_>], source: ColumnEventSource) {
        self.add_func_cols(FuncRole::Value, keys, source);
    }

    pub fn remove_value_columns(&mut self, keys: &[ColKey<'_>], source: ColumnEventSource) {
        self.remove_func_cols(FuncRole::Value, keys, source);
    }

    /// Change the aggregation of a column. Its value activation is left
    /// alone.
    pub fn set_column_agg_func<'a>(
        &mut self,
        key: impl Into<ColKey<'a>>,
        agg_func: Option<String>,
        source: ColumnEventSource,
    ) {
        let Some(column) = self.get_col_def_col(key) else {
            return;
        };
        column.set_agg_func(agg_func);
        self.dispatcher.value_changed(vec![column], source);
    }

    fn resolve_col_def_cols(&self, keys: &[ColKey<'_>]) -> Vec<Arc<Column>> {
        keys.iter().filter_map(|key| self.get_col_def_col(*key)).collect()
    }

    /// Refresh after a role list changed and announce the role's new list.
    fn after_func_cols_changed(&mut self, role: FuncRole, changed: Vec<Arc<Column>>, source: ColumnEventSource) {
        if changed.is_empty() {
            return;
        }
        self.refresh_cols();
        self.refresh_visible(source);

        let columns = self.func_cols.columns(role).to_vec();
        match role {
            FuncRole::RowGroup => self.dispatcher.row_group_changed(columns, source),
            FuncRole::Pivot => self.dispatcher.pivot_changed(columns, source),
            FuncRole::Value => self.dispatcher.value_changed(columns, source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::col_def::ColDef;
    use crate::columns::func_cols::DEFAULT_AGG_FUNC;
    use crate::context::GridContext;
    use crate::events::{ColumnEvent, ColumnEventKind};
    use crate::options::{GridOptions, GroupDisplayType};
    use parking_lot::Mutex;

    fn model(options: GridOptions) -> ColumnModel {
        let mut model = ColumnModel::new(GridContext::new(options));
        model.set_column_defs(
            vec![
                ColDef::field("country").into(),
                ColDef::field("sport").into(),
                ColDef::field("gold").into(),
            ],
            ColumnEventSource::Api,
        );
        model
    }

    fn ids(columns: &[Arc<Column>]) -> Vec<&str> {
        columns.iter().map(|c| c.id()).collect()
    }

    #[test]
    fn test_grouping_adds_and_removes_auto_columns() {
        let mut model = model(GridOptions {
            group_display_type: GroupDisplayType::MultipleColumns,
            ..Default::default()
        });
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        model.ctx().events().subscribe(move |e| {
            if let ColumnEvent::ColumnRowGroupChanged { columns, .. } = e {
                sink.lock().push(columns.len());
            }
        });

        model.add_row_group_columns(&["country".into(), "sport".into()], ColumnEventSource::Api);
        assert_eq!(
            ids(model.auto_cols().unwrap_or_default()),
            vec!["grid-auto-column-country", "grid-auto-column-sport"]
        );
        assert_eq!(ids(&model.cols()[..2]), vec!["grid-auto-column-country", "grid-auto-column-sport"]);

        model.remove_row_group_columns(&["country".into(), "sport".into()], ColumnEventSource::Api);
        assert!(model.auto_cols().is_none());
        assert!(model.func_cols().row_group_columns().is_empty());
        assert_eq!(*events.lock(), vec![2, 0]);
    }

    #[test]
    fn test_unchanged_roles_send_nothing() {
        let mut model = model(GridOptions::default());
        model.set_row_group_columns(&["country".into()], ColumnEventSource::Api);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        model.ctx().events().subscribe(move |e| sink.lock().push(e.kind()));
        model.add_row_group_columns(&["country".into()], ColumnEventSource::Api);
        model.remove_pivot_columns(&["gold".into()], ColumnEventSource::Api);
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn test_value_columns_get_default_aggregation() {
        let mut model = model(GridOptions::default());
        model.add_value_columns(&["gold".into()], ColumnEventSource::Api);
        let gold = model.get_col("gold");
        assert!(gold.as_ref().is_some_and(|c| c.is_value_active()));
        assert_eq!(gold.and_then(|c| c.agg_func()).as_deref(), Some(DEFAULT_AGG_FUNC));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        model.ctx().events().subscribe(move |e| sink.lock().push(e.kind()));
        model.set_column_agg_func("gold", Some("max".into()), ColumnEventSource::Api);
        assert_eq!(*seen.lock(), vec![ColumnEventKind::ColumnValueChanged]);
        assert_eq!(model.get_col("gold").and_then(|c| c.agg_func()).as_deref(), Some("max"));
    }
}
