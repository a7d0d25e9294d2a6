//! Auto-group columns.
//!
//! When rows are grouped (or tree data is on) the grid adds columns of its
//! own that display the group hierarchy. Depending on the display type there
//! is one per row-group column or a single combined one.

use std::sync::Arc;

use crate::col_def::{ColDef, ShowRowGroup};
use crate::columns::column::Column;
use crate::columns::factory::{ColumnFactory, apply_column_state};
use crate::columns::provided::ColumnCollections;
use crate::context::GridContext;
use crate::options::GroupDisplayType;

/// Id of the combined auto-group column, and prefix of the per-group ones.
pub const AUTO_GROUP_COLUMN_ID: &str = "grid-auto-column";

/// Header shown by a combined auto-group column.
pub const DEFAULT_AUTO_GROUP_HEADER: &str = "Group";

/// Id of the auto column displaying `row_group_col_id`.
pub fn auto_col_id(row_group_col_id: Option<&str>) -> String {
    match row_group_col_id {
        Some(id) => format!("{AUTO_GROUP_COLUMN_ID}-{id}"),
        None => AUTO_GROUP_COLUMN_ID.to_string(),
    }
}

/// Creates and updates auto-group columns.
#[derive(Clone)]
pub struct AutoColService {
    ctx: Arc<GridContext>,
    factory: ColumnFactory,
}

impl AutoColService {
    pub fn new(ctx: Arc<GridContext>, factory: ColumnFactory) -> Self {
        Self { ctx, factory }
    }

    /// Whether each row-group column gets its own auto column.
    pub fn is_multi_auto_column(&self) -> bool {
        self.ctx.options().with(|o| {
            if o.tree_data {
                return false;
            }
            match o.group_display_type {
                GroupDisplayType::MultipleColumns => true,
                GroupDisplayType::SingleColumn => o.group_hide_open_parents,
                GroupDisplayType::GroupRows | GroupDisplayType::Custom => false,
            }
        })
    }

    /// The ids [`create_auto_cols`](Self::create_auto_cols) would assign.
    pub fn auto_col_ids(&self, row_group_cols: &[Arc<Column>]) -> Vec<String> {
        if self.is_multi_auto_column() {
            row_group_cols
                .iter()
                .map(|row_group_col| auto_col_id(Some(row_group_col.id())))
                .collect()
        } else {
            vec![auto_col_id(None)]
        }
    }

    /// Build fresh auto columns for the given row-group columns.
    pub fn create_auto_cols(&self, row_group_cols: &[Arc<Column>]) -> Vec<Arc<Column>> {
        if self.is_multi_auto_column() {
            row_group_cols
                .iter()
                .map(|row_group_col| self.create_one_auto_col(Some(row_group_col)))
                .collect()
        } else {
            vec![self.create_one_auto_col(None)]
        }
    }

    fn create_one_auto_col(&self, row_group_col: Option<&Arc<Column>>) -> Arc<Column> {
        let col_id = auto_col_id(row_group_col.map(|c| c.id()));
        let col_def = self.create_auto_col_def(row_group_col.map(|c| c.as_ref()));
        Column::new(self.ctx.beans(), col_def, None, col_id, true)
    }

    /// Re-merge the definitions of existing auto columns in place, after
    /// `autoGroupColumnDef` or the defaults changed.
    pub fn update_auto_cols(&self, auto_cols: &[Arc<Column>], col_def_cols: Option<&ColumnCollections>) {
        for auto_col in auto_cols {
            let underlying = match auto_col.col_def().show_row_group.as_ref() {
                Some(ShowRowGroup::Column(id)) => col_def_cols.and_then(|cols| cols.map.get(id).cloned()),
                _ => None,
            };
            let col_def = self.create_auto_col_def(underlying.as_deref());
            auto_col.set_col_def(col_def.clone(), None);
            apply_column_state(auto_col, &col_def);
        }
    }

    fn create_auto_col_def(&self, row_group_col: Option<&Column>) -> ColDef {
        let mut base = ColDef {
            header_name: Some(DEFAULT_AUTO_GROUP_HEADER.to_string()),
            show_row_group: Some(match row_group_col {
                Some(col) => ShowRowGroup::Column(col.id().to_string()),
                None => ShowRowGroup::All(true),
            }),
            ..ColDef::default()
        };
        if let Some(col) = row_group_col {
            base.header_name = Some(col.header_name());
        }

        if let Some(user_def) = self.ctx.options().with(|o| o.auto_group_column_def.clone()) {
            base.merge_from(&user_def);
        }

        // The grid owns these; the application cannot rebind them.
        let show_row_group = base.show_row_group.clone();
        let mut merged = self.factory.add_column_default_and_types(&base);
        merged.show_row_group = show_row_group;
        merged.row_group = None;
        merged.pivot = None;
        merged
    }
}
