//! Exporting the live columns back as definitions.

use std::collections::HashMap;
use std::sync::Arc;

use crate::col_def::{ColDef, ColGroupDef, ColumnDef};
use crate::columns::column::Column;
use crate::columns::func_cols::FuncRole;

use super::ColumnModel;

enum ExportNode {
    Column(ColDef),
    Group(String),
}

struct PendingGroup {
    def: ColGroupDef,
    children: Vec<ExportNode>,
}

impl ColumnModel {
    /// Definitions for the definition columns as they are now: live width,
    /// visibility, pinning, sort and function roles, in display order.
    ///
    /// Columns are regrouped under their original groups; a group split by
    /// reordering appears where its first column is. Padding is dropped.
    pub fn get_column_defs(&self) -> Option<Vec<ColumnDef>> {
        self.col_def_cols.as_ref()?;

        let order: &[Arc<Column>] = if self.showing_pivot_result {
            self.last_order.as_deref().unwrap_or_default()
        } else {
            self.cols()
        };
        let mut columns = self.col_def_cols().to_vec();
        columns.sort_by_key(|c| order.iter().position(|o| Arc::ptr_eq(o, c)).unwrap_or(usize::MAX));

        let mut roots: Vec<ExportNode> = Vec::new();
        let mut groups: HashMap<String, PendingGroup> = HashMap::new();
        for column in &columns {
            let mut child = Some(ExportNode::Column(self.def_from_column(column)));
            let mut pointer = column.original_parent();
            while let Some(group) = pointer {
                if group.is_padding() {
                    pointer = group.original_parent();
                    continue;
                }
                let group_id = group.id().to_string();
                if let Some(existing) = groups.get_mut(&group_id) {
                    existing.children.extend(child.take());
                    break;
                }
                let Some(group_def) = group.col_group_def() else {
                    break;
                };
                let def = ColGroupDef {
                    group_id: Some(group_id.clone()),
                    children: Vec::new(),
                    ..(*group_def).clone()
                };
                groups.insert(
                    group_id.clone(),
                    PendingGroup {
                        def,
                        children: child.take().into_iter().collect(),
                    },
                );
                child = Some(ExportNode::Group(group_id));
                pointer = group.original_parent();
            }
            roots.extend(child);
        }

        Some(
            roots
                .into_iter()
                .filter_map(|node| materialize(node, &mut groups))
                .collect(),
        )
    }

    fn def_from_column(&self, column: &Arc<Column>) -> ColDef {
        let role_index = |role: FuncRole| {
            self.func_cols
                .columns(role)
                .iter()
                .position(|c| Arc::ptr_eq(c, column))
                .and_then(|i| u32::try_from(i).ok())
        };
        let row_group = column.is_row_group_active();
        let pivot = column.is_pivot_active();
        ColDef {
            col_id: Some(column.id().to_string()),
            width: Some(column.actual_width()),
            row_group: Some(row_group),
            row_group_index: Some(role_index(FuncRole::RowGroup).filter(|_| row_group)),
            pivot: Some(pivot),
            pivot_index: Some(role_index(FuncRole::Pivot).filter(|_| pivot)),
            agg_func: Some(column.agg_func().filter(|_| column.is_value_active())),
            hide: (!column.is_visible()).then_some(true),
            pinned: Some(column.pinned()),
            sort: Some(column.sort()),
            sort_index: Some(column.sort_index()),
            ..(*column.col_def()).clone()
        }
    }
}

fn materialize(node: ExportNode, groups: &mut HashMap<String, PendingGroup>) -> Option<ColumnDef> {
    match node {
        ExportNode::Column(def) => Some(def.into()),
        ExportNode::Group(group_id) => {
            let pending = groups.remove(&group_id)?;
            let children = pending
                .children
                .into_iter()
                .filter_map(|child| materialize(child, groups))
                .collect();
            Some(
                ColGroupDef {
                    children,
                    ..pending.def
                }
                .into(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::col_def::Pinned;
    use crate::context::GridContext;
    use crate::events::ColumnEventSource;
    use crate::options::GridOptions;

    fn model(defs: Vec<ColumnDef>) -> ColumnModel {
        let mut model = ColumnModel::new(GridContext::new(GridOptions::default()));
        model.set_column_defs(defs, ColumnEventSource::Api);
        model
    }

    #[test]
    fn test_export_carries_live_state() {
        let mut model = model(vec![ColDef::field("a").into(), ColDef::field("b").into()]);
        model.set_cols_pinned(&["b".into()], Pinned::Right, ColumnEventSource::Api);
        model.set_cols_visible(&["a".into()], false, ColumnEventSource::Api);

        let defs = model.get_column_defs().unwrap_or_default();
        let a = defs[0].as_column().cloned().unwrap_or_default();
        let b = defs[1].as_column().cloned().unwrap_or_default();
        assert_eq!(a.col_id.as_deref(), Some("a"));
        assert_eq!(a.hide, Some(true));
        assert_eq!(a.width, Some(200.0));
        assert_eq!(b.pinned, Some(Pinned::Right));
        assert_eq!(b.hide, None);
        assert_eq!(b.row_group_index, Some(None));
    }

    #[test]
    fn test_export_regroups_and_drops_padding() {
        let mut model = model(vec![
            ColGroupDef::new("g", vec![ColDef::field("a").into(), ColDef::field("b").into()])
                .with_header_name("Group")
                .into(),
            ColDef::field("c").into(),
        ]);
        model.move_column("c", 1, ColumnEventSource::Api);

        let defs = model.get_column_defs().unwrap_or_default();
        assert_eq!(defs.len(), 2);
        let group = defs[0].as_group().cloned().unwrap_or_default();
        assert_eq!(group.group_id.as_deref(), Some("g"));
        assert_eq!(group.header_name.as_deref(), Some("Group"));
        let children: Vec<Option<String>> = group
            .children
            .iter()
            .map(|c| c.as_column().and_then(|d| d.col_id.clone()))
            .collect();
        assert_eq!(children, vec![Some("a".to_string()), Some("b".to_string())]);
        assert_eq!(defs[1].as_column().and_then(|d| d.col_id.clone()).as_deref(), Some("c"));
    }

    #[test]
    fn test_nothing_to_export_before_load() {
        let model = ColumnModel::new(GridContext::new(GridOptions::default()));
        assert!(model.get_column_defs().is_none());
    }
}
