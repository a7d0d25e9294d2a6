//! Opening and closing provided column groups.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::columns::provided::{ProvidedColumn, depth_first_original_tree_search};
use crate::columns::provided_group::ProvidedColumnGroup;
use crate::events::ColumnEventSource;

use super::ColumnModel;

/// Whether one group is open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnGroupState {
    pub group_id: String,
    pub open: bool,
}

impl ColumnModel {
    /// The open state of every group of the live tree, padding excluded.
    pub fn get_column_group_state(&self) -> Vec<ColumnGroupState> {
        let mut states = Vec::new();
        depth_first_original_tree_search(None, self.col_tree(), &mut |node, _| {
            if let ProvidedColumn::Group(group) = node
                && !group.is_padding()
            {
                states.push(ColumnGroupState {
                    group_id: group.id().to_string(),
                    open: group.is_expanded(),
                });
            }
        });
        states
    }

    /// Open or close groups. Unknown ids are skipped; one
    /// `ColumnGroupOpened` lists every group that changed.
    pub fn set_column_group_state(&mut self, states: &[ColumnGroupState], source: ColumnEventSource) {
        if self.cols.is_none() {
            return;
        }

        let impacted: Vec<Arc<ProvidedColumnGroup>> = states
            .iter()
            .filter_map(|state| {
                let group = self.get_provided_col_group(&state.group_id)?;
                group.set_expanded(state.open).then_some(group)
            })
            .collect();

        self.refresh_visible(source);
        self.dispatcher.group_opened(impacted);
    }

    /// Put every group back to its `openByDefault`.
    pub fn reset_column_group_state(&mut self, source: ColumnEventSource) {
        let mut states = Vec::new();
        depth_first_original_tree_search(None, self.col_def_col_tree(), &mut |node, _| {
            if let ProvidedColumn::Group(group) = node {
                let open = group
                    .col_group_def()
                    .and_then(|def| def.open_by_default)
                    .unwrap_or(false);
                states.push(ColumnGroupState {
                    group_id: group.id().to_string(),
                    open,
                });
            }
        });
        self.set_column_group_state(&states, source);
    }

    pub fn set_column_group_opened(&mut self, group_id: &str, open: bool, source: ColumnEventSource) {
        self.set_column_group_state(
            &[ColumnGroupState {
                group_id: group_id.to_string(),
                open,
            }],
            source,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::col_def::{ColDef, ColGroupDef, ColumnGroupShow};
    use crate::context::GridContext;
    use crate::events::ColumnEvent;
    use crate::options::GridOptions;
    use parking_lot::Mutex;

    fn model() -> ColumnModel {
        let mut model = ColumnModel::new(GridContext::new(GridOptions::default()));
        model.set_column_defs(
            vec![
                ColGroupDef::new(
                    "medals",
                    vec![
                        ColDef::field("total").into(),
                        ColDef::field("gold")
                            .with_column_group_show(ColumnGroupShow::Open)
                            .into(),
                    ],
                )
                .into(),
                ColDef::field("country").into(),
            ],
            ColumnEventSource::Api,
        );
        model
    }

    fn displayed(model: &ColumnModel) -> Vec<&str> {
        model.visible_cols().all_cols().iter().map(|c| c.id()).collect()
    }

    #[test]
    fn test_opening_a_group_shows_its_open_children() {
        let mut model = model();
        assert_eq!(displayed(&model), vec!["total", "country"]);

        let opened = Arc::new(Mutex::new(Vec::new()));
        let sink = opened.clone();
        model.ctx().events().subscribe(move |e| {
            if let ColumnEvent::ColumnGroupOpened { groups } = e {
                sink.lock().extend(groups.iter().map(|g| g.id().to_string()));
            }
        });

        model.set_column_group_opened("medals", true, ColumnEventSource::Api);
        assert_eq!(displayed(&model), vec!["total", "gold", "country"]);
        model.set_column_group_opened("medals", true, ColumnEventSource::Api);
        assert_eq!(*opened.lock(), vec!["medals".to_string()]);
    }

    #[test]
    fn test_group_state_skips_padding_and_resets() {
        let mut model = model();
        model.set_column_group_opened("medals", true, ColumnEventSource::Api);
        assert_eq!(
            model.get_column_group_state(),
            vec![ColumnGroupState {
                group_id: "medals".into(),
                open: true
            }]
        );

        model.reset_column_group_state(ColumnEventSource::Api);
        assert_eq!(displayed(&model), vec!["total", "country"]);
    }
}
