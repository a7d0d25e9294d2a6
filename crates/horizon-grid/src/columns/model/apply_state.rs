//! Column state: capture, apply and reset, plus the change events that
//! follow a bulk change.
//!
//! A [`ColumnState`] is the serializable per-column snapshot applications
//! persist. Every field but the id is optional: a missing field leaves the
//! column alone. For the nullable fields an explicit `null` clears the value.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use horizon_grid_core::PerfSpan;
use horizon_grid_core::logging::targets;

use crate::col_def::{Pinned, SortDirection, deserialize_nullable, deserialize_pinned};
use crate::columns::auto_cols::AUTO_GROUP_COLUMN_ID;
use crate::columns::column::{Column, initial_width};
use crate::columns::func_cols::FuncRole;
use crate::events::ColumnEventSource;

use super::{ColumnModel, contains};

/// Row-group and pivot indexes handed out by a reset to columns flagged
/// without an index, so they follow the explicitly indexed ones.
const RESET_FLAGGED_INDEX_START: u32 = 1000;

/// The state of one column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnState {
    pub col_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_pinned", skip_serializing_if = "Option::is_none")]
    pub pinned: Option<Pinned>,
    #[serde(default, deserialize_with = "deserialize_nullable", skip_serializing_if = "Option::is_none")]
    pub flex: Option<Option<f32>>,
    #[serde(default, deserialize_with = "deserialize_nullable", skip_serializing_if = "Option::is_none")]
    pub sort: Option<Option<SortDirection>>,
    #[serde(default, deserialize_with = "deserialize_nullable", skip_serializing_if = "Option::is_none")]
    pub sort_index: Option<Option<u32>>,
    #[serde(default, deserialize_with = "deserialize_nullable", skip_serializing_if = "Option::is_none")]
    pub agg_func: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_group: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_nullable", skip_serializing_if = "Option::is_none")]
    pub row_group_index: Option<Option<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_nullable", skip_serializing_if = "Option::is_none")]
    pub pivot_index: Option<Option<u32>>,
}

impl ColumnState {
    /// A state for `col_id` that changes nothing.
    pub fn new(col_id: impl Into<String>) -> Self {
        Self {
            col_id: col_id.into(),
            ..Self::default()
        }
    }

    /// Fill the fields this state leaves out from `defaults`.
    ///
    /// `rowGroup` with `rowGroupIndex`, and `pivot` with `pivotIndex`, are
    /// taken as pairs: setting either one keeps the default out of both.
    fn with_defaults(&self, defaults: Option<&ColumnStateDefaults>) -> ColumnState {
        let Some(defaults) = defaults else {
            return self.clone();
        };
        let (row_group, row_group_index) = if self.row_group.is_some() || self.row_group_index.is_some() {
            (self.row_group, self.row_group_index)
        } else {
            (defaults.row_group, defaults.row_group_index)
        };
        let (pivot, pivot_index) = if self.pivot.is_some() || self.pivot_index.is_some() {
            (self.pivot, self.pivot_index)
        } else {
            (defaults.pivot, defaults.pivot_index)
        };
        ColumnState {
            col_id: self.col_id.clone(),
            width: self.width.or(defaults.width),
            hide: self.hide.or(defaults.hide),
            pinned: self.pinned.or(defaults.pinned),
            flex: self.flex.or(defaults.flex),
            sort: self.sort.or(defaults.sort),
            sort_index: self.sort_index.or(defaults.sort_index),
            agg_func: self.agg_func.clone().or_else(|| defaults.agg_func.clone()),
            row_group,
            row_group_index,
            pivot,
            pivot_index,
        }
    }
}

/// State applied to every column a state list does not mention, and to the
/// fields a mentioned column leaves out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnStateDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_pinned", skip_serializing_if = "Option::is_none")]
    pub pinned: Option<Pinned>,
    #[serde(default, deserialize_with = "deserialize_nullable", skip_serializing_if = "Option::is_none")]
    pub flex: Option<Option<f32>>,
    #[serde(default, deserialize_with = "deserialize_nullable", skip_serializing_if = "Option::is_none")]
    pub sort: Option<Option<SortDirection>>,
    #[serde(default, deserialize_with = "deserialize_nullable", skip_serializing_if = "Option::is_none")]
    pub sort_index: Option<Option<u32>>,
    #[serde(default, deserialize_with = "deserialize_nullable", skip_serializing_if = "Option::is_none")]
    pub agg_func: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_group: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_nullable", skip_serializing_if = "Option::is_none")]
    pub row_group_index: Option<Option<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_nullable", skip_serializing_if = "Option::is_none")]
    pub pivot_index: Option<Option<u32>>,
}

/// Arguments of [`ColumnModel::apply_column_state`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplyColumnStateParams {
    pub state: Option<Vec<ColumnState>>,
    /// Reorder the columns to follow `state`.
    pub apply_order: bool,
    pub default_state: Option<ColumnStateDefaults>,
}

/// Role indexes collected while applying, by column id.
#[derive(Default)]
struct RoleIndexes {
    row_group: HashMap<String, u32>,
    pivot: HashMap<String, u32>,
}

/// Outcome of applying states to one set of columns.
struct Applied {
    /// States that matched nothing, followed by the auto column states.
    leftover: Vec<ColumnState>,
    unmatched: usize,
}

fn is_auto_col_id(col_id: &str) -> bool {
    col_id.starts_with(AUTO_GROUP_COLUMN_ID)
}

impl ColumnModel {
    /// The state of every live column in display order. While pivot result
    /// columns show, the definition columns follow in their last order.
    pub fn get_column_state(&self) -> Vec<ColumnState> {
        let Some(cols) = &self.cols else {
            return Vec::new();
        };
        let mut states: Vec<ColumnState> = cols.list.iter().map(|c| self.state_of(c)).collect();

        if self.showing_pivot_result {
            let mut hidden: Vec<Arc<Column>> = self
                .col_def_cols()
                .iter()
                .filter(|c| !cols.contains(c))
                .cloned()
                .collect();
            if let Some(last_order) = &self.last_order {
                hidden.sort_by_key(|c| {
                    last_order
                        .iter()
                        .position(|o| Arc::ptr_eq(o, c))
                        .unwrap_or(usize::MAX)
                });
            }
            states.extend(hidden.iter().map(|c| self.state_of(c)));
        }
        states
    }

    fn state_of(&self, column: &Arc<Column>) -> ColumnState {
        let role_index = |role: FuncRole, active: bool| {
            let index = self
                .func_cols
                .columns(role)
                .iter()
                .position(|c| Arc::ptr_eq(c, column));
            active
                .then_some(index)
                .flatten()
                .and_then(|i| u32::try_from(i).ok())
        };
        ColumnState {
            col_id: column.id().to_string(),
            width: Some(column.actual_width()),
            hide: Some(!column.is_visible()),
            pinned: Some(column.pinned()),
            flex: Some(column.is_flex().then(|| column.flex())),
            sort: Some(column.sort()),
            sort_index: Some(column.sort_index()),
            agg_func: Some(column.agg_func().filter(|_| column.is_value_active())),
            row_group: Some(column.is_row_group_active()),
            row_group_index: Some(role_index(FuncRole::RowGroup, column.is_row_group_active())),
            pivot: Some(column.is_pivot_active()),
            pivot_index: Some(role_index(FuncRole::Pivot, column.is_pivot_active())),
        }
    }

    /// Apply a state list. Returns `false` when some state matched no
    /// column, or when nothing is loaded.
    ///
    /// States go to definition columns first; auto column states are held
    /// back until auto columns were regenerated, and states left unmatched
    /// are tried against the pivot result columns. Sends `EverythingChanged`
    /// followed by an event per kind of change.
    pub fn apply_column_state(&mut self, params: ApplyColumnStateParams, source: ColumnEventSource) -> bool {
        if self.cols().is_empty() {
            return false;
        }
        let _span = PerfSpan::new("ColumnModel::apply_column_state");
        let before = StateSnapshot::capture(self);

        let ApplyColumnStateParams {
            state,
            apply_order,
            default_state,
        } = params;
        let states = state.unwrap_or_default();
        let defaults = default_state.as_ref();

        let candidates = self.col_def_cols().to_vec();
        let mut applied = self.apply_states(&states, candidates, false, defaults);
        if !applied.leftover.is_empty() || defaults.is_some() {
            let candidates = self.pivot_result_cols().map(<[_]>::to_vec).unwrap_or_default();
            applied = self.apply_states(&applied.leftover, candidates, true, defaults);
        }

        if apply_order {
            let order: Vec<&str> = states.iter().map(|s| s.col_id.as_str()).collect();
            self.sort_cols_like_keys(&order);
        }

        self.refresh_visible(source);
        self.dispatcher.everything_changed(source);

        self.ctx.set_change_events_dispatching(true);
        before.dispatch_changes(self, source);
        self.ctx.set_change_events_dispatching(false);

        tracing::debug!(
            target: targets::COLUMN_MODEL,
            states = states.len(),
            unmatched = applied.unmatched,
            "column state applied"
        );
        applied.unmatched == 0
    }

    fn apply_states(
        &mut self,
        states: &[ColumnState],
        mut untouched: Vec<Arc<Column>>,
        pivot_result: bool,
        defaults: Option<&ColumnStateDefaults>,
    ) -> Applied {
        let mut leftover = Vec::new();
        let mut auto_states = Vec::new();
        let mut unmatched = 0;
        let mut indexes = RoleIndexes::default();

        for state in states {
            if is_auto_col_id(&state.col_id) {
                auto_states.push(state.clone());
                leftover.push(state.clone());
                continue;
            }
            let column = if pivot_result {
                self.get_pivot_result_col(&state.col_id)
            } else {
                self.get_col_def_col(state.col_id.as_str())
            };
            let Some(column) = column else {
                leftover.push(state.clone());
                unmatched += 1;
                continue;
            };
            self.sync_column_with_state(&column, &state.with_defaults(defaults), false, &mut indexes);
            untouched.retain(|c| !Arc::ptr_eq(c, &column));
        }

        if defaults.is_some() {
            for column in &untouched {
                let state = ColumnState::new(column.id()).with_defaults(defaults);
                self.sync_column_with_state(column, &state, false, &mut indexes);
            }
        }

        self.func_cols.sort_by_indexes(FuncRole::RowGroup, &indexes.row_group);
        self.func_cols.sort_by_indexes(FuncRole::Pivot, &indexes.pivot);

        self.refresh_cols();

        for state in &auto_states {
            if let Some(auto_col) = self.get_auto_col(state.col_id.as_str()) {
                self.sync_column_with_state(&auto_col, &state.with_defaults(defaults), true, &mut indexes);
            }
        }

        Applied { leftover, unmatched }
    }

    fn sync_column_with_state(
        &mut self,
        column: &Arc<Column>,
        state: &ColumnState,
        auto_col: bool,
        indexes: &mut RoleIndexes,
    ) {
        if let Some(hide) = state.hide {
            column.set_visible(!hide);
        }
        if let Some(pinned) = state.pinned {
            column.set_pinned(pinned);
        }
        if let Some(flex) = state.flex {
            column.set_flex(flex);
        }
        // A width below the minimum is ignored rather than clamped.
        if !column.is_flex()
            && let Some(width) = state.width
            && width >= column.min_width()
        {
            column.set_actual_width(width);
        }
        if let Some(sort) = state.sort {
            column.set_sort(sort);
        }
        if let Some(sort_index) = state.sort_index {
            column.set_sort_index(sort_index);
        }

        if auto_col || !column.is_primary() {
            return;
        }

        match &state.agg_func {
            Some(Some(agg_func)) => {
                column.set_agg_func(Some(agg_func.clone()));
                if !column.is_value_active() {
                    self.func_cols.add_columns(FuncRole::Value, std::slice::from_ref(column));
                }
            }
            Some(None) => {
                if column.is_value_active() {
                    self.func_cols.remove_columns(FuncRole::Value, std::slice::from_ref(column));
                }
            }
            None => {}
        }

        self.sync_role(
            column,
            FuncRole::RowGroup,
            state.row_group,
            state.row_group_index,
            &mut indexes.row_group,
        );
        self.sync_role(column, FuncRole::Pivot, state.pivot, state.pivot_index, &mut indexes.pivot);
    }

    fn sync_role(
        &mut self,
        column: &Arc<Column>,
        role: FuncRole,
        flag: Option<bool>,
        index: Option<Option<u32>>,
        indexes: &mut HashMap<String, u32>,
    ) {
        if flag.is_none() && index.is_none() {
            return;
        }
        let index = index.flatten();
        let active = contains(self.func_cols.columns(role), column);
        if index.is_some() || flag == Some(true) {
            if !active {
                self.func_cols.add_columns(role, std::slice::from_ref(column));
            }
            if let Some(index) = index {
                indexes.insert(column.id().to_string(), index);
            }
        } else if active {
            self.func_cols.remove_columns(role, std::slice::from_ref(column));
        }
    }

    /// Put every column back to what its definition asks for, in
    /// definition order.
    pub fn reset_column_state(&mut self, source: ColumnEventSource) {
        let mut next_row_group_index = RESET_FLAGGED_INDEX_START;
        let mut next_pivot_index = RESET_FLAGGED_INDEX_START;

        let columns: Vec<Arc<Column>> = self
            .col_def_cols()
            .iter()
            .chain(self.auto_cols().unwrap_or_default())
            .cloned()
            .collect();
        let states = columns
            .iter()
            .map(|column| {
                let def = column.col_def();

                let mut row_group_index = def.row_group_index.flatten().or(def.initial_row_group_index);
                let row_group = def.row_group.or(def.initial_row_group).unwrap_or(false);
                if row_group_index.is_none() && row_group {
                    row_group_index = Some(next_row_group_index);
                    next_row_group_index += 1;
                }

                let mut pivot_index = def.pivot_index.flatten().or(def.initial_pivot_index);
                let pivot = def.pivot.or(def.initial_pivot).unwrap_or(false);
                if pivot_index.is_none() && pivot {
                    pivot_index = Some(next_pivot_index);
                    next_pivot_index += 1;
                }

                ColumnState {
                    col_id: column.id().to_string(),
                    width: Some(initial_width(&def)),
                    hide: Some(def.hide.or(def.initial_hide).unwrap_or(false)),
                    pinned: Some(def.pinned.or(def.initial_pinned).unwrap_or_default()),
                    flex: Some(def.flex.flatten().or(def.initial_flex)),
                    sort: Some(def.sort.flatten().or(def.initial_sort)),
                    sort_index: Some(def.sort_index.flatten().or(def.initial_sort_index)),
                    agg_func: Some(def.agg_func.clone().flatten().or_else(|| def.initial_agg_func.clone())),
                    row_group: Some(row_group_index.is_some()),
                    row_group_index: Some(row_group_index),
                    pivot: Some(pivot_index.is_some()),
                    pivot_index: Some(pivot_index),
                }
            })
            .collect();

        self.apply_column_state(
            ApplyColumnStateParams {
                state: Some(states),
                apply_order: true,
                default_state: None,
            },
            source,
        );
    }

    /// Every column state can be diffed against: definition, pivot result
    /// and auto columns.
    fn stateful_cols(&self) -> Vec<Arc<Column>> {
        self.col_def_cols()
            .iter()
            .chain(self.pivot_result_cols().unwrap_or_default())
            .chain(self.auto_cols().unwrap_or_default())
            .cloned()
            .collect()
    }
}

/// Column state captured before a bulk change, diffed afterwards into
/// individual change events.
pub(super) struct StateSnapshot {
    row_group: Vec<Arc<Column>>,
    pivot: Vec<Arc<Column>>,
    states: Vec<ColumnState>,
}

impl StateSnapshot {
    pub(super) fn capture(model: &ColumnModel) -> Self {
        Self {
            row_group: model.func_cols.row_group_columns().to_vec(),
            pivot: model.func_cols.pivot_columns().to_vec(),
            states: model.get_column_state(),
        }
    }

    /// Send an event for every kind of change since the capture, in order:
    /// row group, pivot, value, resized, pinned, visible, sort, moved.
    pub(super) fn dispatch_changes(self, model: &ColumnModel, source: ColumnEventSource) {
        let dispatcher = &model.dispatcher;

        if let Some(changed) = list_changes(&self.row_group, model.func_cols.row_group_columns()) {
            dispatcher.row_group_changed(changed, source);
        }
        if let Some(changed) = list_changes(&self.pivot, model.func_cols.pivot_columns()) {
            dispatcher.pivot_changed(changed, source);
        }

        let before: HashMap<&str, &ColumnState> = self.states.iter().map(|s| (s.col_id.as_str(), s)).collect();
        let stateful = model.stateful_cols();
        let changed_cols = |changed: &dyn Fn(&ColumnState, &Column) -> bool| -> Vec<Arc<Column>> {
            stateful
                .iter()
                .filter(|c| before.get(c.id()).is_some_and(|state| changed(state, c)))
                .cloned()
                .collect()
        };

        let values = changed_cols(&|state, column| {
            let agg_before = state.agg_func.clone().flatten();
            let was_active = agg_before.is_some();
            was_active != column.is_value_active() || (was_active && agg_before != column.agg_func())
        });
        if !values.is_empty() {
            dispatcher.value_changed(values, source);
        }

        let resized = changed_cols(&|state, column| state.width != Some(column.actual_width()));
        dispatcher.column_resized(resized, Vec::new(), true, source);

        let pinned = changed_cols(&|state, column| state.pinned != Some(column.pinned()));
        dispatcher.column_pinned(pinned, source);

        let visible = changed_cols(&|state, column| state.hide == Some(column.is_visible()));
        dispatcher.column_visible(visible, source);

        let sorted = changed_cols(&|state, column| {
            state.sort != Some(column.sort()) || state.sort_index != Some(column.sort_index())
        });
        if !sorted.is_empty() {
            dispatcher.sort_changed(sorted, source);
        }

        let moved = moved_cols(&self.states, model);
        if !moved.is_empty() {
            dispatcher.column_moved(moved, None, true, source);
        }
    }
}

/// Every column in one list but not the other, or `None` when both hold
/// the same ids in the same order.
fn list_changes(before: &[Arc<Column>], after: &[Arc<Column>]) -> Option<Vec<Arc<Column>>> {
    if before.iter().map(|c| c.id()).eq(after.iter().map(|c| c.id())) {
        return None;
    }
    let before_ids: HashSet<&str> = before.iter().map(|c| c.id()).collect();
    let after_ids: HashSet<&str> = after.iter().map(|c| c.id()).collect();
    let changed = before
        .iter()
        .filter(|c| !after_ids.contains(c.id()))
        .chain(after.iter().filter(|c| !before_ids.contains(c.id())))
        .cloned()
        .collect();
    Some(changed)
}

/// Columns present before and after whose relative position changed.
fn moved_cols(before: &[ColumnState], model: &ColumnModel) -> Vec<Arc<Column>> {
    let after = model.get_column_state();
    let after_ids: HashSet<&str> = after.iter().map(|s| s.col_id.as_str()).collect();
    let before_ids: HashSet<&str> = before.iter().map(|s| s.col_id.as_str()).collect();

    let before_kept = before.iter().filter(|s| after_ids.contains(s.col_id.as_str()));
    let after_kept = after.iter().filter(|s| before_ids.contains(s.col_id.as_str()));
    before_kept
        .zip(after_kept)
        .filter(|(b, a)| b.col_id != a.col_id)
        .filter_map(|(b, _)| model.get_col(b.col_id.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::col_def::{ColDef, ColGroupDef, ColumnDef};
    use crate::context::GridContext;
    use crate::events::ColumnEventKind;
    use crate::options::GridOptions;
    use parking_lot::Mutex;

    fn model(defs: Vec<ColumnDef>) -> ColumnModel {
        let mut model = ColumnModel::new(GridContext::new(GridOptions::default()));
        model.set_column_defs(defs, ColumnEventSource::Api);
        model
    }

    fn abc() -> Vec<ColumnDef> {
        ["a", "b", "c"].iter().map(|f| ColDef::field(*f).into()).collect()
    }

    fn ids(model: &ColumnModel) -> Vec<&str> {
        model.cols().iter().map(|c| c.id()).collect()
    }

    fn record(model: &ColumnModel) -> Arc<Mutex<Vec<ColumnEventKind>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        model.ctx().events().subscribe(move |e| sink.lock().push(e.kind()));
        seen
    }

    #[test]
    fn test_state_captures_every_column() {
        let model = model(vec![
            ColDef::field("a").with_width(120.0).with_pinned("left").into(),
            ColDef::field("b").with_hide(true).with_agg_func("avg").into(),
        ]);
        let state = model.get_column_state();
        assert_eq!(state.len(), 2);
        assert_eq!(state[0].width, Some(120.0));
        assert_eq!(state[0].pinned, Some(Pinned::Left));
        assert_eq!(state[1].hide, Some(true));
        assert_eq!(state[1].agg_func, Some(Some("avg".into())));
        assert_eq!(state[0].agg_func, Some(None));
    }

    #[test]
    fn test_apply_sends_everything_changed_then_diffs() {
        let mut model = model(abc());
        let seen = record(&model);

        let applied = model.apply_column_state(
            ApplyColumnStateParams {
                state: Some(vec![
                    ColumnState {
                        width: Some(90.0),
                        ..ColumnState::new("a")
                    },
                    ColumnState {
                        hide: Some(true),
                        ..ColumnState::new("b")
                    },
                ]),
                ..Default::default()
            },
            ColumnEventSource::Api,
        );
        assert!(applied);
        let seen = seen.lock();
        let everything = seen.iter().position(|k| *k == ColumnEventKind::EverythingChanged);
        let resized = seen.iter().position(|k| *k == ColumnEventKind::ColumnResized);
        let visible = seen.iter().position(|k| *k == ColumnEventKind::ColumnVisible);
        assert!(everything.is_some() && visible.is_some());
        assert!(everything < resized && resized < visible);
        assert!(!seen.contains(&ColumnEventKind::ColumnMoved));
    }

    #[test]
    fn test_unknown_state_reports_false() {
        let mut model = model(abc());
        let applied = model.apply_column_state(
            ApplyColumnStateParams {
                state: Some(vec![ColumnState::new("missing")]),
                ..Default::default()
            },
            ColumnEventSource::Api,
        );
        assert!(!applied);
    }

    #[test]
    fn test_apply_order_and_moved_event() {
        let mut model = model(abc());
        let seen = record(&model);
        model.apply_column_state(
            ApplyColumnStateParams {
                state: Some(vec![ColumnState::new("c"), ColumnState::new("a")]),
                apply_order: true,
                ..Default::default()
            },
            ColumnEventSource::Api,
        );
        assert_eq!(ids(&model), vec!["c", "a", "b"]);
        assert!(seen.lock().contains(&ColumnEventKind::ColumnMoved));
    }

    #[test]
    fn test_apply_order_keeps_married_children() {
        let mut model = model(vec![
            ColGroupDef::new("g", vec![ColDef::field("a").into(), ColDef::field("b").into()])
                .with_marry_children(true)
                .into(),
            ColDef::field("c").into(),
        ]);
        model.apply_column_state(
            ApplyColumnStateParams {
                state: Some(vec![ColumnState::new("a"), ColumnState::new("c"), ColumnState::new("b")]),
                apply_order: true,
                ..Default::default()
            },
            ColumnEventSource::Api,
        );
        assert_eq!(ids(&model), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_row_group_state_follows_indexes() {
        let mut model = model(abc());
        let seen = record(&model);
        model.apply_column_state(
            ApplyColumnStateParams {
                state: Some(vec![
                    ColumnState {
                        row_group_index: Some(Some(1)),
                        ..ColumnState::new("a")
                    },
                    ColumnState {
                        row_group: Some(true),
                        row_group_index: Some(Some(0)),
                        ..ColumnState::new("c")
                    },
                ]),
                ..Default::default()
            },
            ColumnEventSource::Api,
        );
        let row_groups: Vec<&str> = model.func_cols().row_group_columns().iter().map(|c| c.id()).collect();
        assert_eq!(row_groups, vec!["c", "a"]);
        assert!(model.auto_cols().is_some());
        assert!(seen.lock().contains(&ColumnEventKind::ColumnRowGroupChanged));
    }

    #[test]
    fn test_default_state_reaches_unmentioned_columns() {
        let mut model = model(vec![
            ColDef::field("a").with_pinned("left").into(),
            ColDef::field("b").with_pinned("right").into(),
        ]);
        model.apply_column_state(
            ApplyColumnStateParams {
                default_state: Some(ColumnStateDefaults {
                    pinned: Some(Pinned::Unpinned),
                    ..Default::default()
                }),
                ..Default::default()
            },
            ColumnEventSource::Api,
        );
        assert!(model.cols().iter().all(|c| !c.is_pinned()));
    }

    #[test]
    fn test_width_below_minimum_is_ignored() {
        let mut model = model(vec![ColDef::field("a").with_width_limits(Some(50.0), None).into()]);
        model.apply_column_state(
            ApplyColumnStateParams {
                state: Some(vec![ColumnState {
                    width: Some(10.0),
                    ..ColumnState::new("a")
                }]),
                ..Default::default()
            },
            ColumnEventSource::Api,
        );
        assert_eq!(model.cols()[0].actual_width(), 200.0);
    }

    #[test]
    fn test_reset_restores_definitions() {
        let mut model = model(vec![
            ColDef::field("a").with_width(150.0).into(),
            ColDef::field("b").with_row_group(true).into(),
        ]);
        model.set_column_widths(&[("a", 300.0)], true, ColumnEventSource::Api);
        model.set_cols_visible(&["a".into()], false, ColumnEventSource::Api);
        model.remove_row_group_columns(&["b".into()], ColumnEventSource::Api);
        model.move_column("a", 1, ColumnEventSource::Api);

        model.reset_column_state(ColumnEventSource::Api);
        let a = model.get_col("a");
        assert!(a.as_ref().is_some_and(|c| c.is_visible() && c.actual_width() == 150.0));
        let row_groups: Vec<&str> = model.func_cols().row_group_columns().iter().map(|c| c.id()).collect();
        assert_eq!(row_groups, vec!["b"]);
        assert_eq!(ids(&model), vec!["grid-auto-column", "a", "b"]);
    }

    #[test]
    fn test_state_round_trips_through_json() {
        let model = model(vec![ColDef::field("a").with_sort(SortDirection::Desc).into()]);
        let json = serde_json::to_value(model.get_column_state()).unwrap_or_default();
        assert_eq!(json[0]["colId"], "a");
        assert_eq!(json[0]["sort"], "desc");
        assert!(json[0]["pinned"].is_null());
        assert!(json[0]["rowGroupIndex"].is_null());

        let back: Vec<ColumnState> = serde_json::from_value(json).unwrap_or_default();
        assert_eq!(back, model.get_column_state());
    }
}
