//! Function columns: the columns rows are grouped by, pivoted on or
//! aggregated.

use std::collections::HashMap;
use std::sync::Arc;

use crate::col_def::ColDef;
use crate::columns::column::Column;

/// Aggregation given to a value column that has none.
pub const DEFAULT_AGG_FUNC: &str = "sum";

/// The role a function column plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuncRole {
    RowGroup,
    Pivot,
    Value,
}

impl FuncRole {
    fn set_active(self, column: &Column, active: bool) -> bool {
        match self {
            FuncRole::RowGroup => column.set_row_group_active(active),
            FuncRole::Pivot => column.set_pivot_active(active),
            FuncRole::Value => column.set_value_active(active),
        }
    }

    /// Activate a column picked through the API rather than a definition.
    fn activate(self, column: &Column) -> bool {
        let changed = self.set_active(column, true);
        if self == FuncRole::Value && column.agg_func().is_none() {
            column.set_agg_func(Some(DEFAULT_AGG_FUNC.to_string()));
        }
        changed
    }

    /// How a definition declares the role: the explicit flag, the explicit
    /// index, the initial flag and the initial index.
    fn declared(self, def: &ColDef) -> Declared {
        match self {
            FuncRole::RowGroup => Declared {
                value: def.row_group,
                index: def.row_group_index,
                initial_value: def.initial_row_group,
                initial_index: def.initial_row_group_index,
            },
            FuncRole::Pivot => Declared {
                value: def.pivot,
                index: def.pivot_index,
                initial_value: def.initial_pivot,
                initial_index: def.initial_pivot_index,
            },
            // Value columns have no order, so no index variants.
            FuncRole::Value => Declared {
                value: def
                    .agg_func
                    .as_ref()
                    .map(|agg| agg.as_deref().is_some_and(|a| !a.is_empty())),
                index: None,
                initial_value: def
                    .initial_agg_func
                    .as_deref()
                    .map(|agg| !agg.is_empty()),
                initial_index: None,
            },
        }
    }
}

/// Declarative role state read from a definition.
///
/// `index` distinguishes "not set" (`None`) from "explicitly cleared"
/// (`Some(None)`).
struct Declared {
    value: Option<bool>,
    index: Option<Option<u32>>,
    initial_value: Option<bool>,
    initial_index: Option<u32>,
}

impl Declared {
    fn order_index(&self) -> Option<u32> {
        self.index.flatten().or(self.initial_index)
    }
}

/// The active row-group, pivot and value columns.
#[derive(Debug, Default, Clone)]
pub struct FuncColsService {
    row_group_cols: Vec<Arc<Column>>,
    pivot_cols: Vec<Arc<Column>>,
    value_cols: Vec<Arc<Column>>,
}

impl FuncColsService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_group_columns(&self) -> &[Arc<Column>] {
        &self.row_group_cols
    }

    pub fn pivot_columns(&self) -> &[Arc<Column>] {
        &self.pivot_cols
    }

    pub fn value_columns(&self) -> &[Arc<Column>] {
        &self.value_cols
    }

    pub fn columns(&self, role: FuncRole) -> &[Arc<Column>] {
        match role {
            FuncRole::RowGroup => &self.row_group_cols,
            FuncRole::Pivot => &self.pivot_cols,
            FuncRole::Value => &self.value_cols,
        }
    }

    fn columns_mut(&mut self, role: FuncRole) -> &mut Vec<Arc<Column>> {
        match role {
            FuncRole::RowGroup => &mut self.row_group_cols,
            FuncRole::Pivot => &mut self.pivot_cols,
            FuncRole::Value => &mut self.value_cols,
        }
    }

    /// Rebuild every role list from the definitions of `primary_cols`.
    ///
    /// `old_cols` are the definition columns before the reload; columns not
    /// among them are new and may use the `initial*` variants.
    pub fn extract_cols(&mut self, primary_cols: &[Arc<Column>], old_cols: Option<&[Arc<Column>]>) {
        let old_cols = old_cols.unwrap_or_default();
        for role in [FuncRole::RowGroup, FuncRole::Pivot, FuncRole::Value] {
            let previous = std::mem::take(self.columns_mut(role));
            let extracted = extract_role(role, primary_cols, old_cols, &previous);
            *self.columns_mut(role) = extracted;
        }

        // New value columns take the aggregation their definition names.
        for column in &self.value_cols {
            let def = column.col_def();
            match def.agg_func.clone().flatten().filter(|a| !a.is_empty()) {
                Some(agg) => {
                    column.set_agg_func(Some(agg));
                }
                None if column.agg_func().is_none() => {
                    let initial = def.initial_agg_func.clone().filter(|a| !a.is_empty());
                    column.set_agg_func(Some(initial.unwrap_or_else(|| DEFAULT_AGG_FUNC.to_string())));
                }
                None => {}
            }
        }
    }

    /// Replace the list of `role`. Returns the columns whose activation
    /// changed.
    pub fn set_columns(&mut self, role: FuncRole, columns: Vec<Arc<Column>>) -> Vec<Arc<Column>> {
        let previous = std::mem::take(self.columns_mut(role));
        let mut changed = Vec::new();
        for column in &previous {
            if !contains(&columns, column) && role.set_active(column, false) {
                changed.push(column.clone());
            }
        }
        for column in &columns {
            if role.activate(column) || !contains(&previous, column) {
                push_unique(&mut changed, column);
            }
        }
        *self.columns_mut(role) = dedup(columns);
        changed
    }

    /// Append to the list of `role`. Returns the columns that were added.
    pub fn add_columns(&mut self, role: FuncRole, columns: &[Arc<Column>]) -> Vec<Arc<Column>> {
        let mut added = Vec::new();
        for column in columns {
            if contains(self.columns(role), column) {
                continue;
            }
            role.activate(column);
            self.columns_mut(role).push(column.clone());
            added.push(column.clone());
        }
        added
    }

    /// Remove from the list of `role`. Returns the columns that were removed.
    pub fn remove_columns(&mut self, role: FuncRole, columns: &[Arc<Column>]) -> Vec<Arc<Column>> {
        let mut removed = Vec::new();
        for column in columns {
            let list = self.columns_mut(role);
            let Some(index) = list.iter().position(|c| Arc::ptr_eq(c, column)) else {
                continue;
            };
            list.remove(index);
            role.set_active(column, false);
            removed.push(column.clone());
        }
        removed
    }

    /// Order the list of `role` by the given indexes.
    ///
    /// Columns with an index come first, lowest index first. The others keep
    /// their relative order after them.
    pub fn sort_by_indexes(&mut self, role: FuncRole, indexes: &HashMap<String, u32>) {
        if indexes.is_empty() {
            return;
        }
        self.columns_mut(role)
            .sort_by_key(|column| match indexes.get(column.id()) {
                Some(index) => (0, *index),
                None => (1, 0),
            });
    }

    /// Whether `column` is among the row-group columns.
    pub fn is_row_group_column(&self, column: &Arc<Column>) -> bool {
        contains(&self.row_group_cols, column)
    }
}

fn extract_role(
    role: FuncRole,
    primary_cols: &[Arc<Column>],
    old_cols: &[Arc<Column>],
    previous: &[Arc<Column>],
) -> Vec<Arc<Column>> {
    let mut with_index = Vec::new();
    let mut with_value = Vec::new();

    for column in primary_cols {
        let is_new = !contains(old_cols, column);
        let declared = role.declared(&column.col_def());

        let include = match (declared.value, declared.index) {
            (Some(value), _) => value,
            (None, Some(index)) => index.is_some(),
            // Existing columns keep what the user did to them since.
            (None, None) if !is_new => contains(previous, column),
            (None, None) => match (declared.initial_value, declared.initial_index) {
                (Some(initial), _) => initial,
                (None, initial_index) => initial_index.is_some(),
            },
        };
        if !include {
            continue;
        }

        let use_index = if is_new {
            declared.index.flatten().is_some() || declared.initial_index.is_some()
        } else {
            declared.index.flatten().is_some()
        };
        if use_index {
            with_index.push((declared.order_index().unwrap_or(0), column.clone()));
        } else {
            with_value.push(column.clone());
        }
    }

    // Indexed columns first, then flagged ones keeping their previous order.
    with_index.sort_by_key(|(index, _)| *index);
    let mut result: Vec<Arc<Column>> = with_index.into_iter().map(|(_, c)| c).collect();
    for column in previous {
        if contains(&with_value, column) {
            push_unique(&mut result, column);
        }
    }
    for column in &with_value {
        push_unique(&mut result, column);
    }

    for column in previous {
        if !contains(&result, column) {
            role.set_active(column, false);
        }
    }
    for column in &result {
        if !contains(previous, column) {
            role.set_active(column, true);
        }
    }
    result
}

fn contains(list: &[Arc<Column>], column: &Arc<Column>) -> bool {
    list.iter().any(|c| Arc::ptr_eq(c, column))
}

fn push_unique(list: &mut Vec<Arc<Column>>, column: &Arc<Column>) {
    if !contains(list, column) {
        list.push(column.clone());
    }
}

fn dedup(columns: Vec<Arc<Column>>) -> Vec<Arc<Column>> {
    let mut result = Vec::with_capacity(columns.len());
    for column in &columns {
        push_unique(&mut result, column);
    }
    result
}
