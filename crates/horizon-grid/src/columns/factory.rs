//! Column tree factory.
//!
//! Turns a list of definitions into a balanced tree of [`ProvidedColumn`]s,
//! reusing the columns and groups of a previous tree where definitions
//! match them. Balancing inserts padding groups so every leaf column ends up
//! at the same depth.

use std::collections::BTreeMap;
use std::sync::Arc;

use horizon_grid_core::logging::targets;

use crate::col_def::{ColDef, ColGroupDef, ColumnDef, DefHandle};
use crate::columns::column::Column;
use crate::columns::key_creator::ColumnKeyCreator;
use crate::columns::provided::{ProvidedColumn, depth_first_original_tree_search};
use crate::columns::provided_group::ProvidedColumnGroup;
use crate::context::GridContext;
use crate::error::ColumnWarning;

/// Prefix of the padding groups wrapped around auto-group columns.
pub const AUTO_GROUP_PADDING_PREFIX: &str = "grid-auto-padding-";

/// Header/cell class of right aligned built-in column types.
pub const RIGHT_ALIGNED_HEADER_CLASS: &str = "grid-right-aligned-header";
pub const RIGHT_ALIGNED_CELL_CLASS: &str = "grid-right-aligned-cell";

/// The column types every grid knows.
pub fn default_column_types() -> BTreeMap<String, ColDef> {
    let right_aligned = ColDef {
        header_class: Some(RIGHT_ALIGNED_HEADER_CLASS.to_string()),
        cell_class: Some(RIGHT_ALIGNED_CELL_CLASS.to_string()),
        ..ColDef::default()
    };
    BTreeMap::from([
        ("numericColumn".to_string(), right_aligned.clone()),
        ("rightAligned".to_string(), right_aligned),
    ])
}

/// A built tree and its depth.
#[derive(Debug, Clone)]
pub struct ColumnTree {
    pub tree: Vec<ProvidedColumn>,
    pub depth: usize,
}

/// What a column definition is matched on when looking for a column to reuse.
struct LeafKey {
    col_id: Option<String>,
    field: Option<String>,
    handle: DefHandle,
}

impl LeafKey {
    fn of(def: &ColDef) -> Self {
        Self {
            col_id: def.col_id.clone().filter(|id| !id.is_empty()),
            field: def.field.clone(),
            handle: def.handle,
        }
    }
}

/// Existing entities claimed by the definitions of one build.
///
/// Definitions with an explicit id claim first, from the last definition to
/// the first, so the later of two duplicate ids wins the entity. Definitions
/// matched by field or handle then claim from what is left, in definition
/// order. During the build the claims are taken back in definition order.
#[derive(Default)]
struct ReuseClaims {
    columns: Vec<Option<Arc<Column>>>,
    groups: Vec<Option<Arc<ProvidedColumnGroup>>>,
    next_column: usize,
    next_group: usize,
}

impl ReuseClaims {
    fn compute(
        defs: &[ColumnDef],
        mut existing_cols: Vec<Arc<Column>>,
        mut existing_groups: Vec<Arc<ProvidedColumnGroup>>,
    ) -> Self {
        let mut leaf_keys = Vec::new();
        let mut group_ids = Vec::new();
        flatten_defs(defs, &mut leaf_keys, &mut group_ids);

        let mut columns = vec![None; leaf_keys.len()];
        for (slot, key) in columns.iter_mut().zip(&leaf_keys).rev() {
            if key.col_id.is_some() {
                *slot = find_existing_column(key, &mut existing_cols);
            }
        }
        for (slot, key) in columns.iter_mut().zip(&leaf_keys) {
            if key.col_id.is_none() {
                *slot = find_existing_column(key, &mut existing_cols);
            }
        }

        let mut groups = vec![None; group_ids.len()];
        for (slot, group_id) in groups.iter_mut().zip(&group_ids).rev() {
            *slot = group_id
                .as_deref()
                .and_then(|id| find_existing_group(id, &mut existing_groups));
        }

        Self {
            columns,
            groups,
            next_column: 0,
            next_group: 0,
        }
    }

    fn take_column(&mut self) -> Option<Arc<Column>> {
        let claimed = self.columns.get_mut(self.next_column).and_then(Option::take);
        self.next_column += 1;
        claimed
    }

    fn take_group(&mut self) -> Option<Arc<ProvidedColumnGroup>> {
        let claimed = self.groups.get_mut(self.next_group).and_then(Option::take);
        self.next_group += 1;
        claimed
    }
}

/// Collect leaf keys and group ids in the order the build visits them.
fn flatten_defs(defs: &[ColumnDef], leaf_keys: &mut Vec<LeafKey>, group_ids: &mut Vec<Option<String>>) {
    for def in defs {
        match def {
            ColumnDef::Group(group) if !group.children.is_empty() => {
                group_ids.push(group.group_id.clone().filter(|id| !id.is_empty()));
                flatten_defs(&group.children, leaf_keys, group_ids);
            }
            ColumnDef::Group(group) => leaf_keys.push(LeafKey::of(&group.as_leaf_def())),
            ColumnDef::Column(col) => leaf_keys.push(LeafKey::of(col)),
        }
    }
}

/// Find and remove the column a definition should reuse.
///
/// An explicit id matches on id only. Without an id the field is used, and
/// without either the definition handle.
fn find_existing_column(key: &LeafKey, existing: &mut Vec<Arc<Column>>) -> Option<Arc<Column>> {
    let index = existing.iter().position(|column| {
        let Some(user_def) = column.user_provided_col_def() else {
            return false;
        };
        if let Some(col_id) = &key.col_id {
            return column.id() == col_id;
        }
        if let Some(field) = &key.field {
            return user_def.field.as_ref() == Some(field);
        }
        user_def.handle == key.handle
    })?;
    Some(existing.remove(index))
}

fn find_existing_group(
    group_id: &str,
    existing: &mut Vec<Arc<ProvidedColumnGroup>>,
) -> Option<Arc<ProvidedColumnGroup>> {
    let index = existing
        .iter()
        .position(|group| group.col_group_def().is_some() && group.id() == group_id)?;
    Some(existing.remove(index))
}

/// Number of group levels above the deepest leaf.
fn find_max_depth(tree: &[ProvidedColumn], depth: usize) -> usize {
    tree.iter()
        .filter_map(ProvidedColumn::as_group)
        .map(|group| find_max_depth(&group.children(), depth + 1))
        .fold(depth, usize::max)
}

/// Depth of an already balanced tree, read along its first branch.
fn find_depth(tree: &[ProvidedColumn]) -> usize {
    let mut depth = 0;
    let mut pointer = tree.first().cloned();
    while let Some(ProvidedColumn::Group(group)) = pointer {
        depth += 1;
        pointer = group.children().first().cloned();
    }
    depth
}

/// Builds and reconciles column trees.
#[derive(Clone)]
pub struct ColumnFactory {
    ctx: Arc<GridContext>,
}

impl ColumnFactory {
    pub fn new(ctx: Arc<GridContext>) -> Self {
        Self { ctx }
    }

    /// Build a balanced tree from `defs`.
    ///
    /// Columns and groups of `existing_tree` are reused when a definition
    /// matches them. Nodes of `existing_tree` that are not reused are left
    /// alone; the caller destroys them once the new tree is in place.
    #[tracing::instrument(skip_all, target = "horizon_grid::columns::factory", level = "debug")]
    pub fn create_column_tree(
        &self,
        defs: &[ColumnDef],
        primary: bool,
        existing_tree: Option<&[ProvidedColumn]>,
    ) -> ColumnTree {
        let mut keys = ColumnKeyCreator::new();
        let (existing_cols, existing_groups) = extract_existing_tree_data(existing_tree);

        // Surviving columns keep their ids; only new ones are minted.
        keys.add_existing_keys(existing_cols.iter().map(|c| c.id().to_string()));

        let mut claims = ReuseClaims::compute(defs, existing_cols, existing_groups);
        let unbalanced = self.recursively_create_columns(defs, 0, primary, &mut claims, &mut keys);
        let depth = find_max_depth(&unbalanced, 0);
        tracing::debug!(target: targets::COLUMN_FACTORY, depth, primary, "column tree depth");

        let tree = self.balance_column_tree(&unbalanced, 0, depth, &mut keys);

        depth_first_original_tree_search(None, &tree, &mut |child, parent| {
            if let ProvidedColumn::Group(group) = child {
                group.setup_expandable();
            }
            child.set_original_parent(parent);
        });

        ColumnTree { tree, depth }
    }

    /// Wrap each auto-group column in padding groups matching the depth of
    /// `live_tree`.
    pub fn create_for_auto_groups(
        &self,
        auto_cols: &[Arc<Column>],
        live_tree: &[ProvidedColumn],
    ) -> ColumnTree {
        let depth = find_depth(live_tree);
        let tree = auto_cols
            .iter()
            .map(|column| self.create_auto_group_tree_item(depth, column))
            .collect();
        ColumnTree { tree, depth }
    }

    fn create_auto_group_tree_item(&self, depth: usize, column: &Arc<Column>) -> ProvidedColumn {
        let mut next = ProvidedColumn::Column(column.clone());
        for level in (0..depth).rev() {
            let group = ProvidedColumnGroup::new(
                self.ctx.beans(),
                Some(self.create_merged_col_group_def(None)),
                format!("{AUTO_GROUP_PADDING_PREFIX}{}_{level}", column.id()),
                true,
                level,
            );
            group.set_children(vec![next.clone()]);
            next.set_original_parent(Some(&group));
            next = ProvidedColumn::Group(group);
        }
        if depth == 0 {
            column.set_original_parent(None);
        }
        next
    }

    fn recursively_create_columns(
        &self,
        defs: &[ColumnDef],
        level: usize,
        primary: bool,
        claims: &mut ReuseClaims,
        keys: &mut ColumnKeyCreator,
    ) -> Vec<ProvidedColumn> {
        defs.iter()
            .map(|def| match def {
                ColumnDef::Group(group) if !group.children.is_empty() => ProvidedColumn::Group(
                    self.create_column_group(group, level, primary, claims, keys),
                ),
                ColumnDef::Group(group) => ProvidedColumn::Column(self.create_column(
                    &group.as_leaf_def(),
                    primary,
                    claims,
                    keys,
                )),
                ColumnDef::Column(col) => {
                    ProvidedColumn::Column(self.create_column(col, primary, claims, keys))
                }
            })
            .collect()
    }

    fn create_column_group(
        &self,
        def: &ColGroupDef,
        level: usize,
        primary: bool,
        claims: &mut ReuseClaims,
        keys: &mut ColumnKeyCreator,
    ) -> Arc<ProvidedColumnGroup> {
        let merged = self.create_merged_col_group_def(Some(def));
        let requested = def.group_id.as_deref().or(merged.group_id.as_deref());
        let group_id = keys.unique_group_key(requested);
        if let Some(requested) = requested.filter(|r| !r.is_empty() && *r != group_id) {
            self.ctx.warnings().warn(ColumnWarning::DuplicateGroupId {
                requested: requested.to_string(),
                assigned: group_id.clone(),
            });
        }

        let existing = claims.take_group();
        let children = self.recursively_create_columns(&def.children, level + 1, primary, claims, keys);

        let group = match existing {
            Some(group) if group.id() == group_id => {
                group.set_col_group_def(merged);
                group.set_level(level);
                group
            }
            previous => {
                let group = ProvidedColumnGroup::new(self.ctx.beans(), Some(merged), group_id, false, level);
                if let Some(previous) = previous {
                    group.set_expanded(previous.is_expanded());
                }
                group
            }
        };
        group.set_children(children);
        group
    }

    fn create_column(
        &self,
        def: &ColDef,
        primary: bool,
        claims: &mut ReuseClaims,
        keys: &mut ColumnKeyCreator,
    ) -> Arc<Column> {
        match claims.take_column() {
            Some(column) => {
                let merged = self.add_column_default_and_types(def);
                column.set_col_def(merged.clone(), Some(def.clone()));
                apply_column_state(&column, &merged);
                column
            }
            None => {
                let col_id = keys.unique_column_key(def.col_id.as_deref(), def.field.as_deref());
                let merged = self.add_column_default_and_types(def);
                Column::new(self.ctx.beans(), merged, Some(def.clone()), col_id, primary)
            }
        }
    }

    fn balance_column_tree(
        &self,
        unbalanced: &[ProvidedColumn],
        current_depth: usize,
        column_depth: usize,
        keys: &mut ColumnKeyCreator,
    ) -> Vec<ProvidedColumn> {
        let mut result = Vec::with_capacity(unbalanced.len());
        let has_groups = unbalanced.iter().any(ProvidedColumn::is_group);

        for child in unbalanced {
            if let ProvidedColumn::Group(group) = child {
                let children =
                    self.balance_column_tree(&group.children(), current_depth + 1, column_depth, keys);
                group.set_children(children);
                result.push(child.clone());
                continue;
            }

            // A column above the deepest level gets a chain of padding groups.
            let mut first_padded: Option<Arc<ProvidedColumnGroup>> = None;
            let mut current_padded: Option<Arc<ProvidedColumnGroup>> = None;
            for level in current_depth..column_depth {
                let padded = ProvidedColumnGroup::new(
                    self.ctx.beans(),
                    Some(self.create_merged_col_group_def(None)),
                    keys.unique_group_key(None),
                    true,
                    level,
                );
                if let Some(current) = &current_padded {
                    current.set_children(vec![ProvidedColumn::Group(padded.clone())]);
                }
                first_padded.get_or_insert_with(|| padded.clone());
                current_padded = Some(padded);
            }

            let (Some(first), Some(current)) = (first_padded, current_padded) else {
                result.push(child.clone());
                continue;
            };

            result.push(ProvidedColumn::Group(first));
            if has_groups {
                current.set_children(vec![child.clone()]);
            } else {
                // A level of bare columns is wrapped as one run.
                current.set_children(unbalanced.to_vec());
                break;
            }
        }

        result
    }

    /// Merge the default definition and the definition's column types under
    /// `def`.
    pub fn add_column_default_and_types(&self, def: &ColDef) -> ColDef {
        let (default_col_def, user_types) = self
            .ctx
            .options()
            .with(|o| (o.default_col_def.clone(), o.column_types.clone()));

        let mut merged = default_col_def.unwrap_or_default();
        merged.handle = def.handle;

        let type_keys = def.col_type.clone().or_else(|| merged.col_type.clone());
        if let Some(type_keys) = type_keys {
            self.assign_column_types(&type_keys, &user_types, &mut merged);
        }

        merged.merge_from(def);
        merged
    }

    fn assign_column_types(
        &self,
        type_keys: &[String],
        user_types: &BTreeMap<String, ColDef>,
        merged: &mut ColDef,
    ) {
        let warnings = self.ctx.warnings();
        let mut all_types = default_column_types();
        for (key, col_type) in user_types {
            if all_types.contains_key(key) {
                warnings.warn_once(ColumnWarning::DefaultColumnTypeOverride {
                    type_name: key.clone(),
                });
                continue;
            }
            let mut col_type = col_type.clone();
            if col_type.col_type.take().is_some() {
                warnings.warn_once(ColumnWarning::ColumnTypeWithType {
                    type_name: key.clone(),
                });
            }
            all_types.insert(key.clone(), col_type);
        }

        for key in type_keys {
            match all_types.get(key) {
                Some(col_type) => merged.merge_from(col_type),
                None => {
                    warnings.warn_once(ColumnWarning::UnknownColumnType {
                        type_name: key.clone(),
                    });
                }
            }
        }
    }

    /// Merge the default group definition under `def`.
    ///
    /// The result never carries children; the tree holds those.
    pub fn create_merged_col_group_def(&self, def: Option<&ColGroupDef>) -> ColGroupDef {
        let mut merged = self
            .ctx
            .options()
            .with(|o| o.default_col_group_def.clone())
            .unwrap_or_default();
        merged.children = Vec::new();
        if let Some(def) = def {
            merged.merge_from(def);
            merged.handle = def.handle;
        }
        merged
    }
}

fn extract_existing_tree_data(
    existing_tree: Option<&[ProvidedColumn]>,
) -> (Vec<Arc<Column>>, Vec<Arc<ProvidedColumnGroup>>) {
    let mut columns = Vec::new();
    let mut groups = Vec::new();
    if let Some(tree) = existing_tree {
        depth_first_original_tree_search(None, tree, &mut |node, _| match node {
            ProvidedColumn::Column(column) => columns.push(column.clone()),
            ProvidedColumn::Group(group) => groups.push(group.clone()),
        });
    }
    (columns, groups)
}

/// Reapply the declarative state of a merged definition to a reused column.
pub fn apply_column_state(column: &Column, def: &ColDef) {
    if let Some(flex) = def.flex {
        column.set_flex(flex);
    }

    // Width is only applied to columns that are not flexing. Without a width
    // the current one is set again so changed limits take effect.
    if column.flex() <= 0.0 {
        let width = def.width.unwrap_or_else(|| column.actual_width());
        column.set_actual_width(width);
    }

    if let Some(sort) = def.sort {
        column.set_sort(sort);
    }
    if let Some(sort_index) = def.sort_index {
        column.set_sort_index(sort_index);
    }
    if let Some(hide) = def.hide {
        column.set_visible(!hide);
    }
    if let Some(pinned) = def.pinned {
        column.set_pinned(pinned);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::col_def::{Pinned, SortDirection};
    use crate::options::GridOptions;

    fn factory(options: GridOptions) -> (Arc<GridContext>, ColumnFactory) {
        let ctx = GridContext::new(options);
        (ctx.clone(), ColumnFactory::new(ctx))
    }

    fn leaf_depths(tree: &[ProvidedColumn], depth: usize, out: &mut Vec<(String, usize)>) {
        for node in tree {
            match node {
                ProvidedColumn::Column(c) => out.push((c.id().to_string(), depth)),
                ProvidedColumn::Group(g) => leaf_depths(&g.children(), depth + 1, out),
            }
        }
    }

    #[test]
    fn test_mixed_level_pads_only_bare_columns() {
        let (_ctx, factory) = factory(GridOptions::default());
        let defs = vec![
            ColDef::field("a").into(),
            ColGroupDef::new("g", vec![ColDef::field("b").into()]).into(),
            ColDef::field("c").into(),
        ];
        let built = factory.create_column_tree(&defs, true, None);

        assert_eq!(built.depth, 1);
        assert_eq!(built.tree.len(), 3);
        let a_parent = built.tree[0].as_group().unwrap();
        assert!(a_parent.is_padding());
        assert_eq!(a_parent.children()[0].id(), "a");
        assert_eq!(built.tree[1].id(), "g");
        assert!(built.tree[2].as_group().unwrap().is_padding());
    }

    #[test]
    fn test_column_only_level_is_wrapped_as_one_run() {
        let (_ctx, factory) = factory(GridOptions::default());
        let defs = vec![
            ColGroupDef::new(
                "outer",
                vec![
                    ColGroupDef::new("inner", vec![ColDef::field("a").into()]).into(),
                    ColGroupDef::anonymous(vec![ColDef::field("b").into(), ColDef::field("c").into()]).into(),
                ],
            )
            .into(),
        ];
        let built = factory.create_column_tree(&defs, true, None);
        assert_eq!(built.depth, 2);

        let mut depths = Vec::new();
        leaf_depths(&built.tree, 0, &mut depths);
        assert!(depths.iter().all(|(_, d)| *d == 2));

        let mut depths = Vec::new();
        let shallow = vec![ColDef::field("x").into(), ColDef::field("y").into()];
        let built = factory.create_column_tree(
            &[ColGroupDef::new("deep", vec![ColGroupDef::new("deeper", vec![ColDef::field("z").into()]).into()]).into(),
              ColGroupDef::anonymous(shallow).into()],
            true,
            None,
        );
        leaf_depths(&built.tree, 0, &mut depths);
        assert!(depths.iter().all(|(_, d)| *d == 2), "{depths:?}");
        let run = built.tree[1].as_group().unwrap().children();
        assert_eq!(run.len(), 1);
        assert_eq!(run[0].as_group().unwrap().children().len(), 2);
    }

    #[test]
    fn test_padding_levels_follow_depth() {
        let (_ctx, factory) = factory(GridOptions::default());
        let defs = vec![
            ColDef::field("a").into(),
            ColGroupDef::new("g", vec![ColGroupDef::new("h", vec![ColDef::field("b").into()]).into()]).into(),
        ];
        let built = factory.create_column_tree(&defs, true, None);
        let top = built.tree[0].as_group().unwrap();
        let next = top.children()[0].as_group().cloned().unwrap();
        assert_eq!((top.level(), next.level()), (0, 1));
        let a = next.children()[0].as_column().cloned().unwrap();
        assert_eq!(a.original_parent().unwrap().id(), next.id());
    }

    #[test]
    fn test_reuse_reapplies_declarative_state() {
        let (ctx, factory) = factory(GridOptions::default());
        let first = factory.create_column_tree(&[ColDef::field("a").with_width(100.0).into()], true, None);
        let a = first.tree[0].as_column().cloned().unwrap();
        a.set_pinned(Pinned::Left);

        let defs = vec![
            ColDef::field("a")
                .with_width(150.0)
                .with_sort(SortDirection::Desc)
                .with_pinned(Pinned::Right)
                .into(),
        ];
        let second = factory.create_column_tree(&defs, true, Some(&first.tree));
        let reused = second.tree[0].as_column().cloned().unwrap();

        assert!(Arc::ptr_eq(&a, &reused));
        assert_eq!(reused.actual_width(), 150.0);
        assert_eq!(reused.sort(), Some(SortDirection::Desc));
        assert_eq!(reused.pinned(), Pinned::Right);
        assert_eq!(ctx.beans().len(), 1);
    }

    #[test]
    fn test_match_precedence() {
        let (_ctx, factory) = factory(GridOptions::default());
        let anonymous = ColDef::new().with_header_name("anon");
        let first = factory.create_column_tree(
            &[
                ColDef::field("x").with_col_id("explicit").into(),
                ColDef::field("f").into(),
                anonymous.clone().into(),
            ],
            true,
            None,
        );
        let ids: Vec<_> = first.tree.iter().map(|n| n.id().to_string()).collect();
        assert_eq!(ids, vec!["explicit", "f", "col"]);

        // id matches id only, field matches field, a clone matches by handle
        let second = factory.create_column_tree(
            &[
                anonymous.into(),
                ColDef::field("explicit").into(),
                ColDef::field("f").into(),
                ColDef::field("y").with_col_id("explicit").into(),
            ],
            true,
            Some(&first.tree),
        );
        let reused = |i: usize, j: usize| {
            Arc::ptr_eq(
                second.tree[i].as_column().unwrap(),
                first.tree[j].as_column().unwrap(),
            )
        };
        assert!(reused(0, 2));
        assert!(!reused(1, 0));
        assert!(reused(2, 1));
        assert!(reused(3, 0));
        assert_eq!(second.tree[1].id(), "explicit_1");
    }

    #[test]
    fn test_first_duplicate_field_keeps_the_existing_column() {
        let (_ctx, factory) = factory(GridOptions::default());
        let first = factory.create_column_tree(&[ColDef::field("a").into()], true, None);
        let second = factory.create_column_tree(
            &[ColDef::field("a").into(), ColDef::field("a").into()],
            true,
            Some(&first.tree),
        );
        let original = first.tree[0].as_column().unwrap();
        assert!(Arc::ptr_eq(second.tree[0].as_column().unwrap(), original));
        assert!(!Arc::ptr_eq(second.tree[1].as_column().unwrap(), original));
        assert_eq!(second.tree[1].id(), "a_1");
    }

    #[test]
    fn test_later_duplicate_col_id_wins_the_existing_column() {
        let (_ctx, factory) = factory(GridOptions::default());
        let first = factory.create_column_tree(&[ColDef::field("a").with_col_id("x").into()], true, None);
        let second = factory.create_column_tree(
            &[
                ColDef::field("a").with_col_id("x").into(),
                ColDef::field("b").with_col_id("x").into(),
            ],
            true,
            Some(&first.tree),
        );
        let original = first.tree[0].as_column().unwrap();
        assert!(!Arc::ptr_eq(second.tree[0].as_column().unwrap(), original));
        assert!(Arc::ptr_eq(second.tree[1].as_column().unwrap(), original));
        let ids: Vec<_> = second.tree.iter().map(|n| n.id().to_string()).collect();
        assert_eq!(ids, vec!["x_1", "x"]);
    }

    #[test]
    fn test_explicit_col_id_beats_a_later_field_match() {
        let (_ctx, factory) = factory(GridOptions::default());
        let first = factory.create_column_tree(&[ColDef::field("a").with_col_id("x").into()], true, None);
        let second = factory.create_column_tree(
            &[ColDef::field("a").with_col_id("x").into(), ColDef::field("a").into()],
            true,
            Some(&first.tree),
        );
        let original = first.tree[0].as_column().unwrap();
        assert!(Arc::ptr_eq(second.tree[0].as_column().unwrap(), original));
        assert!(!Arc::ptr_eq(second.tree[1].as_column().unwrap(), original));
        let ids: Vec<_> = second.tree.iter().map(|n| n.id().to_string()).collect();
        assert_eq!(ids, vec!["x", "a"]);
    }

    #[test]
    fn test_groups_are_reused_by_group_id() {
        let (_ctx, factory) = factory(GridOptions::default());
        let defs = vec![ColGroupDef::new("g", vec![ColDef::field("a").into()]).into()];
        let first = factory.create_column_tree(&defs, true, None);
        let g = first.tree[0].as_group().cloned().unwrap();
        g.set_expanded(true);

        let second = factory.create_column_tree(&defs, true, Some(&first.tree));
        let g2 = second.tree[0].as_group().unwrap();
        assert!(Arc::ptr_eq(&g, g2));
        assert!(g2.is_expanded());
    }

    #[test]
    fn test_duplicate_group_ids_warn() {
        let (ctx, factory) = factory(GridOptions::default());
        let defs = vec![
            ColGroupDef::new("g", vec![ColDef::field("a").into()]).into(),
            ColGroupDef::new("g", vec![ColDef::field("b").into()]).into(),
        ];
        let built = factory.create_column_tree(&defs, true, None);
        assert_eq!(built.tree[1].id(), "g_1");
        assert_eq!(
            ctx.warnings().entries(),
            vec![ColumnWarning::DuplicateGroupId {
                requested: "g".into(),
                assigned: "g_1".into()
            }]
        );
    }

    #[test]
    fn test_column_types_and_defaults() {
        let mut options = GridOptions {
            default_col_def: Some(ColDef::new().with_width(90.0)),
            ..Default::default()
        };
        options
            .column_types
            .insert("money".into(), ColDef::new().with_width(120.0));
        options
            .column_types
            .insert("numericColumn".into(), ColDef::new().with_width(1.0));
        let (ctx, factory) = factory(options);

        let merged = factory.add_column_default_and_types(&ColDef::field("p").with_type(["money", "numericColumn", "nope"]));
        assert_eq!(merged.width, Some(120.0));
        assert_eq!(merged.cell_class.as_deref(), Some(RIGHT_ALIGNED_CELL_CLASS));

        let plain = factory.add_column_default_and_types(&ColDef::field("q"));
        assert_eq!(plain.width, Some(90.0));

        let warnings = ctx.warnings().entries();
        assert!(warnings.contains(&ColumnWarning::UnknownColumnType { type_name: "nope".into() }));
        assert!(warnings.contains(&ColumnWarning::DefaultColumnTypeOverride {
            type_name: "numericColumn".into()
        }));
    }

    #[test]
    fn test_auto_group_padding_matches_live_depth() {
        let (ctx, factory) = factory(GridOptions::default());
        let live = factory.create_column_tree(
            &[ColGroupDef::new("g", vec![ColGroupDef::new("h", vec![ColDef::field("a").into()]).into()]).into()],
            true,
            None,
        );
        let auto = Column::new(ctx.beans(), ColDef::new(), None, "grid-auto-column", true);
        let built = factory.create_for_auto_groups(&[auto.clone()], &live.tree);

        assert_eq!(built.depth, 2);
        let top = built.tree[0].as_group().unwrap();
        assert!(top.is_padding());
        assert_eq!(top.id(), "grid-auto-padding-grid-auto-column_0");
        assert_eq!(auto.original_parent().unwrap().level(), 1);
    }
}
