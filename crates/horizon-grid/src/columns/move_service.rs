//! Column ordering rules: locked positions and married children.

use std::sync::Arc;

use crate::col_def::LockPosition;
use crate::columns::column::Column;
use crate::columns::provided::{ProvidedColumn, depth_first_original_tree_search};
use crate::context::GridContext;
use crate::options::keys;

/// Move `to_move` so the first of them lands at `to_index`, keeping their
/// relative order.
///
/// `to_index` counts positions with the moved columns taken out.
pub fn move_in_array(list: &mut Vec<Arc<Column>>, to_move: &[Arc<Column>], to_index: usize) {
    list.retain(|c| !to_move.iter().any(|m| Arc::ptr_eq(c, m)));
    for column in to_move.iter().rev() {
        let index = to_index.min(list.len());
        list.insert(index, column.clone());
    }
}

/// Where a lock position puts a column: left block, free, right block.
fn placement(column: &Column) -> i8 {
    match column.lock_position() {
        Some(LockPosition::Left) => -1,
        None => 0,
        Some(LockPosition::Right) => 1,
    }
}

/// Applies the ordering rules columns must obey.
#[derive(Clone)]
pub struct ColumnMoveService {
    ctx: Arc<GridContext>,
}

impl ColumnMoveService {
    pub fn new(ctx: Arc<GridContext>) -> Self {
        Self { ctx }
    }

    /// Reorder so left-locked columns lead and right-locked columns trail,
    /// mirrored under RTL. Order within each block is kept.
    pub fn place_locked_columns(&self, columns: Vec<Arc<Column>>) -> Vec<Arc<Column>> {
        let mut left = Vec::new();
        let mut normal = Vec::new();
        let mut right = Vec::new();
        for column in columns {
            match column.lock_position() {
                Some(LockPosition::Left) => left.push(column),
                Some(LockPosition::Right) => right.push(column),
                None => normal.push(column),
            }
        }

        let (first, last) = if self.ctx.options().get(keys::ENABLE_RTL) {
            (right, left)
        } else {
            (left, right)
        };
        first.into_iter().chain(normal).chain(last).collect()
    }

    /// Whether the leaves of every married group stay contiguous in
    /// `proposed`.
    pub fn does_move_pass_married_children(&self, tree: &[ProvidedColumn], proposed: &[Arc<Column>]) -> bool {
        let mut passed = true;
        depth_first_original_tree_search(None, tree, &mut |node, _| {
            let ProvidedColumn::Group(group) = node else {
                return;
            };
            if !passed || !group.is_marry_children() {
                return;
            }

            let leaves = group.leaf_columns();
            let indexes: Vec<usize> = leaves
                .iter()
                .filter_map(|leaf| proposed.iter().position(|c| Arc::ptr_eq(c, leaf)))
                .collect();
            let (Some(min), Some(max)) = (indexes.iter().min(), indexes.iter().max()) else {
                return;
            };
            if max - min > leaves.len().saturating_sub(1) {
                passed = false;
            }
        });
        passed
    }

    /// Whether `proposed` keeps left-locked columns before free ones and
    /// right-locked after, mirrored under RTL.
    pub fn does_move_pass_locked_positions(&self, proposed: &[Arc<Column>]) -> bool {
        let rtl = self.ctx.options().get(keys::ENABLE_RTL);
        let mut last = if rtl { 1 } else { -1 };
        for column in proposed {
            let current = placement(column);
            let out_of_place = if rtl { current > last } else { current < last };
            if out_of_place {
                return false;
            }
            last = current;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::col_def::{ColDef, ColGroupDef};
    use crate::columns::factory::ColumnFactory;
    use crate::columns::provided::columns_from_tree;
    use crate::options::GridOptions;

    fn ids(cols: &[Arc<Column>]) -> Vec<&str> {
        cols.iter().map(|c| c.id()).collect()
    }

    fn built(ctx: &Arc<GridContext>, defs: Vec<crate::col_def::ColumnDef>) -> (Vec<ProvidedColumn>, Vec<Arc<Column>>) {
        let tree = ColumnFactory::new(ctx.clone()).create_column_tree(&defs, true, None).tree;
        let list = columns_from_tree(&tree);
        (tree, list)
    }

    #[test]
    fn test_move_in_array_keeps_relative_order() {
        let ctx = GridContext::new(GridOptions::default());
        let (_, mut list) = built(
            &ctx,
            ["a", "b", "c", "d"].map(|f| ColDef::field(f).into()).to_vec(),
        );
        let to_move = vec![list[0].clone(), list[2].clone()];
        move_in_array(&mut list, &to_move, 1);
        assert_eq!(ids(&list), vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn test_locked_columns_are_placed_at_the_edges() {
        let ctx = GridContext::new(GridOptions::default());
        let (_, list) = built(
            &ctx,
            vec![
                ColDef::field("a").into(),
                ColDef::field("r").with_lock_position(LockPosition::Right).into(),
                ColDef::field("l").with_lock_position(LockPosition::Left).into(),
            ],
        );
        let service = ColumnMoveService::new(ctx.clone());
        let placed = service.place_locked_columns(list.clone());
        assert_eq!(ids(&placed), vec!["l", "a", "r"]);
        assert!(service.does_move_pass_locked_positions(&placed));
        assert!(!service.does_move_pass_locked_positions(&list));

        ctx.options().update(|o| o.enable_rtl = true);
        let placed = service.place_locked_columns(list);
        assert_eq!(ids(&placed), vec!["r", "a", "l"]);
        assert!(service.does_move_pass_locked_positions(&placed));
    }

    #[test]
    fn test_married_children_must_stay_together() {
        let ctx = GridContext::new(GridOptions::default());
        let (tree, list) = built(
            &ctx,
            vec![
                ColGroupDef::new("g", vec![ColDef::field("a").into(), ColDef::field("b").into()])
                    .with_marry_children(true)
                    .into(),
                ColDef::field("c").into(),
            ],
        );
        let service = ColumnMoveService::new(ctx);
        assert!(service.does_move_pass_married_children(&tree, &list));

        let split = vec![list[0].clone(), list[2].clone(), list[1].clone()];
        assert!(!service.does_move_pass_married_children(&tree, &split));
    }
}
