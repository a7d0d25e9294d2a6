//! Pivot result columns: the secondary columns a pivot produces.

use std::sync::Arc;

use crate::col_def::ColumnDef;
use crate::columns::factory::ColumnFactory;
use crate::columns::provided::{ColumnCollections, ProvidedColumn, destroy_column_tree};
use crate::context::GridContext;

/// Holds the pivot result columns supplied by the pivot stage.
///
/// When the result is cleared its tree is remembered, so that the next
/// result can reuse the same entities.
pub struct PivotResultColsService {
    ctx: Arc<GridContext>,
    factory: ColumnFactory,
    pivot_result_cols: Option<ColumnCollections>,
    previous_tree: Option<Vec<ProvidedColumn>>,
}

impl PivotResultColsService {
    pub fn new(ctx: Arc<GridContext>, factory: ColumnFactory) -> Self {
        Self {
            ctx,
            factory,
            pivot_result_cols: None,
            previous_tree: None,
        }
    }

    pub fn pivot_result_cols(&self) -> Option<&ColumnCollections> {
        self.pivot_result_cols.as_ref()
    }

    /// Replace the pivot result columns; `None` clears them.
    ///
    /// Returns `false` when there was nothing to clear.
    pub fn set_pivot_result_cols(&mut self, defs: Option<&[ColumnDef]>) -> bool {
        let Some(defs) = defs else {
            let Some(current) = self.pivot_result_cols.take() else {
                return false;
            };
            self.previous_tree = Some(current.tree);
            return true;
        };

        let reuse_from = match (&self.pivot_result_cols, &self.previous_tree) {
            (Some(current), _) => Some(current.tree.clone()),
            (None, previous) => previous.clone(),
        };
        let built = self.factory.create_column_tree(defs, false, reuse_from.as_deref());
        if let Some(old_tree) = &reuse_from {
            destroy_column_tree(self.ctx.beans(), old_tree, Some(&built.tree));
        }

        self.previous_tree = None;
        self.pivot_result_cols = Some(ColumnCollections::from_tree(built.tree, built.depth));
        true
    }

    /// Destroy every entity this service still holds.
    pub fn destroy(&mut self) {
        if let Some(current) = self.pivot_result_cols.take() {
            destroy_column_tree(self.ctx.beans(), &current.tree, None);
        }
        if let Some(previous) = self.previous_tree.take() {
            destroy_column_tree(self.ctx.beans(), &previous, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::col_def::{ColDef, ColGroupDef};
    use crate::options::GridOptions;

    fn pivot_defs() -> Vec<ColumnDef> {
        vec![
            ColGroupDef::new(
                "2024",
                vec![
                    ColDef::field("gold").with_col_id("pivot_2024_gold").into(),
                    ColDef::field("silver").with_col_id("pivot_2024_silver").into(),
                ],
            )
            .into(),
        ]
    }

    #[test]
    fn test_result_columns_are_secondary() {
        let ctx = GridContext::new(GridOptions::default());
        let mut service = PivotResultColsService::new(ctx.clone(), ColumnFactory::new(ctx));
        assert!(!service.set_pivot_result_cols(None));

        assert!(service.set_pivot_result_cols(Some(&pivot_defs())));
        let cols = service.pivot_result_cols().unwrap();
        assert_eq!(cols.tree_depth, 1);
        assert_eq!(cols.ids(), vec!["pivot_2024_gold", "pivot_2024_silver"]);
        assert!(cols.list.iter().all(|c| !c.is_primary()));
    }

    #[test]
    fn test_cleared_result_is_reused_next_time() {
        let ctx = GridContext::new(GridOptions::default());
        let mut service = PivotResultColsService::new(ctx.clone(), ColumnFactory::new(ctx.clone()));
        service.set_pivot_result_cols(Some(&pivot_defs()));
        let gold = service.pivot_result_cols().unwrap().list[0].clone();

        assert!(service.set_pivot_result_cols(None));
        assert!(service.pivot_result_cols().is_none());

        service.set_pivot_result_cols(Some(&pivot_defs()));
        let again = service.pivot_result_cols().unwrap().list[0].clone();
        assert!(Arc::ptr_eq(&gold, &again));

        service.destroy();
        assert!(!gold.is_alive());
        assert!(ctx.beans().is_empty());
    }
}
