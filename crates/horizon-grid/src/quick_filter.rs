//! The columns quick filtering reads.
//!
//! Matching rows against the filter text happens elsewhere; this only keeps
//! the column set current as the column model changes.

use std::sync::Arc;

use crate::columns::Column;

/// Inputs the quick filter column set is derived from.
#[derive(Debug, Clone, Copy)]
pub struct QuickFilterInputs<'a> {
    pub pivot_mode: bool,
    pub apply_before_pivot_or_agg: bool,
    pub include_hidden: bool,
    pub col_def_cols: Option<&'a [Arc<Column>]>,
    pub pivot_result_cols: Option<&'a [Arc<Column>]>,
    pub auto_cols: Option<&'a [Arc<Column>]>,
}

#[derive(Debug, Default, Clone)]
pub struct QuickFilterColumns {
    cols: Vec<Arc<Column>>,
}

impl QuickFilterColumns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the column set.
    ///
    /// In pivot mode the pivot result columns are searched, unless the
    /// filter runs before pivoting. Auto-group columns are always included
    /// so group values can be matched. Hidden columns only count when asked
    /// for, or when rows are grouped by them.
    pub fn refresh(&mut self, inputs: QuickFilterInputs<'_>) {
        let base = if inputs.pivot_mode && !inputs.apply_before_pivot_or_agg {
            inputs.pivot_result_cols
        } else {
            inputs.col_def_cols
        };

        self.cols = base
            .unwrap_or_default()
            .iter()
            .chain(inputs.auto_cols.unwrap_or_default())
            .filter(|c| inputs.include_hidden || c.is_visible() || c.is_row_group_active())
            .cloned()
            .collect();
    }

    pub fn cols(&self) -> &[Arc<Column>] {
        &self.cols
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::col_def::ColDef;
    use horizon_grid_core::BeanRegistry;

    fn inputs<'a>(cols: &'a [Arc<Column>], autos: &'a [Arc<Column>]) -> QuickFilterInputs<'a> {
        QuickFilterInputs {
            pivot_mode: false,
            apply_before_pivot_or_agg: false,
            include_hidden: false,
            col_def_cols: Some(cols),
            pivot_result_cols: None,
            auto_cols: Some(autos),
        }
    }

    #[test]
    fn test_hidden_columns_are_skipped_unless_grouped() {
        let beans = BeanRegistry::new();
        let shown = Column::new(&beans, ColDef::field("a"), None, "a", true);
        let hidden = Column::new(&beans, ColDef::field("b").with_hide(true), None, "b", true);
        let grouped = Column::new(&beans, ColDef::field("c").with_hide(true), None, "c", true);
        grouped.set_row_group_active(true);
        let auto = Column::new(&beans, ColDef::new(), None, "grid-auto-column", true);

        let cols = vec![shown, hidden, grouped];
        let autos = vec![auto];
        let mut quick = QuickFilterColumns::new();
        quick.refresh(inputs(&cols, &autos));
        let ids: Vec<&str> = quick.cols().iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["a", "c", "grid-auto-column"]);

        quick.refresh(QuickFilterInputs {
            include_hidden: true,
            ..inputs(&cols, &autos)
        });
        assert_eq!(quick.cols().len(), 4);
    }

    #[test]
    fn test_pivot_mode_reads_pivot_result_columns() {
        let beans = BeanRegistry::new();
        let primary = vec![Column::new(&beans, ColDef::field("a"), None, "a", true)];
        let result = vec![Column::new(&beans, ColDef::field("a"), None, "pivot_a", false)];
        let mut quick = QuickFilterColumns::new();
        quick.refresh(QuickFilterInputs {
            pivot_mode: true,
            pivot_result_cols: Some(&result),
            ..inputs(&primary, &[])
        });
        assert_eq!(quick.cols()[0].id(), "pivot_a");

        quick.refresh(QuickFilterInputs {
            pivot_mode: true,
            apply_before_pivot_or_agg: true,
            pivot_result_cols: Some(&result),
            ..inputs(&primary, &[])
        });
        assert_eq!(quick.cols()[0].id(), "a");
    }
}
