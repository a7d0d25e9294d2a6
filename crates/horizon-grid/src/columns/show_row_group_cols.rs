//! Which column displays each row-group column.

use std::collections::HashMap;
use std::sync::Arc;

use crate::col_def::ShowRowGroup;
use crate::columns::column::Column;

#[derive(Debug, Default, Clone)]
pub struct ShowRowGroupColsService {
    show_row_group_cols: Vec<Arc<Column>>,
    by_row_group_col: HashMap<String, Arc<Column>>,
}

impl ShowRowGroupColsService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute from the live columns.
    ///
    /// A column showing every group (`showRowGroup: true`) is mapped to each
    /// current row-group column.
    pub fn refresh(&mut self, cols: &[Arc<Column>], row_group_cols: &[Arc<Column>]) {
        self.show_row_group_cols.clear();
        self.by_row_group_col.clear();

        for column in cols {
            match column.col_def().show_row_group.clone() {
                Some(ShowRowGroup::Column(id)) => {
                    self.show_row_group_cols.push(column.clone());
                    self.by_row_group_col.insert(id, column.clone());
                }
                Some(ShowRowGroup::All(true)) => {
                    self.show_row_group_cols.push(column.clone());
                    for row_group_col in row_group_cols {
                        self.by_row_group_col
                            .insert(row_group_col.id().to_string(), column.clone());
                    }
                }
                Some(ShowRowGroup::All(false)) | None => {}
            }
        }
    }

    /// Columns that display row groups, in live order.
    pub fn show_row_group_cols(&self) -> &[Arc<Column>] {
        &self.show_row_group_cols
    }

    /// The column displaying the given row-group column.
    pub fn show_row_group_col(&self, row_group_col_id: &str) -> Option<Arc<Column>> {
        self.by_row_group_col.get(row_group_col_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::col_def::ColDef;
    use horizon_grid_core::BeanRegistry;

    #[test]
    fn test_combined_column_shows_every_group() {
        let beans = BeanRegistry::new();
        let country = Column::new(&beans, ColDef::field("country"), None, "country", true);
        let year = Column::new(&beans, ColDef::field("year"), None, "year", true);
        let combined = Column::new(
            &beans,
            ColDef {
                show_row_group: Some(ShowRowGroup::All(true)),
                ..ColDef::new()
            },
            None,
            "group",
            true,
        );
        let per_year = Column::new(
            &beans,
            ColDef {
                show_row_group: Some(ShowRowGroup::Column("year".into())),
                ..ColDef::new()
            },
            None,
            "by-year",
            true,
        );

        let mut service = ShowRowGroupColsService::new();
        let cols = vec![combined.clone(), per_year.clone(), country.clone()];
        service.refresh(&cols, &[country, year]);

        assert_eq!(service.show_row_group_cols().len(), 2);
        assert!(Arc::ptr_eq(&service.show_row_group_col("country").unwrap(), &combined));
        assert!(Arc::ptr_eq(&service.show_row_group_col("year").unwrap(), &per_year));
        assert!(service.show_row_group_col("gold").is_none());
    }
}
