//! Grid options read by the column model.
//!
//! [`GridOptions`] is a typed snapshot of every option the column model
//! consults. The live options of a grid sit behind [`GridOptionsService`],
//! which hands out reads through typed [`OptionKey`]s and reports which
//! [`GridOption`]s an update actually changed.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::col_def::{ColDef, ColGroupDef};
use crate::columns::Column;

/// How row grouping is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupDisplayType {
    /// One auto column shows every group level.
    #[default]
    SingleColumn,
    /// One auto column per row-group column.
    MultipleColumns,
    /// Group rows span the full width; no auto column.
    GroupRows,
    /// The application supplies its own group column.
    Custom,
}

/// How tree data is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TreeDataDisplayType {
    /// The grid creates an auto column.
    #[default]
    Auto,
    /// The application supplies its own group column.
    Custom,
}

/// Layout of the grid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DomLayout {
    #[default]
    Normal,
    AutoHeight,
    Print,
}

/// The row model the grid runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RowModelType {
    #[default]
    ClientSide,
    ServerSide,
    Infinite,
    Viewport,
}

/// Width limits for one column while sizing to fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnLimit {
    pub col_id: String,
    #[serde(default)]
    pub min_width: Option<f32>,
    #[serde(default)]
    pub max_width: Option<f32>,
}

/// Strategy used to size columns once the grid is up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AutoSizeStrategy {
    /// Fit the columns into the grid's viewport width.
    #[serde(rename_all = "camelCase")]
    FitGridWidth {
        #[serde(default)]
        default_min_width: Option<f32>,
        #[serde(default)]
        default_max_width: Option<f32>,
        #[serde(default)]
        column_limits: Vec<ColumnLimit>,
    },
    /// Fit the columns into a fixed width.
    #[serde(rename_all = "camelCase")]
    FitProvidedWidth { width: f32 },
    /// Size each column to its content once the first rows are rendered.
    #[serde(rename_all = "camelCase")]
    FitCellContents {
        #[serde(default)]
        col_ids: Option<Vec<String>>,
        #[serde(default)]
        skip_header: bool,
    },
}

type MeasureFn = dyn Fn(&Column, bool) -> Option<f32> + Send + Sync;

/// Callback measuring the preferred width of a column's content.
///
/// Called with the column and whether the header should be skipped. Returns
/// `None` when the column cannot be measured (for instance, not rendered).
#[derive(Clone)]
pub struct ContentMeasurer(Arc<MeasureFn>);

impl ContentMeasurer {
    pub fn new<F>(measure: F) -> Self
    where
        F: Fn(&Column, bool) -> Option<f32> + Send + Sync + 'static,
    {
        Self(Arc::new(measure))
    }

    pub fn measure(&self, column: &Column, skip_header: bool) -> Option<f32> {
        (self.0)(column, skip_header)
    }
}

impl PartialEq for ContentMeasurer {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ContentMeasurer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ContentMeasurer(..)")
    }
}

/// Options read by the column model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridOptions {
    /// Merged under every column definition.
    pub default_col_def: Option<ColDef>,
    /// Merged under every group definition.
    pub default_col_group_def: Option<ColGroupDef>,
    /// Named column types a definition may refer to.
    pub column_types: BTreeMap<String, ColDef>,
    /// Merged into every auto-group column definition.
    pub auto_group_column_def: Option<ColDef>,

    pub pivot_mode: bool,
    pub tree_data: bool,
    /// Keep the current order when definitions are reloaded.
    pub maintain_column_order: bool,
    /// `0` locks nothing, `-1` locks every row-group column, `n` the first `n`.
    pub group_lock_group_columns: i32,
    pub group_display_type: GroupDisplayType,
    pub tree_data_display_type: TreeDataDisplayType,
    pub group_hide_open_parents: bool,
    pub pivot_suppress_auto_column: bool,

    pub dom_layout: DomLayout,
    pub enable_rtl: bool,
    pub header_height: Option<f32>,
    pub group_header_height: Option<f32>,
    pub pivot_header_height: Option<f32>,
    pub pivot_group_header_height: Option<f32>,
    pub floating_filters_height: Option<f32>,

    pub auto_size_strategy: Option<AutoSizeStrategy>,
    pub row_model_type: RowModelType,
    pub include_hidden_columns_in_quick_filter: bool,
    pub apply_quick_filter_before_pivot_or_agg: bool,
    pub suppress_column_virtualisation: bool,
    pub suppress_field_dot_notation: bool,

    #[serde(skip)]
    pub content_measurer: Option<ContentMeasurer>,
}

impl GridOptions {
    /// Whether group rows take the full width, which removes auto columns.
    pub fn is_group_use_entire_row(&self, pivot_mode: bool) -> bool {
        !pivot_mode && self.group_display_type == GroupDisplayType::GroupRows
    }

    /// Whether the application renders its own group column.
    pub fn is_custom_group_display(&self) -> bool {
        self.group_display_type == GroupDisplayType::Custom
            || self.tree_data_display_type == TreeDataDisplayType::Custom
    }
}

/// The recognised option keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridOption {
    DefaultColDef,
    DefaultColGroupDef,
    ColumnTypes,
    AutoGroupColumnDef,
    PivotMode,
    TreeData,
    MaintainColumnOrder,
    GroupLockGroupColumns,
    GroupDisplayType,
    TreeDataDisplayType,
    GroupHideOpenParents,
    PivotSuppressAutoColumn,
    DomLayout,
    EnableRtl,
    HeaderHeight,
    GroupHeaderHeight,
    PivotHeaderHeight,
    PivotGroupHeaderHeight,
    FloatingFiltersHeight,
    AutoSizeStrategy,
    RowModelType,
    IncludeHiddenColumnsInQuickFilter,
    ApplyQuickFilterBeforePivotOrAgg,
    SuppressColumnVirtualisation,
    SuppressFieldDotNotation,
    ContentMeasurer,
}

macro_rules! diff_options {
    ($old:expr, $new:expr; $($field:ident => $key:ident),* $(,)?) => {{
        let mut changed = Vec::new();
        $(
            if $old.$field != $new.$field {
                changed.push(GridOption::$key);
            }
        )*
        changed
    }};
}

impl GridOption {
    /// The keys whose values differ between two snapshots.
    pub fn diff(old: &GridOptions, new: &GridOptions) -> Vec<GridOption> {
        diff_options!(old, new;
            default_col_def => DefaultColDef,
            default_col_group_def => DefaultColGroupDef,
            column_types => ColumnTypes,
            auto_group_column_def => AutoGroupColumnDef,
            pivot_mode => PivotMode,
            tree_data => TreeData,
            maintain_column_order => MaintainColumnOrder,
            group_lock_group_columns => GroupLockGroupColumns,
            group_display_type => GroupDisplayType,
            tree_data_display_type => TreeDataDisplayType,
            group_hide_open_parents => GroupHideOpenParents,
            pivot_suppress_auto_column => PivotSuppressAutoColumn,
            dom_layout => DomLayout,
            enable_rtl => EnableRtl,
            header_height => HeaderHeight,
            group_header_height => GroupHeaderHeight,
            pivot_header_height => PivotHeaderHeight,
            pivot_group_header_height => PivotGroupHeaderHeight,
            floating_filters_height => FloatingFiltersHeight,
            auto_size_strategy => AutoSizeStrategy,
            row_model_type => RowModelType,
            include_hidden_columns_in_quick_filter => IncludeHiddenColumnsInQuickFilter,
            apply_quick_filter_before_pivot_or_agg => ApplyQuickFilterBeforePivotOrAgg,
            suppress_column_virtualisation => SuppressColumnVirtualisation,
            suppress_field_dot_notation => SuppressFieldDotNotation,
            content_measurer => ContentMeasurer,
        )
    }
}

/// Typed read access to one option.
#[derive(Clone, Copy)]
pub struct OptionKey<T> {
    option: GridOption,
    read: fn(&GridOptions) -> T,
}

impl<T> OptionKey<T> {
    /// The option this key reads.
    pub fn option(&self) -> GridOption {
        self.option
    }
}

/// Keys for the options the column model reads by value.
pub mod keys {
    use super::*;

    /// Pivot mode requested.
    pub const PIVOT_MODE: OptionKey<bool> = OptionKey {
        option: GridOption::PivotMode,
        read: |o| o.pivot_mode,
    };
    /// Tree data mode.
    pub const TREE_DATA: OptionKey<bool> = OptionKey {
        option: GridOption::TreeData,
        read: |o| o.tree_data,
    };
    /// Keep the live order when definitions are reloaded.
    pub const MAINTAIN_COLUMN_ORDER: OptionKey<bool> = OptionKey {
        option: GridOption::MaintainColumnOrder,
        read: |o| o.maintain_column_order,
    };
    /// How many row-group columns are locked in place.
    pub const GROUP_LOCK_GROUP_COLUMNS: OptionKey<i32> = OptionKey {
        option: GridOption::GroupLockGroupColumns,
        read: |o| o.group_lock_group_columns,
    };
    /// Auto columns are suppressed while pivoting.
    pub const PIVOT_SUPPRESS_AUTO_COLUMN: OptionKey<bool> = OptionKey {
        option: GridOption::PivotSuppressAutoColumn,
        read: |o| o.pivot_suppress_auto_column,
    };
    /// Body layout.
    pub const DOM_LAYOUT: OptionKey<DomLayout> = OptionKey {
        option: GridOption::DomLayout,
        read: |o| o.dom_layout,
    };
    /// Right-to-left layout.
    pub const ENABLE_RTL: OptionKey<bool> = OptionKey {
        option: GridOption::EnableRtl,
        read: |o| o.enable_rtl,
    };
    /// Active row model.
    pub const ROW_MODEL_TYPE: OptionKey<RowModelType> = OptionKey {
        option: GridOption::RowModelType,
        read: |o| o.row_model_type,
    };
    /// Quick filter reads hidden columns too.
    pub const INCLUDE_HIDDEN_COLUMNS_IN_QUICK_FILTER: OptionKey<bool> = OptionKey {
        option: GridOption::IncludeHiddenColumnsInQuickFilter,
        read: |o| o.include_hidden_columns_in_quick_filter,
    };
    /// Quick filter runs on primary columns while pivoting.
    pub const APPLY_QUICK_FILTER_BEFORE_PIVOT_OR_AGG: OptionKey<bool> = OptionKey {
        option: GridOption::ApplyQuickFilterBeforePivotOrAgg,
        read: |o| o.apply_quick_filter_before_pivot_or_agg,
    };
    /// Render every column regardless of scroll position.
    pub const SUPPRESS_COLUMN_VIRTUALISATION: OptionKey<bool> = OptionKey {
        option: GridOption::SuppressColumnVirtualisation,
        read: |o| o.suppress_column_virtualisation,
    };
}

/// The live options of one grid.
#[derive(Debug, Default)]
pub struct GridOptionsService {
    options: RwLock<GridOptions>,
}

impl GridOptionsService {
    pub fn new(options: GridOptions) -> Self {
        Self {
            options: RwLock::new(options),
        }
    }

    /// Read one option.
    pub fn get<T>(&self, key: OptionKey<T>) -> T {
        (key.read)(&self.options.read())
    }

    /// Access the whole snapshot without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&GridOptions) -> R,
    {
        f(&self.options.read())
    }

    /// A copy of the current snapshot.
    pub fn snapshot(&self) -> GridOptions {
        self.options.read().clone()
    }

    /// Apply `update` and return the options that changed.
    pub fn update<F>(&self, update: F) -> Vec<GridOption>
    where
        F: FnOnce(&mut GridOptions),
    {
        let mut options = self.options.write();
        let before = options.clone();
        update(&mut options);
        GridOption::diff(&before, &options)
    }

    /// Whether the grid uses the given body layout.
    pub fn is_dom_layout(&self, layout: DomLayout) -> bool {
        self.get(keys::DOM_LAYOUT) == layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_deserialize_camel_case() {
        let options: GridOptions = serde_json::from_str(
            r#"{
                "pivotMode": true,
                "groupDisplayType": "multipleColumns",
                "domLayout": "print",
                "columnTypes": { "money": { "width": 120 } },
                "autoSizeStrategy": { "type": "fitProvidedWidth", "width": 800 }
            }"#,
        )
        .unwrap();

        assert!(options.pivot_mode);
        assert_eq!(options.group_display_type, GroupDisplayType::MultipleColumns);
        assert_eq!(options.dom_layout, DomLayout::Print);
        assert_eq!(options.column_types["money"].width, Some(120.0));
        assert_eq!(
            options.auto_size_strategy,
            Some(AutoSizeStrategy::FitProvidedWidth { width: 800.0 })
        );
    }

    #[test]
    fn test_update_reports_changed_keys() {
        let service = GridOptionsService::default();
        let changed = service.update(|o| {
            o.pivot_mode = true;
            o.tree_data = false;
        });
        assert_eq!(changed, vec![GridOption::PivotMode]);
        assert!(service.get(keys::PIVOT_MODE));
        assert!(service.update(|o| o.pivot_mode = true).is_empty());
    }

    #[test]
    fn test_group_use_entire_row() {
        let options = GridOptions {
            group_display_type: GroupDisplayType::GroupRows,
            ..Default::default()
        };
        assert!(options.is_group_use_entire_row(false));
        assert!(!options.is_group_use_entire_row(true));
    }

    #[test]
    fn test_measurer_compares_by_identity() {
        let measurer = ContentMeasurer::new(|_, _| Some(10.0));
        assert_eq!(measurer, measurer.clone());
        assert_ne!(measurer, ContentMeasurer::new(|_, _| Some(10.0)));
    }
}
