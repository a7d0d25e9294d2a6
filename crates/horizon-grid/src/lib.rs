//! Column model for the Horizon data grid.
//!
//! This crate turns column definitions into the live columns a grid shows
//! and keeps them consistent as the application and the user change them:
//!
//! - **Definitions**: [`ColDef`] and [`ColGroupDef`], deserializable from JSON
//! - **Column tree**: balanced trees built by the [`ColumnFactory`]
//! - **Column model**: ordering, pinning, visibility, grouping, pivoting and
//!   sizing through [`ColumnModel`]
//! - **Events**: every change announced as a [`ColumnEvent`]
//! - **Column state**: capture and restore through [`ColumnState`]
//!
//! Problems in the configuration never fail hard; they are recorded as
//! [`ColumnWarning`]s in the grid's warning log and the offending setting is
//! ignored.
//!
//! # Example
//!
//! ```
//! use horizon_grid::{ColDef, ColGroupDef, ColumnEventSource, ColumnModel, GridContext, GridOptions};
//!
//! let ctx = GridContext::new(GridOptions::default());
//! let mut model = ColumnModel::new(ctx);
//! model.set_column_defs(
//!     vec![
//!         ColDef::field("country").with_row_group(true).into(),
//!         ColGroupDef::new("medals", vec![
//!             ColDef::field("gold").into(),
//!             ColDef::field("silver").into(),
//!         ])
//!         .into(),
//!     ],
//!     ColumnEventSource::GridInitializing,
//! );
//!
//! let ids: Vec<&str> = model.cols().iter().map(|c| c.id()).collect();
//! assert_eq!(ids, vec!["grid-auto-column", "country", "gold", "silver"]);
//! assert_eq!(model.header_row_count(), 2);
//! ```

pub mod col_def;
pub mod columns;
pub mod context;
pub mod error;
pub mod events;
pub mod options;
pub mod quick_filter;
pub mod value_cache;

pub use col_def::{ColDef, ColGroupDef, ColumnDef, ColumnGroupShow, DefHandle, LockPosition, Pinned, ShowRowGroup, SortDirection};
pub use columns::{
    AUTO_GROUP_COLUMN_ID, ApplyColumnStateParams, ColKey, Column, ColumnCollections, ColumnFactory, ColumnGroupState,
    ColumnModel, ColumnState, ColumnStateDefaults, FuncRole, ProvidedColumn, ProvidedColumnGroup,
};
pub use columns::size::SizeToFitParams;
pub use context::GridContext;
pub use error::ColumnWarning;
pub use events::{ColumnEvent, ColumnEventKind, ColumnEventSource, EventService};
pub use options::{
    AutoSizeStrategy, ColumnLimit, ContentMeasurer, DomLayout, GridOption, GridOptions, GroupDisplayType, RowModelType,
    TreeDataDisplayType,
};
pub use quick_filter::QuickFilterColumns;
pub use value_cache::ValueCache;
