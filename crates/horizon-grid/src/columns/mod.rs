//! Column entities, the tree factory and the column model.
//!
//! # Core Types
//!
//! - [`Column`]: a leaf column with live state
//! - [`ProvidedColumnGroup`]: a group node of the column tree
//! - [`ProvidedColumn`]: either of the above, as a tree node
//! - [`ColumnCollections`]: a tree with its ordered leaf list and id map
//! - [`ColumnFactory`]: builds balanced trees from definitions
//! - [`ColumnModel`]: owns the live columns and announces every change
//!
//! # Architecture Overview
//!
//! ```text
//! ┌──────────────┐     ┌───────────────┐     ┌──────────────┐
//! │  ColumnDef   │────>│ ColumnFactory │────>│ ColumnModel  │
//! │ (definitions)│     │ (tree build)  │     │ (live state) │
//! └──────────────┘     └───────────────┘     └──────┬───────┘
//!                                                   │
//!        ┌─────────────────┬────────────────┬───────┴────────┐
//!        v                 v                v                v
//!  FuncColsService   AutoColService   VisibleColsService  EventService
//! ```

pub mod auto_cols;
pub mod column;
pub mod factory;
pub mod func_cols;
pub mod key_creator;
pub mod model;
pub mod move_service;
pub mod pivot_result_cols;
pub mod provided;
pub mod provided_group;
pub mod show_row_group_cols;
pub mod size;
pub mod tree_debug;
pub mod viewport;
pub mod visible_cols;

pub use auto_cols::{AUTO_GROUP_COLUMN_ID, AutoColService};
pub use column::{ColKey, Column, DEFAULT_COLUMN_MIN_WIDTH, DEFAULT_COLUMN_WIDTH};
pub use factory::{ColumnFactory, ColumnTree};
pub use func_cols::{FuncColsService, FuncRole};
pub use key_creator::ColumnKeyCreator;
pub use model::{
    ApplyColumnStateParams, ColumnGroupState, ColumnModel, ColumnState, ColumnStateDefaults,
    DEFAULT_HEADER_HEIGHT,
};
pub use provided::{ColumnCollections, ProvidedColumn};
pub use provided_group::ProvidedColumnGroup;
pub use tree_debug::ColumnTreeDebug;
