//! The column model.
//!
//! [`ColumnModel`] owns the live columns of one grid. It turns definitions
//! into a tree through the [`ColumnFactory`], keeps the ordered column list
//! and its id map in sync with that tree, adds auto-group columns, swaps in
//! pivot result columns, and announces every change on the grid's event bus.
//!
//! The model is split over several files by concern: pivoting, function
//! columns, moving, sizing, column state, group state and definition export
//! each extend the same type.

mod apply_state;
mod def_export;
mod func;
mod group_state;
mod moving;
mod pivot;
mod sizing;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use horizon_grid_core::PerfSpan;
use horizon_grid_core::logging::targets;

use crate::col_def::{ColumnDef, Pinned};
use crate::columns::auto_cols::AutoColService;
use crate::columns::column::{ColKey, Column};
use crate::columns::factory::ColumnFactory;
use crate::columns::func_cols::FuncColsService;
use crate::columns::move_service::{ColumnMoveService, move_in_array};
use crate::columns::pivot_result_cols::PivotResultColsService;
use crate::columns::provided::{
    ColumnCollections, ProvidedColumn, depth_first_original_tree_search, destroy_column_tree, trees_equal,
};
use crate::columns::provided_group::ProvidedColumnGroup;
use crate::columns::show_row_group_cols::ShowRowGroupColsService;
use crate::columns::size::refresh_flexed_columns;
use crate::columns::tree_debug::ColumnTreeDebug;
use crate::columns::viewport::ColumnViewportService;
use crate::columns::visible_cols::VisibleColsService;
use crate::context::GridContext;
use crate::error::ColumnWarning;
use crate::events::{ColumnEventDispatcher, ColumnEventSource};
use crate::options::{DomLayout, GridOption, GridOptions, RowModelType, keys};
use crate::quick_filter::{QuickFilterColumns, QuickFilterInputs};

pub use apply_state::{ApplyColumnStateParams, ColumnState, ColumnStateDefaults};
pub use group_state::ColumnGroupState;

use apply_state::StateSnapshot;

/// Header row height used when the options set none.
pub const DEFAULT_HEADER_HEIGHT: f32 = 25.0;

/// Work run against the model later: queued resizes and deferred autosizing.
pub type ModelTask = Box<dyn FnOnce(&mut ColumnModel) + Send>;

/// The live columns of one grid.
pub struct ColumnModel {
    ctx: Arc<GridContext>,
    factory: ColumnFactory,
    dispatcher: ColumnEventDispatcher,
    auto_col_service: AutoColService,
    move_service: ColumnMoveService,
    func_cols: FuncColsService,
    visible_cols: VisibleColsService,
    viewport: ColumnViewportService,
    pivot_result_cols: PivotResultColsService,
    show_row_group_cols: ShowRowGroupColsService,
    quick_filter_cols: QuickFilterColumns,

    /// The definitions as the application supplied them.
    col_defs: Option<Vec<ColumnDef>>,
    /// Columns built from `col_defs`, in definition order.
    col_def_cols: Option<ColumnCollections>,
    auto_cols: Option<ColumnCollections>,
    /// What the grid shows: auto columns, then definition or pivot result
    /// columns, in display order.
    cols: Option<ColumnCollections>,

    pivot_mode: bool,
    showing_pivot_result: bool,
    last_order: Option<Vec<Arc<Column>>>,
    last_pivot_order: Option<Vec<Arc<Column>>>,

    col_span_active: bool,
    auto_height_active: bool,
    auto_height_active_at_least_once: bool,
    ready: bool,

    should_queue_resize_operations: bool,
    resize_operation_queue: Vec<ModelTask>,
    deferred: Vec<ModelTask>,
}

impl ColumnModel {
    pub fn new(ctx: Arc<GridContext>) -> Self {
        let factory = ColumnFactory::new(ctx.clone());
        let mut model = Self {
            dispatcher: ColumnEventDispatcher::new(ctx.events().clone()),
            auto_col_service: AutoColService::new(ctx.clone(), factory.clone()),
            move_service: ColumnMoveService::new(ctx.clone()),
            func_cols: FuncColsService::new(),
            visible_cols: VisibleColsService::new(),
            viewport: ColumnViewportService::new(),
            pivot_result_cols: PivotResultColsService::new(ctx.clone(), factory.clone()),
            show_row_group_cols: ShowRowGroupColsService::new(),
            quick_filter_cols: QuickFilterColumns::new(),
            col_defs: None,
            col_def_cols: None,
            auto_cols: None,
            cols: None,
            pivot_mode: false,
            showing_pivot_result: false,
            last_order: None,
            last_pivot_order: None,
            col_span_active: false,
            auto_height_active: false,
            auto_height_active_at_least_once: false,
            ready: false,
            should_queue_resize_operations: false,
            resize_operation_queue: Vec::new(),
            deferred: Vec::new(),
            factory,
            ctx,
        };

        let pivot_mode = model.ctx.options().get(keys::PIVOT_MODE);
        if model.is_pivot_setting_allowed(pivot_mode) {
            model.pivot_mode = pivot_mode;
        }
        model
    }

    pub fn ctx(&self) -> &Arc<GridContext> {
        &self.ctx
    }

    /// Whether definitions were applied at least once.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    // -------------------------------------------------------------------------
    // Loading definitions
    // -------------------------------------------------------------------------

    /// Replace the column definitions and rebuild every column.
    ///
    /// Columns whose definitions still match are kept, with their state.
    /// When columns existed before, the state changes are announced as
    /// individual events after `EverythingChanged`.
    pub fn set_column_defs(&mut self, defs: Vec<ColumnDef>, source: ColumnEventSource) {
        let cols_previously_existed = self.col_defs.is_some();
        self.col_defs = Some(defs);
        self.create_cols_from_col_defs(cols_previously_existed, source);
    }

    /// The definitions last passed to [`set_column_defs`](Self::set_column_defs).
    pub fn col_defs(&self) -> Option<&[ColumnDef]> {
        self.col_defs.as_deref()
    }

    /// Rebuild the columns from the current definitions, after options that
    /// feed into merged definitions changed.
    pub fn recreate_column_defs(&mut self, source: ColumnEventSource) {
        if self.cols.is_none() {
            return;
        }
        self.update_auto_cols();
        self.create_cols_from_col_defs(true, source);
    }

    fn create_cols_from_col_defs(&mut self, cols_previously_existed: bool, source: ColumnEventSource) {
        let _span = PerfSpan::new("ColumnModel::create_cols_from_col_defs");

        let before = cols_previously_existed.then(|| StateSnapshot::capture(self));

        // Ids can be reused by unrelated columns, so nothing cached survives.
        self.ctx.value_cache().expire();

        let old_cols = self.col_def_cols.take();
        let built = self.factory.create_column_tree(
            self.col_defs.as_deref().unwrap_or_default(),
            true,
            old_cols.as_ref().map(|old| old.tree.as_slice()),
        );
        if let Some(old) = &old_cols {
            destroy_column_tree(self.ctx.beans(), &old.tree, Some(&built.tree));
        }

        let col_def_cols = ColumnCollections::from_tree(built.tree, built.depth);
        self.func_cols
            .extract_cols(&col_def_cols.list, old_cols.as_ref().map(|old| old.list.as_slice()));
        tracing::debug!(
            target: targets::COLUMN_MODEL,
            columns = col_def_cols.list.len(),
            depth = col_def_cols.tree_depth,
            "column definitions applied"
        );
        self.col_def_cols = Some(col_def_cols);

        self.ready = true;
        self.refresh_cols();

        let maintain_order = cols_previously_existed && self.ctx.options().get(keys::MAINTAIN_COLUMN_ORDER);
        if !maintain_order && !self.showing_pivot_result {
            self.order_cols_like_col_def_cols();
        }

        self.refresh_visible(source);
        self.dispatcher.everything_changed(source);

        if let Some(before) = before {
            self.ctx.set_change_events_dispatching(true);
            before.dispatch_changes(self, source);
            self.ctx.set_change_events_dispatching(false);
        }

        self.dispatcher.new_columns_loaded(source);
        if source == ColumnEventSource::GridInitializing {
            self.apply_autosize_strategy();
        }
    }

    fn order_cols_like_col_def_cols(&mut self) {
        let (Some(col_def_cols), Some(cols)) = (&self.col_def_cols, &mut self.cols) else {
            return;
        };
        let ordered: Vec<Arc<Column>> = col_def_cols
            .list
            .iter()
            .filter(|c| cols.contains(c))
            .cloned()
            .collect();
        let others = cols.list.iter().filter(|c| !contains(&ordered, c)).cloned();
        let new_order: Vec<Arc<Column>> = others.chain(ordered.iter().cloned()).collect();
        cols.list = self.move_service.place_locked_columns(new_order);
        cols.update_map();
    }

    // -------------------------------------------------------------------------
    // Refresh pipeline
    // -------------------------------------------------------------------------

    /// Recompute the live column set from the definition (or pivot result)
    /// columns, the auto columns and the remembered order.
    ///
    /// Sends `GridColumnsChanged` when the resulting tree differs from the
    /// one before.
    pub fn refresh_cols(&mut self) {
        if self.col_def_cols.is_none() {
            return;
        }
        let _span = PerfSpan::new("ColumnModel::refresh_cols");

        let prev_tree = self.cols.as_ref().map(|cols| cols.tree.clone());

        self.save_col_order();
        self.select_cols();
        self.create_auto_cols();
        self.add_auto_cols();
        self.restore_col_order();
        self.position_locked_cols();
        self.refresh_derived_cols();

        // Nothing stale may be drawn until the next visible refresh.
        self.visible_cols.clear();
        self.viewport.clear();

        let changed = match (&prev_tree, &self.cols) {
            (Some(prev), Some(cols)) => !trees_equal(prev, &cols.tree),
            _ => true,
        };
        if changed {
            if tracing::enabled!(target: targets::COLUMN_MODEL, tracing::Level::TRACE) {
                let tree = ColumnTreeDebug::new().format(self.col_tree());
                tracing::trace!(target: targets::COLUMN_MODEL, "grid columns changed:\n{tree}");
            }
            self.dispatcher.grid_columns();
        }
    }

    fn save_col_order(&mut self) {
        let current = self.cols.as_ref().map(|cols| cols.list.clone());
        if self.showing_pivot_result {
            self.last_pivot_order = current;
        } else {
            self.last_order = current;
        }
    }

    fn select_cols(&mut self) {
        let pivot_result = self.pivot_result_cols.pivot_result_cols().cloned();
        self.showing_pivot_result = pivot_result.is_some();

        let selected = match pivot_result {
            Some(result) => {
                // A pivot result sharing no column with what was shown is a
                // different shape; its remembered order means nothing.
                let overlaps = self
                    .cols
                    .as_ref()
                    .is_some_and(|prev| result.list.iter().any(|c| prev.map.contains_key(c.id())));
                if !overlaps {
                    self.last_pivot_order = None;
                }
                result
            }
            None => self.col_def_cols.clone().unwrap_or_default(),
        };
        self.cols = Some(selected);
    }

    fn create_auto_cols(&mut self) {
        let pivot_mode = self.pivot_mode;
        let (suppress_auto_col, group_full_width_row, tree_data) = self.ctx.options().with(|o| {
            let suppress = if pivot_mode {
                o.pivot_suppress_auto_column
            } else {
                o.is_custom_group_display()
            };
            (suppress, o.is_group_use_entire_row(pivot_mode), o.tree_data)
        });

        let row_group_cols = self.func_cols.row_group_columns().to_vec();
        let grouping_active = !row_group_cols.is_empty() || tree_data;
        if !grouping_active || suppress_auto_col || group_full_width_row {
            self.destroy_auto_cols();
            return;
        }

        let tree_depth = self.cols.as_ref().map_or(0, |cols| cols.tree_depth);
        let ids = self.auto_col_service.auto_col_ids(&row_group_cols);
        if let Some(existing) = &self.auto_cols {
            let same_ids = existing
                .list
                .iter()
                .map(|c| c.id())
                .eq(ids.iter().map(String::as_str));
            if same_ids && existing.tree_depth == tree_depth {
                return;
            }
        }

        self.destroy_auto_cols();
        let list = self.auto_col_service.create_auto_cols(&row_group_cols);
        let live_tree = self.cols.as_ref().map(|cols| cols.tree.as_slice()).unwrap_or_default();
        let built = self.factory.create_for_auto_groups(&list, live_tree);
        let mut auto_cols = ColumnCollections {
            tree: built.tree,
            tree_depth,
            list: list.clone(),
            map: HashMap::new(),
        };
        auto_cols.update_map();
        self.auto_cols = Some(auto_cols);
        tracing::debug!(target: targets::COLUMN_MODEL, ?ids, "auto group columns created");

        // Auto columns lead unless a later order says otherwise.
        let put_first = |order: Option<Vec<Arc<Column>>>| {
            order.map(|order| {
                list.iter()
                    .cloned()
                    .chain(order.into_iter().filter(|c| !c.is_auto_group_column()))
                    .collect()
            })
        };
        self.last_order = put_first(self.last_order.take());
        self.last_pivot_order = put_first(self.last_pivot_order.take());
    }

    fn destroy_auto_cols(&mut self) {
        if let Some(auto_cols) = self.auto_cols.take() {
            destroy_column_tree(self.ctx.beans(), &auto_cols.tree, None);
        }
    }

    fn update_auto_cols(&self) {
        if let Some(auto_cols) = &self.auto_cols {
            self.auto_col_service
                .update_auto_cols(&auto_cols.list, self.col_def_cols.as_ref());
        }
    }

    fn add_auto_cols(&mut self) {
        let (Some(auto_cols), Some(cols)) = (&self.auto_cols, &mut self.cols) else {
            return;
        };
        cols.list = auto_cols.list.iter().chain(&cols.list).cloned().collect();
        cols.tree = auto_cols.tree.iter().chain(&cols.tree).cloned().collect();
        cols.update_map();
    }

    fn restore_col_order(&mut self) {
        let last_order = if self.showing_pivot_result {
            &self.last_pivot_order
        } else {
            &self.last_order
        };
        let (Some(last_order), Some(cols)) = (last_order, &mut self.cols) else {
            return;
        };
        if let Some(restored) = restored_order(&cols.list, last_order) {
            cols.list = restored;
        }
    }

    fn position_locked_cols(&mut self) {
        if let Some(cols) = &mut self.cols {
            let list = std::mem::take(&mut cols.list);
            cols.list = self.move_service.place_locked_columns(list);
        }
    }

    /// Refresh everything derived from the live column set.
    fn refresh_derived_cols(&mut self) {
        let Some(cols) = &self.cols else {
            return;
        };

        self.show_row_group_cols
            .refresh(&cols.list, self.func_cols.row_group_columns());

        let (apply_before_pivot_or_agg, include_hidden) = self.ctx.options().with(|o| {
            (
                o.apply_quick_filter_before_pivot_or_agg,
                o.include_hidden_columns_in_quick_filter,
            )
        });
        self.quick_filter_cols.refresh(QuickFilterInputs {
            pivot_mode: self.pivot_mode,
            apply_before_pivot_or_agg,
            include_hidden,
            col_def_cols: self.col_def_cols.as_ref().map(|c| c.list.as_slice()),
            pivot_result_cols: self.pivot_result_cols.pivot_result_cols().map(|c| c.list.as_slice()),
            auto_cols: self.auto_cols.as_ref().map(|c| c.list.as_slice()),
        });

        self.col_span_active = cols.list.iter().any(|c| c.col_def().col_span.is_some());

        self.auto_height_active = cols.list.iter().any(|c| c.is_auto_height());
        if self.auto_height_active {
            self.auto_height_active_at_least_once = true;
            let row_model = self.ctx.options().get(keys::ROW_MODEL_TYPE);
            if !matches!(row_model, RowModelType::ClientSide | RowModelType::ServerSide) {
                self.ctx
                    .warnings()
                    .warn_once(ColumnWarning::AutoHeightUnsupportedRowModel);
            }
        }
    }

    /// Recompute the displayed columns, flex widths, offsets and viewport,
    /// then send `DisplayedColumnsChanged`.
    pub fn refresh_visible(&mut self, source: ColumnEventSource) {
        let rtl = self.ctx.options().get(keys::ENABLE_RTL);
        let cols_to_show = self.cols_to_show();
        let tree = self.cols.as_ref().map(|cols| cols.tree.as_slice()).unwrap_or_default();
        self.visible_cols.refresh_displayed(&cols_to_show, tree, rtl);

        refresh_flexed_columns(self.visible_cols.center_cols(), self.viewport.viewport_width(), &[]);
        self.update_layout();
        self.check_viewport(false);
        self.dispatcher.displayed_columns(source);
    }

    fn update_layout(&mut self) {
        let rtl = self.ctx.options().get(keys::ENABLE_RTL);
        if let Some(cols) = &self.cols {
            self.visible_cols.set_left_values(&cols.list, rtl);
        }
        self.visible_cols.update_body_widths();
    }

    fn check_viewport(&mut self, after_scroll: bool) {
        let suppress = self.ctx.options().get(keys::SUPPRESS_COLUMN_VIRTUALISATION);
        if self
            .viewport
            .check_viewport_columns(self.visible_cols.center_cols(), suppress)
        {
            self.dispatcher.virtual_columns_changed(after_scroll);
        }
    }

    /// The columns the visible refresh starts from.
    ///
    /// In pivot mode without a pivot result only auto and value columns are
    /// shown; otherwise auto columns and every visible column.
    pub fn cols_to_show(&self) -> Vec<Arc<Column>> {
        let Some(cols) = &self.cols else {
            return Vec::new();
        };
        let values_only = self.pivot_mode && !self.showing_pivot_result;
        let value_cols = self.func_cols.value_columns();
        cols.list
            .iter()
            .filter(|c| {
                c.is_auto_group_column()
                    || if values_only {
                        contains(value_cols, c)
                    } else {
                        c.is_visible()
                    }
            })
            .cloned()
            .collect()
    }

    fn refresh_all(&mut self, source: ColumnEventSource) {
        if !self.ready {
            return;
        }
        self.refresh_cols();
        self.refresh_visible(source);
    }

    // -------------------------------------------------------------------------
    // Options
    // -------------------------------------------------------------------------

    /// Change grid options and react to what changed. Returns the options
    /// that actually changed.
    pub fn update_grid_options<F>(&mut self, update: F, source: ColumnEventSource) -> Vec<GridOption>
    where
        F: FnOnce(&mut GridOptions),
    {
        let changed = self.ctx.options().update(update);
        let any = |options: &[GridOption]| options.iter().any(|o| changed.contains(o));

        if any(&[
            GridOption::GroupDisplayType,
            GridOption::TreeData,
            GridOption::TreeDataDisplayType,
            GridOption::GroupHideOpenParents,
        ]) {
            self.refresh_all(source);
        }
        if any(&[GridOption::AutoGroupColumnDef]) {
            self.update_auto_cols();
        }
        if any(&[
            GridOption::DefaultColDef,
            GridOption::ColumnTypes,
            GridOption::SuppressFieldDotNotation,
        ]) {
            self.recreate_column_defs(source);
        }
        if any(&[GridOption::PivotMode]) {
            let pivot_mode = self.ctx.options().get(keys::PIVOT_MODE);
            self.set_pivot_mode(pivot_mode, source);
        }
        changed
    }

    // -------------------------------------------------------------------------
    // Ordering
    // -------------------------------------------------------------------------

    /// Reorder the live columns to follow `col_ids`.
    ///
    /// Unknown ids are skipped. Columns not named keep their relative order
    /// after the named ones, except auto-group columns, which go first.
    /// Returns `false`, leaving the order alone, when the new order would
    /// split married children.
    pub fn sort_cols_like_keys<S: AsRef<str>>(&mut self, col_ids: &[S]) -> bool {
        let Some(cols) = &self.cols else {
            return false;
        };

        let mut new_order: Vec<Arc<Column>> = Vec::with_capacity(cols.list.len());
        let mut processed: HashSet<&str> = HashSet::new();
        for col_id in col_ids {
            let col_id = col_id.as_ref();
            if processed.contains(col_id) {
                continue;
            }
            if let Some(column) = cols.map.get(col_id) {
                new_order.push(column.clone());
                processed.insert(column.id());
            }
        }

        let mut auto_group_insert_index = 0;
        for column in &cols.list {
            if processed.contains(column.id()) {
                continue;
            }
            if column.is_auto_group_column() {
                new_order.insert(auto_group_insert_index, column.clone());
                auto_group_insert_index += 1;
            } else {
                new_order.push(column.clone());
            }
        }

        let new_order = self.move_service.place_locked_columns(new_order);
        if !self
            .move_service
            .does_move_pass_married_children(&cols.tree, &new_order)
        {
            self.ctx.warnings().warn(ColumnWarning::MarriedChildrenBroken);
            return false;
        }
        self.set_cols_list(new_order);
        true
    }

    /// Sort `columns` into live order. Left alone unless every one of them
    /// is live.
    pub fn sort_cols_like_cols(&self, columns: &mut [Arc<Column>]) {
        let Some(cols) = &self.cols else {
            return;
        };
        let positions: Option<Vec<usize>> = columns
            .iter()
            .map(|column| cols.list.iter().position(|c| Arc::ptr_eq(c, column)))
            .collect();
        let Some(positions) = positions else {
            return;
        };
        let mut indexed: Vec<(usize, Arc<Column>)> = positions.into_iter().zip(columns.iter().cloned()).collect();
        indexed.sort_by_key(|(position, _)| *position);
        for (slot, (_, column)) in columns.iter_mut().zip(indexed) {
            *slot = column;
        }
    }

    /// Move columns within the live list without any checks, then refresh
    /// the displayed columns.
    pub fn move_in_cols(&mut self, moved: &[Arc<Column>], to_index: usize, source: ColumnEventSource) {
        if let Some(cols) = &mut self.cols {
            move_in_array(&mut cols.list, moved, to_index);
            cols.update_map();
        }
        self.refresh_visible(source);
    }

    fn set_cols_list(&mut self, list: Vec<Arc<Column>>) {
        if let Some(cols) = &mut self.cols {
            cols.list = list;
            cols.update_map();
        }
    }

    // -------------------------------------------------------------------------
    // Pinning and visibility
    // -------------------------------------------------------------------------

    /// Pin columns to a side, or unpin them.
    ///
    /// Ignored in print layout. Sends one `ColumnPinned` for every column
    /// that changed.
    pub fn set_cols_pinned(&mut self, keys: &[ColKey<'_>], pinned: impl Into<Pinned>, source: ColumnEventSource) {
        if self.cols.is_none() || keys.is_empty() {
            return;
        }
        if self.ctx.options().is_dom_layout(DomLayout::Print) {
            self.ctx.warnings().warn_once(ColumnWarning::PinningInPrintLayout);
            return;
        }

        let pinned = pinned.into();
        let changed: Vec<Arc<Column>> = self
            .get_cols_for_keys(keys)
            .into_iter()
            .filter(|column| column.set_pinned(pinned))
            .collect();
        if changed.is_empty() {
            return;
        }
        self.refresh_visible(source);
        self.dispatcher.column_pinned(changed, source);
    }

    /// Show or hide columns.
    pub fn set_cols_visible(&mut self, keys: &[ColKey<'_>], visible: bool, source: ColumnEventSource) {
        let state = self
            .get_cols_for_keys(keys)
            .iter()
            .map(|column| ColumnState {
                hide: Some(!visible),
                ..ColumnState::new(column.id())
            })
            .collect();
        self.apply_column_state(
            ApplyColumnStateParams {
                state: Some(state),
                ..Default::default()
            },
            source,
        );
    }

    // -------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------

    /// The live column `key` refers to.
    pub fn get_col<'a>(&self, key: impl Into<ColKey<'a>>) -> Option<Arc<Column>> {
        self.get_col_from_collection(key.into(), self.cols.as_ref()?)
    }

    /// The definition column `key` refers to, whether shown or not.
    pub fn get_col_def_col<'a>(&self, key: impl Into<ColKey<'a>>) -> Option<Arc<Column>> {
        self.get_col_from_collection(key.into(), self.col_def_cols.as_ref()?)
    }

    /// Resolve `key` in `collection`: the id map first, then a scan matching
    /// definitions and instances, then the auto columns.
    pub fn get_col_from_collection(&self, key: ColKey<'_>, collection: &ColumnCollections) -> Option<Arc<Column>> {
        if let ColKey::Id(id) = key
            && let Some(column) = collection.map.get(id)
        {
            return Some(column.clone());
        }
        collection
            .list
            .iter()
            .find(|c| c.matches_key(&key))
            .cloned()
            .or_else(|| self.get_auto_col(key))
    }

    /// The live columns for `keys`, skipping keys that match nothing.
    pub fn get_cols_for_keys(&self, keys: &[ColKey<'_>]) -> Vec<Arc<Column>> {
        keys.iter().filter_map(|key| self.get_col(*key)).collect()
    }

    pub fn get_auto_col<'a>(&self, key: impl Into<ColKey<'a>>) -> Option<Arc<Column>> {
        let key = key.into();
        self.auto_cols
            .as_ref()?
            .list
            .iter()
            .find(|c| c.matches_key(&key))
            .cloned()
    }

    /// The provided group with the given id, searched in the live tree.
    pub fn get_provided_col_group(&self, group_id: &str) -> Option<Arc<ProvidedColumnGroup>> {
        let cols = self.cols.as_ref()?;
        let mut found = None;
        depth_first_original_tree_search(None, &cols.tree, &mut |node, _| {
            if found.is_none()
                && let ProvidedColumn::Group(group) = node
                && group.id() == group_id
            {
                found = Some(group.clone());
            }
        });
        found
    }

    // -------------------------------------------------------------------------
    // Collections
    // -------------------------------------------------------------------------

    /// Every live column in display order; empty before the first load.
    pub fn cols(&self) -> &[Arc<Column>] {
        self.cols.as_ref().map(|cols| cols.list.as_slice()).unwrap_or_default()
    }

    /// The live collections: tree, depth, list and map.
    pub fn col_collections(&self) -> Option<&ColumnCollections> {
        self.cols.as_ref()
    }

    /// The live tree.
    pub fn col_tree(&self) -> &[ProvidedColumn] {
        self.cols.as_ref().map(|cols| cols.tree.as_slice()).unwrap_or_default()
    }

    pub fn tree_depth(&self) -> usize {
        self.cols.as_ref().map_or(0, |cols| cols.tree_depth)
    }

    /// Columns built from the definitions, in definition order.
    pub fn col_def_cols(&self) -> &[Arc<Column>] {
        self.col_def_cols
            .as_ref()
            .map(|cols| cols.list.as_slice())
            .unwrap_or_default()
    }

    /// The tree built from the definitions.
    pub fn col_def_col_tree(&self) -> &[ProvidedColumn] {
        self.col_def_cols
            .as_ref()
            .map(|cols| cols.tree.as_slice())
            .unwrap_or_default()
    }

    pub fn auto_cols(&self) -> Option<&[Arc<Column>]> {
        self.auto_cols.as_ref().map(|cols| cols.list.as_slice())
    }

    pub fn func_cols(&self) -> &FuncColsService {
        &self.func_cols
    }

    pub fn visible_cols(&self) -> &VisibleColsService {
        &self.visible_cols
    }

    pub fn viewport(&self) -> &ColumnViewportService {
        &self.viewport
    }

    pub fn show_row_group_cols(&self) -> &ShowRowGroupColsService {
        &self.show_row_group_cols
    }

    /// The columns quick filtering reads.
    pub fn quick_filter_cols(&self) -> &[Arc<Column>] {
        self.quick_filter_cols.cols()
    }

    /// Whether any live column spans several cells.
    pub fn is_col_span_active(&self) -> bool {
        self.col_span_active
    }

    pub fn is_auto_row_height_active(&self) -> bool {
        self.auto_height_active
    }

    pub fn was_auto_row_height_ever_active(&self) -> bool {
        self.auto_height_active_at_least_once
    }

    /// Whether a row-group column is locked in place by
    /// `groupLockGroupColumns`.
    pub fn is_row_group_col_locked(&self, column: &Arc<Column>) -> bool {
        let lock = self.ctx.options().get(keys::GROUP_LOCK_GROUP_COLUMNS);
        if !column.is_row_group_active() || lock == 0 {
            return false;
        }
        if lock == -1 {
            return true;
        }
        self.func_cols
            .row_group_columns()
            .iter()
            .position(|c| Arc::ptr_eq(c, column))
            .is_some_and(|index| i32::try_from(index).is_ok_and(|index| index < lock))
    }

    /// Re-merge a column's definition from what the application supplied.
    /// Returns `false` for generated columns.
    pub fn reset_col_def_into_col(&self, column: &Column) -> bool {
        let Some(user_col_def) = column.user_provided_col_def() else {
            return false;
        };
        let merged = self.factory.add_column_default_and_types(&user_col_def);
        column.set_col_def(merged, Some((*user_col_def).clone()));
        true
    }

    // -------------------------------------------------------------------------
    // Header heights
    // -------------------------------------------------------------------------

    /// Rows of header: one per group level plus the column header.
    /// Zero before the first load.
    pub fn header_row_count(&self) -> usize {
        self.cols.as_ref().map_or(0, |cols| cols.tree_depth + 1)
    }

    pub fn header_height(&self) -> f32 {
        self.ctx
            .options()
            .with(|o| o.header_height)
            .unwrap_or(DEFAULT_HEADER_HEIGHT)
    }

    pub fn floating_filters_height(&self) -> f32 {
        self.ctx
            .options()
            .with(|o| o.floating_filters_height)
            .unwrap_or_else(|| self.header_height())
    }

    pub fn group_header_height(&self) -> f32 {
        self.ctx
            .options()
            .with(|o| o.group_header_height)
            .unwrap_or_else(|| self.header_height())
    }

    pub fn pivot_header_height(&self) -> f32 {
        self.ctx
            .options()
            .with(|o| o.pivot_header_height)
            .unwrap_or_else(|| self.header_height())
    }

    pub fn pivot_group_header_height(&self) -> f32 {
        self.ctx
            .options()
            .with(|o| o.pivot_group_header_height)
            .unwrap_or_else(|| self.group_header_height())
    }

    pub fn column_group_header_row_height(&self) -> f32 {
        if self.pivot_mode {
            self.pivot_group_header_height()
        } else {
            self.group_header_height()
        }
    }

    /// Height of the column header row: the configured height, or the
    /// tallest measured header among displayed auto header height columns.
    pub fn column_header_row_height(&self) -> f32 {
        let default_height = if self.pivot_mode {
            self.pivot_header_height()
        } else {
            self.header_height()
        };
        self.visible_cols
            .all_cols()
            .iter()
            .filter(|c| c.is_auto_header_height())
            .map(|c| c.auto_header_height().unwrap_or(0.0))
            .fold(default_height, f32::max)
    }

    /// Record the measured header height of an auto header height column.
    pub fn set_col_header_height(&self, column: &Arc<Column>, height: f32) {
        if column.set_auto_header_height(Some(height)) {
            self.dispatcher.header_height_changed(column.clone());
        }
    }

    // -------------------------------------------------------------------------
    // Queued and deferred work
    // -------------------------------------------------------------------------

    /// Hold back resize operations until
    /// [`process_resize_operations`](Self::process_resize_operations).
    pub fn queue_resize_operations(&mut self) {
        self.should_queue_resize_operations = true;
    }

    pub fn is_should_queue_resize_operations(&self) -> bool {
        self.should_queue_resize_operations
    }

    /// Stop queueing and run every queued resize, oldest first.
    pub fn process_resize_operations(&mut self) {
        self.should_queue_resize_operations = false;
        let queue = std::mem::take(&mut self.resize_operation_queue);
        tracing::debug!(target: targets::COLUMN_SIZE, count = queue.len(), "running queued resizes");
        for operation in queue {
            operation(self);
        }
    }

    pub fn push_resize_operation<F>(&mut self, operation: F)
    where
        F: FnOnce(&mut ColumnModel) + Send + 'static,
    {
        self.resize_operation_queue.push(Box::new(operation));
    }

    fn defer<F>(&mut self, task: F)
    where
        F: FnOnce(&mut ColumnModel) + Send + 'static,
    {
        self.deferred.push(Box::new(task));
    }

    /// Run work deferred until the host finished its current render pass.
    /// Returns how many tasks ran.
    ///
    /// Tasks deferred while flushing run in the next flush.
    pub fn flush_deferred(&mut self) -> usize {
        let tasks = std::mem::take(&mut self.deferred);
        let count = tasks.len();
        for task in tasks {
            task(self);
        }
        count
    }

    /// Destroy every column and group this model created.
    ///
    /// Also run on drop; calling it twice is harmless.
    pub fn destroy(&mut self) {
        if let Some(col_def_cols) = self.col_def_cols.take() {
            destroy_column_tree(self.ctx.beans(), &col_def_cols.tree, None);
        }
        self.destroy_auto_cols();
        self.pivot_result_cols.destroy();
        self.cols = None;
        self.last_order = None;
        self.last_pivot_order = None;
        self.visible_cols.clear();
        self.viewport.clear();
        self.resize_operation_queue.clear();
        self.deferred.clear();
    }
}

impl Drop for ColumnModel {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn contains(columns: &[Arc<Column>], column: &Arc<Column>) -> bool {
    columns.iter().any(|c| Arc::ptr_eq(c, column))
}

/// `current` in the order of `last_order`, or `None` when they share no
/// column.
///
/// Columns missing from `last_order` go right after the last placed leaf of
/// their closest ancestor group that has one, or at the end.
fn restored_order(current: &[Arc<Column>], last_order: &[Arc<Column>]) -> Option<Vec<Arc<Column>>> {
    let current_set: HashSet<*const Column> = current.iter().map(Arc::as_ptr).collect();
    let last_set: HashSet<*const Column> = last_order.iter().map(Arc::as_ptr).collect();
    if !current.iter().any(|c| last_set.contains(&Arc::as_ptr(c))) {
        return None;
    }

    let mut result: Vec<Arc<Column>> = last_order
        .iter()
        .filter(|c| current_set.contains(&Arc::as_ptr(c)))
        .cloned()
        .collect();
    let placed: HashSet<*const Column> = result.iter().map(Arc::as_ptr).collect();

    for column in current.iter().filter(|c| !placed.contains(&Arc::as_ptr(c))) {
        let mut parent = column.original_parent();
        let mut last_sibling = None;
        while last_sibling.is_none() {
            let Some(group) = parent else {
                break;
            };
            last_sibling = group
                .leaf_columns()
                .iter()
                .filter_map(|leaf| result.iter().position(|c| Arc::ptr_eq(c, leaf)))
                .max();
            parent = group.original_parent();
        }
        match last_sibling {
            Some(index) => result.insert(index + 1, column.clone()),
            None => result.push(column.clone()),
        }
    }
    Some(result)
}

static_assertions::assert_impl_all!(ColumnModel: Send);
