//! The leaf column entity.

use std::fmt;
use std::sync::{Arc, Weak};
use std::sync::atomic::{AtomicBool, Ordering};

use horizon_grid_core::logging::targets;
use horizon_grid_core::{Bean, BeanId, BeanRegistry, Property};
use parking_lot::RwLock;

use crate::col_def::{ColDef, ColumnGroupShow, DefHandle, LockPosition, Pinned, SortDirection};
use crate::columns::auto_cols::AUTO_GROUP_COLUMN_ID;
use crate::columns::provided_group::ProvidedColumnGroup;

/// Width used when a definition gives none.
pub const DEFAULT_COLUMN_WIDTH: f32 = 200.0;

/// Minimum width used when a definition gives none.
pub const DEFAULT_COLUMN_MIN_WIDTH: f32 = 20.0;

/// Ways to refer to a column.
#[derive(Debug, Clone, Copy)]
pub enum ColKey<'a> {
    /// By column id.
    Id(&'a str),
    /// By the definition the column was built from.
    Def(DefHandle),
    /// By instance.
    Column(&'a Arc<Column>),
}

impl<'a> From<&'a str> for ColKey<'a> {
    fn from(id: &'a str) -> Self {
        ColKey::Id(id)
    }
}

impl<'a> From<&'a String> for ColKey<'a> {
    fn from(id: &'a String) -> Self {
        ColKey::Id(id)
    }
}

impl<'a> From<&'a ColDef> for ColKey<'a> {
    fn from(def: &'a ColDef) -> Self {
        ColKey::Def(def.handle)
    }
}

impl<'a> From<&'a Arc<Column>> for ColKey<'a> {
    fn from(column: &'a Arc<Column>) -> Self {
        ColKey::Column(column)
    }
}

/// Initial width of a column built from `def`, clamped to its limits.
pub(crate) fn initial_width(def: &ColDef) -> f32 {
    let width = def.width.or(def.initial_width).unwrap_or(DEFAULT_COLUMN_WIDTH);
    clamp_width(def, width)
}

fn clamp_width(def: &ColDef, width: f32) -> f32 {
    let min = def.min_width.unwrap_or(DEFAULT_COLUMN_MIN_WIDTH);
    let max = def.max_width.unwrap_or(f32::MAX).max(min);
    width.clamp(min, max)
}

/// A leaf column: a resolved definition plus live state.
///
/// Columns are shared between the column tree, the ordered column list and
/// emitted events, so all live state uses interior mutability. Setters return
/// whether the value changed; the model decides which events follow.
pub struct Column {
    bean_id: BeanId,
    col_id: String,
    primary: bool,
    col_def: RwLock<Arc<ColDef>>,
    user_col_def: RwLock<Option<Arc<ColDef>>>,

    actual_width: Property<f32>,
    flex: Property<f32>,
    visible: Property<bool>,
    pinned: Property<Pinned>,
    sort: Property<Option<SortDirection>>,
    sort_index: Property<Option<u32>>,
    row_group_active: Property<bool>,
    pivot_active: Property<bool>,
    value_active: Property<bool>,
    agg_func: Property<Option<String>>,
    auto_header_height: Property<Option<f32>>,
    left: Property<Option<f32>>,

    original_parent: RwLock<Weak<ProvidedColumnGroup>>,
    destroyed: AtomicBool,
}

impl Column {
    /// Create and register a column.
    ///
    /// `col_def` is the merged definition, `user_col_def` the definition the
    /// application supplied (absent for generated columns).
    pub fn new(
        beans: &BeanRegistry,
        col_def: ColDef,
        user_col_def: Option<ColDef>,
        col_id: impl Into<String>,
        primary: bool,
    ) -> Arc<Self> {
        let col_id = col_id.into();
        let bean_id = beans.register::<Column>(col_id.clone());
        let column = Arc::new(Self {
            bean_id,
            col_id,
            primary,
            actual_width: Property::new(initial_width(&col_def)),
            flex: Property::new(col_def.flex.flatten().or(col_def.initial_flex).unwrap_or(0.0)),
            visible: Property::new(!col_def.hide.or(col_def.initial_hide).unwrap_or(false)),
            pinned: Property::new(col_def.pinned.or(col_def.initial_pinned).unwrap_or_default()),
            sort: Property::new(col_def.sort.unwrap_or(col_def.initial_sort)),
            sort_index: Property::new(col_def.sort_index.unwrap_or(col_def.initial_sort_index)),
            row_group_active: Property::new(false),
            pivot_active: Property::new(false),
            value_active: Property::new(false),
            agg_func: Property::new(
                col_def
                    .agg_func
                    .clone()
                    .flatten()
                    .or_else(|| col_def.initial_agg_func.clone()),
            ),
            auto_header_height: Property::new(None),
            left: Property::new(None),
            col_def: RwLock::new(Arc::new(col_def)),
            user_col_def: RwLock::new(user_col_def.map(Arc::new)),
            original_parent: RwLock::new(Weak::new()),
            destroyed: AtomicBool::new(false),
        });
        if let Err(err) = beans.create_bean(&*column) {
            tracing::error!(target: targets::COLUMN_FACTORY, %err, "column registration failed");
        }
        column
    }

    pub fn id(&self) -> &str {
        &self.col_id
    }

    /// Alias of [`id`](Self::id).
    pub fn col_id(&self) -> &str {
        &self.col_id
    }

    /// Primary columns come from definitions; secondary ones from pivoting.
    pub fn is_primary(&self) -> bool {
        self.primary
    }

    /// The merged definition.
    pub fn col_def(&self) -> Arc<ColDef> {
        self.col_def.read().clone()
    }

    /// The definition the application supplied, if any.
    pub fn user_provided_col_def(&self) -> Option<Arc<ColDef>> {
        self.user_col_def.read().clone()
    }

    /// Replace both definitions, keeping live state.
    pub fn set_col_def(&self, col_def: ColDef, user_col_def: Option<ColDef>) {
        *self.col_def.write() = Arc::new(col_def);
        *self.user_col_def.write() = user_col_def.map(Arc::new);
    }

    /// Whether `key` refers to this column.
    pub fn matches_key(&self, key: &ColKey<'_>) -> bool {
        match key {
            ColKey::Id(id) => self.col_id == *id,
            ColKey::Def(handle) => {
                self.col_def.read().handle == *handle
                    || self
                        .user_col_def
                        .read()
                        .as_ref()
                        .is_some_and(|def| def.handle == *handle)
            }
            ColKey::Column(column) => std::ptr::eq(Arc::as_ptr(column), self),
        }
    }

    pub fn header_name(&self) -> String {
        let def = self.col_def.read();
        def.header_name
            .clone()
            .or_else(|| def.field.clone())
            .unwrap_or_else(|| self.col_id.clone())
    }

    pub fn is_auto_group_column(&self) -> bool {
        self.col_id.starts_with(AUTO_GROUP_COLUMN_ID)
    }

    // -------------------------------------------------------------------------
    // Width
    // -------------------------------------------------------------------------

    pub fn actual_width(&self) -> f32 {
        self.actual_width.get()
    }

    /// Set the width, clamped to the column's limits.
    pub fn set_actual_width(&self, width: f32) -> bool {
        let width = clamp_width(&self.col_def.read(), width);
        self.actual_width.set(width)
    }

    /// Go back to the width the definition asks for.
    pub fn reset_actual_width(&self) -> bool {
        let width = initial_width(&self.col_def.read());
        self.actual_width.set(width)
    }

    /// Shrink to the minimum width.
    pub fn set_minimum(&self) -> bool {
        self.set_actual_width(self.min_width())
    }

    pub fn min_width(&self) -> f32 {
        self.col_def
            .read()
            .min_width
            .unwrap_or(DEFAULT_COLUMN_MIN_WIDTH)
    }

    pub fn max_width(&self) -> f32 {
        self.col_def.read().max_width.unwrap_or(f32::MAX)
    }

    pub fn flex(&self) -> f32 {
        self.flex.get()
    }

    /// Set the flex factor; zero or less turns flexing off.
    pub fn set_flex(&self, flex: Option<f32>) -> bool {
        self.flex.set(flex.unwrap_or(0.0))
    }

    pub fn is_flex(&self) -> bool {
        self.flex.get() > 0.0
    }

    pub fn is_suppress_size_to_fit(&self) -> bool {
        self.col_def.read().suppress_size_to_fit.unwrap_or(false)
    }

    /// Offset from the left edge of the column's section, when displayed.
    pub fn left(&self) -> Option<f32> {
        self.left.get()
    }

    pub fn set_left(&self, left: Option<f32>) -> bool {
        self.left.set(left)
    }

    // -------------------------------------------------------------------------
    // Visibility, pinning, locking
    // -------------------------------------------------------------------------

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn set_visible(&self, visible: bool) -> bool {
        self.visible.set(visible)
    }

    pub fn pinned(&self) -> Pinned {
        self.pinned.get()
    }

    pub fn set_pinned(&self, pinned: Pinned) -> bool {
        self.pinned.set(pinned)
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned.get().is_pinned()
    }

    pub fn is_pinned_left(&self) -> bool {
        self.pinned.get() == Pinned::Left
    }

    pub fn is_pinned_right(&self) -> bool {
        self.pinned.get() == Pinned::Right
    }

    pub fn lock_position(&self) -> Option<LockPosition> {
        self.col_def.read().lock_position
    }

    pub fn is_lock_visible(&self) -> bool {
        self.col_def.read().lock_visible.unwrap_or(false)
    }

    pub fn is_suppress_movable(&self) -> bool {
        self.col_def.read().suppress_movable.unwrap_or(false)
    }

    pub fn column_group_show(&self) -> Option<ColumnGroupShow> {
        self.col_def.read().column_group_show
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    pub fn sort(&self) -> Option<SortDirection> {
        self.sort.get()
    }

    pub fn set_sort(&self, sort: Option<SortDirection>) -> bool {
        self.sort.set(sort)
    }

    pub fn sort_index(&self) -> Option<u32> {
        self.sort_index.get()
    }

    pub fn set_sort_index(&self, sort_index: Option<u32>) -> bool {
        self.sort_index.set(sort_index)
    }

    // -------------------------------------------------------------------------
    // Function roles
    // -------------------------------------------------------------------------

    pub fn is_row_group_active(&self) -> bool {
        self.row_group_active.get()
    }

    pub fn set_row_group_active(&self, active: bool) -> bool {
        self.row_group_active.set(active)
    }

    pub fn is_pivot_active(&self) -> bool {
        self.pivot_active.get()
    }

    pub fn set_pivot_active(&self, active: bool) -> bool {
        self.pivot_active.set(active)
    }

    pub fn is_value_active(&self) -> bool {
        self.value_active.get()
    }

    pub fn set_value_active(&self, active: bool) -> bool {
        self.value_active.set(active)
    }

    /// The aggregation function; kept when the column stops aggregating.
    pub fn agg_func(&self) -> Option<String> {
        self.agg_func.get()
    }

    pub fn set_agg_func(&self, agg_func: Option<String>) -> bool {
        self.agg_func.set(agg_func)
    }

    pub fn is_allow_row_group(&self) -> bool {
        self.col_def.read().enable_row_group.unwrap_or(false)
    }

    pub fn is_allow_pivot(&self) -> bool {
        self.col_def.read().enable_pivot.unwrap_or(false)
    }

    pub fn is_allow_value(&self) -> bool {
        self.col_def.read().enable_value.unwrap_or(false)
    }

    // -------------------------------------------------------------------------
    // Layout flags
    // -------------------------------------------------------------------------

    pub fn is_col_span(&self) -> bool {
        self.col_def.read().col_span.is_some_and(|span| span > 1)
    }

    pub fn is_auto_height(&self) -> bool {
        self.col_def.read().auto_height.unwrap_or(false)
    }

    pub fn is_auto_header_height(&self) -> bool {
        self.col_def.read().auto_header_height.unwrap_or(false)
    }

    /// The measured header height, when auto header height is on.
    pub fn auto_header_height(&self) -> Option<f32> {
        self.auto_header_height.get()
    }

    pub fn set_auto_header_height(&self, height: Option<f32>) -> bool {
        self.auto_header_height.set(height)
    }

    // -------------------------------------------------------------------------
    // Tree links
    // -------------------------------------------------------------------------

    pub fn original_parent(&self) -> Option<Arc<ProvidedColumnGroup>> {
        self.original_parent.read().upgrade()
    }

    pub fn set_original_parent(&self, parent: Option<&Arc<ProvidedColumnGroup>>) {
        *self.original_parent.write() = parent.map(Arc::downgrade).unwrap_or_default();
    }

    /// Whether the column is still registered with its grid.
    pub fn is_alive(&self) -> bool {
        !self.destroyed.load(Ordering::SeqCst)
    }
}

impl Bean for Column {
    fn bean_id(&self) -> BeanId {
        self.bean_id
    }

    fn pre_destroy(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
        *self.original_parent.write() = Weak::new();
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.col_id)
            .field("primary", &self.primary)
            .field("width", &self.actual_width())
            .field("visible", &self.is_visible())
            .field("pinned", &self.pinned())
            .finish()
    }
}

static_assertions::assert_impl_all!(Column: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    fn column(def: ColDef) -> (BeanRegistry, Arc<Column>) {
        let beans = BeanRegistry::new();
        let col = Column::new(&beans, def.clone(), Some(def), "a", true);
        (beans, col)
    }

    #[test]
    fn test_initial_state_from_definition() {
        let def = ColDef {
            initial_width: Some(80.0),
            initial_hide: Some(true),
            initial_pinned: Some(Pinned::Right),
            initial_sort: Some(SortDirection::Asc),
            ..ColDef::field("a")
        };
        let (_beans, col) = column(def);

        assert_eq!(col.actual_width(), 80.0);
        assert!(!col.is_visible());
        assert_eq!(col.pinned(), Pinned::Right);
        assert_eq!(col.sort(), Some(SortDirection::Asc));
        assert!(!col.is_flex());
    }

    #[test]
    fn test_width_is_clamped() {
        let (_beans, col) = column(ColDef::field("a").with_width_limits(Some(50.0), Some(300.0)));
        assert!(col.set_actual_width(10.0));
        assert_eq!(col.actual_width(), 50.0);
        col.set_actual_width(1000.0);
        assert_eq!(col.actual_width(), 300.0);
        assert!(col.reset_actual_width());
        assert_eq!(col.actual_width(), DEFAULT_COLUMN_WIDTH);
    }

    #[test]
    fn test_matches_key() {
        let def = ColDef::field("a");
        let (_beans, col) = column(def.clone());

        assert!(col.matches_key(&ColKey::Id("a")));
        assert!(col.matches_key(&ColKey::from(&def)));
        assert!(col.matches_key(&ColKey::from(&col)));
        assert!(!col.matches_key(&ColKey::from(&ColDef::field("a"))));
    }

    #[test]
    fn test_destroy_marks_dead() {
        let (beans, col) = column(ColDef::field("a"));
        assert!(col.is_alive());
        beans.destroy_bean(&*col).unwrap();
        assert!(!col.is_alive());
    }
}
