//! Provided column groups: the group nodes of the column tree.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use horizon_grid_core::logging::targets;
use horizon_grid_core::{Bean, BeanId, BeanRegistry, Property};
use parking_lot::RwLock;

use crate::col_def::{ColGroupDef, ColumnGroupShow};
use crate::columns::column::Column;
use crate::columns::provided::ProvidedColumn;

/// A group node, either from a group definition or inserted as padding.
///
/// Groups own their children. The link back to the parent is weak and is
/// only set once the tree is balanced, since balancing inserts levels.
pub struct ProvidedColumnGroup {
    bean_id: BeanId,
    group_id: String,
    padding: bool,
    level: Property<usize>,
    col_group_def: RwLock<Option<Arc<ColGroupDef>>>,
    children: RwLock<Vec<ProvidedColumn>>,
    expanded: Property<bool>,
    expandable: Property<bool>,
    original_parent: RwLock<Weak<ProvidedColumnGroup>>,
    destroyed: AtomicBool,
}

impl ProvidedColumnGroup {
    /// Create and register a group.
    pub fn new(
        beans: &BeanRegistry,
        col_group_def: Option<ColGroupDef>,
        group_id: impl Into<String>,
        padding: bool,
        level: usize,
    ) -> Arc<Self> {
        let group_id = group_id.into();
        let expanded = col_group_def
            .as_ref()
            .and_then(|def| def.open_by_default)
            .unwrap_or(false);
        let group = Arc::new(Self {
            bean_id: beans.register::<ProvidedColumnGroup>(group_id.clone()),
            group_id,
            padding,
            level: Property::new(level),
            col_group_def: RwLock::new(col_group_def.map(Arc::new)),
            children: RwLock::new(Vec::new()),
            expanded: Property::new(expanded),
            expandable: Property::new(false),
            original_parent: RwLock::new(Weak::new()),
            destroyed: AtomicBool::new(false),
        });
        if let Err(err) = beans.create_bean(&*group) {
            tracing::error!(target: targets::COLUMN_FACTORY, %err, "group registration failed");
        }
        group
    }

    pub fn id(&self) -> &str {
        &self.group_id
    }

    /// Alias of [`id`](Self::id).
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Padding groups are inserted to balance the tree.
    pub fn is_padding(&self) -> bool {
        self.padding
    }

    pub fn level(&self) -> usize {
        self.level.get()
    }

    pub(crate) fn set_level(&self, level: usize) {
        self.level.set(level);
    }

    pub fn col_group_def(&self) -> Option<Arc<ColGroupDef>> {
        self.col_group_def.read().clone()
    }

    pub(crate) fn set_col_group_def(&self, def: ColGroupDef) {
        *self.col_group_def.write() = Some(Arc::new(def));
    }

    pub fn header_name(&self) -> Option<String> {
        self.col_group_def
            .read()
            .as_ref()
            .and_then(|def| def.header_name.clone())
    }

    pub fn column_group_show(&self) -> Option<ColumnGroupShow> {
        self.col_group_def
            .read()
            .as_ref()
            .and_then(|def| def.column_group_show)
    }

    /// Whether children must stay adjacent when columns move.
    pub fn is_marry_children(&self) -> bool {
        self.col_group_def
            .read()
            .as_ref()
            .and_then(|def| def.marry_children)
            .unwrap_or(false)
    }

    pub fn children(&self) -> Vec<ProvidedColumn> {
        self.children.read().clone()
    }

    pub(crate) fn set_children(&self, children: Vec<ProvidedColumn>) {
        *self.children.write() = children;
    }

    /// Children with padding groups replaced by what they pad.
    pub fn children_removing_padding(&self) -> Vec<ProvidedColumn> {
        let mut result = Vec::new();
        collect_removing_padding(&self.children(), &mut result);
        result
    }

    /// Every leaf column below this group, in tree order.
    pub fn leaf_columns(&self) -> Vec<Arc<Column>> {
        let mut result = Vec::new();
        for child in self.children.read().iter() {
            match child {
                ProvidedColumn::Column(column) => result.push(column.clone()),
                ProvidedColumn::Group(group) => result.extend(group.leaf_columns()),
            }
        }
        result
    }

    /// Whether at least one child is visible.
    pub fn is_visible(&self) -> bool {
        self.children.read().iter().any(ProvidedColumn::is_visible)
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded.get()
    }

    pub fn set_expanded(&self, expanded: bool) -> bool {
        self.expanded.set(expanded)
    }

    /// Whether opening or closing the group changes what is shown.
    pub fn is_expandable(&self) -> bool {
        self.expandable.get()
    }

    /// Recompute [`is_expandable`](Self::is_expandable) from the visible
    /// children. Returns whether it changed.
    pub fn setup_expandable(&self) -> bool {
        if self.padding {
            return false;
        }

        let mut showing_when_open = false;
        let mut showing_when_closed = false;
        let mut changeable = false;

        for child in self.children_removing_padding() {
            if !child.is_visible() {
                continue;
            }
            match child.column_group_show() {
                Some(ColumnGroupShow::Open) => {
                    showing_when_open = true;
                    changeable = true;
                }
                Some(ColumnGroupShow::Closed) => {
                    showing_when_closed = true;
                    changeable = true;
                }
                None => {
                    showing_when_open = true;
                    showing_when_closed = true;
                }
            }
        }

        self.expandable
            .set(showing_when_open && showing_when_closed && changeable)
    }

    pub fn original_parent(&self) -> Option<Arc<ProvidedColumnGroup>> {
        self.original_parent.read().upgrade()
    }

    pub fn set_original_parent(&self, parent: Option<&Arc<ProvidedColumnGroup>>) {
        *self.original_parent.write() = parent.map(Arc::downgrade).unwrap_or_default();
    }

    pub fn is_alive(&self) -> bool {
        !self.destroyed.load(Ordering::SeqCst)
    }
}

fn collect_removing_padding(children: &[ProvidedColumn], result: &mut Vec<ProvidedColumn>) {
    for child in children {
        match child {
            ProvidedColumn::Group(group) if group.is_padding() => {
                collect_removing_padding(&group.children(), result);
            }
            other => result.push(other.clone()),
        }
    }
}

impl Bean for ProvidedColumnGroup {
    fn bean_id(&self) -> BeanId {
        self.bean_id
    }

    fn pre_destroy(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
        *self.original_parent.write() = Weak::new();
    }
}

impl fmt::Debug for ProvidedColumnGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvidedColumnGroup")
            .field("id", &self.group_id)
            .field("padding", &self.padding)
            .field("level", &self.level())
            .field("expanded", &self.is_expanded())
            .field("children", &self.children.read().len())
            .finish()
    }
}

static_assertions::assert_impl_all!(ProvidedColumnGroup: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::col_def::ColDef;

    fn leaf(beans: &BeanRegistry, id: &str, show: Option<ColumnGroupShow>) -> ProvidedColumn {
        let def = ColDef {
            column_group_show: show,
            ..ColDef::field(id)
        };
        ProvidedColumn::Column(Column::new(beans, def.clone(), Some(def), id, true))
    }

    #[test]
    fn test_expandable_needs_both_states_and_a_changeable_child() {
        let beans = BeanRegistry::new();
        let group = ProvidedColumnGroup::new(&beans, Some(ColGroupDef::default()), "g", false, 0);

        group.set_children(vec![leaf(&beans, "a", None), leaf(&beans, "b", None)]);
        group.setup_expandable();
        assert!(!group.is_expandable());

        group.set_children(vec![
            leaf(&beans, "a", None),
            leaf(&beans, "b", Some(ColumnGroupShow::Open)),
        ]);
        assert!(group.setup_expandable());
        assert!(group.is_expandable());
    }

    #[test]
    fn test_hidden_children_do_not_count() {
        let beans = BeanRegistry::new();
        let group = ProvidedColumnGroup::new(&beans, Some(ColGroupDef::default()), "g", false, 0);
        let open_child = leaf(&beans, "b", Some(ColumnGroupShow::Open));
        if let ProvidedColumn::Column(col) = &open_child {
            col.set_visible(false);
        }
        group.set_children(vec![leaf(&beans, "a", None), open_child]);
        group.setup_expandable();
        assert!(!group.is_expandable());
    }

    #[test]
    fn test_padding_is_transparent() {
        let beans = BeanRegistry::new();
        let group = ProvidedColumnGroup::new(&beans, Some(ColGroupDef::default()), "g", false, 0);
        let padding = ProvidedColumnGroup::new(&beans, None, "pad", true, 1);
        padding.set_children(vec![leaf(&beans, "a", None)]);
        group.set_children(vec![ProvidedColumn::Group(padding), leaf(&beans, "b", None)]);

        let ids: Vec<String> = group
            .children_removing_padding()
            .iter()
            .map(|c| c.id().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(group.leaf_columns().len(), 2);
    }

    #[test]
    fn test_open_by_default() {
        let beans = BeanRegistry::new();
        let def = ColGroupDef::default().with_open_by_default(true);
        let group = ProvidedColumnGroup::new(&beans, Some(def), "g", false, 0);
        assert!(group.is_expanded());
    }
}
