//! Tree nodes and tree utilities.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use horizon_grid_core::logging::targets;
use horizon_grid_core::{Bean, BeanId, BeanRegistry};

use crate::col_def::ColumnGroupShow;
use crate::columns::column::Column;
use crate::columns::provided_group::ProvidedColumnGroup;

/// A node of the column tree.
#[derive(Debug, Clone)]
pub enum ProvidedColumn {
    Column(Arc<Column>),
    Group(Arc<ProvidedColumnGroup>),
}

impl ProvidedColumn {
    pub fn id(&self) -> &str {
        match self {
            ProvidedColumn::Column(column) => column.id(),
            ProvidedColumn::Group(group) => group.id(),
        }
    }

    pub fn bean_id(&self) -> BeanId {
        match self {
            ProvidedColumn::Column(column) => column.bean_id(),
            ProvidedColumn::Group(group) => group.bean_id(),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, ProvidedColumn::Group(_))
    }

    pub fn as_column(&self) -> Option<&Arc<Column>> {
        match self {
            ProvidedColumn::Column(column) => Some(column),
            ProvidedColumn::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Arc<ProvidedColumnGroup>> {
        match self {
            ProvidedColumn::Group(group) => Some(group),
            ProvidedColumn::Column(_) => None,
        }
    }

    pub fn is_visible(&self) -> bool {
        match self {
            ProvidedColumn::Column(column) => column.is_visible(),
            ProvidedColumn::Group(group) => group.is_visible(),
        }
    }

    pub fn column_group_show(&self) -> Option<ColumnGroupShow> {
        match self {
            ProvidedColumn::Column(column) => column.column_group_show(),
            ProvidedColumn::Group(group) => group.column_group_show(),
        }
    }

    pub fn original_parent(&self) -> Option<Arc<ProvidedColumnGroup>> {
        match self {
            ProvidedColumn::Column(column) => column.original_parent(),
            ProvidedColumn::Group(group) => group.original_parent(),
        }
    }

    pub fn set_original_parent(&self, parent: Option<&Arc<ProvidedColumnGroup>>) {
        match self {
            ProvidedColumn::Column(column) => column.set_original_parent(parent),
            ProvidedColumn::Group(group) => group.set_original_parent(parent),
        }
    }
}

/// Visit every node depth-first, children before their parent.
///
/// The callback receives the node and its parent group.
pub fn depth_first_original_tree_search<F>(
    parent: Option<&Arc<ProvidedColumnGroup>>,
    tree: &[ProvidedColumn],
    callback: &mut F,
) where
    F: FnMut(&ProvidedColumn, Option<&Arc<ProvidedColumnGroup>>),
{
    for child in tree {
        if let ProvidedColumn::Group(group) = child {
            depth_first_original_tree_search(Some(group), &group.children(), callback);
        }
        callback(child, parent);
    }
}

/// The leaf columns of a tree, left to right.
pub fn columns_from_tree(tree: &[ProvidedColumn]) -> Vec<Arc<Column>> {
    let mut columns = Vec::new();
    for node in tree {
        match node {
            ProvidedColumn::Column(column) => columns.push(column.clone()),
            ProvidedColumn::Group(group) => columns.extend(group.leaf_columns()),
        }
    }
    columns
}

fn collect_nodes(tree: &[ProvidedColumn], nodes: &mut Vec<ProvidedColumn>) {
    depth_first_original_tree_search(None, tree, &mut |node, _| nodes.push(node.clone()));
}

/// Destroy every node of `old_tree` that is not part of `new_tree`.
///
/// Must only be called once `new_tree` is complete, so that reused nodes
/// are never destroyed.
pub fn destroy_column_tree(
    beans: &BeanRegistry,
    old_tree: &[ProvidedColumn],
    new_tree: Option<&[ProvidedColumn]>,
) {
    let mut old_nodes = Vec::new();
    collect_nodes(old_tree, &mut old_nodes);

    let mut keep = HashSet::new();
    if let Some(new_tree) = new_tree {
        let mut new_nodes = Vec::new();
        collect_nodes(new_tree, &mut new_nodes);
        keep.extend(new_nodes.iter().map(ProvidedColumn::bean_id));
    }

    for node in old_nodes {
        if keep.contains(&node.bean_id()) || !beans.contains(node.bean_id()) {
            continue;
        }
        let result = match &node {
            ProvidedColumn::Column(column) => beans.destroy_bean(&**column),
            ProvidedColumn::Group(group) => beans.destroy_bean(&**group),
        };
        if let Err(err) = result {
            tracing::debug!(target: targets::COLUMN_FACTORY, %err, "skipping tree node");
        }
    }
}

/// Structural comparison: same ids, same kinds, same children, same order.
pub fn trees_equal(a: &[ProvidedColumn], b: &[ProvidedColumn]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(left, right)| match (left, right) {
            (ProvidedColumn::Column(l), ProvidedColumn::Column(r)) => l.id() == r.id(),
            (ProvidedColumn::Group(l), ProvidedColumn::Group(r)) => {
                l.id() == r.id() && trees_equal(&l.children(), &r.children())
            }
            _ => false,
        })
}

/// One consistent view of a set of columns.
///
/// `list` is the display order of the tree's leaves and `map` indexes the
/// list by id. The column model rebuilds `map` whenever `list` changes.
#[derive(Debug, Clone, Default)]
pub struct ColumnCollections {
    pub tree: Vec<ProvidedColumn>,
    pub tree_depth: usize,
    pub list: Vec<Arc<Column>>,
    pub map: HashMap<String, Arc<Column>>,
}

impl ColumnCollections {
    /// Build the collections of a tree, listing leaves in tree order.
    pub fn from_tree(tree: Vec<ProvidedColumn>, tree_depth: usize) -> Self {
        let list = columns_from_tree(&tree);
        let mut collections = Self {
            tree,
            tree_depth,
            list,
            map: HashMap::new(),
        };
        collections.update_map();
        collections
    }

    /// Rebuild `map` from `list`.
    pub fn update_map(&mut self) {
        self.map = self
            .list
            .iter()
            .map(|column| (column.id().to_string(), column.clone()))
            .collect();
    }

    pub fn ids(&self) -> Vec<String> {
        self.list.iter().map(|c| c.id().to_string()).collect()
    }

    pub fn contains(&self, column: &Arc<Column>) -> bool {
        self.list.iter().any(|c| Arc::ptr_eq(c, column))
    }
}
