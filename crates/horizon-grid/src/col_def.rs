//! Column and column group definitions.
//!
//! Definitions are the declarative input of the column model. They are plain
//! data: the model never mutates a definition it was given, it merges
//! defaults and column types into a copy and keeps the user's definition
//! alongside for identity comparison.
//!
//! Definitions deserialize from the usual camelCase JSON shape:
//!
//! ```
//! use horizon_grid::{ColumnDef, Pinned};
//!
//! let defs: Vec<ColumnDef> = serde_json::from_str(r#"[
//!     { "field": "athlete", "pinned": "left" },
//!     { "groupId": "medals", "children": [
//!         { "field": "gold" },
//!         { "field": "silver", "columnGroupShow": "open" }
//!     ]}
//! ]"#).unwrap();
//!
//! assert_eq!(defs[0].as_column().unwrap().pinned, Some(Pinned::Left));
//! assert!(defs[1].is_group());
//! ```
//!
//! # Tri-state fields
//!
//! Several fields distinguish "not set" from "explicitly cleared". Those are
//! `Option<Option<T>>`: `None` leaves live state alone, `Some(None)` clears
//! it (`null` in JSON) and `Some(Some(v))` sets it.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Global counter for definition handles.
static DEF_HANDLE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque identity token of a definition.
///
/// A fresh handle is issued whenever a definition is created or
/// deserialized. Clones share the handle, so a column can be matched back to
/// the definition it was built from without relying on pointer identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefHandle(u64);

impl DefHandle {
    /// Issue a new, never before seen handle.
    pub fn next() -> Self {
        Self(DEF_HANDLE_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric value, for debugging.
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

impl Default for DefHandle {
    fn default() -> Self {
        Self::next()
    }
}

/// Which side a column is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Pinned {
    /// Pinned to the left edge.
    Left,
    /// Pinned to the right edge.
    Right,
    /// Scrolls with the body.
    #[default]
    Unpinned,
}

impl Pinned {
    /// Parse a pin side the way the grid options accept it.
    ///
    /// `"left"` and `"right"` pin to that side; anything else unpins.
    pub fn from_side(side: &str) -> Self {
        match side {
            "left" => Pinned::Left,
            "right" => Pinned::Right,
            _ => Pinned::Unpinned,
        }
    }

    /// Whether this is a pinned side.
    pub fn is_pinned(self) -> bool {
        self != Pinned::Unpinned
    }

    /// The side name, or `None` when unpinned.
    pub fn as_str(self) -> Option<&'static str> {
        match self {
            Pinned::Left => Some("left"),
            Pinned::Right => Some("right"),
            Pinned::Unpinned => None,
        }
    }
}

impl From<bool> for Pinned {
    fn from(pinned: bool) -> Self {
        if pinned { Pinned::Left } else { Pinned::Unpinned }
    }
}

impl From<Option<Pinned>> for Pinned {
    fn from(pinned: Option<Pinned>) -> Self {
        pinned.unwrap_or(Pinned::Unpinned)
    }
}

impl From<&str> for Pinned {
    fn from(side: &str) -> Self {
        Pinned::from_side(side)
    }
}

impl Serialize for Pinned {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_str() {
            Some(side) => serializer.serialize_str(side),
            None => serializer.serialize_none(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SideRepr {
    Flag(bool),
    Side(String),
}

/// Deserialize an optional pin side where `null`, `false` and unknown
/// strings mean "unpinned" and a missing field means "not set".
pub(crate) fn deserialize_pinned<'de, D>(deserializer: D) -> Result<Option<Pinned>, D::Error>
where
    D: Deserializer<'de>,
{
    let repr = Option::<SideRepr>::deserialize(deserializer)?;
    Ok(Some(match repr {
        None | Some(SideRepr::Flag(false)) => Pinned::Unpinned,
        Some(SideRepr::Flag(true)) => Pinned::Left,
        Some(SideRepr::Side(side)) => Pinned::from_side(&side),
    }))
}

/// Deserialize a field where an explicit `null` is distinct from absence.
pub(crate) fn deserialize_nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Sort direction of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

/// Where a locked column is kept, regardless of reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LockPosition {
    /// Always first.
    Left,
    /// Always last.
    Right,
}

fn deserialize_lock_position<'de, D>(deserializer: D) -> Result<Option<LockPosition>, D::Error>
where
    D: Deserializer<'de>,
{
    let repr = Option::<SideRepr>::deserialize(deserializer)?;
    Ok(match repr {
        Some(SideRepr::Flag(true)) => Some(LockPosition::Left),
        Some(SideRepr::Side(side)) if side == "left" => Some(LockPosition::Left),
        Some(SideRepr::Side(side)) if side == "right" => Some(LockPosition::Right),
        _ => None,
    })
}

/// When a child of an expandable group is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnGroupShow {
    /// Only while the group is open.
    Open,
    /// Only while the group is closed.
    Closed,
}

/// Which row-group column(s) a column displays the group values of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShowRowGroup {
    /// `true` shows every row-group column, `false` none.
    All(bool),
    /// Shows only the row-group column with this id.
    Column(String),
}

impl ShowRowGroup {
    /// Whether the group values of `row_group_col_id` are shown.
    pub fn shows(&self, row_group_col_id: &str) -> bool {
        match self {
            ShowRowGroup::All(all) => *all,
            ShowRowGroup::Column(id) => id == row_group_col_id,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TypeRepr {
    One(String),
    Many(Vec<String>),
}

fn deserialize_col_type<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let repr = Option::<TypeRepr>::deserialize(deserializer)?;
    Ok(repr.map(|repr| match repr {
        TypeRepr::One(types) => types
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        TypeRepr::Many(types) => types,
    }))
}

/// Definition of a single data column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColDef {
    #[serde(skip)]
    pub handle: DefHandle,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub col_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_name: Option<String>,
    /// Column type names, merged in order before the definition itself.
    #[serde(
        rename = "type",
        deserialize_with = "deserialize_col_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub col_type: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_class: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f32>,
    #[serde(
        deserialize_with = "deserialize_nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub flex: Option<Option<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_flex: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppress_size_to_fit: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_hide: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_visible: Option<bool>,

    #[serde(
        deserialize_with = "deserialize_pinned",
        skip_serializing_if = "Option::is_none"
    )]
    pub pinned: Option<Pinned>,
    #[serde(
        deserialize_with = "deserialize_pinned",
        skip_serializing_if = "Option::is_none"
    )]
    pub initial_pinned: Option<Pinned>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_pinned: Option<bool>,
    #[serde(
        deserialize_with = "deserialize_lock_position",
        skip_serializing_if = "Option::is_none"
    )]
    pub lock_position: Option<LockPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppress_movable: Option<bool>,

    #[serde(
        deserialize_with = "deserialize_nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub sort: Option<Option<SortDirection>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_sort: Option<SortDirection>,
    #[serde(
        deserialize_with = "deserialize_nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub sort_index: Option<Option<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_sort_index: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_group: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_row_group: Option<bool>,
    #[serde(
        deserialize_with = "deserialize_nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub row_group_index: Option<Option<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_row_group_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_row_group: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pivot: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_pivot: Option<bool>,
    #[serde(
        deserialize_with = "deserialize_nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub pivot_index: Option<Option<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_pivot_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_pivot: Option<bool>,

    #[serde(
        deserialize_with = "deserialize_nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub agg_func: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_agg_func: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_value: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub col_span: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_height: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_header_height: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_group_show: Option<ColumnGroupShow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_row_group: Option<ShowRowGroup>,
}

/// Copy every field of `$src` that is set over `$dst`.
macro_rules! merge_set_fields {
    ($dst:expr, $src:expr; $($field:ident),* $(,)?) => {
        $(
            if $src.$field.is_some() {
                $dst.$field = $src.$field.clone();
            }
        )*
    };
}

impl ColDef {
    /// Create an empty definition with a fresh handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a definition for a data field.
    pub fn field(field: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            ..Self::default()
        }
    }

    /// Overlay every field set in `other` on top of this definition.
    ///
    /// The handle of `self` is kept.
    pub fn merge_from(&mut self, other: &ColDef) {
        merge_set_fields!(self, other;
            col_id, field, header_name, col_type, header_class, cell_class,
            width, initial_width, min_width, max_width, flex, initial_flex,
            suppress_size_to_fit, hide, initial_hide, lock_visible,
            pinned, initial_pinned, lock_pinned, lock_position, suppress_movable,
            sort, initial_sort, sort_index, initial_sort_index,
            row_group, initial_row_group, row_group_index, initial_row_group_index,
            enable_row_group, pivot, initial_pivot, pivot_index, initial_pivot_index,
            enable_pivot, agg_func, initial_agg_func, enable_value,
            col_span, auto_height, auto_header_height, column_group_show, show_row_group,
        );
    }

    /// Set the column id.
    #[must_use]
    pub fn with_col_id(mut self, col_id: impl Into<String>) -> Self {
        self.col_id = Some(col_id.into());
        self
    }

    /// Set the header name.
    #[must_use]
    pub fn with_header_name(mut self, header_name: impl Into<String>) -> Self {
        self.header_name = Some(header_name.into());
        self
    }

    /// Set the column types.
    #[must_use]
    pub fn with_type<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.col_type = Some(types.into_iter().map(Into::into).collect());
        self
    }

    /// Set the width.
    #[must_use]
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    /// Set the minimum and maximum width.
    #[must_use]
    pub fn with_width_limits(mut self, min_width: Option<f32>, max_width: Option<f32>) -> Self {
        self.min_width = min_width;
        self.max_width = max_width;
        self
    }

    /// Set the flex factor.
    #[must_use]
    pub fn with_flex(mut self, flex: f32) -> Self {
        self.flex = Some(Some(flex));
        self
    }

    /// Set whether the column starts hidden.
    #[must_use]
    pub fn with_hide(mut self, hide: bool) -> Self {
        self.hide = Some(hide);
        self
    }

    /// Set the pinned side.
    #[must_use]
    pub fn with_pinned(mut self, pinned: impl Into<Pinned>) -> Self {
        self.pinned = Some(pinned.into());
        self
    }

    /// Lock the column to one end of the grid.
    #[must_use]
    pub fn with_lock_position(mut self, position: LockPosition) -> Self {
        self.lock_position = Some(position);
        self
    }

    /// Set the sort direction.
    #[must_use]
    pub fn with_sort(mut self, sort: SortDirection) -> Self {
        self.sort = Some(Some(sort));
        self
    }

    /// Set the sort priority.
    #[must_use]
    pub fn with_sort_index(mut self, sort_index: u32) -> Self {
        self.sort_index = Some(Some(sort_index));
        self
    }

    /// Group rows by this column.
    #[must_use]
    pub fn with_row_group(mut self, row_group: bool) -> Self {
        self.row_group = Some(row_group);
        self
    }

    /// Group rows by this column at the given level.
    #[must_use]
    pub fn with_row_group_index(mut self, index: u32) -> Self {
        self.row_group_index = Some(Some(index));
        self
    }

    /// Pivot on this column.
    #[must_use]
    pub fn with_pivot(mut self, pivot: bool) -> Self {
        self.pivot = Some(pivot);
        self
    }

    /// Aggregate this column with the named function.
    #[must_use]
    pub fn with_agg_func(mut self, agg_func: impl Into<String>) -> Self {
        self.agg_func = Some(Some(agg_func.into()));
        self
    }

    /// Show this column only while its group is open or closed.
    #[must_use]
    pub fn with_column_group_show(mut self, show: ColumnGroupShow) -> Self {
        self.column_group_show = Some(show);
        self
    }

    /// Make the column span several cells.
    #[must_use]
    pub fn with_col_span(mut self, span: u32) -> Self {
        self.col_span = Some(span);
        self
    }

    /// Size rows to fit this column's content.
    #[must_use]
    pub fn with_auto_height(mut self, auto_height: bool) -> Self {
        self.auto_height = Some(auto_height);
        self
    }

    /// Size the header to fit this column's header text.
    #[must_use]
    pub fn with_auto_header_height(mut self, auto_header_height: bool) -> Self {
        self.auto_header_height = Some(auto_header_height);
        self
    }
}

/// Definition of a column group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColGroupDef {
    #[serde(skip)]
    pub handle: DefHandle,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_name: Option<String>,
    #[serde(default)]
    pub children: Vec<ColumnDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_by_default: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marry_children: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_group_show: Option<ColumnGroupShow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_class: Option<String>,
}

impl ColGroupDef {
    /// Create a group with an explicit id.
    pub fn new(group_id: impl Into<String>, children: Vec<ColumnDef>) -> Self {
        Self {
            group_id: Some(group_id.into()),
            children,
            ..Self::default()
        }
    }

    /// Create a group without an id; one is allocated when the tree is built.
    pub fn anonymous(children: Vec<ColumnDef>) -> Self {
        Self {
            children,
            ..Self::default()
        }
    }

    /// Overlay every field set in `other` on top of this definition.
    ///
    /// Children and the handle of `self` are kept.
    pub fn merge_from(&mut self, other: &ColGroupDef) {
        merge_set_fields!(self, other;
            group_id, header_name, open_by_default, marry_children,
            column_group_show, header_class,
        );
    }

    /// Set the header name.
    #[must_use]
    pub fn with_header_name(mut self, header_name: impl Into<String>) -> Self {
        self.header_name = Some(header_name.into());
        self
    }

    /// Set whether the group starts open.
    #[must_use]
    pub fn with_open_by_default(mut self, open: bool) -> Self {
        self.open_by_default = Some(open);
        self
    }

    /// Keep the children of this group adjacent when columns are reordered.
    #[must_use]
    pub fn with_marry_children(mut self, marry: bool) -> Self {
        self.marry_children = Some(marry);
        self
    }

    /// Show this group only while its parent is open or closed.
    #[must_use]
    pub fn with_column_group_show(mut self, show: ColumnGroupShow) -> Self {
        self.column_group_show = Some(show);
        self
    }

    /// A column definition standing in for a group that has no children.
    pub(crate) fn as_leaf_def(&self) -> ColDef {
        ColDef {
            handle: self.handle,
            col_id: self.group_id.clone(),
            header_name: self.header_name.clone(),
            column_group_show: self.column_group_show,
            header_class: self.header_class.clone(),
            ..ColDef::default()
        }
    }
}

/// A group definition that is only accepted with at least one child.
struct NonEmptyGroup(ColGroupDef);

impl<'de> Deserialize<'de> for NonEmptyGroup {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let group = ColGroupDef::deserialize(deserializer)?;
        if group.children.is_empty() {
            return Err(serde::de::Error::custom("a group needs at least one child"));
        }
        Ok(NonEmptyGroup(group))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColumnDefRepr {
    Group(NonEmptyGroup),
    Column(ColDef),
}

impl From<ColumnDefRepr> for ColumnDef {
    fn from(repr: ColumnDefRepr) -> Self {
        match repr {
            ColumnDefRepr::Group(NonEmptyGroup(group)) => ColumnDef::Group(group),
            ColumnDefRepr::Column(def) => ColumnDef::Column(def),
        }
    }
}

/// One entry of a column definition list.
///
/// An entry is a group iff it has a non-empty `children` list. An entry
/// with `children: []` is read as a column. Grids that treat any present
/// `children` key as a group would build an empty group from it instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged, from = "ColumnDefRepr")]
pub enum ColumnDef {
    /// A column group.
    Group(ColGroupDef),
    /// A leaf column.
    Column(ColDef),
}

impl ColumnDef {
    /// Whether this entry is built as a group.
    pub fn is_group(&self) -> bool {
        matches!(self, ColumnDef::Group(group) if !group.children.is_empty())
    }

    /// The column definition, if this entry is a column.
    pub fn as_column(&self) -> Option<&ColDef> {
        match self {
            ColumnDef::Column(def) => Some(def),
            ColumnDef::Group(_) => None,
        }
    }

    /// The group definition, if this entry is a group.
    pub fn as_group(&self) -> Option<&ColGroupDef> {
        match self {
            ColumnDef::Group(def) => Some(def),
            ColumnDef::Column(_) => None,
        }
    }
}

impl From<ColDef> for ColumnDef {
    fn from(def: ColDef) -> Self {
        ColumnDef::Column(def)
    }
}

impl From<ColGroupDef> for ColumnDef {
    fn from(def: ColGroupDef) -> Self {
        ColumnDef::Group(def)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_shared_by_clones() {
        let def = ColDef::field("a");
        let copy = def.clone();
        assert_eq!(def.handle, copy.handle);
        assert_ne!(def.handle, ColDef::field("a").handle);
    }

    #[test]
    fn test_merge_keeps_handle_and_overlays_set_fields() {
        let mut merged = ColDef::new().with_width(100.0).with_hide(true);
        let handle = merged.handle;
        merged.merge_from(&ColDef::field("price").with_width(150.0));

        assert_eq!(merged.handle, handle);
        assert_eq!(merged.width, Some(150.0));
        assert_eq!(merged.hide, Some(true));
        assert_eq!(merged.field.as_deref(), Some("price"));
    }

    #[test]
    fn test_pinned_parsing() {
        let def: ColDef = serde_json::from_str(r#"{"pinned": true, "initialPinned": null}"#).unwrap();
        assert_eq!(def.pinned, Some(Pinned::Left));
        assert_eq!(def.initial_pinned, Some(Pinned::Unpinned));

        let def: ColDef = serde_json::from_str(r#"{"pinned": "right"}"#).unwrap();
        assert_eq!(def.pinned, Some(Pinned::Right));
        assert_eq!(def.initial_pinned, None);
    }

    #[test]
    fn test_nullable_sort() {
        let def: ColDef = serde_json::from_str(r#"{"sort": null}"#).unwrap();
        assert_eq!(def.sort, Some(None));

        let def: ColDef = serde_json::from_str(r#"{"sort": "desc", "sortIndex": 2}"#).unwrap();
        assert_eq!(def.sort, Some(Some(SortDirection::Desc)));
        assert_eq!(def.sort_index, Some(Some(2)));

        let def: ColDef = serde_json::from_str("{}").unwrap();
        assert_eq!(def.sort, None);
    }

    #[test]
    fn test_type_accepts_string_or_list() {
        let def: ColDef = serde_json::from_str(r#"{"type": "numericColumn, money"}"#).unwrap();
        assert_eq!(
            def.col_type,
            Some(vec!["numericColumn".to_string(), "money".to_string()])
        );

        let def: ColDef = serde_json::from_str(r#"{"type": ["rightAligned"]}"#).unwrap();
        assert_eq!(def.col_type, Some(vec!["rightAligned".to_string()]));
    }

    #[test]
    fn test_empty_children_is_a_column() {
        let def: ColumnDef = serde_json::from_str(r#"{"field": "a", "children": []}"#).unwrap();
        assert_eq!(def.as_column().and_then(|d| d.field.as_deref()), Some("a"));

        let group: ColumnDef =
            serde_json::from_str(r#"{"groupId": "g", "children": [{"field": "b"}]}"#).unwrap();
        assert!(group.is_group());

        let built = ColumnDef::Group(ColGroupDef::new("g", vec![]));
        assert!(!built.is_group());
    }

    #[test]
    fn test_lock_position_parsing() {
        let def: ColDef = serde_json::from_str(r#"{"lockPosition": true}"#).unwrap();
        assert_eq!(def.lock_position, Some(LockPosition::Left));
        let def: ColDef = serde_json::from_str(r#"{"lockPosition": "right"}"#).unwrap();
        assert_eq!(def.lock_position, Some(LockPosition::Right));
    }

    #[test]
    fn test_serialize_skips_unset_fields() {
        let def = ColDef::field("a").with_pinned(Pinned::Unpinned);
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json, serde_json::json!({"field": "a", "pinned": null}));
    }
}
