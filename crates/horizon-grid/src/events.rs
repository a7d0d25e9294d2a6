//! Column events.
//!
//! Every change the column model makes is announced as one [`ColumnEvent`]
//! on the grid's [`EventService`]. Dispatch is synchronous: by the time a
//! listener runs, the mutation that caused the event is complete.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use horizon_grid::{ColDef, ColumnEventKind, ColumnEventSource, ColumnModel, GridContext, GridOptions, Pinned};
//!
//! let ctx = GridContext::new(GridOptions::default());
//! let mut model = ColumnModel::new(ctx.clone());
//! model.set_column_defs(vec![ColDef::field("a").into()], ColumnEventSource::Api);
//!
//! let pinned = Arc::new(Mutex::new(Vec::new()));
//! let sink = pinned.clone();
//! ctx.events().subscribe(move |event| {
//!     if event.kind() == ColumnEventKind::ColumnPinned {
//!         sink.lock().push(event.clone());
//!     }
//! });
//!
//! model.set_cols_pinned(&["a".into()], Pinned::Left, ColumnEventSource::Api);
//! assert_eq!(pinned.lock().len(), 1);
//! ```

use std::sync::Arc;

use horizon_grid_core::logging::targets;
use horizon_grid_core::{ConnectionId, Signal};

use crate::col_def::Pinned;
use crate::columns::{Column, ProvidedColumnGroup};

/// What triggered a column change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnEventSource {
    Api,
    GridInitializing,
    GridOptionsChanged,
    ToolPanel,
    ColumnMenu,
    ContextMenu,
    UiColumnMoved,
    UiColumnDragged,
    UiColumnResized,
    AutosizeColumns,
    AutosizeColumnHeaderHeight,
    SizeColumnsToFit,
    Flex,
    RowModelUpdated,
    CellDataTypeInferred,
    AlignedGridChanged,
}

/// The variant of a [`ColumnEvent`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnEventKind {
    GridColumnsChanged,
    DisplayedColumnsChanged,
    NewColumnsLoaded,
    EverythingChanged,
    PivotModeChanged,
    ColumnMoved,
    ColumnPinned,
    ColumnVisible,
    ColumnRowGroupChanged,
    ColumnPivotChanged,
    ColumnValueChanged,
    SortChanged,
    ColumnResized,
    VirtualColumnsChanged,
    HeaderHeightChanged,
    ColumnGroupOpened,
}

/// A change notification from the column model.
#[derive(Debug, Clone)]
pub enum ColumnEvent {
    /// The set or structure of columns in the grid changed.
    GridColumnsChanged,
    /// The displayed (visible, partitioned) columns were recomputed.
    DisplayedColumnsChanged { source: ColumnEventSource },
    /// A new set of column definitions finished loading.
    NewColumnsLoaded { source: ColumnEventSource },
    /// Catch-all sent on every definition load and state application.
    EverythingChanged { source: ColumnEventSource },
    /// Pivot mode was toggled.
    PivotModeChanged,
    ColumnMoved {
        columns: Vec<Arc<Column>>,
        to_index: Option<usize>,
        finished: bool,
        source: ColumnEventSource,
    },
    /// `pinned` is set only when every column ended up on the same side.
    ColumnPinned {
        columns: Vec<Arc<Column>>,
        pinned: Option<Pinned>,
        source: ColumnEventSource,
    },
    /// `visible` is set only when every column ended up equally visible.
    ColumnVisible {
        columns: Vec<Arc<Column>>,
        visible: Option<bool>,
        source: ColumnEventSource,
    },
    ColumnRowGroupChanged {
        columns: Vec<Arc<Column>>,
        source: ColumnEventSource,
    },
    ColumnPivotChanged {
        columns: Vec<Arc<Column>>,
        source: ColumnEventSource,
    },
    ColumnValueChanged {
        columns: Vec<Arc<Column>>,
        source: ColumnEventSource,
    },
    SortChanged {
        columns: Vec<Arc<Column>>,
        source: ColumnEventSource,
    },
    ColumnResized {
        columns: Vec<Arc<Column>>,
        flex_columns: Vec<Arc<Column>>,
        finished: bool,
        source: ColumnEventSource,
    },
    /// The columns inside the horizontal viewport changed.
    VirtualColumnsChanged { after_scroll: bool },
    /// A column's auto header height changed.
    HeaderHeightChanged { column: Arc<Column> },
    ColumnGroupOpened {
        groups: Vec<Arc<ProvidedColumnGroup>>,
    },
}

impl ColumnEvent {
    pub fn kind(&self) -> ColumnEventKind {
        match self {
            ColumnEvent::GridColumnsChanged => ColumnEventKind::GridColumnsChanged,
            ColumnEvent::DisplayedColumnsChanged { .. } => ColumnEventKind::DisplayedColumnsChanged,
            ColumnEvent::NewColumnsLoaded { .. } => ColumnEventKind::NewColumnsLoaded,
            ColumnEvent::EverythingChanged { .. } => ColumnEventKind::EverythingChanged,
            ColumnEvent::PivotModeChanged => ColumnEventKind::PivotModeChanged,
            ColumnEvent::ColumnMoved { .. } => ColumnEventKind::ColumnMoved,
            ColumnEvent::ColumnPinned { .. } => ColumnEventKind::ColumnPinned,
            ColumnEvent::ColumnVisible { .. } => ColumnEventKind::ColumnVisible,
            ColumnEvent::ColumnRowGroupChanged { .. } => ColumnEventKind::ColumnRowGroupChanged,
            ColumnEvent::ColumnPivotChanged { .. } => ColumnEventKind::ColumnPivotChanged,
            ColumnEvent::ColumnValueChanged { .. } => ColumnEventKind::ColumnValueChanged,
            ColumnEvent::SortChanged { .. } => ColumnEventKind::SortChanged,
            ColumnEvent::ColumnResized { .. } => ColumnEventKind::ColumnResized,
            ColumnEvent::VirtualColumnsChanged { .. } => ColumnEventKind::VirtualColumnsChanged,
            ColumnEvent::HeaderHeightChanged { .. } => ColumnEventKind::HeaderHeightChanged,
            ColumnEvent::ColumnGroupOpened { .. } => ColumnEventKind::ColumnGroupOpened,
        }
    }

    /// The affected columns, empty for events that do not carry any.
    pub fn columns(&self) -> &[Arc<Column>] {
        match self {
            ColumnEvent::ColumnMoved { columns, .. }
            | ColumnEvent::ColumnPinned { columns, .. }
            | ColumnEvent::ColumnVisible { columns, .. }
            | ColumnEvent::ColumnRowGroupChanged { columns, .. }
            | ColumnEvent::ColumnPivotChanged { columns, .. }
            | ColumnEvent::ColumnValueChanged { columns, .. }
            | ColumnEvent::SortChanged { columns, .. }
            | ColumnEvent::ColumnResized { columns, .. } => columns,
            ColumnEvent::HeaderHeightChanged { column } => std::slice::from_ref(column),
            _ => &[],
        }
    }

    /// The affected column when exactly one column was affected.
    pub fn column(&self) -> Option<&Arc<Column>> {
        match self.columns() {
            [single] => Some(single),
            _ => None,
        }
    }

    pub fn source(&self) -> Option<ColumnEventSource> {
        match self {
            ColumnEvent::DisplayedColumnsChanged { source }
            | ColumnEvent::NewColumnsLoaded { source }
            | ColumnEvent::EverythingChanged { source }
            | ColumnEvent::ColumnMoved { source, .. }
            | ColumnEvent::ColumnPinned { source, .. }
            | ColumnEvent::ColumnVisible { source, .. }
            | ColumnEvent::ColumnRowGroupChanged { source, .. }
            | ColumnEvent::ColumnPivotChanged { source, .. }
            | ColumnEvent::ColumnValueChanged { source, .. }
            | ColumnEvent::SortChanged { source, .. }
            | ColumnEvent::ColumnResized { source, .. } => Some(*source),
            _ => None,
        }
    }
}

/// The per-grid event bus for column events.
#[derive(Default)]
pub struct EventService {
    signal: Signal<ColumnEvent>,
}

impl EventService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; it runs synchronously for every event.
    pub fn subscribe<F>(&self, listener: F) -> ConnectionId
    where
        F: Fn(&ColumnEvent) + Send + Sync + 'static,
    {
        self.signal.connect(listener)
    }

    pub fn unsubscribe(&self, id: ConnectionId) -> bool {
        self.signal.disconnect(id)
    }

    pub fn listener_count(&self) -> usize {
        self.signal.connection_count()
    }

    pub fn dispatch(&self, event: ColumnEvent) {
        tracing::trace!(target: targets::COLUMN_EVENTS, kind = ?event.kind(), "dispatching column event");
        self.signal.emit(event);
    }
}

/// The value every item shares, or `None` if they differ or there are none.
pub(crate) fn common_value<T, V, F>(items: &[T], value_of: F) -> Option<V>
where
    V: PartialEq,
    F: Fn(&T) -> V,
{
    let mut values = items.iter().map(value_of);
    let first = values.next()?;
    values.all(|v| v == first).then_some(first)
}

/// Builds column events from model changes and sends them.
#[derive(Clone)]
pub struct ColumnEventDispatcher {
    events: Arc<EventService>,
}

impl ColumnEventDispatcher {
    pub fn new(events: Arc<EventService>) -> Self {
        Self { events }
    }

    pub fn grid_columns(&self) {
        self.events.dispatch(ColumnEvent::GridColumnsChanged);
    }

    pub fn displayed_columns(&self, source: ColumnEventSource) {
        self.events
            .dispatch(ColumnEvent::DisplayedColumnsChanged { source });
    }

    pub fn new_columns_loaded(&self, source: ColumnEventSource) {
        self.events.dispatch(ColumnEvent::NewColumnsLoaded { source });
    }

    pub fn everything_changed(&self, source: ColumnEventSource) {
        self.events.dispatch(ColumnEvent::EverythingChanged { source });
    }

    pub fn pivot_mode_changed(&self) {
        self.events.dispatch(ColumnEvent::PivotModeChanged);
    }

    pub fn virtual_columns_changed(&self, after_scroll: bool) {
        self.events
            .dispatch(ColumnEvent::VirtualColumnsChanged { after_scroll });
    }

    pub fn header_height_changed(&self, column: Arc<Column>) {
        self.events
            .dispatch(ColumnEvent::HeaderHeightChanged { column });
    }

    pub fn group_opened(&self, groups: Vec<Arc<ProvidedColumnGroup>>) {
        if groups.is_empty() {
            return;
        }
        self.events.dispatch(ColumnEvent::ColumnGroupOpened { groups });
    }

    pub fn column_moved(
        &self,
        columns: Vec<Arc<Column>>,
        to_index: Option<usize>,
        finished: bool,
        source: ColumnEventSource,
    ) {
        self.events.dispatch(ColumnEvent::ColumnMoved {
            columns,
            to_index,
            finished,
            source,
        });
    }

    pub fn column_pinned(&self, columns: Vec<Arc<Column>>, source: ColumnEventSource) {
        if columns.is_empty() {
            return;
        }
        let pinned = common_value(&columns, |c| c.pinned());
        self.events.dispatch(ColumnEvent::ColumnPinned {
            columns,
            pinned,
            source,
        });
    }

    pub fn column_visible(&self, columns: Vec<Arc<Column>>, source: ColumnEventSource) {
        if columns.is_empty() {
            return;
        }
        let visible = common_value(&columns, |c| c.is_visible());
        self.events.dispatch(ColumnEvent::ColumnVisible {
            columns,
            visible,
            source,
        });
    }

    pub fn row_group_changed(&self, columns: Vec<Arc<Column>>, source: ColumnEventSource) {
        self.events
            .dispatch(ColumnEvent::ColumnRowGroupChanged { columns, source });
    }

    pub fn pivot_changed(&self, columns: Vec<Arc<Column>>, source: ColumnEventSource) {
        self.events
            .dispatch(ColumnEvent::ColumnPivotChanged { columns, source });
    }

    pub fn value_changed(&self, columns: Vec<Arc<Column>>, source: ColumnEventSource) {
        self.events
            .dispatch(ColumnEvent::ColumnValueChanged { columns, source });
    }

    pub fn sort_changed(&self, columns: Vec<Arc<Column>>, source: ColumnEventSource) {
        self.events.dispatch(ColumnEvent::SortChanged { columns, source });
    }

    pub fn column_resized(
        &self,
        columns: Vec<Arc<Column>>,
        flex_columns: Vec<Arc<Column>>,
        finished: bool,
        source: ColumnEventSource,
    ) {
        if columns.is_empty() && flex_columns.is_empty() {
            return;
        }
        self.events.dispatch(ColumnEvent::ColumnResized {
            columns,
            flex_columns,
            finished,
            source,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_common_value() {
        assert_eq!(common_value(&[1, 1, 1], |v| *v), Some(1));
        assert_eq!(common_value(&[1, 2], |v| *v), None);
        assert_eq!(common_value::<i32, i32, _>(&[], |v| *v), None);
    }

    #[test]
    fn test_dispatch_reaches_listeners_in_order() {
        let events = Arc::new(EventService::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = seen.clone();
        events.subscribe(move |e| first.lock().push((1, e.kind())));
        let second = seen.clone();
        let id = events.subscribe(move |e| second.lock().push((2, e.kind())));

        let dispatcher = ColumnEventDispatcher::new(events.clone());
        dispatcher.grid_columns();
        assert!(events.unsubscribe(id));
        dispatcher.pivot_mode_changed();

        assert_eq!(
            *seen.lock(),
            vec![
                (1, ColumnEventKind::GridColumnsChanged),
                (2, ColumnEventKind::GridColumnsChanged),
                (1, ColumnEventKind::PivotModeChanged),
            ]
        );
    }

    #[test]
    fn test_empty_batches_are_not_sent() {
        let events = Arc::new(EventService::new());
        let count = Arc::new(Mutex::new(0));
        let sink = count.clone();
        events.subscribe(move |_| *sink.lock() += 1);

        let dispatcher = ColumnEventDispatcher::new(events);
        dispatcher.column_pinned(Vec::new(), ColumnEventSource::Api);
        dispatcher.column_visible(Vec::new(), ColumnEventSource::Api);
        dispatcher.column_resized(Vec::new(), Vec::new(), true, ColumnEventSource::Api);
        dispatcher.group_opened(Vec::new());

        assert_eq!(*count.lock(), 0);
    }
}
