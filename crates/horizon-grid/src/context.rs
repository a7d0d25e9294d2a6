//! The per-grid context.
//!
//! A [`GridContext`] is the service container of one grid instance: the bean
//! registry that tracks every column and group entity, the live options, the
//! event bus, the warning log and the value cache. It is created once per
//! grid and shared by reference; nothing in this crate is process-wide.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use horizon_grid_core::{BeanRegistry, WarningLog};

use crate::error::ColumnWarning;
use crate::events::EventService;
use crate::options::{GridOptions, GridOptionsService};
use crate::value_cache::ValueCache;

static GRID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Services shared by everything belonging to one grid.
pub struct GridContext {
    grid_id: String,
    beans: BeanRegistry,
    options: GridOptionsService,
    events: Arc<EventService>,
    warnings: WarningLog<ColumnWarning>,
    value_cache: ValueCache,
    change_events_dispatching: AtomicBool,
}

impl GridContext {
    /// Create the context for a new grid.
    pub fn new(options: GridOptions) -> Arc<Self> {
        let grid_id = format!("grid-{}", GRID_COUNTER.fetch_add(1, Ordering::Relaxed));
        Self::with_grid_id(grid_id, options)
    }

    /// Create the context for a grid with a host-chosen id.
    pub fn with_grid_id(grid_id: impl Into<String>, options: GridOptions) -> Arc<Self> {
        Arc::new(Self {
            grid_id: grid_id.into(),
            beans: BeanRegistry::new(),
            options: GridOptionsService::new(options),
            events: Arc::new(EventService::new()),
            warnings: WarningLog::new(),
            value_cache: ValueCache::new(),
            change_events_dispatching: AtomicBool::new(false),
        })
    }

    pub fn grid_id(&self) -> &str {
        &self.grid_id
    }

    pub fn beans(&self) -> &BeanRegistry {
        &self.beans
    }

    pub fn options(&self) -> &GridOptionsService {
        &self.options
    }

    pub fn events(&self) -> &Arc<EventService> {
        &self.events
    }

    pub fn warnings(&self) -> &WarningLog<ColumnWarning> {
        &self.warnings
    }

    pub fn value_cache(&self) -> &ValueCache {
        &self.value_cache
    }

    /// Whether the model is in the middle of sending the diff events of one
    /// coordinated reload.
    ///
    /// Row models check this to skip recomputing once per diff event.
    pub fn is_change_events_dispatching(&self) -> bool {
        self.change_events_dispatching.load(Ordering::SeqCst)
    }

    pub(crate) fn set_change_events_dispatching(&self, dispatching: bool) {
        self.change_events_dispatching
            .store(dispatching, Ordering::SeqCst);
    }
}

static_assertions::assert_impl_all!(GridContext: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_ids_are_distinct() {
        let a = GridContext::new(GridOptions::default());
        let b = GridContext::new(GridOptions::default());
        assert_ne!(a.grid_id(), b.grid_id());
        assert!(a.beans().is_empty());
        assert!(!a.is_change_events_dispatching());
    }
}
