//! Logging and debugging facilities for Horizon Grid.
//!
//! This module provides:
//! - Target names for filtering `tracing` output by subsystem
//! - [`WarningLog`], the per-grid record of configuration warnings
//! - Tree formatting options shared by the debug tree printers
//! - [`PerfSpan`] for timing coarse operations
//!
//! # Tracing Integration
//!
//! Horizon Grid uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt::init();
//! ```
//!
//! # Warnings
//!
//! Configuration problems never abort a grid operation. They are pushed
//! into a [`WarningLog`], which logs them at `warn` level and keeps them for
//! the host application to inspect.

use std::collections::HashSet;
use std::fmt;

use parking_lot::Mutex;

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "horizon_grid_core";
    /// Signal system target.
    pub const SIGNAL: &str = "horizon_grid_core::signal";
    /// Bean registry target.
    pub const BEAN: &str = "horizon_grid_core::bean";
    /// Configuration warnings target.
    pub const WARNING: &str = "horizon_grid::warning";
    /// Column model orchestration target.
    pub const COLUMN_MODEL: &str = "horizon_grid::columns::model";
    /// Column tree factory target.
    pub const COLUMN_FACTORY: &str = "horizon_grid::columns::factory";
    /// Column event dispatch target.
    pub const COLUMN_EVENTS: &str = "horizon_grid::events";
    /// Column sizing target.
    pub const COLUMN_SIZE: &str = "horizon_grid::columns::size";
}

/// Per-grid record of configuration warnings.
///
/// Every warning is logged through `tracing::warn!`. Warnings raised with
/// [`warn_once`](Self::warn_once) are recorded only the first time their
/// message is seen by this log.
pub struct WarningLog<W> {
    entries: Mutex<Vec<W>>,
    seen_once: Mutex<HashSet<String>>,
}

impl<W> Default for WarningLog<W> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            seen_once: Mutex::new(HashSet::new()),
        }
    }
}

impl<W: fmt::Display + Clone> WarningLog<W> {
    /// Create an empty warning log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and log a warning.
    pub fn warn(&self, warning: W) {
        tracing::warn!(target: targets::WARNING, "{}", warning);
        self.entries.lock().push(warning);
    }

    /// Record and log a warning unless the same message was already
    /// recorded through this method.
    ///
    /// Returns `true` if the warning was recorded.
    pub fn warn_once(&self, warning: W) -> bool {
        if !self.seen_once.lock().insert(warning.to_string()) {
            return false;
        }
        self.warn(warning);
        true
    }

    /// All warnings recorded so far, oldest first.
    pub fn entries(&self) -> Vec<W> {
        self.entries.lock().clone()
    }

    /// Number of warnings recorded so far.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether no warning has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Forget recorded warnings. Warn-once de-duplication is kept.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// Glyphs used to draw tree branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    Ascii,
    #[default]
    Unicode,
}

impl TreeStyle {
    /// (continuation, branch, last branch)
    fn glyphs(self) -> (&'static str, &'static str, &'static str) {
        match self {
            TreeStyle::Ascii => ("|", "|--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
        }
    }
}

/// What the column tree printer shows for each node.
#[derive(Debug, Clone, Default)]
pub struct TreeFormatOptions {
    pub style: TreeStyle,
    /// Append the node's bean id.
    pub bean_ids: bool,
    /// Hide the `(column)` / `(group)` / `(padding)` suffix.
    pub hide_kinds: bool,
    /// Deepest level printed; the roots are level 0.
    pub max_depth: Option<usize>,
}

impl TreeFormatOptions {
    /// Ids and kinds, for tracking down a specific bean.
    pub fn with_bean_ids() -> Self {
        Self { bean_ids: true, ..Self::default() }
    }

    /// Column and group ids only.
    pub fn ids_only() -> Self {
        Self { hide_kinds: true, ..Self::default() }
    }

    /// Leading text for a node at `depth`.
    pub fn prefix(&self, depth: usize, is_last: bool) -> String {
        let Some(outer) = depth.checked_sub(1) else {
            return String::new();
        };
        let (guide, branch, last) = self.style.glyphs();
        let mut prefix = format!("{guide}  ").repeat(outer);
        prefix.push_str(if is_last { last } else { branch });
        prefix.push(' ');
        prefix
    }

    /// Whether nodes at `depth` are printed at all.
    pub fn includes(&self, depth: usize) -> bool {
        self.max_depth.is_none_or(|max| depth <= max)
    }
}

/// A guard that keeps a tracing span entered until dropped.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: "horizon_grid::perf", "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn_once_deduplicates() {
        let log = WarningLog::<String>::new();
        assert!(log.warn_once("pivot not allowed".to_string()));
        assert!(!log.warn_once("pivot not allowed".to_string()));
        log.warn("pivot not allowed".to_string());
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_clear_keeps_once_state() {
        let log = WarningLog::<String>::new();
        log.warn_once("a".to_string());
        log.clear();
        assert!(log.is_empty());
        assert!(!log.warn_once("a".to_string()));
    }

    #[test]
    fn test_prefix_styles() {
        let unicode = TreeFormatOptions::default();
        assert_eq!(unicode.prefix(0, true), "");
        assert_eq!(unicode.prefix(1, true), "\u{2514}\u{2500}\u{2500} ");

        let ascii = TreeFormatOptions { style: TreeStyle::Ascii, ..Default::default() };
        assert_eq!(ascii.prefix(2, false), "|  |-- ");
        assert_eq!(ascii.prefix(3, true), "|  |  `-- ");
    }

    #[test]
    fn test_depth_limit() {
        let options = TreeFormatOptions { max_depth: Some(1), ..TreeFormatOptions::ids_only() };
        assert!(options.includes(1));
        assert!(!options.includes(2));
        assert!(TreeFormatOptions::with_bean_ids().includes(usize::MAX));
    }

    #[test]
    fn test_perf_span_guard_can_be_held() {
        let span = PerfSpan::new("ColumnModel::refresh_cols");
        drop(span);
    }
}
