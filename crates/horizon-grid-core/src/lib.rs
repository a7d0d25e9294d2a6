//! Core systems for Horizon Grid.
//!
//! This crate provides the foundational pieces the column model is built on:
//!
//! - **Signal System**: Type-safe synchronous notifications ([`Signal`])
//! - **Property System**: Interior-mutable values with change detection ([`Property`])
//! - **Bean Registry**: Per-grid entity lifecycle tracking ([`BeanRegistry`])
//! - **Warnings**: Structured, non-fatal configuration warnings ([`WarningLog`])
//!
//! # Signal Example
//!
//! ```
//! use horizon_grid_core::Signal;
//!
//! let pinned_changed = Signal::<bool>::new();
//! let conn_id = pinned_changed.connect(|pinned| {
//!     println!("pinned: {}", pinned);
//! });
//! pinned_changed.emit(true);
//! pinned_changed.disconnect(conn_id);
//! ```
//!
//! # Property Example
//!
//! ```
//! use horizon_grid_core::{Property, Signal};
//!
//! struct Width {
//!     value: Property<f32>,
//!     changed: Signal<f32>,
//! }
//!
//! impl Width {
//!     fn set(&self, width: f32) {
//!         if self.value.set(width) {
//!             self.changed.emit(width);
//!         }
//!     }
//! }
//! ```

pub mod bean;
mod error;
pub mod logging;
pub mod property;
pub mod signal;

pub use bean::{Bean, BeanId, BeanRegistry};
pub use error::{BeanError, BeanResult, SignalError};
pub use logging::{PerfSpan, TreeFormatOptions, TreeStyle, WarningLog};
pub use property::Property;
pub use signal::{ConnectionId, Signal};
