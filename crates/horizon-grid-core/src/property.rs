//! Shared, change-detecting value cells.
//!
//! A column is referenced from the column tree, the ordered lists, the id
//! lookup and any event that mentions it, so its live state (width, pinning,
//! visibility, sort) cannot be mutated through `&mut`. Each such field is a
//! [`Property`] instead. [`Property::set`] reports whether the value moved,
//! which is what decides whether a column event is due.
//!
//! ```
//! use horizon_grid_core::Property;
//!
//! let hidden = Property::new(false);
//! assert!(!hidden.set(false));
//! assert!(hidden.set(true));
//! assert!(hidden.get());
//! ```

use std::fmt;

use parking_lot::RwLock;

/// Interior-mutable value that knows when a write is a no-op.
pub struct Property<T> {
    cell: RwLock<T>,
}

impl<T> Property<T> {
    pub fn new(value: T) -> Self {
        Self { cell: RwLock::new(value) }
    }

    /// Borrow the value for the duration of `read`.
    pub fn with<R>(&self, read: impl FnOnce(&T) -> R) -> R {
        read(&self.cell.read())
    }
}

impl<T: Clone> Property<T> {
    pub fn get(&self) -> T {
        self.with(T::clone)
    }
}

impl<T: PartialEq> Property<T> {
    /// Store `value`; `false` means it was already the current value.
    pub fn set(&self, value: T) -> bool {
        self.replace(value).is_some()
    }

    /// Store `value` and hand back what it displaced, or `None` when
    /// nothing changed.
    pub fn replace(&self, value: T) -> Option<T> {
        let mut cell = self.cell.write();
        (*cell != value).then(|| std::mem::replace(&mut *cell, value))
    }
}

impl<T: Clone> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self::new(self.get())
    }
}

impl<T: Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with(|value| f.debug_tuple("Property").field(value).finish())
    }
}

static_assertions::assert_impl_all!(Property<Option<String>>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_reports_only_real_changes() {
        let width = Property::new(200.0_f32);
        assert!(!width.set(200.0));
        assert!(width.set(120.0));
        assert_eq!(width.get(), 120.0);
    }

    #[test]
    fn test_replace_returns_displaced_value() {
        let agg_func = Property::new(Some("sum".to_string()));
        assert_eq!(agg_func.replace(Some("sum".into())), None);
        assert_eq!(agg_func.replace(None), Some(Some("sum".to_string())));
        assert!(agg_func.with(Option::is_none));
    }

    #[test]
    fn test_clone_is_independent() {
        let original = Property::new(3_usize);
        let copy = original.clone();
        copy.set(4);
        assert_eq!(original.get(), 3);
        assert_eq!(format!("{copy:?}"), "Property(4)");
    }
}
