//! Synchronous notifications.
//!
//! A [`Signal`] carries one kind of value to every connected listener. The
//! column model uses a single `Signal<ColumnEvent>` per grid; anything that
//! needs to react to column changes (header rendering, row model refresh,
//! state persistence) connects to it.
//!
//! Listeners run on the emitting thread, in the order they were connected,
//! and all of them have run by the time [`Signal::emit`] returns. Emission
//! works on a copy of the listener table, so a listener can connect or
//! disconnect listeners; the change is seen by the next emission.
//!
//! ```
//! use horizon_grid_core::Signal;
//!
//! let displayed_count = Signal::<usize>::new();
//! let id = displayed_count.connect(|count| println!("{count} columns displayed"));
//! displayed_count.emit(3);
//! assert!(displayed_count.disconnect(id));
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::error::SignalError;
use crate::logging::targets;

new_key_type! {
    /// Handle for one connected listener, used to disconnect it.
    pub struct ConnectionId;
}

type Listener<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

struct ListenerTable<Args> {
    listeners: SlotMap<ConnectionId, Listener<Args>>,
    blocked: bool,
}

/// A broadcast point for values of type `Args`.
///
/// `Signal` is `Send + Sync`; listeners must be too.
pub struct Signal<Args> {
    table: Mutex<ListenerTable<Args>>,
}

impl<Args: 'static> Signal<Args> {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(ListenerTable {
                listeners: SlotMap::with_key(),
                blocked: false,
            }),
        }
    }

    /// Add a listener. It receives every value emitted from now on.
    pub fn connect<F>(&self, listener: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.table.lock().listeners.insert(Arc::new(listener))
    }

    /// Remove a listener. Returns `false` if `id` was not connected.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.table.lock().listeners.remove(id).is_some()
    }

    /// Like [`disconnect`](Self::disconnect), with an unknown id as an error.
    pub fn try_disconnect(&self, id: ConnectionId) -> Result<(), SignalError> {
        self.disconnect(id).then_some(()).ok_or(SignalError::InvalidConnection)
    }

    pub fn disconnect_all(&self) {
        self.table.lock().listeners.clear();
    }

    pub fn connection_count(&self) -> usize {
        self.table.lock().listeners.len()
    }

    /// While blocked, [`emit`](Self::emit) drops its value unseen.
    pub fn set_blocked(&self, blocked: bool) {
        self.table.lock().blocked = blocked;
    }

    pub fn is_blocked(&self) -> bool {
        self.table.lock().blocked
    }

    /// Hand `args` to every listener in connection order.
    pub fn emit(&self, args: Args) {
        let listeners: Vec<Listener<Args>> = {
            let table = self.table.lock();
            if table.blocked {
                tracing::trace!(target: targets::SIGNAL, "emit dropped, signal blocked");
                return;
            }
            table.listeners.values().cloned().collect()
        };
        tracing::trace!(target: targets::SIGNAL, listeners = listeners.len(), "emit");

        for listener in &listeners {
            listener(&args);
        }
    }
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

static_assertions::assert_impl_all!(Signal<Vec<String>>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    fn collector(signal: &Signal<&'static str>) -> (ConnectionId, Arc<Mutex<Vec<&'static str>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let id = signal.connect(move |v| sink.lock().push(*v));
        (id, seen)
    }

    #[test]
    fn test_every_listener_sees_every_value() {
        let signal = Signal::new();
        let (_, first) = collector(&signal);
        let (_, second) = collector(&signal);

        signal.emit("columnPinned");
        signal.emit("columnMoved");

        assert_eq!(*first.lock(), vec!["columnPinned", "columnMoved"]);
        assert_eq!(*second.lock(), *first.lock());
    }

    #[test]
    fn test_disconnected_listener_goes_quiet() {
        let signal = Signal::new();
        let (id, seen) = collector(&signal);

        signal.emit("columnVisible");
        assert!(signal.disconnect(id));
        signal.emit("columnResized");

        assert_eq!(*seen.lock(), vec!["columnVisible"]);
        assert!(!signal.disconnect(id));
        assert_eq!(signal.try_disconnect(id), Err(SignalError::InvalidConnection));
    }

    #[test]
    fn test_blocked_signal_drops_values() {
        let signal = Signal::new();
        let (_, seen) = collector(&signal);

        signal.set_blocked(true);
        assert!(signal.is_blocked());
        signal.emit("columnMoved");
        signal.set_blocked(false);
        signal.emit("columnPinned");

        assert_eq!(*seen.lock(), vec!["columnPinned"]);
    }

    #[test]
    fn test_listeners_run_in_connection_order() {
        let signal = Signal::<()>::new();
        let order = Arc::new(Mutex::new(String::new()));
        for tag in ['a', 'b', 'c'] {
            let order = order.clone();
            signal.connect(move |_| order.lock().push(tag));
        }

        signal.emit(());
        assert_eq!(order.lock().as_str(), "abc");
    }

    #[test]
    fn test_listener_can_disconnect_itself() {
        let signal = Arc::new(Signal::<u32>::new());
        let calls = Arc::new(Mutex::new(0));
        let own_id = Arc::new(Mutex::new(None));

        let (weak, counter, slot) = (Arc::downgrade(&signal), calls.clone(), own_id.clone());
        let id = signal.connect(move |_| {
            *counter.lock() += 1;
            if let (Some(signal), Some(id)) = (weak.upgrade(), *slot.lock()) {
                signal.disconnect(id);
            }
        });
        *own_id.lock() = Some(id);

        signal.emit(1);
        signal.emit(2);
        assert_eq!(*calls.lock(), 1);
        assert_eq!(signal.connection_count(), 0);
    }

    #[test]
    fn test_disconnect_all_clears_the_table() {
        let signal = Signal::<()>::new();
        for _ in 0..3 {
            signal.connect(|_| {});
        }
        signal.disconnect_all();
        assert_eq!(signal.connection_count(), 0);
    }
}
