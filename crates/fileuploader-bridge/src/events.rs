// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Event emitters: the channel native modules use to push events (such as
// `fileUploadProgress`) towards script code.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;
use tracing::{debug, trace};

use crate::traits::EventEmitter;

/// Callback registered for one event name.
pub type EventListener = dyn Fn(&Value) + Send + Sync;

/// Handle returned by [`DeviceEventEmitter::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Registration {
    id: ListenerId,
    event: String,
    listener: Arc<EventListener>,
}

/// Fan-out emitter: every event is delivered to the listeners registered
/// for its name, in registration order.
#[derive(Default)]
pub struct DeviceEventEmitter {
    next_id: AtomicU64,
    listeners: RwLock<Vec<Registration>>,
}

impl DeviceEventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `event`.
    pub fn add_listener<F>(&self, event: &str, listener: F) -> ListenerId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Registration {
                id,
                event: event.to_owned(),
                listener: Arc::new(listener),
            });
        debug!(event, id = id.0, "listener added");
        id
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|r| r.id != id);
        before != listeners.len()
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.event == event)
            .count()
    }
}

impl EventEmitter for DeviceEventEmitter {
    fn emit(&self, event: &str, body: Value) {
        // Snapshot so listeners may add or remove listeners while running.
        let targets: Vec<Arc<EventListener>> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.event == event)
            .map(|r| Arc::clone(&r.listener))
            .collect();

        trace!(event, listeners = targets.len(), "emitting event");
        for listener in targets {
            listener(&body);
        }
    }
}

/// Emitter that only logs. Used when no script side is attached.
pub struct LogEmitter;

impl EventEmitter for LogEmitter {
    fn emit(&self, event: &str, body: Value) {
        debug!(event, %body, "event emitted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[test]
    fn delivers_only_to_matching_event() {
        let emitter = DeviceEventEmitter::new();
        let got = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&got);
        emitter.add_listener("a", move |v| sink.lock().unwrap().push(("a", v.clone())));
        let sink = Arc::clone(&got);
        emitter.add_listener("b", move |v| sink.lock().unwrap().push(("b", v.clone())));

        emitter.emit("a", json!(1));
        emitter.emit("c", json!(2));

        assert_eq!(*got.lock().unwrap(), vec![("a", json!(1))]);
    }

    #[test]
    fn removed_listener_is_not_called() {
        let emitter = DeviceEventEmitter::new();
        let count = Arc::new(AtomicU64::new(0));

        let c = Arc::clone(&count);
        let id = emitter.add_listener("tick", move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        emitter.emit("tick", Value::Null);
        assert!(emitter.remove_listener(id));
        assert!(!emitter.remove_listener(id));
        emitter.emit("tick", Value::Null);

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(emitter.listener_count("tick"), 0);
    }

    #[test]
    fn listener_may_unregister_itself() {
        let emitter = Arc::new(DeviceEventEmitter::new());
        let slot: Arc<Mutex<Option<ListenerId>>> = Arc::new(Mutex::new(None));

        let e = Arc::clone(&emitter);
        let s = Arc::clone(&slot);
        let id = emitter.add_listener("once", move |_| {
            if let Some(id) = s.lock().unwrap().take() {
                e.remove_listener(id);
            }
        });
        *slot.lock().unwrap() = Some(id);

        emitter.emit("once", Value::Null);
        assert_eq!(emitter.listener_count("once"), 0);
    }
}
