//! Event subscribe/publish registry
//!
//! Owned by the cluster that created it; there is no process-wide
//! handler table. Handlers are keyed by event kind and invoked inline
//! on the cluster's event-pump task, so they should stay cheap.

use parking_lot::RwLock;
use ripcord_gateway::{Event, EventKind};
use std::collections::HashMap;
use std::sync::Arc;

type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

/// Registry of event handlers keyed by [`EventKind`]
#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<HashMap<EventKind, Vec<Handler>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a handler to one event kind
    pub fn on<F>(&self, kind: EventKind, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.handlers
            .write()
            .entry(kind)
            .or_default()
            .push(Arc::new(handler));
    }

    /// Invoke every handler subscribed to this event's kind
    ///
    /// The handler list is snapshotted before any handler runs, so a
    /// handler may call [`EventBus::on`] without deadlocking. Handlers
    /// added mid-emit are not invoked for the event being emitted.
    pub fn emit(&self, event: &Event) {
        let subscribed = self.handlers.read().get(&event.kind()).cloned();
        if let Some(subscribed) = subscribed {
            for handler in &subscribed {
                handler(event);
            }
        }
    }

    /// Number of handlers subscribed to a kind
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.read().get(&kind).map_or(0, Vec::len)
    }
}
