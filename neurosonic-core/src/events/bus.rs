//! Synchronous typed pub/sub for detected events.

use super::{Event, EventType};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Callback invoked for each delivered event.
pub type EventHandler = Box<dyn FnMut(&Event) + Send>;

/// Synchronous event dispatcher.
///
/// `publish` invokes every handler registered for the event's type,
/// then every wildcard handler, in registration order, and returns only
/// after all of them have run. A panicking handler is isolated so the
/// remaining handlers still see the event.
///
/// Handlers must not publish back into the bus during dispatch; an
/// event produced inside a handler belongs to the next control tick.
#[derive(Default)]
pub struct EventBus {
    typed: HashMap<EventType, Vec<EventHandler>>,
    wildcard: Vec<EventHandler>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one event type.
    pub fn subscribe<F>(&mut self, event_type: EventType, handler: F)
    where
        F: FnMut(&Event) + Send + 'static,
    {
        self.typed
            .entry(event_type)
            .or_default()
            .push(Box::new(handler));
    }

    /// Register a handler for every event type.
    pub fn subscribe_all<F>(&mut self, handler: F)
    where
        F: FnMut(&Event) + Send + 'static,
    {
        self.wildcard.push(Box::new(handler));
    }

    /// Dispatch an event to matching handlers, isolating each one.
    pub fn publish(&mut self, event: &Event) {
        if let Some(handlers) = self.typed.get_mut(&event.event_type) {
            for handler in handlers.iter_mut() {
                dispatch(handler, event);
            }
        }
        for handler in self.wildcard.iter_mut() {
            dispatch(handler, event);
        }
    }
}

fn dispatch(handler: &mut EventHandler, event: &Event) {
    if catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
        log::error!("event handler panicked on {event}; continuing with remaining handlers");
    }
}
