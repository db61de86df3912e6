//! Typed publish/subscribe used by every game object.
//!
//! Handlers run synchronously on the dispatching thread, in subscription order.
//! The handler list is captured before the first call, so a handler that
//! unsubscribes itself (or another handler) only affects later dispatches.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Name of an event a handler can subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    KeyDown,
}

/// An event together with its payload.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Click,
    KeyDown { key: String },
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::Click => EventKind::Click,
            GameEvent::KeyDown { .. } => EventKind::KeyDown,
        }
    }

    pub fn key_down(key: impl Into<String>) -> Self {
        GameEvent::KeyDown { key: key.into() }
    }
}

type Handler = Rc<RefCell<dyn FnMut(&GameEvent)>>;

struct Slot {
    id: u64,
    kind: EventKind,
    handler: Handler,
}

#[derive(Default)]
struct Handlers {
    next_id: u64,
    slots: Vec<Slot>,
}

/// Per-object event hub.
#[derive(Default)]
pub struct EventEmitter {
    handlers: Rc<RefCell<Handlers>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `handler` to events of `kind`.
    pub fn on<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: FnMut(&GameEvent) + 'static,
    {
        let mut handlers = self.handlers.borrow_mut();
        let id = handlers.next_id;
        handlers.next_id += 1;
        handlers.slots.push(Slot {
            id,
            kind,
            handler: Rc::new(RefCell::new(handler)),
        });

        Subscription {
            id,
            handlers: Rc::downgrade(&self.handlers),
        }
    }

    /// Invoke every handler currently subscribed to the event's kind.
    pub fn dispatch(&self, event: &GameEvent) {
        let kind = event.kind();
        let snapshot: Vec<Handler> = self
            .handlers
            .borrow()
            .slots
            .iter()
            .filter(|slot| slot.kind == kind)
            .map(|slot| Rc::clone(&slot.handler))
            .collect();

        for handler in snapshot {
            match handler.try_borrow_mut() {
                Ok(mut handler) => (&mut *handler)(event),
                Err(_) => {
                    log::warn!("skipping re-entrant {kind:?} handler");
                }
            }
        }
    }

    /// Number of handlers subscribed to `kind`.
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers
            .borrow()
            .slots
            .iter()
            .filter(|slot| slot.kind == kind)
            .count()
    }
}

/// Returned by [`EventEmitter::on`]; removes exactly that handler.
#[derive(Clone, Debug)]
pub struct Subscription {
    id: u64,
    handlers: Weak<RefCell<Handlers>>,
}

impl Subscription {
    /// Remove the handler. Calling this again, or after the emitter is gone, does nothing.
    pub fn unsubscribe(&self) {
        if let Some(handlers) = self.handlers.upgrade() {
            handlers.borrow_mut().slots.retain(|slot| slot.id != self.id);
        }
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("handlers", &self.handlers.borrow().slots.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn test_dispatch_runs_handlers_in_order() {
        let emitter = EventEmitter::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for tag in ["a", "b", "c"] {
            let log = Rc::clone(&log);
            emitter.on(EventKind::Click, move |_| log.borrow_mut().push(tag));
        }
        emitter.dispatch(&GameEvent::Click);

        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_dispatch_filters_by_kind() {
        let emitter = EventEmitter::new();
        let clicks = Rc::new(Cell::new(0));
        let keys = Rc::new(RefCell::new(Vec::new()));

        {
            let clicks = Rc::clone(&clicks);
            emitter.on(EventKind::Click, move |_| clicks.set(clicks.get() + 1));
        }
        {
            let keys = Rc::clone(&keys);
            emitter.on(EventKind::KeyDown, move |event| {
                if let GameEvent::KeyDown { key } = event {
                    keys.borrow_mut().push(key.clone());
                }
            });
        }

        emitter.dispatch(&GameEvent::key_down("s"));
        assert_eq!(clicks.get(), 0);
        assert_eq!(*keys.borrow(), vec!["s".to_string()]);
    }

    #[test]
    fn test_dispatch_without_subscribers_is_noop() {
        let emitter = EventEmitter::new();
        emitter.dispatch(&GameEvent::Click);
        assert_eq!(emitter.handler_count(EventKind::Click), 0);
    }

    #[test]
    fn test_unsubscribe_is_idempotent_and_targeted() {
        let emitter = EventEmitter::new();
        let hits = Rc::new(Cell::new(0));

        let first = {
            let hits = Rc::clone(&hits);
            emitter.on(EventKind::Click, move |_| hits.set(hits.get() + 1))
        };
        {
            let hits = Rc::clone(&hits);
            emitter.on(EventKind::Click, move |_| hits.set(hits.get() + 10));
        }

        first.unsubscribe();
        first.unsubscribe();
        emitter.dispatch(&GameEvent::Click);

        assert_eq!(hits.get(), 10);
        assert_eq!(emitter.handler_count(EventKind::Click), 1);
    }

    #[test]
    fn test_unsubscribe_during_dispatch_keeps_inflight_list() {
        let emitter = EventEmitter::new();
        let calls = Rc::new(RefCell::new(Vec::new()));
        let second: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        {
            let calls = Rc::clone(&calls);
            let second = Rc::clone(&second);
            emitter.on(EventKind::Click, move |_| {
                calls.borrow_mut().push(1);
                if let Some(sub) = second.borrow().as_ref() {
                    sub.unsubscribe();
                }
            });
        }
        {
            let calls = Rc::clone(&calls);
            let sub = emitter.on(EventKind::Click, move |_| calls.borrow_mut().push(2));
            *second.borrow_mut() = Some(sub);
        }

        emitter.dispatch(&GameEvent::Click);
        assert_eq!(*calls.borrow(), vec![1, 2]);

        emitter.dispatch(&GameEvent::Click);
        assert_eq!(*calls.borrow(), vec![1, 2, 1]);
    }

    #[test]
    fn test_subscribe_during_dispatch_waits_for_next_dispatch() {
        let emitter = Rc::new(EventEmitter::new());
        let late = Rc::new(Cell::new(0));

        {
            let weak = Rc::downgrade(&emitter);
            let late = Rc::clone(&late);
            let subscribed = Cell::new(false);
            emitter.on(EventKind::Click, move |_| {
                if subscribed.replace(true) {
                    return;
                }
                if let Some(emitter) = weak.upgrade() {
                    let late = Rc::clone(&late);
                    emitter.on(EventKind::Click, move |_| late.set(late.get() + 1));
                }
            });
        }

        emitter.dispatch(&GameEvent::Click);
        assert_eq!(late.get(), 0);
        assert_eq!(emitter.handler_count(EventKind::Click), 2);

        emitter.dispatch(&GameEvent::Click);
        assert_eq!(late.get(), 1);
    }

    #[test]
    fn test_reentrant_dispatch_skips_running_handler() {
        let emitter = Rc::new(EventEmitter::new());
        let outer = Rc::new(Cell::new(0));
        let other = Rc::new(Cell::new(0));

        {
            let weak = Rc::downgrade(&emitter);
            let outer = Rc::clone(&outer);
            emitter.on(EventKind::Click, move |event| {
                outer.set(outer.get() + 1);
                if let Some(emitter) = weak.upgrade() {
                    emitter.dispatch(event);
                }
            });
        }
        {
            let other = Rc::clone(&other);
            emitter.on(EventKind::Click, move |_| other.set(other.get() + 1));
        }

        emitter.dispatch(&GameEvent::Click);

        // The nested dispatch skips the running handler but reaches the other one.
        assert_eq!(outer.get(), 1);
        assert_eq!(other.get(), 2);
    }

    #[test]
    fn test_unsubscribe_after_emitter_dropped() {
        let emitter = EventEmitter::new();
        let sub = emitter.on(EventKind::Click, |_| {});
        drop(emitter);
        sub.unsubscribe();
    }
}
