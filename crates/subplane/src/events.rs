//! Synchronous in-process event bus for import life-cycle events.
//!
//! Every materialization pass started by an expand fires three events in
//! order: [`EventKind::RenderStart`], [`EventKind::RenderComplete`] and
//! [`EventKind::Done`]. The latter two carry the [`ImportReport`] of the pass
//! so observers can surface warnings without knowing about commands.

use std::fmt;

use log::trace;

use subplane_core::identifier::Id;

use crate::import::ImportReport;

/// Default listener priority.
pub const DEFAULT_PRIORITY: i32 = 1000;

/// The life-cycle events of a sub-process import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    RenderStart,
    RenderComplete,
    Done,
}

impl EventKind {
    /// Returns the public event name.
    pub fn name(self) -> &'static str {
        match self {
            Self::RenderStart => "subplane.import.render.start",
            Self::RenderComplete => "subplane.import.render.complete",
            Self::Done => "subplane.import.done",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An event together with its payload.
#[derive(Debug, Clone, Copy)]
pub enum ImportEvent<'a> {
    RenderStart { sub_process: Id },
    RenderComplete(&'a ImportReport),
    Done(&'a ImportReport),
}

impl ImportEvent<'_> {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::RenderStart { .. } => EventKind::RenderStart,
            Self::RenderComplete(_) => EventKind::RenderComplete,
            Self::Done(_) => EventKind::Done,
        }
    }

    /// Returns the sub-process being imported.
    pub fn sub_process(&self) -> Id {
        match self {
            Self::RenderStart { sub_process } => *sub_process,
            Self::RenderComplete(report) | Self::Done(report) => report.sub_process(),
        }
    }

    /// Returns the report, which is absent on [`ImportEvent::RenderStart`].
    pub fn report(&self) -> Option<&ImportReport> {
        match self {
            Self::RenderStart { .. } => None,
            Self::RenderComplete(report) | Self::Done(report) => Some(report),
        }
    }
}

/// Handle returned by [`EventBus::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

type Callback = Box<dyn FnMut(&ImportEvent<'_>)>;

struct Listener {
    id: ListenerId,
    kinds: Vec<EventKind>,
    priority: i32,
    callback: Callback,
}

/// Dispatches [`ImportEvent`]s to registered listeners.
///
/// Listeners with a higher priority run first; equal priorities run in
/// registration order.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
    next_id: usize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `callback` to `kinds`.
    pub fn on<F>(&mut self, kinds: &[EventKind], priority: i32, callback: F) -> ListenerId
    where
        F: FnMut(&ImportEvent<'_>) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;

        let position = self
            .listeners
            .iter()
            .position(|listener| listener.priority < priority)
            .unwrap_or(self.listeners.len());
        self.listeners.insert(
            position,
            Listener {
                id,
                kinds: kinds.to_vec(),
                priority,
                callback: Box::new(callback),
            },
        );
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|listener| listener.id != id);
        self.listeners.len() != before
    }

    /// Delivers `event` to every listener subscribed to its kind.
    pub fn fire(&mut self, event: &ImportEvent<'_>) {
        let kind = event.kind();
        trace!(event:% = kind, sub_process:% = event.sub_process(); "Firing event");

        for listener in &mut self.listeners {
            if listener.kinds.contains(&kind) {
                (listener.callback)(event);
            }
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    #[test]
    fn test_fire_respects_kinds_and_priority() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let low = Rc::clone(&seen);
        bus.on(&[EventKind::RenderStart], 500, move |event| {
            low.borrow_mut().push(("low", event.kind()));
        });
        let high = Rc::clone(&seen);
        bus.on(&[EventKind::RenderStart, EventKind::Done], 2000, move |event| {
            high.borrow_mut().push(("high", event.kind()));
        });

        bus.fire(&ImportEvent::RenderStart {
            sub_process: Id::new("SubProcess_1"),
        });

        assert_eq!(
            *seen.borrow(),
            vec![("high", EventKind::RenderStart), ("low", EventKind::RenderStart)]
        );
    }

    #[test]
    fn test_off_unsubscribes() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));

        let counter = Rc::clone(&count);
        let id = bus.on(&[EventKind::RenderStart], DEFAULT_PRIORITY, move |_| {
            *counter.borrow_mut() += 1;
        });

        let event = ImportEvent::RenderStart {
            sub_process: Id::new("SubProcess_1"),
        };
        bus.fire(&event);
        assert!(bus.off(id));
        assert!(!bus.off(id));
        bus.fire(&event);

        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_event_names() {
        assert_eq!(EventKind::RenderStart.name(), "subplane.import.render.start");
        assert_eq!(EventKind::Done.to_string(), "subplane.import.done");
    }
}
