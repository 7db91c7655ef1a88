//! Synchronous publish/subscribe bus connecting the 3D store to the surrounding UI.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use log::{debug, warn};

use crate::catalog::CatalogEntity;

/// Closed set of event names a handler can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    LoadingComplete,
    StoreEntered,
    ExitStore,
    SectionChange,
    EntityClick,
}

/// Event with its payload
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    LoadingComplete,
    StoreEntered,
    ExitStore,
    SectionChange { index: usize },
    EntityClick { entity: CatalogEntity },
}

impl StoreEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            StoreEvent::LoadingComplete => EventKind::LoadingComplete,
            StoreEvent::StoreEntered => EventKind::StoreEntered,
            StoreEvent::ExitStore => EventKind::ExitStore,
            StoreEvent::SectionChange { .. } => EventKind::SectionChange,
            StoreEvent::EntityClick { .. } => EventKind::EntityClick,
        }
    }
}

/// Token returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type Handler = Box<dyn FnMut(&StoreEvent) -> anyhow::Result<()>>;

#[derive(Default)]
pub struct EventChannel {
    next_id: u64,
    subscribers: HashMap<EventKind, Vec<(SubscriptionId, Handler)>>,
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent) -> anyhow::Result<()> + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers
            .entry(kind)
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    /// Returns false if the token was unknown (already removed or cleared)
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for handlers in self.subscribers.values_mut() {
            if let Some(pos) = handlers.iter().position(|(sub, _)| *sub == id) {
                handlers.remove(pos);
                return true;
            }
        }
        false
    }

    /// Deliver to every subscriber of the event's kind, in subscription order.
    /// A handler that errors or panics is logged and skipped. Returns the number of handlers
    /// that completed successfully.
    pub fn publish(&mut self, event: &StoreEvent) -> usize {
        let kind = event.kind();
        let Some(handlers) = self.subscribers.get_mut(&kind) else {
            debug!("{kind:?} published with no subscribers");
            return 0;
        };

        let mut delivered = 0;
        for (id, handler) in handlers.iter_mut() {
            match catch_unwind(AssertUnwindSafe(|| handler(event))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(err)) => warn!("{kind:?} handler {id:?} failed: {err:#}"),
                Err(_) => warn!("{kind:?} handler {id:?} panicked"),
            }
        }
        delivered
    }

    /// Remove subscriptions for one kind, or for every kind when `None`
    pub fn clear(&mut self, kind: Option<EventKind>) {
        match kind {
            Some(kind) => {
                self.subscribers.remove(&kind);
            }
            None => self.subscribers.clear(),
        }
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers.get(&kind).map_or(0, Vec::len)
    }
}
