// SPDX-License-Identifier: MIT OR Apache-2.0
//! Player lifecycle events and the listener list that receives them.

use crate::clock::PlayDirection;
use crate::error::ListenerError;

/// Lifecycle event emitted by the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerEvent {
    /// A playback sequence started
    StartPlaying {
        /// Direction of the first pass
        direction: PlayDirection,
    },
    /// A playback sequence finished
    CompletePlaying,
    /// A loop pass started
    StartLoop {
        /// Zero-based pass index
        loop_index: u32,
        /// Direction of the pass
        direction: PlayDirection,
    },
    /// A loop pass finished
    CompleteLoop {
        /// Zero-based pass index
        loop_index: u32,
    },
    /// Playback paused
    Paused,
    /// Playback resumed
    Resumed,
    /// Playback stopped explicitly
    Stopped,
    /// Preview mode entered
    PreviewStarted,
    /// Preview mode left
    PreviewStopped,
    /// Elapsed time changed through the setter
    ElapsedTimeChanged {
        /// New elapsed time
        time: f32,
    },
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&PlayerEvent) -> Result<(), ListenerError>>;

/// Ordered listener list.
///
/// Listeners run in registration order. A failing listener is logged and
/// does not prevent delivery to the others.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u64,
}

impl EventBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&PlayerEvent) -> Result<(), ListenerError> + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// No listeners registered
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver an event to every listener
    pub fn dispatch(&mut self, event: &PlayerEvent) {
        for (id, listener) in &mut self.listeners {
            if let Err(e) = listener(event) {
                tracing::warn!("Listener {:?} failed on {:?}: {}", id, event, e);
            }
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_dispatch_order_and_isolation() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();

        let first = Rc::clone(&log);
        bus.subscribe(move |_| {
            first.borrow_mut().push("first");
            Ok(())
        });
        bus.subscribe(|_| Err(ListenerError::new("boom")));
        let third = Rc::clone(&log);
        bus.subscribe(move |_| {
            third.borrow_mut().push("third");
            Ok(())
        });

        bus.dispatch(&PlayerEvent::Paused);
        assert_eq!(*log.borrow(), vec!["first", "third"]);
    }

    #[test]
    fn test_unsubscribe() {
        let count = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let counter = Rc::clone(&count);
        let id = bus.subscribe(move |_| {
            *counter.borrow_mut() += 1;
            Ok(())
        });

        bus.dispatch(&PlayerEvent::Resumed);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.dispatch(&PlayerEvent::Resumed);
        assert_eq!(*count.borrow(), 1);
        assert!(bus.is_empty());
    }
}
