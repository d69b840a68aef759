use crossbeam_channel::{Receiver, Sender, unbounded};
use jsonflow_core::EdgeStyle;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // Document / graph
    GraphReplaced {
        node_count: usize,
        edge_count: usize,
        duration_ms: u64,
    },
    /// The last valid graph was dropped after invalid input.
    GraphCleared,
    /// Invalid input arrived; the last valid graph stays on screen.
    GraphRetained {
        node_count: usize,
    },
    ParseFailed {
        line: usize,
        column: usize,
        message: String,
    },
    InputRejected {
        size: usize,
        limit: usize,
    },
    EdgeStyleChanged {
        style: EdgeStyle,
    },

    // Search
    SearchQuery {
        query: String,
    },
    SearchComplete {
        query: String,
        result_count: usize,
    },
    SearchCleared,
}

#[derive(Clone)]
pub struct EventBus {
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    pub fn receiver(&self) -> Receiver<Event> {
        self.rx.clone()
    }

    pub fn publish(&self, event: Event) {
        // The bus owns a receiver, so the channel can never be disconnected.
        let _ = self.tx.send(event);
    }

    /// Dispatch all pending events to a listener.
    /// This is useful for processing events in the UI loop.
    pub fn dispatch_to<L: EventListener>(&self, listener: &mut L) {
        while let Ok(event) = self.rx.try_recv() {
            listener.handle_event(&event);
        }
    }

    /// Drain pending events without handling them.
    pub fn drain(&self) -> Vec<Event> {
        self.rx.try_iter().collect()
    }
}

/// Trait for components that respond to events.
/// Implement this to receive events from the EventBus.
pub trait EventListener {
    fn handle_event(&mut self, event: &Event);
}
