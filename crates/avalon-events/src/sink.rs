use std::sync::{
    mpsc::{self, Receiver, Sender},
    Mutex,
};

use crate::AvalonEvent;

/// Trait for consuming events.
///
/// Each frontend provides its own implementation.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: AvalonEvent);
}

/// Channel-based event sink.
///
/// The receiver end can be drained by any consumer on its own thread.
pub struct ChannelSink {
    sender: Sender<AvalonEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, Receiver<AvalonEvent>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                sender,
            },
            receiver,
        )
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: AvalonEvent) {
        let _ = self.sender.send(event);
    }
}

/// No-op event sink for headless operation.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: AvalonEvent) {}
}

/// Stores every event for later inspection.
#[derive(Default)]
pub struct CollectorSink {
    events: Mutex<Vec<AvalonEvent>>,
}

impl CollectorSink {
    pub fn events(&self) -> Vec<AvalonEvent> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<AvalonEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl EventSink for CollectorSink {
    fn emit(&self, event: AvalonEvent) {
        self.lock().push(event);
    }
}
