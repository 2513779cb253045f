mod event;
mod sink;

use std::sync::Arc;

pub use event::*;
pub use sink::*;

/// Identifier of one task within a batch.
pub type TaskId = u64;

/// Shared handle to an event sink.
pub type EventSinkHandle = Arc<dyn EventSink>;
