use std::sync::Arc;

use tokio::sync::watch;

/// A `(completed, total)` pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sample {
    pub completed: u64,
    pub total: u64,
}

impl Sample {
    /// A task row is shown only while its work is known and unfinished.
    pub fn is_active(&self) -> bool {
        self.completed < self.total
    }
}

/// Write side of one task's progress record. Owned by the worker running the task.
#[derive(Debug, Clone)]
pub struct ProgressHandle {
    sender: Arc<watch::Sender<Sample>>,
}

/// Read side of one task's progress record, polled by the orchestrator.
#[derive(Debug, Clone)]
pub struct ProgressReader {
    receiver: watch::Receiver<Sample>,
}

/// Creates the progress record for one task.
pub fn channel() -> (ProgressHandle, ProgressReader) {
    let (sender, receiver) = watch::channel(Sample::default());
    (
        ProgressHandle {
            sender: Arc::new(sender),
        },
        ProgressReader {
            receiver,
        },
    )
}

impl ProgressHandle {
    /// A handle whose samples go nowhere.
    pub fn detached() -> Self {
        channel().0
    }

    pub fn set(&self, completed: u64, total: u64) {
        self.sender.send_replace(Sample {
            completed,
            total,
        });
    }

    pub fn get(&self) -> Sample {
        *self.sender.borrow()
    }
}

impl ProgressReader {
    pub fn latest(&self) -> Sample {
        *self.receiver.borrow()
    }
}
