use std::fmt;

use crate::TaskId;

/// All event types emitted by avalon operations.
#[derive(Debug, Clone)]
pub enum AvalonEvent {
    /// A stage is about to dispatch `total` tasks.
    BatchStarted { stage: Stage, total: u32 },
    /// Aggregate progress over every dispatched task.
    BatchProgress {
        completed: u32,
        total: u32,
        failed: u32,
    },
    /// A worker picked up the task.
    TaskStarted { task_id: TaskId, target: String },
    /// Latest `(completed, total)` sample of a running task.
    TaskProgress {
        task_id: TaskId,
        target: String,
        completed: u64,
        total: u64,
    },
    /// The task reached a terminal state.
    TaskFinished {
        task_id: TaskId,
        target: String,
        status: TaskStatus,
    },
    /// Result of comparing the installed and cached remote version.
    UpdateCheck {
        target: String,
        status: UpdateCheckStatus,
    },
}

/// One of the four operations run per target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Update,
    Install,
    Upgrade,
    Uninstall,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Update => "update",
            Stage::Install => "install",
            Stage::Upgrade => "upgrade",
            Stage::Uninstall => "uninstall",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Success,
    Failed(String),
    /// Never started because an earlier task failed.
    Canceled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateCheckStatus {
    /// The cached remote version differs from the installed one.
    Available {
        installed: Option<String>,
        remote: String,
    },
    UpToDate { version: String },
}
