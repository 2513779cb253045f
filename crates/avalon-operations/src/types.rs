use avalon_core::error::AvalonError;

// ---- Batch ----

/// Terminal state of one task in a batch.
#[derive(Debug)]
pub enum TaskOutcome {
    Success,
    Failed(AvalonError),
    /// Never started because an earlier task failed.
    Canceled,
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TaskOutcome::Failed(_))
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, TaskOutcome::Canceled)
    }
}

/// Outcome of one target, in the order targets were handed to the batch.
#[derive(Debug)]
pub struct TaskResult {
    pub target: String,
    pub outcome: TaskOutcome,
}

// ---- Update ----

/// Versions of a target after `update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateInfo {
    pub name: String,
    pub installed: Option<String>,
    pub remote: Option<String>,
}

impl UpdateInfo {
    pub fn has_update(&self) -> bool {
        self.remote.is_some() && self.remote != self.installed
    }
}

/// Report returned after `update` completes.
#[derive(Debug, Default)]
pub struct UpdateReport {
    pub checked: Vec<UpdateInfo>,
}

impl UpdateReport {
    pub fn available(&self) -> impl Iterator<Item = &UpdateInfo> {
        self.checked.iter().filter(|info| info.has_update())
    }
}

// ---- Install / Upgrade ----

/// A target and the version the latest pointer now resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledInfo {
    pub name: String,
    pub version: String,
}

/// Report returned after `install` completes.
#[derive(Debug, Default)]
pub struct InstallReport {
    pub installed: Vec<InstalledInfo>,
    /// Targets whose install directory already existed.
    pub skipped: Vec<String>,
}

/// Report returned after `upgrade` completes.
#[derive(Debug, Default)]
pub struct UpgradeReport {
    pub upgraded: Vec<InstalledInfo>,
    /// Targets with nothing newer cached.
    pub skipped: Vec<String>,
}

// ---- Uninstall ----

#[derive(Debug, Default)]
pub struct UninstallReport {
    pub removed: Vec<String>,
    /// Targets that were not installed.
    pub skipped: Vec<String>,
}

// ---- Targets ----

/// Names whose enabled state was changed by `enable` or `disable`.
#[derive(Debug, Default)]
pub struct TargetsChange {
    pub changed: Vec<String>,
}

impl TargetsChange {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }
}

/// A row of `list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEntry {
    pub name: String,
    pub enabled: bool,
    pub installed: Option<String>,
    pub remote: Option<String>,
}
