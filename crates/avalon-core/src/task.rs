use avalon_config::config::Config;
use avalon_events::{Stage, TaskId};

use crate::{
    cache::{cache_path, CacheDocument},
    progress::ProgressHandle,
    registry::Target,
    store::TargetStore,
    AvalonResult,
};

/// Everything a provider operation gets to work with.
pub struct TaskContext<'a> {
    pub task_id: TaskId,
    pub target: &'a str,
    pub config: &'a Config,
    pub cache: &'a mut CacheDocument,
    pub store: &'a TargetStore,
    pub progress: &'a ProgressHandle,
}

/// Runs `stage` for `target` to completion on the current thread.
pub fn run_stage(
    target: &Target,
    stage: Stage,
    config: &Config,
    task_id: TaskId,
    progress: &ProgressHandle,
) -> AvalonResult<()> {
    let store = TargetStore::new(&config.get_data_path()?, &target.name)?;
    let mut cache = CacheDocument::open(cache_path(&config.get_cache_path()?, &target.name)?)?;

    let mut ctx = TaskContext {
        task_id,
        target: &target.name,
        config,
        cache: &mut cache,
        store: &store,
        progress,
    };

    let provider = &target.provider;
    match stage {
        Stage::Update => provider.update(&mut ctx),
        Stage::Install => provider.install(&mut ctx),
        Stage::Upgrade => provider.upgrade(&mut ctx),
        Stage::Uninstall => provider.uninstall(&mut ctx),
    }
}

/// On-disk state of a target, read without creating anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetState {
    /// The install directory exists.
    pub present: bool,
    /// Version the latest pointer resolves to.
    pub installed: Option<String>,
    /// `remote_version` from the cache document.
    pub remote: Option<String>,
}

impl TargetState {
    pub fn inspect(name: &str, config: &Config) -> AvalonResult<Self> {
        let store = TargetStore::new(&config.get_data_path()?, name)?;
        let cache_file = cache_path(&config.get_cache_path()?, name)?;

        let remote = if cache_file.exists() {
            CacheDocument::open(&cache_file)?
                .remote_version()
                .map(String::from)
        } else {
            None
        };

        Ok(Self {
            present: store.exists(),
            installed: store.installed_version(),
            remote,
        })
    }

    /// The cached remote version differs from what is installed.
    pub fn has_update(&self) -> bool {
        self.remote.is_some() && self.remote != self.installed
    }
}
