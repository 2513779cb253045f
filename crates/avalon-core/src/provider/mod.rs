//! The per-target operation contract and the providers compiled into avalon.

mod builtin;
mod gitlab;
mod install;
mod release;

pub use builtin::builtin_specs;
pub use gitlab::GitlabProvider;
pub use install::install_cached;
pub use release::{extract_version, ProviderSpec, ReleaseProvider, Resolved};
use tracing::debug;

use crate::{task::TaskContext, AvalonResult};

/// The four operations every target supports.
///
/// Implementations are written as if single-threaded; the orchestrator runs each
/// call on its own worker and never runs two stages of the same target at once.
pub trait Provider: Send + Sync {
    /// Resolves the newest remote version and its download URL into the cache.
    fn update(&self, ctx: &mut TaskContext<'_>) -> AvalonResult<()>;

    /// Installs the cached remote version and points `latest` at it.
    fn install(&self, ctx: &mut TaskContext<'_>) -> AvalonResult<()>;

    /// Removes every installed version and the latest pointer. The cache document is kept.
    fn uninstall(&self, ctx: &mut TaskContext<'_>) -> AvalonResult<()> {
        ctx.progress.set(0, 1);
        ctx.store.remove_all()?;
        ctx.progress.set(1, 1);
        Ok(())
    }

    /// Installs the cached remote version if it differs from the installed one.
    fn upgrade(&self, ctx: &mut TaskContext<'_>) -> AvalonResult<()> {
        let remote = ctx.cache.remote_version();
        let installed = ctx.store.installed_version();

        if remote.is_none() || remote == installed.as_deref() {
            debug!(name = ctx.target, ?installed, "nothing to upgrade");
            return Ok(());
        }

        self.install(ctx)
    }
}
