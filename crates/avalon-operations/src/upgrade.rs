use avalon_core::{task::TargetState, AvalonResult};
use avalon_events::Stage;
use tracing::{debug, info};

use crate::{batch::run_batch, install::installed_versions, AvalonContext, UpgradeReport};

/// Installs the cached remote version of every selected target where it differs
/// from the installed one.
///
/// The remote feed is not consulted: a stale cache means a skipped target until the
/// next `update`.
pub async fn upgrade(ctx: &AvalonContext, names: &[String]) -> AvalonResult<UpgradeReport> {
    let mut report = UpgradeReport::default();
    let mut pending = Vec::new();

    for target in ctx.registry().resolve(ctx.config(), names) {
        let state = TargetState::inspect(&target.name, ctx.config())?;
        match state.remote.as_deref() {
            None => {
                info!(
                    "No cached remote version for {}, run `avalon update` first",
                    target.name
                );
                report.skipped.push(target.name);
            }
            Some(remote) if state.installed.as_deref() == Some(remote) => {
                debug!(name = %target.name, version = remote, "already up to date");
                report.skipped.push(target.name);
            }
            Some(_) => pending.push(target),
        }
    }

    debug!(count = pending.len(), "upgrading targets");
    let workers = ctx.config().upgrade_workers();
    let upgraded = run_batch(ctx, pending, Stage::Upgrade, workers)
        .await
        .into_result()?;

    report.upgraded = installed_versions(ctx, upgraded)?;
    Ok(report)
}
