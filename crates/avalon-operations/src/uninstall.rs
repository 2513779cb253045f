use avalon_core::{task::TargetState, AvalonResult};
use avalon_events::Stage;
use tracing::{debug, info};

use crate::{batch::run_batch, AvalonContext, UninstallReport};

/// Removes every installed version of the selected targets. Cache documents are kept.
pub async fn uninstall(ctx: &AvalonContext, names: &[String]) -> AvalonResult<UninstallReport> {
    let mut report = UninstallReport::default();
    let mut pending = Vec::new();

    for target in ctx.registry().resolve(ctx.config(), names) {
        if !TargetState::inspect(&target.name, ctx.config())?.present {
            info!("{} is not installed, skipping", target.name);
            report.skipped.push(target.name);
            continue;
        }
        pending.push(target);
    }

    debug!(count = pending.len(), "uninstalling targets");
    let workers = ctx.config().uninstall_workers();
    report.removed = run_batch(ctx, pending, Stage::Uninstall, workers)
        .await
        .into_result()?;

    Ok(report)
}
