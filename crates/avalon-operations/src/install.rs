use avalon_core::{task::TargetState, AvalonResult};
use avalon_events::Stage;
use tracing::{debug, info};

use crate::{batch::run_batch, AvalonContext, InstallReport, InstalledInfo};

/// Installs the cached remote version of every selected target that is not installed yet.
///
/// Targets whose install directory already exists are skipped before anything is
/// dispatched.
pub async fn install(ctx: &AvalonContext, names: &[String]) -> AvalonResult<InstallReport> {
    let mut report = InstallReport::default();
    let mut pending = Vec::new();

    for target in ctx.registry().resolve(ctx.config(), names) {
        let state = TargetState::inspect(&target.name, ctx.config())?;
        if state.present {
            info!("{} is already installed, skipping", target.name);
            report.skipped.push(target.name);
            continue;
        }
        pending.push(target);
    }

    debug!(count = pending.len(), "installing targets");
    let workers = ctx.config().install_workers();
    let installed = run_batch(ctx, pending, Stage::Install, workers)
        .await
        .into_result()?;

    report.installed = installed_versions(ctx, installed)?;
    Ok(report)
}

/// Reads back the version the latest pointer of each target resolves to.
pub(crate) fn installed_versions(
    ctx: &AvalonContext,
    names: Vec<String>,
) -> AvalonResult<Vec<InstalledInfo>> {
    let mut installed = Vec::with_capacity(names.len());
    for name in names {
        match TargetState::inspect(&name, ctx.config())?.installed {
            Some(version) => installed.push(InstalledInfo { name, version }),
            None => debug!(name = %name, "no latest pointer after install"),
        }
    }
    Ok(installed)
}
