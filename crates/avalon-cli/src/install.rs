use avalon_core::AvalonResult;
use avalon_operations::{install, upgrade, AvalonContext, InstalledInfo};
use nu_ansi_term::Color::{Blue, Green, Yellow};
use tracing::info;

use crate::utils::Colored;

fn print_installed(installed: &[InstalledInfo]) {
    for entry in installed {
        info!("{}: {}", Colored(Blue, &entry.name), Colored(Green, &entry.version));
    }
}

pub async fn install_targets(ctx: &AvalonContext, targets: &[String]) -> AvalonResult<()> {
    let report = install::install(ctx, targets).await?;

    info!("Installed {} targets", Colored(Green, report.installed.len()));
    print_installed(&report.installed);
    Ok(())
}

pub async fn upgrade_targets(ctx: &AvalonContext, targets: &[String]) -> AvalonResult<()> {
    let report = upgrade::upgrade(ctx, targets).await?;

    info!(
        "{} upgraded, {} skipped",
        Colored(Green, report.upgraded.len()),
        Colored(Yellow, report.skipped.len())
    );
    print_installed(&report.upgraded);
    Ok(())
}
