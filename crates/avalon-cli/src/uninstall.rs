use avalon_core::AvalonResult;
use avalon_operations::{uninstall, AvalonContext};
use nu_ansi_term::Color::{Blue, Green};
use tracing::{debug, info};

use crate::utils::Colored;

pub async fn uninstall_targets(ctx: &AvalonContext, targets: &[String]) -> AvalonResult<()> {
    let report = uninstall::uninstall(ctx, targets).await?;

    info!("Uninstalled {} targets", Colored(Green, report.removed.len()));
    for name in &report.removed {
        debug!("removed {}", Colored(Blue, name));
    }
    Ok(())
}
