use avalon_core::AvalonResult;
use avalon_operations::{update, AvalonContext};
use nu_ansi_term::Color::{Blue, Green, Red};
use tracing::info;

use crate::utils::{version_or_none, Colored};

pub async fn update_targets(ctx: &AvalonContext, targets: &[String]) -> AvalonResult<()> {
    let report = update::update(ctx, targets).await?;

    let available: Vec<_> = report.available().collect();
    info!("{} available updates", Colored(Green, available.len()));
    for entry in available {
        info!(
            "{}: {} -> {}",
            Colored(Blue, &entry.name),
            Colored(Red, version_or_none(entry.installed.as_deref())),
            Colored(Green, version_or_none(entry.remote.as_deref())),
        );
    }

    Ok(())
}
