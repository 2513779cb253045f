use avalon_core::{task::TargetState, AvalonResult};
use tracing::debug;

use crate::{AvalonContext, TargetEntry};

/// Every known target in registry order, with its enabled flag and versions.
pub fn list_targets(ctx: &AvalonContext) -> AvalonResult<Vec<TargetEntry>> {
    debug!("listing targets");
    ctx.registry()
        .targets(ctx.config())
        .into_iter()
        .map(|target| {
            let state = TargetState::inspect(&target.name, ctx.config())?;
            Ok(TargetEntry {
                name: target.name,
                enabled: target.enabled,
                installed: state.installed,
                remote: state.remote,
            })
        })
        .collect()
}
