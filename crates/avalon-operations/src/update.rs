use avalon_core::{task::TargetState, AvalonResult};
use avalon_events::{AvalonEvent, Stage, UpdateCheckStatus};
use tracing::debug;

use crate::{batch::run_batch, AvalonContext, UpdateInfo, UpdateReport};

/// Refreshes the cached remote version of every selected target.
///
/// With no `names`, every enabled target is checked. Nothing is downloaded; the
/// report compares the fresh remote versions with what is installed.
pub async fn update(ctx: &AvalonContext, names: &[String]) -> AvalonResult<UpdateReport> {
    let targets = ctx.registry().resolve(ctx.config(), names);
    debug!(count = targets.len(), "checking for updates");

    let workers = ctx.config().update_workers();
    let checked = run_batch(ctx, targets, Stage::Update, workers)
        .await
        .into_result()?;

    let mut report = UpdateReport::default();
    for name in checked {
        let state = TargetState::inspect(&name, ctx.config())?;
        if let Some(remote) = &state.remote {
            let status = if state.has_update() {
                UpdateCheckStatus::Available {
                    installed: state.installed.clone(),
                    remote: remote.clone(),
                }
            } else {
                UpdateCheckStatus::UpToDate {
                    version: remote.clone(),
                }
            };
            ctx.events().emit(AvalonEvent::UpdateCheck {
                target: name.clone(),
                status,
            });
        }

        report.checked.push(UpdateInfo {
            name,
            installed: state.installed,
            remote: state.remote,
        });
    }

    Ok(report)
}
