use std::path::PathBuf;

use avalon_dl::download;
use tracing::debug;

use crate::{
    constants::{DOWNLOAD_URL, REMOTE_VERSION},
    error::AvalonError,
    task::TaskContext,
    AvalonResult,
};

/// Downloads the cached `download_url` into the version directory named after the
/// cached `remote_version`, saved as `filename`.
pub fn install_cached(ctx: &mut TaskContext<'_>, filename: &str) -> AvalonResult<PathBuf> {
    ctx.progress.set(0, 1);

    let target = ctx.target;
    let missing = |key| {
        AvalonError::MissingCacheKey {
            target: target.to_string(),
            key,
        }
    };
    let version = ctx
        .cache
        .remote_version()
        .ok_or_else(|| missing(REMOTE_VERSION))?
        .to_string();
    let url = ctx
        .cache
        .download_url()
        .ok_or_else(|| missing(DOWNLOAD_URL))?
        .to_string();

    debug!(name = target, %version, %url, "installing");

    let progress = ctx.progress.clone();
    let payload = ctx.store.install(&version, filename, move |temp| {
        download::fetch(&url, temp, move |completed, total| {
            progress.set(completed, total)
        })?;
        Ok(())
    })?;

    Ok(payload)
}
