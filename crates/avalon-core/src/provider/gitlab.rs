use avalon_dl::{error::DownloadError, feed::fetch_releases, gitlab::GitLabRelease, traits::Release};

use super::{install_cached, Provider, ProviderSpec, ReleaseProvider};
use crate::{task::TaskContext, AvalonResult};

/// Provider for GitLab release feeds.
///
/// GitLab lists upcoming releases alongside published ones and nests assets under
/// `assets.links`, so `update` walks the list itself instead of taking the first entry.
#[derive(Debug)]
pub struct GitlabProvider {
    inner: ReleaseProvider,
}

impl GitlabProvider {
    pub fn new(spec: ProviderSpec) -> AvalonResult<Self> {
        Ok(Self {
            inner: ReleaseProvider::new(spec)?,
        })
    }

    fn latest_published(feed: &str, releases: Vec<GitLabRelease>) -> AvalonResult<GitLabRelease> {
        releases
            .into_iter()
            .find(|release| !release.is_prerelease())
            .ok_or_else(|| {
                DownloadError::EmptyFeed {
                    url: feed.to_string(),
                }
                .into()
            })
    }
}

impl Provider for GitlabProvider {
    fn update(&self, ctx: &mut TaskContext<'_>) -> AvalonResult<()> {
        let feed = &self.inner.spec().feed;

        ctx.progress.set(0, 2);
        let releases: Vec<GitLabRelease> = fetch_releases(feed)?;
        ctx.progress.set(1, 2);

        let release = Self::latest_published(feed, releases)?;
        let resolved = self.inner.resolve(&release)?;
        ReleaseProvider::store_resolved(ctx, resolved)?;
        ctx.progress.set(2, 2);
        Ok(())
    }

    fn install(&self, ctx: &mut TaskContext<'_>) -> AvalonResult<()> {
        install_cached(ctx, &self.inner.spec().local_filename())?;
        Ok(())
    }
}
