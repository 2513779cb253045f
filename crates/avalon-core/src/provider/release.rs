use std::path::Path;

use avalon_config::provider::{AssetPattern, ProviderConfig, ProviderKind};
use avalon_dl::{
    feed::fetch_latest,
    filter::Filter,
    github::GithubRelease,
    traits::{Asset as _, Release},
};
use avalon_utils::{
    path::join_component,
    system::{exe_suffix, platform},
};
use regex::Regex;
use tracing::debug;

use super::{install_cached, Provider};
use crate::{
    constants::{DOWNLOAD_URL, REMOTE_VERSION},
    error::AvalonError,
    store::is_reserved_name,
    task::TaskContext,
    AvalonResult,
};

/// Declarative description of a target served by a release feed.
#[derive(Debug, Clone)]
pub struct ProviderSpec {
    pub name: String,
    pub kind: ProviderKind,
    /// Release endpoint returning one release object or a list, newest first.
    pub feed: String,
    pub asset_pattern: AssetPattern,
    /// Applied to the release tag, see [`extract_version`].
    pub version_pattern: Option<String>,
    /// Local payload name; `{name}` and `{exe}` are substituted.
    pub filename: String,
}

impl ProviderSpec {
    pub fn github(name: &str, repo: &str, asset_pattern: AssetPattern) -> Self {
        Self {
            name: name.to_string(),
            kind: ProviderKind::Github,
            feed: format!("https://api.github.com/repos/{repo}/releases/latest"),
            asset_pattern,
            version_pattern: None,
            filename: "{name}{exe}".to_string(),
        }
    }

    pub fn version_pattern(mut self, pattern: &str) -> Self {
        self.version_pattern = Some(pattern.to_string());
        self
    }

    pub fn filename(mut self, template: &str) -> Self {
        self.filename = template.to_string();
        self
    }

    pub fn local_filename(&self) -> String {
        self.filename
            .replace("{name}", &self.name)
            .replace("{exe}", exe_suffix())
    }
}

impl From<&ProviderConfig> for ProviderSpec {
    fn from(config: &ProviderConfig) -> Self {
        Self {
            name: config.name.clone(),
            kind: config.kind(),
            feed: config.feed.clone(),
            asset_pattern: config.asset_pattern.clone(),
            version_pattern: config.version_pattern.clone(),
            filename: config.filename_template().to_string(),
        }
    }
}

/// Version and asset picked from one release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub version: String,
    pub download_url: String,
}

/// Generic update/install pair driven by a [`ProviderSpec`].
#[derive(Debug)]
pub struct ReleaseProvider {
    spec: ProviderSpec,
    version_regex: Option<Regex>,
}

impl ReleaseProvider {
    /// Compiles every pattern up front so a bad provider entry fails before any task runs.
    pub fn new(spec: ProviderSpec) -> AvalonResult<Self> {
        match &spec.asset_pattern {
            AssetPattern::Any(pattern) => {
                Regex::new(pattern)?;
            }
            AssetPattern::PerPlatform(patterns) => {
                for pattern in patterns.values() {
                    Regex::new(pattern)?;
                }
            }
        }

        let version_regex = spec
            .version_pattern
            .as_deref()
            .map(Regex::new)
            .transpose()?;

        Ok(Self {
            spec,
            version_regex,
        })
    }

    pub fn spec(&self) -> &ProviderSpec {
        &self.spec
    }

    /// Picks the asset for the current platform and the version from `release`.
    pub fn resolve<R: Release>(&self, release: &R) -> AvalonResult<Resolved> {
        self.resolve_for(release, &platform())
    }

    pub fn resolve_for<R: Release>(&self, release: &R, platform: &str) -> AvalonResult<Resolved> {
        let pattern = self.spec.asset_pattern.for_platform(platform).ok_or_else(|| {
            AvalonError::UnsupportedPlatform {
                target: self.spec.name.clone(),
                platform: platform.to_string(),
            }
        })?;

        let asset = Filter::new(pattern)?.select(release.assets())?;
        let version = extract_version(self.version_regex.as_ref(), release.tag())?;

        Ok(Resolved {
            version,
            download_url: asset.url().to_string(),
        })
    }

    /// Writes a resolved release into the cache and persists it.
    pub fn store_resolved(ctx: &mut TaskContext<'_>, resolved: Resolved) -> AvalonResult<()> {
        debug!(name = ctx.target, version = %resolved.version, "resolved remote release");
        ctx.cache.set(REMOTE_VERSION, resolved.version);
        ctx.cache.set(DOWNLOAD_URL, resolved.download_url);
        ctx.cache.save()
    }
}

impl Provider for ReleaseProvider {
    fn update(&self, ctx: &mut TaskContext<'_>) -> AvalonResult<()> {
        ctx.progress.set(0, 2);
        let release: GithubRelease = fetch_latest(&self.spec.feed)?;
        ctx.progress.set(1, 2);

        let resolved = self.resolve(&release)?;
        Self::store_resolved(ctx, resolved)?;
        ctx.progress.set(2, 2);
        Ok(())
    }

    fn install(&self, ctx: &mut TaskContext<'_>) -> AvalonResult<()> {
        install_cached(ctx, &self.spec.local_filename())?;
        Ok(())
    }
}

/// Extracts the version from a release tag.
///
/// With a pattern, the `version` named group wins, then group 1, then the whole
/// match. Without one, the tag minus a leading `v` or `V`. The result must be usable
/// as a directory name.
pub fn extract_version(pattern: Option<&Regex>, tag: &str) -> AvalonResult<String> {
    let version = match pattern {
        Some(regex) => {
            let caps = regex.captures(tag).ok_or_else(|| {
                AvalonError::NoVersionMatch {
                    tag: tag.to_string(),
                    pattern: regex.as_str().to_string(),
                }
            })?;
            caps.name("version")
                .or_else(|| caps.get(1))
                .or_else(|| caps.get(0))
                .map(|m| m.as_str())
                .unwrap_or_default()
                .to_string()
        }
        None => tag.strip_prefix(&['v', 'V'][..]).unwrap_or(tag).to_string(),
    };

    if version.is_empty()
        || is_reserved_name(&version)
        || join_component(Path::new(""), &version).is_none()
    {
        return Err(AvalonError::InvalidVersion(version));
    }
    Ok(version)
}
