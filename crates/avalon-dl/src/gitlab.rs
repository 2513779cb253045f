use serde::Deserialize;

use crate::traits::{Asset, Release};

#[derive(Debug, Clone, Deserialize)]
pub struct GitLabRelease {
    tag_name: String,
    #[serde(default)]
    upcoming_release: bool,
    assets: GitLabAssets,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitLabAssets {
    #[serde(default)]
    pub links: Vec<GitLabAsset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitLabAsset {
    pub name: String,
    pub direct_asset_url: String,
}

impl Release for GitLabRelease {
    type Asset = GitLabAsset;

    fn tag(&self) -> &str {
        &self.tag_name
    }

    fn is_prerelease(&self) -> bool {
        self.upcoming_release
    }

    fn assets(&self) -> &[Self::Asset] {
        &self.assets.links
    }
}

impl Asset for GitLabAsset {
    fn name(&self) -> &str {
        &self.name
    }

    fn url(&self) -> &str {
        &self.direct_asset_url
    }
}
