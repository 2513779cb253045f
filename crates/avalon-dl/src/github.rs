use serde::Deserialize;

use crate::traits::{Asset, Release};

#[derive(Debug, Clone, Deserialize)]
pub struct GithubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub assets: Vec<GithubAsset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubAsset {
    pub name: String,
    pub browser_download_url: String,
}

impl Release for GithubRelease {
    type Asset = GithubAsset;

    fn tag(&self) -> &str {
        &self.tag_name
    }

    fn is_prerelease(&self) -> bool {
        self.prerelease
    }

    fn assets(&self) -> &[Self::Asset] {
        &self.assets
    }
}

impl Asset for GithubAsset {
    fn name(&self) -> &str {
        &self.name
    }

    fn url(&self) -> &str {
        &self.browser_download_url
    }
}
