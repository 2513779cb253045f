use std::collections::BTreeMap;

use documented::{Documented, DocumentedFields};
use serde::{Deserialize, Serialize};

/// Shape of the release feed a provider talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// `tag_name` plus `assets[].browser_download_url`.
    #[default]
    Github,
    /// `tag_name` plus `assets.links[].direct_asset_url`.
    Gitlab,
}

/// Asset name regex, either shared by every platform or keyed by platform string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AssetPattern {
    Any(String),
    PerPlatform(BTreeMap<String, String>),
}

impl AssetPattern {
    /// Pattern that applies to `platform`, if any.
    pub fn for_platform(&self, platform: &str) -> Option<&str> {
        match self {
            AssetPattern::Any(pattern) => Some(pattern),
            AssetPattern::PerPlatform(map) => map.get(platform).map(String::as_str),
        }
    }
}

/// A user-declared target, served by the generic release provider.
#[derive(Debug, Clone, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct ProviderConfig {
    /// Unique target name. Used as the directory and cache file name.
    pub name: String,

    /// Release feed flavour: "github" or "gitlab".
    /// Default: "github"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ProviderKind>,

    /// URL of the release endpoint, e.g.
    /// "https://api.github.com/repos/<owner>/<repo>/releases/latest".
    pub feed: String,

    /// Regex matched against asset names. Either a string or a table keyed by
    /// platform ("x86_64-Linux", "aarch64-Linux", "x86_64-Windows", ...).
    pub asset_pattern: AssetPattern,

    /// Regex applied to the release tag. The `version` named group (or the first
    /// group, or the whole match) becomes the version.
    /// Default: the tag with a leading "v" removed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_pattern: Option<String>,

    /// Local file name of the payload. `{name}` and `{exe}` are substituted.
    /// Default: "{name}{exe}"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl ProviderConfig {
    pub fn kind(&self) -> ProviderKind {
        self.kind.unwrap_or_default()
    }

    pub fn filename_template(&self) -> &str {
        self.filename.as_deref().unwrap_or("{name}{exe}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_pattern_untagged() {
        let single: ProviderConfig = toml::from_str(
            r#"
            name = "tool"
            feed = "https://api.github.com/repos/o/tool/releases/latest"
            asset_pattern = '^tool-.+\.jar$'
            "#,
        )
        .unwrap();
        assert_eq!(
            single.asset_pattern.for_platform("anything"),
            Some(r"^tool-.+\.jar$")
        );
        assert_eq!(single.kind(), ProviderKind::Github);
        assert_eq!(single.filename_template(), "{name}{exe}");

        let mapped: ProviderConfig = toml::from_str(
            r#"
            name = "tool"
            kind = "gitlab"
            feed = "https://gitlab.com/api/v4/projects/1/releases/permalink/latest"
            filename = "{name}.bin"

            [asset_pattern]
            x86_64-Linux = '^tool-x86_64$'
            "#,
        )
        .unwrap();
        assert_eq!(mapped.kind(), ProviderKind::Gitlab);
        assert_eq!(
            mapped.asset_pattern.for_platform("x86_64-Linux"),
            Some("^tool-x86_64$")
        );
        assert_eq!(mapped.asset_pattern.for_platform("aarch64-Linux"), None);
        assert_eq!(mapped.filename_template(), "{name}.bin");
    }
}
