use regex::Regex;

use crate::{
    error::{DownloadError, Result},
    traits::Asset,
};

/// Selects release assets by name.
#[derive(Debug, Clone)]
pub struct Filter {
    pub regex: Regex,
}

impl Filter {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|source| {
            DownloadError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;
        Ok(Self {
            regex,
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    /// First asset whose name matches, in feed order.
    ///
    /// Fails with [`DownloadError::NoMatch`] listing every asset name when nothing matches.
    pub fn select<'a, A: Asset>(&self, assets: &'a [A]) -> Result<&'a A> {
        assets
            .iter()
            .find(|asset| self.matches(asset.name()))
            .ok_or_else(|| {
                DownloadError::NoMatch {
                    pattern: self.regex.as_str().to_string(),
                    available: assets.iter().map(|a| a.name().to_string()).collect(),
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::GithubAsset;

    fn asset(name: &str) -> GithubAsset {
        GithubAsset {
            name: name.to_string(),
            browser_download_url: format!("https://example.com/{name}"),
        }
    }

    #[test]
    fn test_select_first_match() {
        let assets = vec![
            asset("revanced-cli-4.6.0.jar"),
            asset("revanced-cli-4.6.0-all.jar"),
            asset("revanced-cli-4.6.0-all.jar.asc"),
        ];
        let filter = Filter::new(r"^revanced-cli-.+-all\.jar$").unwrap();

        let selected = filter.select(&assets).unwrap();
        assert_eq!(selected.name, "revanced-cli-4.6.0-all.jar");
    }

    #[test]
    fn test_select_no_match() {
        let assets = vec![asset("a.zip"), asset("b.zip")];
        let filter = Filter::new(r"\.jar$").unwrap();

        match filter.select(&assets) {
            Err(DownloadError::NoMatch {
                available, ..
            }) => assert_eq!(available, vec!["a.zip", "b.zip"]),
            other => panic!("expected NoMatch, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(
            Filter::new("(unclosed"),
            Err(DownloadError::InvalidPattern { .. })
        ));
    }
}
