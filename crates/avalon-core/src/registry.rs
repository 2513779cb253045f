use std::{collections::HashSet, fmt, sync::Arc};

use avalon_config::{config::Config, provider::ProviderKind};
use tracing::warn;

use crate::{
    error::AvalonError,
    provider::{builtin_specs, GitlabProvider, Provider, ProviderSpec, ReleaseProvider},
    AvalonResult,
};

/// A managed tool: its name, the provider serving it, and whether it is enabled.
#[derive(Clone)]
pub struct Target {
    pub name: String,
    pub provider: Arc<dyn Provider>,
    pub enabled: bool,
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

/// Maps target names to providers, in registration order.
#[derive(Default, Clone)]
pub struct Registry {
    entries: Vec<(String, Arc<dyn Provider>)>,
}

impl Registry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in targets followed by the `[[providers]]` of `config`.
    pub fn from_config(config: &Config) -> AvalonResult<Self> {
        let mut registry = Self::empty();
        for spec in builtin_specs() {
            registry.register_spec(spec)?;
        }
        for provider in &config.providers {
            registry.register_spec(ProviderSpec::from(provider))?;
        }
        Ok(registry)
    }

    pub fn register_spec(&mut self, spec: ProviderSpec) -> AvalonResult<()> {
        let name = spec.name.clone();
        let provider: Arc<dyn Provider> = match spec.kind {
            ProviderKind::Github => Arc::new(ReleaseProvider::new(spec)?),
            ProviderKind::Gitlab => Arc::new(GitlabProvider::new(spec)?),
        };
        self.register(name, provider)
    }

    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) -> AvalonResult<()> {
        let name = name.into();
        if self.contains(&name) {
            return Err(AvalonError::DuplicateTarget(name));
        }
        self.entries.push((name, provider));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, provider)| provider.clone())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Every known target, flagged with its enabled state.
    pub fn targets(&self, config: &Config) -> Vec<Target> {
        self.entries
            .iter()
            .map(|(name, provider)| {
                Target {
                    name: name.clone(),
                    provider: provider.clone(),
                    enabled: config.is_enabled(name),
                }
            })
            .collect()
    }

    /// Targets a stage operates on.
    ///
    /// Without `names`, every enabled target in configuration order. With `names`,
    /// those of them that are known and enabled, in the given order. Anything else is
    /// warned about and skipped.
    pub fn resolve(&self, config: &Config, names: &[String]) -> Vec<Target> {
        let requested: Vec<&str> = if names.is_empty() {
            config.targets.enabled.iter().map(String::as_str).collect()
        } else {
            names.iter().map(String::as_str).collect()
        };

        let mut seen = HashSet::new();
        let mut targets = Vec::new();
        for name in requested {
            if !seen.insert(name) {
                continue;
            }
            let Some(provider) = self.get(name) else {
                warn!("Unknown target: {}", name);
                continue;
            };
            if !config.is_enabled(name) {
                warn!("Target {} is not enabled, skipping", name);
                continue;
            }
            targets.push(Target {
                name: name.to_string(),
                provider,
                enabled: true,
            });
        }
        targets
    }
}

#[cfg(test)]
mod tests {
    use avalon_config::provider::{AssetPattern, ProviderConfig};

    use super::*;

    fn config_with(enabled: &[&str]) -> Config {
        let mut config = Config::default_config();
        config.targets.enabled = enabled.iter().map(|s| s.to_string()).collect();
        config
    }

    fn user_provider(name: &str) -> ProviderConfig {
        ProviderConfig {
            name: name.to_string(),
            kind: Some(ProviderKind::Gitlab),
            feed: "https://gitlab.com/api/v4/projects/1/releases".to_string(),
            asset_pattern: AssetPattern::Any("^tool$".to_string()),
            version_pattern: None,
            filename: None,
        }
    }

    #[test]
    fn test_from_config_merges_user_providers() {
        let mut config = config_with(&[]);
        config.providers.push(user_provider("my-tool"));

        let registry = Registry::from_config(&config).unwrap();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(
            names,
            vec![
                "apkeep",
                "apkeditor",
                "revanced-cli",
                "piko-twitter-patches",
                "my-tool"
            ]
        );
    }

    #[test]
    fn test_builtin_names_are_reserved() {
        let mut config = config_with(&[]);
        config.providers.push(user_provider("apkeep"));

        assert!(matches!(
            Registry::from_config(&config),
            Err(AvalonError::DuplicateTarget(name)) if name == "apkeep"
        ));
    }

    #[test]
    fn test_resolve_defaults_to_enabled_in_config_order() {
        let registry = Registry::from_config(&Config::default_config()).unwrap();
        let config = config_with(&["revanced-cli", "ghost", "apkeep"]);

        let targets = registry.resolve(&config, &[]);
        let names: Vec<_> = targets.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["revanced-cli", "apkeep"]);
    }

    #[test]
    fn test_resolve_explicit_names_filters_disabled_and_unknown() {
        let registry = Registry::from_config(&Config::default_config()).unwrap();
        let config = config_with(&["apkeep", "apkeditor"]);

        let names = vec![
            "apkeditor".to_string(),
            "revanced-cli".to_string(),
            "nope".to_string(),
            "apkeditor".to_string(),
        ];
        let targets = registry.resolve(&config, &names);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].name, "apkeditor");
    }

    #[test]
    fn test_targets_flags_enabled() {
        let registry = Registry::from_config(&Config::default_config()).unwrap();
        let config = config_with(&["apkeditor"]);

        let targets = registry.targets(&config);
        assert_eq!(targets.len(), 4);
        assert!(targets.iter().any(|t| t.name == "apkeditor" && t.enabled));
        assert!(targets.iter().any(|t| t.name == "apkeep" && !t.enabled));
    }
}
