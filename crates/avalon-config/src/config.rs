use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    sync::{LazyLock, RwLock},
};

use avalon_utils::path::{join_component, resolve_path, xdg_config_home, xdg_data_home};
use documented::{Documented, DocumentedFields};
use serde::{Deserialize, Serialize};
use toml_edit::{Array, DocumentMut, Item, Value};
use tracing::{debug, info};

use crate::{
    annotations::{annotate_toml_array_of_tables, annotate_toml_table},
    error::{ConfigError, Result},
    provider::{AssetPattern, ProviderConfig},
};

const DEFAULT_UPDATE_WORKERS: usize = 8;
const DEFAULT_STAGE_WORKERS: usize = 4;

const PROVIDER_EXAMPLE: &str = r#"
# Additional targets can be declared here. They are installed like the built-in ones.
#
# [[providers]]
# name = "my-tool"
# kind = "github"
# feed = "https://api.github.com/repos/owner/my-tool/releases/latest"
# asset_pattern = '^my-tool-.+\.jar$'
# version_pattern = '(?P<version>(\d|\.)+)'
# filename = "{name}.jar"
"#;

/// Application's configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct Config {
    /// Filesystem roots for installed payloads and cache documents.
    #[serde(default)]
    pub path: PathConfig,

    /// Worker pool size for each stage.
    #[serde(default)]
    pub worker: WorkerConfig,

    /// Which known targets are managed.
    #[serde(default)]
    pub targets: TargetsConfig,

    /// User-declared targets.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub providers: Vec<ProviderConfig>,
}

/// Filesystem roots.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct PathConfig {
    /// Root holding `<target>/<version>/` directories and `<target>/latest` pointers.
    /// Default: $XDG_DATA_HOME/avalon/data
    pub data: Option<String>,

    /// Root holding one `<target>.json` cache document per target.
    /// Default: $XDG_DATA_HOME/avalon/cache
    pub cache: Option<String>,
}

/// Number of targets processed in parallel by each stage.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct WorkerConfig {
    /// Default: 8
    pub update: Option<usize>,

    /// Default: 4
    pub install: Option<usize>,

    /// Default: 4
    pub upgrade: Option<usize>,

    /// Default: 4
    pub uninstall: Option<usize>,
}

/// Enabled-target list.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct TargetsConfig {
    /// Names of the targets stages operate on when none are given explicitly.
    #[serde(default)]
    pub enabled: Vec<String>,
}

pub static CONFIG: LazyLock<RwLock<Option<Config>>> = LazyLock::new(|| RwLock::new(None));

pub static CONFIG_PATH: LazyLock<RwLock<PathBuf>> = LazyLock::new(|| {
    RwLock::new(match std::env::var("AVALON_CONFIG") {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => xdg_config_home().join("avalon").join("config.toml"),
    })
});

/// Path the configuration is read from and saved to.
pub fn config_path() -> PathBuf {
    CONFIG_PATH
        .read()
        .map(|path| path.clone())
        .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
}

/// Points the loader at a different file. Must run before [`init`].
pub fn set_config_path(path: PathBuf) {
    let mut guard = CONFIG_PATH
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = path;
}

pub fn init() -> Result<()> {
    let config = Config::load_from(&config_path())?;
    set_config(config);
    Ok(())
}

pub fn set_config(config: Config) {
    let mut global_config = CONFIG.write().unwrap_or_else(|p| p.into_inner());
    *global_config = Some(config);
}

/// Returns the loaded configuration, or the defaults when [`init`] has not run.
pub fn get_config() -> Config {
    let guard = CONFIG.read().unwrap_or_else(|p| p.into_inner());
    guard.clone().unwrap_or_else(Config::default_config)
}

impl Config {
    pub fn default_config() -> Self {
        let root = xdg_data_home().join("avalon");

        Self {
            path: PathConfig {
                data: Some(root.join("data").display().to_string()),
                cache: Some(root.join("cache").display().to_string()),
            },
            worker: WorkerConfig {
                update: Some(DEFAULT_UPDATE_WORKERS),
                install: Some(DEFAULT_STAGE_WORKERS),
                upgrade: Some(DEFAULT_STAGE_WORKERS),
                uninstall: Some(DEFAULT_STAGE_WORKERS),
            },
            targets: TargetsConfig::default(),
            providers: Vec::new(),
        }
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut config: Self = match fs::read_to_string(config_path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(config_path.to_path_buf()));
            }
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;
        debug!(path = %config_path.display(), "configuration loaded");

        Ok(config)
    }

    pub fn resolve(&mut self) -> Result<()> {
        let defaults = Self::default_config();

        if self.path.data.is_none() {
            self.path.data = defaults.path.data;
        }
        if self.path.cache.is_none() {
            self.path.cache = defaults.path.cache;
        }

        let worker = &mut self.worker;
        for (name, limit, default) in [
            ("update", &mut worker.update, DEFAULT_UPDATE_WORKERS),
            ("install", &mut worker.install, DEFAULT_STAGE_WORKERS),
            ("upgrade", &mut worker.upgrade, DEFAULT_STAGE_WORKERS),
            ("uninstall", &mut worker.uninstall, DEFAULT_STAGE_WORKERS),
        ] {
            if *limit.get_or_insert(default) == 0 {
                return Err(ConfigError::InvalidWorkerLimit(name));
            }
        }

        let mut seen = HashSet::new();
        for provider in &self.providers {
            if join_component(Path::new(""), &provider.name).is_none() {
                return Err(ConfigError::InvalidProviderName(provider.name.clone()));
            }
            if !seen.insert(provider.name.as_str()) {
                return Err(ConfigError::DuplicateProviderName(provider.name.clone()));
            }
            if matches!(&provider.asset_pattern, AssetPattern::PerPlatform(map) if map.is_empty())
            {
                return Err(ConfigError::EmptyAssetPattern(provider.name.clone()));
            }
        }

        Ok(())
    }

    pub fn get_data_path(&self) -> Result<PathBuf> {
        if let Ok(env_path) = std::env::var("AVALON_DATA") {
            return Ok(resolve_path(&env_path)?);
        }
        match &self.path.data {
            Some(data) => Ok(resolve_path(data)?),
            None => Ok(xdg_data_home().join("avalon").join("data")),
        }
    }

    pub fn get_cache_path(&self) -> Result<PathBuf> {
        if let Ok(env_path) = std::env::var("AVALON_CACHE") {
            return Ok(resolve_path(&env_path)?);
        }
        match &self.path.cache {
            Some(cache) => Ok(resolve_path(cache)?),
            None => Ok(xdg_data_home().join("avalon").join("cache")),
        }
    }

    pub fn update_workers(&self) -> usize {
        self.worker.update.unwrap_or(DEFAULT_UPDATE_WORKERS)
    }

    pub fn install_workers(&self) -> usize {
        self.worker.install.unwrap_or(DEFAULT_STAGE_WORKERS)
    }

    pub fn upgrade_workers(&self) -> usize {
        self.worker.upgrade.unwrap_or(DEFAULT_STAGE_WORKERS)
    }

    pub fn uninstall_workers(&self) -> usize {
        self.worker.uninstall.unwrap_or(DEFAULT_STAGE_WORKERS)
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.targets.enabled.iter().any(|enabled| enabled == name)
    }

    /// Persists `targets.enabled` to `config_path`.
    ///
    /// An existing file is edited in place so comments and the order of other keys survive.
    /// A missing file is created from the annotated default layout.
    pub fn save_targets_to(&self, config_path: &Path) -> Result<()> {
        let mut doc = match fs::read_to_string(config_path) {
            Ok(content) => content.parse::<DocumentMut>()?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => self.to_annotated_document()?,
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        let enabled: Array = self.targets.enabled.iter().map(String::as_str).collect();

        let targets = doc
            .entry("targets")
            .or_insert_with(toml_edit::table)
            .as_table_like_mut()
            .ok_or_else(|| ConfigError::UnexpectedTomlItem("targets".into()))?;

        match targets.get_mut("enabled") {
            Some(Item::Value(Value::Array(existing))) => {
                let decor = existing.decor().clone();
                *existing = enabled;
                *existing.decor_mut() = decor;
            }
            _ => {
                targets.insert("enabled", Item::Value(Value::Array(enabled)));
            }
        }

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(config_path, doc.to_string())?;
        info!("Configuration saved to {}", config_path.display());
        Ok(())
    }

    pub fn to_annotated_document(&self) -> Result<DocumentMut> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut doc = toml_string.parse::<DocumentMut>()?;

        annotate_toml_table::<Config>(doc.as_table_mut(), true)?;

        if let Some(table) = doc.get_mut("path").and_then(Item::as_table_mut) {
            annotate_toml_table::<PathConfig>(table, true)?;
        }
        if let Some(table) = doc.get_mut("worker").and_then(Item::as_table_mut) {
            annotate_toml_table::<WorkerConfig>(table, true)?;
        }
        if let Some(table) = doc.get_mut("targets").and_then(Item::as_table_mut) {
            annotate_toml_table::<TargetsConfig>(table, true)?;
        }
        if let Some(array) = doc
            .get_mut("providers")
            .and_then(Item::as_array_of_tables_mut)
        {
            annotate_toml_array_of_tables::<ProviderConfig>(array)?;
        }

        Ok(doc)
    }
}

/// Writes the annotated default configuration to the configured path.
pub fn generate_default_config() -> Result<PathBuf> {
    let config_path = config_path();
    write_default_config(&config_path)?;
    Ok(config_path)
}

pub fn write_default_config(config_path: &Path) -> Result<()> {
    if config_path.exists() {
        return Err(ConfigError::ConfigAlreadyExists);
    }

    let annotated_doc = Config::default_config().to_annotated_document()?;

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(config_path, format!("{annotated_doc}{PROVIDER_EXAMPLE}"))?;
    info!(
        "Default configuration file generated with documentation at: {}",
        config_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use tempfile::tempdir;

    use super::*;
    use crate::{provider::ProviderKind, test_utils::with_env};

    #[test]
    fn test_default_config_creation() {
        let config = Config::default_config();

        assert_eq!(config.update_workers(), 8);
        assert_eq!(config.install_workers(), 4);
        assert_eq!(config.upgrade_workers(), 4);
        assert_eq!(config.uninstall_workers(), 4);
        assert!(config.targets.enabled.is_empty());
        assert!(config.path.data.as_deref().unwrap().ends_with("avalon/data"));
    }

    #[test]
    fn test_load_missing_file_is_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("typo.toml");

        let err = Config::load_from(&path).unwrap_err();

        assert!(matches!(&err, ConfigError::NotFound(p) if *p == path));
        assert!(!path.exists());
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [worker]
            install = 2

            [targets]
            enabled = ["apkeep", "revanced-cli"]
            "#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.install_workers(), 2);
        assert_eq!(config.update_workers(), 8);
        assert!(config.is_enabled("apkeep"));
        assert!(!config.is_enabled("apkeditor"));
        assert!(config.path.cache.is_some());
    }

    #[test]
    fn test_load_malformed_file_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[worker\ninstall = ").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::TomlDeError(_))
        ));
    }

    #[test]
    fn test_resolve_rejects_zero_workers() {
        let mut config = Config::default_config();
        config.worker.upgrade = Some(0);
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidWorkerLimit("upgrade"))
        ));
    }

    fn provider(name: &str) -> ProviderConfig {
        ProviderConfig {
            name: name.to_string(),
            kind: None,
            feed: "https://api.github.com/repos/o/r/releases/latest".to_string(),
            asset_pattern: AssetPattern::Any(".*".to_string()),
            version_pattern: None,
            filename: None,
        }
    }

    #[test]
    fn test_resolve_rejects_bad_providers() {
        let mut config = Config::default_config();
        config.providers = vec![provider("tool"), provider("tool")];
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::DuplicateProviderName(_))
        ));

        config.providers = vec![provider("../escape")];
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidProviderName(_))
        ));

        let mut empty = provider("tool");
        empty.asset_pattern = AssetPattern::PerPlatform(Default::default());
        config.providers = vec![empty];
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::EmptyAssetPattern(_))
        ));
    }

    #[test]
    fn test_load_providers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [[providers]]
            name = "my-tool"
            kind = "gitlab"
            feed = "https://gitlab.com/api/v4/projects/1/releases/permalink/latest"
            asset_pattern = '^my-tool$'
            "#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.providers.len(), 1);
        assert_eq!(config.providers[0].kind(), ProviderKind::Gitlab);
    }

    #[test]
    #[serial]
    fn test_path_env_override() {
        with_env(vec![("AVALON_DATA", "/custom/data")], || {
            let config = Config::default_config();
            assert_eq!(
                config.get_data_path().unwrap(),
                PathBuf::from("/custom/data")
            );
        });
    }

    #[test]
    #[serial]
    fn test_paths_expand_variables() {
        with_env(
            vec![("AVALON_TEST_ROOT", "/srv/avalon"), ("AVALON_CACHE", "")],
            || {
                std::env::remove_var("AVALON_CACHE");
                let mut config = Config::default_config();
                config.path.cache = Some("$AVALON_TEST_ROOT/cache".into());
                assert_eq!(
                    config.get_cache_path().unwrap(),
                    PathBuf::from("/srv/avalon/cache")
                );
            },
        );
    }

    #[test]
    fn test_save_targets_preserves_comments() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "# my avalon setup\n[worker]\ninstall = 2 # slow link\n\n[targets]\nenabled = [\"apkeep\"]\n",
        )
        .unwrap();

        let mut config = Config::load_from(&path).unwrap();
        config.targets.enabled.push("revanced-cli".into());
        config.save_targets_to(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("# my avalon setup"));
        assert!(content.contains("install = 2 # slow link"));

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.targets.enabled, vec!["apkeep", "revanced-cli"]);
    }

    #[test]
    fn test_save_targets_creates_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default_config();
        config.targets.enabled = vec!["apkeditor".into()];
        config.save_targets_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.targets.enabled, vec!["apkeditor"]);
    }

    #[test]
    fn test_write_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        write_default_config(&path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("# Worker pool size for each stage."));
        assert!(content.contains("# [[providers]]"));

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.update_workers(), 8);

        assert!(matches!(
            write_default_config(&path),
            Err(ConfigError::ConfigAlreadyExists)
        ));
    }
}
