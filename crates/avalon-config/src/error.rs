use avalon_utils::error::{FileSystemError, PathError, UtilsError};
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(avalon_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(avalon_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Config file not found: {}", .0.display())]
    #[diagnostic(
        code(avalon_config::not_found),
        help("Run `avalon defconfig` to create one, or pass an existing file with --config")
    )]
    NotFound(std::path::PathBuf),

    #[error("Configuration file already exists")]
    #[diagnostic(
        code(avalon_config::already_exists),
        help("Remove the existing config file or use a different location")
    )]
    ConfigAlreadyExists,

    #[error("Worker limit for `{0}` must be at least 1")]
    #[diagnostic(
        code(avalon_config::invalid_worker_limit),
        help("Set a positive number under [worker] in your config file")
    )]
    InvalidWorkerLimit(&'static str),

    #[error("Invalid provider name: `{0}`")]
    #[diagnostic(
        code(avalon_config::invalid_provider_name),
        help("Provider names must be a single path component, e.g. `my-tool`")
    )]
    InvalidProviderName(String),

    #[error("Duplicate provider name: {0}")]
    #[diagnostic(
        code(avalon_config::duplicate_provider),
        help("Each [[providers]] entry must have a unique name")
    )]
    DuplicateProviderName(String),

    #[error("Provider `{0}` has an empty asset pattern table")]
    #[diagnostic(
        code(avalon_config::empty_asset_pattern),
        help("Add at least one `<arch>-<Os>` key, e.g. `x86_64-Linux`")
    )]
    EmptyAssetPattern(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(avalon_config::io))]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(avalon_config::utils))]
    Utils(#[from] UtilsError),

    #[error("Failed to parse TOML: {0}")]
    #[diagnostic(code(avalon_config::toml))]
    Toml(#[from] toml_edit::TomlError),

    #[error("Encountered unexpected TOML item: {0}")]
    #[diagnostic(code(avalon_config::unexpected_toml_item))]
    UnexpectedTomlItem(String),

    #[error("Failed to annotate first table in array: {0}")]
    #[diagnostic(code(avalon_config::annotate_first_table))]
    AnnotateFirstTable(String),
}

impl From<PathError> for ConfigError {
    fn from(err: PathError) -> Self {
        Self::Utils(UtilsError::Path(err))
    }
}

impl From<FileSystemError> for ConfigError {
    fn from(err: FileSystemError) -> Self {
        Self::Utils(UtilsError::FileSystem(err))
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
