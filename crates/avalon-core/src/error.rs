//! Error types for avalon-core.

use std::path::PathBuf;

use avalon_config::error::ConfigError;
use avalon_dl::error::DownloadError;
use avalon_events::Stage;
use avalon_utils::error::{FileSystemError, PathError, UtilsError};
use miette::Diagnostic;
use thiserror::Error;

/// Core error type for avalon operations.
#[derive(Error, Diagnostic, Debug)]
pub enum AvalonError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    #[diagnostic(
        code(avalon::fs),
        help("Check file permissions and disk space")
    )]
    FileSystem(#[from] FileSystemError),

    #[error(transparent)]
    #[diagnostic(code(avalon::path))]
    Path(#[from] PathError),

    #[error("Error while {action}")]
    #[diagnostic(code(avalon::io), help("Check file permissions and disk space"))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache document {path} is not valid JSON")]
    #[diagnostic(
        code(avalon::cache),
        help("Delete the file and run `avalon update` to rebuild it")
    )]
    Cache {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(avalon::regex), help("Check your regex pattern syntax"))]
    Regex(#[from] regex::Error),

    #[error("{stage} failed for {target}")]
    #[diagnostic(code(avalon::task))]
    Task {
        target: String,
        stage: Stage,
        #[source]
        source: Box<AvalonError>,
    },

    #[error("Cache of {target} has no `{key}`")]
    #[diagnostic(
        code(avalon::missing_cache_key),
        help("Run `avalon update {target}` first")
    )]
    MissingCacheKey { target: String, key: &'static str },

    #[error("{target} {version} is already installed")]
    #[diagnostic(
        code(avalon::already_installed),
        help("Use `avalon upgrade` to move to a newer version")
    )]
    AlreadyInstalled { target: String, version: String },

    #[error("{target} has no asset for platform {platform}")]
    #[diagnostic(
        code(avalon::unsupported_platform),
        help("Add an `asset_pattern` entry for {platform} to the provider")
    )]
    UnsupportedPlatform { target: String, platform: String },

    #[error("No version found in tag `{tag}` using `{pattern}`")]
    #[diagnostic(code(avalon::no_version_match))]
    NoVersionMatch { tag: String, pattern: String },

    #[error("Invalid version `{0}`")]
    #[diagnostic(
        code(avalon::invalid_version),
        help("Versions become directory names and must be a single path component")
    )]
    InvalidVersion(String),

    #[error("Invalid target name `{0}`")]
    #[diagnostic(code(avalon::invalid_target))]
    InvalidTargetName(String),

    #[error("Provider `{0}` is defined more than once")]
    #[diagnostic(
        code(avalon::duplicate_target),
        help("Rename the [[providers]] entry, built-in names are reserved")
    )]
    DuplicateTarget(String),

    #[error("Task worker panicked: {0}")]
    #[diagnostic(code(avalon::worker_panic), help("This is a bug, please report it"))]
    WorkerPanic(String),

    #[error("{0}")]
    #[diagnostic(code(avalon::error))]
    Custom(String),
}

impl AvalonError {
    /// Wraps `self` with the target and stage it happened in. Already wrapped errors are kept.
    pub fn in_task(self, target: &str, stage: Stage) -> Self {
        match self {
            task @ AvalonError::Task {
                ..
            } => task,
            other => {
                AvalonError::Task {
                    target: target.to_string(),
                    stage,
                    source: Box::new(other),
                }
            }
        }
    }

    /// The error without any task wrapping.
    pub fn root(&self) -> &AvalonError {
        match self {
            AvalonError::Task {
                source, ..
            } => source.root(),
            other => other,
        }
    }
}

impl From<UtilsError> for AvalonError {
    fn from(err: UtilsError) -> Self {
        match err {
            UtilsError::Path(err) => Self::Path(err),
            UtilsError::FileSystem(err) => Self::FileSystem(err),
        }
    }
}

/// Trait for adding context to IO errors.
pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, AvalonError>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, AvalonError>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            AvalonError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}
