use std::{
    fs,
    path::{Path, PathBuf},
};

use avalon_utils::{
    fs::{make_executable, safe_remove, symlink_dir},
    path::join_component,
};
use tracing::{debug, warn};

use crate::{
    constants::{LATEST_LINK, TEMP_PREFIX},
    error::{AvalonError, ErrorContext},
    AvalonResult,
};

/// Names the store uses for its own entries next to the version directories.
pub fn is_reserved_name(version: &str) -> bool {
    version == LATEST_LINK || version.starts_with(TEMP_PREFIX)
}

/// Versioned install layout of one target:
///
/// ```text
/// <data_root>/<target>/<version>/<payload>
/// <data_root>/<target>/latest -> <data_root>/<target>/<version>
/// <data_root>/<target>/temp_<version>
/// ```
#[derive(Debug, Clone)]
pub struct TargetStore {
    name: String,
    root: PathBuf,
}

impl TargetStore {
    pub fn new(data_root: &Path, name: &str) -> AvalonResult<Self> {
        let data_root = std::path::absolute(data_root)
            .with_context(|| format!("resolving data root {}", data_root.display()))?;
        let root = join_component(&data_root, name)
            .ok_or_else(|| AvalonError::InvalidTargetName(name.to_string()))?;

        Ok(Self {
            name: name.to_string(),
            root,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `<data_root>/<target>`, the install directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exists(&self) -> bool {
        self.root.exists()
    }

    pub fn version_dir(&self, version: &str) -> AvalonResult<PathBuf> {
        if is_reserved_name(version) {
            return Err(AvalonError::InvalidVersion(version.to_string()));
        }
        join_component(&self.root, version)
            .ok_or_else(|| AvalonError::InvalidVersion(version.to_string()))
    }

    pub fn temp_path(&self, version: &str) -> AvalonResult<PathBuf> {
        join_component(&self.root, &format!("{TEMP_PREFIX}{version}"))
            .ok_or_else(|| AvalonError::InvalidVersion(version.to_string()))
    }

    pub fn latest_path(&self) -> PathBuf {
        self.root.join(LATEST_LINK)
    }

    /// Version the latest pointer resolves to, if it resolves to an existing directory.
    pub fn installed_version(&self) -> Option<String> {
        let latest = self.latest_path();
        if !latest.is_dir() {
            return None;
        }

        fs::read_link(&latest)
            .ok()?
            .file_name()?
            .to_str()
            .map(String::from)
    }

    /// Repoints `latest` at `version_dir`: unlink the old pointer, then link the new one.
    pub fn set_latest(&self, version_dir: &Path) -> AvalonResult<()> {
        let latest = self.latest_path();
        safe_remove(&latest)?;
        symlink_dir(version_dir, &latest)?;
        debug!(name = %self.name, to = %version_dir.display(), "latest pointer updated");
        Ok(())
    }

    /// Installs `version` with the two-phase commit protocol.
    ///
    /// `fetch` writes the complete payload to the temporary file it is given. The
    /// rename of that file into the version directory is the commit point, only then is
    /// the latest pointer moved. A failure before the commit removes the version
    /// directory and temporary file again and leaves `latest` untouched.
    pub fn install<F>(&self, version: &str, filename: &str, fetch: F) -> AvalonResult<PathBuf>
    where
        F: FnOnce(&Path) -> AvalonResult<()>,
    {
        let version_dir = self.version_dir(version)?;
        if version_dir.exists() {
            return Err(AvalonError::AlreadyInstalled {
                target: self.name.clone(),
                version: version.to_string(),
            });
        }
        let temp_path = self.temp_path(version)?;
        let payload = join_component(&version_dir, filename)
            .ok_or_else(|| AvalonError::Custom(format!("Invalid payload file name `{filename}`")))?;

        let created_root = !self.root.exists();
        fs::create_dir_all(&version_dir)
            .with_context(|| format!("creating version directory {}", version_dir.display()))?;

        let staged = safe_remove(&temp_path)
            .map_err(AvalonError::from)
            .and_then(|_| fetch(&temp_path))
            .and_then(|_| {
                fs::rename(&temp_path, &payload).with_context(|| {
                    format!(
                        "moving {} to {}",
                        temp_path.display(),
                        payload.display()
                    )
                })
            });

        if let Err(err) = staged {
            self.discard(&version_dir, &temp_path, created_root);
            return Err(err);
        }

        make_executable(&payload)?;
        self.set_latest(&version_dir)?;

        Ok(payload)
    }

    fn discard(&self, version_dir: &Path, temp_path: &Path, created_root: bool) {
        for path in [temp_path, version_dir] {
            if let Err(err) = safe_remove(path) {
                warn!("Failed to clean up {}: {}", path.display(), err);
            }
        }
        if created_root {
            let _ = fs::remove_dir(&self.root);
        }
    }

    /// Removes the whole target directory: every version and the latest pointer.
    pub fn remove_all(&self) -> AvalonResult<()> {
        safe_remove(&self.root)?;
        Ok(())
    }
}
