use std::{
    fs::{self, File},
    io::{Read, Write},
    path::{Path, PathBuf},
};

use crate::error::{FileSystemError, FileSystemResult};

const ELF_MAGIC_BYTES: [u8; 4] = [0x7f, 0x45, 0x4c, 0x46];

pub trait FileSystemProvider {
    /// Removes the specified file, directory or symlink safely.
    ///
    /// A missing path is not an error. Directories are removed recursively. A symlink is removed
    /// itself and never followed, so removing a `latest` pointer leaves its target untouched.
    ///
    /// # Errors
    ///
    /// Returns a [`FileSystemError::File`] if the removal fails for any reason other than
    /// the path not existing.
    fn safe_remove<P: AsRef<Path>>(&self, path: P) -> FileSystemResult<()>;

    /// Creates a directory structure if it doesn't exist.
    ///
    /// # Errors
    ///
    /// * [`FileSystemError::Directory`] if the directory could not be created.
    /// * [`FileSystemError::NotADirectory`] if the path exists but is not a directory.
    fn ensure_dir_exists<P: AsRef<Path>>(&self, path: P) -> FileSystemResult<()>;

    /// Replaces the content of `path` by writing a sibling `<path>.tmp` first and renaming it
    /// over the destination. Readers never observe a half-written file.
    fn write_atomic<P: AsRef<Path>>(&self, path: P, contents: &[u8]) -> FileSystemResult<()>;
}

#[derive(Default, Clone)]
pub struct StandardFileSystemProvider;

impl FileSystemProvider for StandardFileSystemProvider {
    fn safe_remove<P: AsRef<Path>>(&self, path: P) -> FileSystemResult<()> {
        let path = path.as_ref();

        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => {
                return Err(FileSystemError::File {
                    path: path.to_path_buf(),
                    action: "inspect",
                    source: err,
                })
            }
        };

        let result = if metadata.is_dir() {
            fs::remove_dir_all(path)
        } else {
            remove_link_or_file(path)
        };

        result.map_err(|err| FileSystemError::File {
            path: path.to_path_buf(),
            action: "remove",
            source: err,
        })
    }

    fn ensure_dir_exists<P: AsRef<Path>>(&self, path: P) -> FileSystemResult<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path).map_err(|err| FileSystemError::Directory {
                path: path.to_path_buf(),
                action: "create",
                source: err,
            })?;
        } else if !path.is_dir() {
            return Err(FileSystemError::NotADirectory {
                path: path.to_path_buf(),
            });
        }

        Ok(())
    }

    fn write_atomic<P: AsRef<Path>>(&self, path: P, contents: &[u8]) -> FileSystemResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.ensure_dir_exists(parent)?;
        }

        let tmp_path = tmp_sibling(path);
        let write = || -> std::io::Result<()> {
            let mut file = File::create(&tmp_path)?;
            file.write_all(contents)?;
            file.sync_all()?;
            fs::rename(&tmp_path, path)
        };

        write().map_err(|err| {
            let _ = fs::remove_file(&tmp_path);
            FileSystemError::File {
                path: path.to_path_buf(),
                action: "write",
                source: err,
            }
        })
    }
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

// Windows directory symlinks must be removed with `remove_dir`.
fn remove_link_or_file(path: &Path) -> std::io::Result<()> {
    #[cfg(windows)]
    {
        if fs::remove_file(path).is_err() {
            return fs::remove_dir(path);
        }
        Ok(())
    }

    #[cfg(not(windows))]
    {
        fs::remove_file(path)
    }
}

/// Creates a directory symlink at `link` pointing to `target`.
pub fn symlink_dir<P: AsRef<Path>, Q: AsRef<Path>>(target: P, link: Q) -> FileSystemResult<()> {
    let (target, link) = (target.as_ref(), link.as_ref());

    #[cfg(unix)]
    let result = std::os::unix::fs::symlink(target, link);
    #[cfg(windows)]
    let result = std::os::windows::fs::symlink_dir(target, link);

    result.map_err(|err| FileSystemError::Symlink {
        link: link.to_path_buf(),
        target: target.to_path_buf(),
        source: err,
    })
}

/// Checks whether the file at `path` starts with the ELF magic bytes.
pub fn is_elf<P: AsRef<Path>>(path: P) -> bool {
    let mut magic = [0u8; 4];
    File::open(path)
        .and_then(|mut file| file.read_exact(&mut magic))
        .is_ok_and(|_| magic == ELF_MAGIC_BYTES)
}

/// Marks an ELF payload as executable (0755). A no-op for anything else.
pub fn make_executable<P: AsRef<Path>>(path: P) -> FileSystemResult<()> {
    let path = path.as_ref();

    #[cfg(unix)]
    if is_elf(path) {
        use std::os::unix::fs::PermissionsExt as _;

        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(|err| {
            FileSystemError::File {
                path: path.to_path_buf(),
                action: "set permissions on",
                source: err,
            }
        })?;
    }

    #[cfg(not(unix))]
    let _ = path;

    Ok(())
}

/// Creates a directory structure if it doesn't exist.
///
/// See [`FileSystemProvider::ensure_dir_exists`].
pub fn ensure_dir_exists<P: AsRef<Path>>(path: P) -> FileSystemResult<()> {
    StandardFileSystemProvider.ensure_dir_exists(path)
}

/// Removes the specified file, directory or symlink safely.
///
/// See [`FileSystemProvider::safe_remove`].
pub fn safe_remove<P: AsRef<Path>>(path: P) -> FileSystemResult<()> {
    StandardFileSystemProvider.safe_remove(path)
}

/// Atomically replaces the content of `path`.
///
/// See [`FileSystemProvider::write_atomic`].
pub fn write_atomic<P: AsRef<Path>>(path: P, contents: &[u8]) -> FileSystemResult<()> {
    StandardFileSystemProvider.write_atomic(path, contents)
}
