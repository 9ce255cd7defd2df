//! Filesystem abstraction used by discovery, resolution and asset publishing.
//!
//! The core never touches `std::fs` directly outside of [`LocalFilesystem`], so
//! hosts can substitute virtual or instrumented filesystems.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The filesystem operations the core needs.
pub trait Filesystem {
    /// True if anything (file, directory or symlink target) exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// True if `path` is a directory (following symlinks).
    fn is_dir(&self, path: &Path) -> bool;

    /// True if `path` is a regular file (following symlinks).
    fn is_file(&self, path: &Path) -> bool;

    /// True if `path` itself is a symbolic link.
    fn is_symlink(&self, path: &Path) -> bool;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Immediate subdirectories of `path`, sorted by path.
    fn list_dirs(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Target of the symlink at `path`.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;

    /// Whether [`Filesystem::symlink_dir`] is available on this platform.
    fn supports_symlinks(&self) -> bool;

    /// Creates a directory symlink at `link` pointing to `target`.
    fn symlink_dir(&self, target: &Path, link: &Path) -> io::Result<()>;

    /// Removes a file or a symlink.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Recursively copies `from` into `to`, overwriting existing files.
    fn copy_dir(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// [`Filesystem`] backed by the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl Filesystem for LocalFilesystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists() || self.is_symlink(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        fs::symlink_metadata(path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn list_dirs(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry_path = entry?.path();
            if entry_path.is_dir() {
                dirs.push(entry_path);
            }
        }
        dirs.sort();
        Ok(dirs)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        fs::read_link(path)
    }

    fn supports_symlinks(&self) -> bool {
        cfg!(any(unix, windows))
    }

    #[cfg(unix)]
    fn symlink_dir(&self, target: &Path, link: &Path) -> io::Result<()> {
        std::os::unix::fs::symlink(target, link)
    }

    #[cfg(windows)]
    fn symlink_dir(&self, target: &Path, link: &Path) -> io::Result<()> {
        std::os::windows::fs::symlink_dir(target, link)
    }

    #[cfg(not(any(unix, windows)))]
    fn symlink_dir(&self, _target: &Path, _link: &Path) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "symlinks are not supported on this platform",
        ))
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }

    fn copy_dir(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::create_dir_all(to)?;
        for entry in fs::read_dir(from)? {
            let entry = entry?;
            let source = entry.path();
            let dest = to.join(entry.file_name());
            if source.is_dir() {
                self.copy_dir(&source, &dest)?;
            } else {
                fs::copy(&source, &dest)?;
            }
        }
        Ok(())
    }
}
