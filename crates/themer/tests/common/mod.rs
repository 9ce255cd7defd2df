#![allow(dead_code)]

use std::cell::Cell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tempfile::TempDir;
use themer::{Filesystem, LocalFilesystem, ThemerConfig};

/// A themes directory on disk plus a config pointing at it.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> ThemerConfig {
        ThemerConfig::default().with_base_path(self.root())
    }

    /// Creates `themes/{dir}` with a descriptor and the given subdirectories.
    pub fn theme(&self, dir: &str, descriptor: &str, subdirs: &[&str]) -> PathBuf {
        let path = self.root().join("themes").join(dir);
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("theme.json"), descriptor).unwrap();
        for sub in subdirs {
            fs::create_dir_all(path.join(sub)).unwrap();
        }
        path
    }
}

/// Local filesystem that counts mutating calls.
#[derive(Clone, Default)]
pub struct CountingFs {
    pub mutations: Rc<Cell<usize>>,
}

impl CountingFs {
    fn bump(&self) {
        self.mutations.set(self.mutations.get() + 1);
    }
}

impl Filesystem for CountingFs {
    fn exists(&self, path: &Path) -> bool {
        LocalFilesystem.exists(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        LocalFilesystem.is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        LocalFilesystem.is_file(path)
    }

    fn is_symlink(&self, path: &Path) -> bool {
        LocalFilesystem.is_symlink(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        LocalFilesystem.read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        self.bump();
        LocalFilesystem.write(path, contents)
    }

    fn list_dirs(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        LocalFilesystem.list_dirs(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.bump();
        LocalFilesystem.create_dir_all(path)
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        LocalFilesystem.read_link(path)
    }

    fn supports_symlinks(&self) -> bool {
        LocalFilesystem.supports_symlinks()
    }

    fn symlink_dir(&self, target: &Path, link: &Path) -> io::Result<()> {
        self.bump();
        LocalFilesystem.symlink_dir(target, link)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.bump();
        LocalFilesystem.remove_file(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        self.bump();
        LocalFilesystem.remove_dir_all(path)
    }

    fn copy_dir(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.bump();
        LocalFilesystem.copy_dir(from, to)
    }
}
