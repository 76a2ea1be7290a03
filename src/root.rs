//! Output root confinement.
//!
//! Every file the generator writes goes through an [`OutputRoot`]. Paths are
//! relative to the root and may not leave it: parent components, absolute
//! paths and symlinks pointing outside the root are rejected.

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RootError {
    #[error("path escapes the output root: {}", .0.display())]
    Escape(PathBuf),
    #[error("{}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

/// A directory that writes are confined to.
#[derive(Debug, Clone)]
pub struct OutputRoot {
    root: PathBuf,
}

impl OutputRoot {
    /// Open an existing directory as an output root.
    pub fn open(dir: &Path) -> Result<Self, RootError> {
        let root = dir.canonicalize().map_err(|source| RootError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Join a relative path onto the root, rejecting anything that could escape.
    pub fn resolve(&self, rel: &Path) -> Result<PathBuf, RootError> {
        let mut out = self.root.clone();
        for component in rel.components() {
            match component {
                Component::Normal(part) => out.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(RootError::Escape(rel.to_path_buf()));
                }
            }
        }
        Ok(out)
    }

    /// Create a directory and its parents inside the root.
    pub fn create_dir_all(&self, rel: &Path) -> Result<PathBuf, RootError> {
        let dir = self.resolve(rel)?;
        fs::create_dir_all(&dir).map_err(|source| RootError::Io {
            path: dir.clone(),
            source,
        })?;
        self.confirm_inside(&dir, rel)?;
        Ok(dir)
    }

    /// Create (or truncate) a file inside the root, creating its parent directories.
    pub fn create_file(&self, rel: &Path) -> Result<File, RootError> {
        let path = self.prepare_file(rel)?;
        File::create(&path).map_err(|source| RootError::Io { path, source })
    }

    /// Resolve a file path for writing: parent directories are created and
    /// confirmed inside the root, and an existing symlink at the path itself
    /// is rejected.
    pub fn prepare_file(&self, rel: &Path) -> Result<PathBuf, RootError> {
        let path = self.resolve(rel)?;
        if let Some(parent) = rel.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.create_dir_all(parent)?;
        }
        match fs::symlink_metadata(&path) {
            Ok(meta) if meta.file_type().is_symlink() => Err(RootError::Escape(rel.to_path_buf())),
            Ok(_) => Ok(path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(path),
            Err(source) => Err(RootError::Io { path, source }),
        }
    }

    // A symlinked directory inside the root may still point outside it.
    fn confirm_inside(&self, dir: &Path, rel: &Path) -> Result<(), RootError> {
        let real = dir.canonicalize().map_err(|source| RootError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        if real.starts_with(&self.root) {
            Ok(())
        } else {
            Err(RootError::Escape(rel.to_path_buf()))
        }
    }
}
