// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Filesystem capability seam.
//!
//! The link manager and publish flow only ever need a handful of filesystem
//! operations. Routing them through [`VaultFs`] keeps the host filesystem
//! behind a seam that tests can reach through without scattering `std::fs`
//! calls across the domain logic.

use std::{
    fs::{canonicalize, read_dir, read_link, read_to_string, remove_file, symlink_metadata},
    path::{Path, PathBuf},
};

/// What currently occupies a link path.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum LinkStat {
    /// Nothing exists at the path.
    #[default]
    Missing,

    /// A symbolic link exists at the path.
    Symlink,

    /// Something that is not a symbolic link exists at the path.
    Other,
}

/// Filesystem operations the vault side of the system is allowed to perform.
pub trait VaultFs {
    /// Check that a path exists, following symbolic links.
    fn exists(&self, path: &Path) -> bool;

    /// Classify what occupies a path without following symbolic links.
    fn link_stat(&self, path: &Path) -> LinkStat;

    /// Resolve a path to its canonical absolute form.
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;

    /// Read the target of a symbolic link.
    fn read_link(&self, path: &Path) -> Result<PathBuf>;

    /// Create a symbolic link at `link` pointing to `target`.
    fn symlink(&self, target: &Path, link: &Path) -> Result<()>;

    /// Remove a symbolic link.
    fn unlink(&self, path: &Path) -> Result<()>;

    /// List regular files reachable under a path, recursively.
    ///
    /// Hidden entries are skipped. The returned paths are absolute and
    /// sorted, so enumeration order is stable across runs.
    fn list_files(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Read the entire contents of a file as UTF-8 text.
    fn read_file(&self, path: &Path) -> Result<String>;
}

/// Native [`VaultFs`] backed by `std::fs`.
#[derive(Debug, Default, Clone)]
pub struct NativeFs;

impl NativeFs {
    /// Construct new native filesystem handle.
    pub fn new() -> Self {
        Self
    }
}

impl VaultFs for NativeFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn link_stat(&self, path: &Path) -> LinkStat {
        match symlink_metadata(path) {
            Ok(metadata) if metadata.file_type().is_symlink() => LinkStat::Symlink,
            Ok(_) => LinkStat::Other,
            Err(_) => LinkStat::Missing,
        }
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        canonicalize(path).map_err(|err| FsError::Resolve {
            source: err,
            path: path.to_path_buf(),
        })
    }

    fn read_link(&self, path: &Path) -> Result<PathBuf> {
        read_link(path).map_err(|err| FsError::ReadLink {
            source: err,
            path: path.to_path_buf(),
        })
    }

    fn symlink(&self, target: &Path, link: &Path) -> Result<()> {
        platform_symlink(target, link).map_err(|err| FsError::CreateLink {
            source: err,
            path: link.to_path_buf(),
        })
    }

    fn unlink(&self, path: &Path) -> Result<()> {
        remove_file(path).map_err(|err| FsError::RemoveLink {
            source: err,
            path: path.to_path_buf(),
        })
    }

    fn list_files(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        collect_files(path, &mut entries)?;
        entries.sort();

        Ok(entries)
    }

    fn read_file(&self, path: &Path) -> Result<String> {
        read_to_string(path).map_err(|err| FsError::ReadFile {
            source: err,
            path: path.to_path_buf(),
        })
    }
}

fn collect_files(root: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = read_dir(root).map_err(|err| FsError::ListDir {
        source: err,
        path: root.to_path_buf(),
    })?;

    for entry in entries {
        let entry = entry.map_err(|err| FsError::ListDir {
            source: err,
            path: root.to_path_buf(),
        })?;

        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }

        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }

    Ok(())
}

#[cfg(unix)]
fn platform_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}
#[cfg(windows)]
fn platform_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

/// Filesystem seam error types.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// Symbolic link cannot be created.
    #[error("failed to create link at {:?}", path.display())]
    CreateLink {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Symbolic link cannot be removed.
    #[error("failed to remove link at {:?}", path.display())]
    RemoveLink {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Symbolic link target cannot be read.
    #[error("failed to read link target of {:?}", path.display())]
    ReadLink {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Path cannot be resolved to canonical form.
    #[error("failed to resolve {:?}", path.display())]
    Resolve {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Directory contents cannot be listed.
    #[error("failed to list files under {:?}", path.display())]
    ListDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// File contents cannot be read.
    #[error("failed to read file at {:?}", path.display())]
    ReadFile {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = FsError> = std::result::Result<T, E>;
