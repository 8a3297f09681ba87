// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Vault link management.
//!
//! Vaultpost surfaces the content folder of a static-site project inside the
//! user's note vault through one symbolic link. The link lives at
//! `<vault>/<link_name>` and points at `<project_root>/<content_dir>`. The
//! vault side never owns the content; deleting the link must never delete
//! the posts behind it.
//!
//! # Repair Semantics
//!
//! The link manager is idempotent. Running [`LinkManager::ensure`] any number
//! of times with the same settings converges on the same filesystem state,
//! and once the link is correct, further runs perform no mutation at all. A
//! link pointing at a stale target is removed and recreated. Anything at the
//! link path that is *not* a symbolic link is foreign content and is refused,
//! never overwritten.

pub mod fs;

use crate::{
    config::Settings,
    link::fs::{FsError, LinkStat, NativeFs, VaultFs},
};

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::PathBuf,
};
use tracing::{debug, info, instrument, warn};

/// Maintainer of the vault-to-project symbolic link.
#[derive(Debug)]
pub struct LinkManager<F = NativeFs>
where
    F: VaultFs,
{
    vault_root: PathBuf,
    fs: F,
}

impl<F> LinkManager<F>
where
    F: VaultFs,
{
    /// Construct new link manager rooted at target vault.
    pub fn new(vault_root: impl Into<PathBuf>, fs: F) -> Self {
        Self {
            vault_root: vault_root.into(),
            fs,
        }
    }

    /// Establish the vault link, repairing it if it drifted.
    ///
    /// The target directory must already exist; a missing target is reported
    /// as [`LinkOutcome::TargetMissing`] without touching the vault.
    ///
    /// # Errors
    ///
    /// - Return [`LinkError::NameConflict`] if a non-link artifact occupies
    ///   the link path.
    /// - Return [`LinkError::Fs`] if link inspection or mutation fails.
    #[instrument(skip(self, settings), level = "debug")]
    pub fn ensure(&self, settings: &Settings) -> Result<LinkOutcome> {
        let target = settings.target_path();
        if !self.fs.exists(&target) {
            warn!("link target {:?} does not exist", target.display());
            return Ok(LinkOutcome::TargetMissing);
        }

        // INVARIANT: Link targets are canonical absolute paths, so the link
        // resolves no matter where the vault itself sits.
        let target = self.fs.canonicalize(&target)?;
        let link = settings.link_path(&self.vault_root);
        match self.fs.link_stat(&link) {
            LinkStat::Missing => {
                info!("link {:?} -> {:?}", link.display(), target.display());
                self.fs.symlink(&target, &link)?;
                Ok(LinkOutcome::Created)
            }
            LinkStat::Symlink => {
                if self.fs.read_link(&link)? == target {
                    debug!("link {:?} already points at target", link.display());
                    return Ok(LinkOutcome::Unchanged);
                }

                info!("repoint {:?} -> {:?}", link.display(), target.display());
                self.fs.unlink(&link)?;
                self.fs.symlink(&target, &link)?;
                Ok(LinkOutcome::Repointed)
            }
            LinkStat::Other => Err(LinkError::NameConflict { path: link }),
        }
    }

    /// Remove the vault link if one exists.
    ///
    /// Safe to call when nothing was ever linked. A non-link artifact at the
    /// link path is left alone.
    ///
    /// # Errors
    ///
    /// - Return [`LinkError::Fs`] if link removal fails.
    #[instrument(skip(self, settings), level = "debug")]
    pub fn remove(&self, settings: &Settings) -> Result<LinkOutcome> {
        let link = settings.link_path(&self.vault_root);
        match self.fs.link_stat(&link) {
            LinkStat::Symlink => {
                info!("unlink {:?}", link.display());
                self.fs.unlink(&link)?;
                Ok(LinkOutcome::Removed)
            }
            LinkStat::Missing | LinkStat::Other => {
                debug!("no link at {:?}, nothing to remove", link.display());
                Ok(LinkOutcome::NotLinked)
            }
        }
    }
}

/// End state of a link operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// Link was created fresh.
    Created,

    /// Link already pointed at the current target.
    Unchanged,

    /// Link pointed elsewhere and was recreated against the current target.
    Repointed,

    /// Target directory does not exist, so nothing was linked.
    TargetMissing,

    /// Link existed and was removed.
    Removed,

    /// No link existed to remove.
    NotLinked,
}

impl Display for LinkOutcome {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        let message = match self {
            Self::Created => "vault link created",
            Self::Unchanged => "vault link already up to date",
            Self::Repointed => "vault link repointed at new target",
            Self::TargetMissing => "content folder does not exist, nothing linked",
            Self::Removed => "vault link removed",
            Self::NotLinked => "no vault link to remove",
        };

        fmt.write_str(message)
    }
}

/// Link management error types.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Link path occupied by something that is not a symbolic link.
    #[error("name {:?} already in use inside the vault", path.display())]
    NameConflict { path: PathBuf },

    /// Filesystem layer failed.
    #[error(transparent)]
    Fs(#[from] FsError),
}

/// Friendly result alias :3
pub type Result<T, E = LinkError> = std::result::Result<T, E>;
