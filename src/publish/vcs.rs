// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Version control seam.
//!
//! The publish flow needs exactly four repository operations: stage a
//! pathspec, summarize what is staged, commit, and push. [`Vcs`] models
//! those four and nothing else, with [`Git2Vcs`] providing the libgit2
//! implementation against the static-site project's repository.

use auth_git2::GitAuthenticator;
use git2::{
    Commit, IndexAddOption, PushOptions, RemoteCallbacks, Repository, Status, StatusOptions,
    StatusShow,
};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Counts of index entries staged for the next commit.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StagedSummary {
    pub added: usize,
    pub modified: usize,
    pub deleted: usize,
}

impl StagedSummary {
    /// Whether nothing at all is staged.
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.modified == 0 && self.deleted == 0
    }
}

/// Repository operations the publish flow performs.
pub trait Vcs {
    /// Stage every change matching a pathspec, including deletions.
    fn stage_all(&self, pathspec: &str) -> Result<()>;

    /// Summarize what the index currently stages against HEAD.
    fn staged_summary(&self) -> Result<StagedSummary>;

    /// Commit the staged index to HEAD.
    fn commit(&self, message: &str) -> Result<()>;

    /// Push the current branch to its remote.
    fn push(&self) -> Result<()>;
}

/// Repository access through libgit2.
pub struct Git2Vcs {
    repository: Repository,
}

impl Git2Vcs {
    /// Open the repository at the project root.
    ///
    /// # Errors
    ///
    /// - Return [`VcsError::Git2`] if no repository exists there.
    pub fn try_open(path: impl AsRef<Path>) -> Result<Self> {
        let repository = Repository::open(path.as_ref())?;
        Ok(Self { repository })
    }

    fn head_branch(&self) -> Result<String> {
        let head = self.repository.head()?;
        head.shorthand()
            .filter(|_| head.is_branch())
            .map(ToString::to_string)
            .ok_or(VcsError::NoBranch)
    }
}

impl Vcs for Git2Vcs {
    #[instrument(skip(self), level = "debug")]
    fn stage_all(&self, pathspec: &str) -> Result<()> {
        let mut index = self.repository.index()?;
        index.add_all([pathspec], IndexAddOption::DEFAULT, None)?;
        // INVARIANT: add_all never drops deleted files from the index.
        index.update_all([pathspec], None)?;
        index.write()?;

        Ok(())
    }

    fn staged_summary(&self) -> Result<StagedSummary> {
        let mut options = StatusOptions::new();
        options.show(StatusShow::Index);

        let mut summary = StagedSummary::default();
        for entry in self.repository.statuses(Some(&mut options))?.iter() {
            let status = entry.status();
            if status.intersects(Status::INDEX_NEW) {
                summary.added += 1;
            } else if status.intersects(Status::INDEX_DELETED) {
                summary.deleted += 1;
            } else if status.intersects(
                Status::INDEX_MODIFIED | Status::INDEX_RENAMED | Status::INDEX_TYPECHANGE,
            ) {
                summary.modified += 1;
            }
        }

        debug!(
            "staged: {} added, {} modified, {} deleted",
            summary.added, summary.modified, summary.deleted
        );

        Ok(summary)
    }

    #[instrument(skip(self, message), level = "debug")]
    fn commit(&self, message: &str) -> Result<()> {
        // INVARIANT: Always use new tree produced by index after staging.
        let mut index = self.repository.index()?;
        let tree_oid = index.write_tree()?;
        let tree = self.repository.find_tree(tree_oid)?;

        // INVARIANT: Always determine latest parent commits to append to.
        let signature = self.repository.signature()?;
        let mut parents = Vec::new();
        if let Some(parent) = self.repository.head().ok().and_then(|head| head.target()) {
            parents.push(self.repository.find_commit(parent)?);
        }
        let parents = parents.iter().collect::<Vec<&Commit>>();

        // Writing the commit object directly through libgit2 never invokes
        // gpg signing, regardless of the repository's commit.gpgsign config.
        let oid = self.repository.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;
        info!("committed {oid}");

        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    fn push(&self) -> Result<()> {
        let branch = self.head_branch()?;
        let remote_name = self
            .repository
            .branch_upstream_remote(&format!("refs/heads/{branch}"))
            .ok()
            .and_then(|buf| buf.as_str().map(ToString::to_string))
            .unwrap_or_else(|| "origin".to_string());
        let mut remote = self.repository.find_remote(&remote_name)?;

        let authenticator = GitAuthenticator::default();
        let config = self.repository.config()?;
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(authenticator.credentials(&config));
        let mut options = PushOptions::new();
        options.remote_callbacks(callbacks);

        let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");
        info!("push {refspec} to {remote_name}");
        remote.push(&[refspec.as_str()], Some(&mut options))?;

        Ok(())
    }
}

/// Version control error types.
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    /// Repository HEAD does not point at a local branch.
    #[error("repository HEAD does not point at a branch, cannot publish")]
    NoBranch,

    /// Operations from libgit2 fail.
    #[error(transparent)]
    Git2(#[from] git2::Error),
}

/// Friendly result alias :3
pub type Result<T, E = VcsError> = std::result::Result<T, E>;
