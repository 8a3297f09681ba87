// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Secret-gated publish flow.
//!
//! Publishing walks a fixed sequence: authenticate the caller-supplied
//! secret, validate every post reachable under the vault link, then stage,
//! commit, and push the content folder through the project's repository. The
//! first failure stops the sequence; nothing that already happened is rolled
//! back. A commit whose push failed stays local and simply rides along on
//! the next attempt.
//!
//! # Gating Rules
//!
//! The secret must match the configured one exactly, and an empty secret is
//! always refused, even when the configured secret is itself empty. The
//! validation gate is atomic: if any single post fails, zero repository
//! operations happen for that attempt.
//!
//! Exactly one attempt may run at a time. The entry point is guarded by an
//! in-flight flag, and a second trigger while one attempt is active is
//! refused with [`PublishError::Busy`].

pub mod vcs;

use crate::{
    config::Settings,
    link::fs::{FsError, NativeFs, VaultFs},
    post::{self, FieldIssue},
    publish::vcs::{Git2Vcs, StagedSummary, Vcs, VcsError},
};

use chrono::Local;
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};
use tracing::{debug, info, instrument};

/// Driver of the validate, stage, commit, push sequence.
pub struct Publisher<F = NativeFs, V = Git2Vcs>
where
    F: VaultFs,
    V: Vcs,
{
    vault_root: PathBuf,
    fs: F,
    vcs: V,
    in_flight: AtomicBool,
}

impl<F, V> Publisher<F, V>
where
    F: VaultFs,
    V: Vcs,
{
    /// Construct new publisher rooted at target vault.
    pub fn new(vault_root: impl Into<PathBuf>, fs: F, vcs: V) -> Self {
        Self {
            vault_root: vault_root.into(),
            fs,
            vcs,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Run one publish attempt.
    ///
    /// # Errors
    ///
    /// - Return [`PublishError::Busy`] if another attempt is in flight.
    /// - Return [`PublishError::WrongSecret`] if the secret does not match.
    /// - Return [`PublishError::Validation`] if any post fails validation.
    /// - Return [`PublishError::Fs`] if posts cannot be enumerated or read.
    /// - Return [`PublishError::Vcs`] if staging, commit, or push fails.
    #[instrument(skip(self, settings, secret), level = "debug")]
    pub fn publish(&self, settings: &Settings, secret: &str) -> Result<PublishReport> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(PublishError::Busy);
        }
        let _guard = InFlightGuard(&self.in_flight);

        // INVARIANT: Empty input never matches, even an empty secret.
        if secret.is_empty() || secret != settings.publish_secret {
            return Err(PublishError::WrongSecret);
        }

        self.validate_posts(settings)?;

        let pathspec = settings.content_dir.to_string_lossy().into_owned();
        self.vcs.stage_all(&pathspec)?;

        let summary = self.vcs.staged_summary()?;
        if summary.is_empty() {
            info!("nothing staged under {pathspec:?}, publish is a no-op");
            return Ok(PublishReport::NoChanges);
        }

        let message = format!("blog update: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
        self.vcs.commit(&message)?;
        self.vcs.push()?;

        Ok(PublishReport::Published { summary, message })
    }

    /// Validate every post reachable under the vault link.
    fn validate_posts(&self, settings: &Settings) -> Result<()> {
        let failures = check_posts(&self.fs, &self.vault_root, settings)?;
        if !failures.is_empty() {
            return Err(PublishError::Validation { failures });
        }

        Ok(())
    }
}

/// Validate every post reachable under the vault link, without publishing.
///
/// Returns the per-post failure listing; an empty listing means every post
/// conforms to the schema.
///
/// # Errors
///
/// - Return [`PublishError::Fs`] if posts cannot be enumerated or read.
pub fn check_posts(
    fs: &impl VaultFs,
    vault_root: impl AsRef<Path>,
    settings: &Settings,
) -> Result<Vec<PostIssues>> {
    let link = settings.link_path(vault_root.as_ref());
    let mut failures = Vec::new();

    for path in fs.list_files(&link)? {
        if path.extension().and_then(|ext| ext.to_str()) != Some("md") {
            continue;
        }

        debug!("validate {:?}", path.display());
        let issues = post::validate(&fs.read_file(&path)?);
        if !issues.is_empty() {
            failures.push(PostIssues { path, issues });
        }
    }

    Ok(failures)
}

/// Clears the in-flight flag once an attempt ends, however it ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Successful end state of a publish attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishReport {
    /// Changes were committed and pushed.
    Published {
        summary: StagedSummary,
        message: String,
    },

    /// Nothing was staged; publishing with no changes is success, not error.
    NoChanges,
}

impl Display for PublishReport {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Published { summary, message } => write!(
                fmt,
                "published {:?} ({} added, {} modified, {} deleted)",
                message, summary.added, summary.modified, summary.deleted
            ),
            Self::NoChanges => fmt.write_str("no changes to publish"),
        }
    }
}

/// Validation failures for one post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostIssues {
    /// Path of the offending post.
    pub path: PathBuf,

    /// Field-level issues found in it.
    pub issues: Vec<FieldIssue>,
}

impl Display for PostIssues {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(fmt, "{}:", self.path.display())?;
        for issue in &self.issues {
            write!(fmt, "\n  {issue}")?;
        }

        Ok(())
    }
}

/// Publish flow error types.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Another publish attempt is already running.
    #[error("a publish attempt is already in flight")]
    Busy,

    /// Caller-supplied secret did not match the configured one.
    #[error("wrong secret, publish refused")]
    WrongSecret,

    /// One or more posts failed frontmatter validation.
    #[error("{} post(s) failed validation", failures.len())]
    Validation { failures: Vec<PostIssues> },

    /// Posts could not be enumerated or read.
    #[error(transparent)]
    Fs(#[from] FsError),

    /// Staging, commit, or push failed.
    #[error(transparent)]
    Vcs(#[from] VcsError),
}

/// Friendly result alias :3
pub type Result<T, E = PublishError> = std::result::Result<T, E>;
