// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Link a static-site content folder into a note vault, and publish it
//! through the project's git repository.
//!
//! # How It Fits Together
//!
//! A vault is just a directory of notes. Somewhere else on disk lives a
//! static-site project whose content folder holds blog posts. Vaultpost
//! bridges the two with a single symbolic link, so posts can be edited from
//! inside the vault, and ships edits with one secret-gated command that
//! validates every post's frontmatter before staging, committing, and
//! pushing the content folder.
//!
//! Two components do the work, sharing nothing but the persisted
//! [`Settings`] record:
//!
//! 1. [`LinkManager`] creates and repairs the vault link, idempotently, and
//!    never overwrites anything that is not a symbolic link.
//! 2. [`Publisher`] runs the secret gate, the frontmatter validation gate,
//!    and the stage → commit → push sequence, stopping at the first failure.

pub mod config;
pub mod link;
pub mod path;
pub mod post;
pub mod publish;

pub use config::{ConfigError, Settings, SettingsStore};
pub use link::{
    fs::{NativeFs, VaultFs},
    LinkError, LinkManager, LinkOutcome,
};
pub use publish::{
    check_posts,
    vcs::{Git2Vcs, Vcs},
    PostIssues, PublishError, PublishReport, Publisher,
};
