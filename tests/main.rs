// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! End-to-end publishing against real repositories.
//!
//! Each test builds a small static-site project repository with a bare
//! sibling acting as its remote, links the content folder into a vault, and
//! drives the real [`Publisher`] + [`Git2Vcs`] pair through the link.

use anyhow::Result;
use git2::{Oid, Repository, RepositoryInitOptions, StatusOptions, StatusShow};
use pretty_assertions::assert_eq;
use sealed_test::prelude::*;
use std::{fs, path::Path};
use vaultpost::{
    Git2Vcs, LinkManager, LinkOutcome, NativeFs, PublishError, PublishReport, Publisher, Settings,
};

/// A static-site project repository with a bare remote next to it.
pub(crate) struct SiteFixture {
    repo: Repository,
}

impl SiteFixture {
    /// Lay out `project/` with one committed post, `remote.git` as origin,
    /// and an empty `vault/`.
    pub(crate) fn create() -> Result<Self> {
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts("project", &opts)?;

        // INVARIANT: Always provide valid name and email.
        //   - Git will complain if this is not set in CI/CD environments.
        let mut config = repo.config()?;
        config.set_str("user.name", "John Doe")?;
        config.set_str("user.email", "john@doe.com")?;

        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        opts.bare(true);
        Repository::init_opts("remote.git", &opts)?;
        let url = fs::canonicalize("remote.git")?;
        repo.remote("origin", url.to_string_lossy().as_ref())?;

        fs::create_dir("vault")?;

        let fixture = Self { repo };
        fixture.stage_and_commit("posts/welcome.md", &valid_post("Welcome"))?;

        Ok(fixture)
    }

    /// Write a file into the work tree, then stage and commit it.
    pub(crate) fn stage_and_commit(&self, filename: &str, contents: &str) -> Result<()> {
        let full_path = Path::new("project").join(filename);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full_path, contents)?;

        // INVARIANT: Always use new tree produced by index after staging.
        let mut index = self.repo.index()?;
        index.add_path(Path::new(filename))?;
        index.write()?;
        let tree_oid = index.write_tree()?;
        let tree = self.repo.find_tree(tree_oid)?;

        // INVARIANT: Always determine latest parent commits to append to.
        let signature = self.repo.signature()?;
        let mut parents = Vec::new();
        if let Some(parent) = self.repo.head().ok().and_then(|head| head.target()) {
            parents.push(self.repo.find_commit(parent)?);
        }
        let parents = parents.iter().collect::<Vec<_>>();

        self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            format!("chore: add {filename:?}").as_ref(),
            &tree,
            &parents,
        )?;

        Ok(())
    }

    pub(crate) fn head_id(&self) -> Result<Oid> {
        Ok(self.repo.head()?.peel_to_commit()?.id())
    }

    pub(crate) fn head_message(&self) -> Result<String> {
        Ok(self
            .repo
            .head()?
            .peel_to_commit()?
            .message()
            .unwrap_or_default()
            .to_string())
    }

    pub(crate) fn staged_count(&self) -> Result<usize> {
        let mut options = StatusOptions::new();
        options.show(StatusShow::Index);
        Ok(self.repo.statuses(Some(&mut options))?.len())
    }
}

/// Tip of the remote's main branch, if it has one.
fn remote_head() -> Result<Option<Oid>> {
    let remote = Repository::open("remote.git")?;
    let head = match remote.find_reference("refs/heads/main") {
        Ok(reference) => Ok(Some(reference.peel_to_commit()?.id())),
        Err(_) => Ok(None),
    };
    head
}

fn valid_post(title: &str) -> String {
    format!(
        "---\ntitle: \"{title}\"\ndescription: \"a post\"\npubDate: \"Jul 08 2022\"\n---\nbody\n"
    )
}

fn settings() -> Settings {
    Settings {
        project_root: "project".into(),
        content_dir: "posts".into(),
        link_name: "Blog".into(),
        publish_secret: "hunter2".into(),
    }
}

fn publisher() -> Result<Publisher> {
    let vcs = Git2Vcs::try_open("project")?;
    Ok(Publisher::new("vault", NativeFs::new(), vcs))
}

#[sealed_test]
fn publish_commits_and_pushes_edits_made_through_the_link() -> Result<()> {
    let fixture = SiteFixture::create()?;
    let manager = LinkManager::new("vault", NativeFs::new());
    assert_eq!(manager.ensure(&settings())?, LinkOutcome::Created);

    // Edit the site from inside the vault.
    fs::write("vault/Blog/second.md", valid_post("Second"))?;

    let before = fixture.head_id()?;
    let report = publisher()?.publish(&settings(), "hunter2")?;

    match report {
        PublishReport::Published { summary, message } => {
            assert_eq!(summary.added, 1);
            assert!(message.starts_with("blog update: "));
        }
        other => panic!("expected publish, got {other:?}"),
    }

    let after = fixture.head_id()?;
    assert_ne!(before, after);
    assert!(fixture.head_message()?.starts_with("blog update: "));
    assert_eq!(remote_head()?, Some(after));

    Ok(())
}

#[sealed_test]
fn publish_without_changes_is_a_no_op() -> Result<()> {
    let fixture = SiteFixture::create()?;
    LinkManager::new("vault", NativeFs::new()).ensure(&settings())?;

    fs::write("vault/Blog/second.md", valid_post("Second"))?;
    publisher()?.publish(&settings(), "hunter2")?;
    let pushed = fixture.head_id()?;

    // Nothing changed since the last publish.
    let report = publisher()?.publish(&settings(), "hunter2")?;
    assert_eq!(report, PublishReport::NoChanges);
    assert_eq!(fixture.head_id()?, pushed);
    assert_eq!(remote_head()?, Some(pushed));

    Ok(())
}

#[sealed_test]
fn invalid_post_blocks_every_repository_operation() -> Result<()> {
    let fixture = SiteFixture::create()?;
    LinkManager::new("vault", NativeFs::new()).ensure(&settings())?;

    fs::write("vault/Blog/second.md", valid_post("Second"))?;
    fs::write("vault/Blog/broken.md", "---\ntitle: \"t\"\n---\nno date\n")?;

    let before = fixture.head_id()?;
    let result = publisher()?.publish(&settings(), "hunter2");

    match result {
        Err(PublishError::Validation { failures }) => {
            assert_eq!(failures.len(), 1);
            assert!(failures[0].path.ends_with("broken.md"));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }

    // The gate is atomic: nothing staged, nothing committed, nothing pushed.
    assert_eq!(fixture.staged_count()?, 0);
    assert_eq!(fixture.head_id()?, before);
    assert_eq!(remote_head()?, None);

    Ok(())
}

#[sealed_test]
fn wrong_secret_never_reaches_the_repository() -> Result<()> {
    let fixture = SiteFixture::create()?;
    LinkManager::new("vault", NativeFs::new()).ensure(&settings())?;
    fs::write("vault/Blog/second.md", valid_post("Second"))?;

    let before = fixture.head_id()?;
    let result = publisher()?.publish(&settings(), "not it");
    assert!(matches!(result, Err(PublishError::WrongSecret)));

    assert_eq!(fixture.staged_count()?, 0);
    assert_eq!(fixture.head_id()?, before);

    Ok(())
}

#[sealed_test]
fn failed_push_leaves_the_commit_local() -> Result<()> {
    let fixture = SiteFixture::create()?;
    LinkManager::new("vault", NativeFs::new()).ensure(&settings())?;

    // Point origin somewhere that does not exist.
    fixture.repo.remote_set_url("origin", "/nowhere/at/all.git")?;
    fs::write("vault/Blog/second.md", valid_post("Second"))?;

    let before = fixture.head_id()?;
    let result = publisher()?.publish(&settings(), "hunter2");
    assert!(matches!(result, Err(PublishError::Vcs(_))));

    // No rollback: the commit exists locally and rides the next attempt.
    assert_ne!(fixture.head_id()?, before);
    assert!(fixture.head_message()?.starts_with("blog update: "));

    Ok(())
}
