// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use vaultpost::{
    check_posts, path, Git2Vcs, LinkManager, NativeFs, PublishError, Publisher, Settings,
    SettingsStore,
};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use inquire::Password;
use std::{path::PathBuf, process::exit};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "\n  vaultpost [options] <command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Vault root to operate in [default: current directory].
    #[arg(long, global = true, value_name = "path")]
    vault: Option<PathBuf>,

    /// Settings file to use [default: $XDG_CONFIG_HOME/vaultpost/config.toml].
    #[arg(long, global = true, value_name = "path")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        let context = Context::load(self.config, self.vault)?;
        match self.command {
            Command::Link => run_link(context),
            Command::Unlink => run_unlink(context),
            Command::Publish(opts) => run_publish(context, opts),
            Command::Check => run_check(context),
            Command::Set(opts) => run_set(context, opts),
            Command::Show => run_show(context),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Establish the vault link to the project's content folder.
    #[command(override_usage = "vaultpost link [options]")]
    Link,

    /// Remove the vault link, leaving the content folder alone.
    #[command(override_usage = "vaultpost unlink [options]")]
    Unlink,

    /// Update blog to most recent changes.
    #[command(override_usage = "vaultpost publish [options]")]
    Publish(PublishOptions),

    /// Validate post frontmatter without publishing anything.
    #[command(override_usage = "vaultpost check [options]")]
    Check,

    /// Change one settings field and persist it.
    #[command(override_usage = "vaultpost set [options] <key> <value>")]
    Set(SetOptions),

    /// Print the current settings.
    #[command(override_usage = "vaultpost show [options]")]
    Show,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct PublishOptions {
    /// Secret to publish with, instead of prompting for one.
    #[arg(short, long, value_name = "secret")]
    pub secret: Option<String>,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct SetOptions {
    #[arg(value_name = "key")]
    pub key: SettingKey,

    #[arg(value_name = "value")]
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SettingKey {
    ProjectRoot,
    ContentDir,
    LinkName,
    PublishSecret,
}

fn main() {
    let layer = fmt::layer().compact();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry().with(layer).with(filter).init();

    if let Err(error) = run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

/// Everything a subcommand needs: settings, their store, and the vault root.
struct Context {
    settings: Settings,
    store: SettingsStore,
    vault_root: PathBuf,
}

impl Context {
    fn load(config: Option<PathBuf>, vault: Option<PathBuf>) -> Result<Self> {
        let file_path = match config {
            Some(path) => path,
            None => path::default_settings_file()?,
        };
        let vault_root = match vault {
            Some(path) => path,
            None => path::default_vault_root()?,
        };

        let store = SettingsStore::new(file_path);
        let settings = store.load()?;

        Ok(Self {
            settings,
            store,
            vault_root,
        })
    }
}

fn run_link(context: Context) -> Result<()> {
    context.settings.ensure_complete()?;
    let manager = LinkManager::new(&context.vault_root, NativeFs::new());
    println!("{}", manager.ensure(&context.settings)?);

    Ok(())
}

fn run_unlink(context: Context) -> Result<()> {
    let manager = LinkManager::new(&context.vault_root, NativeFs::new());
    println!("{}", manager.remove(&context.settings)?);

    Ok(())
}

fn run_publish(context: Context, opts: PublishOptions) -> Result<()> {
    context.settings.ensure_complete()?;

    let secret = match opts.secret {
        Some(secret) => secret,
        None => Password::new("secret").without_confirmation().prompt()?,
    };

    let vcs = Git2Vcs::try_open(&context.settings.project_root)?;
    let publisher = Publisher::new(&context.vault_root, NativeFs::new(), vcs);
    match publisher.publish(&context.settings, &secret) {
        Ok(report) => println!("{report}"),
        Err(PublishError::Validation { failures }) => {
            for failure in &failures {
                eprintln!("{failure}");
            }
            bail!("{} post(s) failed validation, nothing was published", failures.len());
        }
        Err(error) => return Err(error.into()),
    }

    Ok(())
}

fn run_check(context: Context) -> Result<()> {
    context.settings.ensure_complete()?;

    let failures = check_posts(&NativeFs::new(), &context.vault_root, &context.settings)?;
    if failures.is_empty() {
        println!("all posts valid");
        return Ok(());
    }

    for failure in &failures {
        eprintln!("{failure}");
    }
    bail!("{} post(s) failed validation", failures.len());
}

fn run_set(context: Context, opts: SetOptions) -> Result<()> {
    let previous = context.settings.clone();

    let mut draft = context.settings;
    match opts.key {
        SettingKey::ProjectRoot => draft.project_root = opts.value.into(),
        SettingKey::ContentDir => draft.content_dir = opts.value.into(),
        SettingKey::LinkName => draft.link_name = opts.value,
        SettingKey::PublishSecret => draft.publish_secret = opts.value,
    }

    // Round-trip through the parser so edits obey the same invariants as a
    // hand-written settings file.
    let settings: Settings = draft.to_string().parse()?;
    context.store.save(&settings)?;

    // A new target or link name invalidates the old link, so take it down
    // before re-establishing against the new settings.
    let target_moved =
        settings.target_path() != previous.target_path() || settings.link_name != previous.link_name;
    if target_moved && settings.ensure_complete().is_ok() {
        let manager = LinkManager::new(&context.vault_root, NativeFs::new());
        if !previous.link_name.is_empty() {
            manager.remove(&previous)?;
        }
        println!("{}", manager.ensure(&settings)?);
    }

    Ok(())
}

fn run_show(context: Context) -> Result<()> {
    let settings = &context.settings;
    println!("project_root = {:?}", settings.project_root.display());
    println!("content_dir = {:?}", settings.content_dir.display());
    println!("link_name = {:?}", settings.link_name);
    println!(
        "publish_secret = {}",
        if settings.publish_secret.is_empty() {
            "(unset)"
        } else {
            "(set)"
        }
    );

    Ok(())
}
