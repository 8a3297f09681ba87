// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine relevent path information for external files that need to be
//! interacted with, or managed in some way.

use std::path::PathBuf;

/// Determine absolute path to the persisted settings file.
///
/// Uses XDG Base Directory path `$XDG_CONFIG_HOME/vaultpost/config.toml` as
/// the default absolute path for settings. Does not check if the path
/// returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
///
/// # See Also
///
/// - [XDG Base Directory](https://wiki.archlinux.org/title/XDG_Base_Directory)
pub fn default_settings_file() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|path| path.join("vaultpost").join("config.toml"))
        .ok_or(NoWayHome)
}

/// Determine absolute path to the vault root.
///
/// The vault is wherever the user keeps their notes. Without an explicit
/// choice, the current working directory is the vault.
///
/// # Errors
///
/// - Return [`NoWayHome`] if the current working directory cannot be
///   determined.
pub fn default_vault_root() -> Result<PathBuf> {
    std::env::current_dir().map_err(|_| NoWayHome)
}

/// No way to determine user's home directory.
///
/// # See Also
///
/// - [`dirs::home_dir`](https://docs.rs/dirs/latest/dirs/fn.home_dir.html)
#[derive(Clone, Debug, thiserror::Error)]
#[error("cannot determine absolute path to user's home directory")]
pub struct NoWayHome;

/// Friendly result alias :3
pub type Result<T, E = NoWayHome> = std::result::Result<T, E>;
