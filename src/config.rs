// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the settings file that Vaultpost uses to remember
//! which static-site project it is wired up to. The settings record is the
//! only state shared between the link manager and the publish flow. It is
//! loaded once at startup, and rewritten through [`SettingsStore`] whenever
//! the user changes a field.

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    fs::{create_dir_all, read_to_string, write},
    path::{Component, Path, PathBuf},
    str::FromStr,
};

/// Persisted settings record.
///
/// # Invariants
///
/// - `content_dir` is always resolved relative to `project_root`.
/// - `link_name` is a single path segment, never a path.
///
/// Both invariants are enforced during parsing, so a constructed value can be
/// handed to the link manager and publish flow without further checks.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Absolute path to the root of the static-site project.
    pub project_root: PathBuf,

    /// Path of the content folder, relative to `project_root`.
    pub content_dir: PathBuf,

    /// Name the symbolic link takes inside the vault.
    pub link_name: String,

    /// Secret gating the publish flow.
    pub publish_secret: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project_root: PathBuf::new(),
            content_dir: "src/content/blog".into(),
            link_name: "Blog".into(),
            publish_secret: String::new(),
        }
    }
}

impl Settings {
    /// Absolute path of the directory the vault link points at.
    pub fn target_path(&self) -> PathBuf {
        self.project_root.join(&self.content_dir)
    }

    /// Absolute path of the symbolic link inside a given vault.
    pub fn link_path(&self, vault_root: impl AsRef<Path>) -> PathBuf {
        vault_root.as_ref().join(&self.link_name)
    }

    /// Check that enough settings exist for the flows to operate.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Incomplete`] if no project root is set.
    pub fn ensure_complete(&self) -> Result<()> {
        if self.project_root.as_os_str().is_empty() {
            return Err(ConfigError::Incomplete);
        }

        Ok(())
    }
}

impl FromStr for Settings {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut settings: Settings = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on project root field.
        settings.project_root = PathBuf::from(
            shellexpand::full(settings.project_root.to_string_lossy().as_ref())
                .map_err(ConfigError::ShellExpansion)?
                .into_owned(),
        );

        // INVARIANT: Link name stays a single path segment.
        let mut components = Path::new(&settings.link_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => {
                return Err(ConfigError::BadLinkName {
                    link_name: settings.link_name,
                })
            }
        }

        // INVARIANT: Content directory stays relative to project root.
        if settings.content_dir.is_absolute() {
            return Err(ConfigError::AbsoluteContentDir {
                content_dir: settings.content_dir,
            });
        }

        Ok(settings)
    }
}

impl Display for Settings {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Load and save settings at a fixed file path.
///
/// Components never reach for ambient storage themselves. Whoever drives them
/// constructs a store, loads a [`Settings`] value out of it, and passes that
/// value along explicitly.
#[derive(Clone, Debug)]
pub struct SettingsStore {
    file_path: PathBuf,
}

impl SettingsStore {
    /// Construct new settings store rooted at target file path.
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    /// Load settings, falling back to defaults if the file does not exist.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::ReadSettingsFile`] if the file exists but
    ///   cannot be read.
    /// - Return parse errors from [`Settings::from_str`] as-is.
    pub fn load(&self) -> Result<Settings> {
        if !self.file_path.exists() {
            return Ok(Settings::default());
        }

        let content = read_to_string(&self.file_path).map_err(|err| ConfigError::ReadSettingsFile {
            source: err,
            file_path: self.file_path.clone(),
        })?;

        content.parse()
    }

    /// Persist settings, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::WriteSettingsFile`] if the file or its parent
    ///   directory cannot be written.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        let content = toml::ser::to_string_pretty(settings).map_err(ConfigError::Serialize)?;

        if let Some(parent) = self.file_path.parent() {
            create_dir_all(parent).map_err(|err| ConfigError::WriteSettingsFile {
                source: err,
                file_path: self.file_path.clone(),
            })?;
        }

        write(&self.file_path, content.as_bytes()).map_err(|err| ConfigError::WriteSettingsFile {
            source: err,
            file_path: self.file_path.clone(),
        })?;

        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No project root has been configured yet.
    #[error("no project root configured, set one with 'vaultpost set project-root <path>'")]
    Incomplete,

    /// Link name contains path separators or special segments.
    #[error("link name {link_name:?} must be a single path segment")]
    BadLinkName { link_name: String },

    /// Content directory escapes the project root.
    #[error("content directory {:?} must be relative to the project root", content_dir.display())]
    AbsoluteContentDir { content_dir: PathBuf },

    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),

    /// Settings file cannot be read from.
    #[error("failed to read settings file at {:?}", file_path.display())]
    ReadSettingsFile {
        #[source]
        source: std::io::Error,
        file_path: PathBuf,
    },

    /// Settings file cannot be written to.
    #[error("failed to write settings file at {:?}", file_path.display())]
    WriteSettingsFile {
        #[source]
        source: std::io::Error,
        file_path: PathBuf,
    },
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[sealed_test(env = [("SITE", "/home/blah/site")])]
    fn deserialize_settings() -> anyhow::Result<()> {
        let result: Settings = r#"
            project_root = "$SITE"
            content_dir = "src/content/blog"
            link_name = "Blog"
            publish_secret = "hunter2"
        "#
        .parse()?;

        let expect = Settings {
            project_root: "/home/blah/site".into(),
            content_dir: "src/content/blog".into(),
            link_name: "Blog".into(),
            publish_secret: "hunter2".into(),
        };

        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn serialize_settings() {
        let result = Settings {
            project_root: "/home/blah/site".into(),
            content_dir: "posts".into(),
            link_name: "Blog".into(),
            publish_secret: "hunter2".into(),
        }
        .to_string();

        let expect = indoc! {r#"
            project_root = "/home/blah/site"
            content_dir = "posts"
            link_name = "Blog"
            publish_secret = "hunter2"
        "#};

        assert_eq!(result, expect);
    }

    #[test]
    fn reject_link_name_with_separators() {
        let result = r#"
            project_root = "/home/blah/site"
            content_dir = "posts"
            link_name = "nested/Blog"
            publish_secret = ""
        "#
        .parse::<Settings>();

        assert!(matches!(result, Err(ConfigError::BadLinkName { .. })));
    }

    #[test]
    fn reject_absolute_content_dir() {
        let result = r#"
            project_root = "/home/blah/site"
            content_dir = "/etc"
            link_name = "Blog"
            publish_secret = ""
        "#
        .parse::<Settings>();

        assert!(matches!(
            result,
            Err(ConfigError::AbsoluteContentDir { .. })
        ));
    }

    #[sealed_test]
    fn store_round_trip() -> anyhow::Result<()> {
        let store = SettingsStore::new("state/config.toml");
        assert_eq!(store.load()?, Settings::default());

        let settings = Settings {
            project_root: "/home/blah/site".into(),
            content_dir: "posts".into(),
            link_name: "Blog".into(),
            publish_secret: "hunter2".into(),
        };
        store.save(&settings)?;

        assert_eq!(store.load()?, settings);

        Ok(())
    }

    #[test]
    fn incomplete_settings_detected() {
        let settings = Settings::default();
        assert!(matches!(
            settings.ensure_complete(),
            Err(ConfigError::Incomplete)
        ));

        let settings = Settings {
            project_root: "/home/blah/site".into(),
            ..Default::default()
        };
        assert!(settings.ensure_complete().is_ok());
    }
}
