//! Where configuration files live.
//!
//! Three file layers feed the loader, from lowest to highest precedence:
//! the per-user file under the platform config directory, the project's
//! `chronon.toml`, and an untracked `chronon.local.toml` next to it.

use crate::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Shared project file, normally checked in.
pub const PROJECT_FILE: &str = "chronon.toml";

/// Machine-local overrides of the project file.
pub const LOCAL_FILE: &str = "chronon.local.toml";

/// File name inside the per-user config directory.
pub const USER_FILE: &str = "config.toml";

/// Resolves the per-user config directory and the project file layers.
pub struct Paths {
    project_dirs: Option<ProjectDirs>,
}

impl Paths {
    pub fn new() -> Self {
        Self {
            project_dirs: ProjectDirs::from("dev", "Chronon", "chronon"),
        }
    }

    /// Per-user config directory, e.g. `~/.config/chronon` on Linux.
    ///
    /// Fails when the platform has no home directory to anchor it.
    pub fn user_config_dir(&self) -> Result<PathBuf, ConfigError> {
        self.project_dirs
            .as_ref()
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| {
                ConfigError::XdgError("no home directory for the user config layer".to_string())
            })
    }

    pub fn user_config_file(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.user_config_dir()?.join(USER_FILE))
    }

    pub fn project_config_file(project_dir: impl AsRef<Path>) -> PathBuf {
        project_dir.as_ref().join(PROJECT_FILE)
    }

    pub fn local_config_file(project_dir: impl AsRef<Path>) -> PathBuf {
        project_dir.as_ref().join(LOCAL_FILE)
    }

    /// Every candidate file layer for `project_dir`, lowest precedence
    /// first. Files are listed whether or not they exist; a missing user
    /// directory drops that layer.
    pub fn layers(&self, project_dir: impl AsRef<Path>) -> Vec<PathBuf> {
        let project_dir = project_dir.as_ref();
        let mut layers = Vec::with_capacity(3);
        if let Ok(user) = self.user_config_file() {
            layers.push(user);
        }
        layers.push(Self::project_config_file(project_dir));
        layers.push(Self::local_config_file(project_dir));
        layers
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}
