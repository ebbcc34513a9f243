//! User settings
//!
//! `settings.yml` holds the values substituted into the project Dockerfile.
//! Nothing is created implicitly: the entry point calls
//! [`Settings::init_default`] once before loading from the default location.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Bundled settings file copied by [`Settings::init_default`]
pub const SETTINGS_TEMPLATE: &str = include_str!("../templates/settings.yml");

/// File name of the settings file
pub const SETTINGS_FILE: &str = "settings.yml";

/// Directory under `$HOME` holding the settings file
pub const SETTINGS_DIR: &str = ".config/notebook-pge-wrapper";

/// Values used when rendering project templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Image the PGE container is built from
    pub base_image: String,
    /// Account notebooks run as inside the container
    pub user: String,
}

impl Settings {
    /// Create settings
    #[inline]
    pub fn new(base_image: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            base_image: base_image.into(),
            user: user.into(),
        }
    }

    /// Parse settings from YAML text
    ///
    /// # Errors
    /// Returns [`CoreError::Settings`] when a required key is missing or the
    /// text is not valid YAML
    pub fn from_yaml(path: &Path, text: &str) -> CoreResult<Self> {
        serde_yaml::from_str(text).map_err(|source| CoreError::Settings {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load settings from `path`
    ///
    /// # Errors
    /// Returns error if the file is unreadable or invalid
    pub fn load(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| CoreError::io_error(path, e))?;
        let settings = Self::from_yaml(path, &text)?;
        tracing::debug!(path = %path.display(), base_image = %settings.base_image, "settings loaded");
        Ok(settings)
    }

    /// Default settings location: `$HOME/.config/notebook-pge-wrapper/settings.yml`
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] when `HOME` is not set
    pub fn default_path() -> CoreResult<PathBuf> {
        let home = std::env::var_os("HOME")
            .filter(|h| !h.is_empty())
            .ok_or_else(|| CoreError::config("HOME is not set, pass a settings file explicitly"))?;
        Ok(PathBuf::from(home).join(SETTINGS_DIR).join(SETTINGS_FILE))
    }

    /// Write the bundled settings file to `path` unless it already exists
    ///
    /// Returns whether a file was created.
    ///
    /// # Errors
    /// Returns error if the directory or file cannot be written
    pub fn init_at(path: &Path) -> CoreResult<bool> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::io_error(parent, e))?;
        }
        std::fs::write(path, SETTINGS_TEMPLATE).map_err(|e| CoreError::io_error(path, e))?;
        tracing::info!(path = %path.display(), "created default settings");
        Ok(true)
    }

    /// Create the default settings file when missing and return its path
    ///
    /// # Errors
    /// See [`Settings::default_path`] and [`Settings::init_at`]
    pub fn init_default() -> CoreResult<PathBuf> {
        let path = Self::default_path()?;
        Self::init_at(&path)?;
        Ok(path)
    }

    /// Load from `explicit`, or from the default location
    ///
    /// # Errors
    /// Returns error if the chosen file cannot be loaded
    pub fn resolve(explicit: Option<&Path>) -> CoreResult<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => Self::load(&Self::default_path()?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_template_is_valid() {
        let settings = Settings::from_yaml(Path::new(SETTINGS_FILE), SETTINGS_TEMPLATE).unwrap();
        assert_eq!(settings, Settings::new("hysds/pge-base:latest", "ops"));
    }

    #[test]
    fn missing_key_is_configuration_error() {
        let err = Settings::from_yaml(Path::new("s.yml"), "base_image: x\n").unwrap_err();
        assert!(matches!(err, CoreError::Settings { .. }));
        assert!(err.is_configuration());
    }

    #[test]
    fn init_at_creates_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);

        assert!(Settings::init_at(&path).unwrap());
        std::fs::write(&path, "base_image: mine\nuser: me\n").unwrap();
        assert!(!Settings::init_at(&path).unwrap());

        assert_eq!(Settings::load(&path).unwrap(), Settings::new("mine", "me"));
    }

    #[test]
    fn resolve_prefers_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.yml");
        std::fs::write(&path, "base_image: img\nuser: u\n").unwrap();
        assert_eq!(Settings::resolve(Some(&path)).unwrap().base_image, "img");
    }
}
