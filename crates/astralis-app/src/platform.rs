//! Platform directory resolution.
//!
//! Config, data, cache, and log locations follow OS conventions (XDG on
//! Linux, Known Folders on Windows, Library on macOS) through `dirs`.

use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur while preparing platform directories.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The OS did not provide a configuration directory.
    #[error("could not determine OS configuration directory")]
    NoConfigDir,
    /// Directory creation failed.
    #[error("platform I/O error: {0}")]
    Io(#[from] io::Error),
}

/// OS-specific directory paths for the viewer.
#[derive(Debug, Clone)]
pub struct PlatformDirs {
    /// `config.ron` lives here.
    pub config_dir: PathBuf,
    /// Saved trajectories.
    pub data_dir: PathBuf,
    pub cache_dir: PathBuf,
    /// Rolling JSON logs in debug builds.
    pub log_dir: PathBuf,
}

const APP_NAME: &str = "astralis";

impl PlatformDirs {
    /// Resolve platform-specific directories without creating them on disk.
    pub fn resolve() -> Result<Self, PlatformError> {
        let app_config = dirs::config_dir()
            .ok_or(PlatformError::NoConfigDir)?
            .join(APP_NAME);

        let data_dir = dirs::data_dir()
            .map(|dir| dir.join(APP_NAME))
            .unwrap_or_else(|| app_config.join("data"));
        let cache_dir = dirs::cache_dir()
            .map(|dir| dir.join(APP_NAME))
            .unwrap_or_else(|| app_config.join("cache"));

        Ok(Self {
            config_dir: app_config.join("config"),
            data_dir,
            cache_dir,
            log_dir: app_config.join("logs"),
        })
    }

    /// Resolve directories and create them on disk.
    pub fn resolve_and_create() -> Result<Self, PlatformError> {
        let dirs = Self::resolve()?;
        dirs.create_dirs()?;
        Ok(dirs)
    }

    /// Directories rooted under `root`, for tests and portable installs.
    pub fn resolve_with_root(root: &Path) -> Self {
        let app_dir = root.join(APP_NAME);
        Self {
            config_dir: app_dir.join("config"),
            data_dir: app_dir.join("data"),
            cache_dir: app_dir.join("cache"),
            log_dir: app_dir.join("logs"),
        }
    }

    pub fn create_dirs(&self) -> Result<(), PlatformError> {
        for dir in [
            &self.config_dir,
            &self.data_dir,
            &self.cache_dir,
            &self.log_dir,
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_dirs_resolve() {
        // Headless CI containers may lack a home directory.
        let Ok(dirs) = PlatformDirs::resolve() else {
            return;
        };
        for dir in [&dirs.config_dir, &dirs.data_dir, &dirs.cache_dir, &dirs.log_dir] {
            assert!(dir.is_absolute(), "{} is not absolute", dir.display());
            assert!(dir.components().any(|c| c.as_os_str() == APP_NAME));
        }
    }

    #[test]
    fn test_directory_creation() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = PlatformDirs::resolve_with_root(tmp.path());
        dirs.create_dirs().unwrap();

        assert!(dirs.config_dir.is_dir());
        assert!(dirs.data_dir.is_dir());
        assert!(dirs.cache_dir.is_dir());
        assert!(dirs.log_dir.is_dir());

        // Idempotent.
        dirs.create_dirs().unwrap();
    }

    #[test]
    fn test_create_fails_under_a_file() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("astralis");
        std::fs::write(&blocker, "not a directory").unwrap();

        let dirs = PlatformDirs::resolve_with_root(tmp.path());
        assert!(matches!(dirs.create_dirs(), Err(PlatformError::Io(_))));
    }
}
