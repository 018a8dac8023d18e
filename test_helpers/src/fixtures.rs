//! Temporary application roots populated with source files.
//!
//! # Examples
//!
//! ```
//! use test_helpers::fixtures::AppRoot;
//!
//! let root = AppRoot::new()?;
//! let path = root.write_source("http/settings.toml", "name = \"demo\"\n")?;
//! assert!(path.starts_with(root.config_dir()));
//! # Ok::<_, anyhow::Error>(())
//! ```

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// A temporary application root removed when dropped.
#[derive(Debug)]
pub struct AppRoot {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl AppRoot {
    /// Create an empty application root with a `config` directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created or its
    /// path is not UTF-8.
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create temporary application root")?;
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|path| anyhow!("temporary path is not UTF-8: {}", path.display()))?;
        std::fs::create_dir_all(root.join("config")).context("create config directory")?;
        Ok(Self { _dir: dir, root })
    }

    /// Application root path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.root
    }

    /// Default configuration directory, `<root>/config`.
    #[must_use]
    pub fn config_dir(&self) -> Utf8PathBuf {
        self.root.join("config")
    }

    /// Default cache directory, `<root>/var/cache`.
    #[must_use]
    pub fn cache_dir(&self) -> Utf8PathBuf {
        self.root.join("var").join("cache")
    }

    /// Write `contents` to `relative` below the configuration directory,
    /// creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory or the file cannot be written.
    pub fn write_source(&self, relative: &str, contents: &str) -> Result<Utf8PathBuf> {
        write_file(&self.config_dir().join(relative), contents)
    }

    /// Write `contents` to `relative` below the application root.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory or the file cannot be written.
    pub fn write(&self, relative: &str, contents: &str) -> Result<Utf8PathBuf> {
        write_file(&self.root.join(relative), contents)
    }
}

fn write_file(path: &Utf8Path, contents: &str) -> Result<Utf8PathBuf> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
    }
    std::fs::write(path, contents).with_context(|| format!("write {path}"))?;
    Ok(path.to_path_buf())
}
