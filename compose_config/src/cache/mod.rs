//! Compiled artifact cache: atomic snapshots of composed mappings.
//!
//! Each artifact lives at `<cache_dir>/<mode>.<kind>.json` as a JSON envelope
//! recording the format version, artifact kind and mode alongside the
//! mapping. Writers never leave a partially written artifact behind: bytes go
//! to a temporary file in the cache directory which is synced and then
//! renamed over the target.

mod envelope;

use std::io::{ErrorKind, Write};
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use tracing::{debug, info, warn};

use crate::pipeline::CompositionPipeline;
use crate::{ArtifactKind, ComposeError, ComposeResult, Mapping, Mode};

pub use envelope::FORMAT_VERSION;

/// Hook notified after an artifact is replaced, for example to evict it from
/// an in-process code or bytecode cache.
pub trait ArtifactInvalidator: Send + Sync {
    /// Invalidate any cached copy of `path`.
    ///
    /// # Errors
    ///
    /// Failures are logged and otherwise ignored by the compiler.
    fn invalidate(&self, path: &Utf8Path) -> std::io::Result<()>;
}

/// Options controlling [`CacheCompiler::warm`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WarmOptions {
    /// Replace existing artifacts. When `false`, existing artifacts are kept.
    pub overwrite: bool,
    /// Notify the configured [`ArtifactInvalidator`] for every written path.
    pub invalidate_cached: bool,
}

impl Default for WarmOptions {
    fn default() -> Self {
        Self {
            overwrite: true,
            invalidate_cached: false,
        }
    }
}

/// What `warm` did with one artifact.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WarmOutcome {
    /// The artifact was written to the path.
    Written(Utf8PathBuf),
    /// An artifact already existed at the path and was left untouched.
    Skipped(Utf8PathBuf),
}

impl WarmOutcome {
    /// Artifact path this outcome refers to.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        match self {
            Self::Written(path) | Self::Skipped(path) => path,
        }
    }

    /// Returns `true` when the artifact was written.
    #[must_use]
    pub const fn is_written(&self) -> bool {
        matches!(self, Self::Written(_))
    }
}

/// Per-artifact outcomes of one `warm` call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WarmReport {
    /// Settings artifact.
    pub settings: WarmOutcome,
    /// Routes artifact.
    pub routes: WarmOutcome,
    /// Services artifact.
    pub services: WarmOutcome,
}

impl WarmReport {
    /// Outcome for `kind`.
    #[must_use]
    pub const fn get(&self, kind: ArtifactKind) -> &WarmOutcome {
        match kind {
            ArtifactKind::Settings => &self.settings,
            ArtifactKind::Routes => &self.routes,
            ArtifactKind::Services => &self.services,
        }
    }
}

/// Reads and writes compiled artifacts in one cache directory.
#[derive(Clone)]
pub struct CacheCompiler {
    dir: Utf8PathBuf,
    invalidator: Option<Arc<dyn ArtifactInvalidator>>,
}

impl CacheCompiler {
    /// Use `dir` as the cache directory. Nothing is touched until a read or
    /// write is requested.
    #[must_use]
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            invalidator: None,
        }
    }

    /// Notify `invalidator` after artifacts are written with
    /// [`WarmOptions::invalidate_cached`] set.
    #[must_use]
    pub fn with_invalidator(mut self, invalidator: Arc<dyn ArtifactInvalidator>) -> Self {
        self.invalidator = Some(invalidator);
        self
    }

    /// The cache directory.
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Location of the artifact for `kind` in `mode`.
    #[must_use]
    pub fn artifact_path(&self, kind: ArtifactKind, mode: Mode) -> Utf8PathBuf {
        self.dir.join(file_name(kind, mode))
    }

    /// Load a stored artifact.
    ///
    /// Returns `None` when the artifact is absent, unreadable or not a
    /// well-formed envelope for `kind` in `mode`.
    #[must_use]
    pub fn try_fast_path(&self, kind: ArtifactKind, mode: Mode) -> Option<Mapping> {
        let bytes = match Dir::open_ambient_dir(&self.dir, ambient_authority())
            .and_then(|dir| dir.read(file_name(kind, mode)))
        {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(artifact = %kind, mode = %mode, error = %err, "cache miss");
                return None;
            }
        };
        let value = envelope::decode(&bytes, kind, mode);
        if value.is_none() {
            debug!(artifact = %kind, mode = %mode, "ignoring malformed cache artifact");
        }
        value
    }

    /// Recompute every artifact for `mode` and store it.
    ///
    /// All three artifacts are composed before anything is written, so a
    /// composition failure leaves the cache untouched. Existing artifacts are
    /// never read.
    ///
    /// # Errors
    ///
    /// Propagates composition errors, and returns [`ComposeError::CacheWrite`]
    /// when the directory or an artifact cannot be written.
    pub fn warm(
        &self,
        pipeline: &CompositionPipeline<'_>,
        mode: Mode,
        options: WarmOptions,
    ) -> ComposeResult<WarmReport> {
        let settings = pipeline.settings(mode)?;
        let routes = pipeline.routes(mode)?;
        let services = pipeline.services(mode)?;

        Dir::create_ambient_dir_all(&self.dir, ambient_authority())
            .map_err(|err| ComposeError::cache_write(&self.dir, err))?;

        Ok(WarmReport {
            settings: self.persist(ArtifactKind::Settings, mode, &settings, options)?,
            routes: self.persist(ArtifactKind::Routes, mode, &routes, options)?,
            services: self.persist(ArtifactKind::Services, mode, &services, options)?,
        })
    }

    /// Remove the artifacts of `mode`. Missing files are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::CacheWrite`] when an artifact exists but
    /// cannot be removed.
    pub fn clear(&self, mode: Mode) -> ComposeResult<()> {
        let dir = match Dir::open_ambient_dir(&self.dir, ambient_authority()) {
            Ok(dir) => dir,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(ComposeError::cache_write(&self.dir, err)),
        };
        for kind in ArtifactKind::ALL {
            match dir.remove_file(file_name(kind, mode)) {
                Ok(()) => debug!(artifact = %kind, mode = %mode, "removed cache artifact"),
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(ComposeError::cache_write(
                        &self.artifact_path(kind, mode),
                        err,
                    ));
                }
            }
        }
        Ok(())
    }

    fn persist(
        &self,
        kind: ArtifactKind,
        mode: Mode,
        value: &Mapping,
        options: WarmOptions,
    ) -> ComposeResult<WarmOutcome> {
        let path = self.artifact_path(kind, mode);
        if !options.overwrite && path.exists() {
            info!(path = %path, "kept existing cache artifact");
            return Ok(WarmOutcome::Skipped(path));
        }
        let bytes = envelope::encode(kind, mode, value)
            .map_err(|err| ComposeError::cache_write(&path, err.into()))?;

        let mut tmp = tempfile::Builder::new()
            .prefix(&format!(".{}.", file_name(kind, mode)))
            .suffix(".tmp")
            .tempfile_in(&self.dir)
            .map_err(|err| ComposeError::cache_write(&path, err))?;
        tmp.write_all(&bytes)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|err| ComposeError::cache_write(&path, err))?;
        set_artifact_permissions(tmp.as_file())
            .map_err(|err| ComposeError::cache_write(&path, err))?;

        if options.overwrite {
            tmp.persist(&path)
                .map_err(|err| ComposeError::cache_write(&path, err.error))?;
        } else {
            match tmp.persist_noclobber(&path) {
                Ok(_) => {}
                Err(err) if err.error.kind() == ErrorKind::AlreadyExists => {
                    info!(path = %path, "kept artifact written concurrently");
                    return Ok(WarmOutcome::Skipped(path));
                }
                Err(err) => return Err(ComposeError::cache_write(&path, err.error)),
            }
        }
        info!(path = %path, "wrote cache artifact");

        if options.invalidate_cached {
            self.invalidate(&path);
        }
        Ok(WarmOutcome::Written(path))
    }

    fn invalidate(&self, path: &Utf8Path) {
        let Some(invalidator) = &self.invalidator else {
            return;
        };
        if let Err(err) = invalidator.invalidate(path) {
            warn!(path = %path, error = %err, "failed to invalidate cached artifact");
        }
    }
}

impl std::fmt::Debug for CacheCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheCompiler")
            .field("dir", &self.dir)
            .field("invalidator", &self.invalidator.is_some())
            .finish()
    }
}

fn file_name(kind: ArtifactKind, mode: Mode) -> String {
    format!("{mode}.{kind}.json")
}

#[cfg(unix)]
fn set_artifact_permissions(file: &std::fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
#[expect(
    clippy::unnecessary_wraps,
    reason = "signature matches the Unix implementation"
)]
const fn set_artifact_permissions(_file: &std::fs::File) -> std::io::Result<()> {
    Ok(())
}
