//! Startup configuration record passed into composition.

use camino::{Utf8Path, Utf8PathBuf};
use figment::{Figment, providers::Env};
use serde::Deserialize;

use crate::{ComposeError, ComposeResult, Environment, Mode};

/// Prefix of the environment variables read by [`StartupConfig::from_env`].
pub const ENV_PREFIX: &str = "APP_";

/// Explicit startup parameters for one application instance.
///
/// Replaces process-wide path and environment constants: the application
/// root, execution mode and active environment are all carried here.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StartupConfig {
    root: Utf8PathBuf,
    mode: Mode,
    environment: Environment,
    config_dir: Option<Utf8PathBuf>,
    cache_dir: Option<Utf8PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct EnvSelector {
    env: Option<String>,
}

impl StartupConfig {
    /// Create a configuration for `root` in `mode` using the production
    /// environment.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>, mode: Mode) -> Self {
        Self {
            root: root.into(),
            mode,
            environment: Environment::default(),
            config_dir: None,
            cache_dir: None,
        }
    }

    /// Create a configuration whose environment comes from `APP_ENV`.
    ///
    /// An unset variable selects [`Environment::Production`].
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::InvalidSourceShape`] when `APP_ENV` names an
    /// unsupported environment or cannot be read as a string.
    pub fn from_env(root: impl Into<Utf8PathBuf>, mode: Mode) -> ComposeResult<Self> {
        let selector: EnvSelector = Figment::from(Env::prefixed(ENV_PREFIX).only(&["env"]))
            .extract()
            .map_err(|e| ComposeError::invalid_shape("environment selector", e.to_string()))?;
        let environment = selector
            .env
            .as_deref()
            .map_or(Ok(Environment::default()), |raw| raw.parse::<Environment>())?;
        Ok(Self::new(root, mode).with_environment(environment))
    }

    /// Select the active environment.
    #[must_use]
    pub const fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Override the directory holding application sources.
    #[must_use]
    pub fn with_config_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    /// Override the directory holding compiled artifacts.
    #[must_use]
    pub fn with_cache_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Application root directory.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Execution mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Active environment.
    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.environment
    }

    /// Directory holding application sources; `<root>/config` by default.
    #[must_use]
    pub fn config_dir(&self) -> Utf8PathBuf {
        self.config_dir
            .clone()
            .unwrap_or_else(|| self.root.join("config"))
    }

    /// Directory holding compiled artifacts; `<root>/var/cache` by default.
    #[must_use]
    pub fn cache_dir(&self) -> Utf8PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| self.root.join("var").join("cache"))
    }
}
