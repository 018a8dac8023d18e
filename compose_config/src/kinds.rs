//! Execution modes, environments and artifact kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ComposeError, ComposeResult};

/// Delivery context selecting which baseline and overlay set applies.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Request/response delivery over HTTP.
    Http,
    /// Command-line delivery.
    Cli,
}

impl Mode {
    /// Both supported modes, in a fixed order.
    pub const ALL: [Self; 2] = [Self::Http, Self::Cli];

    /// Lowercase name used in file and artifact names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Cli => "cli",
        }
    }
}

/// Deployment environment selecting the application overlay source.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development.
    Development,
    /// Pre-production.
    Staging,
    /// Production; the default when no environment is selected.
    #[default]
    Production,
}

impl Environment {
    /// Lowercase name used in overlay file names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = std::sync::Arc<ComposeError>;

    fn from_str(s: &str) -> ComposeResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" => Ok(Self::Production),
            other => Err(ComposeError::invalid_shape(
                "environment selector",
                format!("unsupported environment '{other}'; expected development, staging or production"),
            )),
        }
    }
}

/// The three artifacts produced by composition.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// The settings tree.
    Settings,
    /// The route table handed to the router.
    Routes,
    /// The service identifier map.
    Services,
}

impl ArtifactKind {
    /// All artifact kinds in composition order.
    pub const ALL: [Self; 3] = [Self::Settings, Self::Routes, Self::Services];

    /// Lowercase name used in file and artifact names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Settings => "settings",
            Self::Routes => "routes",
            Self::Services => "services",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),+) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )+
    };
}

display_as_str!(Mode, Environment, ArtifactKind);
