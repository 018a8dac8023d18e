//! Parsed service map entries.

use serde_json::Value;

use crate::merge::kind_name;
use crate::{ComposeError, ComposeResult, Mapping};

/// One entry of the service identifier map.
///
/// A definition is either a bare type reference (`"SmtpMailer"`) or a
/// `[type, options]` pair (`["SmtpMailer", {"port": 25}]`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ServiceDefinition {
    /// Construct the type with no options.
    Type(String),
    /// Construct the type with the given options mapping.
    Configured {
        /// Type reference looked up in the catalogue.
        type_name: String,
        /// Options passed to the constructor.
        options: Mapping,
    },
}

impl ServiceDefinition {
    /// Parse the definition stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::InvalidServiceDefinition`] for any other shape,
    /// including an empty type reference.
    pub fn parse(id: &str, value: &Value) -> ComposeResult<Self> {
        match value {
            Value::String(type_name) => Ok(Self::Type(type_ref(id, type_name)?)),
            Value::Array(items) => match items.as_slice() {
                [Value::String(type_name), Value::Object(options)] => Ok(Self::Configured {
                    type_name: type_ref(id, type_name)?,
                    options: options.clone(),
                }),
                [first, second] => Err(ComposeError::invalid_definition(
                    id,
                    format!(
                        "expected a [type, options] pair, found [{}, {}]",
                        kind_name(first),
                        kind_name(second)
                    ),
                )),
                _ => Err(ComposeError::invalid_definition(
                    id,
                    format!("expected a [type, options] pair, found {} items", items.len()),
                )),
            },
            other => Err(ComposeError::invalid_definition(
                id,
                format!(
                    "expected a type reference or [type, options] pair, found {}",
                    kind_name(other)
                ),
            )),
        }
    }

    /// Type reference named by the definition.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Type(type_name) | Self::Configured { type_name, .. } => type_name,
        }
    }

    /// Options for a configured definition.
    #[must_use]
    pub const fn options(&self) -> Option<&Mapping> {
        match self {
            Self::Type(_) => None,
            Self::Configured { options, .. } => Some(options),
        }
    }
}

fn type_ref(id: &str, type_name: &str) -> ComposeResult<String> {
    if type_name.trim().is_empty() {
        return Err(ComposeError::invalid_definition(id, "type reference is empty"));
    }
    Ok(type_name.to_owned())
}
