//! Immutable, lazily wrapped accessor over a composed settings mapping.
//!
//! A [`ConfigTree`] never changes after construction. Looking up a key that
//! holds a mapping returns a child tree that is built on first access and
//! memoised, so repeated lookups hand out the same node.
//!
//! # Examples
//!
//! ```rust
//! use compose_config::{ConfigTree, normalize};
//! use serde_json::json;
//!
//! let tree = ConfigTree::new(normalize(&json!({
//!     "app": {"name": "demo", "debug": false},
//!     "hosts": ["a", "b"],
//! }))?);
//!
//! assert_eq!(tree.lookup("app.name")?.as_str(), Some("demo"));
//! assert_eq!(tree.get("hosts")?.as_list(), Some(&json!(["a", "b"])));
//! assert!(tree.get("missing").is_err());
//! # Ok::<_, std::sync::Arc<compose_config::ComposeError>>(())
//! ```

mod node;

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::merge::{is_list, is_mapping_shaped};
use crate::{ComposeError, ComposeResult, ComposeResultExt, Mapping};

pub use node::Node;

/// Keys whose values are always returned raw and must be list-shaped.
///
/// The set is empty: no key currently needs pinning, but the check is kept
/// ahead of the mapping/list dispatch so a key can be added without touching
/// lookup logic.
pub const ALWAYS_RAW_KEYS: &[&str] = &[];

/// Read-only deep accessor over one [`Mapping`].
#[derive(Debug)]
pub struct ConfigTree {
    value: Mapping,
    raw_keys: &'static [&'static str],
    children: HashMap<String, OnceLock<ConfigTree>>,
}

impl ConfigTree {
    /// Wrap `value` using the default [`ALWAYS_RAW_KEYS`] set.
    #[must_use]
    pub fn new(value: Mapping) -> Self {
        Self::with_raw_keys(value, ALWAYS_RAW_KEYS)
    }

    /// Wrap `value`, pinning `raw_keys` at this level as raw lists.
    ///
    /// Child trees do not inherit the pinned keys.
    #[must_use]
    pub fn with_raw_keys(value: Mapping, raw_keys: &'static [&'static str]) -> Self {
        let children = value
            .iter()
            .filter(|(_, child)| is_mapping_shaped(child))
            .map(|(key, _)| (key.clone(), OnceLock::new()))
            .collect();
        Self {
            value,
            raw_keys,
            children,
        }
    }

    /// Look up `key` at this level.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::UnknownKey`] when `key` is absent, or
    /// [`ComposeError::InvalidSourceShape`] when a pinned raw key does not
    /// hold a list.
    pub fn get(&self, key: &str) -> ComposeResult<Node<'_>> {
        let value = self
            .value
            .get(key)
            .ok_or_else(|| ComposeError::unknown_key(key))?;

        if self.raw_keys.contains(&key) {
            return if is_list(value) {
                Ok(Node::List(value))
            } else {
                Err(ComposeError::invalid_shape(
                    format!("configuration key '{key}'"),
                    "key is pinned as a raw list but holds another shape",
                ))
            };
        }

        if let (Some(slot), Value::Object(map)) = (self.children.get(key), value) {
            return Ok(Node::Tree(slot.get_or_init(|| Self::new(map.clone()))));
        }
        if is_list(value) {
            Ok(Node::List(value))
        } else {
            Ok(Node::Scalar(value))
        }
    }

    /// Descend through a dot-separated `path`, such as `"db.primary.host"`.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::UnknownKey`] naming the path prefix that could
    /// not be resolved, including when a segment descends into a scalar or
    /// list.
    pub fn lookup(&self, path: &str) -> ComposeResult<Node<'_>> {
        let mut walked: Vec<&str> = Vec::new();
        let mut current = self;
        let mut segments = path.split('.').peekable();
        while let Some(segment) = segments.next() {
            walked.push(segment);
            let node = current
                .get(segment)
                .map_err(|err| match &*err {
                    ComposeError::UnknownKey { .. } => ComposeError::unknown_key(walked.join(".")),
                    _ => err,
                })?;
            if segments.peek().is_none() {
                return Ok(node);
            }
            current = node
                .as_tree()
                .ok_or_else(|| ComposeError::unknown_key(path))?;
        }
        Err(ComposeError::unknown_key(path))
    }

    /// Deserialise the value at `key` into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::UnknownKey`] when `key` is absent or
    /// [`ComposeError::InvalidSourceShape`] when the value does not fit `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> ComposeResult<T> {
        let value = self.get(key)?.to_value();
        serde_json::from_value(value).with_origin(|| format!("configuration key '{key}'"))
    }

    /// Deserialise this whole node into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::InvalidSourceShape`] when the mapping does not
    /// fit `T`.
    pub fn extract<T: DeserializeOwned>(&self) -> ComposeResult<T> {
        serde_json::from_value(Value::Object(self.value.clone()))
            .with_origin(|| "configuration tree".to_owned())
    }

    /// Rejects any attempt to set `key`.
    ///
    /// # Errors
    ///
    /// Always returns [`ComposeError::ImmutableWrite`].
    pub fn try_set(&self, key: &str, _value: &Value) -> ComposeResult<()> {
        Err(ComposeError::immutable_write(key))
    }

    /// Rejects any attempt to remove `key`.
    ///
    /// # Errors
    ///
    /// Always returns [`ComposeError::ImmutableWrite`].
    pub fn try_remove(&self, key: &str) -> ComposeResult<()> {
        Err(ComposeError::immutable_write(key))
    }

    /// Returns the wrapped mapping as-is.
    #[must_use]
    pub const fn export(&self) -> &Mapping {
        &self.value
    }

    /// Returns `true` when `key` is present at this level.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.value.contains_key(key)
    }

    /// Number of top-level keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// Returns `true` when the mapping has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Iterate over the raw top-level entries.
    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.value.iter()
    }
}

impl PartialEq for ConfigTree {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<'a> IntoIterator for &'a ConfigTree {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.value.iter()
    }
}
