//! Values returned by configuration tree lookups.

use serde_json::Value;

use super::ConfigTree;

/// Result of looking up one key in a [`ConfigTree`].
///
/// Scalars and lists are returned raw; mappings are wrapped in a memoised
/// child tree.
#[derive(Clone, Copy, Debug)]
pub enum Node<'a> {
    /// A string, number, boolean or null.
    Scalar(&'a Value),
    /// A list, returned exactly as stored.
    List(&'a Value),
    /// A nested mapping, including an empty one.
    Tree(&'a ConfigTree),
}

impl<'a> Node<'a> {
    /// Returns the scalar value, if this node is one.
    #[must_use]
    pub const fn as_scalar(self) -> Option<&'a Value> {
        match self {
            Self::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the raw list, if this node is one.
    #[must_use]
    pub const fn as_list(self) -> Option<&'a Value> {
        match self {
            Self::List(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the child tree, if this node is one.
    #[must_use]
    pub const fn as_tree(self) -> Option<&'a ConfigTree> {
        match self {
            Self::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    /// Returns the string scalar, if this node is one.
    #[must_use]
    pub fn as_str(self) -> Option<&'a str> {
        self.as_scalar().and_then(Value::as_str)
    }

    /// Returns the integer scalar, if this node is one.
    #[must_use]
    pub fn as_i64(self) -> Option<i64> {
        self.as_scalar().and_then(Value::as_i64)
    }

    /// Returns the boolean scalar, if this node is one.
    #[must_use]
    pub fn as_bool(self) -> Option<bool> {
        self.as_scalar().and_then(Value::as_bool)
    }

    /// Clone the node back into a plain [`Value`].
    #[must_use]
    pub fn to_value(self) -> Value {
        match self {
            Self::Scalar(value) | Self::List(value) => value.clone(),
            Self::Tree(tree) => Value::Object(tree.export().clone()),
        }
    }
}
