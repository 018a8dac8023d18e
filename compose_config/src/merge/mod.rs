//! Deterministic merge primitives and structure normalisation.
//!
//! Every composed artifact is a [`Mapping`]: an insertion-ordered
//! `serde_json` object. Two policies combine layers:
//!
//! - [`merge_into`] / [`merge_last_wins`] recurse through nested mappings and
//!   let the later layer win everywhere else. Lists are replaced, never
//!   concatenated, and an explicit `null`, `false`, `0`, `""` or `[]` is a
//!   valid override.
//! - [`union_into`] replaces whole top-level entries, which is how service
//!   identifiers are combined.
//!
//! # Examples
//!
//! ```rust
//! use compose_config::{merge_last_wins, normalize};
//! use serde_json::json;
//!
//! let base = normalize(&json!({"db": {"host": "localhost", "port": 5432}, "tags": [1, 2]}))?;
//! let overlay = normalize(&json!({"db": {"host": "db.internal"}, "tags": [3]}))?;
//!
//! let merged = merge_last_wins(base, overlay);
//! assert_eq!(merged["db"], json!({"host": "db.internal", "port": 5432}));
//! assert_eq!(merged["tags"], json!([3]));
//! # Ok::<_, std::sync::Arc<compose_config::ComposeError>>(())
//! ```

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{ArtifactKind, ComposeError, ComposeResult, ComposeResultExt};

/// Insertion-ordered mapping used for every composed artifact.
pub type Mapping = Map<String, Value>;

/// Returns `true` when `key` is a canonical decimal integer.
///
/// Canonical means no `+` sign, no leading zeros and no `-0`; the value must
/// also fit in an `i64`. Integer keys are overwritten positionally by
/// [`merge_into`] instead of being merged recursively.
///
/// ```rust
/// use compose_config::is_integer_key;
///
/// assert!(is_integer_key("0"));
/// assert!(is_integer_key("-12"));
/// assert!(!is_integer_key("007"));
/// assert!(!is_integer_key("port"));
/// ```
#[must_use]
pub fn is_integer_key(key: &str) -> bool {
    let digits = key.strip_prefix('-').unwrap_or(key);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return false;
    }
    if digits == "0" && key.starts_with('-') {
        return false;
    }
    key.parse::<i64>().is_ok()
}

/// Returns `true` when `value` is list-shaped.
///
/// Arrays are always lists, including the empty array. An object is a list
/// when it is non-empty and its keys are exactly `"0"` to `"n-1"` in order.
/// An empty object is an explicit empty mapping and therefore not a list.
#[must_use]
pub fn is_list(value: &Value) -> bool {
    match value {
        Value::Array(_) => true,
        Value::Object(map) => has_sequential_keys(map),
        _ => false,
    }
}

/// Returns `true` for objects that are not list-shaped, including `{}`.
#[must_use]
pub(crate) fn is_mapping_shaped(value: &Value) -> bool {
    matches!(value, Value::Object(map) if !has_sequential_keys(map))
}

fn has_sequential_keys(map: &Mapping) -> bool {
    !map.is_empty()
        && map
            .keys()
            .enumerate()
            .all(|(index, key)| *key == index.to_string())
}

/// Overlay `overlay` onto `target` in place, later keys winning.
///
/// For each key of `overlay`:
/// - integer keys overwrite the target entry without recursion;
/// - when both sides are mapping-shaped the entries merge recursively;
/// - otherwise the overlay value replaces the target value wholesale.
pub fn merge_into(target: &mut Mapping, overlay: Mapping) {
    for (key, incoming) in overlay {
        match target.get_mut(&key) {
            Some(existing)
                if !is_integer_key(&key)
                    && is_mapping_shaped(existing)
                    && is_mapping_shaped(&incoming) =>
            {
                if let (Value::Object(dst), Value::Object(src)) = (existing, incoming) {
                    merge_into(dst, src);
                }
            }
            _ => {
                target.insert(key, incoming);
            }
        }
    }
}

/// Merge `b` over `a`, returning the combined mapping.
///
/// This is the by-value form of [`merge_into`].
///
/// ```rust
/// use compose_config::merge_last_wins;
/// use serde_json::json;
///
/// let a = json!({"x": "a", "keep": true}).as_object().cloned().unwrap_or_default();
/// let b = json!({"x": null}).as_object().cloned().unwrap_or_default();
/// let merged = merge_last_wins(a, b);
/// assert_eq!(merged["x"], json!(null));
/// assert_eq!(merged["keep"], json!(true));
/// ```
#[must_use]
pub fn merge_last_wins(mut a: Mapping, b: Mapping) -> Mapping {
    merge_into(&mut a, b);
    a
}

/// Union `overlay` into `target`, replacing whole entries on conflict.
///
/// Existing keys keep their position; new keys are appended.
pub fn union_into(target: &mut Mapping, overlay: Mapping) {
    for (key, value) in overlay {
        target.insert(key, value);
    }
}

/// Serialise `source` and normalise it into a [`Mapping`].
///
/// Accepts anything that serialises to a map: `serde_json` objects, keyed
/// collections such as `BTreeMap`, or plain structs. Nested collections keyed
/// `0..n-1` become lists.
///
/// # Errors
///
/// Returns [`ComposeError::InvalidSourceShape`] when `source` fails to
/// serialise or is not mapping-like at the top level.
pub fn normalize<T>(source: &T) -> ComposeResult<Mapping>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(source).with_origin(|| "serialised source".to_owned())?;
    normalize_value(value, "source")
}

/// Normalise an already-built [`Value`] into a [`Mapping`].
///
/// `origin` names the source in any error.
///
/// # Errors
///
/// Returns [`ComposeError::InvalidSourceShape`] when `value` is not an
/// object.
pub fn normalize_value(value: Value, origin: &str) -> ComposeResult<Mapping> {
    match value {
        Value::Object(map) => Ok(normalize_entries(map)),
        other => Err(ComposeError::invalid_shape(
            origin,
            format!("expected a mapping, found {}", kind_name(&other)),
        )),
    }
}

/// Normalise the children of an already-validated mapping.
pub(crate) fn normalize_entries(map: Mapping) -> Mapping {
    map.into_iter()
        .map(|(key, value)| (key, normalize_nested(value)))
        .collect()
}

/// Normalise one layer of `kind`.
///
/// Service maps are left verbatim: the options of a `[type, options]` pair
/// may legitimately use keys `"0".."n-1"` and must stay a mapping.
pub(crate) fn normalize_layer(kind: ArtifactKind, map: Mapping) -> Mapping {
    match kind {
        ArtifactKind::Services => map,
        ArtifactKind::Settings | ArtifactKind::Routes => normalize_entries(map),
    }
}

fn normalize_nested(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_nested).collect()),
        Value::Object(map) if has_sequential_keys(&map) => Value::Array(
            map.into_iter()
                .map(|(_, item)| normalize_nested(item))
                .collect(),
        ),
        Value::Object(map) => Value::Object(normalize_entries(map)),
        scalar => scalar,
    }
}

/// Short human-readable name for the shape of `value`.
pub(crate) const fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
