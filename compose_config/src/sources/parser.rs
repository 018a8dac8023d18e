//! Format-specific parsing for source files.

use camino::Utf8Path;
use serde_json::Value;

use crate::{ComposeError, ComposeResult};

/// File extensions recognised as sources, in lookup order.
pub(super) const EXTENSIONS: [&str; 2] = ["toml", "json"];

/// Parse source data according to the file extension.
///
/// TOML and JSON are supported; any other extension is rejected.
///
/// # Errors
///
/// Returns [`ComposeError::SourceParse`] when the contents fail to parse or
/// the extension is unsupported.
pub(super) fn parse_by_format(path: &Utf8Path, data: &str) -> ComposeResult<Value> {
    match path.extension().map(str::to_ascii_lowercase).as_deref() {
        Some("toml") => toml::from_str::<Value>(data).map_err(|e| ComposeError::source_parse(path, e)),
        Some("json") => {
            serde_json::from_str::<Value>(data).map_err(|e| ComposeError::source_parse(path, e))
        }
        _ => Err(ComposeError::source_parse(
            path,
            std::io::Error::other("unsupported source format; expected .toml or .json"),
        )),
    }
}
