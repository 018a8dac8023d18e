//! Directory-backed application sources.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use serde_json::Value;
use tracing::{debug, warn};

use crate::merge::{kind_name, normalize_layer};
use crate::{ArtifactKind, ComposeError, ComposeResult, Environment, Mode};

use super::parser::{EXTENSIONS, parse_by_format};
use super::{AppSources, SourceDocument, parse_provider_list};

/// Application sources read from a configuration directory.
///
/// Layout, relative to the root:
///
/// - `providers.toml` or `providers.json`: provider list (optional);
/// - `<mode>/<kind>.toml` or `.json`: base mapping (`settings` required);
/// - `<mode>/<kind>.<environment>.toml` or `.json`: environment overlay.
///
/// Files are opened through a `cap-std` directory handle, so sources cannot
/// escape the root. Nothing is read until the pipeline asks for it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileSources {
    root: Utf8PathBuf,
}

impl FileSources {
    /// Read sources below `root`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Configuration directory this instance reads from.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn open_root(&self) -> ComposeResult<Dir> {
        match Dir::open_ambient_dir(&self.root, ambient_authority()) {
            Ok(dir) => Ok(dir),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(ComposeError::source_not_found(&self.root))
            }
            Err(err) => Err(ComposeError::source_parse(&self.root, err)),
        }
    }

    /// Read `<stem>.toml` or `<stem>.json`, preferring TOML.
    fn read_document(&self, stem: &str) -> ComposeResult<Option<(Value, Utf8PathBuf)>> {
        let dir = self.open_root()?;
        let mut found: Option<(Value, Utf8PathBuf)> = None;
        for ext in EXTENSIONS {
            let relative = Utf8PathBuf::from(format!("{stem}.{ext}"));
            if let Some((_, kept)) = &found {
                if dir.exists(&relative) {
                    warn!(kept = %kept, ignored = %relative, "multiple formats for one source; ignoring the later one");
                }
                continue;
            }
            match dir.read_to_string(&relative) {
                Ok(data) => {
                    let path = self.root.join(&relative);
                    debug!(path = %path, "read source file");
                    found = Some((parse_by_format(&path, &data)?, path));
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(ComposeError::source_parse(&self.root.join(&relative), err)),
            }
        }
        Ok(found)
    }

    fn read_mapping(
        &self,
        kind: ArtifactKind,
        stem: &str,
    ) -> ComposeResult<Option<SourceDocument>> {
        self.read_document(stem)?
            .map(|(value, path)| match value {
                Value::Object(map) => Ok(SourceDocument {
                    value: normalize_layer(kind, map),
                    path: Some(path),
                }),
                other => Err(ComposeError::invalid_shape(
                    format!("source '{path}'"),
                    format!("expected a mapping, found {}", kind_name(&other)),
                )),
            })
            .transpose()
    }
}

impl AppSources for FileSources {
    fn provider_ids(&self) -> ComposeResult<Vec<String>> {
        match self.read_document("providers")? {
            Some((value, path)) => parse_provider_list(value, &format!("provider list '{path}'")),
            None => Ok(Vec::new()),
        }
    }

    fn base(&self, kind: ArtifactKind, mode: Mode) -> ComposeResult<Option<SourceDocument>> {
        let stem = format!("{mode}/{kind}");
        match self.read_mapping(kind, &stem)? {
            Some(document) => Ok(Some(document)),
            None if kind == ArtifactKind::Settings => {
                Err(ComposeError::source_not_found(&self.root.join(&stem)))
            }
            None => Ok(None),
        }
    }

    fn overlay(
        &self,
        kind: ArtifactKind,
        mode: Mode,
        environment: Environment,
    ) -> ComposeResult<Option<SourceDocument>> {
        self.read_mapping(kind, &format!("{mode}/{kind}.{environment}"))
    }
}
