//! On-disk form of a compiled artifact.

use serde::{Deserialize, Serialize};

use crate::{ArtifactKind, Mapping, Mode};

/// Version written into every artifact; others are treated as a miss.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    format: u32,
    artifact: ArtifactKind,
    mode: Mode,
    value: &'a Mapping,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope {
    format: u32,
    artifact: ArtifactKind,
    mode: Mode,
    value: Mapping,
}

/// Serialise `value` as pretty JSON with a trailing newline.
pub(super) fn encode(
    kind: ArtifactKind,
    mode: Mode,
    value: &Mapping,
) -> Result<Vec<u8>, serde_json::Error> {
    let mut bytes = serde_json::to_vec_pretty(&EnvelopeRef {
        format: FORMAT_VERSION,
        artifact: kind,
        mode,
        value,
    })?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Decode an artifact, returning `None` unless it is a well-formed
/// envelope for `kind` in `mode`.
pub(super) fn decode(bytes: &[u8], kind: ArtifactKind, mode: Mode) -> Option<Mapping> {
    let envelope: Envelope = serde_json::from_slice(bytes).ok()?;
    (envelope.format == FORMAT_VERSION && envelope.artifact == kind && envelope.mode == mode)
        .then_some(envelope.value)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn sample() -> Mapping {
        let mut map = Mapping::new();
        map.insert("zeta".to_owned(), json!(1));
        map.insert("alpha".to_owned(), json!({"hosts": ["a", "b"]}));
        map
    }

    #[rstest]
    fn encoded_artifact_ends_with_newline_and_keeps_order() {
        let bytes = encode(ArtifactKind::Settings, Mode::Http, &sample()).expect("encode");
        let text = String::from_utf8(bytes).expect("utf-8");
        assert!(text.ends_with("}\n"));
        assert!(text.find("zeta") < text.find("alpha"));
        assert!(text.contains("\"artifact\": \"settings\""));
    }

    #[rstest]
    fn decode_accepts_matching_envelopes() {
        let bytes = encode(ArtifactKind::Routes, Mode::Cli, &sample()).expect("encode");
        assert_eq!(decode(&bytes, ArtifactKind::Routes, Mode::Cli), Some(sample()));
    }

    #[rstest]
    #[case::wrong_kind(ArtifactKind::Services, Mode::Cli)]
    #[case::wrong_mode(ArtifactKind::Routes, Mode::Http)]
    fn decode_rejects_mismatched_envelopes(#[case] kind: ArtifactKind, #[case] mode: Mode) {
        let bytes = encode(ArtifactKind::Routes, Mode::Cli, &sample()).expect("encode");
        assert_eq!(decode(&bytes, kind, mode), None);
    }

    #[rstest]
    #[case::truncated(br#"{"format": 1, "artifact": "#.as_slice())]
    #[case::bare_mapping(br#"{"debug": true}"#.as_slice())]
    #[case::future_format(
        br#"{"format": 2, "artifact": "settings", "mode": "http", "value": {}}"#.as_slice()
    )]
    #[case::list_value(
        br#"{"format": 1, "artifact": "settings", "mode": "http", "value": []}"#.as_slice()
    )]
    fn decode_rejects_malformed_bytes(#[case] bytes: &[u8]) {
        assert_eq!(decode(bytes, ArtifactKind::Settings, Mode::Http), None);
    }
}
