//! Unit tests for provider list parsing and file-backed sources.

use anyhow::{Result, anyhow, ensure};
use rstest::rstest;
use serde_json::{Value, json};
use test_helpers::fixtures::AppRoot;

use super::*;

#[rstest]
#[case::bare_array(json!(["a", "b"]))]
#[case::table(json!({"providers": ["a", "b"]}))]
fn parses_provider_lists(#[case] value: Value) -> Result<()> {
    let ids = parse_provider_list(value, "test")?;
    ensure!(ids == ["a", "b"], "unexpected ids {ids:?}");
    Ok(())
}

#[rstest]
#[case::scalar(json!("a"))]
#[case::non_string_entry(json!(["a", 1]))]
#[case::empty_entry(json!([""]))]
#[case::nested_mapping(json!({"providers": {"a": true}}))]
#[case::misspelt_key(json!({"provider": ["mail"]}))]
#[case::unrelated_table(json!({"debug": true}))]
#[case::extra_key(json!({"providers": ["mail"], "debug": true}))]
fn rejects_malformed_provider_lists(#[case] value: Value) {
    let err = parse_provider_list(value, "test").expect_err("list must be rejected");
    assert!(matches!(&*err, ComposeError::InvalidSourceShape { .. }), "got {err}");
}

#[rstest]
fn missing_config_root_is_source_not_found() -> Result<()> {
    let root = AppRoot::new()?;
    let sources = FileSources::new(root.path().join("absent"));
    let err = sources
        .base(ArtifactKind::Settings, Mode::Http)
        .expect_err("missing root must fail");
    ensure!(
        matches!(&*err, ComposeError::SourceNotFound { .. }),
        "unexpected error {err}"
    );
    Ok(())
}

#[rstest]
fn settings_base_is_required_but_others_are_optional() -> Result<()> {
    let root = AppRoot::new()?;
    let sources = FileSources::new(root.config_dir());
    let err = sources
        .base(ArtifactKind::Settings, Mode::Cli)
        .expect_err("settings base is required");
    ensure!(
        matches!(&*err, ComposeError::SourceNotFound { .. }),
        "unexpected error {err}"
    );
    let routes = sources.base(ArtifactKind::Routes, Mode::Cli)?;
    ensure!(routes.is_none(), "routes base is optional");
    ensure!(
        sources.provider_ids()?.is_empty(),
        "absent provider list is empty"
    );
    Ok(())
}

#[rstest]
fn reads_toml_and_json_sources() -> Result<()> {
    let root = AppRoot::new()?;
    root.write_source("providers.json", r#"["mail", "queue"]"#)?;
    let settings = root.write_source("http/settings.toml", "[db]\nhost = \"a\"\n")?;
    root.write_source(
        "http/settings.staging.json",
        r#"{"db": {"host": "staging"}}"#,
    )?;
    let sources = FileSources::new(root.config_dir());

    let ids = sources.provider_ids()?;
    ensure!(ids == ["mail", "queue"], "unexpected ids {ids:?}");

    let base = sources
        .base(ArtifactKind::Settings, Mode::Http)?
        .ok_or_else(|| anyhow!("settings base should exist"))?;
    ensure!(base.path.as_ref() == Some(&settings), "unexpected path {:?}", base.path);
    ensure!(Value::Object(base.value) == json!({"db": {"host": "a"}}), "unexpected base");

    let overlay = sources.overlay(ArtifactKind::Settings, Mode::Http, Environment::Staging)?;
    ensure!(overlay.is_some(), "staging overlay should exist");
    let production = sources.overlay(ArtifactKind::Settings, Mode::Http, Environment::Production)?;
    ensure!(production.is_none(), "production overlay is absent");
    Ok(())
}

#[rstest]
fn misspelt_provider_table_fails_but_missing_file_is_empty() -> Result<()> {
    let root = AppRoot::new()?;
    let sources = FileSources::new(root.config_dir());
    ensure!(sources.provider_ids()?.is_empty(), "no providers file lists nothing");

    root.write_source("providers.toml", "provider = [\"mail\"]\n")?;
    let err = sources
        .provider_ids()
        .expect_err("a misspelt key must not drop the list");
    ensure!(
        matches!(&*err, ComposeError::InvalidSourceShape { .. }),
        "unexpected error {err}"
    );
    Ok(())
}

#[rstest]
fn service_options_keep_index_like_keys() -> Result<()> {
    let root = AppRoot::new()?;
    root.write_source(
        "http/services.json",
        r#"{"mailer": ["Smtp", {"0": "primary", "1": "backup"}]}"#,
    )?;
    root.write_source("http/settings.json", r#"{"hosts": {"0": "a", "1": "b"}}"#)?;
    let sources = FileSources::new(root.config_dir());

    let services = sources
        .base(ArtifactKind::Services, Mode::Http)?
        .ok_or_else(|| anyhow!("services base should exist"))?;
    ensure!(
        services.value.get("mailer") == Some(&json!(["Smtp", {"0": "primary", "1": "backup"}])),
        "service options should stay a mapping"
    );

    let settings = sources
        .base(ArtifactKind::Settings, Mode::Http)?
        .ok_or_else(|| anyhow!("settings base should exist"))?;
    ensure!(
        settings.value.get("hosts") == Some(&json!(["a", "b"])),
        "settings tables still read as lists"
    );
    Ok(())
}

#[rstest]
fn toml_wins_over_json_for_the_same_source() -> Result<()> {
    let root = AppRoot::new()?;
    root.write_source("cli/settings.toml", "source = \"toml\"\n")?;
    root.write_source("cli/settings.json", r#"{"source": "json"}"#)?;
    let base = FileSources::new(root.config_dir())
        .base(ArtifactKind::Settings, Mode::Cli)?
        .ok_or_else(|| anyhow!("settings base should exist"))?;
    ensure!(base.value.get("source") == Some(&json!("toml")), "TOML should win");
    Ok(())
}

#[rstest]
fn non_mapping_sources_are_rejected() -> Result<()> {
    let root = AppRoot::new()?;
    root.write_source("http/routes.json", r#"["/", "/about"]"#)?;
    let err = FileSources::new(root.config_dir())
        .base(ArtifactKind::Routes, Mode::Http)
        .expect_err("a list is not a mapping");
    ensure!(
        matches!(&*err, ComposeError::InvalidSourceShape { .. }),
        "unexpected error {err}"
    );
    Ok(())
}

#[rstest]
fn memory_sources_validate_raw_provider_lists() -> Result<()> {
    let without_key = MemorySources::new().with_provider_list(json!({"other": ["a"]}));
    let err = without_key
        .provider_ids()
        .expect_err("a table without `providers` is malformed");
    ensure!(
        matches!(&*err, ComposeError::InvalidSourceShape { .. }),
        "unexpected error {err}"
    );

    let ids = MemorySources::new().provider_ids()?;
    ensure!(ids.is_empty(), "no provider list means no providers");

    let malformed = MemorySources::new().with_provider_list(json!(42));
    ensure!(malformed.provider_ids().is_err(), "a number is not a provider list");
    Ok(())
}
