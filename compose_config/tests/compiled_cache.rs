//! Compiling artifacts and building applications from them.

mod common;

use anyhow::{Result, ensure};
use common::{FixedProvider, mapping};
use compose_config::{
    Application, ApplicationBuilder, ArtifactKind, Mode, ProviderRegistry, StartupConfig,
    StaticBaseline, WarmOptions, WarmOutcome,
};
use rstest::rstest;
use serde_json::json;
use test_helpers::fixtures::AppRoot;

fn builder(startup: StartupConfig) -> ApplicationBuilder {
    Application::builder(startup)
        .baseline(StaticBaseline::new().with(
            ArtifactKind::Routes,
            Mode::Cli,
            mapping(json!({"help": {"command": "help"}})),
        ))
        .providers(ProviderRegistry::new().with(
            "defaults",
            FixedProvider::settings(json!({"verbose": false})),
        ))
}

fn populated_root() -> Result<AppRoot> {
    let root = AppRoot::new()?;
    root.write_source("providers.toml", "providers = [\"defaults\"]\n")?;
    root.write_source("cli/settings.toml", "name = \"tool\"\n[limits]\njobs = 4\n")?;
    root.write_source("cli/services.json", r#"{"clock": "SystemClock"}"#)?;
    Ok(root)
}

#[rstest]
fn warm_then_build_reads_no_source() -> Result<()> {
    let root = populated_root()?;
    let startup = StartupConfig::new(root.path(), Mode::Cli);
    builder(startup.clone()).warm(WarmOptions::default())?;

    std::fs::remove_dir_all(root.config_dir())?;
    let app = builder(startup).build()?;
    let jobs = app.settings().lookup("limits.jobs")?.as_i64();
    ensure!(jobs == Some(4), "unexpected jobs {jobs:?}");
    let verbose = app.settings().get("verbose")?.as_bool();
    ensure!(verbose == Some(false), "provider settings should be compiled in");
    ensure!(app.routes().contains_key("help"), "baseline routes compiled in");
    ensure!(app.service_map().contains_key("clock"), "services compiled in");
    Ok(())
}

#[rstest]
fn without_artifacts_a_missing_config_dir_fails() -> Result<()> {
    let root = AppRoot::new()?;
    std::fs::remove_dir_all(root.config_dir())?;
    let result = builder(StartupConfig::new(root.path(), Mode::Cli)).build();
    ensure!(result.is_err(), "nothing to build from");
    Ok(())
}

#[rstest]
fn warming_twice_produces_identical_bytes() -> Result<()> {
    let root = populated_root()?;
    let startup = StartupConfig::new(root.path(), Mode::Cli);
    let first = builder(startup.clone()).warm(WarmOptions::default())?;
    let before: Vec<Vec<u8>> = ArtifactKind::ALL
        .iter()
        .map(|kind| std::fs::read(first.get(*kind).path()))
        .collect::<std::io::Result<_>>()?;

    let second = builder(startup).warm(WarmOptions::default())?;
    let after: Vec<Vec<u8>> = ArtifactKind::ALL
        .iter()
        .map(|kind| std::fs::read(second.get(*kind).path()))
        .collect::<std::io::Result<_>>()?;
    ensure!(before == after, "artifacts changed between identical warms");
    Ok(())
}

#[rstest]
fn warming_without_overwrite_keeps_earlier_artifacts() -> Result<()> {
    let root = populated_root()?;
    let startup = StartupConfig::new(root.path(), Mode::Cli);
    builder(startup.clone()).warm(WarmOptions::default())?;
    root.write_source("cli/settings.toml", "name = \"renamed\"\n")?;

    let report = builder(startup.clone())
        .warm(WarmOptions {
            overwrite: false,
            invalidate_cached: false,
        })?;
    ensure!(
        matches!(report.settings, WarmOutcome::Skipped(_)),
        "settings should be skipped"
    );

    let app = builder(startup).build()?;
    let name = app.settings().get("name")?;
    ensure!(name.as_str() == Some("tool"), "compiled settings should be kept");
    Ok(())
}
