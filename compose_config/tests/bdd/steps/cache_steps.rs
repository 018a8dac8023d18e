//! Steps covering warmed artifacts and the start-up fast path.

use anyhow::{Result, anyhow, ensure};
use compose_config::{Mode, StartupConfig, WarmOptions};
use rstest_bdd_macros::{given, then, when};
use test_helpers::fixtures::AppRoot;

use crate::bdd::fixtures::{ApplicationContext, builder};

fn startup(application_context: &ApplicationContext) -> Result<StartupConfig> {
    application_context
        .root
        .with_ref(|root| StartupConfig::new(root.path(), Mode::Cli))
        .ok_or_else(|| anyhow!("application root was not created"))
}

#[given("an application root with a cli settings source")]
fn populated_root(application_context: &ApplicationContext) -> Result<()> {
    let root = AppRoot::new()?;
    root.write_source("providers.toml", "providers = [\"defaults\"]\n")?;
    root.write_source("cli/settings.toml", "name = \"tool\"\n")?;
    application_context.root.set(root);
    Ok(())
}

#[when("the cache is warmed")]
fn warm_cache(application_context: &ApplicationContext) -> Result<()> {
    let report = builder(startup(application_context)?).warm(WarmOptions::default())?;
    ensure!(
        report.settings.is_written(),
        "settings artifact should be written"
    );
    Ok(())
}

#[when("the configuration directory is removed")]
fn remove_sources(application_context: &ApplicationContext) -> Result<()> {
    let config_dir = application_context
        .root
        .with_ref(AppRoot::config_dir)
        .ok_or_else(|| anyhow!("application root was not created"))?;
    std::fs::remove_dir_all(config_dir)?;
    Ok(())
}

#[when("the application is built from the application root")]
fn build_from_root(application_context: &ApplicationContext) -> Result<()> {
    match builder(startup(application_context)?).build() {
        Ok(app) => application_context.application.set(app),
        Err(err) => application_context.build_error.set(err.to_string()),
    }
    Ok(())
}

#[then("the setting {key} is {expected}")]
fn setting_is(
    application_context: &ApplicationContext,
    key: String,
    expected: String,
) -> Result<()> {
    let value = application_context
        .application
        .with_ref(|app| app.settings().lookup(&key).map(|node| node.to_value()))
        .ok_or_else(|| anyhow!("application was not built"))??;
    let rendered = value
        .as_str()
        .map_or_else(|| value.to_string(), ToOwned::to_owned);
    ensure!(rendered == expected, "setting {key} is {rendered}, expected {expected}");
    Ok(())
}

#[then("the build fails")]
fn build_failed(application_context: &ApplicationContext) -> Result<()> {
    ensure!(
        application_context.application.is_empty(),
        "the application should not have been built"
    );
    let message = application_context
        .build_error
        .get()
        .ok_or_else(|| anyhow!("no build error was recorded"))?;
    ensure!(!message.is_empty(), "build error should be described");
    Ok(())
}
