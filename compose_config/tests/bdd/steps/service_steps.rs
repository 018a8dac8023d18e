//! Steps covering service map precedence.

use anyhow::{Result, anyhow, ensure};
use compose_config::{ArtifactKind, MemorySources, Mode, StartupConfig};
use rstest_bdd_macros::{given, then, when};
use serde_json::{Value, json};

use crate::bdd::fixtures::{ApplicationContext, builder};
use crate::common::mapping;

#[given("the provider list {providers}")]
fn provider_list(application_context: &ApplicationContext, providers: String) -> Result<()> {
    let ids: Vec<String> = providers.split(',').map(|id| id.trim().to_owned()).collect();
    ensure!(ids.iter().all(|id| !id.is_empty()), "provider ids must not be empty");
    application_context.providers.set(ids);
    Ok(())
}

#[given("the application defines the mailer as {type_name}")]
fn app_mailer(application_context: &ApplicationContext, type_name: String) {
    application_context.app_mailer.set(type_name);
}

#[when("the application is built from memory sources")]
fn build_from_memory(application_context: &ApplicationContext) -> Result<()> {
    let ids = application_context.providers.get().unwrap_or_default();
    let mut sources = MemorySources::new().with_providers(ids);
    if let Some(type_name) = application_context.app_mailer.get() {
        sources = sources.with_base(
            ArtifactKind::Services,
            Mode::Http,
            mapping(json!({"mailer": type_name})),
        );
    }
    let app = builder(StartupConfig::new("/srv/app", Mode::Http))
        .sources(sources)
        .without_cache()
        .build()?;
    application_context.application.set(app);
    Ok(())
}

fn defined_type(application_context: &ApplicationContext, id: &str) -> Result<Value> {
    application_context
        .application
        .with_ref(|app| app.service_map().get(id).cloned())
        .ok_or_else(|| anyhow!("application was not built"))?
        .ok_or_else(|| anyhow!("service '{id}' is not defined"))
}

#[then("the mailer is defined as {expected}")]
fn mailer_is(application_context: &ApplicationContext, expected: String) -> Result<()> {
    let actual = defined_type(application_context, "mailer")?;
    ensure!(actual == json!(expected), "unexpected mailer {actual}");
    Ok(())
}

#[then("the queue is defined as {expected}")]
fn queue_is(application_context: &ApplicationContext, expected: String) -> Result<()> {
    let actual = defined_type(application_context, "queue")?;
    ensure!(actual == json!(expected), "unexpected queue {actual}");
    Ok(())
}
