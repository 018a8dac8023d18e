//! Scenario state shared between behavioural steps.

use compose_config::{
    Application, ApplicationBuilder, ArtifactKind, Mode, ProviderRegistry, StartupConfig,
    StaticBaseline,
};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;
use serde_json::json;
use test_helpers::fixtures::AppRoot;

use crate::common::{FixedProvider, mapping};

/// State accumulated while a scenario builds an application.
#[derive(Default, ScenarioState)]
pub struct ApplicationContext {
    /// Temporary application root for file-backed scenarios.
    pub root: Slot<AppRoot>,
    /// Provider identifiers listed by the application.
    pub providers: Slot<Vec<String>>,
    /// Type the application base assigns to the mailer, if any.
    pub app_mailer: Slot<String>,
    /// The built application.
    pub application: Slot<Application>,
    /// Rendered error of a failed build.
    pub build_error: Slot<String>,
}

/// Creates empty scenario state.
#[fixture]
pub fn application_context() -> ApplicationContext {
    ApplicationContext::default()
}

/// Providers available to every scenario.
pub fn registry() -> ProviderRegistry {
    ProviderRegistry::new()
        .with(
            "first",
            FixedProvider::services(json!({"mailer": "FirstMailer", "queue": "RedisQueue"})),
        )
        .with(
            "second",
            FixedProvider::services(json!({"mailer": "SecondMailer"})),
        )
        .with(
            "defaults",
            FixedProvider::settings(json!({"verbose": false})),
        )
}

/// Builder wired with the shared baseline and providers.
pub fn builder(startup: StartupConfig) -> ApplicationBuilder {
    Application::builder(startup)
        .baseline(StaticBaseline::new().with(
            ArtifactKind::Routes,
            Mode::Cli,
            mapping(json!({"help": {"command": "help"}})),
        ))
        .providers(registry())
}
