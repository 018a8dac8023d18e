//! Service resolution through an application instance.

mod common;

use std::sync::Arc;

use common::mapping;
use compose_config::{
    Application, ArtifactKind, ComposeError, ComposeResult, Mapping, MemorySources, Mode,
    Service, StartupConfig, TypeCatalog,
};
use rstest::rstest;
use serde_json::json;

#[derive(Debug)]
struct Greeter {
    greeting: String,
}

impl Service for Greeter {
    const TYPE_NAME: &'static str = "Greeter";

    fn construct(app: &Application, options: Option<&Mapping>) -> ComposeResult<Self> {
        let fallback = app.settings().get_as::<String>("greeting")?;
        let greeting = options
            .and_then(|opts| opts.get("greeting"))
            .and_then(|value| value.as_str())
            .map_or(fallback, ToOwned::to_owned);
        Ok(Self { greeting })
    }
}

fn app() -> Application {
    let sources = MemorySources::new()
        .with_base(
            ArtifactKind::Settings,
            Mode::Http,
            mapping(json!({"greeting": "hello"})),
        )
        .with_base(
            ArtifactKind::Services,
            Mode::Http,
            mapping(json!({
                "greeter": "Greeter",
                "formal": ["Greeter", {"greeting": "good day"}],
                "indexed": ["Greeter", {"0": "primary", "1": "backup"}],
                "broken": ["Greeter"],
            })),
        );
    Application::builder(StartupConfig::new("/srv/app", Mode::Http))
        .sources(sources)
        .catalog(TypeCatalog::new().with_service::<Greeter>())
        .without_cache()
        .build()
        .expect("application builds")
}

#[rstest]
fn resolution_is_memoised_per_application() {
    let first = app();
    let a = first.resolve("greeter").expect("resolve");
    let b = first.resolve("greeter").expect("resolve again");
    assert!(Arc::ptr_eq(&a, &b));

    let second = app();
    let c = second.resolve("greeter").expect("resolve in another app");
    assert!(!Arc::ptr_eq(&a, &c));
}

#[rstest]
#[case::bare("greeter", "hello")]
#[case::configured("formal", "good day")]
#[case::index_keyed_options("indexed", "hello")]
fn constructors_see_settings_and_options(#[case] id: &str, #[case] expected: &str) {
    let greeter = app().resolve_as::<Greeter>(id).expect("resolve");
    assert_eq!(greeter.greeting, expected);
}

#[rstest]
fn malformed_and_unknown_ids_fail() {
    let app = app();
    let broken = app.resolve("broken").expect_err("one-element list");
    assert!(matches!(&*broken, ComposeError::InvalidServiceDefinition { .. }));
    let unknown = app.resolve("missing").expect_err("undefined id");
    assert!(matches!(&*unknown, ComposeError::UnknownServiceId { .. }));
}
