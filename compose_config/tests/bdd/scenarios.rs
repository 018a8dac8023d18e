//! Binds the feature files to the step registry.

use super::fixtures::{ApplicationContext, application_context};
use rstest_bdd_macros::scenarios;

scenarios!(
    "tests/features/service_precedence.feature",
    fixtures = [application_context: ApplicationContext]
);
scenarios!(
    "tests/features/compiled_cache.feature",
    fixtures = [application_context: ApplicationContext]
);
