//! `rstest-bdd` harness for `compose_config`.
//!
//! Feature files live under `tests/features`; [`scenarios`] binds them to
//! the step definitions in [`steps`] and the state in [`fixtures`].

mod fixtures;
mod scenarios;
mod steps;
