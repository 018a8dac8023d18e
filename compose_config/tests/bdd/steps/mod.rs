//! Step modules registered with `rstest-bdd`.

mod cache_steps;
mod service_steps;
