//! Extensions for mapping errors to `ComposeResult` concisely.
//!
//! These helpers reduce repetitive `.map_err(|e| Arc::new(...))` patterns
//! when converting serde failures into the crate's `ComposeResult<T>` alias
//! (`Result<T, Arc<ComposeError>>`).
//!
//! # Examples
//!
//! ```
//! use compose_config::{ComposeResult, ComposeResultExt};
//!
//! fn port(value: serde_json::Value) -> ComposeResult<u16> {
//!     serde_json::from_value(value).with_origin(|| "settings key 'port'".to_owned())
//! }
//!
//! assert_eq!(port(serde_json::json!(8080)).ok(), Some(8080));
//! assert!(port(serde_json::json!("eighty")).is_err());
//! ```

use std::sync::Arc;

use crate::{ComposeError, ComposeResult};

/// Extension for `serde_json` results that should surface as
/// [`ComposeError::InvalidSourceShape`].
pub trait ComposeResultExt<T> {
    /// Convert the error into an invalid-shape error attributed to the
    /// source described by `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::InvalidSourceShape`] when the input is `Err`.
    fn with_origin<F>(self, origin: F) -> ComposeResult<T>
    where
        F: FnOnce() -> String;
}

impl<T> ComposeResultExt<T> for Result<T, serde_json::Error> {
    fn with_origin<F>(self, origin: F) -> ComposeResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            Arc::new(ComposeError::InvalidSourceShape {
                origin: origin(),
                message: e.to_string(),
            })
        })
    }
}
