//! Error types for Waymark core.

use thiserror::Error;

/// Failure to read a translation from its `"x,y,z"` text form.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseTranslationError {
    #[error("expected 3 comma-separated components, found {0}")]
    WrongArity(usize),

    #[error("invalid component `{0}`")]
    InvalidComponent(String),

    #[error("component `{0}` is not finite")]
    NonFinite(String),
}
