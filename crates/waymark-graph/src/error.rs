//! Error types for the anchor graph and its wire codecs.

use thiserror::Error;
use waymark_core::AnchorId;

/// A graph operation was called with arguments it cannot honor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Anchor {0} is not in the graph")]
    UnknownAnchor(AnchorId),

    #[error("Anchor {0} already exists")]
    DuplicateAnchor(AnchorId),

    #[error("Anchor {0} has an empty display name")]
    EmptyName(AnchorId),

    #[error("Anchor {0} has a non-finite translation")]
    InvalidTranslation(AnchorId),

    #[error("Edge weight {0} must be finite and non-negative")]
    InvalidWeight(f32),

    #[error("Anchor {0} cannot be connected to itself")]
    SelfLoop(AnchorId),
}

/// A serialized blob could not be turned back into graph state.
///
/// Decoding never touches the graph until the whole blob has been parsed
/// and validated, so any of these leaves existing state untouched.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Blob has no format tag")]
    MissingTag,

    #[error("Unsupported blob format `{found}` (expected `{expected}`)")]
    UnsupportedFormat {
        expected: &'static str,
        found: String,
    },

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("Corrupt blob: {0}")]
    Corrupt(String),
}
