//! Anchor records.

use crate::translation::Translation;
use serde::{Deserialize, Serialize};

/// Identity of an anchor within a room.
///
/// Ids are minted by whoever hosts the anchor, increasing from zero per room.
pub type AnchorId = u64;

/// A named point in physical space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Room-local identity.
    pub id: AnchorId,

    /// Human-readable name shown to users and used for lookups.
    pub name: String,

    /// Handle issued by the AR cloud service, if the anchor was hosted there.
    pub cloud_anchor_id: Option<String>,

    /// Position captured when the anchor was placed or resolved.
    pub translation: Translation,
}

impl Anchor {
    /// Creates a new anchor record.
    pub fn new(id: AnchorId, name: impl Into<String>, translation: Translation) -> Self {
        Self {
            id,
            name: name.into(),
            cloud_anchor_id: None,
            translation,
        }
    }

    /// Attaches the cloud service handle.
    pub fn with_cloud_anchor_id(mut self, cloud_anchor_id: impl Into<String>) -> Self {
        self.cloud_anchor_id = Some(cloud_anchor_id.into());
        self
    }
}
