//! Edge types for the anchor graph.
//!
//! Edges are undirected. Internally each one is stored twice, once in the
//! adjacency list of either endpoint, as a [`Neighbor`].

use crate::error::GraphError;
use serde::{Deserialize, Serialize};
use waymark_core::AnchorId;

/// One direction of an undirected edge, as seen from an adjacency list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// The anchor at the other end.
    pub id: AnchorId,

    /// Cost of walking the edge.
    pub weight: f32,
}

impl Neighbor {
    pub fn new(id: AnchorId, weight: f32) -> Self {
        Self { id, weight }
    }
}

/// A simplified edge for export, listed once with the smaller id first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub a: AnchorId,
    pub b: AnchorId,
    pub weight: f32,
}

/// How to weigh edges when a new anchor is connected to existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeightPolicy {
    /// Every edge gets the same weight.
    Uniform { weight: f32 },

    /// Edges are weighted by the straight-line distance between the anchors'
    /// captured translations.
    Distance,
}

impl Default for WeightPolicy {
    fn default() -> Self {
        WeightPolicy::Uniform { weight: 1.0 }
    }
}

impl WeightPolicy {
    /// Checks that a uniform weight is usable as an edge weight.
    pub fn validate(&self) -> Result<(), GraphError> {
        match *self {
            Self::Uniform { weight } => check_weight(weight).map(|_| ()),
            Self::Distance => Ok(()),
        }
    }
}

impl std::fmt::Display for WeightPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uniform { weight } => write!(f, "uniform ({})", weight),
            Self::Distance => write!(f, "distance"),
        }
    }
}

/// Rejects NaN, infinite and negative weights.
pub(crate) fn check_weight(weight: f32) -> Result<f32, GraphError> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(weight)
    } else {
        Err(GraphError::InvalidWeight(weight))
    }
}
