//! Relative transformations between anchors.
//!
//! Entry `(i, j)` of the matrix is `position(i) - position(j)` in whatever
//! frame the positions were captured in. A device that resolves anchor `j`
//! somewhere in its own frame can then estimate where anchor `i` should be
//! before `i` itself has resolved.

use crate::codec;
use crate::error::CodecError;
use crate::graph::AnchorGraph;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;
use waymark_core::{Anchor, AnchorId, Translation};

/// Square matrix of pairwise offsets, rows and columns in `ids` order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TransformMatrix {
    pub(crate) ids: Vec<AnchorId>,
    pub(crate) offsets: Vec<Vec<Translation>>,
}

impl TransformMatrix {
    /// Computes all pairwise offsets of the given anchors.
    pub fn from_anchors<'a>(anchors: impl IntoIterator<Item = &'a Anchor>) -> Self {
        let (ids, positions): (Vec<AnchorId>, Vec<Translation>) = anchors
            .into_iter()
            .map(|anchor| (anchor.id, anchor.translation))
            .unzip();

        let offsets = positions
            .iter()
            .map(|from| positions.iter().map(|to| *from - *to).collect())
            .collect();

        Self { ids, offsets }
    }

    /// Anchor ids labelling rows and columns.
    pub fn ids(&self) -> &[AnchorId] {
        &self.ids
    }

    /// Rows of the matrix.
    pub fn rows(&self) -> &[Vec<Translation>] {
        &self.offsets
    }

    /// Matrix dimension.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn position(&self, id: AnchorId) -> Option<usize> {
        self.ids.iter().position(|&known| known == id)
    }

    /// Offset of `from` relative to `to`.
    pub fn offset(&self, from: AnchorId, to: AnchorId) -> Option<Translation> {
        let row = self.position(from)?;
        let column = self.position(to)?;
        self.offsets.get(row)?.get(column).copied()
    }

    /// Estimates where `target` lies, given where `reference` has been
    /// resolved in the current frame.
    pub fn project(
        &self,
        target: AnchorId,
        reference: AnchorId,
        reference_position: Translation,
    ) -> Option<Translation> {
        Some(reference_position + self.offset(target, reference)?)
    }

    /// Checks shape, zero diagonal, unique ids and finite entries.
    pub(crate) fn validate(&self) -> Result<(), String> {
        let n = self.ids.len();
        let mut seen = HashSet::new();
        if let Some(id) = self.ids.iter().find(|&&id| !seen.insert(id)) {
            return Err(format!("anchor {} appears twice", id));
        }
        if self.offsets.len() != n {
            return Err(format!("{} rows for {} anchors", self.offsets.len(), n));
        }
        for (i, row) in self.offsets.iter().enumerate() {
            if row.len() != n {
                return Err(format!("row {} has {} entries, expected {}", i, row.len(), n));
            }
            if row[i] != Translation::ZERO {
                return Err(format!("diagonal entry {} is {}", i, row[i]));
            }
            if let Some(bad) = row.iter().find(|t| !t.is_finite()) {
                return Err(format!("row {} has non-finite offset {}", i, bad));
            }
        }
        Ok(())
    }
}

impl AnchorGraph {
    /// Recomputes the offset matrix from every anchor's captured translation.
    pub fn calculate_relative_transformations(&mut self) -> &TransformMatrix {
        let matrix = TransformMatrix::from_anchors(self.anchors());
        self.transforms.insert(matrix)
    }

    /// The most recently calculated or received matrix.
    pub fn relative_transformations(&self) -> Option<&TransformMatrix> {
        self.transforms.as_ref()
    }

    /// Encodes the current matrix. Encodes an empty matrix if none has been
    /// calculated or received yet.
    pub fn serialize_transformations(&self) -> Result<String, CodecError> {
        match &self.transforms {
            Some(matrix) => codec::encode_transforms(matrix),
            None => codec::encode_transforms(&TransformMatrix::default()),
        }
    }

    /// Replaces the current matrix with one decoded from `blob`.
    pub fn deserialize_transformations(&mut self, blob: &str) -> Result<(), CodecError> {
        let matrix = codec::decode_transforms(blob)?;
        info!("Applied relative transformations for {} anchors", matrix.len());
        self.transforms = Some(matrix);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> AnchorGraph {
        let mut graph = AnchorGraph::new();
        for (id, name, at) in [
            (0, "Door", Translation::new(0.0, 0.0, 0.0)),
            (1, "Desk", Translation::new(2.0, 0.0, -1.0)),
            (2, "Window", Translation::new(-1.0, 1.5, 4.0)),
        ] {
            graph.add_anchor(Anchor::new(id, name, at)).unwrap();
        }
        graph
    }

    #[test]
    fn test_matrix_shape_and_entries() {
        let mut graph = room();
        let matrix = graph.calculate_relative_transformations().clone();

        assert_eq!(matrix.ids(), &[0, 1, 2]);
        assert_eq!(matrix.len(), 3);
        for row in matrix.rows() {
            assert_eq!(row.len(), 3);
        }
        for &id in matrix.ids() {
            assert_eq!(matrix.offset(id, id), Some(Translation::ZERO));
        }
        assert_eq!(matrix.offset(1, 0), Some(Translation::new(2.0, 0.0, -1.0)));
        assert_eq!(matrix.offset(0, 1), Some(Translation::new(-2.0, 0.0, 1.0)));
        assert_eq!(matrix.offset(2, 1), Some(Translation::new(-3.0, 1.5, 5.0)));
        assert_eq!(matrix.offset(0, 9), None);
        assert!(matrix.validate().is_ok());
    }

    #[test]
    fn test_project_from_resolved_reference() {
        let mut graph = room();
        let matrix = graph.calculate_relative_transformations();

        // Desk resolved one metre to the right of where it was hosted.
        let desk_here = Translation::new(3.0, 0.0, -1.0);
        assert_eq!(
            matrix.project(2, 1, desk_here),
            Some(Translation::new(0.0, 1.5, 4.0))
        );
        assert_eq!(matrix.project(1, 1, desk_here), Some(desk_here));
    }

    #[test]
    fn test_serialize_before_calculation_is_empty() {
        let graph = room();
        let blob = graph.serialize_transformations().unwrap();

        let mut other = AnchorGraph::new();
        other.deserialize_transformations(&blob).unwrap();
        assert!(other.relative_transformations().unwrap().is_empty());
    }

    #[test]
    fn test_deserialize_replaces_matrix() {
        let mut source = room();
        source.calculate_relative_transformations();
        let blob = source.serialize_transformations().unwrap();

        let mut graph = AnchorGraph::new();
        graph.deserialize_transformations(&blob).unwrap();
        assert_eq!(
            graph.relative_transformations(),
            source.relative_transformations()
        );

        assert!(graph.deserialize_transformations("rtm1:????").is_err());
        assert_eq!(
            graph.relative_transformations(),
            source.relative_transformations()
        );
    }

    #[test]
    fn test_validate_rejects_bad_shapes() {
        let ragged = TransformMatrix {
            ids: vec![0, 1],
            offsets: vec![vec![Translation::ZERO, Translation::ZERO], vec![Translation::ZERO]],
        };
        assert!(ragged.validate().is_err());

        let repeated = TransformMatrix {
            ids: vec![4, 4],
            offsets: vec![vec![Translation::ZERO; 2]; 2],
        };
        assert!(repeated.validate().is_err());

        let missing_rows = TransformMatrix {
            ids: vec![0],
            offsets: vec![],
        };
        assert!(missing_rows.validate().is_err());
    }
}
