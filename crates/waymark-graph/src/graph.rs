//! Core graph data structure.
//!
//! The AnchorGraph owns anchor records, a name index and the symmetric
//! adjacency between anchors. Path search lives in `path.rs`, relative
//! transformations in `transform.rs`; both extend this type.

use crate::adjacency::Adjacency;
use crate::codec;
use crate::edge::{check_weight, GraphEdge, Neighbor, WeightPolicy};
use crate::error::{CodecError, GraphError};
use crate::transform::TransformMatrix;
use crate::SharedAnchorGraph;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use waymark_core::{Anchor, AnchorId, Translation};

/// The anchor navigation graph for one room.
///
/// Not internally synchronized. Share it through [`SharedAnchorGraph`] when
/// several callbacks need to mutate it.
#[derive(Debug, Clone, Default)]
pub struct AnchorGraph {
    /// Anchor records by id.
    anchors: HashMap<AnchorId, Anchor>,

    /// Record insertion order.
    order: Vec<AnchorId>,

    /// Display name to id. Last writer wins.
    name_index: HashMap<String, AnchorId>,

    /// Topology. May know ids whose records have not arrived yet.
    pub(crate) adjacency: Adjacency,

    /// Most recently calculated or received relative transformations.
    pub(crate) transforms: Option<TransformMatrix>,
}

impl AnchorGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps the graph in a mutex so async callbacks can share it.
    pub fn into_shared(self) -> SharedAnchorGraph {
        Arc::new(Mutex::new(self))
    }

    /// Adds an anchor record and registers it in the adjacency.
    ///
    /// If another anchor already uses the same display name, the name now
    /// points at the new anchor and the shadowed id is returned.
    pub fn add_anchor(&mut self, anchor: Anchor) -> Result<Option<AnchorId>, GraphError> {
        let id = anchor.id;
        if self.anchors.contains_key(&id) {
            return Err(GraphError::DuplicateAnchor(id));
        }
        if anchor.name.trim().is_empty() {
            return Err(GraphError::EmptyName(id));
        }
        if !anchor.translation.is_finite() {
            return Err(GraphError::InvalidTranslation(id));
        }

        let shadowed = self.name_index.insert(anchor.name.clone(), id);
        if let Some(previous) = shadowed {
            warn!(
                "Name {:?} moved from anchor {} to anchor {}",
                anchor.name, previous, id
            );
        }

        self.adjacency.insert_anchor(id);
        self.order.push(id);
        debug!("Anchor {} ({}) inserted", id, anchor.name);
        self.anchors.insert(id, anchor);

        Ok(shadowed)
    }

    /// Connects two anchors with an undirected edge.
    ///
    /// Both ids must be known to the adjacency. Repeating an edge keeps the
    /// smaller of the two weights.
    pub fn add_edge(&mut self, a: AnchorId, b: AnchorId, weight: f32) -> Result<(), GraphError> {
        self.adjacency.link(a, b, weight)?;
        debug!("Edge {}-{} weight {}", a, b, weight);
        Ok(())
    }

    /// Connects an anchor to every anchor named in `names`.
    ///
    /// Names that resolve to nothing are skipped. Returns the ids that were
    /// actually connected, in input order. Every weight is checked before the
    /// first edge is added, so on error the graph is unchanged.
    pub fn connect_named<S: AsRef<str>>(
        &mut self,
        id: AnchorId,
        names: &[S],
        policy: WeightPolicy,
    ) -> Result<Vec<AnchorId>, GraphError> {
        policy.validate()?;
        let origin = self
            .anchors
            .get(&id)
            .map(|anchor| anchor.translation)
            .ok_or(GraphError::UnknownAnchor(id))?;

        let mut planned = Vec::new();
        for (name, target) in names.iter().zip(self.ids_for_names(names)) {
            let Some(target) = target else {
                warn!("No anchor named {:?}, skipping connection", name.as_ref());
                continue;
            };
            if target == id {
                warn!("Anchor {} listed itself as a connection", id);
                continue;
            }

            let weight = match policy {
                WeightPolicy::Uniform { weight } => weight,
                WeightPolicy::Distance => self
                    .anchors
                    .get(&target)
                    .map(|other| origin.distance(&other.translation))
                    .ok_or(GraphError::UnknownAnchor(target))?,
            };
            planned.push((target, check_weight(weight)?));
        }

        let mut connected = Vec::with_capacity(planned.len());
        for (target, weight) in planned {
            self.add_edge(id, target, weight)?;
            connected.push(target);
        }

        Ok(connected)
    }

    /// Removes every anchor, name, edge and transformation.
    pub fn clear(&mut self) {
        self.anchors.clear();
        self.order.clear();
        self.name_index.clear();
        self.adjacency.clear();
        self.transforms = None;
        debug!("Anchor graph cleared");
    }

    /// Gets an anchor record by id.
    pub fn anchor(&self, id: AnchorId) -> Option<&Anchor> {
        self.anchors.get(&id)
    }

    /// Gets the anchor currently holding a display name.
    pub fn anchor_by_name(&self, name: &str) -> Option<&Anchor> {
        self.anchors.get(self.name_index.get(name)?)
    }

    /// Anchor records in insertion order.
    pub fn anchors(&self) -> impl Iterator<Item = &Anchor> + '_ {
        self.order.iter().filter_map(|id| self.anchors.get(id))
    }

    /// Anchor ids in insertion order.
    pub fn anchor_ids(&self) -> impl Iterator<Item = AnchorId> + '_ {
        self.order.iter().copied()
    }

    /// Display names, parallel to [`anchor_ids`](Self::anchor_ids).
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.anchors().map(|anchor| anchor.name.as_str())
    }

    /// Looks up the id that currently holds a display name.
    pub fn id_for_name(&self, name: &str) -> Option<AnchorId> {
        self.name_index.get(name).copied()
    }

    /// Looks up several names at once, keeping input order.
    pub fn ids_for_names<S: AsRef<str>>(&self, names: &[S]) -> Vec<Option<AnchorId>> {
        names
            .iter()
            .map(|name| self.id_for_name(name.as_ref()))
            .collect()
    }

    /// Direct neighbors of an anchor.
    pub fn neighbors(&self, id: AnchorId) -> Result<&[Neighbor], GraphError> {
        self.adjacency
            .neighbors(id)
            .ok_or(GraphError::UnknownAnchor(id))
    }

    /// Returns the anchor closest to `position`, first in insertion order on ties.
    pub fn nearest_anchor(&self, position: &Translation) -> Option<AnchorId> {
        let mut best: Option<(AnchorId, f32)> = None;
        for anchor in self.anchors() {
            let distance = anchor.translation.distance(position);
            match best {
                Some((_, closest)) if closest <= distance => {}
                _ => best = Some((anchor.id, distance)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// The adjacency, read-only.
    pub fn adjacency(&self) -> &Adjacency {
        &self.adjacency
    }

    /// Every undirected edge once.
    pub fn edges(&self) -> Vec<GraphEdge> {
        self.adjacency.edges()
    }

    /// Returns the number of anchor records.
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Returns true if there are no anchor records.
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Returns the number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.edge_count()
    }

    /// Encodes the adjacency for sharing with other devices.
    pub fn serialize_adjacency(&self) -> Result<String, CodecError> {
        codec::encode_adjacency(&self.adjacency)
    }

    /// Replaces the adjacency with one decoded from `blob`.
    ///
    /// The blob is decoded and validated in full before anything changes.
    /// Anchors already recorded locally but absent from the blob keep an
    /// empty adjacency list.
    pub fn deserialize_adjacency(&mut self, blob: &str) -> Result<(), CodecError> {
        let mut adjacency = codec::decode_adjacency(blob)?;
        for id in &self.order {
            adjacency.insert_anchor(*id);
        }

        info!(
            "Applied adjacency: {} anchors, {} edges",
            adjacency.len(),
            adjacency.edge_count()
        );
        self.adjacency = adjacency;
        Ok(())
    }
}

/// Graph statistics.
#[derive(Debug, Serialize, Deserialize)]
pub struct GraphStats {
    pub anchor_count: usize,
    pub edge_count: usize,
    pub topology_anchors: usize,
}

impl AnchorGraph {
    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            anchor_count: self.len(),
            edge_count: self.edge_count(),
            topology_anchors: self.adjacency.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor(id: AnchorId, name: &str) -> Anchor {
        Anchor::new(id, name, Translation::new(id as f32, 0.0, 0.0))
    }

    fn office() -> AnchorGraph {
        let mut graph = AnchorGraph::new();
        graph.add_anchor(anchor(1, "Lobby")).unwrap();
        graph.add_anchor(anchor(2, "Elevator")).unwrap();
        graph.add_anchor(anchor(3, "Office")).unwrap();
        graph.add_edge(1, 2, 5.0).unwrap();
        graph.add_edge(2, 3, 3.0).unwrap();
        graph
    }

    #[test]
    fn test_listing_follows_insertion_order() {
        let mut graph = AnchorGraph::new();
        for (id, name) in [(7, "Kitchen"), (2, "Hall"), (5, "Stairs")] {
            graph.add_anchor(anchor(id, name)).unwrap();
        }

        assert_eq!(graph.anchor_ids().collect::<Vec<_>>(), vec![7, 2, 5]);
        assert_eq!(
            graph.names().collect::<Vec<_>>(),
            vec!["Kitchen", "Hall", "Stairs"]
        );
        // Restartable.
        assert_eq!(graph.anchor_ids().count(), 3);
    }

    #[test]
    fn test_add_anchor_rejects_duplicates_and_empty_names() {
        let mut graph = office();
        assert_eq!(
            graph.add_anchor(anchor(2, "Other")),
            Err(GraphError::DuplicateAnchor(2))
        );
        assert_eq!(graph.add_anchor(anchor(9, "  ")), Err(GraphError::EmptyName(9)));

        let bad = Anchor::new(10, "Void", Translation::new(f32::NAN, 0.0, 0.0));
        assert_eq!(graph.add_anchor(bad), Err(GraphError::InvalidTranslation(10)));
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn test_name_collision_last_write_wins() {
        let mut graph = office();
        let shadowed = graph.add_anchor(anchor(4, "Lobby")).unwrap();

        assert_eq!(shadowed, Some(1));
        assert_eq!(graph.id_for_name("Lobby"), Some(4));
        assert_eq!(graph.anchor(1).unwrap().name, "Lobby");
        assert_eq!(graph.len(), 4);
    }

    #[test]
    fn test_name_lookups() {
        let graph = office();
        assert_eq!(graph.id_for_name("Lobby"), Some(1));
        assert_eq!(graph.id_for_name("Nowhere"), None);
        assert_eq!(
            graph.ids_for_names(&["Lobby", "Office", "Nowhere"]),
            vec![Some(1), Some(3), None]
        );
        assert_eq!(graph.anchor_by_name("Office").unwrap().id, 3);
    }

    #[test]
    fn test_add_edge_requires_known_anchors() {
        let mut graph = office();
        assert_eq!(graph.add_edge(1, 99, 1.0), Err(GraphError::UnknownAnchor(99)));
        assert!(graph.add_edge(1, 3, f32::NAN).is_err());
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_edges_are_symmetric() {
        let graph = office();
        assert_eq!(graph.neighbors(1).unwrap(), &[Neighbor::new(2, 5.0)]);
        assert!(graph.neighbors(2).unwrap().contains(&Neighbor::new(1, 5.0)));
        assert!(graph.neighbors(2).unwrap().contains(&Neighbor::new(3, 3.0)));
        assert_eq!(graph.neighbors(3).unwrap(), &[Neighbor::new(2, 3.0)]);
        assert_eq!(graph.neighbors(8), Err(GraphError::UnknownAnchor(8)));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut graph = office();
        graph.calculate_relative_transformations();

        graph.clear();
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.id_for_name("Lobby"), None);
        assert!(graph.relative_transformations().is_none());

        graph.clear();
        assert!(graph.is_empty());
        assert!(graph.adjacency().is_empty());
        assert_eq!(graph.anchor_ids().count(), 0);
    }

    #[test]
    fn test_connect_named_uniform() {
        let mut graph = office();
        graph.add_anchor(anchor(4, "Kitchen")).unwrap();

        let connected = graph
            .connect_named(4, &["Office", "Nowhere", "Kitchen", "Lobby"], WeightPolicy::default())
            .unwrap();

        assert_eq!(connected, vec![3, 1]);
        assert_eq!(graph.adjacency().weight(4, 3), Some(1.0));
        assert_eq!(graph.adjacency().weight(1, 4), Some(1.0));
    }

    #[test]
    fn test_connect_named_distance() {
        let mut graph = AnchorGraph::new();
        graph
            .add_anchor(Anchor::new(0, "Door", Translation::ZERO))
            .unwrap();
        graph
            .add_anchor(Anchor::new(1, "Desk", Translation::new(3.0, 0.0, 4.0)))
            .unwrap();

        graph
            .connect_named(1, &["Door"], WeightPolicy::Distance)
            .unwrap();
        assert_eq!(graph.adjacency().weight(0, 1), Some(5.0));

        assert_eq!(
            graph.connect_named(7, &["Door"], WeightPolicy::Distance),
            Err(GraphError::UnknownAnchor(7))
        );
    }

    #[test]
    fn test_connect_named_is_all_or_nothing() {
        let mut graph = AnchorGraph::new();
        graph
            .add_anchor(Anchor::new(0, "Door", Translation::ZERO))
            .unwrap();
        graph
            .add_anchor(Anchor::new(1, "Desk", Translation::new(1.0e19, 0.0, 0.0)))
            .unwrap();
        graph
            .add_anchor(Anchor::new(2, "Lamp", Translation::new(-1.0e19, 0.0, 0.0)))
            .unwrap();

        // Desk to Lamp overflows to an infinite distance after Door is planned.
        assert_eq!(
            graph.connect_named(1, &["Door", "Lamp"], WeightPolicy::Distance),
            Err(GraphError::InvalidWeight(f32::INFINITY))
        );
        assert_eq!(graph.edge_count(), 0);

        assert_eq!(
            graph.connect_named(1, &["Door"], WeightPolicy::Uniform { weight: -1.0 }),
            Err(GraphError::InvalidWeight(-1.0))
        );
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_nearest_anchor() {
        let graph = office();
        assert_eq!(graph.nearest_anchor(&Translation::new(2.2, 1.0, 0.0)), Some(2));
        // Equidistant from 1 and 2: first inserted wins.
        assert_eq!(graph.nearest_anchor(&Translation::new(1.5, 0.0, 0.0)), Some(1));
        assert_eq!(AnchorGraph::new().nearest_anchor(&Translation::ZERO), None);
    }

    #[test]
    fn test_stats() {
        let stats = office().stats();
        assert_eq!(stats.anchor_count, 3);
        assert_eq!(stats.edge_count, 2);
        assert_eq!(stats.topology_anchors, 3);
    }
}
