//! Symmetric adjacency storage.
//!
//! Adjacency is keyed by anchor id, so ids need not be contiguous. The order
//! in which anchors were first registered is kept alongside the map; path
//! search and the wire format both iterate in that order.

use crate::edge::{check_weight, GraphEdge, Neighbor};
use crate::error::GraphError;
use std::collections::{HashMap, HashSet};
use waymark_core::AnchorId;

/// Per-anchor neighbor lists of an undirected weighted graph.
///
/// Invariant: `b` is in `a`'s list with weight `w` iff `a` is in `b`'s list
/// with weight `w`. At most one entry exists per pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Adjacency {
    order: Vec<AnchorId>,
    lists: HashMap<AnchorId, Vec<Neighbor>>,
}

impl Adjacency {
    /// Creates an empty adjacency.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an anchor with no neighbors. Existing lists are left alone.
    ///
    /// Returns `true` if the anchor was not yet known.
    pub fn insert_anchor(&mut self, id: AnchorId) -> bool {
        if self.lists.contains_key(&id) {
            return false;
        }
        self.order.push(id);
        self.lists.insert(id, Vec::new());
        true
    }

    /// Returns true if the anchor has an adjacency list.
    pub fn contains(&self, id: AnchorId) -> bool {
        self.lists.contains_key(&id)
    }

    /// Anchor ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = AnchorId> + '_ {
        self.order.iter().copied()
    }

    /// The neighbors of an anchor, or `None` if it is unknown.
    pub fn neighbors(&self, id: AnchorId) -> Option<&[Neighbor]> {
        self.lists.get(&id).map(Vec::as_slice)
    }

    /// Weight of the edge between two anchors, if they are adjacent.
    pub fn weight(&self, a: AnchorId, b: AnchorId) -> Option<f32> {
        self.lists
            .get(&a)?
            .iter()
            .find(|n| n.id == b)
            .map(|n| n.weight)
    }

    /// Connects two registered anchors.
    ///
    /// A second edge between the same pair keeps whichever weight is smaller.
    pub fn link(&mut self, a: AnchorId, b: AnchorId, weight: f32) -> Result<(), GraphError> {
        let weight = check_weight(weight)?;
        if !self.contains(a) {
            return Err(GraphError::UnknownAnchor(a));
        }
        if !self.contains(b) {
            return Err(GraphError::UnknownAnchor(b));
        }
        if a == b {
            return Err(GraphError::SelfLoop(a));
        }

        match self.weight(a, b) {
            Some(existing) if existing <= weight => {}
            Some(_) => {
                self.set_weight(a, b, weight);
                self.set_weight(b, a, weight);
            }
            None => {
                self.push(a, Neighbor::new(b, weight));
                self.push(b, Neighbor::new(a, weight));
            }
        }
        Ok(())
    }

    fn push(&mut self, at: AnchorId, neighbor: Neighbor) {
        if let Some(list) = self.lists.get_mut(&at) {
            list.push(neighbor);
        }
    }

    fn set_weight(&mut self, at: AnchorId, to: AnchorId, weight: f32) {
        if let Some(entry) = self
            .lists
            .get_mut(&at)
            .and_then(|list| list.iter_mut().find(|n| n.id == to))
        {
            entry.weight = weight;
        }
    }

    /// Number of anchors with an adjacency list.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no anchor is registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.lists.values().map(Vec::len).sum::<usize>() / 2
    }

    /// Every undirected edge once, smaller id first, in registration order.
    pub fn edges(&self) -> Vec<GraphEdge> {
        self.order
            .iter()
            .flat_map(|&a| {
                self.lists
                    .get(&a)
                    .into_iter()
                    .flatten()
                    .filter(move |n| a < n.id)
                    .map(move |n| GraphEdge {
                        a,
                        b: n.id,
                        weight: n.weight,
                    })
            })
            .collect()
    }

    /// Removes everything.
    pub fn clear(&mut self) {
        self.order.clear();
        self.lists.clear();
    }

    /// Compares content, ignoring anchor order and neighbor order.
    pub fn is_equivalent(&self, other: &Adjacency) -> bool {
        if self.lists.len() != other.lists.len() {
            return false;
        }
        self.lists.iter().all(|(id, mine)| {
            other.lists.get(id).is_some_and(|theirs| {
                mine.len() == theirs.len()
                    && mine.iter().all(|n| {
                        theirs
                            .iter()
                            .any(|t| t.id == n.id && t.weight == n.weight)
                    })
            })
        })
    }

    /// Lists in registration order, for encoding.
    pub(crate) fn to_lists(&self) -> Vec<(AnchorId, Vec<Neighbor>)> {
        self.order
            .iter()
            .map(|id| (*id, self.lists.get(id).cloned().unwrap_or_default()))
            .collect()
    }

    /// Rebuilds adjacency from decoded lists, checking every invariant.
    pub(crate) fn from_lists(lists: Vec<(AnchorId, Vec<Neighbor>)>) -> Result<Self, String> {
        let mut adjacency = Adjacency::new();
        for (id, neighbors) in lists {
            if adjacency.lists.contains_key(&id) {
                return Err(format!("anchor {} is listed twice", id));
            }
            adjacency.order.push(id);
            adjacency.lists.insert(id, neighbors);
        }

        for &id in &adjacency.order {
            let mut seen = HashSet::new();
            for n in adjacency.neighbors(id).unwrap_or_default() {
                if n.id == id {
                    return Err(format!("anchor {} is connected to itself", id));
                }
                if !seen.insert(n.id) {
                    return Err(format!("anchor {} lists neighbor {} twice", id, n.id));
                }
                if check_weight(n.weight).is_err() {
                    return Err(format!("edge {}-{} has weight {}", id, n.id, n.weight));
                }
                if !adjacency.contains(n.id) {
                    return Err(format!("anchor {} lists unknown neighbor {}", id, n.id));
                }
                if adjacency.weight(n.id, id) != Some(n.weight) {
                    return Err(format!("edge {}-{} is not mirrored", id, n.id));
                }
            }
        }

        Ok(adjacency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Adjacency {
        let mut adj = Adjacency::new();
        for id in [1, 2, 3] {
            adj.insert_anchor(id);
        }
        adj.link(1, 2, 5.0).unwrap();
        adj.link(2, 3, 3.0).unwrap();
        adj.link(1, 3, 9.0).unwrap();
        adj
    }

    #[test]
    fn test_link_is_symmetric() {
        let adj = triangle();
        for edge in adj.edges() {
            assert_eq!(adj.weight(edge.a, edge.b), Some(edge.weight));
            assert_eq!(adj.weight(edge.b, edge.a), Some(edge.weight));
        }
        assert_eq!(adj.edge_count(), 3);
    }

    #[test]
    fn test_duplicate_link_keeps_minimum() {
        let mut adj = triangle();
        adj.link(2, 1, 7.0).unwrap();
        assert_eq!(adj.weight(1, 2), Some(5.0));

        adj.link(1, 2, 2.0).unwrap();
        assert_eq!(adj.weight(1, 2), Some(2.0));
        assert_eq!(adj.weight(2, 1), Some(2.0));
        assert_eq!(adj.edge_count(), 3);
        assert_eq!(adj.neighbors(1).unwrap().len(), 2);
    }

    #[test]
    fn test_link_rejects_bad_arguments() {
        let mut adj = triangle();
        assert_eq!(adj.link(1, 42, 1.0), Err(GraphError::UnknownAnchor(42)));
        assert_eq!(adj.link(1, 1, 1.0), Err(GraphError::SelfLoop(1)));
        assert_eq!(adj.link(1, 2, -1.0), Err(GraphError::InvalidWeight(-1.0)));
        assert_eq!(adj, triangle());
    }

    #[test]
    fn test_insert_anchor_keeps_existing_list() {
        let mut adj = triangle();
        assert!(!adj.insert_anchor(2));
        assert_eq!(adj.neighbors(2).unwrap().len(), 2);
        assert!(adj.insert_anchor(100));
        assert_eq!(adj.ids().collect::<Vec<_>>(), vec![1, 2, 3, 100]);
    }

    #[test]
    fn test_edges_listed_once() {
        let edges = triangle().edges();
        let pairs: Vec<_> = edges.iter().map(|e| (e.a, e.b)).collect();
        assert_eq!(pairs, vec![(1, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn test_equivalence_ignores_order() {
        let mut other = Adjacency::new();
        for id in [3, 1, 2] {
            other.insert_anchor(id);
        }
        other.link(3, 1, 9.0).unwrap();
        other.link(3, 2, 3.0).unwrap();
        other.link(2, 1, 5.0).unwrap();

        assert!(triangle().is_equivalent(&other));
        other.link(1, 2, 1.0).unwrap();
        assert!(!triangle().is_equivalent(&other));
    }

    #[test]
    fn test_from_lists_validation() {
        let ok = Adjacency::from_lists(triangle().to_lists()).unwrap();
        assert!(ok.is_equivalent(&triangle()));

        let one_sided = vec![(1, vec![Neighbor::new(2, 1.0)]), (2, vec![])];
        assert!(Adjacency::from_lists(one_sided).is_err());

        let dangling = vec![(1, vec![Neighbor::new(9, 1.0)])];
        assert!(Adjacency::from_lists(dangling).is_err());

        let mismatched = vec![
            (1, vec![Neighbor::new(2, 1.0)]),
            (2, vec![Neighbor::new(1, 2.0)]),
        ];
        assert!(Adjacency::from_lists(mismatched).is_err());

        let repeated = vec![(1, vec![]), (1, vec![])];
        assert!(Adjacency::from_lists(repeated).is_err());

        let negative = vec![
            (1, vec![Neighbor::new(2, -1.0)]),
            (2, vec![Neighbor::new(1, -1.0)]),
        ];
        assert!(Adjacency::from_lists(negative).is_err());
    }
}
