//! Shortest paths between anchors.
//!
//! Rooms hold tens of anchors, so the frontier is a linear scan over the
//! adjacency order instead of a heap. Ties go to the anchor registered
//! first; that is an implementation detail, not a contract.

use crate::error::GraphError;
use crate::graph::AnchorGraph;
use std::collections::{HashMap, HashSet};
use tracing::debug;
use waymark_core::AnchorId;

impl AnchorGraph {
    /// Finds the cheapest path from `source` to `dest`, both inclusive.
    ///
    /// Returns an empty path when `dest` cannot be reached, including when
    /// every route to it costs more than `f32::MAX`. Ids without an
    /// adjacency entry are rejected with [`GraphError::UnknownAnchor`].
    pub fn find_path(&self, source: AnchorId, dest: AnchorId) -> Result<Vec<AnchorId>, GraphError> {
        for id in [source, dest] {
            if !self.adjacency.contains(id) {
                return Err(GraphError::UnknownAnchor(id));
            }
        }

        let mut distance: HashMap<AnchorId, f32> = HashMap::new();
        let mut parent: HashMap<AnchorId, AnchorId> = HashMap::new();
        let mut visited: HashSet<AnchorId> = HashSet::new();
        distance.insert(source, 0.0);

        loop {
            // Unvisited anchor with the smallest finite tentative distance.
            let mut closest: Option<(AnchorId, f32)> = None;
            for id in self.adjacency.ids() {
                if visited.contains(&id) {
                    continue;
                }
                let Some(&d) = distance.get(&id) else {
                    continue;
                };
                match closest {
                    Some((_, best)) if best <= d => {}
                    _ => closest = Some((id, d)),
                }
            }

            let Some((current, current_distance)) = closest else {
                debug!("No path from {} to {}", source, dest);
                return Ok(Vec::new());
            };

            if current == dest {
                let path = walk_back(&parent, source, dest);
                debug!(
                    "Path {} -> {}: {} hops, cost {}",
                    source,
                    dest,
                    path.len().saturating_sub(1),
                    current_distance
                );
                return Ok(path);
            }

            visited.insert(current);
            for neighbor in self.adjacency.neighbors(current).unwrap_or_default() {
                if visited.contains(&neighbor.id) {
                    continue;
                }
                let candidate = current_distance + neighbor.weight;
                // A sum that overflowed to infinity is not a reachable distance.
                if !candidate.is_finite() {
                    continue;
                }
                let improves = distance
                    .get(&neighbor.id)
                    .map_or(true, |&known| candidate < known);
                if improves {
                    distance.insert(neighbor.id, candidate);
                    parent.insert(neighbor.id, current);
                }
            }
        }
    }

    /// Returns true if `dest` can be reached from `source`.
    ///
    /// Unknown ids have no path.
    pub fn has_path(&self, source: AnchorId, dest: AnchorId) -> bool {
        self.find_path(source, dest)
            .map(|path| !path.is_empty())
            .unwrap_or(false)
    }

    /// Total weight of a path, or `None` if two consecutive anchors are not
    /// adjacent or the path is empty.
    pub fn path_cost(&self, path: &[AnchorId]) -> Option<f32> {
        if path.is_empty() {
            return None;
        }
        path.windows(2)
            .map(|pair| self.adjacency.weight(pair[0], pair[1]))
            .sum()
    }
}

/// Follows parent pointers from `dest` back to `source` and reverses.
fn walk_back(parent: &HashMap<AnchorId, AnchorId>, source: AnchorId, dest: AnchorId) -> Vec<AnchorId> {
    let mut path = vec![dest];
    let mut current = dest;
    while current != source {
        match parent.get(&current) {
            Some(&previous) => {
                path.push(previous);
                current = previous;
            }
            None => break,
        }
    }
    path.reverse();
    path
}
