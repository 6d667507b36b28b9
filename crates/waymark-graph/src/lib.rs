//! Waymark Graph - Anchor navigation graph
//!
//! This crate owns the graph of named anchors in a room: which anchors
//! exist, how they connect, and how to walk from one to another. It also
//! encodes that topology into text blobs so a second device can resolve the
//! same room and navigate it.
//!
//! # Architecture
//!
//! - `AnchorGraph` keeps anchor records, a name index and a symmetric,
//!   id-keyed adjacency.
//! - Shortest paths use Dijkstra with a linear-scan frontier.
//! - Two versioned wire formats: adjacency (`adj1`) and the relative
//!   transformation matrix (`rtm1`).
//! - `RoomStore` persists published room entries locally.
//!
//! The graph does no locking of its own. Callers that mutate it from several
//! callbacks share a [`SharedAnchorGraph`].
//!
//! # Example
//!
//! ```
//! use waymark_core::{Anchor, Translation};
//! use waymark_graph::AnchorGraph;
//!
//! let mut graph = AnchorGraph::new();
//! graph.add_anchor(Anchor::new(1, "Lobby", Translation::ZERO)).unwrap();
//! graph.add_anchor(Anchor::new(2, "Elevator", Translation::ZERO)).unwrap();
//! graph.add_anchor(Anchor::new(3, "Office", Translation::ZERO)).unwrap();
//! graph.add_edge(1, 2, 5.0).unwrap();
//! graph.add_edge(2, 3, 3.0).unwrap();
//!
//! assert_eq!(graph.find_path(1, 3).unwrap(), vec![1, 2, 3]);
//! ```

mod adjacency;
mod codec;
mod edge;
mod error;
mod graph;
mod path;
mod room;
mod store;
mod transform;

use parking_lot::Mutex;
use std::sync::Arc;

pub use adjacency::Adjacency;
pub use codec::{ADJACENCY_FORMAT, TRANSFORMS_FORMAT};
pub use edge::{GraphEdge, Neighbor, WeightPolicy};
pub use error::{CodecError, GraphError};
pub use graph::{AnchorGraph, GraphStats};
pub use room::{host_anchor, resolve_room, HostRequest, RoomError};
pub use store::{RoomCode, RoomEntry, RoomStore, StoreError};
pub use transform::TransformMatrix;

/// Graph shared between the callbacks that feed it.
pub type SharedAnchorGraph = Arc<Mutex<AnchorGraph>>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use waymark_core::{Anchor, Translation};

    #[test]
    fn test_shared_graph_serializes_writers() {
        let shared = AnchorGraph::new().into_shared();

        thread::scope(|scope| {
            for worker in 0..4u64 {
                let shared = Arc::clone(&shared);
                scope.spawn(move || {
                    for i in 0..10u64 {
                        let id = worker * 10 + i;
                        let anchor = Anchor::new(id, format!("anchor-{}", id), Translation::ZERO);
                        shared.lock().add_anchor(anchor).unwrap();
                    }
                });
            }
        });

        let mut graph = shared.lock();
        assert_eq!(graph.len(), 40);
        for id in 1..40 {
            graph.add_edge(id - 1, id, 1.0).unwrap();
        }
        assert_eq!(graph.find_path(0, 39).unwrap().len(), 40);
    }
}
