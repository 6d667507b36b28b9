//! Hosting anchors into a room and resolving a room on another device.
//!
//! A room is the list of [`RoomEntry`] values published under one room code.
//! Each entry carries the topology and relative transformations as they were
//! when that anchor was hosted, so the newest entry describes the whole room.

use crate::edge::WeightPolicy;
use crate::error::{CodecError, GraphError};
use crate::graph::AnchorGraph;
use crate::store::{RoomCode, RoomEntry, RoomStore, StoreError};
use thiserror::Error;
use tracing::info;
use waymark_core::{Anchor, Translation};

#[derive(Error, Debug)]
pub enum RoomError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("Room blob could not be decoded: {0}")]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A new anchor about to be published to a room.
#[derive(Debug, Clone)]
pub struct HostRequest {
    pub name: String,
    pub translation: Translation,
    pub cloud_anchor_id: Option<String>,
    /// Names of already-hosted anchors this one connects to.
    pub connect_to: Vec<String>,
}

/// Rebuilds a room's graph from its published entries.
pub fn resolve_room(entries: &[RoomEntry]) -> Result<AnchorGraph, RoomError> {
    let mut graph = AnchorGraph::new();
    for entry in entries {
        graph.add_anchor(entry.to_anchor())?;
    }

    if let Some(entry) = entries.iter().rev().find(|e| !e.adjacency.is_empty()) {
        graph.deserialize_adjacency(&entry.adjacency)?;
    }
    if let Some(entry) = entries.iter().rev().find(|e| !e.transforms.is_empty()) {
        graph.deserialize_transformations(&entry.transforms)?;
    }

    info!(
        "Resolved room: {} anchors, {} edges",
        graph.len(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Adds an anchor to `graph`, connects it and publishes it to `room`.
///
/// `graph` should hold the room as resolved from `store`; the new anchor
/// takes the room's next index as its id. The update is staged on a copy and
/// only replaces `graph` once the entry is stored, so a failed host leaves
/// both the graph and the room as they were.
pub fn host_anchor(
    store: &RoomStore,
    room: RoomCode,
    graph: &mut AnchorGraph,
    request: HostRequest,
    policy: WeightPolicy,
) -> Result<RoomEntry, RoomError> {
    policy.validate()?;
    let index = store.next_index(room)?;

    let mut staged = graph.clone();
    let mut anchor = Anchor::new(index, request.name.clone(), request.translation);
    if let Some(cloud_anchor_id) = &request.cloud_anchor_id {
        anchor = anchor.with_cloud_anchor_id(cloud_anchor_id.clone());
    }
    staged.add_anchor(anchor)?;
    let connected = staged.connect_named(index, request.connect_to.as_slice(), policy)?;
    staged.calculate_relative_transformations();

    let entry = RoomEntry {
        index,
        display_name: request.name,
        cloud_anchor_id: request.cloud_anchor_id.unwrap_or_default(),
        translation: request.translation,
        adjacency: staged.serialize_adjacency()?,
        transforms: staged.serialize_transformations()?,
        updated_at_ms: chrono::Utc::now().timestamp_millis(),
    };
    store.store_anchor(room, &entry)?;
    *graph = staged;

    info!(
        "Hosted anchor {} ({}) in room {}, connected to {:?}",
        index, entry.display_name, room, connected
    );
    Ok(entry)
}
