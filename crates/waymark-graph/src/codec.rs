//! Text-safe wire format for sharing room state between devices.
//!
//! The remote store only holds scalar strings, so every blob is a single
//! `"<format>:<base64>"` string. The base64 payload is bincode with fixed-size
//! little-endian integers. The format tag is versioned so newer layouts can
//! sit next to old ones in the same room.

use crate::adjacency::Adjacency;
use crate::edge::Neighbor;
use crate::error::CodecError;
use crate::transform::TransformMatrix;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use waymark_core::AnchorId;

/// Format tag of an encoded adjacency.
pub const ADJACENCY_FORMAT: &str = "adj1";

/// Format tag of an encoded relative-transformation matrix.
pub const TRANSFORMS_FORMAT: &str = "rtm1";

/// Upper bound on a decoded payload, so a corrupt length prefix cannot
/// trigger a huge allocation.
const MAX_PAYLOAD_BYTES: u64 = 16 * 1024 * 1024;

#[derive(Serialize, Deserialize)]
struct AdjacencyList {
    id: AnchorId,
    neighbors: Vec<Neighbor>,
}

fn payload_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .with_limit(MAX_PAYLOAD_BYTES)
        .reject_trailing_bytes()
}

fn encode<T: Serialize>(format: &str, value: &T) -> Result<String, CodecError> {
    let bytes = payload_options().serialize(value)?;
    Ok(format!("{}:{}", format, BASE64.encode(bytes)))
}

fn decode<T: DeserializeOwned>(expected: &'static str, blob: &str) -> Result<T, CodecError> {
    let (found, payload) = blob.trim().split_once(':').ok_or(CodecError::MissingTag)?;
    if found != expected {
        return Err(CodecError::UnsupportedFormat {
            expected,
            found: found.to_string(),
        });
    }

    let bytes = BASE64.decode(payload)?;
    Ok(payload_options().deserialize(&bytes)?)
}

/// Encodes an adjacency in registration order.
pub fn encode_adjacency(adjacency: &Adjacency) -> Result<String, CodecError> {
    let lists: Vec<AdjacencyList> = adjacency
        .to_lists()
        .into_iter()
        .map(|(id, neighbors)| AdjacencyList { id, neighbors })
        .collect();
    encode(ADJACENCY_FORMAT, &lists)
}

/// Decodes and validates an adjacency.
pub fn decode_adjacency(blob: &str) -> Result<Adjacency, CodecError> {
    let lists: Vec<AdjacencyList> = decode(ADJACENCY_FORMAT, blob)?;
    Adjacency::from_lists(
        lists
            .into_iter()
            .map(|list| (list.id, list.neighbors))
            .collect(),
    )
    .map_err(CodecError::Corrupt)
}

/// Encodes a relative-transformation matrix.
pub fn encode_transforms(matrix: &TransformMatrix) -> Result<String, CodecError> {
    encode(TRANSFORMS_FORMAT, matrix)
}

/// Decodes and validates a relative-transformation matrix.
pub fn decode_transforms(blob: &str) -> Result<TransformMatrix, CodecError> {
    let matrix: TransformMatrix = decode(TRANSFORMS_FORMAT, blob)?;
    matrix.validate().map_err(CodecError::Corrupt)?;
    Ok(matrix)
}
