use serde::{Deserialize, Serialize};
use sled::Db;
use std::path::Path;
use thiserror::Error;
use waymark_core::{Anchor, AnchorId, Translation};

/// Room codes are minted by the store, counting up from 1.
pub type RoomCode = u64;

const LAST_ROOM_CODE: &str = "last_room_code";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sled(#[from] sled::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("Corrupt value under key {0}")]
    Corrupt(String),
}

/// Everything one hosted anchor publishes to its room.
///
/// `adjacency` and `transforms` are opaque wire blobs, stored exactly as the
/// hosting device produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomEntry {
    pub index: AnchorId,
    pub display_name: String,
    pub cloud_anchor_id: String,
    pub translation: Translation,
    pub adjacency: String,
    pub transforms: String,
    pub updated_at_ms: i64,
}

impl RoomEntry {
    /// The anchor record this entry describes.
    pub fn to_anchor(&self) -> Anchor {
        let anchor = Anchor::new(self.index, self.display_name.clone(), self.translation);
        if self.cloud_anchor_id.is_empty() {
            anchor
        } else {
            anchor.with_cloud_anchor_id(self.cloud_anchor_id.clone())
        }
    }
}

/// Local stand-in for the shared key-value store rooms are published to.
pub struct RoomStore {
    db: Db,
}

fn anchors_prefix(room: RoomCode) -> String {
    format!("room/{:020}/anchor/", room)
}

fn entry_key(room: RoomCode, index: AnchorId) -> String {
    format!("room/{:020}/anchor/{:020}", room, index)
}

fn last_idx_key(room: RoomCode) -> String {
    format!("room/{:020}/last_idx", room)
}

fn decode_u64(bytes: &[u8]) -> Option<u64> {
    let array: [u8; 8] = bytes.try_into().ok()?;
    Some(u64::from_be_bytes(array))
}

impl RoomStore {
    /// Opens or creates a room store at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Reserves a fresh room code.
    pub fn new_room_code(&self) -> Result<RoomCode, StoreError> {
        let updated = self.db.update_and_fetch(LAST_ROOM_CODE, |old| {
            let last = old.and_then(decode_u64).unwrap_or(0);
            Some((last + 1).to_be_bytes().to_vec())
        })?;
        self.db.flush()?;

        updated
            .as_deref()
            .and_then(decode_u64)
            .ok_or_else(|| StoreError::Corrupt(LAST_ROOM_CODE.to_string()))
    }

    /// Publishes an anchor entry under its index.
    ///
    /// The entry and the room's `last_idx` are written in one batch.
    pub fn store_anchor(&self, room: RoomCode, entry: &RoomEntry) -> Result<(), StoreError> {
        let bytes = bincode::serialize(entry)?;
        let last = match self.last_index(room)? {
            Some(last) if last >= entry.index => last,
            _ => entry.index,
        };

        let mut batch = sled::Batch::default();
        batch.insert(entry_key(room, entry.index).as_bytes(), bytes);
        batch.insert(last_idx_key(room).as_bytes(), &last.to_be_bytes()[..]);
        self.db.apply_batch(batch)?;

        self.db.flush()?;
        Ok(())
    }

    /// Loads every entry of a room, ordered by index.
    pub fn load_room(&self, room: RoomCode) -> Result<Vec<RoomEntry>, StoreError> {
        self.db
            .scan_prefix(anchors_prefix(room))
            .values()
            .map(|value| -> Result<RoomEntry, StoreError> { Ok(bincode::deserialize(&value?)?) })
            .collect()
    }

    /// Highest index published to the room, if any.
    ///
    /// Takes the larger of `last_idx` and the highest stored entry key, so a
    /// stale counter never hands out an index that is already taken.
    pub fn last_index(&self, room: RoomCode) -> Result<Option<AnchorId>, StoreError> {
        let key = last_idx_key(room);
        let counter = match self.db.get(&key)? {
            Some(bytes) => Some(decode_u64(&bytes).ok_or(StoreError::Corrupt(key))?),
            None => None,
        };

        let prefix = anchors_prefix(room);
        let highest = match self.db.scan_prefix(&prefix).next_back() {
            Some(item) => {
                let (key, _) = item?;
                let index = std::str::from_utf8(&key)
                    .ok()
                    .and_then(|key| key.strip_prefix(prefix.as_str()))
                    .and_then(|index| index.parse::<AnchorId>().ok())
                    .ok_or_else(|| StoreError::Corrupt(String::from_utf8_lossy(&key).into_owned()))?;
                Some(index)
            }
            None => None,
        };

        Ok(counter.max(highest))
    }

    /// Index the next hosted anchor should use.
    pub fn next_index(&self, room: RoomCode) -> Result<AnchorId, StoreError> {
        Ok(self.last_index(room)?.map_or(0, |last| last + 1))
    }

    /// Removes every entry of a room.
    pub fn clear_room(&self, room: RoomCode) -> Result<(), StoreError> {
        let mut batch = sled::Batch::default();
        for key in self.db.scan_prefix(format!("room/{:020}/", room)).keys() {
            batch.remove(key?);
        }
        self.db.apply_batch(batch)?;
        self.db.flush()?;
        Ok(())
    }
}
