use super::{Entity, EntityKind, RoomId, TableId};
use crate::error::{HallError, Result};
use serde::{Deserialize, Serialize};

pub const MAX_ROOM_CODE_LEN: usize = 16;

/// A study room and the tables it owns, in provisioning order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    /// Short code the room is addressed by (usually a single letter).
    pub code: String,
    pub name: String,
    pub table_ids: Vec<TableId>,
    #[serde(default)]
    pub version: u64,
}

impl Room {
    pub fn new(id: RoomId, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
            name: name.into(),
            table_ids: Vec::new(),
            version: 0,
        }
    }
}

impl Entity for Room {
    const KIND: EntityKind = EntityKind::Room;

    fn id(&self) -> u64 {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn version_mut(&mut self) -> &mut u64 {
        &mut self.version
    }
}

/// Trims a room code and rejects empty or oversized ones.
pub fn normalize_room_code(raw: &str) -> Result<String> {
    let code = raw.trim();
    if code.is_empty() {
        return Err(HallError::invalid("room code must not be empty"));
    }
    if code.chars().count() > MAX_ROOM_CODE_LEN {
        return Err(HallError::invalid(format!(
            "room code `{}` is longer than {} characters",
            code, MAX_ROOM_CODE_LEN
        )));
    }
    Ok(code.to_string())
}
