use super::room::Room;
use super::{Entity, EntityKind, RoomId, StudentId, TableId};
use crate::error::{HallError, Result};
use serde::{Deserialize, Serialize};

/// A numbered study table inside a room.
///
/// `occupied` must be true exactly when `student_id` is set; the only
/// operation allowed to break that is [`StudyTable::detach_student`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyTable {
    pub id: TableId,
    /// Copy of the owning room's code.
    pub room_code: String,
    pub number: u32,
    pub occupied: bool,
    pub room_id: Option<RoomId>,
    pub student_id: Option<StudentId>,
    #[serde(default)]
    pub version: u64,
}

impl StudyTable {
    pub fn new(id: TableId, room: &Room, number: u32) -> Self {
        Self {
            id,
            room_code: room.code.clone(),
            number,
            occupied: false,
            room_id: Some(room.id),
            student_id: None,
            version: 0,
        }
    }

    pub fn is_free(&self) -> bool {
        !self.occupied && self.student_id.is_none()
    }

    /// Binds the table to a student and marks it occupied.
    pub fn bind(&mut self, student_id: StudentId) {
        self.student_id = Some(student_id);
        self.occupied = true;
    }

    /// Clears the student and the occupancy flag, returning the student
    /// that was bound.
    pub fn release(&mut self) -> Option<StudentId> {
        self.occupied = false;
        self.student_id.take()
    }

    /// Clears the student only; `occupied` keeps its value.
    pub fn detach_student(&mut self) -> Option<StudentId> {
        self.student_id.take()
    }

    pub fn label(&self) -> String {
        format!("{}{}", self.room_code, self.number)
    }
}

impl Entity for StudyTable {
    const KIND: EntityKind = EntityKind::Table;

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

pub fn validate_table_number(number: u32) -> Result<()> {
    if number == 0 {
        return Err(HallError::invalid("table numbers start at 1"));
    }
    Ok(())
}
