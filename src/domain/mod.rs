//! Domain layer: the hall records, their relationship rules, and the ports
//! the application layer talks to.

pub mod payment;
pub mod ports;
pub mod provisioning;
pub mod room;
pub mod student;
pub mod table;
pub mod unit_of_work;

use serde::{Deserialize, Serialize};
use std::fmt;

pub type RoomId = u64;
pub type TableId = u64;
pub type StudentId = u64;
pub type PaymentId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Room,
    Table,
    Student,
    Payment,
    Provisioning,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        Self::Room,
        Self::Table,
        Self::Student,
        Self::Payment,
        Self::Provisioning,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Room => "Room",
            Self::Table => "Table",
            Self::Student => "Student",
            Self::Payment => "Payment",
            Self::Provisioning => "Provisioning",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A persisted hall record.
///
/// `version` is 0 until the record is first committed; every committed write
/// bumps it by one. Stores compare it against the stored value to reject
/// writes based on a stale read.
pub trait Entity {
    const KIND: EntityKind;

    fn id(&self) -> u64;
    fn version(&self) -> u64;
    fn version_mut(&mut self) -> &mut u64;

    /// The record as it looks once a pending write has been committed.
    fn committed(mut self) -> Self
    where
        Self: Sized,
    {
        *self.version_mut() += 1;
        self
    }
}
