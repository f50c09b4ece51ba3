//! Atomic write sets.
//!
//! Every core operation reads what it needs, stages all of its writes in one
//! [`UnitOfWork`], and hands it to [`HallStore::commit`]. Each write carries
//! the version the operation read, so a store can reject the whole unit when
//! another operation got there first.
//!
//! [`HallStore::commit`]: super::ports::HallStore::commit

use super::payment::Payment;
use super::provisioning::Provisioning;
use super::room::Room;
use super::student::Student;
use super::table::StudyTable;
use super::{Entity, EntityKind};
use crate::error::{HallError, Result};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Room(Room),
    Table(StudyTable),
    Student(Student),
    Payment(Payment),
    Provisioning(Provisioning),
}

impl Record {
    pub fn key(&self) -> RecordKey {
        match self {
            Self::Room(r) => RecordKey::of(r),
            Self::Table(t) => RecordKey::of(t),
            Self::Student(s) => RecordKey::of(s),
            Self::Payment(p) => RecordKey::of(p),
            Self::Provisioning(p) => RecordKey::of(p),
        }
    }

    pub fn version(&self) -> u64 {
        match self {
            Self::Room(r) => r.version,
            Self::Table(t) => t.version,
            Self::Student(s) => s.version,
            Self::Payment(p) => p.version,
            Self::Provisioning(p) => p.version,
        }
    }

    /// The record with its version bumped, as a store persists it.
    pub fn committed(self) -> Self {
        match self {
            Self::Room(r) => Self::Room(r.committed()),
            Self::Table(t) => Self::Table(t.committed()),
            Self::Student(s) => Self::Student(s.committed()),
            Self::Payment(p) => Self::Payment(p.committed()),
            Self::Provisioning(p) => Self::Provisioning(p.committed()),
        }
    }
}

impl From<Room> for Record {
    fn from(room: Room) -> Self {
        Self::Room(room)
    }
}

impl From<StudyTable> for Record {
    fn from(table: StudyTable) -> Self {
        Self::Table(table)
    }
}

impl From<Student> for Record {
    fn from(student: Student) -> Self {
        Self::Student(student)
    }
}

impl From<Payment> for Record {
    fn from(payment: Payment) -> Self {
        Self::Payment(payment)
    }
}

impl From<Provisioning> for Record {
    fn from(provisioning: Provisioning) -> Self {
        Self::Provisioning(provisioning)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub kind: EntityKind,
    pub id: u64,
}

impl RecordKey {
    pub fn new(kind: EntityKind, id: u64) -> Self {
        Self { kind, id }
    }

    pub fn of<E: Entity>(entity: &E) -> Self {
        Self::new(E::KIND, entity.id())
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    /// Insert (version 0) or update (the version that was read).
    Put(Record),
    Delete { key: RecordKey, version: u64 },
}

impl Write {
    pub fn key(&self) -> RecordKey {
        match self {
            Self::Put(record) => record.key(),
            Self::Delete { key, .. } => *key,
        }
    }

    /// Checks this write against the version currently stored, if any.
    pub fn check(&self, stored: Option<u64>) -> Result<()> {
        let key = self.key();
        let expected = match self {
            Self::Put(record) => record.version(),
            Self::Delete { version, .. } => *version,
        };
        match (expected, stored) {
            (0, None) if matches!(self, Self::Put(_)) => Ok(()),
            (0, Some(_)) if matches!(self, Self::Put(_)) => {
                Err(HallError::conflict(format!("{} already exists", key)))
            }
            (expected, Some(stored)) if expected == stored => Ok(()),
            (_, Some(_)) => Err(HallError::conflict(format!(
                "{} was modified concurrently",
                key
            ))),
            (_, None) => Err(HallError::conflict(format!(
                "{} was deleted concurrently",
                key
            ))),
        }
    }
}

/// An ordered set of writes committed all-or-nothing. A key may appear at
/// most once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitOfWork {
    writes: Vec<Write>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages an insert or update and returns the entity as it will read
    /// back once committed.
    pub fn put<E>(&mut self, entity: E) -> E
    where
        E: Entity + Clone + Into<Record>,
    {
        self.writes.push(Write::Put(entity.clone().into()));
        entity.committed()
    }

    pub fn delete<E: Entity>(&mut self, entity: &E) {
        self.writes.push(Write::Delete {
            key: RecordKey::of(entity),
            version: entity.version(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn writes(&self) -> &[Write] {
        &self.writes
    }

    pub fn into_writes(self) -> Vec<Write> {
        self.writes
    }

    /// Validates every write against the stored versions reported by
    /// `stored_version`. Stores call this while holding their write
    /// serialization, before applying anything.
    pub fn validate<F>(&self, mut stored_version: F) -> Result<()>
    where
        F: FnMut(RecordKey) -> Result<Option<u64>>,
    {
        let mut seen = HashSet::with_capacity(self.writes.len());
        for write in &self.writes {
            let key = write.key();
            if !seen.insert(key) {
                return Err(HallError::InternalError(
                    format!("{} staged twice in one unit of work", key).into(),
                ));
            }
            write.check(stored_version(key)?)?;
        }
        Ok(())
    }
}
