use crate::domain::payment::Payment;
use crate::domain::ports::HallStore;
use crate::domain::provisioning::Provisioning;
use crate::domain::room::Room;
use crate::domain::student::Student;
use crate::domain::table::StudyTable;
use crate::domain::unit_of_work::{Record, RecordKey, UnitOfWork, Write};
use crate::domain::{EntityKind, PaymentId, RoomId, StudentId, TableId};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct HallState {
    rooms: BTreeMap<RoomId, Room>,
    tables: BTreeMap<TableId, StudyTable>,
    students: BTreeMap<StudentId, Student>,
    payments: BTreeMap<PaymentId, Payment>,
    provisioning: Option<Provisioning>,
    sequences: HashMap<EntityKind, u64>,
}

impl HallState {
    fn stored_version(&self, key: RecordKey) -> Option<u64> {
        match key.kind {
            EntityKind::Room => self.rooms.get(&key.id).map(|r| r.version),
            EntityKind::Table => self.tables.get(&key.id).map(|t| t.version),
            EntityKind::Student => self.students.get(&key.id).map(|s| s.version),
            EntityKind::Payment => self.payments.get(&key.id).map(|p| p.version),
            EntityKind::Provisioning => self
                .provisioning
                .as_ref()
                .filter(|p| p.id == key.id)
                .map(|p| p.version),
        }
    }

    fn apply(&mut self, write: Write) {
        match write {
            Write::Put(record) => match record.committed() {
                Record::Room(room) => {
                    self.rooms.insert(room.id, room);
                }
                Record::Table(table) => {
                    self.tables.insert(table.id, table);
                }
                Record::Student(student) => {
                    self.students.insert(student.id, student);
                }
                Record::Payment(payment) => {
                    self.payments.insert(payment.id, payment);
                }
                Record::Provisioning(provisioning) => {
                    self.provisioning = Some(provisioning);
                }
            },
            Write::Delete { key, .. } => match key.kind {
                EntityKind::Room => {
                    self.rooms.remove(&key.id);
                }
                EntityKind::Table => {
                    self.tables.remove(&key.id);
                }
                EntityKind::Student => {
                    self.students.remove(&key.id);
                }
                EntityKind::Payment => {
                    self.payments.remove(&key.id);
                }
                EntityKind::Provisioning => {
                    self.provisioning = None;
                }
            },
        }
    }
}

/// A thread-safe in-memory hall store.
///
/// All record maps live behind one `Arc<RwLock<..>>`, so a commit holds
/// the write guard while it validates and applies the whole unit of work.
/// Listings come back ordered by id.
#[derive(Default, Clone)]
pub struct InMemoryHallStore {
    state: Arc<RwLock<HallState>>,
}

impl InMemoryHallStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HallStore for InMemoryHallStore {
    async fn next_id(&self, kind: EntityKind) -> Result<u64> {
        let mut state = self.state.write().await;
        let sequence = state.sequences.entry(kind).or_insert(0);
        *sequence += 1;
        Ok(*sequence)
    }

    async fn room(&self, id: RoomId) -> Result<Option<Room>> {
        Ok(self.state.read().await.rooms.get(&id).cloned())
    }

    async fn rooms(&self) -> Result<Vec<Room>> {
        Ok(self.state.read().await.rooms.values().cloned().collect())
    }

    async fn table(&self, id: TableId) -> Result<Option<StudyTable>> {
        Ok(self.state.read().await.tables.get(&id).cloned())
    }

    async fn tables(&self) -> Result<Vec<StudyTable>> {
        Ok(self.state.read().await.tables.values().cloned().collect())
    }

    async fn student(&self, id: StudentId) -> Result<Option<Student>> {
        Ok(self.state.read().await.students.get(&id).cloned())
    }

    async fn students(&self) -> Result<Vec<Student>> {
        Ok(self.state.read().await.students.values().cloned().collect())
    }

    async fn payment(&self, id: PaymentId) -> Result<Option<Payment>> {
        Ok(self.state.read().await.payments.get(&id).cloned())
    }

    async fn payments(&self) -> Result<Vec<Payment>> {
        Ok(self.state.read().await.payments.values().cloned().collect())
    }

    async fn provisioning(&self) -> Result<Option<Provisioning>> {
        Ok(self.state.read().await.provisioning.clone())
    }

    async fn commit(&self, unit: UnitOfWork) -> Result<()> {
        let mut state = self.state.write().await;
        unit.validate(|key| Ok(state.stored_version(key)))?;
        for write in unit.into_writes() {
            state.apply(write);
        }
        Ok(())
    }
}
