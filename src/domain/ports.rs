use super::payment::Payment;
use super::provisioning::Provisioning;
use super::room::Room;
use super::student::Student;
use super::table::StudyTable;
use super::unit_of_work::UnitOfWork;
use super::{EntityKind, PaymentId, RoomId, StudentId, TableId};
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Keyed storage for the hall records.
///
/// Reads are plain lookups. All mutation goes through [`HallStore::commit`],
/// which must apply a unit of work atomically and reject it as a whole with
/// `HallError::Conflict` when any staged version no longer matches.
#[async_trait]
pub trait HallStore: Send + Sync {
    /// Allocates the next identifier for `kind`. Identifiers are never reused.
    async fn next_id(&self, kind: EntityKind) -> Result<u64>;

    async fn room(&self, id: RoomId) -> Result<Option<Room>>;
    async fn rooms(&self) -> Result<Vec<Room>>;
    async fn table(&self, id: TableId) -> Result<Option<StudyTable>>;
    async fn tables(&self) -> Result<Vec<StudyTable>>;
    async fn student(&self, id: StudentId) -> Result<Option<Student>>;
    async fn students(&self) -> Result<Vec<Student>>;
    async fn payment(&self, id: PaymentId) -> Result<Option<Payment>>;
    async fn payments(&self) -> Result<Vec<Payment>>;
    /// The record left by the seed that provisioned the hall, if any.
    async fn provisioning(&self) -> Result<Option<Provisioning>>;

    async fn commit(&self, unit: UnitOfWork) -> Result<()>;

    async fn room_by_code(&self, code: &str) -> Result<Option<Room>> {
        Ok(self.rooms().await?.into_iter().find(|room| room.code == code))
    }

    async fn table_by_number(&self, room_id: RoomId, number: u32) -> Result<Option<StudyTable>> {
        Ok(self
            .tables()
            .await?
            .into_iter()
            .find(|table| table.room_id == Some(room_id) && table.number == number))
    }

    async fn unoccupied_tables(&self) -> Result<Vec<StudyTable>> {
        let mut tables = self.tables().await?;
        tables.retain(|table| !table.occupied);
        Ok(tables)
    }
}

/// Source of "today" for payment windows.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

pub type HallStoreBox = Box<dyn HallStore>;
pub type ClockBox = Box<dyn Clock>;
