use crate::domain::payment::Payment;
use crate::domain::ports::{ClockBox, HallStore, HallStoreBox};
use crate::domain::room::Room;
use crate::domain::student::Student;
use crate::domain::table::StudyTable;
use crate::domain::unit_of_work::UnitOfWork;
use crate::domain::{StudentId, TableId};
use crate::error::{HallError, Result};
use crate::infrastructure::clock::SystemClock;
use chrono::NaiveDate;
use tracing::warn;

/// The study hall service.
///
/// Owns the store and the clock. Operations live in the sibling modules:
/// `assignment`, `payments`, `onboarding`, `directory` and `lifecycle`.
pub struct StudyHall {
    store: HallStoreBox,
    clock: ClockBox,
}

impl StudyHall {
    /// Creates a new `StudyHall`.
    ///
    /// # Arguments
    ///
    /// * `store` - Where rooms, tables, students and payments live.
    /// * `clock` - Supplies "today" for payment windows.
    pub fn new(store: HallStoreBox, clock: ClockBox) -> Self {
        Self { store, clock }
    }

    /// A hall dated by the local system clock.
    pub fn with_system_clock(store: HallStoreBox) -> Self {
        Self::new(store, Box::new(SystemClock))
    }

    pub fn store(&self) -> &dyn HallStore {
        self.store.as_ref()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub(crate) async fn require_student(&self, id: StudentId) -> Result<Student> {
        self.store
            .student(id)
            .await?
            .ok_or_else(|| HallError::not_found("Student", id))
    }

    pub(crate) async fn require_table(&self, id: TableId) -> Result<StudyTable> {
        self.store
            .table(id)
            .await?
            .ok_or_else(|| HallError::not_found("Table", id))
    }

    pub(crate) async fn require_room_by_code(&self, code: &str) -> Result<Room> {
        self.store
            .room_by_code(code)
            .await?
            .ok_or_else(|| HallError::not_found("Room", code))
    }

    /// The payment a student links to, if the link resolves.
    pub(crate) async fn linked_payment(&self, student: &Student) -> Result<Option<Payment>> {
        match student.payment_id {
            Some(id) => self.store.payment(id).await,
            None => Ok(None),
        }
    }

    pub(crate) async fn commit(&self, unit: UnitOfWork) -> Result<()> {
        if unit.is_empty() {
            return Ok(());
        }
        let writes = unit.len();
        self.store.commit(unit).await.inspect_err(|e| {
            if let HallError::Conflict(reason) = e {
                warn!(writes, %reason, "unit of work rejected");
            }
        })
    }
}
