use super::hall::StudyHall;
use crate::domain::EntityKind;
use crate::domain::payment::Payment;
use crate::domain::room::normalize_room_code;
use crate::domain::student::Student;
use crate::domain::table::{StudyTable, validate_table_number};
use crate::domain::unit_of_work::UnitOfWork;
use crate::error::{HallError, Result};
use rust_decimal::Decimal;
use tracing::info;

/// A walk-in student asking for a specific table.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEnrollment {
    pub name: String,
    pub contact: String,
    pub room_code: String,
    pub table_number: u32,
    pub amount_paid: Decimal,
}

/// Everything `create_and_assign` wrote, as committed.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrollment {
    pub student: Student,
    pub payment: Payment,
    pub table: StudyTable,
}

impl StudyHall {
    /// Creates a student with a paid one-month payment and seats them at
    /// the requested table, all in one commit.
    ///
    /// Nothing is written if the room or table is unknown, the table is
    /// taken, or another operation claims the table first.
    pub async fn create_and_assign(&self, request: NewEnrollment) -> Result<Enrollment> {
        let room_code = normalize_room_code(&request.room_code)?;
        validate_table_number(request.table_number)?;

        let room = self.require_room_by_code(&room_code).await?;
        let mut table = self
            .store()
            .table_by_number(room.id, request.table_number)
            .await?
            .ok_or_else(|| {
                HallError::not_found("Table", format!("{}{}", room.code, request.table_number))
            })?;

        if table.occupied {
            return Err(HallError::conflict(format!(
                "table {} is already occupied",
                table.label()
            )));
        }

        let student_id = self.store().next_id(EntityKind::Student).await?;
        let payment_id = self.store().next_id(EntityKind::Payment).await?;

        let mut student = Student::new(student_id, request.name, None, request.contact)?;
        let payment = Payment::initial(payment_id, student_id, request.amount_paid, self.today())?;
        student.payment_id = Some(payment_id);
        student.table_id = Some(table.id);
        table.bind(student_id);

        let mut unit = UnitOfWork::new();
        let student = unit.put(student);
        let payment = unit.put(payment);
        let table = unit.put(table);
        self.commit(unit).await?;

        info!(
            student_id,
            table = %table.label(),
            amount = %payment.amount.value(),
            "student onboarded"
        );
        Ok(Enrollment {
            student,
            payment,
            table,
        })
    }
}
