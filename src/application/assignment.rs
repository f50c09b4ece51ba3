use super::hall::StudyHall;
use crate::domain::student::Student;
use crate::domain::unit_of_work::UnitOfWork;
use crate::domain::{PaymentId, StudentId, TableId};
use crate::error::{HallError, Result};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub student_id: StudentId,
    pub table_id: TableId,
    /// The table the student held before, now free.
    pub released: Option<TableId>,
}

/// Result of [`StudyHall::detach_student_only`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detachment {
    pub table_id: TableId,
    pub detached: Option<StudentId>,
    /// The table still reads as occupied while nobody holds it. `free`
    /// clears it.
    pub stale_occupancy: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unassignment {
    pub released_table: Option<TableId>,
    pub deleted_payment: Option<PaymentId>,
}

impl StudyHall {
    /// Binds a student to a free table.
    ///
    /// Any table the student already holds is released in the same commit.
    pub async fn assign(&self, student_id: StudentId, table_id: TableId) -> Result<Assignment> {
        let mut student = self.require_student(student_id).await?;
        let mut table = self.require_table(table_id).await?;

        if table.occupied {
            return Err(HallError::conflict(format!(
                "table {} ({}) is already occupied",
                table.id,
                table.label()
            )));
        }

        let mut unit = UnitOfWork::new();
        let mut released = None;
        if let Some(previous_id) = student.table_id.filter(|id| *id != table_id)
            && let Some(mut previous) = self.store().table(previous_id).await?
            && previous.student_id == Some(student.id)
        {
            previous.release();
            unit.put(previous);
            released = Some(previous_id);
        }

        table.bind(student.id);
        student.table_id = Some(table.id);
        unit.put(table);
        unit.put(student);
        self.commit(unit).await?;

        info!(student_id, table_id, ?released, "student assigned");
        Ok(Assignment {
            student_id,
            table_id,
            released,
        })
    }

    /// Frees a table and clears the bound student's side of the link.
    ///
    /// Freeing a free table is a no-op. Returns the student that was bound.
    pub async fn free(&self, table_id: TableId) -> Result<Option<StudentId>> {
        let mut table = self.require_table(table_id).await?;
        if table.is_free() {
            debug!(table_id, "table already free");
            return Ok(None);
        }

        let mut unit = UnitOfWork::new();
        let student_id = table.release();
        if let Some(id) = student_id
            && let Some(mut student) = self.store().student(id).await?
            && student.table_id == Some(table_id)
        {
            student.table_id = None;
            unit.put(student);
        }
        unit.put(table);
        self.commit(unit).await?;

        info!(table_id, ?student_id, "table freed");
        Ok(student_id)
    }

    /// Clears the table's student reference without touching its occupancy
    /// flag.
    ///
    /// The student's own table reference is cleared as well. A table that was
    /// occupied stays occupied with nobody at it; this is reported through
    /// `stale_occupancy` and by [`StudyHall::audit`] until the table is freed.
    pub async fn detach_student_only(&self, table_id: TableId) -> Result<Detachment> {
        let mut table = self.require_table(table_id).await?;
        let Some(student_id) = table.detach_student() else {
            debug!(table_id, "no student to detach");
            return Ok(Detachment {
                table_id,
                detached: None,
                stale_occupancy: table.occupied,
            });
        };

        let mut unit = UnitOfWork::new();
        if let Some(mut student) = self.store().student(student_id).await?
            && student.table_id == Some(table_id)
        {
            student.table_id = None;
            unit.put(student);
        }
        let stale_occupancy = table.occupied;
        unit.put(table);
        self.commit(unit).await?;

        if stale_occupancy {
            warn!(
                table_id,
                student_id, "student detached; table still marked occupied until freed"
            );
        }
        Ok(Detachment {
            table_id,
            detached: Some(student_id),
            stale_occupancy,
        })
    }

    /// Releases the student's table and deletes their payment, keeping the
    /// student record.
    pub async fn unassign_on_student_deletion(
        &self,
        student_id: StudentId,
    ) -> Result<Unassignment> {
        let mut student = self.require_student(student_id).await?;
        let mut unit = UnitOfWork::new();
        let outcome = self.stage_release(&mut unit, &mut student).await?;
        unit.put(student);
        self.commit(unit).await?;

        info!(student_id, ?outcome, "student unassigned");
        Ok(outcome)
    }

    /// Deletes a student after releasing their table and deleting their
    /// payment, all in one commit.
    pub async fn delete_student(&self, student_id: StudentId) -> Result<Unassignment> {
        let mut student = self.require_student(student_id).await?;
        let mut unit = UnitOfWork::new();
        let outcome = self.stage_release(&mut unit, &mut student).await?;
        unit.delete(&student);
        self.commit(unit).await?;

        info!(student_id, ?outcome, "student deleted");
        Ok(outcome)
    }

    /// Stages the table release, then the payment deletion, and clears both
    /// links on `student`.
    async fn stage_release(
        &self,
        unit: &mut UnitOfWork,
        student: &mut Student,
    ) -> Result<Unassignment> {
        let mut outcome = Unassignment::default();

        if let Some(table_id) = student.table_id.take()
            && let Some(mut table) = self.store().table(table_id).await?
            && table.student_id == Some(student.id)
        {
            table.release();
            unit.put(table);
            outcome.released_table = Some(table_id);
        }

        if let Some(payment) = self.linked_payment(student).await? {
            unit.delete(&payment);
            outcome.deleted_payment = Some(payment.id);
        }
        student.payment_id = None;

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::lifecycle::NewStudent;
    use crate::application::testing::seeded_hall;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    async fn student(hall: &StudyHall, name: &str) -> StudentId {
        hall.register_student(NewStudent {
            name: name.into(),
            roll_code: None,
            contact: "555-0100".into(),
        })
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_assign_binds_both_sides() {
        let hall = seeded_hall().await;
        let asha = student(&hall, "Asha").await;

        let assignment = hall.assign(asha, 2).await.unwrap();
        assert_eq!(assignment.released, None);

        let table = hall.store().table(2).await.unwrap().unwrap();
        assert!(table.occupied);
        assert_eq!(table.student_id, Some(asha));
        let student = hall.store().student(asha).await.unwrap().unwrap();
        assert_eq!(student.table_id, Some(2));
    }

    #[tokio::test]
    async fn test_assign_unknown_ids() {
        let hall = seeded_hall().await;
        let asha = student(&hall, "Asha").await;

        assert!(matches!(
            hall.assign(99, 1).await,
            Err(HallError::NotFound { entity: "Student", .. })
        ));
        assert!(matches!(
            hall.assign(asha, 99).await,
            Err(HallError::NotFound { entity: "Table", .. })
        ));
    }

    #[tokio::test]
    async fn test_assign_occupied_table_conflicts() {
        let hall = seeded_hall().await;
        let asha = student(&hall, "Asha").await;
        let rohan = student(&hall, "Rohan").await;
        hall.assign(asha, 1).await.unwrap();

        assert!(matches!(
            hall.assign(rohan, 1).await,
            Err(HallError::Conflict(_))
        ));
        let rohan = hall.store().student(rohan).await.unwrap().unwrap();
        assert_eq!(rohan.table_id, None);
    }

    #[tokio::test]
    async fn test_reassign_releases_previous_table() {
        let hall = seeded_hall().await;
        let asha = student(&hall, "Asha").await;
        hall.assign(asha, 1).await.unwrap();

        let assignment = hall.assign(asha, 5).await.unwrap();
        assert_eq!(assignment.released, Some(1));

        let previous = hall.store().table(1).await.unwrap().unwrap();
        assert!(!previous.occupied);
        assert_eq!(previous.student_id, None);

        let current = hall.store().table(5).await.unwrap().unwrap();
        assert_eq!(current.student_id, Some(asha));
        assert!(hall.audit().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_free_clears_both_sides() {
        let hall = seeded_hall().await;
        let asha = student(&hall, "Asha").await;
        hall.assign(asha, 3).await.unwrap();

        assert_eq!(hall.free(3).await.unwrap(), Some(asha));

        let table = hall.store().table(3).await.unwrap().unwrap();
        assert!(table.is_free());
        let student = hall.store().student(asha).await.unwrap().unwrap();
        assert_eq!(student.table_id, None);
    }

    #[tokio::test]
    async fn test_free_is_idempotent() {
        let hall = seeded_hall().await;
        let before = hall.store().table(4).await.unwrap().unwrap();

        assert_eq!(hall.free(4).await.unwrap(), None);
        assert_eq!(hall.free(4).await.unwrap(), None);
        assert_eq!(hall.store().table(4).await.unwrap().unwrap(), before);

        assert!(matches!(
            hall.free(404).await,
            Err(HallError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_detach_leaves_stale_occupancy() {
        let hall = seeded_hall().await;
        let asha = student(&hall, "Asha").await;
        hall.assign(asha, 2).await.unwrap();

        let detachment = hall.detach_student_only(2).await.unwrap();
        assert_eq!(detachment.detached, Some(asha));
        assert!(detachment.stale_occupancy);

        let table = hall.store().table(2).await.unwrap().unwrap();
        assert!(table.occupied);
        assert_eq!(table.student_id, None);
        let student = hall.store().student(asha).await.unwrap().unwrap();
        assert_eq!(student.table_id, None);
        assert_eq!(hall.audit().await.unwrap().len(), 1);

        // Still blocked until freed.
        assert!(matches!(hall.assign(asha, 2).await, Err(HallError::Conflict(_))));
        assert_eq!(hall.free(2).await.unwrap(), None);
        assert!(hall.audit().await.unwrap().is_empty());
        hall.assign(asha, 2).await.unwrap();
    }

    #[tokio::test]
    async fn test_unassign_on_student_deletion_keeps_student() {
        let hall = seeded_hall().await;
        let asha = student(&hall, "Asha").await;
        hall.assign(asha, 1).await.unwrap();
        let payment = hall.create_initial(asha, dec!(500)).await.unwrap();

        let outcome = hall.unassign_on_student_deletion(asha).await.unwrap();
        assert_eq!(
            outcome,
            Unassignment {
                released_table: Some(1),
                deleted_payment: Some(payment.id),
            }
        );

        let student = hall.store().student(asha).await.unwrap().unwrap();
        assert_eq!(student.table_id, None);
        assert_eq!(student.payment_id, None);
        assert!(hall.store().payment(payment.id).await.unwrap().is_none());
        assert!(hall.store().table(1).await.unwrap().unwrap().is_free());
    }

    #[tokio::test]
    async fn test_delete_student_cascades() {
        let hall = seeded_hall().await;
        let asha = student(&hall, "Asha").await;
        hall.assign(asha, 6).await.unwrap();
        let payment = hall.create_initial(asha, dec!(500)).await.unwrap();

        hall.delete_student(asha).await.unwrap();

        assert!(hall.store().student(asha).await.unwrap().is_none());
        assert!(hall.store().payment(payment.id).await.unwrap().is_none());
        let table = hall.store().table(6).await.unwrap().unwrap();
        assert!(table.is_free());
        assert!(matches!(
            hall.delete_student(asha).await,
            Err(HallError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_concurrent_assign_single_winner() {
        let hall = Arc::new(seeded_hall().await);
        let asha = student(&hall, "Asha").await;
        let rohan = student(&hall, "Rohan").await;

        let handles = [asha, rohan].map(|id| {
            let hall = Arc::clone(&hall);
            tokio::spawn(async move { hall.assign(id, 1).await })
        });

        let mut wins = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => wins += 1,
                Err(e) => assert!(matches!(e, HallError::Conflict(_))),
            }
        }
        assert_eq!(wins, 1);

        let table = hall.store().table(1).await.unwrap().unwrap();
        let holder = table.student_id.unwrap();
        let holder = hall.store().student(holder).await.unwrap().unwrap();
        assert_eq!(holder.table_id, Some(1));
        assert!(hall.audit().await.unwrap().is_empty());
    }
}
