use super::hall::StudyHall;
use crate::domain::EntityKind;
use crate::domain::StudentId;
use crate::domain::payment::{Payment, PaymentUpdate};
use crate::domain::unit_of_work::UnitOfWork;
use crate::error::{HallError, Result};
use rust_decimal::Decimal;
use tracing::info;

impl StudyHall {
    /// Records a paid one-month payment for a student who has none.
    pub async fn create_initial(&self, student_id: StudentId, amount: Decimal) -> Result<Payment> {
        let mut student = self.require_student(student_id).await?;
        if let Some(existing) = self.linked_payment(&student).await? {
            return Err(HallError::conflict(format!(
                "student {} already has payment {}",
                student_id, existing.id
            )));
        }

        let id = self.store().next_id(EntityKind::Payment).await?;
        let payment = Payment::initial(id, student_id, amount, self.today())?;
        student.payment_id = Some(id);

        let mut unit = UnitOfWork::new();
        let payment = unit.put(payment);
        unit.put(student);
        self.commit(unit).await?;

        info!(student_id, payment_id = id, amount = %payment.amount.value(), "payment recorded");
        Ok(payment)
    }

    /// Applies a partial update to a student's payment, opening one dated
    /// today if the student has none.
    ///
    /// A renewal always counts `months` from today; it never extends the
    /// previous due date.
    pub async fn update_payment(
        &self,
        student_id: StudentId,
        update: PaymentUpdate,
    ) -> Result<Payment> {
        let mut student = self.require_student(student_id).await?;
        let today = self.today();
        let mut unit = UnitOfWork::new();

        let mut payment = match self.linked_payment(&student).await? {
            Some(payment) => payment,
            None => {
                let id = self.store().next_id(EntityKind::Payment).await?;
                student.payment_id = Some(id);
                unit.put(student.clone());
                Payment::opened(id, student_id, today)
            }
        };
        payment.apply(&update, today)?;

        let payment = unit.put(payment);
        self.commit(unit).await?;

        info!(
            student_id,
            payment_id = payment.id,
            paid = payment.paid,
            due_date = ?payment.due_date,
            "payment updated"
        );
        Ok(payment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::lifecycle::NewStudent;
    use crate::application::testing::{hall, today};
    use crate::domain::payment::due_date_from;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    async fn student(hall: &StudyHall) -> StudentId {
        hall.register_student(NewStudent {
            name: "Asha".into(),
            roll_code: None,
            contact: "555-0101".into(),
        })
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_create_initial() {
        let hall = hall();
        let asha = student(&hall).await;

        let payment = hall.create_initial(asha, dec!(500)).await.unwrap();
        assert!(payment.paid);
        assert_eq!(payment.duration_months, Some(1));
        assert_eq!(payment.due_date, Some(due_date_from(today(), 1).unwrap()));
        assert_eq!(hall.store().payment(payment.id).await.unwrap(), Some(payment.clone()));

        let student = hall.store().student(asha).await.unwrap().unwrap();
        assert_eq!(student.payment_id, Some(payment.id));

        assert!(matches!(
            hall.create_initial(asha, dec!(500)).await,
            Err(HallError::Conflict(_))
        ));
        assert!(matches!(
            hall.create_initial(99, dec!(500)).await,
            Err(HallError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_renews_from_today() {
        let hall = hall();
        let asha = student(&hall).await;
        let mut payment = hall.create_initial(asha, dec!(500)).await.unwrap();

        // Push the stored due date far out; a renewal must ignore it.
        payment.due_date = NaiveDate::from_ymd_opt(2030, 1, 1);
        let mut unit = UnitOfWork::new();
        unit.put(payment);
        hall.store().commit(unit).await.unwrap();

        let update = PaymentUpdate {
            months: Some(3),
            ..Default::default()
        };
        let payment = hall.update_payment(asha, update).await.unwrap();
        assert_eq!(payment.due_date, NaiveDate::from_ymd_opt(2027, 1, 18));
        assert_eq!(payment.duration_months, Some(3));
        assert_eq!(payment.amount.value(), dec!(500));
        assert!(payment.paid);
    }

    #[tokio::test]
    async fn test_update_opens_missing_payment() {
        let hall = hall();
        let asha = student(&hall).await;

        let update = PaymentUpdate {
            amount: Some(dec!(450)),
            ..Default::default()
        };
        let payment = hall.update_payment(asha, update).await.unwrap();
        assert_eq!(payment.amount.value(), dec!(450));
        assert_eq!(payment.payment_date, today());
        assert!(!payment.paid);
        assert_eq!(payment.due_date, None);

        let student = hall.store().student(asha).await.unwrap().unwrap();
        assert_eq!(student.payment_id, Some(payment.id));
    }

    #[tokio::test]
    async fn test_update_rejects_non_positive_months() {
        let hall = hall();
        let asha = student(&hall).await;
        let payment = hall.create_initial(asha, dec!(500)).await.unwrap();

        let update = PaymentUpdate {
            paid: Some(false),
            months: Some(-2),
            ..Default::default()
        };
        assert!(matches!(
            hall.update_payment(asha, update).await,
            Err(HallError::InvalidArgument(_))
        ));
        assert_eq!(hall.store().payment(payment.id).await.unwrap(), Some(payment));
        assert!(matches!(
            hall.update_payment(7, PaymentUpdate::default()).await,
            Err(HallError::NotFound { .. })
        ));
    }
}
