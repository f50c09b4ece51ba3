use super::{Entity, EntityKind, PaymentId, StudentId};
use crate::error::{HallError, Result};
use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A non-negative monetary amount.
///
/// Wraps `rust_decimal::Decimal` so fees can never go below zero.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(HallError::invalid("amount must not be negative"))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

/// Partial update of a student's payment. Absent fields stay untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentUpdate {
    pub amount: Option<Decimal>,
    pub paid: Option<bool>,
    /// Renews the validity window to `months` from today.
    pub months: Option<i32>,
}

/// The payment authorizing a student's occupancy between `payment_date`
/// and `due_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub amount: Amount,
    pub paid: bool,
    pub payment_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub duration_months: Option<u32>,
    pub student_id: StudentId,
    #[serde(default)]
    pub version: u64,
}

impl Payment {
    /// An empty, unpaid record opened today.
    pub fn opened(id: PaymentId, student_id: StudentId, today: NaiveDate) -> Self {
        Self {
            id,
            amount: Amount::ZERO,
            paid: false,
            payment_date: today,
            due_date: None,
            duration_months: None,
            student_id,
            version: 0,
        }
    }

    /// A paid, one-month payment starting today.
    pub fn initial(
        id: PaymentId,
        student_id: StudentId,
        amount: Decimal,
        today: NaiveDate,
    ) -> Result<Self> {
        let mut payment = Self::opened(id, student_id, today);
        payment.amount = Amount::new(amount)?;
        payment.paid = true;
        payment.renew(1, today)?;
        Ok(payment)
    }

    /// Resets the validity window to `months` starting at `today`.
    pub fn renew(&mut self, months: u32, today: NaiveDate) -> Result<()> {
        self.due_date = Some(due_date_from(today, months)?);
        self.duration_months = Some(months);
        Ok(())
    }

    /// Applies a partial update. Nothing changes if any field is invalid.
    pub fn apply(&mut self, update: &PaymentUpdate, today: NaiveDate) -> Result<()> {
        let amount = update.amount.map(Amount::new).transpose()?;
        let months = match update.months {
            Some(months) if months > 0 => Some(months as u32),
            Some(months) => {
                return Err(HallError::invalid(format!(
                    "duration must be a positive number of months, got {}",
                    months
                )));
            }
            None => None,
        };
        let due_date = months.map(|m| due_date_from(today, m)).transpose()?;

        if let Some(amount) = amount {
            self.amount = amount;
        }
        if let Some(paid) = update.paid {
            self.paid = paid;
        }
        if let (Some(months), Some(due_date)) = (months, due_date) {
            self.duration_months = Some(months);
            self.due_date = Some(due_date);
        }
        Ok(())
    }
}

impl Entity for Payment {
    const KIND: EntityKind = EntityKind::Payment;

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

/// Calendar-month addition, clamped to the end of shorter months.
pub fn due_date_from(today: NaiveDate, months: u32) -> Result<NaiveDate> {
    today
        .checked_add_months(Months::new(months))
        .ok_or_else(|| {
            HallError::invalid(format!("{} months from {} is out of range", months, today))
        })
}
