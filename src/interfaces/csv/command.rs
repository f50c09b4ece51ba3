use crate::application::hall::StudyHall;
use crate::application::lifecycle::NewStudent;
use crate::application::onboarding::NewEnrollment;
use crate::config::HallConfig;
use crate::domain::payment::PaymentUpdate;
use crate::error::{HallError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Seed,
    Register,
    Onboard,
    Assign,
    Free,
    Detach,
    Pay,
    UpdatePayment,
    Unassign,
    Delete,
    Cleanup,
}

/// One row of a command file. Which columns matter depends on `op`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Command {
    pub op: CommandKind,
    pub student: Option<u64>,
    pub table: Option<u64>,
    pub name: Option<String>,
    pub contact: Option<String>,
    pub room: Option<String>,
    pub number: Option<u32>,
    pub amount: Option<Decimal>,
    pub paid: Option<bool>,
    pub months: Option<i32>,
    pub roll: Option<String>,
}

fn required<T>(value: Option<T>, op: CommandKind, column: &str) -> Result<T> {
    value.ok_or_else(|| HallError::invalid(format!("{:?} needs the `{}` column", op, column)))
}

impl Command {
    /// Runs the command against the hall.
    pub async fn execute(self, hall: &StudyHall, config: &HallConfig) -> Result<()> {
        let op = self.op;
        debug!(?op, "executing command");
        match op {
            CommandKind::Seed => {
                hall.seed(&config.topology, config.seed.sample_students)
                    .await?;
            }
            CommandKind::Register => {
                hall.register_student(NewStudent {
                    name: required(self.name, op, "name")?,
                    roll_code: self.roll,
                    contact: self.contact.unwrap_or_default(),
                })
                .await?;
            }
            CommandKind::Onboard => {
                hall.create_and_assign(NewEnrollment {
                    name: required(self.name, op, "name")?,
                    contact: self.contact.unwrap_or_default(),
                    room_code: required(self.room, op, "room")?,
                    table_number: required(self.number, op, "number")?,
                    amount_paid: required(self.amount, op, "amount")?,
                })
                .await?;
            }
            CommandKind::Assign => {
                hall.assign(
                    required(self.student, op, "student")?,
                    required(self.table, op, "table")?,
                )
                .await?;
            }
            CommandKind::Free => {
                hall.free(required(self.table, op, "table")?).await?;
            }
            CommandKind::Detach => {
                hall.detach_student_only(required(self.table, op, "table")?)
                    .await?;
            }
            CommandKind::Pay => {
                hall.create_initial(
                    required(self.student, op, "student")?,
                    required(self.amount, op, "amount")?,
                )
                .await?;
            }
            CommandKind::UpdatePayment => {
                let update = PaymentUpdate {
                    amount: self.amount,
                    paid: self.paid,
                    months: self.months,
                };
                hall.update_payment(required(self.student, op, "student")?, update)
                    .await?;
            }
            CommandKind::Unassign => {
                hall.unassign_on_student_deletion(required(self.student, op, "student")?)
                    .await?;
            }
            CommandKind::Delete => {
                hall.delete_student(required(self.student, op, "student")?)
                    .await?;
            }
            CommandKind::Cleanup => {
                hall.clear_student_data().await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn parse(data: &str) -> Command {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(data.as_bytes());
        reader.deserialize().next().unwrap().unwrap()
    }

    #[test]
    fn test_onboard_deserialization() {
        let command = parse(
            "op, student, table, name, contact, room, number, amount\n\
             onboard, , , Asha Verma, 555-0101, A, 3, 500",
        );
        assert_eq!(command.op, CommandKind::Onboard);
        assert_eq!(command.student, None);
        assert_eq!(command.name.as_deref(), Some("Asha Verma"));
        assert_eq!(command.number, Some(3));
        assert_eq!(command.amount, Some(dec!(500)));
        assert_eq!(command.months, None);
    }

    #[test]
    fn test_update_payment_deserialization() {
        let command = parse(
            "op, student, table, name, contact, room, number, amount, paid, months\n\
             update_payment, 4, , , , , , , false, 3",
        );
        assert_eq!(command.op, CommandKind::UpdatePayment);
        assert_eq!(command.student, Some(4));
        assert_eq!(command.paid, Some(false));
        assert_eq!(command.months, Some(3));
        assert_eq!(command.amount, None);
    }

    #[test]
    fn test_missing_column_is_invalid_argument() {
        assert!(matches!(
            required::<u64>(None, CommandKind::Assign, "table"),
            Err(HallError::InvalidArgument(_))
        ));
    }
}
