use super::hall::StudyHall;
use crate::domain::payment::Payment;
use crate::domain::room::Room;
use crate::domain::student::Student;
use crate::domain::table::StudyTable;
use crate::domain::{PaymentId, RoomId, StudentId, TableId};
use crate::error::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableTable {
    pub table_id: TableId,
    pub room_code: String,
    pub table_number: u32,
    pub room_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub id: RoomId,
    pub code: String,
    pub name: String,
}

/// A student with their seat and payment flattened in.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentSummary {
    pub id: StudentId,
    pub name: String,
    pub roll_code: Option<String>,
    pub contact: String,
    pub room_code: Option<String>,
    pub table_number: Option<u32>,
    pub amount_paid: Option<Decimal>,
    pub paid: bool,
    pub payment_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
}

/// A broken relationship found by [`StudyHall::audit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    OccupiedWithoutStudent {
        table_id: TableId,
    },
    StudentWithoutOccupancy {
        table_id: TableId,
        student_id: StudentId,
    },
    /// The table names a student who does not point back at it.
    TableLinkNotReciprocated {
        table_id: TableId,
        student_id: StudentId,
    },
    /// The student names a table that does not point back at them.
    StudentLinkNotReciprocated {
        student_id: StudentId,
        table_id: TableId,
    },
    StudentOnSeveralTables {
        student_id: StudentId,
        table_ids: Vec<TableId>,
    },
    DanglingPayment {
        student_id: StudentId,
        payment_id: PaymentId,
    },
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OccupiedWithoutStudent { table_id } => {
                write!(f, "table {} is occupied but has no student", table_id)
            }
            Self::StudentWithoutOccupancy {
                table_id,
                student_id,
            } => write!(
                f,
                "table {} holds student {} but is not marked occupied",
                table_id, student_id
            ),
            Self::TableLinkNotReciprocated {
                table_id,
                student_id,
            } => write!(
                f,
                "table {} points at student {} who does not point back",
                table_id, student_id
            ),
            Self::StudentLinkNotReciprocated {
                student_id,
                table_id,
            } => write!(
                f,
                "student {} points at table {} which does not point back",
                student_id, table_id
            ),
            Self::StudentOnSeveralTables {
                student_id,
                table_ids,
            } => write!(f, "student {} is held by tables {:?}", student_id, table_ids),
            Self::DanglingPayment {
                student_id,
                payment_id,
            } => write!(
                f,
                "student {} links payment {} which is missing or belongs elsewhere",
                student_id, payment_id
            ),
        }
    }
}

impl StudyHall {
    /// Every unoccupied table, ordered by room code then table number.
    pub async fn available_tables(&self) -> Result<Vec<AvailableTable>> {
        let rooms: HashMap<RoomId, Room> = self
            .store()
            .rooms()
            .await?
            .into_iter()
            .map(|room| (room.id, room))
            .collect();

        let mut available: Vec<AvailableTable> = self
            .store()
            .unoccupied_tables()
            .await?
            .into_iter()
            .map(|table| AvailableTable {
                room_name: table
                    .room_id
                    .and_then(|id| rooms.get(&id))
                    .map(|room| room.name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                table_id: table.id,
                room_code: table.room_code,
                table_number: table.number,
            })
            .collect();
        available.sort_by(|a, b| {
            (a.room_code.as_str(), a.table_number).cmp(&(b.room_code.as_str(), b.table_number))
        });
        Ok(available)
    }

    pub async fn rooms(&self) -> Result<Vec<RoomSummary>> {
        let mut rooms: Vec<RoomSummary> = self
            .store()
            .rooms()
            .await?
            .into_iter()
            .map(|room| RoomSummary {
                id: room.id,
                code: room.code,
                name: room.name,
            })
            .collect();
        rooms.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(rooms)
    }

    pub async fn student(&self, id: StudentId) -> Result<Student> {
        self.require_student(id).await
    }

    pub async fn students(&self) -> Result<Vec<Student>> {
        self.store().students().await
    }

    pub async fn student_summary(&self, id: StudentId) -> Result<StudentSummary> {
        let student = self.require_student(id).await?;
        let table = match student.table_id {
            Some(table_id) => self.store().table(table_id).await?,
            None => None,
        };
        let room = match table.as_ref().and_then(|t| t.room_id) {
            Some(room_id) => self.store().room(room_id).await?,
            None => None,
        };
        let payment = self.linked_payment(&student).await?;
        Ok(summarize(student, table.as_ref(), room.as_ref(), payment.as_ref()))
    }

    /// Summaries of every student, ordered by id.
    pub async fn student_summaries(&self) -> Result<Vec<StudentSummary>> {
        let tables = index(self.store().tables().await?, |t| t.id);
        let rooms = index(self.store().rooms().await?, |r| r.id);
        let payments = index(self.store().payments().await?, |p| p.id);

        let mut students = self.store().students().await?;
        students.sort_by_key(|s| s.id);
        Ok(students
            .into_iter()
            .map(|student| {
                let table = student.table_id.and_then(|id| tables.get(&id));
                let room = table.and_then(|t| t.room_id).and_then(|id| rooms.get(&id));
                let payment = student.payment_id.and_then(|id| payments.get(&id));
                summarize(student, table, room, payment)
            })
            .collect())
    }

    /// Scans every table and student for broken links.
    pub async fn audit(&self) -> Result<Vec<Inconsistency>> {
        let tables = self.store().tables().await?;
        let students = index(self.store().students().await?, |s| s.id);
        let payments = index(self.store().payments().await?, |p| p.id);

        let mut found = Vec::new();
        let mut holders: BTreeMap<StudentId, Vec<TableId>> = BTreeMap::new();
        let by_id = index(tables.iter().cloned(), |t| t.id);

        for table in &tables {
            match (table.occupied, table.student_id) {
                (true, None) => {
                    found.push(Inconsistency::OccupiedWithoutStudent { table_id: table.id })
                }
                (false, Some(student_id)) => found.push(Inconsistency::StudentWithoutOccupancy {
                    table_id: table.id,
                    student_id,
                }),
                _ => {}
            }
            if let Some(student_id) = table.student_id {
                holders.entry(student_id).or_default().push(table.id);
                let reciprocated = students
                    .get(&student_id)
                    .is_some_and(|s| s.table_id == Some(table.id));
                if !reciprocated {
                    found.push(Inconsistency::TableLinkNotReciprocated {
                        table_id: table.id,
                        student_id,
                    });
                }
            }
        }

        for (student_id, table_ids) in holders {
            if table_ids.len() > 1 {
                found.push(Inconsistency::StudentOnSeveralTables {
                    student_id,
                    table_ids,
                });
            }
        }

        for student in students.values() {
            if let Some(table_id) = student.table_id {
                let reciprocated = by_id
                    .get(&table_id)
                    .is_some_and(|t| t.student_id == Some(student.id));
                if !reciprocated {
                    found.push(Inconsistency::StudentLinkNotReciprocated {
                        student_id: student.id,
                        table_id,
                    });
                }
            }
            if let Some(payment_id) = student.payment_id {
                let owned = payments
                    .get(&payment_id)
                    .is_some_and(|p| p.student_id == student.id);
                if !owned {
                    found.push(Inconsistency::DanglingPayment {
                        student_id: student.id,
                        payment_id,
                    });
                }
            }
        }

        Ok(found)
    }
}

fn index<T, I, F>(items: I, key: F) -> BTreeMap<u64, T>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> u64,
{
    items.into_iter().map(|item| (key(&item), item)).collect()
}

fn summarize(
    student: Student,
    table: Option<&StudyTable>,
    room: Option<&Room>,
    payment: Option<&Payment>,
) -> StudentSummary {
    StudentSummary {
        id: student.id,
        name: student.name,
        roll_code: student.roll_code,
        contact: student.contact,
        room_code: table.map(|t| room.map_or_else(|| t.room_code.clone(), |r| r.code.clone())),
        table_number: table.map(|t| t.number),
        amount_paid: payment.map(|p| p.amount.value()),
        paid: payment.is_some_and(|p| p.paid),
        payment_date: payment.map(|p| p.payment_date),
        due_date: payment.and_then(|p| p.due_date),
    }
}
