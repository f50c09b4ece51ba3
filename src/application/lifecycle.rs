use super::hall::StudyHall;
use crate::domain::EntityKind;
use crate::domain::payment::Payment;
use crate::domain::provisioning::Provisioning;
use crate::domain::room::{Room, normalize_room_code};
use crate::domain::student::Student;
use crate::domain::table::StudyTable;
use crate::domain::unit_of_work::UnitOfWork;
use crate::error::{HallError, Result};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// Name, roll code and contact of the students `seed` can add.
const SAMPLE_STUDENTS: [(&str, &str, &str); 2] = [
    ("Asha Verma", "CS001", "555-0101"),
    ("Rohan Mehta", "CS002", "555-0102"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomLayout {
    pub code: String,
    /// Display name; defaults to the code.
    #[serde(default)]
    pub name: Option<String>,
    /// Tables are numbered `1..=tables`.
    pub tables: u32,
}

/// The rooms and tables provisioned on first start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub rooms: Vec<RoomLayout>,
}

impl Topology {
    /// Rooms named after their codes, each with the same number of tables.
    pub fn uniform(codes: &[&str], tables: u32) -> Self {
        Self {
            rooms: codes
                .iter()
                .map(|code| RoomLayout {
                    code: code.to_string(),
                    name: None,
                    tables,
                })
                .collect(),
        }
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::uniform(&["A", "B", "C", "D"], 15)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub name: String,
    pub roll_code: Option<String>,
    pub contact: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub payments_deleted: usize,
    pub students_deleted: usize,
    pub tables_reset: usize,
}

impl StudyHall {
    /// Provisions `topology` when the hall has no rooms yet.
    ///
    /// Returns false (and writes nothing) if the hall is already
    /// provisioned, including when a concurrent seed wins the race. With
    /// `sample_students`, table 1 of the first two rooms is given to a
    /// sample student with a paid one-month payment.
    pub async fn seed(&self, topology: &Topology, sample_students: bool) -> Result<bool> {
        if self.is_provisioned().await? {
            debug!("rooms already provisioned, skipping seed");
            return Ok(false);
        }

        let mut codes = HashSet::new();
        let mut layouts = Vec::with_capacity(topology.rooms.len());
        for layout in &topology.rooms {
            let code = normalize_room_code(&layout.code)?;
            if !codes.insert(code.clone()) {
                return Err(HallError::invalid(format!("room code `{}` listed twice", code)));
            }
            let name = layout
                .name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .unwrap_or(code.as_str())
                .to_string();
            layouts.push((code, name, layout.tables));
        }

        let today = self.today();
        let mut unit = UnitOfWork::new();
        let mut samples = SAMPLE_STUDENTS.iter();
        let mut table_count = 0;
        let mut student_count = 0;

        for (code, name, tables) in layouts {
            let mut room = Room::new(self.store().next_id(EntityKind::Room).await?, code, name);
            let mut first_table = true;
            for number in 1..=tables {
                let mut table =
                    StudyTable::new(self.store().next_id(EntityKind::Table).await?, &room, number);
                room.table_ids.push(table.id);

                if sample_students
                    && first_table
                    && let Some((name, roll, contact)) = samples.next()
                {
                    let student_id = self.store().next_id(EntityKind::Student).await?;
                    let payment_id = self.store().next_id(EntityKind::Payment).await?;
                    let mut student =
                        Student::new(student_id, *name, Some(roll.to_string()), *contact)?;
                    let payment = Payment::initial(payment_id, student_id, dec!(500), today)?;
                    student.payment_id = Some(payment_id);
                    student.table_id = Some(table.id);
                    table.bind(student_id);
                    unit.put(student);
                    unit.put(payment);
                    student_count += 1;
                }
                first_table = false;
                unit.put(table);
                table_count += 1;
            }
            unit.put(room);
        }

        let room_count = topology.rooms.len();
        unit.put(Provisioning::new(today, room_count, table_count));
        match self.commit(unit).await {
            Ok(()) => {}
            Err(HallError::Conflict(reason)) => {
                if self.is_provisioned().await? {
                    debug!("another seed provisioned the hall first");
                    return Ok(false);
                }
                return Err(HallError::Conflict(reason));
            }
            Err(e) => return Err(e),
        }
        info!(
            rooms = room_count,
            tables = table_count,
            students = student_count,
            "hall provisioned"
        );
        Ok(true)
    }

    async fn is_provisioned(&self) -> Result<bool> {
        Ok(self.store().provisioning().await?.is_some()
            || !self.store().rooms().await?.is_empty())
    }

    /// Creates an unassigned student without a payment.
    pub async fn register_student(&self, request: NewStudent) -> Result<Student> {
        let id = self.store().next_id(EntityKind::Student).await?;
        let student = Student::new(id, request.name, request.roll_code, request.contact)?;

        let mut unit = UnitOfWork::new();
        let student = unit.put(student);
        self.commit(unit).await?;

        info!(student_id = student.id, name = %student.name, "student registered");
        Ok(student)
    }

    /// Deletes every payment and student and frees every table. Rooms and
    /// tables are kept.
    pub async fn clear_student_data(&self) -> Result<CleanupReport> {
        let payments = self.store().payments().await?;
        let students = self.store().students().await?;
        let tables = self.store().tables().await?;

        let mut unit = UnitOfWork::new();
        let mut report = CleanupReport::default();

        for payment in &payments {
            unit.delete(payment);
            report.payments_deleted += 1;
        }
        for student in &students {
            unit.delete(student);
            report.students_deleted += 1;
        }
        for mut table in tables {
            if table.occupied || table.student_id.is_some() {
                table.release();
                unit.put(table);
                report.tables_reset += 1;
            }
        }

        self.commit(unit).await?;
        info!(
            payments = report.payments_deleted,
            students = report.students_deleted,
            tables = report.tables_reset,
            "student data cleared"
        );
        Ok(report)
    }
}
