#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use std::io::Write;
use studyhall::application::hall::StudyHall;
use studyhall::application::lifecycle::{NewStudent, Topology};
use studyhall::domain::StudentId;
use studyhall::infrastructure::clock::FixedClock;
use studyhall::infrastructure::in_memory::InMemoryHallStore;
use tempfile::NamedTempFile;

pub const HEADER: &str =
    "op, student, table, name, contact, room, number, amount, paid, months, roll";

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

/// Rooms A and B, four tables each: A1..A4 are ids 1..4, B1..B4 are 5..8.
pub async fn seeded_hall() -> StudyHall {
    let hall = StudyHall::new(
        Box::new(InMemoryHallStore::new()),
        Box::new(FixedClock(today())),
    );
    hall.seed(&Topology::uniform(&["A", "B"], 4), false)
        .await
        .unwrap();
    hall
}

pub async fn register(hall: &StudyHall, name: &str) -> StudentId {
    hall.register_student(NewStudent {
        name: name.to_string(),
        roll_code: None,
        contact: "555-0100".to_string(),
    })
    .await
    .unwrap()
    .id
}

/// Checks the occupancy and symmetry rules straight from the store.
pub async fn assert_consistent(hall: &StudyHall) {
    let tables = hall.store().tables().await.unwrap();
    let students = hall.store().students().await.unwrap();

    let mut holders: HashMap<StudentId, u64> = HashMap::new();
    for table in &tables {
        assert_eq!(
            table.occupied,
            table.student_id.is_some(),
            "table {} occupancy does not match its student",
            table.id
        );
        if let Some(student_id) = table.student_id {
            assert!(
                holders.insert(student_id, table.id).is_none(),
                "student {} is held by more than one table",
                student_id
            );
        }
    }

    for student in &students {
        assert_eq!(
            student.table_id,
            holders.get(&student.id).copied(),
            "student {} and its table disagree",
            student.id
        );
    }
    assert_eq!(holders.len(), students.iter().filter(|s| s.table_id.is_some()).count());
}

/// Writes a command file with the standard header.
pub fn command_file(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", HEADER).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file
}
