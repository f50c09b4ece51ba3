use super::hall::StudyHall;
use super::lifecycle::Topology;
use crate::infrastructure::clock::FixedClock;
use crate::infrastructure::in_memory::InMemoryHallStore;
use chrono::NaiveDate;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

pub fn hall() -> StudyHall {
    StudyHall::new(Box::new(InMemoryHallStore::new()), Box::new(FixedClock(today())))
}

/// Rooms A and B with tables 1-3 each. Table ids run A1=1..A3=3, B1=4..B3=6.
pub async fn seeded_hall() -> StudyHall {
    let hall = hall();
    hall.seed(&Topology::uniform(&["A", "B"], 3), false)
        .await
        .unwrap();
    hall
}
