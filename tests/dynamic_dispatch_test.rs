use studyhall::domain::EntityKind;
use studyhall::domain::ports::HallStoreBox;
use studyhall::domain::room::Room;
use studyhall::domain::student::Student;
use studyhall::domain::unit_of_work::UnitOfWork;
use studyhall::infrastructure::in_memory::InMemoryHallStore;

#[tokio::test]
async fn test_store_as_trait_object() {
    let store: HallStoreBox = Box::new(InMemoryHallStore::new());

    // Verify Send + Sync by moving the boxed store into a task
    let handle = tokio::spawn(async move {
        let room_id = store.next_id(EntityKind::Room).await.unwrap();
        let student_id = store.next_id(EntityKind::Student).await.unwrap();

        let mut unit = UnitOfWork::new();
        unit.put(Room::new(room_id, "A", "Quiet room"));
        unit.put(Student::new(student_id, "Asha Verma", None, "555-0101").unwrap());
        store.commit(unit).await.unwrap();

        (
            store.room_by_code("A").await.unwrap().unwrap(),
            store.student(student_id).await.unwrap().unwrap(),
        )
    });

    let (room, student) = handle.await.unwrap();
    assert_eq!(room.name, "Quiet room");
    assert_eq!(room.version, 1);
    assert_eq!(student.name, "Asha Verma");
}
