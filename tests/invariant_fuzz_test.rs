use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal_macros::dec;
use studyhall::application::onboarding::NewEnrollment;
use studyhall::domain::payment::PaymentUpdate;
use studyhall::error::HallError;

mod common;

/// Drives random operations and checks the occupancy and symmetry rules
/// after every one. Expected failures (taken tables, deleted students) are
/// fine; anything else is not.
#[tokio::test]
async fn test_random_operations_keep_invariants() {
    let mut rng = StdRng::seed_from_u64(190);
    let hall = common::seeded_hall().await;
    let mut students = Vec::new();
    for name in ["Asha", "Rohan", "Meera", "Kabir", "Isha"] {
        students.push(common::register(&hall, name).await);
    }

    for step in 0..500 {
        let student = students[rng.gen_range(0..students.len())];
        let table = rng.gen_range(1..=8);

        let result = match rng.gen_range(0..6) {
            0 | 1 => hall.assign(student, table).await.map(|_| ()),
            2 => hall.free(table).await.map(|_| ()),
            3 => hall
                .update_payment(
                    student,
                    PaymentUpdate {
                        amount: Some(dec!(450)),
                        paid: Some(rng.gen_bool(0.5)),
                        months: Some(rng.gen_range(1..=6)),
                    },
                )
                .await
                .map(|_| ()),
            4 => hall
                .create_and_assign(NewEnrollment {
                    name: format!("Walk-in {}", step),
                    contact: "555-0199".to_string(),
                    room_code: if table <= 4 { "A" } else { "B" }.to_string(),
                    table_number: ((table - 1) % 4 + 1) as u32,
                    amount_paid: dec!(500),
                })
                .await
                .map(|enrolled| students.push(enrolled.student.id)),
            _ => hall.delete_student(student).await.map(|_| ()),
        };

        match result {
            Ok(()) | Err(HallError::Conflict(_)) | Err(HallError::NotFound { .. }) => {}
            Err(e) => panic!("step {} failed unexpectedly: {}", step, e),
        }
        common::assert_consistent(&hall).await;
    }

    assert!(hall.audit().await.unwrap().is_empty());
}
