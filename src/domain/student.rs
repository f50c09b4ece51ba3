use super::{Entity, EntityKind, PaymentId, StudentId, TableId};
use crate::error::{HallError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    /// Enrollment code; students onboarded at the desk do not have one.
    pub roll_code: Option<String>,
    pub contact: String,
    /// Must point at a table whose `student_id` points back here.
    pub table_id: Option<TableId>,
    pub payment_id: Option<PaymentId>,
    #[serde(default)]
    pub version: u64,
}

impl Student {
    pub fn new(
        id: StudentId,
        name: impl Into<String>,
        roll_code: Option<String>,
        contact: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(HallError::invalid("student name must not be empty"));
        }
        Ok(Self {
            id,
            name,
            roll_code: roll_code
                .map(|code| code.trim().to_string())
                .filter(|code| !code.is_empty()),
            contact: contact.into().trim().to_string(),
            table_id: None,
            payment_id: None,
            version: 0,
        })
    }
}

impl Entity for Student {
    const KIND: EntityKind = EntityKind::Student;

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_student_trims_fields() {
        let student = Student::new(1, "  Asha Verma ", Some(" ".into()), " 555-0101").unwrap();
        assert_eq!(student.name, "Asha Verma");
        assert_eq!(student.roll_code, None);
        assert_eq!(student.contact, "555-0101");
        assert_eq!(student.table_id, None);
    }

    #[test]
    fn test_new_student_requires_name() {
        assert!(matches!(
            Student::new(1, "", None, "555-0101"),
            Err(HallError::InvalidArgument(_))
        ));
    }
}
