use super::{Entity, EntityKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The only id a provisioning record ever has.
pub const PROVISIONING_ID: u64 = 1;

/// Marks the hall as provisioned.
///
/// Seeding stages this record as an insert, so of two seeds racing on an
/// empty hall only one can commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provisioning {
    pub id: u64,
    pub provisioned_on: NaiveDate,
    pub rooms: usize,
    pub tables: usize,
    #[serde(default)]
    pub version: u64,
}

impl Provisioning {
    pub fn new(provisioned_on: NaiveDate, rooms: usize, tables: usize) -> Self {
        Self {
            id: PROVISIONING_ID,
            provisioned_on,
            rooms,
            tables,
            version: 0,
        }
    }
}

impl Entity for Provisioning {
    const KIND: EntityKind = EntityKind::Provisioning;

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
