use crate::domain::payment::Payment;
use crate::domain::ports::HallStore;
use crate::domain::provisioning::{PROVISIONING_ID, Provisioning};
use crate::domain::room::Room;
use crate::domain::student::Student;
use crate::domain::table::StudyTable;
use crate::domain::unit_of_work::{Record, RecordKey, UnitOfWork, Write};
use crate::domain::{EntityKind, PaymentId, RoomId, StudentId, TableId};
use crate::error::{HallError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for rooms.
pub const CF_ROOMS: &str = "rooms";
/// Column Family for study tables.
pub const CF_TABLES: &str = "tables";
/// Column Family for students.
pub const CF_STUDENTS: &str = "students";
/// Column Family for payments.
pub const CF_PAYMENTS: &str = "payments";
/// Column Family for the provisioning record.
pub const CF_PROVISIONING: &str = "provisioning";
/// Column Family for id sequences.
pub const CF_META: &str = "meta";

fn cf_name(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Room => CF_ROOMS,
        EntityKind::Table => CF_TABLES,
        EntityKind::Student => CF_STUDENTS,
        EntityKind::Payment => CF_PAYMENTS,
        EntityKind::Provisioning => CF_PROVISIONING,
    }
}

fn sequence_key(kind: EntityKind) -> String {
    format!("seq:{}", kind.name().to_lowercase())
}

#[derive(Deserialize)]
struct StoredVersion {
    #[serde(default)]
    version: u64,
}

/// A persistent hall store backed by RocksDB.
///
/// Each record kind lives in its own Column Family keyed by the big-endian
/// id, with JSON values. Commits are serialized by an async mutex; the
/// version checks run under it and the writes land as one `WriteBatch`, so
/// a unit of work is either fully visible or not at all.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    commit_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating
    /// the column families on first use.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = EntityKind::ALL
            .into_iter()
            .map(cf_name)
            .chain([CF_META])
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, families)?;

        Ok(Self {
            db: Arc::new(db),
            commit_lock: Arc::new(Mutex::new(())),
        })
    }

    fn handle(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            HallError::InternalError(Box::new(std::io::Error::other(format!(
                "{} column family not found",
                name
            ))))
        })
    }

    fn get_record<T: DeserializeOwned>(&self, kind: EntityKind, id: u64) -> Result<Option<T>> {
        let cf = self.handle(cf_name(kind))?;
        match self.db.get_cf(cf, id.to_be_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn all_records<T: DeserializeOwned>(&self, kind: EntityKind) -> Result<Vec<T>> {
        let cf = self.handle(cf_name(kind))?;
        let mut records = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            records.push(serde_json::from_slice(&value)?);
        }
        Ok(records)
    }

    fn stored_version(&self, key: RecordKey) -> Result<Option<u64>> {
        Ok(self
            .get_record::<StoredVersion>(key.kind, key.id)?
            .map(|stored| stored.version))
    }
}

#[async_trait]
impl HallStore for RocksDBStore {
    async fn next_id(&self, kind: EntityKind) -> Result<u64> {
        let _guard = self.commit_lock.lock().await;
        let cf = self.handle(CF_META)?;
        let key = sequence_key(kind);

        let current = match self.db.get_cf(cf, &key)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                    HallError::InternalError(Box::new(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("corrupt sequence for {}", kind),
                    )))
                })?;
                u64::from_be_bytes(raw)
            }
            None => 0,
        };

        let next = current + 1;
        self.db.put_cf(cf, &key, next.to_be_bytes())?;
        Ok(next)
    }

    async fn room(&self, id: RoomId) -> Result<Option<Room>> {
        self.get_record(EntityKind::Room, id)
    }

    async fn rooms(&self) -> Result<Vec<Room>> {
        self.all_records(EntityKind::Room)
    }

    async fn table(&self, id: TableId) -> Result<Option<StudyTable>> {
        self.get_record(EntityKind::Table, id)
    }

    async fn tables(&self) -> Result<Vec<StudyTable>> {
        self.all_records(EntityKind::Table)
    }

    async fn student(&self, id: StudentId) -> Result<Option<Student>> {
        self.get_record(EntityKind::Student, id)
    }

    async fn students(&self) -> Result<Vec<Student>> {
        self.all_records(EntityKind::Student)
    }

    async fn payment(&self, id: PaymentId) -> Result<Option<Payment>> {
        self.get_record(EntityKind::Payment, id)
    }

    async fn payments(&self) -> Result<Vec<Payment>> {
        self.all_records(EntityKind::Payment)
    }

    async fn provisioning(&self) -> Result<Option<Provisioning>> {
        self.get_record(EntityKind::Provisioning, PROVISIONING_ID)
    }

    async fn commit(&self, unit: UnitOfWork) -> Result<()> {
        let _guard = self.commit_lock.lock().await;
        unit.validate(|key| self.stored_version(key))?;

        let mut batch = WriteBatch::default();
        for write in unit.into_writes() {
            let key = write.key();
            let cf = self.handle(cf_name(key.kind))?;
            match write {
                Write::Put(record) => {
                    let value = match record.committed() {
                        Record::Room(room) => serde_json::to_vec(&room)?,
                        Record::Table(table) => serde_json::to_vec(&table)?,
                        Record::Student(student) => serde_json::to_vec(&student)?,
                        Record::Payment(payment) => serde_json::to_vec(&payment)?,
                        Record::Provisioning(provisioning) => serde_json::to_vec(&provisioning)?,
                    };
                    batch.put_cf(cf, key.id.to_be_bytes(), value);
                }
                Write::Delete { .. } => batch.delete_cf(cf, key.id.to_be_bytes()),
            }
        }

        self.db.write(batch)?;
        Ok(())
    }
}
