//! redb-backed document store.
//!
//! Two collections (tasks, users) plus a unique email index. Values are
//! JSON documents keyed by an internal UUID; the UUID is stringified into
//! the `id` the API exposes. Tables are created on open.

use crate::codec::{decode_record, encode_record, Passthrough, TextCodec};
use crate::models::{TaskRecord, UserRecord};
use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

const TASKS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("tasks");
const USERS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("users");
const EMAIL_INDEX: TableDefinition<&str, &[u8]> = TableDefinition::new("email_index");

/// Thin handle to the database file. Cloneable (Arc inside).
#[derive(Clone)]
pub struct Db {
    db: Arc<Database>,
    codec: Arc<dyn TextCodec>,
}

impl Db {
    /// Open (or create) the store at the given path with text fields kept
    /// as-is.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        Self::open_with_codec(path, Arc::new(Passthrough))
    }

    /// Open with a codec applied to task text fields on write and read.
    pub fn open_with_codec(
        path: impl AsRef<Path>,
        codec: Arc<dyn TextCodec>,
    ) -> Result<Self, DbError> {
        let db = Database::create(path)?;

        // Ensure tables exist
        let txn = db.begin_write()?;
        {
            let _ = txn.open_table(TASKS)?;
            let _ = txn.open_table(USERS)?;
            let _ = txn.open_table(EMAIL_INDEX)?;
        }
        txn.commit()?;

        Ok(Db { db: Arc::new(db), codec })
    }

    // Task operations

    /// Insert a new task document and return its server-issued id.
    pub fn create_task(&self, record: &TaskRecord) -> Result<Uuid, DbError> {
        let id = Uuid::new_v4();
        self.put_task(id, record)?;
        Ok(id)
    }

    pub fn get_task(&self, id: Uuid) -> Result<Option<TaskRecord>, DbError> {
        let txn = self.db.begin_read()?;
        let tasks = txn.open_table(TASKS)?;

        match tasks.get(id.as_bytes().as_slice())? {
            Some(data) => {
                let record: TaskRecord = serde_json::from_slice(data.value())
                    .map_err(|e| DbError::Decode(e.to_string()))?;
                Ok(Some(decode_record(self.codec.as_ref(), record)))
            }
            None => Ok(None),
        }
    }

    pub fn list_tasks(&self) -> Result<Vec<(Uuid, TaskRecord)>, DbError> {
        let txn = self.db.begin_read()?;
        let tasks = txn.open_table(TASKS)?;

        let mut out = Vec::new();
        for entry in tasks.iter()? {
            let (key, value) = entry?;
            let id = Uuid::from_slice(key.value())
                .map_err(|e| DbError::Decode(e.to_string()))?;
            let record: TaskRecord = serde_json::from_slice(value.value())
                .map_err(|e| DbError::Decode(e.to_string()))?;
            out.push((id, decode_record(self.codec.as_ref(), record)));
        }

        // Keys are random UUIDs; present in insertion order instead.
        out.sort_by(|a, b| a.1.created_at.cmp(&b.1.created_at));
        Ok(out)
    }

    pub fn list_tasks_by_user(&self, user_id: &str) -> Result<Vec<(Uuid, TaskRecord)>, DbError> {
        let mut out = self.list_tasks()?;
        out.retain(|(_, record)| record.user_id == user_id);
        Ok(out)
    }

    /// Replace the whole document. The caller merged the partial update.
    pub fn update_task(&self, id: Uuid, record: &TaskRecord) -> Result<(), DbError> {
        self.put_task(id, record)
    }

    pub fn delete_task(&self, id: Uuid) -> Result<bool, DbError> {
        let txn = self.db.begin_write()?;
        let deleted;
        {
            let mut tasks = txn.open_table(TASKS)?;
            deleted = tasks.remove(id.as_bytes().as_slice())?.is_some();
        }
        txn.commit()?;
        Ok(deleted)
    }

    fn put_task(&self, id: Uuid, record: &TaskRecord) -> Result<(), DbError> {
        let stored = encode_record(self.codec.as_ref(), record.clone());
        let bytes = serde_json::to_vec(&stored).map_err(|e| DbError::Encode(e.to_string()))?;

        let txn = self.db.begin_write()?;
        {
            let mut tasks = txn.open_table(TASKS)?;
            tasks.insert(id.as_bytes().as_slice(), bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    // User operations

    /// Insert a new user and index its email. The caller checks for
    /// duplicates first.
    pub fn create_user(&self, record: &UserRecord) -> Result<Uuid, DbError> {
        let id = Uuid::new_v4();
        let bytes = serde_json::to_vec(record).map_err(|e| DbError::Encode(e.to_string()))?;

        let txn = self.db.begin_write()?;
        {
            let mut users = txn.open_table(USERS)?;
            let mut emails = txn.open_table(EMAIL_INDEX)?;

            users.insert(id.as_bytes().as_slice(), bytes.as_slice())?;
            emails.insert(record.email.as_str(), id.as_bytes().as_slice())?;
        }
        txn.commit()?;
        Ok(id)
    }

    pub fn get_user(&self, id: Uuid) -> Result<Option<UserRecord>, DbError> {
        let txn = self.db.begin_read()?;
        let users = txn.open_table(USERS)?;

        match users.get(id.as_bytes().as_slice())? {
            Some(data) => {
                let record: UserRecord = serde_json::from_slice(data.value())
                    .map_err(|e| DbError::Decode(e.to_string()))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<(Uuid, UserRecord)>, DbError> {
        let txn = self.db.begin_read()?;
        let emails = txn.open_table(EMAIL_INDEX)?;

        let id = match emails.get(email)? {
            Some(data) => Uuid::from_slice(data.value())
                .map_err(|e| DbError::Decode(e.to_string()))?,
            None => return Ok(None),
        };

        let users = txn.open_table(USERS)?;
        match users.get(id.as_bytes().as_slice())? {
            Some(data) => {
                let record: UserRecord = serde_json::from_slice(data.value())
                    .map_err(|e| DbError::Decode(e.to_string()))?;
                Ok(Some((id, record)))
            }
            None => Ok(None),
        }
    }

    /// Rename a user. Returns false when the id matches nothing.
    pub fn set_user_name(&self, id: Uuid, name: &str) -> Result<bool, DbError> {
        let mut record = match self.get_user(id)? {
            Some(record) => record,
            None => return Ok(false),
        };
        record.name = name.to_string();

        let bytes = serde_json::to_vec(&record).map_err(|e| DbError::Encode(e.to_string()))?;
        let txn = self.db.begin_write()?;
        {
            let mut users = txn.open_table(USERS)?;
            users.insert(id.as_bytes().as_slice(), bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(true)
    }
}

// ── Errors ─────────────────────────────────────────────────────

#[derive(Debug)]
pub enum DbError {
    Redb(String),
    Decode(String),
    Encode(String),
}

// redb 2.x has many error types. Blanket them all into DbError::Redb.
macro_rules! from_redb {
    ($($t:ty),*) => {
        $(impl From<$t> for DbError {
            fn from(e: $t) -> Self { DbError::Redb(e.to_string()) }
        })*
    };
}

from_redb!(
    redb::Error,
    redb::DatabaseError,
    redb::TableError,
    redb::TransactionError,
    redb::StorageError,
    redb::CommitError
);

impl std::fmt::Display for DbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbError::Redb(e) => write!(f, "redb: {e}"),
            DbError::Decode(e) => write!(f, "decode: {e}"),
            DbError::Encode(e) => write!(f, "encode: {e}"),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use chrono::Utc;
    use std::fs;

    /// Create a temp store that auto-cleans.
    fn temp_db(name: &str) -> (Db, String) {
        let path = format!("/tmp/acadtrack_test_{name}_{}.redb", std::process::id());
        let _ = fs::remove_file(&path); // clean up any leftover
        let db = Db::open(&path).unwrap();
        (db, path)
    }

    fn cleanup(path: &str) {
        let _ = fs::remove_file(path);
    }

    fn task(user_id: &str, title: &str) -> TaskRecord {
        let now = Utc::now();
        TaskRecord {
            user_id: user_id.into(),
            title: title.into(),
            description: String::new(),
            priority: Priority::Medium,
            deadline: now,
            subject: "cat1".into(),
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn user(name: &str, email: &str) -> UserRecord {
        UserRecord {
            name: name.into(),
            email: email.into(),
            password_hash: "$argon2$fake".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn create_and_get_task() {
        let (db, path) = temp_db("create_get");

        let id = db.create_task(&task("u1", "Essay")).unwrap();
        let found = db.get_task(id).unwrap().unwrap();
        assert_eq!(found.title, "Essay");
        assert_eq!(found.user_id, "u1");

        assert!(db.get_task(Uuid::new_v4()).unwrap().is_none());

        cleanup(&path);
    }

    #[test]
    fn list_scopes_to_user() {
        let (db, path) = temp_db("list_user");

        db.create_task(&task("u1", "Mine")).unwrap();
        db.create_task(&task("u2", "Theirs")).unwrap();
        db.create_task(&task("u1", "Also mine")).unwrap();

        assert_eq!(db.list_tasks().unwrap().len(), 3);

        let mine = db.list_tasks_by_user("u1").unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|(_, t)| t.user_id == "u1"));

        cleanup(&path);
    }

    #[test]
    fn update_survives_reopen() {
        let path = format!("/tmp/acadtrack_test_reopen_{}.redb", std::process::id());
        let _ = fs::remove_file(&path);

        let id = {
            let db = Db::open(&path).unwrap();
            let id = db.create_task(&task("u1", "Draft")).unwrap();

            let mut record = db.get_task(id).unwrap().unwrap();
            record.title = "Final".into();
            record.completed = true;
            db.update_task(id, &record).unwrap();
            id
        };

        let db = Db::open(&path).unwrap();
        let record = db.get_task(id).unwrap().unwrap();
        assert_eq!(record.title, "Final");
        assert!(record.completed);

        cleanup(&path);
    }

    #[test]
    fn delete_task_reports_outcome() {
        let (db, path) = temp_db("delete");

        let id = db.create_task(&task("u1", "Doomed")).unwrap();
        assert!(db.delete_task(id).unwrap());
        assert!(db.get_task(id).unwrap().is_none());
        assert!(!db.delete_task(id).unwrap());

        cleanup(&path);
    }

    #[test]
    fn email_index_finds_user() {
        let (db, path) = temp_db("email");

        let id = db.create_user(&user("Ada", "ada@uni.edu")).unwrap();

        let (found_id, found) = db.get_user_by_email("ada@uni.edu").unwrap().unwrap();
        assert_eq!(found_id, id);
        assert_eq!(found.name, "Ada");

        assert!(db.get_user_by_email("nobody@uni.edu").unwrap().is_none());

        cleanup(&path);
    }

    #[test]
    fn rename_user() {
        let (db, path) = temp_db("rename");

        let id = db.create_user(&user("Ada", "ada@uni.edu")).unwrap();
        assert!(db.set_user_name(id, "Ada L.").unwrap());
        assert_eq!(db.get_user(id).unwrap().unwrap().name, "Ada L.");

        assert!(!db.set_user_name(Uuid::new_v4(), "Ghost").unwrap());

        cleanup(&path);
    }

    #[test]
    fn codec_applies_at_the_storage_boundary() {
        use crate::codec::TextCodec;

        struct Swap;
        impl TextCodec for Swap {
            fn encode(&self, text: &str) -> String {
                text.chars().rev().collect()
            }
            fn decode(&self, text: &str) -> String {
                text.chars().rev().collect()
            }
        }

        let path = format!("/tmp/acadtrack_test_codec_{}.redb", std::process::id());
        let _ = fs::remove_file(&path);

        let id = {
            let db = Db::open_with_codec(&path, Arc::new(Swap)).unwrap();
            let id = db.create_task(&task("u1", "Essay")).unwrap();
            // Reads through the codec see the original text.
            assert_eq!(db.get_task(id).unwrap().unwrap().title, "Essay");
            id
        };

        // A plain handle sees what was actually stored.
        let db = Db::open(&path).unwrap();
        assert_eq!(db.get_task(id).unwrap().unwrap().title, "yassE");

        cleanup(&path);
    }
}
