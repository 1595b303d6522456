//! Task Repository: Snapshot storage for contract task records.

use super::types::{Amount, CoarseStatus, Identity, RawTaskRecord};
use anyhow::{Context, Result};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

pub const TASK_SELECT: &str = "SELECT id, creator, description, deposit_wei, deadline, \
     coarse_status, proof_reference, already_claimed FROM tasks";

pub struct TaskRepo<'a> {
    conn: &'a Connection,
}

impl<'a> TaskRepo<'a> {
    /// Creates a new repository instance borrowing the connection.
    #[must_use]
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Returns the underlying database connection.
    #[must_use]
    pub fn conn(&self) -> &Connection {
        self.conn
    }

    /// Inserts a snapshot, replacing any earlier snapshot of the same task.
    ///
    /// # Errors
    /// Returns an error if the id does not fit SQLite's integer range or the write fails.
    pub fn upsert(&self, record: &RawTaskRecord) -> Result<()> {
        let id = to_sql_id(record.id)?;
        self.conn
            .execute(
                "INSERT INTO tasks (id, creator, description, deposit_wei, deadline,
                                    coarse_status, proof_reference, already_claimed)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(id) DO UPDATE SET
                    creator = excluded.creator,
                    description = excluded.description,
                    deposit_wei = excluded.deposit_wei,
                    deadline = excluded.deadline,
                    coarse_status = excluded.coarse_status,
                    proof_reference = excluded.proof_reference,
                    already_claimed = excluded.already_claimed,
                    fetched_at = CURRENT_TIMESTAMP",
                params![
                    id,
                    record.creator.as_str(),
                    record.description,
                    record.deposit.wei().to_string(),
                    record.deadline,
                    record.coarse_status.to_string(),
                    record.proof_reference,
                    record.already_claimed,
                ],
            )
            .with_context(|| format!("Failed to store task {}", record.id))?;
        debug!(id = record.id, status = %record.coarse_status, "snapshot stored");
        Ok(())
    }

    /// Lists all stored task ids in ascending order.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn ids(&self) -> Result<Vec<u64>> {
        let mut stmt = self.conn.prepare("SELECT id FROM tasks ORDER BY id")?;
        let rows = stmt.query_map([], |r| r.get::<_, i64>(0))?;
        let mut ids = Vec::new();
        for id in rows {
            ids.push(from_sql_id(id?)?);
        }
        Ok(ids)
    }

    /// Retrieves all stored snapshots ordered by id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn get_all(&self) -> Result<Vec<RawTaskRecord>> {
        let sql = format!("{TASK_SELECT} ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |r| self.row_to_record(r))?;
        let mut records = Vec::new();
        for record in rows {
            records.push(record?);
        }
        Ok(records)
    }

    /// Finds a snapshot by task id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn find_by_id(&self, id: u64) -> Result<Option<RawTaskRecord>> {
        let sql = format!("{TASK_SELECT} WHERE id = ?1");
        self.conn
            .query_row(&sql, params![to_sql_id(id)?], |r| self.row_to_record(r))
            .optional()
            .context("Search by ID failed")
    }

    /// Number of stored snapshots.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tasks", [], |r| r.get(0))?;
        Ok(usize::try_from(n).unwrap_or(0))
    }

    /// Converts a database row to a `RawTaskRecord`.
    ///
    /// # Errors
    /// Returns a `rusqlite` error if a stored column no longer parses.
    pub fn row_to_record(&self, row: &rusqlite::Row) -> rusqlite::Result<RawTaskRecord> {
        let id: i64 = row.get(0)?;
        let deposit: String = row.get(3)?;
        let status: String = row.get(5)?;

        let id = u64::try_from(id)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Integer, Box::new(e)))?;
        let wei = deposit
            .parse::<u128>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;
        let coarse_status = status
            .parse::<CoarseStatus>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;

        Ok(RawTaskRecord {
            id,
            creator: Identity::new(row.get::<_, String>(1)?),
            description: row.get(2)?,
            deposit: Amount::from_wei(wei),
            deadline: row.get(4)?,
            coarse_status,
            proof_reference: row.get(6)?,
            already_claimed: row.get(7)?,
        })
    }
}

fn to_sql_id(id: u64) -> Result<i64> {
    i64::try_from(id).with_context(|| format!("Task id {id} exceeds storage range"))
}

fn from_sql_id(id: i64) -> Result<u64> {
    u64::try_from(id).with_context(|| format!("Stored task id {id} is negative"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::db::Db;

    fn record(id: u64, status: CoarseStatus) -> RawTaskRecord {
        RawTaskRecord {
            id,
            creator: Identity::new("0xAbC0000000000000000000000000000000000001"),
            description: format!("Task number {id}"),
            deposit: Amount::from_wei(123_456_789_000_000_000_000),
            deadline: 1_700_000_000,
            coarse_status: status,
            proof_reference: String::new(),
            already_claimed: false,
        }
    }

    #[test]
    fn test_upsert_round_trips() {
        let conn = Db::in_memory().expect("db");
        let repo = TaskRepo::new(&conn);
        let original = record(42, CoarseStatus::InProgress);
        repo.upsert(&original).expect("upsert");

        let loaded = repo.find_by_id(42).expect("query").expect("present");
        assert_eq!(loaded, original);
        assert_eq!(loaded.creator.as_str(), "0xAbC0000000000000000000000000000000000001");
        assert!(repo.find_by_id(7).expect("query").is_none());
    }

    #[test]
    fn test_upsert_replaces_snapshot() {
        let conn = Db::in_memory().expect("db");
        let repo = TaskRepo::new(&conn);
        repo.upsert(&record(1, CoarseStatus::InProgress)).expect("upsert");

        let mut updated = record(1, CoarseStatus::Complete);
        updated.proof_reference = "ipfs://proof".to_string();
        updated.already_claimed = true;
        repo.upsert(&updated).expect("upsert");

        assert_eq!(repo.count().expect("count"), 1);
        assert_eq!(repo.find_by_id(1).expect("query"), Some(updated));
    }

    #[test]
    fn test_ids_and_get_all_are_ordered() {
        let conn = Db::in_memory().expect("db");
        let repo = TaskRepo::new(&conn);
        for id in [5, 2, 9] {
            repo.upsert(&record(id, CoarseStatus::Failed)).expect("upsert");
        }
        assert_eq!(repo.ids().expect("ids"), vec![2, 5, 9]);
        let all: Vec<u64> = repo.get_all().expect("all").iter().map(|r| r.id).collect();
        assert_eq!(all, vec![2, 5, 9]);
    }

    #[test]
    fn test_oversized_id_rejected() {
        let conn = Db::in_memory().expect("db");
        let repo = TaskRepo::new(&conn);
        assert!(repo.upsert(&record(u64::MAX, CoarseStatus::Failed)).is_err());
    }

    #[test]
    fn test_on_disk_database() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested");
        {
            let conn = Db::init(&path).expect("init");
            TaskRepo::new(&conn)
                .upsert(&record(3, CoarseStatus::Complete))
                .expect("upsert");
        }
        let conn = Db::open(&path.join(crate::engine::db::DB_FILE)).expect("open");
        assert_eq!(TaskRepo::new(&conn).ids().expect("ids"), vec![3]);
        assert!(Db::open(&dir.path().join("missing.db")).is_err());
    }
}
