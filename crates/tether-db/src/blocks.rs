use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};

use tether_types::models::{BlockEntry, UserId};

use crate::models::{BlockRow, convert_all};
use crate::{Database, Result};

impl Database {
    pub fn delete_block(&self, owner: UserId, blocked: UserId) -> Result<bool> {
        self.with_conn_mut(|conn| delete_block(conn, owner, blocked))
    }

    pub fn is_blocked(&self, a: UserId, b: UserId) -> Result<bool> {
        self.with_conn(|conn| is_blocked_either(conn, a, b))
    }

    pub fn list_blocks(&self, owner: UserId) -> Result<Vec<BlockEntry>> {
        self.with_conn(|conn| list_blocks(conn, owner))
    }
}

/// Fails with a unique violation when the entry already exists.
pub fn insert_block(
    conn: &Connection,
    owner: UserId,
    blocked: UserId,
    now: DateTime<Utc>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO block_entries (owner, blocked, created_at) VALUES (?1, ?2, ?3)",
        params![owner.to_string(), blocked.to_string(), now.timestamp_millis()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn delete_block(conn: &Connection, owner: UserId, blocked: UserId) -> Result<bool> {
    let changed = conn.execute(
        "DELETE FROM block_entries WHERE owner = ?1 AND blocked = ?2",
        params![owner.to_string(), blocked.to_string()],
    )?;
    Ok(changed == 1)
}

pub fn has_block(conn: &Connection, owner: UserId, blocked: UserId) -> Result<bool> {
    let found: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM block_entries WHERE owner = ?1 AND blocked = ?2)",
        params![owner.to_string(), blocked.to_string()],
        |row| row.get(0),
    )?;
    Ok(found)
}

/// Symmetric check: either user blocking the other counts.
pub fn is_blocked_either(conn: &Connection, a: UserId, b: UserId) -> Result<bool> {
    let (a, b) = (a.to_string(), b.to_string());
    let found: bool = conn.query_row(
        "SELECT EXISTS(
             SELECT 1 FROM block_entries
             WHERE (owner = ?1 AND blocked = ?2) OR (owner = ?2 AND blocked = ?1)
         )",
        params![a, b],
        |row| row.get(0),
    )?;
    Ok(found)
}

pub fn list_blocks(conn: &Connection, owner: UserId) -> Result<Vec<BlockEntry>> {
    let sql = format!(
        "SELECT {} FROM block_entries WHERE owner = ?1 ORDER BY created_at DESC, id DESC",
        BlockRow::COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([owner.to_string()], BlockRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    convert_all(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_types::models::now_millis;
    use uuid::Uuid;

    fn block(db: &Database, owner: UserId, blocked: UserId) -> Result<i64> {
        db.with_conn_mut(|conn| insert_block(conn, owner, blocked, now_millis()))
    }

    #[test]
    fn block_check_is_symmetric() {
        let db = Database::open_in_memory().unwrap();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        block(&db, a, b).unwrap();

        assert!(db.is_blocked(a, b).unwrap());
        assert!(db.is_blocked(b, a).unwrap());
        assert!(db.with_conn(|conn| has_block(conn, a, b)).unwrap());
        assert!(!db.with_conn(|conn| has_block(conn, b, a)).unwrap());
    }

    #[test]
    fn duplicate_block_is_unique_violation() {
        let db = Database::open_in_memory().unwrap();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        block(&db, a, b).unwrap();

        let err = block(&db, a, b).unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[test]
    fn delete_reports_whether_a_row_existed() {
        let db = Database::open_in_memory().unwrap();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        block(&db, a, b).unwrap();

        assert!(db.delete_block(a, b).unwrap());
        assert!(!db.delete_block(a, b).unwrap());
        assert!(!db.is_blocked(b, a).unwrap());
        assert!(db.list_blocks(a).unwrap().is_empty());
    }
}
