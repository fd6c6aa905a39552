use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, params};

use tether_types::models::{Friendship, UserId, now_millis};

use crate::models::{FriendshipRow, convert_all, parse_millis};
use crate::{Database, OptionalExt, Result};

/// One consistent read of an owner's friendship rows.
#[derive(Debug, Clone)]
pub struct FriendListing {
    pub friends: Vec<Friendship>,
    /// Newest `updated_at` committed in the snapshot the rows came from.
    /// Later writes are stamped strictly after it, so passing it back as
    /// `since` never skips a change.
    pub synced_at: DateTime<Utc>,
}

impl Database {
    pub fn is_friend(&self, owner: UserId, peer: UserId) -> Result<bool> {
        self.with_conn(|conn| is_friend(conn, owner, peer))
    }

    pub fn get_friendship(&self, owner: UserId, peer: UserId) -> Result<Option<Friendship>> {
        self.with_conn(|conn| get_friendship(conn, owner, peer))
    }

    /// Active rows when `since` is `None`; otherwise every row, active or
    /// removed, touched after `since`.
    pub fn list_friends(
        &self,
        owner: UserId,
        since: Option<DateTime<Utc>>,
    ) -> Result<FriendListing> {
        self.with_snapshot(|tx| {
            let friends = match since {
                Some(since) => list_changed_since(tx, owner, since)?,
                None => list_active(tx, owner)?,
            };
            let synced_at = high_water(tx)?;
            Ok(FriendListing { friends, synced_at })
        })
    }

    /// Returns the stamp written, or `None` when no active owner -> peer row exists.
    pub fn update_remark(
        &self,
        owner: UserId,
        peer: UserId,
        remark: &str,
    ) -> Result<Option<DateTime<Utc>>> {
        self.with_tx(|tx| -> Result<_> {
            let now = next_stamp(tx)?;
            Ok(update_remark(tx, owner, peer, remark, now)?.then_some(now))
        })
    }
}

/// Newest committed `updated_at` across all friendship rows, or the epoch.
pub fn high_water(conn: &Connection) -> Result<DateTime<Utc>> {
    let ms: i64 = conn.query_row(
        "SELECT COALESCE(MAX(updated_at), 0) FROM friendships",
        [],
        |row| row.get(0),
    )?;
    parse_millis("friendships", ms)
}

/// `updated_at` for the next friendship write: the wall clock, pushed past
/// the high-water mark when the clock has not moved on.
///
/// Must run on the writer inside the write's transaction, after the lock is
/// held, so no other write commits between this read and the write.
pub fn next_stamp(conn: &Connection) -> Result<DateTime<Utc>> {
    let high = high_water(conn)?;
    let now = now_millis();
    Ok(if now > high {
        now
    } else {
        high + Duration::milliseconds(1)
    })
}

pub fn get_friendship(conn: &Connection, owner: UserId, peer: UserId) -> Result<Option<Friendship>> {
    let sql = format!(
        "SELECT {} FROM friendships WHERE owner = ?1 AND peer = ?2",
        FriendshipRow::COLUMNS
    );
    let row = conn
        .query_row(
            &sql,
            params![owner.to_string(), peer.to_string()],
            FriendshipRow::from_row,
        )
        .optional()?;

    row.map(Friendship::try_from).transpose()
}

/// Single-key lookup of the owner -> peer direction.
pub fn is_friend(conn: &Connection, owner: UserId, peer: UserId) -> Result<bool> {
    let found: bool = conn.query_row(
        "SELECT EXISTS(
             SELECT 1 FROM friendships
             WHERE owner = ?1 AND peer = ?2 AND status = 'active'
         )",
        params![owner.to_string(), peer.to_string()],
        |row| row.get(0),
    )?;
    Ok(found)
}

/// Write both directed rows as active with the same timestamp. Rows left over
/// from an earlier, removed friendship are reactivated and their remark cleared.
///
/// Must run inside a transaction so the pair lands together.
pub fn activate_pair(conn: &Connection, a: UserId, b: UserId, now: DateTime<Utc>) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO friendships (owner, peer, remark, status, created_at, updated_at)
         VALUES (?1, ?2, '', 'active', ?3, ?3)
         ON CONFLICT(owner, peer) DO UPDATE SET
             remark = '',
             status = 'active',
             created_at = excluded.created_at,
             updated_at = excluded.updated_at",
    )?;

    let ms = now.timestamp_millis();
    stmt.execute(params![a.to_string(), b.to_string(), ms])?;
    stmt.execute(params![b.to_string(), a.to_string(), ms])?;
    Ok(())
}

/// Mark both directions removed. Returns the number of rows that were active.
///
/// Must run inside a transaction so the pair disappears together.
pub fn remove_pair(conn: &Connection, a: UserId, b: UserId, now: DateTime<Utc>) -> Result<usize> {
    let changed = conn.execute(
        "UPDATE friendships SET status = 'removed', updated_at = ?3
         WHERE status = 'active'
           AND ((owner = ?1 AND peer = ?2) OR (owner = ?2 AND peer = ?1))",
        params![a.to_string(), b.to_string(), now.timestamp_millis()],
    )?;
    Ok(changed)
}

/// Update the owner -> peer remark only. Returns false when no active row exists.
pub fn update_remark(
    conn: &Connection,
    owner: UserId,
    peer: UserId,
    remark: &str,
    now: DateTime<Utc>,
) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE friendships SET remark = ?3, updated_at = ?4
         WHERE owner = ?1 AND peer = ?2 AND status = 'active'",
        params![owner.to_string(), peer.to_string(), remark, now.timestamp_millis()],
    )?;
    Ok(changed == 1)
}

pub fn list_active(conn: &Connection, owner: UserId) -> Result<Vec<Friendship>> {
    let sql = format!(
        "SELECT {} FROM friendships
         WHERE owner = ?1 AND status = 'active'
         ORDER BY updated_at ASC, id ASC",
        FriendshipRow::COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([owner.to_string()], FriendshipRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    convert_all(rows)
}

pub fn list_changed_since(
    conn: &Connection,
    owner: UserId,
    since: DateTime<Utc>,
) -> Result<Vec<Friendship>> {
    let sql = format!(
        "SELECT {} FROM friendships
         WHERE owner = ?1 AND updated_at > ?2
         ORDER BY updated_at ASC, id ASC",
        FriendshipRow::COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(
            params![owner.to_string(), since.timestamp_millis()],
            FriendshipRow::from_row,
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    convert_all(rows)
}
