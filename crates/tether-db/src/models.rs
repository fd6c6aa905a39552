//! Database row types. These map directly to SQLite rows and are converted
//! into the shared `tether-types` models at the store boundary.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use uuid::Uuid;

use tether_types::models::{BlockEntry, FriendRequest, Friendship};

use crate::StoreError;

pub struct RequestRow {
    pub id: i64,
    pub from_user: String,
    pub to_user: String,
    pub message: String,
    pub source: String,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl RequestRow {
    pub(crate) const COLUMNS: &'static str =
        "id, from_user, to_user, message, source, status, created_at, updated_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            from_user: row.get(1)?,
            to_user: row.get(2)?,
            message: row.get(3)?,
            source: row.get(4)?,
            status: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

impl TryFrom<RequestRow> for FriendRequest {
    type Error = StoreError;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        Ok(FriendRequest {
            id: row.id,
            from_user: parse_user("friend_requests", &row.from_user)?,
            to_user: parse_user("friend_requests", &row.to_user)?,
            message: row.message,
            source: row.source.parse()?,
            status: row.status.parse()?,
            created_at: parse_millis("friend_requests", row.created_at)?,
            updated_at: parse_millis("friend_requests", row.updated_at)?,
        })
    }
}

pub struct FriendshipRow {
    pub id: i64,
    pub owner: String,
    pub peer: String,
    pub remark: String,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl FriendshipRow {
    pub(crate) const COLUMNS: &'static str =
        "id, owner, peer, remark, status, created_at, updated_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner: row.get(1)?,
            peer: row.get(2)?,
            remark: row.get(3)?,
            status: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

impl TryFrom<FriendshipRow> for Friendship {
    type Error = StoreError;

    fn try_from(row: FriendshipRow) -> Result<Self, Self::Error> {
        Ok(Friendship {
            id: row.id,
            owner: parse_user("friendships", &row.owner)?,
            peer: parse_user("friendships", &row.peer)?,
            remark: row.remark,
            status: row.status.parse()?,
            created_at: parse_millis("friendships", row.created_at)?,
            updated_at: parse_millis("friendships", row.updated_at)?,
        })
    }
}

pub struct BlockRow {
    pub id: i64,
    pub owner: String,
    pub blocked: String,
    pub created_at: i64,
}

impl BlockRow {
    pub(crate) const COLUMNS: &'static str = "id, owner, blocked, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner: row.get(1)?,
            blocked: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}

impl TryFrom<BlockRow> for BlockEntry {
    type Error = StoreError;

    fn try_from(row: BlockRow) -> Result<Self, Self::Error> {
        Ok(BlockEntry {
            id: row.id,
            owner: parse_user("block_entries", &row.owner)?,
            blocked: parse_user("block_entries", &row.blocked)?,
            created_at: parse_millis("block_entries", row.created_at)?,
        })
    }
}

/// Convert a batch of rows, failing on the first corrupt one.
pub(crate) fn convert_all<R, T>(rows: Vec<R>) -> crate::Result<Vec<T>>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

fn parse_user(table: &'static str, raw: &str) -> Result<Uuid, StoreError> {
    raw.parse()
        .map_err(|e| StoreError::corrupt(table, format!("user id '{}': {}", raw, e)))
}

pub(crate) fn parse_millis(table: &'static str, ms: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| StoreError::corrupt(table, format!("timestamp {} out of range", ms)))
}
