use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};

use tether_types::models::{
    FriendRequest, RequestDirection, RequestId, RequestSource, RequestStatus, UserId,
};

use crate::models::{RequestRow, convert_all};
use crate::{Database, OptionalExt, Result};

impl Database {
    pub fn get_request(&self, id: RequestId) -> Result<Option<FriendRequest>> {
        self.with_conn(|conn| get_request(conn, id))
    }

    pub fn list_requests(
        &self,
        user: UserId,
        direction: RequestDirection,
    ) -> Result<Vec<FriendRequest>> {
        self.with_conn(|conn| list_requests(conn, user, direction))
    }

    /// Single guarded write: only a pending request changes status.
    pub fn transition_request(
        &self,
        id: RequestId,
        status: RequestStatus,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| transition_request(conn, id, status, now))
    }
}

pub fn insert_request(
    conn: &Connection,
    from_user: UserId,
    to_user: UserId,
    message: &str,
    source: RequestSource,
    now: DateTime<Utc>,
) -> Result<RequestId> {
    let ms = now.timestamp_millis();
    conn.execute(
        "INSERT INTO friend_requests (from_user, to_user, message, source, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, 'pending', ?5, ?5)",
        params![
            from_user.to_string(),
            to_user.to_string(),
            message,
            source.as_str(),
            ms
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_request(conn: &Connection, id: RequestId) -> Result<Option<FriendRequest>> {
    let sql = format!(
        "SELECT {} FROM friend_requests WHERE id = ?1",
        RequestRow::COLUMNS
    );
    let row = conn
        .query_row(&sql, [id], RequestRow::from_row)
        .optional()?;

    row.map(FriendRequest::try_from).transpose()
}

/// Whether a pending request exists in either direction between `a` and `b`.
pub fn pending_between(conn: &Connection, a: UserId, b: UserId) -> Result<bool> {
    let (a, b) = (a.to_string(), b.to_string());
    let found: bool = conn.query_row(
        "SELECT EXISTS(
             SELECT 1 FROM friend_requests
             WHERE status = 'pending'
               AND ((from_user = ?1 AND to_user = ?2) OR (from_user = ?2 AND to_user = ?1))
         )",
        params![a, b],
        |row| row.get(0),
    )?;
    Ok(found)
}

/// Compare-and-swap `pending -> status`. Returns false when the request was
/// already terminal (or does not exist), so two racing callers can never both
/// win.
pub fn transition_request(
    conn: &Connection,
    id: RequestId,
    status: RequestStatus,
    now: DateTime<Utc>,
) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE friend_requests SET status = ?1, updated_at = ?2
         WHERE id = ?3 AND status = 'pending'",
        params![status.as_str(), now.timestamp_millis(), id],
    )?;
    Ok(changed == 1)
}

/// Requests the user sent or received, newest first.
pub fn list_requests(
    conn: &Connection,
    user: UserId,
    direction: RequestDirection,
) -> Result<Vec<FriendRequest>> {
    let column = match direction {
        RequestDirection::Sent => "from_user",
        RequestDirection::Received => "to_user",
    };
    let sql = format!(
        "SELECT {} FROM friend_requests WHERE {} = ?1 ORDER BY created_at DESC, id DESC",
        RequestRow::COLUMNS,
        column
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([user.to_string()], RequestRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    convert_all(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_types::models::now_millis;
    use uuid::Uuid;

    #[test]
    fn second_pending_for_same_pair_violates_uniqueness() {
        let db = Database::open_in_memory().unwrap();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let now = now_millis();

        db.with_conn_mut(|conn| insert_request(conn, a, b, "hi", RequestSource::Search, now))
            .unwrap();
        let err = db
            .with_conn_mut(|conn| insert_request(conn, a, b, "again", RequestSource::Search, now))
            .unwrap_err();
        assert!(err.is_unique_violation());

        // Reverse direction is a different ordered pair
        db.with_conn_mut(|conn| insert_request(conn, b, a, "", RequestSource::Group, now))
            .unwrap();
    }

    #[test]
    fn transition_only_applies_once() {
        let db = Database::open_in_memory().unwrap();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let now = now_millis();
        let id = db
            .with_conn_mut(|conn| insert_request(conn, a, b, "", RequestSource::Contacts, now))
            .unwrap();

        assert!(db.transition_request(id, RequestStatus::Rejected, now).unwrap());
        assert!(!db.transition_request(id, RequestStatus::Accepted, now).unwrap());

        let req = db.get_request(id).unwrap().unwrap();
        assert_eq!(req.status, RequestStatus::Rejected);
    }

    #[test]
    fn resolved_request_frees_the_pair() {
        let db = Database::open_in_memory().unwrap();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let now = now_millis();
        let id = db
            .with_conn_mut(|conn| insert_request(conn, a, b, "", RequestSource::Search, now))
            .unwrap();

        assert!(db.with_conn(|conn| pending_between(conn, b, a)).unwrap());
        db.transition_request(id, RequestStatus::Rejected, now).unwrap();
        assert!(!db.with_conn(|conn| pending_between(conn, a, b)).unwrap());

        db.with_conn_mut(|conn| insert_request(conn, a, b, "retry", RequestSource::Search, now))
            .unwrap();
    }

    #[test]
    fn lists_split_by_direction_newest_first() {
        let db = Database::open_in_memory().unwrap();
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let earlier = DateTime::from_timestamp_millis(1_000).unwrap();
        let later = DateTime::from_timestamp_millis(2_000).unwrap();

        db.with_conn_mut(|conn| insert_request(conn, a, b, "first", RequestSource::Search, earlier))
            .unwrap();
        db.with_conn_mut(|conn| insert_request(conn, a, c, "second", RequestSource::Search, later))
            .unwrap();

        let sent = db.list_requests(a, RequestDirection::Sent).unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].message, "second");
        assert_eq!(sent[1].message, "first");

        assert!(db.list_requests(a, RequestDirection::Received).unwrap().is_empty());
        assert_eq!(db.list_requests(b, RequestDirection::Received).unwrap().len(), 1);
    }
}
