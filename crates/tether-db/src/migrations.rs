use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &mut Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Relationship store: running migration v1 (initial schema)");
        let tx = conn.transaction()?;
        tx.execute_batch(
            "
            CREATE TABLE friend_requests (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                from_user   TEXT NOT NULL,
                to_user     TEXT NOT NULL,
                message     TEXT NOT NULL DEFAULT '',
                source      TEXT NOT NULL,
                status      TEXT NOT NULL DEFAULT 'pending',
                created_at  INTEGER NOT NULL,
                updated_at  INTEGER NOT NULL,
                CHECK (from_user <> to_user)
            );

            -- At most one pending request per ordered pair
            CREATE UNIQUE INDEX idx_requests_pending_pair
                ON friend_requests(from_user, to_user)
                WHERE status = 'pending';

            CREATE INDEX idx_requests_from ON friend_requests(from_user, created_at);
            CREATE INDEX idx_requests_to ON friend_requests(to_user, created_at);

            CREATE TABLE friendships (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                owner       TEXT NOT NULL,
                peer        TEXT NOT NULL,
                remark      TEXT NOT NULL DEFAULT '',
                status      TEXT NOT NULL DEFAULT 'active',
                created_at  INTEGER NOT NULL,
                updated_at  INTEGER NOT NULL,
                UNIQUE(owner, peer),
                CHECK (owner <> peer)
            );

            CREATE INDEX idx_friendships_owner_updated
                ON friendships(owner, updated_at);

            -- High-water mark lookup for friend-list sync
            CREATE INDEX idx_friendships_updated ON friendships(updated_at);

            CREATE TABLE block_entries (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                owner       TEXT NOT NULL,
                blocked     TEXT NOT NULL,
                created_at  INTEGER NOT NULL,
                UNIQUE(owner, blocked),
                CHECK (owner <> blocked)
            );

            CREATE INDEX idx_blocks_blocked ON block_entries(blocked);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
        tx.commit()?;
    }

    info!("Relationship store migrations complete");
    Ok(())
}
