use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            username        TEXT NOT NULL UNIQUE,
            password        TEXT NOT NULL,
            timezone        TEXT NOT NULL DEFAULT 'UTC',
            last_sleep_at   TEXT
        );

        CREATE TABLE IF NOT EXISTS postcards (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     INTEGER NOT NULL REFERENCES users(id),
            audio_hash  TEXT NOT NULL,
            img_url     TEXT NOT NULL,
            caption     TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            is_public   INTEGER NOT NULL DEFAULT 1,
            likes       INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_postcards_user
            ON postcards(user_id, created_at);

        CREATE INDEX IF NOT EXISTS idx_postcards_public
            ON postcards(is_public, likes, created_at);

        CREATE TABLE IF NOT EXISTS trades (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            from_id     INTEGER NOT NULL,
            to_id       INTEGER NOT NULL,
            postcard_id INTEGER NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_trades_from ON trades(from_id);
        CREATE INDEX IF NOT EXISTS idx_trades_to ON trades(to_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}

/// Demo fixtures: two dreamers, one public postcard each. Idempotent —
/// explicit ids with INSERT OR IGNORE, so reruns and already-seeded files
/// are no-ops. The autoincrement sequence continues at 3 either way.
pub fn seed_demo(conn: &Connection) -> Result<()> {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

    conn.execute(
        "INSERT OR IGNORE INTO users (id, username, password, timezone, last_sleep_at)
         VALUES (1, 'dreamweaver', 'hashed_password', 'America/New_York', ?1),
                (2, 'nightwalker', 'hashed_password', 'Europe/London', ?1)",
        [&now],
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO postcards
            (id, user_id, audio_hash, img_url, caption, created_at, is_public, likes)
         VALUES
            (1, 1, 'sample_hash_1',
             'https://images.unsplash.com/photo-1499678329028-101435549a4e?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&h=400',
             'Whispers of midnight lavender, where dreams cascade like purple rain',
             ?1, 1, 42),
            (2, 2, 'sample_hash_2',
             'https://images.unsplash.com/photo-1534447677768-be436bb09401?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&h=400',
             'Crystal whispers echo through caves of forgotten memories, time suspended in amber light',
             ?1, 1, 87)",
        [&now],
    )?;

    Ok(())
}
