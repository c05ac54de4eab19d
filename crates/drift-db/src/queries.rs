use crate::Database;
use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use drift_types::models::{Postcard, Trade, User};
use rusqlite::{Connection, OptionalExtension, Row};
use tracing::warn;

impl Database {
    pub fn seed_demo(&self) -> Result<()> {
        self.with_conn(crate::migrations::seed_demo)
    }

    // -- Users --

    pub fn create_user(&self, username: &str, password: &str, timezone: &str) -> Result<User> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, password, timezone) VALUES (?1, ?2, ?3)",
                (username, password, timezone),
            )?;
            let id = conn.last_insert_rowid();
            Ok(User {
                id,
                username: username.to_string(),
                password: password.to_string(),
                timezone: timezone.to_string(),
                last_sleep_at: None,
            })
        })
    }

    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", (id,)))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.with_conn(|conn| query_user(conn, "username = ?1", (username,)))
    }

    /// Marks the user as having just started a recording run. Returns None
    /// if the id is unknown.
    pub fn update_user_last_sleep(&self, id: i64) -> Result<Option<User>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET last_sleep_at = ?1 WHERE id = ?2",
                (now_ts(), id),
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_user(conn, "id = ?1", (id,))
        })
    }

    // -- Postcards --

    pub fn get_postcard(&self, id: i64) -> Result<Option<Postcard>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {POSTCARD_COLS} FROM postcards WHERE id = ?1"),
                    (id,),
                    row_to_postcard,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// All postcards owned by `user_id`, newest-created-first.
    pub fn get_postcards_by_user(&self, user_id: i64) -> Result<Vec<Postcard>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {POSTCARD_COLS} FROM postcards
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt
                .query_map((user_id,), row_to_postcard)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Gallery view: public postcards by likes descending, recency breaking
    /// ties, truncated to `limit`.
    pub fn get_public_postcards(&self, limit: u32) -> Result<Vec<Postcard>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {POSTCARD_COLS} FROM postcards
                 WHERE is_public = 1
                 ORDER BY likes DESC, created_at DESC, id DESC
                 LIMIT ?1"
            ))?;
            let rows = stmt
                .query_map((limit,), row_to_postcard)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn create_postcard(
        &self,
        user_id: i64,
        audio_hash: &str,
        img_url: &str,
        caption: &str,
        is_public: i64,
    ) -> Result<Postcard> {
        self.with_conn(|conn| {
            let created_at = Utc::now();
            conn.execute(
                "INSERT INTO postcards (user_id, audio_hash, img_url, caption, created_at, is_public, likes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)",
                (
                    user_id,
                    audio_hash,
                    img_url,
                    caption,
                    created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
                    is_public,
                ),
            )?;
            Ok(Postcard {
                id: conn.last_insert_rowid(),
                user_id,
                audio_hash: audio_hash.to_string(),
                img_url: img_url.to_string(),
                caption: caption.to_string(),
                created_at,
                is_public,
                likes: 0,
            })
        })
    }

    /// Atomic in-place increment — no read-then-write window, so two
    /// simultaneous likes both land.
    pub fn like_postcard(&self, id: i64) -> Result<Option<Postcard>> {
        self.with_conn(|conn| {
            let changed =
                conn.execute("UPDATE postcards SET likes = likes + 1 WHERE id = ?1", (id,))?;
            if changed == 0 {
                return Ok(None);
            }
            let row = conn
                .query_row(
                    &format!("SELECT {POSTCARD_COLS} FROM postcards WHERE id = ?1"),
                    (id,),
                    row_to_postcard,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Up to `count` public postcards not owned by the requester, in uniform
    /// random order. No memory of what the user has already seen.
    pub fn random_postcards_for_trade(&self, user_id: i64, count: u32) -> Result<Vec<Postcard>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {POSTCARD_COLS} FROM postcards
                 WHERE is_public = 1 AND user_id != ?1
                 ORDER BY RANDOM()
                 LIMIT ?2"
            ))?;
            let rows = stmt
                .query_map((user_id, count), row_to_postcard)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Trades --

    pub fn create_trade(&self, from_id: i64, to_id: i64, postcard_id: i64) -> Result<Trade> {
        self.with_conn(|conn| {
            let created_at = Utc::now();
            conn.execute(
                "INSERT INTO trades (from_id, to_id, postcard_id, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                (
                    from_id,
                    to_id,
                    postcard_id,
                    created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
                ),
            )?;
            Ok(Trade {
                id: conn.last_insert_rowid(),
                from_id,
                to_id,
                postcard_id,
                created_at,
            })
        })
    }

    /// Trades where the user appears on either side, newest-first.
    pub fn get_trades_by_user(&self, user_id: i64) -> Result<Vec<Trade>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, from_id, to_id, postcard_id, created_at FROM trades
                 WHERE from_id = ?1 OR to_id = ?1
                 ORDER BY created_at DESC, id DESC",
            )?;
            let rows = stmt
                .query_map((user_id,), row_to_trade)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

const POSTCARD_COLS: &str =
    "id, user_id, audio_hash, img_url, caption, created_at, is_public, likes";

/// Timestamps are compared as text by the ORDER BY clauses, so they are
/// written at a fixed width.
fn now_ts() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn query_user(
    conn: &Connection,
    filter: &str,
    params: impl rusqlite::Params,
) -> Result<Option<User>> {
    let row = conn
        .query_row(
            &format!(
                "SELECT id, username, password, timezone, last_sleep_at FROM users WHERE {filter}"
            ),
            params,
            row_to_user,
        )
        .optional()?;
    Ok(row)
}

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
        timezone: row.get(3)?,
        last_sleep_at: row.get::<_, Option<String>>(4)?.map(|s| parse_ts(&s)),
    })
}

fn row_to_postcard(row: &Row) -> rusqlite::Result<Postcard> {
    Ok(Postcard {
        id: row.get(0)?,
        user_id: row.get(1)?,
        audio_hash: row.get(2)?,
        img_url: row.get(3)?,
        caption: row.get(4)?,
        created_at: parse_ts(&row.get::<_, String>(5)?),
        is_public: row.get(6)?,
        likes: row.get(7)?,
    })
}

fn row_to_trade(row: &Row) -> rusqlite::Result<Trade> {
    Ok(Trade {
        id: row.get(0)?,
        from_id: row.get(1)?,
        to_id: row.get(2)?,
        postcard_id: row.get(3)?,
        created_at: parse_ts(&row.get::<_, String>(4)?),
    })
}

/// Timestamps are written as RFC 3339, but tolerate SQLite's bare
/// "YYYY-MM-DD HH:MM:SS" form in case rows were inserted by hand.
fn parse_ts(s: &str) -> DateTime<Utc> {
    s.parse::<DateTime<Utc>>()
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", s, e);
            DateTime::default()
        })
}
