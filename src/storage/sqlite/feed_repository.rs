use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use crate::domain::{Feed, FeedWithUser};
use crate::errors::{GatorError, GatorResult};
use crate::storage::sqlite::{
    is_unique_violation, parse_id, parse_time, parse_time_opt, time_to_sql, SqliteStorage,
};
use crate::storage::traits::FeedRepository;

const FEED_COLUMNS: &str = "id, created_at, updated_at, name, url, user_id, last_fetched_at";

/// Never-fetched feeds first, then oldest attempt; creation time and id keep
/// ties reproducible.
const STALENESS_ORDER: &str =
    "ORDER BY last_fetched_at ASC NULLS FIRST, created_at ASC, id ASC";

pub struct SqliteFeedRepository {
    storage: SqliteStorage,
}

impl SqliteFeedRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Feed> {
        Ok(Feed {
            id: parse_id(row, 0)?,
            created_at: parse_time(row, 1)?,
            updated_at: parse_time(row, 2)?,
            name: row.get(3)?,
            url: row.get(4)?,
            user_id: parse_id(row, 5)?,
            last_fetched_at: parse_time_opt(row, 6)?,
        })
    }

    fn get_by_id(conn: &Connection, id: Uuid) -> GatorResult<Option<Feed>> {
        let mut stmt = conn.prepare(&format!("SELECT {FEED_COLUMNS} FROM feeds WHERE id = ?1"))?;
        let feed = stmt.query_row([id.to_string()], Self::map_row).optional()?;
        Ok(feed)
    }
}

impl FeedRepository for SqliteFeedRepository {
    fn create(&self, name: &str, url: &str, user_id: Uuid) -> GatorResult<Feed> {
        let feed = Feed::new(name.to_string(), url.to_string(), user_id);
        let conn = self.storage.connection()?;

        let inserted = conn.execute(
            "INSERT INTO feeds (id, created_at, updated_at, name, url, user_id, last_fetched_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL)",
            (
                feed.id.to_string(),
                time_to_sql(&feed.created_at),
                time_to_sql(&feed.updated_at),
                &feed.name,
                &feed.url,
                feed.user_id.to_string(),
            ),
        );

        match inserted {
            Ok(_) => Ok(feed),
            Err(e) if is_unique_violation(&e, "feeds.url") => {
                Err(GatorError::FeedAlreadyExists(url.to_string()))
            }
            Err(e) => Err(GatorError::from(e)),
        }
    }

    fn get_by_url(&self, url: &str) -> GatorResult<Option<Feed>> {
        let conn = self.storage.connection()?;
        let mut stmt =
            conn.prepare(&format!("SELECT {FEED_COLUMNS} FROM feeds WHERE url = ?1"))?;

        match stmt.query_row([url], Self::map_row) {
            Ok(f) => Ok(Some(f)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(GatorError::from(e)),
        }
    }

    fn get_all_with_user(&self) -> GatorResult<Vec<FeedWithUser>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(
            "SELECT f.id, f.created_at, f.updated_at, f.name, f.url, f.user_id, f.last_fetched_at, u.name
             FROM feeds f
             INNER JOIN users u ON f.user_id = u.id
             ORDER BY f.created_at ASC",
        )?;

        let feeds = stmt.query_map([], |row| {
            Ok(FeedWithUser {
                feed: Self::map_row(row)?,
                user_name: row.get(7)?,
            })
        })?;

        feeds.collect::<Result<Vec<_>, _>>().map_err(GatorError::from)
    }

    fn mark_fetched(&self, id: Uuid, at: DateTime<Utc>) -> GatorResult<Feed> {
        let conn = self.storage.connection()?;
        let stamp = time_to_sql(&at);

        let updated = conn.execute(
            "UPDATE feeds SET last_fetched_at = ?2, updated_at = ?2 WHERE id = ?1",
            (id.to_string(), &stamp),
        )?;
        if updated == 0 {
            return Err(GatorError::FeedNotFound(id.to_string()));
        }

        Self::get_by_id(&conn, id)?.ok_or_else(|| GatorError::FeedNotFound(id.to_string()))
    }

    fn next_to_fetch(&self) -> GatorResult<Option<Feed>> {
        Ok(self.next_batch_to_fetch(1)?.into_iter().next())
    }

    fn next_batch_to_fetch(&self, limit: usize) -> GatorResult<Vec<Feed>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {FEED_COLUMNS} FROM feeds {STALENESS_ORDER} LIMIT ?1"
        ))?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let feeds = stmt.query_map([limit], Self::map_row)?;
        feeds.collect::<Result<Vec<_>, _>>().map_err(GatorError::from)
    }
}
