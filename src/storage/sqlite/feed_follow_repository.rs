use uuid::Uuid;

use crate::domain::{FeedFollow, FeedFollowWithNames};
use crate::errors::{GatorError, GatorResult};
use crate::storage::sqlite::{parse_id, parse_time, time_to_sql, SqliteStorage};
use crate::storage::traits::FeedFollowRepository;

const FOLLOW_WITH_NAMES: &str = "SELECT ff.id, ff.created_at, ff.updated_at, ff.user_id, ff.feed_id, u.name, f.name
     FROM feed_follows ff
     INNER JOIN users u ON ff.user_id = u.id
     INNER JOIN feeds f ON ff.feed_id = f.id";

pub struct SqliteFeedFollowRepository {
    storage: SqliteStorage,
}

impl SqliteFeedFollowRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FeedFollowWithNames> {
        Ok(FeedFollowWithNames {
            follow: FeedFollow {
                id: parse_id(row, 0)?,
                created_at: parse_time(row, 1)?,
                updated_at: parse_time(row, 2)?,
                user_id: parse_id(row, 3)?,
                feed_id: parse_id(row, 4)?,
            },
            user_name: row.get(5)?,
            feed_name: row.get(6)?,
        })
    }
}

impl FeedFollowRepository for SqliteFeedFollowRepository {
    fn create(&self, user_id: Uuid, feed_id: Uuid) -> GatorResult<FeedFollowWithNames> {
        let follow = FeedFollow::new(user_id, feed_id);
        let conn = self.storage.connection()?;

        let inserted = conn.execute(
            "INSERT INTO feed_follows (id, created_at, updated_at, user_id, feed_id) VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                follow.id.to_string(),
                time_to_sql(&follow.created_at),
                time_to_sql(&follow.updated_at),
                user_id.to_string(),
                feed_id.to_string(),
            ),
        );

        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                return Err(GatorError::AlreadyFollowing(feed_id.to_string()));
            }
            Err(e) => return Err(GatorError::from(e)),
        }

        let mut stmt = conn.prepare(&format!("{FOLLOW_WITH_NAMES} WHERE ff.id = ?1"))?;
        let row = stmt.query_row([follow.id.to_string()], Self::map_row)?;
        Ok(row)
    }

    fn get_for_user(&self, user_id: Uuid) -> GatorResult<Vec<FeedFollowWithNames>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(&format!(
            "{FOLLOW_WITH_NAMES} WHERE ff.user_id = ?1 ORDER BY ff.created_at ASC"
        ))?;

        let follows = stmt.query_map([user_id.to_string()], Self::map_row)?;
        follows.collect::<Result<Vec<_>, _>>().map_err(GatorError::from)
    }

    fn delete(&self, user_id: Uuid, feed_url: &str) -> GatorResult<bool> {
        let conn = self.storage.connection()?;
        let removed = conn.execute(
            "DELETE FROM feed_follows
             WHERE user_id = ?1
               AND feed_id IN (SELECT id FROM feeds WHERE url = ?2)",
            (user_id.to_string(), feed_url),
        )?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sqlite::{SqliteFeedRepository, SqliteUserRepository};
    use crate::storage::traits::{FeedRepository, UserRepository};

    fn setup() -> (SqliteFeedFollowRepository, SqliteFeedRepository, SqliteUserRepository) {
        let storage = SqliteStorage::in_memory().unwrap();
        (
            SqliteFeedFollowRepository::new(storage.clone()),
            SqliteFeedRepository::new(storage.clone()),
            SqliteUserRepository::new(storage),
        )
    }

    #[test]
    fn test_follow_returns_names() {
        let (follows, feeds, users) = setup();
        let user = users.create("kahya").unwrap();
        let feed = feeds.create("Hacker News", "https://news.test/rss", user.id).unwrap();

        let created = follows.create(user.id, feed.id).unwrap();
        assert_eq!(created.user_name, "kahya");
        assert_eq!(created.feed_name, "Hacker News");

        let listed = follows.get_for_user(user.id).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].follow.feed_id, feed.id);
    }

    #[test]
    fn test_follow_twice_rejected() {
        let (follows, feeds, users) = setup();
        let user = users.create("kahya").unwrap();
        let feed = feeds.create("Feed", "https://a.test/rss", user.id).unwrap();

        follows.create(user.id, feed.id).unwrap();
        let result = follows.create(user.id, feed.id);
        assert!(matches!(result, Err(GatorError::AlreadyFollowing(_))));
    }

    #[test]
    fn test_unfollow_by_url() {
        let (follows, feeds, users) = setup();
        let user = users.create("kahya").unwrap();
        let other = users.create("holgith").unwrap();
        let feed = feeds.create("Feed", "https://a.test/rss", user.id).unwrap();
        follows.create(user.id, feed.id).unwrap();
        follows.create(other.id, feed.id).unwrap();

        assert!(follows.delete(user.id, "https://a.test/rss").unwrap());
        assert!(!follows.delete(user.id, "https://a.test/rss").unwrap());
        assert!(follows.get_for_user(user.id).unwrap().is_empty());
        assert_eq!(follows.get_for_user(other.id).unwrap().len(), 1);
    }
}
