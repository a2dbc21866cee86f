use rusqlite::OptionalExtension;
use uuid::Uuid;

use crate::domain::{NewPost, Post, PostWithFeed};
use crate::errors::{GatorError, GatorResult};
use crate::storage::sqlite::{
    is_unique_violation, parse_id, parse_time, parse_time_opt, time_to_sql, SqliteStorage,
};
use crate::storage::traits::PostRepository;

pub struct SqlitePostRepository {
    storage: SqliteStorage,
}

impl SqlitePostRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Post> {
        Ok(Post {
            id: parse_id(row, 0)?,
            created_at: parse_time(row, 1)?,
            updated_at: parse_time(row, 2)?,
            title: row.get(3)?,
            description: row.get(4)?,
            url: row.get(5)?,
            published_at: parse_time_opt(row, 6)?,
            feed_id: parse_id(row, 7)?,
        })
    }

    pub fn get_by_url(&self, url: &str) -> GatorResult<Option<Post>> {
        let conn = self.storage.connection()?;
        let post = conn
            .query_row(
                "SELECT id, created_at, updated_at, title, description, url, published_at, feed_id
                 FROM posts WHERE url = ?1",
                [url],
                Self::map_row,
            )
            .optional()?;
        Ok(post)
    }
}

impl PostRepository for SqlitePostRepository {
    fn create(&self, new_post: &NewPost) -> GatorResult<Post> {
        let post = new_post.clone().into_post();
        let conn = self.storage.connection()?;

        let inserted = conn.execute(
            "INSERT INTO posts (id, created_at, updated_at, title, description, url, published_at, feed_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            (
                post.id.to_string(),
                time_to_sql(&post.created_at),
                time_to_sql(&post.updated_at),
                &post.title,
                &post.description,
                &post.url,
                post.published_at.as_ref().map(time_to_sql),
                post.feed_id.to_string(),
            ),
        );

        match inserted {
            Ok(_) => Ok(post),
            Err(e) if is_unique_violation(&e, "posts.url") => {
                Err(GatorError::DuplicatePostUrl(post.url))
            }
            Err(e) => Err(GatorError::from(e)),
        }
    }

    fn get_for_user(&self, user_id: Uuid, limit: usize) -> GatorResult<Vec<PostWithFeed>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(
            "SELECT p.id, p.created_at, p.updated_at, p.title, p.description, p.url, p.published_at, p.feed_id, f.name
             FROM posts p
             INNER JOIN feeds f ON p.feed_id = f.id
             INNER JOIN feed_follows ff ON ff.feed_id = f.id
             WHERE ff.user_id = ?1
             ORDER BY p.published_at DESC NULLS LAST, p.created_at DESC
             LIMIT ?2",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let posts = stmt.query_map((user_id.to_string(), limit), |row| {
            Ok(PostWithFeed {
                post: Self::map_row(row)?,
                feed_name: row.get(8)?,
            })
        })?;

        posts.collect::<Result<Vec<_>, _>>().map_err(GatorError::from)
    }

    fn count_for_feed(&self, feed_id: Uuid) -> GatorResult<usize> {
        let conn = self.storage.connection()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM posts WHERE feed_id = ?1",
            [feed_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
