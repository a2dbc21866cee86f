use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub description: Option<String>,
    /// Globally unique; a second insert with the same URL is a duplicate.
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
    pub feed_id: Uuid,
}

/// Fields of a post that is about to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub feed_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
}

impl NewPost {
    pub fn new(feed_id: Uuid, title: String, url: String) -> Self {
        Self {
            feed_id,
            title,
            description: None,
            url,
            published_at: None,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_published_at(mut self, published_at: Option<DateTime<Utc>>) -> Self {
        self.published_at = published_at;
        self
    }

    /// Give the post a fresh identity and creation time.
    pub fn into_post(self) -> Post {
        let now = super::now();
        Post {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            title: self.title,
            description: self.description,
            url: self.url,
            published_at: self.published_at,
            feed_id: self.feed_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostWithFeed {
    pub post: Post,
    pub feed_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_post_keeps_fields() {
        let feed_id = Uuid::new_v4();
        let post = NewPost::new(
            feed_id,
            "Title".to_string(),
            "https://example.com/1".to_string(),
        )
        .with_description(Some("Body".to_string()))
        .into_post();

        assert_eq!(post.feed_id, feed_id);
        assert_eq!(post.title, "Title");
        assert_eq!(post.description.as_deref(), Some("Body"));
        assert!(post.published_at.is_none());
        assert_eq!(post.created_at, post.updated_at);
    }
}
