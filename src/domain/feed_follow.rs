use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedFollow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub feed_id: Uuid,
}

impl FeedFollow {
    pub fn new(user_id: Uuid, feed_id: Uuid) -> Self {
        let now = super::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            user_id,
            feed_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedFollowWithNames {
    pub follow: FeedFollow,
    pub user_name: String,
    pub feed_name: String,
}
