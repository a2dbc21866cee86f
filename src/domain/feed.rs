use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: String,
    pub url: String,
    pub user_id: Uuid,
    /// Time of the last fetch attempt, successful or not. `None` sorts as
    /// the stalest possible value.
    pub last_fetched_at: Option<DateTime<Utc>>,
}

impl Feed {
    pub fn new(name: String, url: String, user_id: Uuid) -> Self {
        let now = super::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            name,
            url,
            user_id,
            last_fetched_at: None,
        }
    }
}

/// A feed joined with the name of the user who added it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedWithUser {
    pub feed: Feed,
    pub user_name: String,
}
