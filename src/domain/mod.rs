pub mod feed;
pub mod feed_follow;
pub mod post;
pub mod user;

pub use feed::{Feed, FeedWithUser};
pub use feed_follow::{FeedFollow, FeedFollowWithNames};
pub use post::{NewPost, Post, PostWithFeed};
pub use user::User;

use chrono::{DateTime, SubsecRound, Utc};

/// Current time at the microsecond precision the store keeps.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
