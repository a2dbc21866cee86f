use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Feed, FeedFollowWithNames, FeedWithUser, NewPost, Post, PostWithFeed, User,
};
use crate::errors::GatorResult;

#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    fn create(&self, name: &str) -> GatorResult<User>;
    fn get_by_name(&self, name: &str) -> GatorResult<Option<User>>;
    fn get_all(&self) -> GatorResult<Vec<User>>;
    /// Removes every user; feeds, follows and posts go with them.
    fn delete_all(&self) -> GatorResult<usize>;
}

#[cfg_attr(test, mockall::automock)]
pub trait FeedRepository: Send + Sync {
    fn create(&self, name: &str, url: &str, user_id: Uuid) -> GatorResult<Feed>;
    fn get_by_url(&self, url: &str) -> GatorResult<Option<Feed>>;
    fn get_all_with_user(&self) -> GatorResult<Vec<FeedWithUser>>;
    fn mark_fetched(&self, id: Uuid, at: DateTime<Utc>) -> GatorResult<Feed>;
    /// The single stalest feed: never-fetched first, then oldest attempt.
    fn next_to_fetch(&self) -> GatorResult<Option<Feed>>;
    /// Up to `limit` feeds in the same order as `next_to_fetch`.
    fn next_batch_to_fetch(&self, limit: usize) -> GatorResult<Vec<Feed>>;
}

#[cfg_attr(test, mockall::automock)]
pub trait FeedFollowRepository: Send + Sync {
    fn create(&self, user_id: Uuid, feed_id: Uuid) -> GatorResult<FeedFollowWithNames>;
    fn get_for_user(&self, user_id: Uuid) -> GatorResult<Vec<FeedFollowWithNames>>;
    /// Returns whether a follow was removed.
    fn delete(&self, user_id: Uuid, feed_url: &str) -> GatorResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
pub trait PostRepository: Send + Sync {
    /// Fails with `GatorError::DuplicatePostUrl` when the URL is already stored.
    fn create(&self, post: &NewPost) -> GatorResult<Post>;
    fn get_for_user(&self, user_id: Uuid, limit: usize) -> GatorResult<Vec<PostWithFeed>>;
    fn count_for_feed(&self, feed_id: Uuid) -> GatorResult<usize>;
}
